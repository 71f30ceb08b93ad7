use approx::assert_relative_eq;
use chrono::{TimeZone, Utc};
use indexmap::IndexMap;
use obs_charts::core::stack::normalize_to_percent;
use obs_charts::core::{
    Category, MeasureBasis, MinValueRule, Sorting, SortingOrder, SortingType, StackEntry,
    measure_domain, sort_categories, stack, stacked_domain,
};

fn two_segment_entries() -> Vec<StackEntry> {
    vec![
        StackEntry::new("A", "s1", 1.0, 0),
        StackEntry::new("B", "s1", 2.0, 1),
        StackEntry::new("C", "s1", 3.0, 2),
        StackEntry::new("A", "s2", 1.0, 3),
        StackEntry::new("B", "s2", 1.0, 4),
        StackEntry::new("C", "s2", 1.0, 5),
    ]
}

fn keys(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| (*value).to_owned()).collect()
}

#[test]
fn two_stacked_segments_yield_zero_to_four_domain() {
    let entries = two_segment_entries();
    assert_eq!(stacked_domain(&entries, false, None), (0.0, 4.0));
}

#[test]
fn stacked_segments_sit_on_top_of_each_other() {
    let entries = two_segment_entries();
    let series = stack(&entries, &keys(&["A", "B", "C"]), &keys(&["s1", "s2"]));

    let lower = series.point("s1", "C").expect("s1 at C");
    let upper = series.point("s2", "C").expect("s2 at C");
    assert_relative_eq!(lower.baseline, 0.0);
    assert_relative_eq!(lower.top, 3.0);
    assert_relative_eq!(upper.baseline, 3.0);
    assert_relative_eq!(upper.top, 4.0);

    let totals = series.totals();
    assert_relative_eq!(totals["A"], 2.0);
    assert_relative_eq!(totals["B"], 3.0);
    assert_relative_eq!(totals["C"], 4.0);
}

#[test]
fn negative_values_stack_below_zero() {
    let entries = vec![
        StackEntry::new("A", "s1", 2.0, 0),
        StackEntry::new("A", "s2", -3.0, 1),
        StackEntry::new("A", "s3", -1.0, 2),
    ];
    let series = stack(&entries, &keys(&["A"]), &keys(&["s1", "s2", "s3"]));
    let s3 = series.point("s3", "A").expect("s3");
    assert_relative_eq!(s3.baseline, -3.0);
    assert_relative_eq!(s3.top, -4.0);

    let (min, max) = stacked_domain(&entries, false, None);
    assert!(min <= -4.0);
    assert!(max >= 2.0);
}

#[test]
fn single_observation_domain_starts_at_zero() {
    let (min, max) = measure_domain([1500.0], MinValueRule::Zero, None);
    assert_eq!(min, 0.0);
    assert!(max >= 1500.0);
}

#[test]
fn custom_domain_is_ignored_only_in_normalized_mode() {
    let entries = two_segment_entries();
    assert_eq!(stacked_domain(&entries, false, Some([-1.0, 1.0])), (-1.0, 1.0));
    assert_eq!(stacked_domain(&entries, true, Some([-1.0, 1.0])), (0.0, 100.0));
}

#[test]
fn normalized_groups_sum_to_one_hundred() {
    let normalized = normalize_to_percent(&two_segment_entries());
    for group in ["A", "B", "C"] {
        let sum: f64 = normalized
            .iter()
            .filter(|entry| entry.x_key == group)
            .map(|entry| entry.value)
            .sum();
        assert_relative_eq!(sum, 100.0, epsilon = 1e-9);
    }
    let c_s1 = normalized
        .iter()
        .find(|entry| entry.x_key == "C" && entry.segment == "s1")
        .expect("C/s1");
    assert_relative_eq!(c_s1.value, 75.0);
}

#[test]
fn measure_sorting_orders_by_value_with_label_tie_break() {
    let mut categories = vec![
        Category::new("b", "Bern"),
        Category::new("z", "Zurich"),
        Category::new("a", "Aargau"),
    ];
    let mut values = IndexMap::new();
    values.insert("b".to_owned(), 5.0);
    values.insert("z".to_owned(), 9.0);
    values.insert("a".to_owned(), 5.0);

    sort_categories(
        &mut categories,
        Sorting::new(SortingType::ByMeasure, SortingOrder::Desc),
        MeasureBasis::Values(&values),
    );
    let order: Vec<&str> = categories.iter().map(|category| category.key.as_str()).collect();
    assert_eq!(order, vec!["z", "b", "a"]);
}

#[test]
fn auto_sorting_prefers_position_over_label() {
    let mut first = Category::new("late", "Alpha");
    first.position = Some(2.0);
    let mut second = Category::new("early", "Omega");
    second.position = Some(1.0);
    let mut categories = vec![first, second];

    sort_categories(&mut categories, Sorting::default(), MeasureBasis::None);
    assert_eq!(categories[0].key, "early");
}

#[test]
fn stacked_totals_sort_categories_by_rank() {
    let mut categories = vec![
        Category::new("A", "A"),
        Category::new("B", "B"),
        Category::new("C", "C"),
    ];
    let mut totals = IndexMap::new();
    totals.insert("A".to_owned(), 2.0);
    totals.insert("B".to_owned(), 3.0);
    totals.insert("C".to_owned(), 1.0);

    sort_categories(
        &mut categories,
        Sorting::new(SortingType::ByMeasure, SortingOrder::Asc),
        MeasureBasis::StackedTotals(&totals),
    );
    let order: Vec<&str> = categories.iter().map(|category| category.key.as_str()).collect();
    assert_eq!(order, vec!["C", "A", "B"]);
}

#[test]
fn descending_measure_sort_keeps_missing_values_last() {
    let mut categories = vec![Category::new("b", "B"), Category::new("a", "A")];
    let values: IndexMap<String, f64> = [("a".to_owned(), 1.0)].into_iter().collect();
    let sorting = Sorting::new(SortingType::ByMeasure, SortingOrder::Desc);
    sort_categories(&mut categories, sorting, MeasureBasis::Values(&values));
    let sorted: Vec<&str> = categories.iter().map(|category| category.key.as_str()).collect();
    assert_eq!(sorted, vec!["a", "b"]);
}

#[test]
fn mixed_dated_and_undated_labels_sort_consistently() {
    let dated = |key: &str, year: i32| {
        let mut category = Category::new(key, key);
        category.date = Utc.with_ymd_and_hms(year, 6, 1, 0, 0, 0).single();
        category
    };
    let sorting = Sorting::new(SortingType::ByDimensionLabel, SortingOrder::Asc);
    let mut forward = vec![dated("z", 2020), Category::new("b", "b"), dated("a", 2021)];
    let mut backward: Vec<Category> = forward.iter().rev().cloned().collect();

    sort_categories(&mut forward, sorting, MeasureBasis::None);
    sort_categories(&mut backward, sorting, MeasureBasis::None);

    let sorted: Vec<&str> = forward.iter().map(|category| category.key.as_str()).collect();
    assert_eq!(sorted, vec!["z", "a", "b"]);
    assert_eq!(forward, backward);
}
