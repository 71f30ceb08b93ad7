use indexmap::IndexMap;
use obs_charts::core::scale::nice_domain;
use obs_charts::core::{
    Category, ImputationType, LinearScale, MeasureBasis, Sorting, SortingOrder, SortingType,
    StackEntry, impute_series, sort_categories, stack, stacked_domain,
};
use obs_charts::interaction::bisect_nearest;
use proptest::prelude::*;

fn sorting_strategy() -> impl Strategy<Value = Sorting> {
    let sorting_type = prop_oneof![
        Just(SortingType::ByDimensionLabel),
        Just(SortingType::ByMeasure),
        Just(SortingType::ByTotalSize),
        Just(SortingType::ByAuto),
    ];
    let sorting_order = prop_oneof![Just(SortingOrder::Asc), Just(SortingOrder::Desc)];
    (sorting_type, sorting_order)
        .prop_map(|(sorting_type, order)| Sorting::new(sorting_type, order))
}

proptest! {
    #[test]
    fn stacked_heights_sum_to_group_totals(
        values in prop::collection::vec(prop::collection::vec(-1_000.0f64..1_000.0, 3), 1..8)
    ) {
        let segments: Vec<String> = (0..3).map(|index| format!("s{index}")).collect();
        let x_keys: Vec<String> = (0..values.len()).map(|index| format!("x{index}")).collect();
        let mut entries = Vec::new();
        for (x_index, group) in values.iter().enumerate() {
            for (segment_index, value) in group.iter().enumerate() {
                entries.push(StackEntry::new(
                    x_keys[x_index].clone(),
                    segments[segment_index].clone(),
                    *value,
                    entries.len(),
                ));
            }
        }

        let series = stack(&entries, &x_keys, &segments);
        for (x_index, group) in values.iter().enumerate() {
            let expected: f64 = group.iter().sum();
            let actual: f64 = series
                .segments
                .iter()
                .map(|segment| segment.points[x_index].height())
                .sum();
            prop_assert!((expected - actual).abs() <= 1e-6);
        }
    }

    #[test]
    fn normalized_domain_is_always_zero_to_hundred(
        values in prop::collection::vec(-1e12f64..1e12, 0..20),
        custom in prop::option::of((-1e6f64..0.0, 0.0f64..1e6))
    ) {
        let entries: Vec<StackEntry> = values
            .iter()
            .enumerate()
            .map(|(index, value)| StackEntry::new(format!("x{}", index % 4), "s", *value, index))
            .collect();
        let custom = custom.map(|(start, end)| [start, end]);
        prop_assert_eq!(stacked_domain(&entries, true, custom), (0.0, 100.0));
    }

    #[test]
    fn category_sorting_is_idempotent(
        rows in prop::collection::vec(
            ("[a-e]{1,3}", prop::option::of(0.0f64..10.0), prop::option::of(0u32..3)),
            0..12,
        ),
        sorting in sorting_strategy()
    ) {
        let mut values = IndexMap::new();
        let mut categories: Vec<Category> = Vec::new();
        for (index, (label, value, depth)) in rows.iter().enumerate() {
            let key = format!("k{index}");
            if let Some(value) = value {
                values.insert(key.clone(), *value);
            }
            let mut category = Category::new(key, label.clone());
            category.depth = *depth;
            categories.push(category);
        }

        sort_categories(&mut categories, sorting, MeasureBasis::Values(&values));
        let once = categories.clone();
        sort_categories(&mut categories, sorting, MeasureBasis::Values(&values));
        prop_assert_eq!(once, categories);
    }

    #[test]
    fn linear_imputation_keeps_known_endpoints(
        first in -1_000.0f64..1_000.0,
        last in -1_000.0f64..1_000.0,
        gaps in prop::collection::vec(prop::option::of(-1_000.0f64..1_000.0), 0..10)
    ) {
        let mut series = vec![(0.0, Some(first))];
        for (index, value) in gaps.iter().enumerate() {
            series.push(((index + 1) as f64, *value));
        }
        series.push(((gaps.len() + 1) as f64, Some(last)));

        let imputed = impute_series(&series, ImputationType::Linear);
        prop_assert_eq!(imputed.first().copied().flatten(), Some(first));
        prop_assert_eq!(imputed.last().copied().flatten(), Some(last));
        prop_assert!(imputed.iter().all(Option::is_some));
        for ((_, original), value) in series.iter().zip(&imputed) {
            if original.is_some() {
                prop_assert_eq!(original, value);
            }
        }
    }

    #[test]
    fn zero_imputation_replaces_every_gap_with_zero(
        values in prop::collection::vec(prop::option::of(-1_000.0f64..1_000.0), 0..20)
    ) {
        let series: Vec<(f64, Option<f64>)> = values
            .iter()
            .enumerate()
            .map(|(index, value)| (index as f64, *value))
            .collect();
        let imputed = impute_series(&series, ImputationType::Zeros);
        for (original, value) in values.iter().zip(imputed) {
            prop_assert_eq!(value, Some(original.unwrap_or(0.0)));
        }
    }

    #[test]
    fn bisection_midpoint_resolves_to_right_hand_point(
        start in -1_000_000i64..1_000_000,
        half_gap in 1i64..1_000,
        count in 2usize..20,
        pick in 0usize..18
    ) {
        let sorted: Vec<f64> = (0..count)
            .map(|index| (start + 2 * half_gap * index as i64) as f64)
            .collect();
        let left = pick % (count - 1);
        let midpoint = (sorted[left] + sorted[left + 1]) / 2.0;
        prop_assert_eq!(bisect_nearest(&sorted, midpoint), Some(left + 1));
        prop_assert_eq!(bisect_nearest(&sorted, midpoint - 0.5), Some(left));
    }

    #[test]
    fn linear_scale_round_trips_through_pixels(
        start in -1e6f64..1e6,
        span in 1e-3f64..1e6,
        value in -1e6f64..1e6,
        height in 10.0f64..4_000.0
    ) {
        let scale = LinearScale::new((start, start + span), (height, 0.0)).expect("finite scale");
        let back = scale.invert(scale.scale(value));
        let tolerance = 1e-9 * (value.abs() + start.abs() + span).max(1.0);
        prop_assert!((back - value).abs() <= tolerance);
    }

    #[test]
    fn nice_domain_covers_the_data_extent(
        a in -1e6f64..1e6,
        b in -1e6f64..1e6,
        count in 2usize..12
    ) {
        let (lo, hi) = (a.min(b), a.max(b));
        let (nice_lo, nice_hi) = nice_domain(lo, hi, count);
        let tolerance = 1e-9 * lo.abs().max(hi.abs()).max(1.0);
        prop_assert!(nice_lo <= lo + tolerance);
        prop_assert!(nice_hi >= hi - tolerance);
    }
}
