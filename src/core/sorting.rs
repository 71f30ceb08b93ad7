use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::core::time::parse_time;
use crate::core::{Dimension, Sorting, SortingOrder, SortingType};

/// Sortable metadata of one axis or segment category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// Grouping key (value identifier when known, else the label).
    pub key: String,
    pub label: String,
    pub date: Option<DateTime<Utc>>,
    pub depth: Option<u32>,
    pub position: Option<f64>,
    pub identifier: Option<String>,
}

impl Category {
    #[must_use]
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            date: None,
            depth: None,
            position: None,
            identifier: None,
        }
    }

    /// Builds a category enriched with the dimension's value metadata.
    ///
    /// Temporal-entity values additionally carry their parsed date.
    #[must_use]
    pub fn from_dimension(dimension: Option<&Dimension>, key: &str, label: &str) -> Self {
        let mut category = Self::new(key, label);
        let Some(dimension) = dimension else {
            return category;
        };
        if let Some(value) = dimension
            .find_value(key)
            .or_else(|| dimension.find_value(label))
        {
            category.depth = value.depth;
            category.position = value.position;
            category.identifier = value.identifier.clone();
        }
        if let Some((_, format)) = dimension.kind.time_spec() {
            category.date = parse_time(label, format).or_else(|| parse_time(key, format));
        }
        category
    }
}

/// Numeric basis consulted by measure-driven sorting.
#[derive(Debug, Clone, Copy)]
pub enum MeasureBasis<'a> {
    None,
    /// Bound value per category key (unstacked charts, segment sums).
    Values(&'a IndexMap<String, f64>),
    /// Per-category stack totals; applied as a rank order.
    StackedTotals(&'a IndexMap<String, f64>),
}

impl MeasureBasis<'_> {
    fn value(&self, key: &str) -> Option<f64> {
        match self {
            Self::None => None,
            Self::Values(values) | Self::StackedTotals(values) => values.get(key).copied(),
        }
    }
}

/// Sorts `categories` in place. Stable and idempotent: every comparator ends in
/// a deterministic label/key tie-break.
///
/// The order only applies between present values; categories missing the
/// compared measure, date or hierarchy field sort last in both directions.
pub fn sort_categories(categories: &mut [Category], sorting: Sorting, basis: MeasureBasis<'_>) {
    let descending = sorting.sorting_order == SortingOrder::Desc;

    match (sorting.sorting_type, basis) {
        (SortingType::ByMeasure, MeasureBasis::StackedTotals(totals)) => {
            let ranks = ascending_rank(categories, totals);
            let missing = |category: &Category| !totals.contains_key(&category.key);
            categories.sort_by(|a, b| {
                missing(a).cmp(&missing(b)).then_with(|| {
                    directed(
                        rank_of(&ranks, &a.key).cmp(&rank_of(&ranks, &b.key)),
                        descending,
                    )
                })
            });
        }
        (SortingType::ByMeasure | SortingType::ByTotalSize, MeasureBasis::None) => {
            categories.sort_by(|a, b| auto_ordering(a, b, descending));
        }
        (SortingType::ByMeasure | SortingType::ByTotalSize, basis) => {
            categories.sort_by(|a, b| {
                compare_optional(
                    basis.value(&a.key).map(OrderedFloat),
                    basis.value(&b.key).map(OrderedFloat),
                    descending,
                )
                .then_with(|| label_ordering(a, b, descending))
            });
        }
        (SortingType::ByDimensionLabel, _) => {
            categories.sort_by(|a, b| label_ordering(a, b, descending));
        }
        (SortingType::ByAuto, _) => {
            categories.sort_by(|a, b| auto_ordering(a, b, descending));
        }
    }
}

/// Hierarchy depth, then position, then identifier, then label.
#[must_use]
pub fn compare_auto(a: &Category, b: &Category) -> Ordering {
    auto_ordering(a, b, false)
}

/// Date for temporal entities, otherwise the label; the key breaks ties.
///
/// Dated categories come before undated ones in either order so mixed sets
/// still order totally.
#[must_use]
pub fn compare_label(a: &Category, b: &Category, order: SortingOrder) -> Ordering {
    label_ordering(a, b, order == SortingOrder::Desc)
}

fn auto_ordering(a: &Category, b: &Category, descending: bool) -> Ordering {
    compare_optional(a.depth, b.depth, descending)
        .then_with(|| {
            compare_optional(
                a.position.map(OrderedFloat),
                b.position.map(OrderedFloat),
                descending,
            )
        })
        .then_with(|| {
            compare_optional(
                a.identifier.as_deref(),
                b.identifier.as_deref(),
                descending,
            )
        })
        .then_with(|| label_ordering(a, b, descending))
}

fn label_ordering(a: &Category, b: &Category, descending: bool) -> Ordering {
    let primary = match (a.date, b.date) {
        (Some(left), Some(right)) => directed(left.cmp(&right), descending),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => directed(a.label.cmp(&b.label), descending),
    };
    primary.then_with(|| directed(a.key.cmp(&b.key), descending))
}

fn ascending_rank(
    categories: &[Category],
    totals: &IndexMap<String, f64>,
) -> IndexMap<String, usize> {
    let mut ranked: Vec<&Category> = categories.iter().collect();
    ranked.sort_by(|a, b| {
        compare_optional(
            totals.get(&a.key).copied().map(OrderedFloat),
            totals.get(&b.key).copied().map(OrderedFloat),
            false,
        )
        .then_with(|| compare_auto(a, b))
    });
    ranked
        .into_iter()
        .enumerate()
        .map(|(rank, category)| (category.key.clone(), rank))
        .collect()
}

fn rank_of(ranks: &IndexMap<String, usize>, key: &str) -> usize {
    ranks.get(key).copied().unwrap_or(usize::MAX)
}

fn directed(ordering: Ordering, descending: bool) -> Ordering {
    if descending {
        ordering.reverse()
    } else {
        ordering
    }
}

/// Present values first; `descending` flips only the order among present values.
fn compare_optional<T: Ord>(a: Option<T>, b: Option<T>, descending: bool) -> Ordering {
    match (a, b) {
        (Some(left), Some(right)) => directed(left.cmp(&right), descending),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
