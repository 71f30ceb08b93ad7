//! Diverging stack layout and stacked-domain computation.
//!
//! Positive values grow upward from zero and negative values grow downward,
//! each x position stacking its segments in segment order.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::scale::{DEFAULT_TICK_COUNT, nice_domain};

/// One contribution to a stack: a measure value at an axis position for a segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackEntry {
    pub x_key: String,
    pub segment: String,
    pub value: f64,
    pub observation: usize,
}

impl StackEntry {
    #[must_use]
    pub fn new(
        x_key: impl Into<String>,
        segment: impl Into<String>,
        value: f64,
        observation: usize,
    ) -> Self {
        Self {
            x_key: x_key.into(),
            segment: segment.into(),
            value,
            observation,
        }
    }
}

/// `[baseline, top]` pair for one segment at one axis position.
///
/// `baseline` is the end attached to the running stack, `top` the far end, so
/// `top - baseline` always equals the signed contribution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub baseline: f64,
    pub top: f64,
    pub observation: Option<usize>,
}

impl SeriesPoint {
    #[must_use]
    pub fn height(self) -> f64 {
        self.top - self.baseline
    }

    /// Lower and upper coordinate irrespective of sign.
    #[must_use]
    pub fn extent(self) -> (f64, f64) {
        (self.baseline.min(self.top), self.baseline.max(self.top))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesSegment {
    pub segment: String,
    /// Aligned with `StackedSeries::x_keys`.
    pub points: Vec<SeriesPoint>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StackedSeries {
    pub x_keys: Vec<String>,
    pub segments: Vec<SeriesSegment>,
}

impl StackedSeries {
    #[must_use]
    pub fn point(&self, segment: &str, x_key: &str) -> Option<SeriesPoint> {
        let x_index = self.x_keys.iter().position(|key| key == x_key)?;
        self.segments
            .iter()
            .find(|series| series.segment == segment)
            .and_then(|series| series.points.get(x_index).copied())
    }

    /// Sum of signed segment heights per axis position.
    #[must_use]
    pub fn totals(&self) -> IndexMap<String, f64> {
        self.x_keys
            .iter()
            .enumerate()
            .map(|(index, key)| {
                let total = self
                    .segments
                    .iter()
                    .filter_map(|series| series.points.get(index))
                    .map(|point| point.height())
                    .sum();
                (key.clone(), total)
            })
            .collect()
    }
}

/// Stacks `entries` along `x_order`, one series per entry of `segment_order`.
///
/// Duplicate `(x, segment)` contributions are summed; missing ones become
/// zero-height points without an observation.
#[must_use]
pub fn stack(
    entries: &[StackEntry],
    x_order: &[String],
    segment_order: &[String],
) -> StackedSeries {
    let mut cells: IndexMap<(&str, &str), (f64, usize)> = IndexMap::new();
    for entry in entries {
        cells
            .entry((entry.x_key.as_str(), entry.segment.as_str()))
            .and_modify(|cell| cell.0 += entry.value)
            .or_insert((entry.value, entry.observation));
    }

    let mut positive = vec![0.0_f64; x_order.len()];
    let mut negative = vec![0.0_f64; x_order.len()];
    let segments = segment_order
        .iter()
        .map(|segment| {
            let points = x_order
                .iter()
                .enumerate()
                .map(|(index, x_key)| {
                    let Some(&(value, observation)) = cells.get(&(x_key.as_str(), segment.as_str()))
                    else {
                        return SeriesPoint {
                            baseline: positive[index],
                            top: positive[index],
                            observation: None,
                        };
                    };
                    let running = if value >= 0.0 {
                        &mut positive[index]
                    } else {
                        &mut negative[index]
                    };
                    let baseline = *running;
                    *running += value;
                    SeriesPoint {
                        baseline,
                        top: *running,
                        observation: Some(observation),
                    }
                })
                .collect();
            SeriesSegment {
                segment: segment.clone(),
                points,
            }
        })
        .collect();

    trace!(
        x_count = x_order.len(),
        segment_count = segment_order.len(),
        "stacked series"
    );
    StackedSeries {
        x_keys: x_order.to_vec(),
        segments,
    }
}

/// Rescales each axis group so its absolute values sum to 100.
#[must_use]
pub fn normalize_to_percent(entries: &[StackEntry]) -> Vec<StackEntry> {
    let mut totals: IndexMap<&str, f64> = IndexMap::new();
    for entry in entries {
        *totals.entry(entry.x_key.as_str()).or_insert(0.0) += entry.value.abs();
    }
    entries
        .iter()
        .map(|entry| {
            let total = totals.get(entry.x_key.as_str()).copied().unwrap_or(0.0);
            let value = if total == 0.0 {
                0.0
            } else {
                entry.value / total * 100.0
            };
            StackEntry {
                value,
                ..entry.clone()
            }
        })
        .collect()
}

/// Value domain of a stacked layout.
///
/// Normalized mode always yields `[0, 100]`. Otherwise a custom domain wins;
/// failing that, the extremes of the per-group positive and negative sums are
/// niced.
#[must_use]
pub fn stacked_domain(
    entries: &[StackEntry],
    normalized: bool,
    custom_domain: Option<[f64; 2]>,
) -> (f64, f64) {
    if normalized {
        return (0.0, 100.0);
    }
    if let Some([start, end]) = custom_domain {
        return (start, end);
    }

    let mut groups: IndexMap<&str, (f64, f64)> = IndexMap::new();
    for entry in entries {
        let sums = groups.entry(entry.x_key.as_str()).or_insert((0.0, 0.0));
        if entry.value >= 0.0 {
            sums.0 += entry.value;
        } else {
            sums.1 += entry.value;
        }
    }

    let (min, max) = groups
        .values()
        .fold((0.0_f64, 0.0_f64), |(min, max), (positive, negative)| {
            (min.min(*negative), max.max(*positive))
        });
    nice_domain(min, max, DEFAULT_TICK_COUNT)
}

#[cfg(test)]
mod tests {
    use super::{StackEntry, normalize_to_percent, stack, stacked_domain};

    fn keys(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| (*value).to_owned()).collect()
    }

    #[test]
    fn negative_values_stack_below_zero() {
        let entries = vec![
            StackEntry::new("a", "s1", 2.0, 0),
            StackEntry::new("a", "s2", -3.0, 1),
            StackEntry::new("a", "s3", 1.0, 2),
        ];
        let series = stack(&entries, &keys(&["a"]), &keys(&["s1", "s2", "s3"]));
        let s2 = series.point("s2", "a").expect("s2");
        assert_eq!((s2.baseline, s2.top), (0.0, -3.0));
        let s3 = series.point("s3", "a").expect("s3");
        assert_eq!((s3.baseline, s3.top), (2.0, 3.0));
        assert_eq!(series.totals()["a"], 0.0);
    }

    #[test]
    fn missing_cells_have_no_observation() {
        let entries = vec![StackEntry::new("a", "s1", 2.0, 0)];
        let series = stack(&entries, &keys(&["a", "b"]), &keys(&["s1"]));
        let missing = series.point("s1", "b").expect("point");
        assert_eq!(missing.observation, None);
        assert_eq!(missing.height(), 0.0);
    }

    #[test]
    fn normalized_groups_sum_to_one_hundred() {
        let entries = vec![
            StackEntry::new("a", "s1", 3.0, 0),
            StackEntry::new("a", "s2", 1.0, 1),
        ];
        let normalized = normalize_to_percent(&entries);
        assert_eq!(normalized[0].value, 75.0);
        assert_eq!(normalized[1].value, 25.0);
        assert_eq!(stacked_domain(&entries, true, Some([-1.0, 1.0])), (0.0, 100.0));
    }
}
