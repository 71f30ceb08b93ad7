use serde::{Deserialize, Serialize};

use crate::core::Measure;
use crate::core::scale::{DEFAULT_TICK_COUNT, nice_domain};

/// Lower-bound policy for a measure axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MinValueRule {
    /// Axis includes zero; negative data still extends the axis below it.
    Zero,
    /// Axis starts at the data minimum.
    Dynamic,
}

impl MinValueRule {
    #[must_use]
    pub fn for_measure(measure: &Measure) -> Self {
        if measure.allows_dynamic_minimum() {
            Self::Dynamic
        } else {
            Self::Zero
        }
    }
}

/// Extent of the finite values, `None` when there are none.
#[must_use]
pub fn extent(values: impl IntoIterator<Item = f64>) -> Option<(f64, f64)> {
    values
        .into_iter()
        .filter(|value| value.is_finite())
        .fold(None, |acc, value| match acc {
            Some((min, max)) => Some((f64::min(min, value), f64::max(max, value))),
            None => Some((value, value)),
        })
}

/// Niced domain for a non-stacked measure axis.
///
/// A custom domain is returned untouched. Empty input yields `[0, 1]` so the
/// axis remains drawable.
#[must_use]
pub fn measure_domain(
    values: impl IntoIterator<Item = f64>,
    rule: MinValueRule,
    custom_domain: Option<[f64; 2]>,
) -> (f64, f64) {
    if let Some([start, end]) = custom_domain {
        return (start, end);
    }
    let Some((min, max)) = extent(values) else {
        return (0.0, 1.0);
    };
    let min = match rule {
        MinValueRule::Zero => min.min(0.0),
        MinValueRule::Dynamic => min,
    };
    let max = match rule {
        MinValueRule::Zero => max.max(0.0),
        MinValueRule::Dynamic => max,
    };
    nice_domain(min, max, DEFAULT_TICK_COUNT)
}

/// Independent left/right domains for dual-axis charts.
///
/// Each side applies its own measure's minimum rule; the two only share the
/// horizontal extent, which is computed by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DualAxisDomains {
    pub left: (f64, f64),
    pub right: (f64, f64),
}

#[must_use]
pub fn dual_axis_domains(
    left_measure: &Measure,
    left_values: impl IntoIterator<Item = f64>,
    right_measure: &Measure,
    right_values: impl IntoIterator<Item = f64>,
) -> DualAxisDomains {
    DualAxisDomains {
        left: measure_domain(left_values, MinValueRule::for_measure(left_measure), None),
        right: measure_domain(right_values, MinValueRule::for_measure(right_measure), None),
    }
}

#[cfg(test)]
mod tests {
    use super::{MinValueRule, dual_axis_domains, measure_domain};
    use crate::core::{Measure, ScaleType};

    #[test]
    fn single_value_domain_starts_at_zero() {
        let (min, max) = measure_domain([1500.0], MinValueRule::Zero, None);
        assert_eq!(min, 0.0);
        assert!(max >= 1500.0);
    }

    #[test]
    fn dynamic_minimum_follows_data() {
        let (min, _) = measure_domain([12.0, 18.0], MinValueRule::Dynamic, None);
        assert_eq!(min, 12.0);
    }

    #[test]
    fn dual_axes_use_each_measures_rule() {
        let left = Measure::new("count", "Count");
        let right = Measure::new("temp", "Temperature").with_scale_type(ScaleType::Interval);
        let domains = dual_axis_domains(&left, [10.0, 40.0], &right, [-3.0, 21.0]);
        assert_eq!(domains.left, (0.0, 40.0));
        assert_eq!(domains.right, (-4.0, 22.0));
    }
}
