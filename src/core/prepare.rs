//! Data preparation: plottable-row filtering and temporal imputation.

use indexmap::IndexMap;
use ordered_float::OrderedFloat;
use tracing::debug;

use crate::core::accessor::{CategoryAccessor, MeasureAccessor, TemporalAccessor};
use crate::core::time::to_millis;
use crate::core::{ImputationType, Observation, ObservationValue};

/// Keeps rows where every required measure yields a finite number.
#[must_use]
pub fn prepare(observations: &[Observation], required: &[&MeasureAccessor]) -> Vec<Observation> {
    let plottable: Vec<Observation> = observations
        .iter()
        .filter(|observation| required.iter().all(|accessor| accessor.get(observation).is_some()))
        .cloned()
        .collect();
    debug!(
        input_count = observations.len(),
        plottable_count = plottable.len(),
        "prepared observations"
    );
    plottable
}

/// Fills gaps of a time-sorted series.
///
/// `series` holds `(time, value)` pairs with `time` in any monotonic unit.
/// `Linear` interpolates between the nearest present neighbours proportionally
/// to elapsed time; without a neighbour on both sides the gap becomes `0`.
#[must_use]
pub fn impute_series(
    series: &[(f64, Option<f64>)],
    imputation: ImputationType,
) -> Vec<Option<f64>> {
    match imputation {
        ImputationType::None => series.iter().map(|(_, value)| *value).collect(),
        ImputationType::Zeros => series
            .iter()
            .map(|(_, value)| Some(value.unwrap_or(0.0)))
            .collect(),
        ImputationType::Linear => series
            .iter()
            .enumerate()
            .map(|(index, (time, value))| {
                if value.is_some() {
                    return *value;
                }
                let previous = series[..index]
                    .iter()
                    .rev()
                    .find_map(|(t, v)| v.map(|v| (*t, v)));
                let next = series[index + 1..]
                    .iter()
                    .find_map(|(t, v)| v.map(|v| (*t, v)));
                match (previous, next) {
                    (Some((t0, v0)), Some((t1, v1))) => {
                        let span = t1 - t0;
                        if span == 0.0 {
                            Some(v0)
                        } else {
                            Some(v0 + (v1 - v0) * (time - t0) / span)
                        }
                    }
                    _ => Some(0.0),
                }
            })
            .collect(),
    }
}

/// Completes every segment to the full set of observed times and imputes the gaps.
///
/// Rows whose time cannot be parsed are passed through unchanged. Synthesized
/// rows copy the segment's first row and replace its time and measure.
#[must_use]
pub fn impute_observations(
    observations: &[Observation],
    x: &TemporalAccessor,
    y: &MeasureAccessor,
    segment: Option<&CategoryAccessor>,
    imputation: ImputationType,
) -> Vec<Observation> {
    if imputation == ImputationType::None {
        return observations.to_vec();
    }

    let mut raw_times: IndexMap<OrderedFloat<f64>, ObservationValue> = IndexMap::new();
    let mut groups: IndexMap<String, IndexMap<OrderedFloat<f64>, Observation>> = IndexMap::new();
    let mut passthrough = Vec::new();
    for observation in observations {
        let Some(time) = x.get(observation) else {
            passthrough.push(observation.clone());
            continue;
        };
        let millis = OrderedFloat(to_millis(time));
        if let Some(raw) = observation.get(x.component_id()) {
            raw_times.entry(millis).or_insert_with(|| raw.clone());
        }
        let group_key = segment
            .and_then(|accessor| accessor.key(observation))
            .unwrap_or_default();
        groups
            .entry(group_key)
            .or_default()
            .entry(millis)
            .or_insert_with(|| observation.clone());
    }
    raw_times.sort_keys();

    let mut imputed_count = 0_usize;
    let mut out = Vec::with_capacity(raw_times.len() * groups.len().max(1) + passthrough.len());
    for rows in groups.values() {
        let Some(template) = rows.values().next() else {
            continue;
        };
        let series: Vec<(f64, Option<f64>)> = raw_times
            .keys()
            .map(|time| (time.0, rows.get(time).and_then(|row| y.get(row))))
            .collect();
        let values = impute_series(&series, imputation);
        for ((time, raw), value) in raw_times.iter().zip(values) {
            let mut row = match rows.get(time) {
                Some(row) => row.clone(),
                None => {
                    let mut row = template.clone();
                    row.set(x.component_id(), raw.clone());
                    row
                }
            };
            if y.get(&row) != value {
                imputed_count += 1;
            }
            row.set(y.component_id(), value);
            out.push(row);
        }
    }
    out.extend(passthrough);

    debug!(
        imputation = ?imputation,
        segment_count = groups.len(),
        imputed_count,
        "imputed temporal series"
    );
    out
}

#[cfg(test)]
mod tests {
    use super::{impute_series, prepare};
    use crate::core::accessor::MeasureAccessor;
    use crate::core::{ImputationType, Observation, ObservationValue};

    #[test]
    fn rows_with_null_or_nan_measures_are_dropped() {
        let rows = vec![
            Observation::new().with("v", 1.0),
            Observation::new().with("v", ObservationValue::Null),
            Observation::new().with("v", f64::NAN),
            Observation::new().with("other", 2.0),
        ];
        let accessor = MeasureAccessor::new("v");
        assert_eq!(prepare(&rows, &[&accessor]).len(), 1);
    }

    #[test]
    fn leading_and_trailing_gaps_fall_back_to_zero() {
        let series = vec![(0.0, None), (1.0, Some(4.0)), (2.0, None)];
        let values = impute_series(&series, ImputationType::Linear);
        assert_eq!(values, vec![Some(0.0), Some(4.0), Some(0.0)]);
    }

    // A present value at index 0 is a valid left neighbour, not a missing one.
    #[test]
    fn gap_after_a_value_at_index_zero_interpolates() {
        let series = vec![(0.0, Some(2.0)), (1.0, None), (2.0, Some(4.0))];
        let values = impute_series(&series, ImputationType::Linear);
        assert_eq!(values[1], Some(3.0));
    }

    #[test]
    fn linear_gaps_follow_elapsed_time() {
        let series = vec![(10.0, Some(0.0)), (13.0, None), (20.0, Some(10.0))];
        let values = impute_series(&series, ImputationType::Linear);
        assert_eq!(values[1], Some(3.0));
    }
}
