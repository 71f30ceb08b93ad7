use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::TimeUnit;
use crate::core::time::{floor_to_unit, from_millis, offset_by_unit, to_millis};
use crate::error::{ChartError, ChartResult};

const E10: f64 = 7.071_067_811_865_476; // sqrt(50)
const E5: f64 = 3.162_277_660_168_379_5; // sqrt(10)
const E2: f64 = std::f64::consts::SQRT_2;

/// Default tick count used when rounding domains.
pub const DEFAULT_TICK_COUNT: usize = 10;

/// Signed tick increment for `count` ticks across `[start, stop]`.
///
/// Positive results are the step itself; negative results encode `-1/step`
/// so sub-unit steps stay exact.
#[must_use]
pub fn tick_increment(start: f64, stop: f64, count: usize) -> f64 {
    let step = (stop - start) / count.max(1) as f64;
    if !step.is_finite() || step <= 0.0 {
        return 0.0;
    }
    let power = step.log10().floor();
    let error = step / 10f64.powf(power);
    let factor = if error >= E10 {
        10.0
    } else if error >= E5 {
        5.0
    } else if error >= E2 {
        2.0
    } else {
        1.0
    };
    if power >= 0.0 {
        factor * 10f64.powf(power)
    } else {
        -(10f64.powf(-power)) / factor
    }
}

/// Extends `[start, stop]` outward to round tick boundaries.
#[must_use]
pub fn nice_domain(start: f64, stop: f64, count: usize) -> (f64, f64) {
    if !start.is_finite() || !stop.is_finite() {
        return (start, stop);
    }
    let reversed = stop < start;
    let (mut lo, mut hi) = if reversed { (stop, start) } else { (start, stop) };
    let mut previous_step: Option<f64> = None;
    // Converges in at most a couple of passes; the bound only guards pathological input.
    for _ in 0..16 {
        let step = tick_increment(lo, hi, count);
        if step == 0.0 || !step.is_finite() || previous_step == Some(step) {
            break;
        }
        if step > 0.0 {
            lo = (lo / step).floor() * step;
            hi = (hi / step).ceil() * step;
        } else {
            lo = (lo * step).ceil() / step;
            hi = (hi * step).floor() / step;
        }
        previous_step = Some(step);
    }
    // Normalize negative zero produced by the sub-unit branch.
    let lo = lo + 0.0;
    let hi = hi + 0.0;
    if reversed { (hi, lo) } else { (lo, hi) }
}

/// Round tick values inside `[start, stop]`.
#[must_use]
pub fn ticks(start: f64, stop: f64, count: usize) -> Vec<f64> {
    if count == 0 || !start.is_finite() || !stop.is_finite() {
        return Vec::new();
    }
    if start == stop {
        return vec![start];
    }
    let reversed = stop < start;
    let (lo, hi) = if reversed { (stop, start) } else { (start, stop) };
    let step = tick_increment(lo, hi, count);
    if step == 0.0 || !step.is_finite() {
        return Vec::new();
    }

    let mut out = Vec::new();
    if step > 0.0 {
        let first = (lo / step).ceil() as i64;
        let last = (hi / step).floor() as i64;
        out.extend((first..=last).map(|i| i as f64 * step));
    } else {
        let inverse = -step;
        let first = (lo * inverse).ceil() as i64;
        let last = (hi * inverse).floor() as i64;
        out.extend((first..=last).map(|i| i as f64 / inverse));
    }
    if reversed {
        out.reverse();
    }
    out
}

/// Continuous domain to range mapping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearScale {
    domain_start: f64,
    domain_end: f64,
    range_start: f64,
    range_end: f64,
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> ChartResult<Self> {
        if !domain.0.is_finite() || !domain.1.is_finite() {
            return Err(ChartError::InvalidData(
                "scale domain must be finite".to_owned(),
            ));
        }
        if !range.0.is_finite() || !range.1.is_finite() {
            return Err(ChartError::InvalidData(
                "scale range must be finite".to_owned(),
            ));
        }

        Ok(Self {
            domain_start: domain.0,
            domain_end: domain.1,
            range_start: range.0,
            range_end: range.1,
        })
    }

    /// Rounds the domain outward to clean tick boundaries.
    #[must_use]
    pub fn nice(self, count: usize) -> Self {
        let (domain_start, domain_end) = nice_domain(self.domain_start, self.domain_end, count);
        Self {
            domain_start,
            domain_end,
            ..self
        }
    }

    #[must_use]
    pub fn domain(self) -> (f64, f64) {
        (self.domain_start, self.domain_end)
    }

    #[must_use]
    pub fn range(self) -> (f64, f64) {
        (self.range_start, self.range_end)
    }

    /// Maps a domain value into the range. A degenerate domain maps to the range midpoint.
    #[must_use]
    pub fn scale(self, value: f64) -> f64 {
        let span = self.domain_end - self.domain_start;
        if span == 0.0 {
            return (self.range_start + self.range_end) / 2.0;
        }
        let normalized = (value - self.domain_start) / span;
        self.range_start + normalized * (self.range_end - self.range_start)
    }

    #[must_use]
    pub fn invert(self, pixel: f64) -> f64 {
        let span = self.range_end - self.range_start;
        if span == 0.0 {
            return self.domain_start;
        }
        let normalized = (pixel - self.range_start) / span;
        self.domain_start + normalized * (self.domain_end - self.domain_start)
    }

    #[must_use]
    pub fn ticks(self, count: usize) -> Vec<f64> {
        ticks(self.domain_start, self.domain_end, count)
    }
}

/// Square-root scale from `[0, max]` onto `[0, range_max]`, used for symbol radii.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SqrtScale {
    domain_max: f64,
    range_max: f64,
}

impl SqrtScale {
    #[must_use]
    pub fn new(domain_max: f64, range_max: f64) -> Self {
        Self {
            domain_max,
            range_max,
        }
    }

    #[must_use]
    pub fn scale(self, value: f64) -> f64 {
        if !value.is_finite() || value <= 0.0 || self.domain_max <= 0.0 {
            return 0.0;
        }
        (value / self.domain_max).sqrt() * self.range_max
    }
}

/// Categorical scale with a fixed per-category width.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandScale {
    domain: IndexMap<String, usize>,
    range: (f64, f64),
    padding_inner: f64,
    padding_outer: f64,
    start: f64,
    step: f64,
    bandwidth: f64,
    reversed: bool,
}

impl BandScale {
    pub fn new(
        domain: Vec<String>,
        range: (f64, f64),
        padding_inner: f64,
        padding_outer: f64,
    ) -> ChartResult<Self> {
        if !(0.0..=1.0).contains(&padding_inner)
            || !padding_outer.is_finite()
            || padding_outer < 0.0
        {
            return Err(ChartError::InvalidData(
                "band padding must be inner in [0, 1] and outer >= 0".to_owned(),
            ));
        }
        if !range.0.is_finite() || !range.1.is_finite() {
            return Err(ChartError::InvalidData(
                "band range must be finite".to_owned(),
            ));
        }

        let mut keyed = IndexMap::with_capacity(domain.len());
        for key in domain {
            let next = keyed.len();
            keyed.entry(key).or_insert(next);
        }

        let count = keyed.len() as f64;
        let reversed = range.1 < range.0;
        let (lo, hi) = if reversed {
            (range.1, range.0)
        } else {
            (range.0, range.1)
        };
        let step = (hi - lo) / (count - padding_inner + padding_outer * 2.0).max(1.0);
        let start = lo + (hi - lo - step * (count - padding_inner)) * 0.5;
        let bandwidth = step * (1.0 - padding_inner);

        Ok(Self {
            domain: keyed,
            range,
            padding_inner,
            padding_outer,
            start,
            step,
            bandwidth,
            reversed,
        })
    }

    pub fn domain(&self) -> impl Iterator<Item = &str> {
        self.domain.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.domain.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.domain.is_empty()
    }

    #[must_use]
    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    #[must_use]
    pub fn step(&self) -> f64 {
        self.step
    }

    #[must_use]
    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    #[must_use]
    pub fn index_of(&self, key: &str) -> Option<usize> {
        self.domain.get(key).copied()
    }

    /// Start coordinate of the band for `key`.
    #[must_use]
    pub fn scale(&self, key: &str) -> Option<f64> {
        self.index_of(key).map(|index| self.band_start(index))
    }

    #[must_use]
    pub fn center(&self, key: &str) -> Option<f64> {
        self.scale(key).map(|start| start + self.bandwidth / 2.0)
    }

    /// Category whose full step (band plus surrounding padding) contains `pixel`.
    #[must_use]
    pub fn invert(&self, pixel: f64) -> Option<&str> {
        if self.domain.is_empty() || !pixel.is_finite() || self.step <= 0.0 {
            return None;
        }
        let gap = (self.step - self.bandwidth) / 2.0;
        let slot = ((pixel - self.start + gap) / self.step).floor();
        if slot < 0.0 || slot >= self.domain.len() as f64 {
            return None;
        }
        let slot = slot as usize;
        let index = if self.reversed {
            self.domain.len() - 1 - slot
        } else {
            slot
        };
        self.domain.get_index(index).map(|(key, _)| key.as_str())
    }

    fn band_start(&self, index: usize) -> f64 {
        let slot = if self.reversed {
            self.domain.len() - 1 - index
        } else {
            index
        };
        self.start + self.step * slot as f64
    }

    #[must_use]
    pub fn padding(&self) -> (f64, f64) {
        (self.padding_inner, self.padding_outer)
    }
}

/// Temporal scale over epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeScale {
    linear: LinearScale,
}

impl TimeScale {
    pub fn new(domain: (DateTime<Utc>, DateTime<Utc>), range: (f64, f64)) -> ChartResult<Self> {
        Ok(Self {
            linear: LinearScale::new((to_millis(domain.0), to_millis(domain.1)), range)?,
        })
    }

    /// Scale spanning the extent of `times`; `None` when `times` is empty.
    pub fn from_extent(
        times: impl IntoIterator<Item = DateTime<Utc>>,
        range: (f64, f64),
    ) -> ChartResult<Option<Self>> {
        let mut extent: Option<(DateTime<Utc>, DateTime<Utc>)> = None;
        for time in times {
            extent = Some(match extent {
                Some((lo, hi)) => (lo.min(time), hi.max(time)),
                None => (time, time),
            });
        }
        extent.map(|domain| Self::new(domain, range)).transpose()
    }

    #[must_use]
    pub fn scale(self, time: DateTime<Utc>) -> f64 {
        self.linear.scale(to_millis(time))
    }

    #[must_use]
    pub fn scale_millis(self, millis: f64) -> f64 {
        self.linear.scale(millis)
    }

    #[must_use]
    pub fn invert(self, pixel: f64) -> Option<DateTime<Utc>> {
        from_millis(self.linear.invert(pixel))
    }

    #[must_use]
    pub fn invert_millis(self, pixel: f64) -> f64 {
        self.linear.invert(pixel)
    }

    #[must_use]
    pub fn domain(self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let (start, end) = self.linear.domain();
        Some((from_millis(start)?, from_millis(end)?))
    }

    #[must_use]
    pub fn range(self) -> (f64, f64) {
        self.linear.range()
    }

    /// Ticks on `unit` boundaries, thinned to at most `max_count` entries.
    #[must_use]
    pub fn ticks(self, unit: TimeUnit, max_count: usize) -> Vec<DateTime<Utc>> {
        let Some((start, end)) = self.domain() else {
            return Vec::new();
        };
        let (start, end) = if end < start { (end, start) } else { (start, end) };
        let mut all = Vec::new();
        let mut cursor = floor_to_unit(start, unit);
        if cursor < start {
            cursor = offset_by_unit(cursor, unit, 1).unwrap_or(end);
        }
        while cursor <= end && all.len() <= 10_000 {
            all.push(cursor);
            match offset_by_unit(cursor, unit, 1) {
                Some(next) if next > cursor => cursor = next,
                _ => break,
            }
        }
        if max_count == 0 {
            return Vec::new();
        }
        let stride = all.len().div_ceil(max_count).max(1);
        all.into_iter().step_by(stride).collect()
    }
}
