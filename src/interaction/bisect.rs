use ordered_float::OrderedFloat;
use smallvec::SmallVec;

use crate::core::TimeScale;
use crate::interaction::HitTarget;

/// Index of the value nearest to `value` in ascending `sorted`.
///
/// The two entries bracketing the insertion point compete; equal distances
/// resolve to the later one.
#[must_use]
pub fn bisect_nearest(sorted: &[f64], value: f64) -> Option<usize> {
    if sorted.is_empty() || !value.is_finite() {
        return None;
    }
    let insertion = sorted.partition_point(|candidate| *candidate < value);
    let mut candidates: SmallVec<[(OrderedFloat<f64>, usize); 2]> = SmallVec::new();
    if insertion > 0 {
        let index = insertion - 1;
        candidates.push((OrderedFloat((value - sorted[index]).abs()), index));
    }
    if insertion < sorted.len() {
        candidates.push((OrderedFloat((sorted[insertion] - value).abs()), insertion));
    }
    candidates
        .into_iter()
        .min_by(|a, b| a.0.cmp(&b.0).then_with(|| b.1.cmp(&a.1)))
        .map(|(_, index)| index)
}

/// A hit target positioned in time.
#[derive(Debug, Clone, PartialEq)]
pub struct TimedSite {
    pub millis: f64,
    pub target: HitTarget,
}

/// Nearest-in-time picker for single temporal series.
#[derive(Debug, Clone, PartialEq)]
pub struct NearestPointPicker {
    scale: TimeScale,
    times: Vec<f64>,
    targets: Vec<HitTarget>,
}

impl NearestPointPicker {
    /// Sites with a non-finite time are skipped; the rest are sorted by time.
    #[must_use]
    pub fn new(scale: TimeScale, mut sites: Vec<TimedSite>) -> Self {
        sites.retain(|site| site.millis.is_finite());
        sites.sort_by_key(|site| OrderedFloat(site.millis));
        let (times, targets) = sites
            .into_iter()
            .map(|site| (site.millis, site.target))
            .unzip();
        Self {
            scale,
            times,
            targets,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Target nearest to the pointer's time; `None` if its anchor is not finite.
    #[must_use]
    pub fn pick(&self, pointer_x: f64) -> Option<&HitTarget> {
        let millis = self.scale.invert_millis(pointer_x);
        let index = bisect_nearest(&self.times, millis)?;
        let target = self.targets.get(index)?;
        target.anchor.y.is_finite().then_some(target)
    }
}
