use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

use crate::core::Point;
use crate::interaction::HitTarget;

/// Angular sector of one pie slice. Angles run clockwise from twelve o'clock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArcHitRegion {
    pub center: Point,
    pub start_angle: f64,
    pub end_angle: f64,
    pub inner_radius: f64,
    pub outer_radius: f64,
    pub target: HitTarget,
}

impl ArcHitRegion {
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        let dx = point.x - self.center.x;
        let dy = point.y - self.center.y;
        let radius = dx.hypot(dy);
        if radius < self.inner_radius || radius > self.outer_radius {
            return false;
        }
        let angle = dx.atan2(-dy).rem_euclid(TAU);
        angle >= self.start_angle && angle < self.end_angle
    }
}

/// Slice hit testing for pie charts.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ArcHitTester {
    regions: Vec<ArcHitRegion>,
}

impl ArcHitTester {
    #[must_use]
    pub fn new(regions: Vec<ArcHitRegion>) -> Self {
        Self { regions }
    }

    #[must_use]
    pub fn hit(&self, pointer: Point) -> Option<HitTarget> {
        if !pointer.is_finite() {
            return None;
        }
        self.regions
            .iter()
            .find(|region| region.contains(pointer))
            .map(|region| region.target.clone())
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::PI;

    use super::{ArcHitRegion, ArcHitTester};
    use crate::core::Point;
    use crate::interaction::HitTarget;

    #[test]
    fn right_half_slice_is_hit_on_the_right() {
        let center = Point::new(50.0, 50.0);
        let tester = ArcHitTester::new(vec![ArcHitRegion {
            center,
            start_angle: 0.0,
            end_angle: PI,
            inner_radius: 0.0,
            outer_radius: 40.0,
            target: HitTarget::new(0, Some("a".to_owned()), center),
        }]);
        assert!(tester.hit(Point::new(70.0, 50.0)).is_some());
        assert!(tester.hit(Point::new(30.0, 50.0)).is_none());
        assert!(tester.hit(Point::new(95.0, 50.0)).is_none());
    }
}
