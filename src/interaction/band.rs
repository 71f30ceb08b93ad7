use serde::{Deserialize, Serialize};

use crate::core::Point;
use crate::interaction::HitTarget;
use crate::render::{Color, Paint, Primitive, Shape};

/// Direction categories are laid out along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BandOrientation {
    /// Categories along x (column charts).
    Vertical,
    /// Categories along y (bar charts).
    Horizontal,
}

/// Value-axis pixel span covered by one segment of a category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandSegmentSpan {
    pub segment: Option<String>,
    pub observation: usize,
    /// Pixel span along the value axis, unordered.
    pub span: (f64, f64),
    pub anchor: Point,
}

/// Full-size invisible hit rectangle for one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandHitRegion {
    pub key: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub segments: Vec<BandSegmentSpan>,
}

impl BandHitRegion {
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x < self.x + self.width
            && point.y >= self.y
            && point.y < self.y + self.height
    }
}

/// Band hit testing for column and bar charts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandHitTester {
    orientation: BandOrientation,
    regions: Vec<BandHitRegion>,
}

impl BandHitTester {
    #[must_use]
    pub fn new(orientation: BandOrientation, regions: Vec<BandHitRegion>) -> Self {
        Self {
            orientation,
            regions,
        }
    }

    #[must_use]
    pub fn regions(&self) -> &[BandHitRegion] {
        &self.regions
    }

    /// Category under `pointer`; in stacked layouts the segment whose span holds
    /// the pointer, else the segment closest to it along the value axis.
    #[must_use]
    pub fn hit(&self, pointer: Point) -> Option<HitTarget> {
        if !pointer.is_finite() {
            return None;
        }
        let region = self.regions.iter().find(|region| region.contains(pointer))?;
        let along_value = match self.orientation {
            BandOrientation::Vertical => pointer.y,
            BandOrientation::Horizontal => pointer.x,
        };
        let distance = |span: &BandSegmentSpan| {
            let (lo, hi) = (span.span.0.min(span.span.1), span.span.0.max(span.span.1));
            if along_value < lo {
                lo - along_value
            } else if along_value > hi {
                along_value - hi
            } else {
                0.0
            }
        };
        let mut best: Option<(&BandSegmentSpan, f64)> = None;
        for span in &region.segments {
            let d = distance(span);
            if best.is_none_or(|(_, current)| d < current) {
                best = Some((span, d));
            }
        }
        best.map(|(span, _)| HitTarget::new(span.observation, span.segment.clone(), span.anchor))
    }

    /// Invisible rectangles for the scene, excluded from export.
    #[must_use]
    pub fn primitives(&self) -> Vec<Primitive> {
        self.regions
            .iter()
            .map(|region| {
                Primitive::new(
                    format!("interaction-band:{}", region.key),
                    "interaction-band",
                    Shape::Rect {
                        x: region.x,
                        y: region.y,
                        width: region.width.max(0.0),
                        height: region.height.max(0.0),
                    },
                    Paint::fill(Color::TRANSPARENT).with_opacity(0.0),
                )
                .excluded_from_export()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{BandHitRegion, BandHitTester, BandOrientation, BandSegmentSpan};
    use crate::core::Point;

    #[test]
    fn stacked_band_resolves_segment_under_pointer() {
        let region = BandHitRegion {
            key: "A".to_owned(),
            x: 0.0,
            y: 0.0,
            width: 20.0,
            height: 100.0,
            segments: vec![
                BandSegmentSpan {
                    segment: Some("s1".to_owned()),
                    observation: 0,
                    span: (100.0, 60.0),
                    anchor: Point::new(10.0, 60.0),
                },
                BandSegmentSpan {
                    segment: Some("s2".to_owned()),
                    observation: 1,
                    span: (60.0, 20.0),
                    anchor: Point::new(10.0, 20.0),
                },
            ],
        };
        let tester = BandHitTester::new(BandOrientation::Vertical, vec![region]);
        assert_eq!(tester.hit(Point::new(5.0, 30.0)).map(|t| t.observation), Some(1));
        assert_eq!(tester.hit(Point::new(5.0, 5.0)).map(|t| t.observation), Some(1));
        assert_eq!(tester.hit(Point::new(5.0, 90.0)).map(|t| t.observation), Some(0));
        assert!(tester.hit(Point::new(25.0, 30.0)).is_none());
    }
}
