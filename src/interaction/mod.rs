//! Pointer state and hit testing.
//!
//! Hit testers resolve a pointer position into a [`HitTarget`]; the
//! [`InteractionController`] owns the single [`InteractionState`] record and
//! notifies listeners. Hit testing never fails: an unmatched pointer hides the
//! active state.

mod arc;
mod band;
mod bisect;
mod controller;
mod voronoi;

pub use arc::{ArcHitRegion, ArcHitTester};
pub use band::{BandHitRegion, BandHitTester, BandOrientation, BandSegmentSpan};
pub use bisect::{NearestPointPicker, TimedSite, bisect_nearest};
pub use controller::{HitTester, InteractionController};
pub use voronoi::VoronoiPicker;

use serde::{Deserialize, Serialize};

use crate::core::{Observation, Point};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InteractionKind {
    #[default]
    None,
    Tooltip,
    Annotation,
}

/// Observation and segment resolved under the pointer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HitTarget {
    /// Index into the scene's plottable observations.
    pub observation: usize,
    pub segment: Option<String>,
    /// Pixel position tooltips and annotations attach to.
    pub anchor: Point,
}

impl HitTarget {
    #[must_use]
    pub fn new(observation: usize, segment: Option<String>, anchor: Point) -> Self {
        Self {
            observation,
            segment,
            anchor,
        }
    }
}

/// Shared interaction record. Written only by the controller.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionState {
    pub kind: InteractionKind,
    pub visible: bool,
    pub observation_index: Option<usize>,
    pub observation: Option<Observation>,
    pub segment: Option<String>,
    pub pointer: Option<Point>,
    pub anchor: Option<Point>,
}

impl InteractionState {
    #[must_use]
    pub fn hidden() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.visible && self.kind != InteractionKind::None
    }
}

/// Event delivered to interaction listeners.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InteractionEvent {
    Hover {
        target: HitTarget,
        pointer: Point,
    },
    Unhover,
    Click {
        target: HitTarget,
        pointer: Point,
    },
}
