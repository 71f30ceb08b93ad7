use serde::{Deserialize, Serialize};

use crate::core::Observation;

/// Externally projected geographic feature.
///
/// Coordinates live in any planar projection; the map builder fits the union
/// of all features into the plot area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoFeature {
    /// Dimension value identifier (or label) the feature belongs to.
    pub key: String,
    #[serde(default)]
    pub rings: Vec<Vec<(f64, f64)>>,
    /// Symbol position; the center of the rings' bounding box when absent.
    #[serde(default)]
    pub centroid: Option<(f64, f64)>,
}

impl GeoFeature {
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            rings: Vec::new(),
            centroid: None,
        }
    }

    #[must_use]
    pub fn with_ring(mut self, ring: Vec<(f64, f64)>) -> Self {
        self.rings.push(ring);
        self
    }

    #[must_use]
    pub fn with_centroid(mut self, x: f64, y: f64) -> Self {
        self.centroid = Some((x, y));
        self
    }

    /// Bounding box of the rings and centroid as `(min_x, min_y, max_x, max_y)`.
    #[must_use]
    pub fn bbox(&self) -> Option<(f64, f64, f64, f64)> {
        self.rings
            .iter()
            .flatten()
            .copied()
            .chain(self.centroid)
            .filter(|(x, y)| x.is_finite() && y.is_finite())
            .fold(None, |acc, (x, y)| match acc {
                Some((x0, y0, x1, y1)) => Some((x0.min(x), y0.min(y), x1.max(x), y1.max(y))),
                None => Some((x, y, x, y)),
            })
    }

    #[must_use]
    pub fn anchor(&self) -> Option<(f64, f64)> {
        self.centroid.or_else(|| {
            self.bbox()
                .map(|(x0, y0, x1, y1)| ((x0 + x1) / 2.0, (y0 + y1) / 2.0))
        })
    }
}

/// Data-side inputs of one render pass.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartInputs {
    pub observations: Vec<Observation>,
    /// Animation frame to show; the first frame in sorted order when absent.
    #[serde(default)]
    pub active_frame: Option<String>,
    #[serde(default)]
    pub geo_features: Vec<GeoFeature>,
}

impl ChartInputs {
    #[must_use]
    pub fn new(observations: Vec<Observation>) -> Self {
        Self {
            observations,
            active_frame: None,
            geo_features: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_active_frame(mut self, frame: impl Into<String>) -> Self {
        self.active_frame = Some(frame.into());
        self
    }

    #[must_use]
    pub fn with_geo_features(mut self, features: Vec<GeoFeature>) -> Self {
        self.geo_features = features;
        self
    }
}
