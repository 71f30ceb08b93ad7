use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};

/// Suffix of the companion field holding a value's stable identifier.
pub const IRI_SUFFIX: &str = "/__iri__";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn is_valid(self) -> bool {
        self.width > 0 && self.height > 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            top: 16.0,
            right: 16.0,
            bottom: 48.0,
            left: 56.0,
        }
    }
}

impl Margins {
    #[must_use]
    pub fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    #[must_use]
    pub fn uniform(margin: f64) -> Self {
        Self::new(margin, margin, margin, margin)
    }
}

/// Outer viewport plus the plot area left after margins.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartBounds {
    pub viewport: Viewport,
    pub margins: Margins,
}

impl ChartBounds {
    pub fn new(viewport: Viewport, margins: Margins) -> ChartResult<Self> {
        if !viewport.is_valid() {
            return Err(ChartError::InvalidViewport {
                width: viewport.width,
                height: viewport.height,
            });
        }
        let bounds = Self { viewport, margins };
        if bounds.chart_width() <= 0.0 || bounds.chart_height() <= 0.0 {
            return Err(ChartError::InvalidData(
                "margins leave no room for the plot area".to_owned(),
            ));
        }
        Ok(bounds)
    }

    #[must_use]
    pub fn chart_width(self) -> f64 {
        f64::from(self.viewport.width) - self.margins.left - self.margins.right
    }

    #[must_use]
    pub fn chart_height(self) -> f64 {
        f64::from(self.viewport.height) - self.margins.top - self.margins.bottom
    }

    #[must_use]
    pub fn left(self) -> f64 {
        self.margins.left
    }

    #[must_use]
    pub fn top(self) -> f64 {
        self.margins.top
    }

    #[must_use]
    pub fn right(self) -> f64 {
        self.margins.left + self.chart_width()
    }

    #[must_use]
    pub fn bottom(self) -> f64 {
        self.margins.top + self.chart_height()
    }

    /// Horizontal plot range, left to right.
    #[must_use]
    pub fn x_range(self) -> (f64, f64) {
        (self.left(), self.right())
    }

    /// Vertical plot range, bottom to top, so larger values map higher.
    #[must_use]
    pub fn y_range(self) -> (f64, f64) {
        (self.bottom(), self.top())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    #[must_use]
    pub fn distance_squared(self, other: Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

/// One cell of an observation row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ObservationValue {
    Number(f64),
    Text(String),
    Null,
}

impl ObservationValue {
    /// Numeric view of the cell. Numeric strings are accepted, `NaN` is not.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        let value = match self {
            Self::Number(value) => *value,
            Self::Text(text) => text.trim().parse::<f64>().ok()?,
            Self::Null => return None,
        };
        value.is_finite().then_some(value)
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text.as_str()),
            Self::Number(_) | Self::Null => None,
        }
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Text rendering used for labels and grouping keys.
    #[must_use]
    pub fn to_label(&self) -> Option<String> {
        match self {
            Self::Text(text) => Some(text.clone()),
            Self::Number(value) if value.is_finite() => Some(value.to_string()),
            Self::Number(_) | Self::Null => None,
        }
    }
}

impl From<f64> for ObservationValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<Option<f64>> for ObservationValue {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Self::Null, Self::Number)
    }
}

impl From<&str> for ObservationValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for ObservationValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Flat record keyed by dimension/measure identifiers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Observation {
    fields: IndexMap<String, ObservationValue>,
}

impl Observation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ObservationValue>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<ObservationValue>) {
        self.fields.insert(key.into(), value.into());
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ObservationValue> {
        self.fields.get(key)
    }

    #[must_use]
    pub fn number(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(ObservationValue::as_f64)
    }

    #[must_use]
    pub fn label(&self, key: &str) -> Option<String> {
        self.get(key).and_then(ObservationValue::to_label)
    }

    /// Companion identifier of `key`, falling back to the label itself.
    #[must_use]
    pub fn identifier(&self, key: &str) -> Option<String> {
        let companion = format!("{key}{IRI_SUFFIX}");
        self.label(&companion).or_else(|| self.label(key))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ObservationValue)> {
        self.fields.iter().map(|(key, value)| (key.as_str(), value))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<ObservationValue>> FromIterator<(K, V)> for Observation {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}
