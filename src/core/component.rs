use serde::{Deserialize, Serialize};

/// Measurement level of a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum ScaleType {
    #[default]
    Nominal,
    Ordinal,
    Interval,
    Ratio,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TimeUnit {
    Year,
    Month,
    Week,
    Day,
    Hour,
    Minute,
    Second,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DimensionKind {
    Nominal,
    Ordinal,
    Numerical,
    #[serde(rename_all = "camelCase")]
    Temporal {
        time_unit: TimeUnit,
        time_format: String,
    },
    #[serde(rename_all = "camelCase")]
    TemporalEntity {
        time_unit: TimeUnit,
        time_format: String,
    },
    GeoShapes,
    GeoCoordinates,
}

impl DimensionKind {
    #[must_use]
    pub fn is_temporal(&self) -> bool {
        matches!(self, Self::Temporal { .. })
    }

    #[must_use]
    pub fn is_geographic(&self) -> bool {
        matches!(self, Self::GeoShapes | Self::GeoCoordinates)
    }

    /// Time unit and parse format for temporal kinds.
    #[must_use]
    pub fn time_spec(&self) -> Option<(TimeUnit, &str)> {
        match self {
            Self::Temporal {
                time_unit,
                time_format,
            }
            | Self::TemporalEntity {
                time_unit,
                time_format,
            } => Some((*time_unit, time_format.as_str())),
            Self::Nominal
            | Self::Ordinal
            | Self::Numerical
            | Self::GeoShapes
            | Self::GeoCoordinates => None,
        }
    }
}

/// One entry of a categorical dimension's value domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionValue {
    pub value: String,
    pub label: String,
    #[serde(default)]
    pub alternate_name: Option<String>,
    #[serde(default)]
    pub position: Option<f64>,
    #[serde(default)]
    pub identifier: Option<String>,
    #[serde(default)]
    pub depth: Option<u32>,
    #[serde(default)]
    pub color: Option<String>,
}

impl DimensionValue {
    #[must_use]
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            alternate_name: None,
            position: None,
            identifier: None,
            depth: None,
            color: None,
        }
    }

    #[must_use]
    pub fn with_position(mut self, position: f64) -> Self {
        self.position = Some(position);
        self
    }

    #[must_use]
    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    #[must_use]
    pub fn with_depth(mut self, depth: u32) -> Self {
        self.depth = Some(depth);
        self
    }

    #[must_use]
    pub fn with_alternate_name(mut self, name: impl Into<String>) -> Self {
        self.alternate_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dimension {
    pub id: String,
    pub label: String,
    pub kind: DimensionKind,
    #[serde(default)]
    pub scale_type: ScaleType,
    #[serde(default)]
    pub values: Vec<DimensionValue>,
}

impl Dimension {
    #[must_use]
    pub fn new(id: impl Into<String>, label: impl Into<String>, kind: DimensionKind) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            kind,
            scale_type: ScaleType::Nominal,
            values: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_values(mut self, values: Vec<DimensionValue>) -> Self {
        self.values = values;
        self
    }

    /// Finds value metadata by identifier first, then by label.
    #[must_use]
    pub fn find_value(&self, key: &str) -> Option<&DimensionValue> {
        self.values
            .iter()
            .find(|value| value.value == key)
            .or_else(|| self.values.iter().find(|value| value.label == key))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Measure {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default = "default_measure_scale_type")]
    pub scale_type: ScaleType,
}

fn default_measure_scale_type() -> ScaleType {
    ScaleType::Ratio
}

impl Measure {
    #[must_use]
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            unit: None,
            scale_type: default_measure_scale_type(),
        }
    }

    #[must_use]
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    #[must_use]
    pub fn with_scale_type(mut self, scale_type: ScaleType) -> Self {
        self.scale_type = scale_type;
        self
    }

    /// Interval measures have no natural zero, so their axis may start at the data minimum.
    #[must_use]
    pub fn allows_dynamic_minimum(&self) -> bool {
        matches!(self.scale_type, ScaleType::Interval)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ComponentRef<'a> {
    Dimension(&'a Dimension),
    Measure(&'a Measure),
}

/// Component metadata resolved by the data-fetching collaborator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Components {
    #[serde(default)]
    pub dimensions: Vec<Dimension>,
    #[serde(default)]
    pub measures: Vec<Measure>,
}

impl Components {
    #[must_use]
    pub fn new(dimensions: Vec<Dimension>, measures: Vec<Measure>) -> Self {
        Self {
            dimensions,
            measures,
        }
    }

    #[must_use]
    pub fn find(&self, id: &str) -> Option<ComponentRef<'_>> {
        self.dimensions
            .iter()
            .find(|dimension| dimension.id == id)
            .map(ComponentRef::Dimension)
            .or_else(|| {
                self.measures
                    .iter()
                    .find(|measure| measure.id == id)
                    .map(ComponentRef::Measure)
            })
    }
}
