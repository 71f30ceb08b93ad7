//! Typed accessors over observation rows.
//!
//! Accessors are pure functions of an observation; they are created once per
//! configuration by variable binding and never change afterwards.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;

use crate::core::time::{format_time, parse_time};
use crate::core::{Dimension, Observation, TimeUnit};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeasureAccessor {
    component_id: String,
}

impl MeasureAccessor {
    #[must_use]
    pub fn new(component_id: impl Into<String>) -> Self {
        Self {
            component_id: component_id.into(),
        }
    }

    #[must_use]
    pub fn component_id(&self) -> &str {
        &self.component_id
    }

    /// Finite numeric value, `None` for null, missing or `NaN`.
    #[must_use]
    pub fn get(&self, observation: &Observation) -> Option<f64> {
        observation.number(&self.component_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryAccessor {
    component_id: String,
    abbreviations: IndexMap<String, String>,
}

impl CategoryAccessor {
    #[must_use]
    pub fn new(component_id: impl Into<String>) -> Self {
        Self {
            component_id: component_id.into(),
            abbreviations: IndexMap::new(),
        }
    }

    /// Accessor whose labels resolve to the dimension values' alternate names.
    #[must_use]
    pub fn with_abbreviations(dimension: &Dimension) -> Self {
        let abbreviations = dimension
            .values
            .iter()
            .filter_map(|value| {
                value
                    .alternate_name
                    .as_ref()
                    .map(|name| (value.value.clone(), name.clone()))
            })
            .collect();
        Self {
            component_id: dimension.id.clone(),
            abbreviations,
        }
    }

    #[must_use]
    pub fn component_id(&self) -> &str {
        &self.component_id
    }

    /// Stable grouping key: the companion identifier, else the label.
    #[must_use]
    pub fn key(&self, observation: &Observation) -> Option<String> {
        observation.identifier(&self.component_id)
    }

    #[must_use]
    pub fn label(&self, observation: &Observation) -> Option<String> {
        let label = observation.label(&self.component_id)?;
        if self.abbreviations.is_empty() {
            return Some(label);
        }
        let key = self.key(observation);
        Some(
            key.and_then(|key| self.abbreviations.get(&key).cloned())
                .unwrap_or(label),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemporalAccessor {
    component_id: String,
    time_unit: TimeUnit,
    time_format: String,
}

impl TemporalAccessor {
    #[must_use]
    pub fn new(
        component_id: impl Into<String>,
        time_unit: TimeUnit,
        time_format: impl Into<String>,
    ) -> Self {
        Self {
            component_id: component_id.into(),
            time_unit,
            time_format: time_format.into(),
        }
    }

    #[must_use]
    pub fn component_id(&self) -> &str {
        &self.component_id
    }

    #[must_use]
    pub fn time_unit(&self) -> TimeUnit {
        self.time_unit
    }

    #[must_use]
    pub fn get(&self, observation: &Observation) -> Option<DateTime<Utc>> {
        let raw = observation.label(&self.component_id)?;
        parse_time(&raw, &self.time_format)
    }

    /// Raw value used as category key (column/combo charts over time).
    #[must_use]
    pub fn key(&self, observation: &Observation) -> Option<String> {
        observation.label(&self.component_id)
    }

    #[must_use]
    pub fn label(&self, observation: &Observation) -> Option<String> {
        self.get(observation)
            .map(|time| format_time(time, self.time_unit))
    }
}
