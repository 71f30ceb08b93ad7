use serde::{Deserialize, Serialize};

use crate::core::{ChartConfig, ChartType, Viewport};
use crate::error::{ChartError, ChartResult};
use crate::render::Primitive;

use super::{AnimationFrames, ChartScene, LegendEntry, PipelineConfig, TableLayout, TooltipRow};

pub const CHART_CONFIG_JSON_SCHEMA_V1: u32 = 1;
pub const PIPELINE_CONFIG_JSON_SCHEMA_V1: u32 = 1;
pub const SCENE_SNAPSHOT_JSON_SCHEMA_V1: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartConfigJsonContractV1 {
    pub schema_version: u32,
    pub config: ChartConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfigJsonContractV1 {
    pub schema_version: u32,
    pub pipeline_config: PipelineConfig,
}

/// Serializable view of a scene: the flattened frame plus tooltip and legend content.
///
/// Hit testers and source observations are runtime state and are not part of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneSnapshot {
    pub chart_type: ChartType,
    pub viewport: Viewport,
    pub primitives: Vec<Primitive>,
    #[serde(default)]
    pub tooltip_rows: Vec<TooltipRow>,
    #[serde(default)]
    pub legend: Vec<LegendEntry>,
    #[serde(default)]
    pub table: Option<TableLayout>,
    #[serde(default)]
    pub animation: AnimationFrames,
    #[serde(default)]
    pub hint: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneSnapshotJsonContractV1 {
    pub schema_version: u32,
    pub snapshot: SceneSnapshot,
}

fn unsupported_version(what: &str, version: u32) -> ChartError {
    ChartError::Serialization(format!("unsupported {what} schema version: {version}"))
}

impl ChartConfig {
    pub fn to_json_contract_v1_pretty(&self) -> ChartResult<String> {
        let payload = ChartConfigJsonContractV1 {
            schema_version: CHART_CONFIG_JSON_SCHEMA_V1,
            config: self.clone(),
        };
        serde_json::to_string_pretty(&payload).map_err(|e| {
            ChartError::Serialization(format!("failed to serialize chart config contract v1: {e}"))
        })
    }

    /// Accepts either a bare config document or the versioned wrapper.
    pub fn from_json_compat_str(input: &str) -> ChartResult<Self> {
        if let Ok(config) = serde_json::from_str::<ChartConfig>(input) {
            return Ok(config);
        }
        let payload: ChartConfigJsonContractV1 = serde_json::from_str(input).map_err(|e| {
            ChartError::Serialization(format!("failed to parse chart config json payload: {e}"))
        })?;
        if payload.schema_version != CHART_CONFIG_JSON_SCHEMA_V1 {
            return Err(unsupported_version("chart config", payload.schema_version));
        }
        Ok(payload.config)
    }
}

impl PipelineConfig {
    pub fn to_json_contract_v1_pretty(&self) -> ChartResult<String> {
        let payload = PipelineConfigJsonContractV1 {
            schema_version: PIPELINE_CONFIG_JSON_SCHEMA_V1,
            pipeline_config: *self,
        };
        serde_json::to_string_pretty(&payload).map_err(|e| {
            ChartError::Serialization(format!(
                "failed to serialize pipeline config contract v1: {e}"
            ))
        })
    }

    pub fn from_json_compat_str(input: &str) -> ChartResult<Self> {
        if let Ok(config) = serde_json::from_str::<PipelineConfig>(input) {
            return Ok(config);
        }
        let payload: PipelineConfigJsonContractV1 = serde_json::from_str(input).map_err(|e| {
            ChartError::Serialization(format!("failed to parse pipeline config json payload: {e}"))
        })?;
        if payload.schema_version != PIPELINE_CONFIG_JSON_SCHEMA_V1 {
            return Err(unsupported_version("pipeline config", payload.schema_version));
        }
        Ok(payload.pipeline_config)
    }
}

impl SceneSnapshot {
    pub fn to_json_contract_v1_pretty(&self) -> ChartResult<String> {
        let payload = SceneSnapshotJsonContractV1 {
            schema_version: SCENE_SNAPSHOT_JSON_SCHEMA_V1,
            snapshot: self.clone(),
        };
        serde_json::to_string_pretty(&payload).map_err(|e| {
            ChartError::Serialization(format!(
                "failed to serialize scene snapshot contract v1: {e}"
            ))
        })
    }

    pub fn from_json_compat_str(input: &str) -> ChartResult<Self> {
        if let Ok(snapshot) = serde_json::from_str::<SceneSnapshot>(input) {
            return Ok(snapshot);
        }
        let payload: SceneSnapshotJsonContractV1 = serde_json::from_str(input).map_err(|e| {
            ChartError::Serialization(format!("failed to parse scene snapshot json payload: {e}"))
        })?;
        if payload.schema_version != SCENE_SNAPSHOT_JSON_SCHEMA_V1 {
            return Err(unsupported_version("scene snapshot", payload.schema_version));
        }
        Ok(payload.snapshot)
    }
}

impl ChartScene {
    #[must_use]
    pub fn snapshot(&self) -> SceneSnapshot {
        SceneSnapshot {
            chart_type: self.chart_type,
            viewport: self.bounds.viewport,
            primitives: self.to_frame().primitives,
            tooltip_rows: self.tooltip_rows.clone(),
            legend: self.legend.clone(),
            table: self.table.clone(),
            animation: self.animation.clone(),
            hint: self.hint.clone(),
        }
    }

    pub fn snapshot_json_contract_v1_pretty(&self) -> ChartResult<String> {
        self.snapshot().to_json_contract_v1_pretty()
    }
}
