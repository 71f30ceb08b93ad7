//! Render data construction and the pipeline facade.
//!
//! [`compute_render_data`] turns inputs plus configuration into a
//! [`ChartScene`]; [`ChartPipeline`] caches scenes per input revision and
//! drives the keyed render engine and the interaction controller.

mod axis_builder;
mod band_chart_builder;
mod chart_builder;
mod combo_chart_builder;
mod inputs;
mod json_contract;
mod line_chart_builder;
mod map_chart_builder;
mod pie_chart_builder;
mod pipeline;
mod pipeline_config;
mod scatter_chart_builder;
mod scene;
mod table_builder;

pub use axis_builder::{AxisPosition, band_axis, linear_axis, time_axis};
pub use inputs::{ChartInputs, GeoFeature};
pub use json_contract::{
    CHART_CONFIG_JSON_SCHEMA_V1, ChartConfigJsonContractV1, PIPELINE_CONFIG_JSON_SCHEMA_V1,
    PipelineConfigJsonContractV1, SCENE_SNAPSHOT_JSON_SCHEMA_V1, SceneSnapshot,
    SceneSnapshotJsonContractV1,
};
pub use pipeline::{ChartPipeline, InputRevisions, compute_render_data};
pub use pipeline_config::{PieLabelConfig, PipelineConfig};
pub use scene::{
    AnimationFrames, ChartScene, LegendEntry, RenderDatum, TableLayout, TableRow, TooltipRow,
    ValueLabel, render_key,
};
