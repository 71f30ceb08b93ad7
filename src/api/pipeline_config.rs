use serde::{Deserialize, Serialize};

use crate::core::{Margins, Viewport};
use crate::error::{ChartError, ChartResult};
use crate::render::TransitionOptions;

/// Pie slice label tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PieLabelConfig {
    #[serde(default = "default_pie_labels_enabled")]
    pub enabled: bool,
    /// Distance between the outer radius and the label anchor.
    #[serde(default = "default_pie_label_offset_px")]
    pub offset_px: f64,
    /// Space reserved around the pie for labels.
    #[serde(default = "default_pie_label_margin_px")]
    pub margin_px: f64,
    /// Inner radius as a share of the outer radius; non-zero draws a donut.
    #[serde(default)]
    pub inner_radius_ratio: f64,
}

impl Default for PieLabelConfig {
    fn default() -> Self {
        Self {
            enabled: default_pie_labels_enabled(),
            offset_px: default_pie_label_offset_px(),
            margin_px: default_pie_label_margin_px(),
            inner_radius_ratio: 0.0,
        }
    }
}

/// Layout and presentation settings of the render pipeline.
///
/// This type is serializable so host applications can persist chart setup;
/// every field except the viewport has a default so partial documents load.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineConfig {
    pub viewport: Viewport,
    #[serde(default)]
    pub margins: Margins,
    #[serde(default = "default_band_padding_inner")]
    pub band_padding_inner: f64,
    #[serde(default = "default_band_padding_outer")]
    pub band_padding_outer: f64,
    /// Padding between bars of one group in grouped layouts.
    #[serde(default = "default_group_padding")]
    pub group_padding: f64,
    #[serde(default)]
    pub transitions: TransitionOptions,
    #[serde(default)]
    pub pie_labels: PieLabelConfig,
    #[serde(default = "default_linear_tick_count")]
    pub linear_tick_count: usize,
    #[serde(default = "default_time_tick_max_count")]
    pub time_tick_max_count: usize,
    #[serde(default = "default_font_size_px")]
    pub font_size_px: f64,
    #[serde(default = "default_value_label_offset_px")]
    pub value_label_offset_px: f64,
    #[serde(default = "default_point_radius_px")]
    pub point_radius_px: f64,
    #[serde(default = "default_symbol_max_radius_px")]
    pub symbol_max_radius_px: f64,
    #[serde(default = "default_line_width_px")]
    pub line_width_px: f64,
    #[serde(default = "default_table_row_height_px")]
    pub table_row_height_px: f64,
    /// Pointers farther than this from every point do not pick it.
    #[serde(default)]
    pub pick_max_distance_px: Option<f64>,
}

impl PipelineConfig {
    #[must_use]
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            margins: Margins::default(),
            band_padding_inner: default_band_padding_inner(),
            band_padding_outer: default_band_padding_outer(),
            group_padding: default_group_padding(),
            transitions: TransitionOptions::default(),
            pie_labels: PieLabelConfig::default(),
            linear_tick_count: default_linear_tick_count(),
            time_tick_max_count: default_time_tick_max_count(),
            font_size_px: default_font_size_px(),
            value_label_offset_px: default_value_label_offset_px(),
            point_radius_px: default_point_radius_px(),
            symbol_max_radius_px: default_symbol_max_radius_px(),
            line_width_px: default_line_width_px(),
            table_row_height_px: default_table_row_height_px(),
            pick_max_distance_px: None,
        }
    }

    #[must_use]
    pub fn with_margins(mut self, margins: Margins) -> Self {
        self.margins = margins;
        self
    }

    #[must_use]
    pub fn with_band_padding(mut self, inner: f64, outer: f64) -> Self {
        self.band_padding_inner = inner;
        self.band_padding_outer = outer;
        self
    }

    /// Sets transition enablement and duration passed to every render pass.
    #[must_use]
    pub fn with_transitions(mut self, transitions: TransitionOptions) -> Self {
        self.transitions = transitions;
        self
    }

    #[must_use]
    pub fn with_pie_labels(mut self, pie_labels: PieLabelConfig) -> Self {
        self.pie_labels = pie_labels;
        self
    }

    #[must_use]
    pub fn with_linear_tick_count(mut self, count: usize) -> Self {
        self.linear_tick_count = count;
        self
    }

    #[must_use]
    pub fn with_time_tick_max_count(mut self, count: usize) -> Self {
        self.time_tick_max_count = count;
        self
    }

    #[must_use]
    pub fn with_pick_max_distance_px(mut self, distance: Option<f64>) -> Self {
        self.pick_max_distance_px = distance;
        self
    }

    pub fn validate(&self) -> ChartResult<()> {
        if !self.viewport.is_valid() {
            return Err(ChartError::InvalidViewport {
                width: self.viewport.width,
                height: self.viewport.height,
            });
        }
        for (name, value) in [
            ("band padding inner", self.band_padding_inner),
            ("band padding outer", self.band_padding_outer),
            ("group padding", self.group_padding),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(ChartError::Configuration(format!(
                    "{name} must be finite and in [0, 1], got {value}"
                )));
            }
        }
        for (name, value) in [
            ("font size", self.font_size_px),
            ("point radius", self.point_radius_px),
            ("symbol max radius", self.symbol_max_radius_px),
            ("line width", self.line_width_px),
            ("table row height", self.table_row_height_px),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ChartError::Configuration(format!(
                    "{name} must be finite and > 0, got {value}"
                )));
            }
        }
        if !(0.0..1.0).contains(&self.pie_labels.inner_radius_ratio) {
            return Err(ChartError::Configuration(
                "pie inner radius ratio must be in [0, 1)".to_owned(),
            ));
        }
        Ok(())
    }

    pub fn to_json_pretty(&self) -> ChartResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            ChartError::Serialization(format!("failed to serialize pipeline config: {e}"))
        })
    }

    pub fn from_json_str(input: &str) -> ChartResult<Self> {
        serde_json::from_str(input).map_err(|e| {
            ChartError::Serialization(format!("failed to parse pipeline config: {e}"))
        })
    }
}

fn default_band_padding_inner() -> f64 {
    0.2
}

fn default_band_padding_outer() -> f64 {
    0.1
}

fn default_group_padding() -> f64 {
    0.1
}

fn default_linear_tick_count() -> usize {
    5
}

fn default_time_tick_max_count() -> usize {
    8
}

fn default_font_size_px() -> f64 {
    12.0
}

fn default_value_label_offset_px() -> f64 {
    4.0
}

fn default_point_radius_px() -> f64 {
    4.0
}

fn default_symbol_max_radius_px() -> f64 {
    24.0
}

fn default_line_width_px() -> f64 {
    2.0
}

fn default_table_row_height_px() -> f64 {
    24.0
}

fn default_pie_labels_enabled() -> bool {
    true
}

fn default_pie_label_offset_px() -> f64 {
    12.0
}

fn default_pie_label_margin_px() -> f64 {
    40.0
}
