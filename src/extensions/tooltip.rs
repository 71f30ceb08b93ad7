use serde::{Deserialize, Serialize};

use crate::api::ChartScene;
use crate::core::{ChartType, Point};
use crate::interaction::{InteractionKind, InteractionState};
use crate::render::Color;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TooltipContentRow {
    /// Segment or measure label; absent for unsegmented charts.
    pub label: Option<String>,
    pub value_text: String,
    pub color: Color,
    /// Row of the hovered observation itself.
    pub highlighted: bool,
}

/// Text content of a tooltip or pinned annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TooltipContent {
    pub kind: InteractionKind,
    pub header: Option<String>,
    pub rows: Vec<TooltipContentRow>,
    pub anchor: Option<Point>,
}

/// How a chart type arranges its tooltip.
#[derive(Debug, Clone, Copy)]
struct TooltipLayout {
    /// Every row sharing the hovered category is listed.
    lists_group: bool,
    /// The segment names the tooltip, so rows carry no label of their own.
    segment_header: bool,
}

impl TooltipLayout {
    fn for_chart(chart_type: ChartType) -> Self {
        match chart_type {
            ChartType::Column | ChartType::Bar | ChartType::ComboLineColumn => Self {
                lists_group: true,
                segment_header: false,
            },
            ChartType::Pie => Self {
                lists_group: false,
                segment_header: true,
            },
            ChartType::Line
            | ChartType::Area
            | ChartType::Scatter
            | ChartType::Table
            | ChartType::Map
            | ChartType::ComboLineSingle
            | ChartType::ComboLineDual => Self {
                lists_group: false,
                segment_header: false,
            },
        }
    }
}

impl TooltipContent {
    /// Content for the active interaction, `None` when nothing is shown.
    ///
    /// Band-based charts list every row of the hovered category; other charts
    /// show the hovered row only.
    #[must_use]
    pub fn from_state(scene: &ChartScene, state: &InteractionState) -> Option<Self> {
        if !state.is_active() {
            return None;
        }
        let index = state.observation_index?;
        let primary = scene.tooltip_row(index, state.segment.as_deref())?;

        let layout = TooltipLayout::for_chart(scene.chart_type);
        let rows = if layout.lists_group && primary.group.is_some() {
            scene
                .tooltip_rows
                .iter()
                .filter(|row| row.group == primary.group)
                .collect()
        } else {
            vec![primary]
        };

        let header = if layout.segment_header {
            primary.segment_label.clone()
        } else {
            primary.axis_label.clone()
        };
        let rows = rows
            .into_iter()
            .map(|row| TooltipContentRow {
                label: if layout.segment_header {
                    None
                } else {
                    row.segment_label.clone()
                },
                value_text: row.value_text.clone(),
                color: row.color,
                highlighted: std::ptr::eq(row, primary),
            })
            .collect();
        Some(Self {
            kind: state.kind,
            header,
            rows,
            anchor: state.anchor,
        })
    }
}
