use serde::{Deserialize, Serialize};

use crate::core::{ChartBounds, ChartType, Observation};
use crate::interaction::HitTester;
use crate::render::{Color, Paint, Primitive, RenderFrame, Shape, TextHAlign};

/// Joins render-key parts with `|`, omitting absent parts.
#[must_use]
pub fn render_key<'a>(parts: impl IntoIterator<Item = Option<&'a str>>) -> String {
    parts.into_iter().flatten().collect::<Vec<_>>().join("|")
}

/// Text drawn next to a datum when values are shown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueLabel {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub h_align: TextHAlign,
}

/// Stable-keyed geometry record for one visual element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderDatum {
    pub key: String,
    pub class_name: String,
    pub shape: Shape,
    /// Geometry entered from and exited to; derived from `shape` when absent.
    pub collapsed: Option<Shape>,
    pub paint: Paint,
    pub value_label: Option<ValueLabel>,
    pub observation: Option<usize>,
    pub segment: Option<String>,
}

impl RenderDatum {
    #[must_use]
    pub fn new(key: String, class_name: &str, shape: Shape, paint: Paint) -> Self {
        Self {
            key,
            class_name: class_name.to_owned(),
            shape,
            collapsed: None,
            paint,
            value_label: None,
            observation: None,
            segment: None,
        }
    }

    #[must_use]
    pub fn with_source(mut self, observation: Option<usize>, segment: Option<String>) -> Self {
        self.observation = observation;
        self.segment = segment;
        self
    }

    #[must_use]
    pub fn with_collapsed(mut self, collapsed: Shape) -> Self {
        self.collapsed = Some(collapsed);
        self
    }

    #[must_use]
    pub fn with_value_label(mut self, label: Option<ValueLabel>) -> Self {
        self.value_label = label;
        self
    }

    fn primitives(&self, font_size_px: f64) -> impl Iterator<Item = Primitive> + '_ {
        let mut shape = Primitive::new(
            self.key.clone(),
            self.class_name.clone(),
            self.shape.clone(),
            self.paint,
        );
        shape.collapsed = self.collapsed.clone();
        let label = self.value_label.as_ref().map(|label| {
            Primitive::new(
                format!("{}|value", self.key),
                "value-label",
                Shape::Text {
                    x: label.x,
                    y: label.y,
                    text: label.text.clone(),
                    font_size_px,
                    h_align: label.h_align,
                },
                Paint::fill(Color::TEXT),
            )
        });
        std::iter::once(shape).chain(label)
    }
}

/// Per-observation content tooltips and annotations are built from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TooltipRow {
    pub observation: usize,
    /// Axis category (or time) key the observation belongs to.
    pub group: Option<String>,
    pub axis_label: Option<String>,
    pub segment: Option<String>,
    pub segment_label: Option<String>,
    pub value_text: String,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendEntry {
    pub key: String,
    pub label: String,
    pub color: Color,
}

/// Header and body rows of a table chart.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TableLayout {
    pub header: Vec<String>,
    pub rows: Vec<TableRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    pub observation: usize,
    pub cells: Vec<String>,
}

/// Animation frame values and the active one.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnimationFrames {
    pub frames: Vec<String>,
    pub active: Option<String>,
}

/// Everything one render pass produces.
///
/// A scene is a pure function of the pipeline inputs; recomputing it yields an
/// identical value.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartScene {
    pub chart_type: ChartType,
    pub bounds: ChartBounds,
    /// Plottable observations of the active frame; data and hit targets index into it.
    pub observations: Vec<Observation>,
    pub data: Vec<RenderDatum>,
    pub axes: Vec<Primitive>,
    pub overlays: Vec<Primitive>,
    pub tooltip_rows: Vec<TooltipRow>,
    pub legend: Vec<LegendEntry>,
    pub table: Option<TableLayout>,
    pub animation: AnimationFrames,
    /// User-visible explanation when the configuration cannot be drawn.
    pub hint: Option<String>,
    pub hit_tester: HitTester,
    pub font_size_px: f64,
}

impl ChartScene {
    #[must_use]
    pub fn empty(chart_type: ChartType, bounds: ChartBounds, font_size_px: f64) -> Self {
        Self {
            chart_type,
            bounds,
            observations: Vec::new(),
            data: Vec::new(),
            axes: Vec::new(),
            overlays: Vec::new(),
            tooltip_rows: Vec::new(),
            legend: Vec::new(),
            table: None,
            animation: AnimationFrames::default(),
            hint: None,
            hit_tester: HitTester::None,
            font_size_px,
        }
    }

    /// Scene carrying only a centered hint text.
    #[must_use]
    pub fn with_hint(
        chart_type: ChartType,
        bounds: ChartBounds,
        font_size_px: f64,
        hint: String,
    ) -> Self {
        let mut scene = Self::empty(chart_type, bounds, font_size_px);
        scene.overlays.push(Primitive::new(
            "hint",
            "hint",
            Shape::Text {
                x: f64::from(bounds.viewport.width) / 2.0,
                y: f64::from(bounds.viewport.height) / 2.0,
                text: hint.clone(),
                font_size_px,
                h_align: TextHAlign::Center,
            },
            Paint::fill(Color::TEXT),
        ));
        scene.hint = Some(hint);
        scene
    }

    pub fn data_by_class<'a>(
        &'a self,
        class_name: &'a str,
    ) -> impl Iterator<Item = &'a RenderDatum> {
        self.data
            .iter()
            .filter(move |datum| datum.class_name == class_name)
    }

    #[must_use]
    pub fn tooltip_row(&self, observation: usize, segment: Option<&str>) -> Option<&TooltipRow> {
        self.tooltip_rows
            .iter()
            .find(|row| {
                row.observation == observation
                    && (segment.is_none() || row.segment.as_deref() == segment)
            })
            .or_else(|| self.tooltip_rows.iter().find(|row| row.observation == observation))
    }

    /// Flattens the scene in paint order: axes, data, value labels, overlays.
    #[must_use]
    pub fn to_frame(&self) -> RenderFrame {
        let mut frame = RenderFrame::new(self.bounds.viewport);
        frame.extend(self.axes.iter().cloned());
        let (shapes, labels): (Vec<Primitive>, Vec<Primitive>) = self
            .data
            .iter()
            .flat_map(|datum| datum.primitives(self.font_size_px))
            .partition(|primitive| primitive.class_name != "value-label");
        frame.extend(shapes);
        frame.extend(labels);
        frame.extend(self.overlays.iter().cloned());
        frame
    }
}
