//! Pie slices and their outside labels.

use std::f64::consts::TAU;

use tracing::{debug, trace};

use crate::api::chart_builder::{BuildContext, SegmentPalette};
use crate::api::scene::{ChartScene, RenderDatum, TooltipRow, ValueLabel};
use crate::core::format::{format_value, format_with_unit};
use crate::core::variables::PieVariables;
use crate::core::{ChartType, Observation, Point};
use crate::error::ChartResult;
use crate::interaction::{ArcHitRegion, ArcHitTester, HitTarget, HitTester};
use crate::render::{Paint, Shape, TextHAlign};

/// Average glyph advance as a share of the font size.
const GLYPH_WIDTH_RATIO: f64 = 0.6;

/// Axis-aligned box a label would occupy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct LabelBox {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl LabelBox {
    /// Estimated extent of `text` anchored at `(x, y)` on its baseline.
    pub fn estimate(text: &str, x: f64, y: f64, font_size_px: f64, h_align: TextHAlign) -> Self {
        let width = text.chars().count() as f64 * font_size_px * GLYPH_WIDTH_RATIO;
        let (x0, x1) = match h_align {
            TextHAlign::Left => (x, x + width),
            TextHAlign::Center => (x - width / 2.0, x + width / 2.0),
            TextHAlign::Right => (x - width, x),
        };
        Self {
            x0,
            y0: y - font_size_px,
            x1,
            y1: y,
        }
    }

    pub fn overlaps(&self, other: &Self) -> bool {
        self.x0 < other.x1 && other.x0 < self.x1 && self.y0 < other.y1 && other.y0 < self.y1
    }
}

/// Accepts boxes in order, rejecting any that overlaps an accepted one or
/// leaves the horizontal range `[left, right]`.
pub(crate) fn place_labels(boxes: &[LabelBox], horizontal: (f64, f64)) -> Vec<bool> {
    let mut placed: Vec<LabelBox> = Vec::with_capacity(boxes.len());
    boxes
        .iter()
        .map(|candidate| {
            let inside = candidate.x0 >= horizontal.0 && candidate.x1 <= horizontal.1;
            let accepted = inside && placed.iter().all(|other| !candidate.overlaps(other));
            if accepted {
                placed.push(*candidate);
            }
            accepted
        })
        .collect()
}

struct Slice {
    segment: String,
    observation: usize,
    value: f64,
}

pub(crate) fn build_pie_chart(
    vars: &PieVariables,
    ctx: &BuildContext<'_>,
) -> ChartResult<ChartScene> {
    let mut scene = ChartScene::empty(ChartType::Pie, ctx.bounds, ctx.config.font_size_px);
    let value_of = |row: &Observation| vars.y.accessor.get(row);
    let segment = Some(&vars.segment);
    let palette = SegmentPalette::new(segment, ctx.all_rows, ctx.rows, value_of);

    let mut slices: Vec<Slice> = Vec::new();
    for key in &palette.keys {
        let mut observation = None;
        let mut value = 0.0;
        for (index, row) in ctx.rows.iter().enumerate() {
            if vars.segment.accessor.key(row).as_deref() != Some(key.as_str()) {
                continue;
            }
            if let Some(row_value) = value_of(row).filter(|row_value| *row_value > 0.0) {
                value += row_value;
                observation.get_or_insert(index);
            }
        }
        if let Some(observation) = observation {
            slices.push(Slice {
                segment: key.clone(),
                observation,
                value,
            });
        }
    }
    let total: f64 = slices.iter().map(|slice| slice.value).sum();
    if slices.is_empty() || total <= 0.0 {
        return Ok(scene);
    }

    let bounds = ctx.bounds;
    let labels = &ctx.config.pie_labels;
    let font_size = ctx.config.font_size_px;
    let reserved = if labels.enabled { labels.margin_px } else { 0.0 };
    let outer_radius = (bounds.chart_width().min(bounds.chart_height()) / 2.0 - reserved).max(0.0);
    let inner_radius = outer_radius * labels.inner_radius_ratio.clamp(0.0, 1.0);
    let center = Point::new(
        bounds.left() + bounds.chart_width() / 2.0,
        bounds.top() + bounds.chart_height() / 2.0,
    );
    let unit = vars.y.measure.unit.as_deref();

    let mut angle = 0.0;
    let mut regions = Vec::with_capacity(slices.len());
    let mut label_candidates = Vec::with_capacity(slices.len());
    for slice in &slices {
        let start_angle = angle;
        let end_angle = (angle + slice.value / total * TAU).min(TAU);
        angle = end_angle;
        let segment_key = palette.public_key(&slice.segment);
        let color = palette.color(&slice.segment);
        let mid = (start_angle + end_angle) / 2.0;

        scene.data.push(
            RenderDatum::new(
                ctx.datum_key("pie", &[Some(slice.segment.as_str())]),
                "pie",
                Shape::Arc {
                    start_angle,
                    end_angle,
                    inner_radius,
                    outer_radius,
                    center_x: center.x,
                    center_y: center.y,
                },
                Paint::fill(color),
            )
            .with_source(Some(slice.observation), segment_key.clone()),
        );
        scene.tooltip_rows.push(TooltipRow {
            observation: slice.observation,
            group: None,
            axis_label: None,
            segment: segment_key.clone(),
            segment_label: palette.label(&slice.segment),
            value_text: format_with_unit(slice.value, unit),
            color,
        });

        let anchor_radius = (inner_radius + outer_radius) / 2.0;
        regions.push(ArcHitRegion {
            center,
            start_angle,
            end_angle,
            inner_radius,
            outer_radius,
            target: HitTarget::new(
                slice.observation,
                segment_key,
                Point::new(
                    center.x + anchor_radius * mid.sin(),
                    center.y - anchor_radius * mid.cos(),
                ),
            ),
        });

        if labels.enabled {
            let label = palette.label(&slice.segment).unwrap_or_else(|| slice.segment.clone());
            let text = if vars.y.show_values {
                format!("{label}: {}", format_value(slice.value))
            } else {
                label
            };
            let radius = outer_radius + labels.offset_px;
            let x = center.x + radius * mid.sin();
            let y = center.y - radius * mid.cos() + font_size / 3.0;
            let h_align = if mid.sin() >= 0.0 {
                TextHAlign::Left
            } else {
                TextHAlign::Right
            };
            label_candidates.push(ValueLabel { text, x, y, h_align });
        }
    }

    let boxes: Vec<LabelBox> = label_candidates
        .iter()
        .map(|label| LabelBox::estimate(&label.text, label.x, label.y, font_size, label.h_align))
        .collect();
    let accepted = place_labels(&boxes, (0.0, f64::from(bounds.viewport.width)));
    let mut label_iter = label_candidates.into_iter().zip(accepted);
    if labels.enabled {
        for datum in &mut scene.data {
            let Some((label, accepted)) = label_iter.next() else {
                break;
            };
            if accepted {
                datum.value_label = Some(label);
            } else {
                trace!(key = %datum.key, "pie label rejected by overlap check");
            }
        }
    }

    scene.hit_tester = HitTester::Arcs(ArcHitTester::new(regions));
    scene.legend = palette.legend();
    scene.observations = ctx.rows.to_vec();
    debug!(
        slices = slices.len(),
        labels = scene.data.iter().filter(|datum| datum.value_label.is_some()).count(),
        "built pie chart scene"
    );
    Ok(scene)
}
