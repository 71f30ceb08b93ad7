//! Column and bar charts: plain, stacked and grouped layouts.

use indexmap::IndexMap;
use tracing::debug;

use crate::api::chart_builder::{
    BuildContext, SegmentPalette, collect_keys, ordered_keys, sums_by_key,
};
use crate::api::scene::{ChartScene, RenderDatum, TooltipRow, ValueLabel};
use crate::api::{AxisPosition, band_axis, linear_axis};
use crate::core::format::{format_normalized_value, format_percent, format_value, format_with_unit};
use crate::core::stack::normalize_to_percent;
use crate::core::variables::BandVariables;
use crate::core::{
    BandScale, ChartType, LinearScale, MeasureBasis, MinValueRule, Observation, Point,
    SegmentLayout, StackEntry, measure_domain, stack, stacked_domain,
};
use crate::error::ChartResult;
use crate::interaction::{BandHitRegion, BandHitTester, BandOrientation, BandSegmentSpan, HitTester};
use crate::render::{Paint, Shape, TextHAlign};

/// One drawn bar before conversion to a datum.
struct BarGeometry {
    category: String,
    segment: String,
    observation: usize,
    band_start: f64,
    band_width: f64,
    /// Value-axis pixels of the attached and the far end.
    base_px: f64,
    end_px: f64,
    raw: f64,
    shown: f64,
}

pub(crate) fn build_band_chart(
    vars: &BandVariables,
    orientation: BandOrientation,
    ctx: &BuildContext<'_>,
) -> ChartResult<ChartScene> {
    let (chart_type, class_name) = match orientation {
        BandOrientation::Vertical => (ChartType::Column, "column"),
        BandOrientation::Horizontal => (ChartType::Bar, "bar"),
    };
    let mut scene = ChartScene::empty(chart_type, ctx.bounds, ctx.config.font_size_px);
    let axis = &vars.category.accessor;
    let value_of = |row: &Observation| vars.value.accessor.get(row);
    let segment = vars.segment.as_ref();
    let stacked = segment.is_none_or(|segment| segment.layout == SegmentLayout::Stacked);

    let category_labels = collect_keys(ctx.all_rows, |row| {
        let key = axis.key(row)?;
        let label = axis.label(row).unwrap_or_else(|| key.clone());
        Some((key, label))
    });
    if category_labels.is_empty() {
        return Ok(scene);
    }

    let palette = SegmentPalette::new(segment, ctx.all_rows, ctx.rows, value_of);
    let entries_for = |rows: &[Observation]| -> Vec<StackEntry> {
        rows.iter()
            .enumerate()
            .filter_map(|(index, row)| {
                Some(StackEntry::new(
                    axis.key(row)?,
                    palette.key_of(segment, row)?,
                    value_of(row)?,
                    index,
                ))
            })
            .collect()
    };
    let raw_entries = entries_for(ctx.rows);
    let all_entries = entries_for(ctx.all_rows);
    let (entries, all_entries) = if vars.normalized {
        (normalize_to_percent(&raw_entries), normalize_to_percent(&all_entries))
    } else {
        (raw_entries.clone(), all_entries)
    };

    let totals = sums_by_key(ctx.rows, |row| axis.key(row), value_of);
    let basis = if stacked && palette.is_segmented() {
        MeasureBasis::StackedTotals(&totals)
    } else {
        MeasureBasis::Values(&totals)
    };
    let categories = ordered_keys(
        &category_labels,
        Some(&vars.category.dimension),
        vars.category.sorting.unwrap_or_default(),
        basis,
    );

    let domain = if stacked {
        stacked_domain(&all_entries, vars.normalized, vars.value.custom_domain)
    } else if vars.normalized {
        (0.0, 100.0)
    } else {
        measure_domain(
            all_entries.iter().map(|entry| entry.value),
            MinValueRule::Zero,
            vars.value.custom_domain,
        )
    };

    let bounds = ctx.bounds;
    let (band_range, value_range) = match orientation {
        BandOrientation::Vertical => (bounds.x_range(), bounds.y_range()),
        BandOrientation::Horizontal => ((bounds.top(), bounds.bottom()), bounds.x_range()),
    };
    let band = BandScale::new(
        categories.clone(),
        band_range,
        ctx.config.band_padding_inner,
        ctx.config.band_padding_outer,
    )?;
    let value_scale = LinearScale::new(domain, value_range)?;

    let raw_by_observation: IndexMap<usize, f64> = raw_entries
        .iter()
        .map(|entry| (entry.observation, entry.value))
        .collect();
    let mut bars = Vec::with_capacity(entries.len());
    if stacked {
        let series = stack(&entries, &categories, &palette.keys);
        for segment_series in &series.segments {
            for (category, point) in series.x_keys.iter().zip(&segment_series.points) {
                let (Some(observation), Some(band_start)) =
                    (point.observation, band.scale(category))
                else {
                    continue;
                };
                bars.push(BarGeometry {
                    category: category.clone(),
                    segment: segment_series.segment.clone(),
                    observation,
                    band_start,
                    band_width: band.bandwidth(),
                    base_px: value_scale.scale(point.baseline),
                    end_px: value_scale.scale(point.top),
                    raw: if vars.normalized {
                        raw_by_observation.get(&observation).copied().unwrap_or(point.height())
                    } else {
                        point.height()
                    },
                    shown: point.height(),
                });
            }
        }
    } else {
        let inner = BandScale::new(
            palette.keys.clone(),
            (0.0, band.bandwidth()),
            ctx.config.group_padding,
            0.0,
        )?;
        for entry in &entries {
            let (Some(band_start), Some(offset)) =
                (band.scale(&entry.x_key), inner.scale(&entry.segment))
            else {
                continue;
            };
            bars.push(BarGeometry {
                category: entry.x_key.clone(),
                segment: entry.segment.clone(),
                observation: entry.observation,
                band_start: band_start + offset,
                band_width: inner.bandwidth(),
                base_px: value_scale.scale(0.0),
                end_px: value_scale.scale(entry.value),
                raw: raw_by_observation.get(&entry.observation).copied().unwrap_or(entry.value),
                shown: entry.value,
            });
        }
    }

    let unit = vars.value.measure.unit.as_deref();
    let centered_labels = stacked && palette.is_segmented();
    let mut regions: IndexMap<String, BandHitRegion> = IndexMap::new();
    for bar in &bars {
        let shape = bar_shape(orientation, bar.band_start, bar.band_width, bar.base_px, bar.end_px);
        let collapsed = bar_shape(
            orientation,
            bar.band_start,
            bar.band_width,
            bar.base_px,
            bar.base_px,
        );
        let segment_key = palette.public_key(&bar.segment);
        let key = ctx.datum_key(class_name, &[Some(bar.category.as_str()), segment_key.as_deref()]);
        let color = palette.color(&bar.segment);
        let value_label = vars.value.show_values.then(|| {
            let text = if vars.normalized {
                format_percent(bar.shown)
            } else {
                format_value(bar.raw)
            };
            place_value_label(orientation, bar, text, centered_labels, ctx)
        });
        scene.data.push(
            RenderDatum::new(key, class_name, shape, Paint::fill(color))
                .with_collapsed(collapsed)
                .with_source(Some(bar.observation), segment_key.clone())
                .with_value_label(value_label),
        );
        scene.tooltip_rows.push(TooltipRow {
            observation: bar.observation,
            group: Some(bar.category.clone()),
            axis_label: category_labels.get(&bar.category).cloned(),
            segment: segment_key.clone(),
            segment_label: palette.label(&bar.segment),
            value_text: if vars.normalized {
                format_normalized_value(bar.shown, bar.raw, unit)
            } else {
                format_with_unit(bar.raw, unit)
            },
            color,
        });

        let region = regions.entry(bar.category.clone()).or_insert_with(|| {
            let gap = (band.step() - band.bandwidth()) / 2.0;
            let start = band.scale(&bar.category).unwrap_or(bar.band_start) - gap;
            match orientation {
                BandOrientation::Vertical => BandHitRegion {
                    key: bar.category.clone(),
                    x: start,
                    y: bounds.top(),
                    width: band.step(),
                    height: bounds.chart_height(),
                    segments: Vec::new(),
                },
                BandOrientation::Horizontal => BandHitRegion {
                    key: bar.category.clone(),
                    x: bounds.left(),
                    y: start,
                    width: bounds.chart_width(),
                    height: band.step(),
                    segments: Vec::new(),
                },
            }
        });
        let center = bar.band_start + bar.band_width / 2.0;
        let anchor = match orientation {
            BandOrientation::Vertical => Point::new(center, bar.base_px.min(bar.end_px)),
            BandOrientation::Horizontal => Point::new(bar.base_px.max(bar.end_px), center),
        };
        region.segments.push(BandSegmentSpan {
            segment: segment_key,
            observation: bar.observation,
            span: (bar.base_px, bar.end_px),
            anchor,
        });
    }

    let font_size = ctx.config.font_size_px;
    scene.axes.extend(linear_axis(
        value_scale,
        match orientation {
            BandOrientation::Vertical => AxisPosition::Left,
            BandOrientation::Horizontal => AxisPosition::Bottom,
        },
        bounds,
        ctx.config.linear_tick_count,
        font_size,
        true,
    ));
    scene.axes.extend(band_axis(&band, &category_labels, orientation, bounds, font_size));

    let tester = BandHitTester::new(orientation, regions.into_values().collect());
    scene.overlays.extend(tester.primitives());
    scene.hit_tester = HitTester::Bands(tester);
    scene.legend = palette.legend();
    scene.observations = ctx.rows.to_vec();

    debug!(
        chart_type = ?chart_type,
        categories = categories.len(),
        segments = palette.keys.len(),
        bars = scene.data.len(),
        stacked,
        normalized = vars.normalized,
        "built band chart scene"
    );
    Ok(scene)
}

fn bar_shape(
    orientation: BandOrientation,
    band_start: f64,
    band_width: f64,
    base_px: f64,
    end_px: f64,
) -> Shape {
    let lo = base_px.min(end_px);
    let extent = (end_px - base_px).abs();
    match orientation {
        BandOrientation::Vertical => Shape::Rect {
            x: band_start,
            y: lo,
            width: band_width,
            height: extent,
        },
        BandOrientation::Horizontal => Shape::Rect {
            x: lo,
            y: band_start,
            width: extent,
            height: band_width,
        },
    }
}

/// Label past the bar end (flipped for negative values), or centered in
/// stacked segments.
fn place_value_label(
    orientation: BandOrientation,
    bar: &BarGeometry,
    text: String,
    centered: bool,
    ctx: &BuildContext<'_>,
) -> ValueLabel {
    let offset = ctx.config.value_label_offset_px;
    let font_size = ctx.config.font_size_px;
    let center = bar.band_start + bar.band_width / 2.0;
    let middle = (bar.base_px + bar.end_px) / 2.0;
    let negative = bar.shown < 0.0;
    match orientation {
        BandOrientation::Vertical => {
            let y = if centered {
                middle + font_size / 3.0
            } else if negative {
                bar.end_px + offset + font_size
            } else {
                bar.end_px - offset
            };
            ValueLabel {
                text,
                x: center,
                y,
                h_align: TextHAlign::Center,
            }
        }
        BandOrientation::Horizontal => {
            let (x, h_align) = if centered {
                (middle, TextHAlign::Center)
            } else if negative {
                (bar.end_px - offset, TextHAlign::Right)
            } else {
                (bar.end_px + offset, TextHAlign::Left)
            };
            ValueLabel {
                text,
                x,
                y: center + font_size / 3.0,
                h_align,
            }
        }
    }
}
