//! Temporal line and stacked area charts.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use ordered_float::OrderedFloat;
use tracing::debug;

use crate::api::chart_builder::{BuildContext, SegmentPalette};
use crate::api::scene::{ChartScene, RenderDatum, TooltipRow};
use crate::api::{AxisPosition, linear_axis, time_axis};
use crate::core::format::{format_normalized_value, format_with_unit};
use crate::core::stack::normalize_to_percent;
use crate::core::time::to_millis;
use crate::core::variables::LineVariables;
use crate::core::{
    ChartType, LinearScale, MinValueRule, Observation, Point, StackEntry, TimeScale,
    measure_domain, stack, stacked_domain,
};
use crate::error::ChartResult;
use crate::interaction::{HitTarget, HitTester, NearestPointPicker, TimedSite, VoronoiPicker};
use crate::render::{Paint, Shape};

/// One plottable row of a temporal series.
pub(crate) struct TimedValue {
    pub observation: usize,
    pub time: DateTime<Utc>,
    pub value: f64,
}

/// Path through `points`, ordered by x.
pub(crate) fn polyline(mut points: Vec<(f64, f64)>) -> Shape {
    points.sort_by_key(|(x, _)| OrderedFloat(*x));
    Shape::Path {
        points,
        closed: false,
    }
}

/// Picker for temporal points: bisection for one series, Voronoi otherwise.
pub(crate) fn temporal_hit_tester(
    scale: TimeScale,
    sites: Vec<(f64, HitTarget)>,
    single_series: bool,
    max_distance: Option<f64>,
) -> HitTester {
    if single_series {
        HitTester::NearestPoint(NearestPointPicker::new(
            scale,
            sites
                .into_iter()
                .map(|(millis, target)| TimedSite { millis, target })
                .collect(),
        ))
    } else {
        let picker =
            VoronoiPicker::build(sites.into_iter().map(|(_, target)| (target.anchor, target)));
        HitTester::Voronoi(match max_distance {
            Some(distance) => picker.with_max_distance(distance),
            None => picker,
        })
    }
}

pub(crate) fn build_line_chart(
    vars: &LineVariables,
    ctx: &BuildContext<'_>,
) -> ChartResult<ChartScene> {
    let mut scene = ChartScene::empty(ChartType::Line, ctx.bounds, ctx.config.font_size_px);
    let y_of = |row: &Observation| vars.y.accessor.get(row);
    let segment = vars.segment.as_ref();
    let palette = SegmentPalette::new(segment, ctx.all_rows, ctx.rows, y_of);

    let mut series: IndexMap<String, Vec<TimedValue>> =
        palette.keys.iter().map(|key| (key.clone(), Vec::new())).collect();
    for (observation, row) in ctx.rows.iter().enumerate() {
        let (Some(time), Some(value), Some(key)) = (
            vars.x.accessor.get(row),
            y_of(row),
            palette.key_of(segment, row),
        ) else {
            continue;
        };
        if let Some(points) = series.get_mut(&key) {
            points.push(TimedValue {
                observation,
                time,
                value,
            });
        }
    }

    let times = series.values().flatten().map(|point| point.time);
    let Some(time_scale) = TimeScale::from_extent(times, ctx.bounds.x_range())? else {
        return Ok(scene);
    };
    let domain = measure_domain(
        series.values().flatten().map(|point| point.value),
        MinValueRule::for_measure(&vars.y.measure),
        vars.y.custom_domain,
    );
    let y_scale = LinearScale::new(domain, ctx.bounds.y_range())?;
    let unit = vars.y.measure.unit.as_deref();
    let baseline_px = ctx.bounds.bottom();

    let mut sites = Vec::new();
    for (key, points) in &series {
        if points.is_empty() {
            continue;
        }
        let segment_key = palette.public_key(key);
        let color = palette.color(key);
        let pixels: Vec<(f64, f64)> = points
            .iter()
            .map(|point| (time_scale.scale(point.time), y_scale.scale(point.value)))
            .collect();
        let collapsed = polyline(pixels.iter().map(|(x, _)| (*x, baseline_px)).collect());
        scene.data.push(
            RenderDatum::new(
                ctx.datum_key("line", &[segment_key.as_deref()]),
                "line",
                polyline(pixels.clone()),
                Paint::stroke(color, ctx.config.line_width_px),
            )
            .with_collapsed(collapsed)
            .with_source(None, segment_key.clone()),
        );
        for (point, (x, y)) in points.iter().zip(pixels) {
            let row = &ctx.rows[point.observation];
            scene.tooltip_rows.push(TooltipRow {
                observation: point.observation,
                group: vars.x.accessor.key(row),
                axis_label: vars.x.accessor.label(row),
                segment: segment_key.clone(),
                segment_label: palette.label(key),
                value_text: format_with_unit(point.value, unit),
                color,
            });
            sites.push((
                to_millis(point.time),
                HitTarget::new(point.observation, segment_key.clone(), Point::new(x, y)),
            ));
        }
    }

    scene.axes.extend(linear_axis(
        y_scale,
        AxisPosition::Left,
        ctx.bounds,
        ctx.config.linear_tick_count,
        ctx.config.font_size_px,
        true,
    ));
    scene.axes.extend(time_axis(
        time_scale,
        vars.x.accessor.time_unit(),
        ctx.bounds,
        ctx.config.time_tick_max_count,
        ctx.config.font_size_px,
    ));
    scene.hit_tester = temporal_hit_tester(
        time_scale,
        sites,
        !palette.is_segmented(),
        ctx.config.pick_max_distance_px,
    );
    scene.legend = palette.legend();
    scene.observations = ctx.rows.to_vec();
    debug!(series = series.len(), paths = scene.data.len(), "built line chart scene");
    Ok(scene)
}

pub(crate) fn build_area_chart(
    vars: &LineVariables,
    ctx: &BuildContext<'_>,
) -> ChartResult<ChartScene> {
    let mut scene = ChartScene::empty(ChartType::Area, ctx.bounds, ctx.config.font_size_px);
    let y_of = |row: &Observation| vars.y.accessor.get(row);
    let segment = vars.segment.as_ref();
    let palette = SegmentPalette::new(segment, ctx.all_rows, ctx.rows, y_of);

    let mut times: IndexMap<String, DateTime<Utc>> = IndexMap::new();
    let mut labels: IndexMap<String, String> = IndexMap::new();
    let mut raw_entries = Vec::new();
    for (observation, row) in ctx.rows.iter().enumerate() {
        let (Some(time), Some(key), Some(value), Some(segment_key)) = (
            vars.x.accessor.get(row),
            vars.x.accessor.key(row),
            y_of(row),
            palette.key_of(segment, row),
        ) else {
            continue;
        };
        times.entry(key.clone()).or_insert(time);
        if let Some(label) = vars.x.accessor.label(row) {
            labels.entry(key.clone()).or_insert(label);
        }
        raw_entries.push(StackEntry::new(key, segment_key, value, observation));
    }
    times.sort_by(|_, a, _, b| a.cmp(b));
    let x_order: Vec<String> = times.keys().cloned().collect();

    let Some(time_scale) = TimeScale::from_extent(times.values().copied(), ctx.bounds.x_range())?
    else {
        return Ok(scene);
    };
    let entries = if vars.normalized {
        normalize_to_percent(&raw_entries)
    } else {
        raw_entries.clone()
    };
    let domain = stacked_domain(&entries, vars.normalized, vars.y.custom_domain);
    let y_scale = LinearScale::new(domain, ctx.bounds.y_range())?;
    let series = stack(&entries, &x_order, &palette.keys);
    let raw_by_observation: IndexMap<usize, f64> = raw_entries
        .iter()
        .map(|entry| (entry.observation, entry.value))
        .collect();
    let unit = vars.y.measure.unit.as_deref();
    let x_px: Vec<f64> = x_order
        .iter()
        .map(|key| times.get(key).map_or(f64::NAN, |time| time_scale.scale(*time)))
        .collect();
    let zero_px = y_scale.scale(0.0);

    let mut sites = Vec::new();
    for segment_series in &series.segments {
        let segment_key = palette.public_key(&segment_series.segment);
        let color = palette.color(&segment_series.segment);
        let tops: Vec<(f64, f64)> = x_px
            .iter()
            .zip(&segment_series.points)
            .map(|(x, point)| (*x, y_scale.scale(point.top)))
            .collect();
        let bases: Vec<(f64, f64)> = x_px
            .iter()
            .zip(&segment_series.points)
            .map(|(x, point)| (*x, y_scale.scale(point.baseline)))
            .collect();
        let outline: Vec<(f64, f64)> = tops
            .iter()
            .copied()
            .chain(bases.iter().rev().copied())
            .collect();
        let collapsed: Vec<(f64, f64)> = outline.iter().map(|(x, _)| (*x, zero_px)).collect();
        scene.data.push(
            RenderDatum::new(
                ctx.datum_key("area", &[segment_key.as_deref()]),
                "area",
                Shape::Path {
                    points: outline,
                    closed: true,
                },
                Paint::fill(color),
            )
            .with_collapsed(Shape::Path {
                points: collapsed,
                closed: true,
            })
            .with_source(None, segment_key.clone()),
        );

        for ((x_key, x), point) in x_order.iter().zip(&x_px).zip(&segment_series.points) {
            let Some(observation) = point.observation else {
                continue;
            };
            let raw = raw_by_observation.get(&observation).copied().unwrap_or(point.height());
            scene.tooltip_rows.push(TooltipRow {
                observation,
                group: Some(x_key.clone()),
                axis_label: labels.get(x_key).cloned(),
                segment: segment_key.clone(),
                segment_label: palette.label(&segment_series.segment),
                value_text: if vars.normalized {
                    format_normalized_value(point.height(), raw, unit)
                } else {
                    format_with_unit(raw, unit)
                },
                color,
            });
            let middle = y_scale.scale((point.baseline + point.top) / 2.0);
            let anchor = Point::new(*x, middle);
            sites.push((0.0, HitTarget::new(observation, segment_key.clone(), anchor)));
        }
    }

    scene.axes.extend(linear_axis(
        y_scale,
        AxisPosition::Left,
        ctx.bounds,
        ctx.config.linear_tick_count,
        ctx.config.font_size_px,
        true,
    ));
    scene.axes.extend(time_axis(
        time_scale,
        vars.x.accessor.time_unit(),
        ctx.bounds,
        ctx.config.time_tick_max_count,
        ctx.config.font_size_px,
    ));
    scene.hit_tester =
        temporal_hit_tester(time_scale, sites, false, ctx.config.pick_max_distance_px);
    scene.legend = palette.legend();
    scene.observations = ctx.rows.to_vec();
    debug!(
        times = x_order.len(),
        segments = series.segments.len(),
        normalized = vars.normalized,
        "built area chart scene"
    );
    Ok(scene)
}
