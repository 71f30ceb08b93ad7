//! Combo charts: several measures over one temporal axis.
//!
//! Single-axis combos share one measure domain, dual-axis combos scale each
//! side independently and share only the horizontal extent.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use tracing::debug;

use crate::api::chart_builder::BuildContext;
use crate::api::line_chart_builder::{TimedValue, polyline};
use crate::api::scene::{ChartScene, LegendEntry, RenderDatum, TooltipRow};
use crate::api::{AxisPosition, band_axis, linear_axis, time_axis};
use crate::core::color::palette_color;
use crate::core::format::format_with_unit;
use crate::core::variables::{
    ComboDualVariables, ComboLineColumnVariables, ComboSingleVariables, MeasureVariable,
    TemporalVariable,
};
use crate::core::{
    AxisSide, BandScale, ChartType, LinearScale, MinValueRule, OrdinalColorScale, Point,
    TimeScale, dual_axis_domains, measure_domain,
};
use crate::error::ChartResult;
use crate::interaction::{
    BandHitRegion, BandHitTester, BandOrientation, BandSegmentSpan, HitTarget, HitTester,
    VoronoiPicker,
};
use crate::render::{Color, Paint, Shape};

/// Present values of `measure` in row order.
fn timed_values(
    x: &TemporalVariable,
    measure: &MeasureVariable,
    ctx: &BuildContext<'_>,
) -> Vec<TimedValue> {
    ctx.rows
        .iter()
        .enumerate()
        .filter_map(|(observation, row)| {
            Some(TimedValue {
                observation,
                time: x.accessor.get(row)?,
                value: measure.accessor.get(row)?,
            })
        })
        .collect()
}

fn time_scale_of(
    series: &[Vec<TimedValue>],
    ctx: &BuildContext<'_>,
) -> ChartResult<Option<TimeScale>> {
    TimeScale::from_extent(
        series.iter().flatten().map(|point| point.time),
        ctx.bounds.x_range(),
    )
}

/// Value scale of one measure; its custom domain wins over `computed`.
fn value_scale(
    measure: &MeasureVariable,
    computed: (f64, f64),
    range: (f64, f64),
) -> ChartResult<LinearScale> {
    let domain = measure.custom_domain.map_or(computed, |[lo, hi]| (lo, hi));
    LinearScale::new(domain, range)
}

fn voronoi(sites: Vec<(Point, HitTarget)>, ctx: &BuildContext<'_>) -> HitTester {
    let picker = VoronoiPicker::build(sites);
    HitTester::Voronoi(match ctx.config.pick_max_distance_px {
        Some(distance) => picker.with_max_distance(distance),
        None => picker,
    })
}

/// Draws one measure as a line and records its tooltip rows and pick sites.
#[allow(clippy::too_many_arguments)]
fn push_measure_line(
    scene: &mut ChartScene,
    sites: &mut Vec<(Point, HitTarget)>,
    x: &TemporalVariable,
    measure: &MeasureVariable,
    points: &[TimedValue],
    time_scale: TimeScale,
    y_scale: LinearScale,
    color: Color,
    ctx: &BuildContext<'_>,
) {
    if points.is_empty() {
        return;
    }
    let id = measure.measure.id.as_str();
    let unit = measure.measure.unit.as_deref();
    let pixels: Vec<(f64, f64)> = points
        .iter()
        .map(|point| (time_scale.scale(point.time), y_scale.scale(point.value)))
        .collect();
    let baseline_px = ctx.bounds.bottom();
    scene.data.push(
        RenderDatum::new(
            ctx.datum_key("line", &[Some(id)]),
            "line",
            polyline(pixels.clone()),
            Paint::stroke(color, ctx.config.line_width_px),
        )
        .with_collapsed(polyline(pixels.iter().map(|(px, _)| (*px, baseline_px)).collect()))
        .with_source(None, Some(id.to_owned())),
    );
    for (point, (px, py)) in points.iter().zip(pixels) {
        let row = &ctx.rows[point.observation];
        scene.tooltip_rows.push(TooltipRow {
            observation: point.observation,
            group: x.accessor.key(row),
            axis_label: x.accessor.label(row),
            segment: Some(id.to_owned()),
            segment_label: Some(measure.measure.label.clone()),
            value_text: format_with_unit(point.value, unit),
            color,
        });
        let anchor = Point::new(px, py);
        sites.push((anchor, HitTarget::new(point.observation, Some(id.to_owned()), anchor)));
    }
}

/// Full-height hit region of the band at `key`, created on first use.
fn band_region<'a>(
    regions: &'a mut IndexMap<String, BandHitRegion>,
    band: &BandScale,
    key: &str,
    ctx: &BuildContext<'_>,
) -> Option<&'a mut BandHitRegion> {
    let start = band.scale(key)?;
    let gap = (band.step() - band.bandwidth()) / 2.0;
    Some(regions.entry(key.to_owned()).or_insert_with(|| BandHitRegion {
        key: key.to_owned(),
        x: start - gap,
        y: ctx.bounds.top(),
        width: band.step(),
        height: ctx.bounds.chart_height(),
        segments: Vec::new(),
    }))
}

fn legend_entry(measure: &MeasureVariable, color: Color) -> LegendEntry {
    LegendEntry {
        key: measure.measure.id.clone(),
        label: measure.measure.label.clone(),
        color,
    }
}

pub(crate) fn build_combo_single(
    vars: &ComboSingleVariables,
    ctx: &BuildContext<'_>,
) -> ChartResult<ChartScene> {
    let mut scene =
        ChartScene::empty(ChartType::ComboLineSingle, ctx.bounds, ctx.config.font_size_px);
    let series: Vec<Vec<TimedValue>> = vars
        .measures
        .iter()
        .map(|measure| timed_values(&vars.x, measure, ctx))
        .collect();
    let Some(time_scale) = time_scale_of(&series, ctx)? else {
        return Ok(scene);
    };
    let rule = vars
        .measures
        .first()
        .map_or(MinValueRule::Zero, |first| MinValueRule::for_measure(&first.measure));
    let custom = vars.measures.iter().find_map(|measure| measure.custom_domain);
    let domain = measure_domain(series.iter().flatten().map(|point| point.value), rule, custom);
    let y_scale = LinearScale::new(domain, ctx.bounds.y_range())?;
    let ids: Vec<String> = vars.measures.iter().map(|measure| measure.measure.id.clone()).collect();
    let colors = OrdinalColorScale::new(&ids, &vars.color_mapping, &IndexMap::new());

    let mut sites = Vec::new();
    for (measure, points) in vars.measures.iter().zip(&series) {
        let color = colors.color(&measure.measure.id);
        push_measure_line(
            &mut scene,
            &mut sites,
            &vars.x,
            measure,
            points,
            time_scale,
            y_scale,
            color,
            ctx,
        );
        scene.legend.push(legend_entry(measure, color));
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
    scene.hit_tester = voronoi(sites, ctx);
    scene.observations = ctx.rows.to_vec();
    debug!(measures = vars.measures.len(), "built single-axis combo scene");
    Ok(scene)
}

pub(crate) fn build_combo_dual(
    vars: &ComboDualVariables,
    ctx: &BuildContext<'_>,
) -> ChartResult<ChartScene> {
    let mut scene =
        ChartScene::empty(ChartType::ComboLineDual, ctx.bounds, ctx.config.font_size_px);
    let series = vec![
        timed_values(&vars.x, &vars.left, ctx),
        timed_values(&vars.x, &vars.right, ctx),
    ];
    let Some(time_scale) = time_scale_of(&series, ctx)? else {
        return Ok(scene);
    };
    let domains = dual_axis_domains(
        &vars.left.measure,
        series[0].iter().map(|point| point.value),
        &vars.right.measure,
        series[1].iter().map(|point| point.value),
    );
    let left_scale = value_scale(&vars.left, domains.left, ctx.bounds.y_range())?;
    let right_scale = value_scale(&vars.right, domains.right, ctx.bounds.y_range())?;

    let mut sites = Vec::new();
    let sides = [
        (&vars.left, left_scale, palette_color(0)),
        (&vars.right, right_scale, palette_color(1)),
    ];
    for ((measure, y_scale, color), points) in sides.into_iter().zip(&series) {
        push_measure_line(
            &mut scene,
            &mut sites,
            &vars.x,
            measure,
            points,
            time_scale,
            y_scale,
            color,
            ctx,
        );
        scene.legend.push(legend_entry(measure, color));
    }

    let font_size = ctx.config.font_size_px;
    let tick_count = ctx.config.linear_tick_count;
    scene.axes.extend(linear_axis(
        left_scale,
        AxisPosition::Left,
        ctx.bounds,
        tick_count,
        font_size,
        true,
    ));
    scene.axes.extend(linear_axis(
        right_scale,
        AxisPosition::Right,
        ctx.bounds,
        tick_count,
        font_size,
        false,
    ));
    scene.axes.extend(time_axis(
        time_scale,
        vars.x.accessor.time_unit(),
        ctx.bounds,
        ctx.config.time_tick_max_count,
        font_size,
    ));
    scene.hit_tester = voronoi(sites, ctx);
    scene.observations = ctx.rows.to_vec();
    debug!(
        left = %vars.left.measure.id,
        right = %vars.right.measure.id,
        left_domain = ?domains.left,
        right_domain = ?domains.right,
        "built dual-axis combo scene"
    );
    Ok(scene)
}

pub(crate) fn build_combo_line_column(
    vars: &ComboLineColumnVariables,
    ctx: &BuildContext<'_>,
) -> ChartResult<ChartScene> {
    let mut scene =
        ChartScene::empty(ChartType::ComboLineColumn, ctx.bounds, ctx.config.font_size_px);
    let bounds = ctx.bounds;

    let mut times: IndexMap<String, DateTime<Utc>> = IndexMap::new();
    let mut labels: IndexMap<String, String> = IndexMap::new();
    for row in ctx.all_rows {
        let (Some(key), Some(time)) = (vars.x.accessor.key(row), vars.x.accessor.get(row)) else {
            continue;
        };
        labels
            .entry(key.clone())
            .or_insert_with(|| vars.x.accessor.label(row).unwrap_or_else(|| key.clone()));
        times.entry(key).or_insert(time);
    }
    if times.is_empty() {
        return Ok(scene);
    }
    times.sort_by(|_, a, _, b| a.cmp(b));
    let keys: Vec<String> = times.keys().cloned().collect();
    let band = BandScale::new(
        keys,
        bounds.x_range(),
        ctx.config.band_padding_inner,
        ctx.config.band_padding_outer,
    )?;

    let column_points = timed_values(&vars.x, &vars.column, ctx);
    let line_points = timed_values(&vars.x, &vars.line, ctx);
    let domains = dual_axis_domains(
        &vars.line.measure,
        line_points.iter().map(|point| point.value),
        &vars.column.measure,
        column_points.iter().map(|point| point.value),
    );
    let line_scale = value_scale(&vars.line, domains.left, bounds.y_range())?;
    let column_scale = value_scale(&vars.column, domains.right, bounds.y_range())?;
    let (line_position, column_position) = match vars.line_axis {
        AxisSide::Left => (AxisPosition::Left, AxisPosition::Right),
        AxisSide::Right => (AxisPosition::Right, AxisPosition::Left),
    };
    let column_color = palette_color(0);
    let line_color = palette_color(1);
    let column_id = vars.column.measure.id.as_str();
    let line_id = vars.line.measure.id.as_str();

    let mut regions: IndexMap<String, BandHitRegion> = IndexMap::new();

    let base_px = column_scale.scale(0.0);
    let column_unit = vars.column.measure.unit.as_deref();
    for point in &column_points {
        let row = &ctx.rows[point.observation];
        let Some(key) = vars.x.accessor.key(row) else {
            continue;
        };
        let Some(start) = band.scale(&key) else {
            continue;
        };
        let end_px = column_scale.scale(point.value);
        let rect = |end: f64| Shape::Rect {
            x: start,
            y: base_px.min(end),
            width: band.bandwidth(),
            height: (end - base_px).abs(),
        };
        scene.data.push(
            RenderDatum::new(
                ctx.datum_key("column", &[Some(key.as_str()), Some(column_id)]),
                "column",
                rect(end_px),
                Paint::fill(column_color),
            )
            .with_collapsed(rect(base_px))
            .with_source(Some(point.observation), Some(column_id.to_owned())),
        );
        scene.tooltip_rows.push(TooltipRow {
            observation: point.observation,
            group: Some(key.clone()),
            axis_label: labels.get(&key).cloned(),
            segment: Some(column_id.to_owned()),
            segment_label: Some(vars.column.measure.label.clone()),
            value_text: format_with_unit(point.value, column_unit),
            color: column_color,
        });
        if let Some(region) = band_region(&mut regions, &band, &key, ctx) {
            region.segments.push(BandSegmentSpan {
                segment: Some(column_id.to_owned()),
                observation: point.observation,
                span: (base_px, end_px),
                anchor: Point::new(start + band.bandwidth() / 2.0, base_px.min(end_px)),
            });
        }
    }

    let line_unit = vars.line.measure.unit.as_deref();
    let mut line_pixels = Vec::with_capacity(line_points.len());
    for point in &line_points {
        let row = &ctx.rows[point.observation];
        let Some(key) = vars.x.accessor.key(row) else {
            continue;
        };
        let Some(center) = band.center(&key) else {
            continue;
        };
        let y = line_scale.scale(point.value);
        line_pixels.push((center, y));
        scene.tooltip_rows.push(TooltipRow {
            observation: point.observation,
            group: Some(key.clone()),
            axis_label: labels.get(&key).cloned(),
            segment: Some(line_id.to_owned()),
            segment_label: Some(vars.line.measure.label.clone()),
            value_text: format_with_unit(point.value, line_unit),
            color: line_color,
        });
        if let Some(region) = band_region(&mut regions, &band, &key, ctx) {
            region.segments.push(BandSegmentSpan {
                segment: Some(line_id.to_owned()),
                observation: point.observation,
                span: (y, y),
                anchor: Point::new(center, y),
            });
        }
    }
    if !line_pixels.is_empty() {
        let collapsed = line_pixels.iter().map(|(x, _)| (*x, bounds.bottom())).collect();
        scene.data.push(
            RenderDatum::new(
                ctx.datum_key("line", &[Some(line_id)]),
                "line",
                polyline(line_pixels),
                Paint::stroke(line_color, ctx.config.line_width_px),
            )
            .with_collapsed(polyline(collapsed))
            .with_source(None, Some(line_id.to_owned())),
        );
    }

    let font_size = ctx.config.font_size_px;
    let tick_count = ctx.config.linear_tick_count;
    scene.axes.extend(linear_axis(
        column_scale,
        column_position,
        bounds,
        tick_count,
        font_size,
        column_position == AxisPosition::Left,
    ));
    scene.axes.extend(linear_axis(
        line_scale,
        line_position,
        bounds,
        tick_count,
        font_size,
        line_position == AxisPosition::Left,
    ));
    scene.axes.extend(band_axis(&band, &labels, BandOrientation::Vertical, bounds, font_size));

    let tester = BandHitTester::new(BandOrientation::Vertical, regions.into_values().collect());
    scene.overlays.extend(tester.primitives());
    scene.hit_tester = HitTester::Bands(tester);
    scene.legend = vec![
        legend_entry(&vars.column, column_color),
        legend_entry(&vars.line, line_color),
    ];
    scene.observations = ctx.rows.to_vec();
    debug!(
        categories = band.len(),
        line_axis = ?vars.line_axis,
        "built line-column combo scene"
    );
    Ok(scene)
}
