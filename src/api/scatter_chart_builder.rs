use tracing::debug;

use crate::api::chart_builder::{BuildContext, OccurrenceKeys, SegmentPalette};
use crate::api::scene::{ChartScene, RenderDatum, TooltipRow};
use crate::api::{AxisPosition, linear_axis};
use crate::core::format::format_with_unit;
use crate::core::variables::ScatterVariables;
use crate::core::{ChartType, LinearScale, MinValueRule, Observation, Point, measure_domain};
use crate::error::ChartResult;
use crate::interaction::{HitTarget, HitTester, VoronoiPicker};
use crate::render::{Paint, Shape};

pub(crate) fn build_scatter_chart(
    vars: &ScatterVariables,
    ctx: &BuildContext<'_>,
) -> ChartResult<ChartScene> {
    let mut scene = ChartScene::empty(ChartType::Scatter, ctx.bounds, ctx.config.font_size_px);
    let x_of = |row: &Observation| vars.x.accessor.get(row);
    let y_of = |row: &Observation| vars.y.accessor.get(row);
    let segment = vars.segment.as_ref();
    let palette = SegmentPalette::new(segment, ctx.all_rows, ctx.rows, y_of);

    let x_domain = measure_domain(
        ctx.all_rows.iter().filter_map(x_of),
        MinValueRule::for_measure(&vars.x.measure),
        vars.x.custom_domain,
    );
    let y_domain = measure_domain(
        ctx.all_rows.iter().filter_map(y_of),
        MinValueRule::for_measure(&vars.y.measure),
        vars.y.custom_domain,
    );
    let x_scale = LinearScale::new(x_domain, ctx.bounds.x_range())?;
    let y_scale = LinearScale::new(y_domain, ctx.bounds.y_range())?;
    let x_unit = vars.x.measure.unit.as_deref();
    let y_unit = vars.y.measure.unit.as_deref();

    let mut sites = Vec::with_capacity(ctx.rows.len());
    let mut point_keys = OccurrenceKeys::default();
    for (observation, row) in ctx.rows.iter().enumerate() {
        let (Some(x), Some(y), Some(key)) = (x_of(row), y_of(row), palette.key_of(segment, row))
        else {
            continue;
        };
        let segment_key = palette.public_key(&key);
        let color = palette.color(&key);
        let anchor = Point::new(x_scale.scale(x), y_scale.scale(y));
        let identity = point_keys.key_for(format!("{x}:{y}"));
        scene.data.push(
            RenderDatum::new(
                ctx.datum_key("scatter", &[segment_key.as_deref(), Some(identity.as_str())]),
                "scatter",
                Shape::Circle {
                    cx: anchor.x,
                    cy: anchor.y,
                    r: ctx.config.point_radius_px,
                },
                Paint::fill(color).with_opacity(0.8),
            )
            .with_source(Some(observation), segment_key.clone()),
        );
        scene.tooltip_rows.push(TooltipRow {
            observation,
            group: None,
            axis_label: Some(format!("{}: {}", vars.x.measure.label, format_with_unit(x, x_unit))),
            segment: segment_key.clone(),
            segment_label: palette.label(&key),
            value_text: format_with_unit(y, y_unit),
            color,
        });
        sites.push((anchor, HitTarget::new(observation, segment_key, anchor)));
    }

    let font_size = ctx.config.font_size_px;
    let tick_count = ctx.config.linear_tick_count;
    for (scale, position) in [(y_scale, AxisPosition::Left), (x_scale, AxisPosition::Bottom)] {
        scene.axes.extend(linear_axis(scale, position, ctx.bounds, tick_count, font_size, true));
    }

    let picker = VoronoiPicker::build(sites);
    scene.hit_tester = HitTester::Voronoi(match ctx.config.pick_max_distance_px {
        Some(distance) => picker.with_max_distance(distance),
        None => picker,
    });
    scene.legend = palette.legend();
    scene.observations = ctx.rows.to_vec();
    debug!(points = scene.data.len(), "built scatter chart scene");
    Ok(scene)
}
