//! Choropleth areas and proportional symbols over externally projected features.

use indexmap::{IndexMap, IndexSet};
use tracing::debug;

use crate::api::GeoFeature;
use crate::api::chart_builder::BuildContext;
use crate::api::scene::{ChartScene, LegendEntry, RenderDatum, TooltipRow};
use crate::core::accessor::CategoryAccessor;
use crate::core::color::{SEQUENTIAL_PALETTE, palette_color};
use crate::core::domain::extent;
use crate::core::format::format_with_unit;
use crate::core::variables::MapVariables;
use crate::core::{ChartBounds, ChartType, Observation, Point, SequentialColorScale, SqrtScale};
use crate::error::ChartResult;
use crate::interaction::{HitTarget, HitTester, VoronoiPicker};
use crate::render::{Color, Paint, Shape};

/// Uniform fit of projected coordinates into the plot area, centered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct FeatureProjection {
    scale: f64,
    offset_x: f64,
    offset_y: f64,
}

impl FeatureProjection {
    pub fn fit(features: &[GeoFeature], bounds: ChartBounds) -> Option<Self> {
        let (x0, y0, x1, y1) = features.iter().filter_map(GeoFeature::bbox).reduce(|a, b| {
            (a.0.min(b.0), a.1.min(b.1), a.2.max(b.2), a.3.max(b.3))
        })?;
        let (width, height) = (x1 - x0, y1 - y0);
        let scale = match (width > 0.0, height > 0.0) {
            (true, true) => (bounds.chart_width() / width).min(bounds.chart_height() / height),
            (true, false) => bounds.chart_width() / width,
            (false, true) => bounds.chart_height() / height,
            (false, false) => 1.0,
        };
        Some(Self {
            scale,
            offset_x: bounds.left() + (bounds.chart_width() - width * scale) / 2.0 - x0 * scale,
            offset_y: bounds.top() + (bounds.chart_height() - height * scale) / 2.0 - y0 * scale,
        })
    }

    pub fn apply(&self, (x, y): (f64, f64)) -> (f64, f64) {
        (x * self.scale + self.offset_x, y * self.scale + self.offset_y)
    }
}

/// Feature key a row refers to: the value identifier, falling back to its label.
fn matching_feature<'a>(
    features: &'a IndexMap<&str, &GeoFeature>,
    accessor: &CategoryAccessor,
    row: &Observation,
) -> Option<&'a GeoFeature> {
    accessor
        .key(row)
        .and_then(|key| features.get(key.as_str()).copied())
        .or_else(|| accessor.label(row).and_then(|label| features.get(label.as_str()).copied()))
}

pub(crate) fn build_map_chart(
    vars: &MapVariables,
    ctx: &BuildContext<'_>,
) -> ChartResult<ChartScene> {
    let mut scene = ChartScene::empty(ChartType::Map, ctx.bounds, ctx.config.font_size_px);
    let Some(projection) = FeatureProjection::fit(ctx.geo_features, ctx.bounds) else {
        scene.observations = ctx.rows.to_vec();
        return Ok(scene);
    };
    let features: IndexMap<&str, &GeoFeature> = ctx
        .geo_features
        .iter()
        .map(|feature| (feature.key.as_str(), feature))
        .collect();
    let mut sites = Vec::new();

    if let Some(area) = &vars.area {
        let [low, high] = match &area.palette {
            Some([low, high]) => [Color::from_hex(low)?, Color::from_hex(high)?],
            None => [
                Color::from_hex(SEQUENTIAL_PALETTE[0])?,
                Color::from_hex(SEQUENTIAL_PALETTE[1])?,
            ],
        };
        let domain = extent(ctx.all_rows.iter().filter_map(|row| area.color.accessor.get(row)))
            .unwrap_or((0.0, 1.0));
        let colors = SequentialColorScale::new(domain, low, high);
        let unit = area.color.measure.unit.as_deref();

        let mut matched: IndexMap<&str, (usize, f64)> = IndexMap::new();
        for (observation, row) in ctx.rows.iter().enumerate() {
            let (Some(feature), Some(value)) = (
                matching_feature(&features, &area.feature, row),
                area.color.accessor.get(row),
            ) else {
                continue;
            };
            matched.entry(feature.key.as_str()).or_insert((observation, value));
        }

        for feature in ctx.geo_features {
            let source = matched.get(feature.key.as_str()).copied();
            let color = source.map_or(Color::NEUTRAL, |(_, value)| colors.color(value));
            for (ring_index, ring) in feature.rings.iter().enumerate() {
                let ring_key = ring_index.to_string();
                let points: Vec<(f64, f64)> =
                    ring.iter().map(|point| projection.apply(*point)).collect();
                let mut datum = RenderDatum::new(
                    ctx.datum_key(
                        "map-area",
                        &[Some(feature.key.as_str()), Some(ring_key.as_str())],
                    ),
                    "map-area",
                    Shape::Path {
                        points,
                        closed: true,
                    },
                    Paint::fill(color),
                );
                if let Some((observation, _)) = source {
                    datum = datum.with_source(Some(observation), None);
                }
                scene.data.push(datum);
            }
            let Some((observation, value)) = source else {
                continue;
            };
            scene.tooltip_rows.push(TooltipRow {
                observation,
                group: Some(feature.key.clone()),
                axis_label: area.feature.label(&ctx.rows[observation]),
                segment: None,
                segment_label: None,
                value_text: format_with_unit(value, unit),
                color,
            });
            if vars.symbol.is_none() {
                if let Some(anchor) = feature.anchor() {
                    let (x, y) = projection.apply(anchor);
                    let anchor = Point::new(x, y);
                    sites.push((anchor, HitTarget::new(observation, None, anchor)));
                }
            }
        }
        scene.legend.push(LegendEntry {
            key: area.color.measure.id.clone(),
            label: area.color.measure.label.clone(),
            color: high,
        });
    }

    if let Some(symbol) = &vars.symbol {
        let color = match &symbol.color {
            Some(hex) => Color::from_hex(hex)?,
            None => palette_color(0),
        };
        let max_radius = ctx.config.symbol_max_radius_px;
        let radius_scale = symbol.size.as_ref().map(|size| {
            let max = ctx
                .all_rows
                .iter()
                .filter_map(|row| size.accessor.get(row))
                .fold(0.0_f64, f64::max);
            SqrtScale::new(max, max_radius)
        });
        let unit = symbol.size.as_ref().and_then(|size| size.measure.unit.as_deref());

        let mut placed: IndexSet<&str> = IndexSet::new();
        for (observation, row) in ctx.rows.iter().enumerate() {
            let Some(feature) = matching_feature(&features, &symbol.feature, row) else {
                continue;
            };
            let Some(anchor) = feature.anchor() else {
                continue;
            };
            if !placed.insert(feature.key.as_str()) {
                continue;
            }
            let value = symbol.size.as_ref().and_then(|size| size.accessor.get(row));
            let r = match (radius_scale, value) {
                (Some(scale), Some(value)) => scale.scale(value),
                (Some(_), None) => continue,
                (None, _) => ctx.config.point_radius_px,
            };
            let (cx, cy) = projection.apply(anchor);
            scene.data.push(
                RenderDatum::new(
                    ctx.datum_key("map-symbol", &[Some(feature.key.as_str())]),
                    "map-symbol",
                    Shape::Circle { cx, cy, r },
                    Paint::fill(color).with_opacity(0.8),
                )
                .with_source(Some(observation), None),
            );
            if let Some(value) = value {
                scene.tooltip_rows.push(TooltipRow {
                    observation,
                    group: Some(feature.key.clone()),
                    axis_label: symbol.feature.label(row),
                    segment: None,
                    segment_label: None,
                    value_text: format_with_unit(value, unit),
                    color,
                });
            }
            let anchor = Point::new(cx, cy);
            sites.push((anchor, HitTarget::new(observation, None, anchor)));
        }
    }

    let picker = VoronoiPicker::build(sites);
    scene.hit_tester = HitTester::Voronoi(match ctx.config.pick_max_distance_px {
        Some(distance) => picker.with_max_distance(distance),
        None => picker,
    });
    scene.observations = ctx.rows.to_vec();
    debug!(
        features = ctx.geo_features.len(),
        areas = scene.data_by_class("map-area").count(),
        symbols = scene.data_by_class("map-symbol").count(),
        "built map chart scene"
    );
    Ok(scene)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::FeatureProjection;
    use crate::api::GeoFeature;
    use crate::core::{ChartBounds, Margins, Viewport};

    #[test]
    fn projection_fits_features_uniformly_and_centers_them() {
        let bounds =
            ChartBounds::new(Viewport::new(200, 100), Margins::uniform(0.0)).expect("bounds");
        let square = vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)];
        let features = vec![GeoFeature::new("a").with_ring(square)];
        let projection = FeatureProjection::fit(&features, bounds).expect("fit");

        let (x0, y0) = projection.apply((0.0, 0.0));
        let (x1, y1) = projection.apply((10.0, 10.0));
        assert_relative_eq!(y0, 0.0);
        assert_relative_eq!(y1, 100.0);
        assert_relative_eq!(x0, 50.0);
        assert_relative_eq!(x1, 150.0);
    }
}
