use indexmap::IndexMap;

use crate::core::format::format_value;
use crate::core::time::format_time;
use crate::core::{AxisSide, BandScale, ChartBounds, LinearScale, TimeScale, TimeUnit};
use crate::interaction::BandOrientation;
use crate::render::{Color, Paint, Primitive, Shape, TextHAlign};

const TICK_LENGTH_PX: f64 = 6.0;
const LABEL_GAP_PX: f64 = 8.0;

/// Edge of the plot area an axis is drawn on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisPosition {
    Left,
    Right,
    Bottom,
}

impl AxisPosition {
    fn class_name(self) -> &'static str {
        match self {
            Self::Left => "axis-left",
            Self::Right => "axis-right",
            Self::Bottom => "axis-bottom",
        }
    }
}

impl From<AxisSide> for AxisPosition {
    fn from(side: AxisSide) -> Self {
        match side {
            AxisSide::Left => Self::Left,
            AxisSide::Right => Self::Right,
        }
    }
}

fn line(
    key: String,
    class_name: &str,
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
    color: Color,
) -> Primitive {
    Primitive::new(key, class_name, Shape::Line { x1, y1, x2, y2 }, Paint::stroke(color, 1.0))
}

fn text(
    key: String,
    class_name: &str,
    x: f64,
    y: f64,
    label: String,
    font_size_px: f64,
    h_align: TextHAlign,
) -> Primitive {
    Primitive::new(
        key,
        class_name,
        Shape::Text {
            x,
            y,
            text: label,
            font_size_px,
            h_align,
        },
        Paint::fill(Color::TEXT),
    )
}

/// Nice ticks, labels and optional grid lines of a continuous axis.
#[must_use]
pub fn linear_axis(
    scale: LinearScale,
    position: AxisPosition,
    bounds: ChartBounds,
    tick_count: usize,
    font_size_px: f64,
    grid: bool,
) -> Vec<Primitive> {
    let class_name = position.class_name();
    let mut primitives = Vec::new();
    let (x0, x1) = bounds.x_range();
    let (y_bottom, y_top) = bounds.y_range();
    for tick in scale.ticks(tick_count) {
        let label = format_value(tick);
        let at = scale.scale(tick);
        match position {
            AxisPosition::Left | AxisPosition::Right => {
                if grid {
                    primitives.push(line(
                        format!("axis-grid:{class_name}:{label}"),
                        "axis-grid",
                        x0,
                        at,
                        x1,
                        at,
                        Color::GRID,
                    ));
                }
                let (anchor, align) = if position == AxisPosition::Left {
                    (x0 - LABEL_GAP_PX, TextHAlign::Right)
                } else {
                    (x1 + LABEL_GAP_PX, TextHAlign::Left)
                };
                primitives.push(text(
                    format!("{class_name}:{label}"),
                    class_name,
                    anchor,
                    at + font_size_px / 3.0,
                    label,
                    font_size_px,
                    align,
                ));
            }
            AxisPosition::Bottom => {
                if grid {
                    primitives.push(line(
                        format!("axis-grid:{class_name}:{label}"),
                        "axis-grid",
                        at,
                        y_top,
                        at,
                        y_bottom,
                        Color::GRID,
                    ));
                }
                primitives.push(text(
                    format!("{class_name}:{label}"),
                    class_name,
                    at,
                    y_bottom + LABEL_GAP_PX + font_size_px,
                    label,
                    font_size_px,
                    TextHAlign::Center,
                ));
            }
        }
    }
    primitives.push(domain_line(position, bounds));
    primitives
}

/// One label per category, centered on its band.
#[must_use]
pub fn band_axis(
    scale: &BandScale,
    labels: &IndexMap<String, String>,
    orientation: BandOrientation,
    bounds: ChartBounds,
    font_size_px: f64,
) -> Vec<Primitive> {
    let position = match orientation {
        BandOrientation::Vertical => AxisPosition::Bottom,
        BandOrientation::Horizontal => AxisPosition::Left,
    };
    let class_name = position.class_name();
    let mut primitives: Vec<Primitive> = scale
        .domain()
        .filter_map(|key| {
            let center = scale.center(key)?;
            let label = labels.get(key).cloned().unwrap_or_else(|| key.to_owned());
            Some(match orientation {
                BandOrientation::Vertical => text(
                    format!("{class_name}:{key}"),
                    class_name,
                    center,
                    bounds.bottom() + LABEL_GAP_PX + font_size_px,
                    label,
                    font_size_px,
                    TextHAlign::Center,
                ),
                BandOrientation::Horizontal => text(
                    format!("{class_name}:{key}"),
                    class_name,
                    bounds.left() - LABEL_GAP_PX,
                    center + font_size_px / 3.0,
                    label,
                    font_size_px,
                    TextHAlign::Right,
                ),
            })
        })
        .collect();
    primitives.push(domain_line(position, bounds));
    primitives
}

/// Ticks at `unit` boundaries along the bottom edge.
#[must_use]
pub fn time_axis(
    scale: TimeScale,
    unit: TimeUnit,
    bounds: ChartBounds,
    max_count: usize,
    font_size_px: f64,
) -> Vec<Primitive> {
    let class_name = AxisPosition::Bottom.class_name();
    let bottom = bounds.bottom();
    let mut primitives = Vec::new();
    for tick in scale.ticks(unit, max_count) {
        let x = scale.scale(tick);
        let label = format_time(tick, unit);
        primitives.push(line(
            format!("{class_name}:tick:{label}"),
            class_name,
            x,
            bottom,
            x,
            bottom + TICK_LENGTH_PX,
            Color::TEXT,
        ));
        primitives.push(text(
            format!("{class_name}:{label}"),
            class_name,
            x,
            bottom + LABEL_GAP_PX + font_size_px,
            label,
            font_size_px,
            TextHAlign::Center,
        ));
    }
    primitives.push(domain_line(AxisPosition::Bottom, bounds));
    primitives
}

fn domain_line(position: AxisPosition, bounds: ChartBounds) -> Primitive {
    let class_name = position.class_name();
    let key = format!("{class_name}:domain");
    let (x1, y1, x2, y2) = match position {
        AxisPosition::Left => (bounds.left(), bounds.top(), bounds.left(), bounds.bottom()),
        AxisPosition::Right => (bounds.right(), bounds.top(), bounds.right(), bounds.bottom()),
        AxisPosition::Bottom => (bounds.left(), bounds.bottom(), bounds.right(), bounds.bottom()),
    };
    line(key, class_name, x1, y1, x2, y2, Color::TEXT)
}

#[cfg(test)]
mod tests {
    use super::{AxisPosition, linear_axis};
    use crate::core::{ChartBounds, LinearScale, Margins, Viewport};

    #[test]
    fn left_axis_emits_grid_and_labels_per_tick() {
        let bounds = ChartBounds::new(Viewport::new(200, 200), Margins::default()).expect("bounds");
        let scale = LinearScale::new((0.0, 4.0), bounds.y_range()).expect("scale");
        let primitives = linear_axis(scale, AxisPosition::Left, bounds, 5, 12.0, true);
        let labels = primitives
            .iter()
            .filter(|primitive| {
                primitive.class_name == "axis-left" && primitive.shape.kind() == "text"
            })
            .count();
        let grid = primitives
            .iter()
            .filter(|primitive| primitive.class_name == "axis-grid")
            .count();
        assert_eq!(labels, 5);
        assert_eq!(grid, 5);
    }
}
