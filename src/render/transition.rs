use serde::{Deserialize, Serialize};

use crate::render::{Paint, Shape};

fn default_enabled() -> bool {
    true
}

fn default_duration_ms() -> f64 {
    400.0
}

/// Easing curve applied to normalized transition progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Easing {
    Linear,
    #[default]
    CubicInOut,
}

impl Easing {
    #[must_use]
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::CubicInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
        }
    }
}

/// Transition settings passed explicitly into every render pass.
///
/// With `enabled == false` geometry is applied immediately, which is what
/// static exports want.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionOptions {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_duration_ms")]
    pub duration_ms: f64,
    #[serde(default)]
    pub easing: Easing,
}

impl Default for TransitionOptions {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            duration_ms: default_duration_ms(),
            easing: Easing::default(),
        }
    }
}

impl TransitionOptions {
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_duration_ms(mut self, duration_ms: f64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    #[must_use]
    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// True when geometry should animate rather than snap.
    #[must_use]
    pub fn animates(self) -> bool {
        self.enabled && self.duration_ms.is_finite() && self.duration_ms > 0.0
    }
}

/// Progress of one keyed element from `from` towards `to`.
#[derive(Debug, Clone, PartialEq)]
pub struct Tween {
    pub from: (Shape, Paint),
    pub to: (Shape, Paint),
    pub elapsed_ms: f64,
    pub duration_ms: f64,
    pub easing: Easing,
}

impl Tween {
    #[must_use]
    pub fn new(from: (Shape, Paint), to: (Shape, Paint), options: TransitionOptions) -> Self {
        Self {
            from,
            to,
            elapsed_ms: 0.0,
            duration_ms: options.duration_ms.max(1e-6),
            easing: options.easing,
        }
    }

    pub fn step(&mut self, dt_ms: f64) {
        self.elapsed_ms = (self.elapsed_ms + dt_ms.max(0.0)).min(self.duration_ms);
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.elapsed_ms >= self.duration_ms
    }

    #[must_use]
    pub fn progress(&self) -> f64 {
        self.easing.apply(self.elapsed_ms / self.duration_ms)
    }

    #[must_use]
    pub fn current(&self) -> (Shape, Paint) {
        let t = self.progress();
        (
            interpolate_shape(&self.from.0, &self.to.0, t),
            self.from.1.lerp(self.to.1, t),
        )
    }
}

fn mix(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Interpolates two shapes of the same kind; other pairs snap to `to`.
#[must_use]
pub fn interpolate_shape(from: &Shape, to: &Shape, t: f64) -> Shape {
    match (from, to) {
        (
            Shape::Rect {
                x: x0,
                y: y0,
                width: w0,
                height: h0,
            },
            Shape::Rect {
                x,
                y,
                width,
                height,
            },
        ) => Shape::Rect {
            x: mix(*x0, *x, t),
            y: mix(*y0, *y, t),
            width: mix(*w0, *width, t),
            height: mix(*h0, *height, t),
        },
        (
            Shape::Arc {
                start_angle: s0,
                end_angle: e0,
                inner_radius: i0,
                outer_radius: o0,
                center_x: cx0,
                center_y: cy0,
            },
            Shape::Arc {
                start_angle,
                end_angle,
                inner_radius,
                outer_radius,
                center_x,
                center_y,
            },
        ) => Shape::Arc {
            start_angle: mix(*s0, *start_angle, t),
            end_angle: mix(*e0, *end_angle, t),
            inner_radius: mix(*i0, *inner_radius, t),
            outer_radius: mix(*o0, *outer_radius, t),
            center_x: mix(*cx0, *center_x, t),
            center_y: mix(*cy0, *center_y, t),
        },
        (Shape::Circle { cx: x0, cy: y0, r: r0 }, Shape::Circle { cx, cy, r }) => Shape::Circle {
            cx: mix(*x0, *cx, t),
            cy: mix(*y0, *cy, t),
            r: mix(*r0, *r, t),
        },
        (
            Shape::Path {
                points: from_points,
                ..
            },
            Shape::Path { points, closed },
        ) if from_points.len() == points.len() => Shape::Path {
            points: from_points
                .iter()
                .zip(points)
                .map(|((x0, y0), (x, y))| (mix(*x0, *x, t), mix(*y0, *y, t)))
                .collect(),
            closed: *closed,
        },
        (
            Shape::Line {
                x1: a0,
                y1: b0,
                x2: c0,
                y2: d0,
            },
            Shape::Line { x1, y1, x2, y2 },
        ) => Shape::Line {
            x1: mix(*a0, *x1, t),
            y1: mix(*b0, *y1, t),
            x2: mix(*c0, *x2, t),
            y2: mix(*d0, *y2, t),
        },
        (
            Shape::Text { x: x0, y: y0, .. },
            Shape::Text {
                x,
                y,
                text,
                font_size_px,
                h_align,
            },
        ) => Shape::Text {
            x: mix(*x0, *x, t),
            y: mix(*y0, *y, t),
            text: text.clone(),
            font_size_px: *font_size_px,
            h_align: *h_align,
        },
        _ => to.clone(),
    }
}

/// Zero-size geometry an element grows out of on enter and shrinks into on exit.
///
/// Rects collapse onto their bottom edge, arcs onto their start angle, circles
/// to radius zero. Paths, lines and text keep their geometry and fade instead.
#[must_use]
pub fn collapse_shape(shape: &Shape) -> Shape {
    match shape {
        Shape::Rect {
            x,
            y,
            width,
            height,
        } => Shape::Rect {
            x: *x,
            y: y + height,
            width: *width,
            height: 0.0,
        },
        Shape::Arc {
            start_angle,
            inner_radius,
            outer_radius,
            center_x,
            center_y,
            ..
        } => Shape::Arc {
            start_angle: *start_angle,
            end_angle: *start_angle,
            inner_radius: *inner_radius,
            outer_radius: *outer_radius,
            center_x: *center_x,
            center_y: *center_y,
        },
        Shape::Circle { cx, cy, .. } => Shape::Circle {
            cx: *cx,
            cy: *cy,
            r: 0.0,
        },
        Shape::Path { .. } | Shape::Line { .. } | Shape::Text { .. } => shape.clone(),
    }
}

/// True when collapsing alone hides the shape; otherwise it must fade out.
#[must_use]
pub fn collapses_to_nothing(shape: &Shape) -> bool {
    matches!(
        shape,
        Shape::Rect { .. } | Shape::Arc { .. } | Shape::Circle { .. }
    )
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::{Easing, collapse_shape, interpolate_shape};
    use crate::render::Shape;

    #[test]
    fn cubic_easing_is_symmetric_and_bounded() {
        assert_eq!(Easing::CubicInOut.apply(0.0), 0.0);
        assert_eq!(Easing::CubicInOut.apply(1.0), 1.0);
        assert_relative_eq!(Easing::CubicInOut.apply(0.5), 0.5);
        assert_eq!(Easing::Linear.apply(2.0), 1.0);
    }

    #[test]
    fn rect_collapses_onto_bottom_edge() {
        let rect = Shape::Rect {
            x: 10.0,
            y: 20.0,
            width: 5.0,
            height: 30.0,
        };
        let collapsed = collapse_shape(&rect);
        assert_eq!(
            collapsed,
            Shape::Rect {
                x: 10.0,
                y: 50.0,
                width: 5.0,
                height: 0.0
            }
        );
        assert_eq!(interpolate_shape(&collapsed, &rect, 1.0), rect);
    }

    #[test]
    fn mismatched_shapes_snap_to_target() {
        let circle = Shape::Circle {
            cx: 0.0,
            cy: 0.0,
            r: 1.0,
        };
        let line = Shape::Line {
            x1: 0.0,
            y1: 0.0,
            x2: 1.0,
            y2: 1.0,
        };
        assert_eq!(interpolate_shape(&circle, &line, 0.1), line);
    }
}
