use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};

/// RGBA color in normalized 0..=1 channel values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
    pub alpha: f64,
}

impl Color {
    pub const TRANSPARENT: Self = Self::rgba(0.0, 0.0, 0.0, 0.0);
    pub const NEUTRAL: Self = Self::rgb(0.87, 0.87, 0.87);
    pub const TEXT: Self = Self::rgb(0.2, 0.2, 0.2);
    pub const GRID: Self = Self::rgb(0.9, 0.9, 0.9);

    #[must_use]
    pub const fn rgba(red: f64, green: f64, blue: f64, alpha: f64) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    #[must_use]
    pub const fn rgb(red: f64, green: f64, blue: f64) -> Self {
        Self::rgba(red, green, blue, 1.0)
    }

    /// Parses `#rgb` or `#rrggbb`.
    pub fn from_hex(hex: &str) -> ChartResult<Self> {
        let digits = hex.trim().trim_start_matches('#');
        if !digits.bytes().all(|byte| byte.is_ascii_hexdigit()) {
            return Err(ChartError::InvalidData(format!("color `{hex}` is not hexadecimal")));
        }
        let expanded: String = match digits.len() {
            3 => digits.chars().flat_map(|c| [c, c]).collect(),
            6 => digits.to_owned(),
            _ => {
                return Err(ChartError::InvalidData(format!(
                    "color `{hex}` must be #rgb or #rrggbb"
                )));
            }
        };
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&expanded[range], 16)
                .map(|value| f64::from(value) / 255.0)
                .map_err(|_| ChartError::InvalidData(format!("color `{hex}` is not hexadecimal")))
        };
        Ok(Self::rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    #[must_use]
    pub fn to_hex(self) -> String {
        let to_byte = |value: f64| (value.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!(
            "#{:02x}{:02x}{:02x}",
            to_byte(self.red),
            to_byte(self.green),
            to_byte(self.blue)
        )
    }

    /// Channel-wise interpolation, `t` clamped to `[0, 1]`.
    #[must_use]
    pub fn lerp(self, other: Self, t: f64) -> Self {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: f64, b: f64| a + (b - a) * t;
        Self::rgba(
            mix(self.red, other.red),
            mix(self.green, other.green),
            mix(self.blue, other.blue),
            mix(self.alpha, other.alpha),
        )
    }

    pub fn validate(self) -> ChartResult<()> {
        for (channel, value) in [
            ("red", self.red),
            ("green", self.green),
            ("blue", self.blue),
            ("alpha", self.alpha),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(ChartError::InvalidData(format!(
                    "color channel `{channel}` must be finite and in [0, 1]"
                )));
            }
        }
        Ok(())
    }
}

/// Horizontal text alignment relative to the anchor x.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextHAlign {
    Left,
    Center,
    Right,
}

/// Geometry of one visual element. Every variant can be interpolated and collapsed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    Arc {
        start_angle: f64,
        end_angle: f64,
        inner_radius: f64,
        outer_radius: f64,
        center_x: f64,
        center_y: f64,
    },
    Circle {
        cx: f64,
        cy: f64,
        r: f64,
    },
    Path {
        points: Vec<(f64, f64)>,
        closed: bool,
    },
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
    },
    Text {
        x: f64,
        y: f64,
        text: String,
        font_size_px: f64,
        h_align: TextHAlign,
    },
}

impl Shape {
    pub fn validate(&self) -> ChartResult<()> {
        let finite = |values: &[f64]| values.iter().all(|value| value.is_finite());
        let ok = match self {
            Self::Rect {
                x,
                y,
                width,
                height,
            } => finite(&[*x, *y, *width, *height]) && *width >= 0.0 && *height >= 0.0,
            Self::Arc {
                start_angle,
                end_angle,
                inner_radius,
                outer_radius,
                center_x,
                center_y,
            } => {
                finite(&[
                    *start_angle,
                    *end_angle,
                    *inner_radius,
                    *outer_radius,
                    *center_x,
                    *center_y,
                ]) && *inner_radius >= 0.0
                    && *outer_radius >= *inner_radius
            }
            Self::Circle { cx, cy, r } => finite(&[*cx, *cy, *r]) && *r >= 0.0,
            Self::Path { points, .. } => points.iter().all(|(x, y)| x.is_finite() && y.is_finite()),
            Self::Line { x1, y1, x2, y2 } => finite(&[*x1, *y1, *x2, *y2]),
            Self::Text {
                x,
                y,
                font_size_px,
                ..
            } => finite(&[*x, *y, *font_size_px]) && *font_size_px > 0.0,
        };
        if ok {
            Ok(())
        } else {
            Err(ChartError::InvalidData(format!(
                "shape has non-finite or negative geometry: {self:?}"
            )))
        }
    }

    /// Short primitive name used in diagnostics and class lists.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Rect { .. } => "rect",
            Self::Arc { .. } => "arc",
            Self::Circle { .. } => "circle",
            Self::Path { .. } => "path",
            Self::Line { .. } => "line",
            Self::Text { .. } => "text",
        }
    }
}

/// Fill and stroke for one element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Paint {
    pub fill: Color,
    pub stroke: Option<Color>,
    pub stroke_width: f64,
    pub opacity: f64,
}

impl Paint {
    #[must_use]
    pub fn fill(color: Color) -> Self {
        Self {
            fill: color,
            stroke: None,
            stroke_width: 0.0,
            opacity: 1.0,
        }
    }

    #[must_use]
    pub fn stroke(color: Color, width: f64) -> Self {
        Self {
            fill: Color::TRANSPARENT,
            stroke: Some(color),
            stroke_width: width,
            opacity: 1.0,
        }
    }

    #[must_use]
    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity;
        self
    }

    /// Interpolates fill, stroke and opacity.
    #[must_use]
    pub fn lerp(self, other: Self, t: f64) -> Self {
        let stroke = match (self.stroke, other.stroke) {
            (Some(a), Some(b)) => Some(a.lerp(b, t)),
            (_, target) => target,
        };
        Self {
            fill: self.fill.lerp(other.fill, t),
            stroke,
            stroke_width: self.stroke_width + (other.stroke_width - self.stroke_width) * t,
            opacity: self.opacity + (other.opacity - self.opacity) * t,
        }
    }

    pub fn validate(self) -> ChartResult<()> {
        self.fill.validate()?;
        if let Some(stroke) = self.stroke {
            stroke.validate()?;
        }
        if !self.stroke_width.is_finite() || self.stroke_width < 0.0 {
            return Err(ChartError::InvalidData(
                "stroke width must be finite and >= 0".to_owned(),
            ));
        }
        if !self.opacity.is_finite() || !(0.0..=1.0).contains(&self.opacity) {
            return Err(ChartError::InvalidData(
                "opacity must be finite and in [0, 1]".to_owned(),
            ));
        }
        Ok(())
    }
}

/// Draw command for one keyed element in pixel space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Primitive {
    pub key: String,
    pub class_name: String,
    pub shape: Shape,
    pub paint: Paint,
    pub exclude_from_export: bool,
    /// Geometry to grow from on enter and shrink to on exit; derived from
    /// `shape` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collapsed: Option<Shape>,
}

impl Primitive {
    #[must_use]
    pub fn new(
        key: impl Into<String>,
        class_name: impl Into<String>,
        shape: Shape,
        paint: Paint,
    ) -> Self {
        Self {
            key: key.into(),
            class_name: class_name.into(),
            shape,
            paint,
            exclude_from_export: false,
            collapsed: None,
        }
    }

    #[must_use]
    pub fn excluded_from_export(mut self) -> Self {
        self.exclude_from_export = true;
        self
    }

    #[must_use]
    pub fn with_collapsed(mut self, collapsed: Shape) -> Self {
        self.collapsed = Some(collapsed);
        self
    }

    pub fn validate(&self) -> ChartResult<()> {
        if self.class_name.is_empty() {
            return Err(ChartError::InvalidData(
                "primitive class name must not be empty".to_owned(),
            ));
        }
        self.shape.validate()?;
        self.paint.validate()
    }
}
