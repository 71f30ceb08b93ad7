use indexmap::IndexMap;
use tracing::warn;

use crate::render::Color;

/// Categorical palette cycled for segments without an explicit color.
pub const CATEGORY_PALETTE: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

/// Default endpoints of the sequential scale used by map area layers.
pub const SEQUENTIAL_PALETTE: [&str; 2] = ["#deebf7", "#08519c"];

/// Segment identifier to color mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct OrdinalColorScale {
    colors: IndexMap<String, Color>,
    fallback: Color,
}

impl OrdinalColorScale {
    /// Builds colors for `segments` in order.
    ///
    /// Resolution per segment: explicit mapping, then the dimension value's own
    /// color, then the categorical palette by position.
    #[must_use]
    pub fn new(
        segments: &[String],
        explicit: &IndexMap<String, String>,
        value_colors: &IndexMap<String, String>,
    ) -> Self {
        let mut colors = IndexMap::with_capacity(segments.len());
        for (index, segment) in segments.iter().enumerate() {
            let color = explicit
                .get(segment)
                .or_else(|| value_colors.get(segment))
                .and_then(|hex| match Color::from_hex(hex) {
                    Ok(color) => Some(color),
                    Err(err) => {
                        warn!(segment = %segment, error = %err, "ignoring invalid segment color");
                        None
                    }
                })
                .unwrap_or_else(|| palette_color(index));
            colors.insert(segment.clone(), color);
        }
        Self {
            colors,
            fallback: palette_color(0),
        }
    }

    #[must_use]
    pub fn single(color: Color) -> Self {
        Self {
            colors: IndexMap::new(),
            fallback: color,
        }
    }

    #[must_use]
    pub fn color(&self, segment: &str) -> Color {
        self.colors.get(segment).copied().unwrap_or(self.fallback)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, Color)> {
        self.colors.iter().map(|(segment, color)| (segment.as_str(), *color))
    }
}

/// Linear interpolation between two colors over a numeric domain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SequentialColorScale {
    domain: (f64, f64),
    low: Color,
    high: Color,
}

impl SequentialColorScale {
    #[must_use]
    pub fn new(domain: (f64, f64), low: Color, high: Color) -> Self {
        Self { domain, low, high }
    }

    #[must_use]
    pub fn color(&self, value: f64) -> Color {
        let span = self.domain.1 - self.domain.0;
        let t = if span == 0.0 || !span.is_finite() {
            1.0
        } else {
            (value - self.domain.0) / span
        };
        self.low.lerp(self.high, t)
    }
}

#[must_use]
pub fn palette_color(index: usize) -> Color {
    Color::from_hex(CATEGORY_PALETTE[index % CATEGORY_PALETTE.len()]).unwrap_or(Color::NEUTRAL)
}

#[cfg(test)]
mod tests {
    use indexmap::IndexMap;

    use super::{OrdinalColorScale, SequentialColorScale, palette_color};
    use crate::render::Color;

    #[test]
    fn explicit_mapping_wins_over_value_colors_and_palette() {
        let segments = vec!["a".to_owned(), "b".to_owned(), "c".to_owned()];
        let mut explicit = IndexMap::new();
        explicit.insert("a".to_owned(), "#000000".to_owned());
        let mut value_colors = IndexMap::new();
        value_colors.insert("a".to_owned(), "#ffffff".to_owned());
        value_colors.insert("b".to_owned(), "#ffffff".to_owned());

        let scale = OrdinalColorScale::new(&segments, &explicit, &value_colors);
        assert_eq!(scale.color("a"), Color::rgb(0.0, 0.0, 0.0));
        assert_eq!(scale.color("b"), Color::rgb(1.0, 1.0, 1.0));
        assert_eq!(scale.color("c"), palette_color(2));
    }

    #[test]
    fn sequential_scale_clamps_outside_domain() {
        let low = Color::rgb(0.0, 0.0, 0.0);
        let high = Color::rgb(1.0, 1.0, 1.0);
        let scale = SequentialColorScale::new((0.0, 10.0), low, high);
        assert_eq!(scale.color(-5.0), low);
        assert_eq!(scale.color(20.0), high);
        assert_eq!(scale.color(5.0), Color::rgb(0.5, 0.5, 0.5));
    }
}
