//! Shared plumbing of the per-chart scene builders.

use indexmap::IndexMap;

use crate::api::scene::{LegendEntry, render_key};
use crate::api::{GeoFeature, PipelineConfig};
use crate::core::color::palette_color;
use crate::core::variables::SegmentVariable;
use crate::core::{
    Category, ChartBounds, Dimension, MeasureBasis, Observation, OrdinalColorScale, Sorting,
    sort_categories,
};
use crate::render::Color;

/// Inputs every scene builder reads.
pub(crate) struct BuildContext<'a> {
    pub bounds: ChartBounds,
    pub config: &'a PipelineConfig,
    /// Plottable rows of every animation frame; scales are computed over these.
    pub all_rows: &'a [Observation],
    /// Plottable rows of the active frame; data is drawn from these.
    pub rows: &'a [Observation],
    pub frame: Option<&'a str>,
    pub geo_features: &'a [GeoFeature],
}

impl BuildContext<'_> {
    /// Key `class:parts|frame`, unique per visual element within a scene.
    pub fn datum_key(&self, class_name: &str, parts: &[Option<&str>]) -> String {
        let parts = parts.iter().copied().chain(std::iter::once(self.frame));
        format!("{class_name}:{}", render_key(parts))
    }
}

/// Makes content-derived keys unique by numbering repeats in encounter order.
///
/// The first occurrence keeps its bare identity so keys survive the removal of
/// unrelated rows.
#[derive(Debug, Default)]
pub(crate) struct OccurrenceKeys {
    seen: IndexMap<String, usize>,
}

impl OccurrenceKeys {
    pub fn key_for(&mut self, identity: String) -> String {
        let count = self.seen.entry(identity.clone()).or_insert(0);
        *count += 1;
        match *count {
            1 => identity,
            repeat => format!("{identity}#{repeat}"),
        }
    }
}

/// Distinct keys with their first label, in encounter order.
pub(crate) fn collect_keys(
    rows: &[Observation],
    key_label: impl Fn(&Observation) -> Option<(String, String)>,
) -> IndexMap<String, String> {
    let mut keys = IndexMap::new();
    for row in rows {
        if let Some((key, label)) = key_label(row) {
            keys.entry(key).or_insert(label);
        }
    }
    keys
}

/// Keys of `labels` ordered by `sorting`.
pub(crate) fn ordered_keys(
    labels: &IndexMap<String, String>,
    dimension: Option<&Dimension>,
    sorting: Sorting,
    basis: MeasureBasis<'_>,
) -> Vec<String> {
    let mut categories: Vec<Category> = labels
        .iter()
        .map(|(key, label)| Category::from_dimension(dimension, key, label))
        .collect();
    sort_categories(&mut categories, sorting, basis);
    categories.into_iter().map(|category| category.key).collect()
}

/// Per-key sums of `value` over `rows`.
pub(crate) fn sums_by_key(
    rows: &[Observation],
    key: impl Fn(&Observation) -> Option<String>,
    value: impl Fn(&Observation) -> Option<f64>,
) -> IndexMap<String, f64> {
    let mut sums = IndexMap::new();
    for row in rows {
        if let (Some(key), Some(value)) = (key(row), value(row)) {
            *sums.entry(key).or_insert(0.0) += value;
        }
    }
    sums
}

/// Ordered segment keys, labels and colors of a chart.
///
/// Charts without a segment field get a single anonymous segment `""`.
pub(crate) struct SegmentPalette {
    pub keys: Vec<String>,
    pub labels: IndexMap<String, String>,
    pub colors: OrdinalColorScale,
    segmented: bool,
}

impl SegmentPalette {
    pub fn new(
        segment: Option<&SegmentVariable>,
        all_rows: &[Observation],
        rows: &[Observation],
        value: impl Fn(&Observation) -> Option<f64>,
    ) -> Self {
        let Some(segment) = segment else {
            return Self::single(palette_color(0));
        };
        let labels = collect_keys(all_rows, |row| {
            let key = segment.accessor.key(row)?;
            let label = segment.accessor.label(row).unwrap_or_else(|| key.clone());
            Some((key, label))
        });
        let sums = sums_by_key(rows, |row| segment.accessor.key(row), value);
        let keys = ordered_keys(
            &labels,
            Some(&segment.dimension),
            segment.sorting.unwrap_or_default(),
            MeasureBasis::Values(&sums),
        );
        let colors = OrdinalColorScale::new(&keys, &segment.color_mapping, &segment.value_colors());
        Self {
            keys,
            labels,
            colors,
            segmented: true,
        }
    }

    pub fn single(color: Color) -> Self {
        let mut labels = IndexMap::new();
        labels.insert(String::new(), String::new());
        Self {
            keys: vec![String::new()],
            labels,
            colors: OrdinalColorScale::single(color),
            segmented: false,
        }
    }

    pub fn is_segmented(&self) -> bool {
        self.segmented
    }

    /// Segment key of `row`; `""` when unsegmented.
    pub fn key_of(&self, segment: Option<&SegmentVariable>, row: &Observation) -> Option<String> {
        match segment {
            Some(segment) => segment.accessor.key(row),
            None => Some(String::new()),
        }
    }

    /// Segment as carried by hit targets and tooltip rows.
    pub fn public_key(&self, key: &str) -> Option<String> {
        self.segmented.then(|| key.to_owned())
    }

    pub fn label(&self, key: &str) -> Option<String> {
        if !self.segmented {
            return None;
        }
        self.labels.get(key).cloned()
    }

    pub fn color(&self, key: &str) -> Color {
        self.colors.color(key)
    }

    pub fn legend(&self) -> Vec<LegendEntry> {
        if !self.segmented {
            return Vec::new();
        }
        self.keys
            .iter()
            .map(|key| LegendEntry {
                key: key.clone(),
                label: self.labels.get(key).cloned().unwrap_or_else(|| key.clone()),
                color: self.colors.color(key),
            })
            .collect()
    }
}
