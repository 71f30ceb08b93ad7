use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChartType {
    Column,
    Bar,
    Line,
    Area,
    Pie,
    Scatter,
    Table,
    Map,
    ComboLineSingle,
    ComboLineDual,
    ComboLineColumn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortingType {
    ByDimensionLabel,
    ByMeasure,
    ByTotalSize,
    ByAuto,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum SortingOrder {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sorting {
    pub sorting_type: SortingType,
    #[serde(default)]
    pub sorting_order: SortingOrder,
}

impl Sorting {
    #[must_use]
    pub fn new(sorting_type: SortingType, sorting_order: SortingOrder) -> Self {
        Self {
            sorting_type,
            sorting_order,
        }
    }
}

impl Default for Sorting {
    fn default() -> Self {
        Self::new(SortingType::ByAuto, SortingOrder::Asc)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum ImputationType {
    #[default]
    None,
    Zeros,
    Linear,
}

/// `Percent` is the normalized mode: every group is scaled to sum to 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum CalculationType {
    #[default]
    Identity,
    Percent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum SegmentLayout {
    #[default]
    Stacked,
    Grouped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum AxisSide {
    #[default]
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenericField {
    pub component_id: String,
}

/// Categorical axis assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisField {
    pub component_id: String,
    #[serde(default)]
    pub sorting: Option<Sorting>,
    #[serde(default)]
    pub use_abbreviations: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasureField {
    pub component_id: String,
    #[serde(default)]
    pub custom_domain: Option<[f64; 2]>,
    #[serde(default)]
    pub show_values: bool,
    #[serde(default)]
    pub imputation_type: ImputationType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentField {
    pub component_id: String,
    #[serde(default)]
    pub layout: SegmentLayout,
    #[serde(default)]
    pub sorting: Option<Sorting>,
    #[serde(default)]
    pub use_abbreviations: bool,
    /// Value identifier to hex color.
    #[serde(default)]
    pub color_mapping: IndexMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationField {
    pub component_id: String,
}

impl GenericField {
    #[must_use]
    pub fn new(component_id: impl Into<String>) -> Self {
        Self {
            component_id: component_id.into(),
        }
    }
}

impl AxisField {
    #[must_use]
    pub fn new(component_id: impl Into<String>) -> Self {
        Self {
            component_id: component_id.into(),
            sorting: None,
            use_abbreviations: false,
        }
    }

    #[must_use]
    pub fn with_sorting(mut self, sorting: Sorting) -> Self {
        self.sorting = Some(sorting);
        self
    }

    #[must_use]
    pub fn with_abbreviations(mut self) -> Self {
        self.use_abbreviations = true;
        self
    }
}

impl MeasureField {
    #[must_use]
    pub fn new(component_id: impl Into<String>) -> Self {
        Self {
            component_id: component_id.into(),
            custom_domain: None,
            show_values: false,
            imputation_type: ImputationType::None,
        }
    }

    #[must_use]
    pub fn with_custom_domain(mut self, start: f64, end: f64) -> Self {
        self.custom_domain = Some([start, end]);
        self
    }

    #[must_use]
    pub fn with_show_values(mut self) -> Self {
        self.show_values = true;
        self
    }

    #[must_use]
    pub fn with_imputation(mut self, imputation_type: ImputationType) -> Self {
        self.imputation_type = imputation_type;
        self
    }
}

impl SegmentField {
    #[must_use]
    pub fn new(component_id: impl Into<String>) -> Self {
        Self {
            component_id: component_id.into(),
            layout: SegmentLayout::Stacked,
            sorting: None,
            use_abbreviations: false,
            color_mapping: IndexMap::new(),
        }
    }

    #[must_use]
    pub fn with_layout(mut self, layout: SegmentLayout) -> Self {
        self.layout = layout;
        self
    }

    #[must_use]
    pub fn with_sorting(mut self, sorting: Sorting) -> Self {
        self.sorting = Some(sorting);
        self
    }

    #[must_use]
    pub fn with_color(mut self, value: impl Into<String>, hex: impl Into<String>) -> Self {
        self.color_mapping.insert(value.into(), hex.into());
        self
    }
}

impl AnimationField {
    #[must_use]
    pub fn new(component_id: impl Into<String>) -> Self {
        Self {
            component_id: component_id.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnFields {
    pub x: AxisField,
    pub y: MeasureField,
    #[serde(default)]
    pub segment: Option<SegmentField>,
    #[serde(default)]
    pub animation: Option<AnimationField>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnConfig {
    pub fields: ColumnFields,
    #[serde(default)]
    pub calculation: CalculationType,
}

/// Horizontal bars: the categorical axis is `y`, the measure is `x`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BarFields {
    pub x: MeasureField,
    pub y: AxisField,
    #[serde(default)]
    pub segment: Option<SegmentField>,
    #[serde(default)]
    pub animation: Option<AnimationField>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BarConfig {
    pub fields: BarFields,
    #[serde(default)]
    pub calculation: CalculationType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineFields {
    pub x: GenericField,
    pub y: MeasureField,
    #[serde(default)]
    pub segment: Option<SegmentField>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineConfig {
    pub fields: LineFields,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaConfig {
    pub fields: LineFields,
    #[serde(default)]
    pub calculation: CalculationType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PieFields {
    pub y: MeasureField,
    pub segment: SegmentField,
    #[serde(default)]
    pub animation: Option<AnimationField>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PieConfig {
    pub fields: PieFields,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScatterFields {
    pub x: MeasureField,
    pub y: MeasureField,
    #[serde(default)]
    pub segment: Option<SegmentField>,
    #[serde(default)]
    pub animation: Option<AnimationField>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScatterConfig {
    pub fields: ScatterFields,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableColumn {
    pub index: usize,
    #[serde(default)]
    pub hidden: bool,
}

impl TableColumn {
    #[must_use]
    pub fn visible(index: usize) -> Self {
        Self {
            index,
            hidden: false,
        }
    }

    #[must_use]
    pub fn hidden(index: usize) -> Self {
        Self {
            index,
            hidden: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableSortingOption {
    pub component_id: String,
    #[serde(default)]
    pub sorting_order: SortingOrder,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableConfig {
    pub fields: IndexMap<String, TableColumn>,
    #[serde(default)]
    pub sorting: Vec<TableSortingOption>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasureColorField {
    pub component_id: String,
    #[serde(default)]
    pub palette: Option<[String; 2]>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapAreaLayer {
    pub component_id: String,
    pub color: MeasureColorField,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapSymbolLayer {
    pub component_id: String,
    #[serde(default)]
    pub measure_id: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct MapFields {
    #[serde(default)]
    pub area_layer: Option<MapAreaLayer>,
    #[serde(default)]
    pub symbol_layer: Option<MapSymbolLayer>,
    #[serde(default)]
    pub animation: Option<AnimationField>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapConfig {
    pub fields: MapFields,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComboLineSingleY {
    pub component_ids: Vec<String>,
    #[serde(default)]
    pub color_mapping: IndexMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComboLineSingleFields {
    pub x: GenericField,
    pub y: ComboLineSingleY,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComboLineSingleConfig {
    pub fields: ComboLineSingleFields,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComboLineDualY {
    pub left_axis_component_id: String,
    pub right_axis_component_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComboLineDualFields {
    pub x: GenericField,
    pub y: ComboLineDualY,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComboLineDualConfig {
    pub fields: ComboLineDualFields,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComboLineColumnY {
    pub line_component_id: String,
    #[serde(default = "default_line_axis")]
    pub line_axis_orientation: AxisSide,
    pub column_component_id: String,
}

fn default_line_axis() -> AxisSide {
    AxisSide::Right
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComboLineColumnFields {
    pub x: GenericField,
    pub y: ComboLineColumnY,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComboLineColumnConfig {
    pub fields: ComboLineColumnFields,
}

/// Closed union of chart configurations; exactly one variant is active per render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "chartType", rename_all = "camelCase")]
pub enum ChartConfig {
    Column(ColumnConfig),
    Bar(BarConfig),
    Line(LineConfig),
    Area(AreaConfig),
    Pie(PieConfig),
    Scatter(ScatterConfig),
    Table(TableConfig),
    Map(MapConfig),
    ComboLineSingle(ComboLineSingleConfig),
    ComboLineDual(ComboLineDualConfig),
    ComboLineColumn(ComboLineColumnConfig),
}

impl ChartConfig {
    #[must_use]
    pub fn chart_type(&self) -> ChartType {
        match self {
            Self::Column(_) => ChartType::Column,
            Self::Bar(_) => ChartType::Bar,
            Self::Line(_) => ChartType::Line,
            Self::Area(_) => ChartType::Area,
            Self::Pie(_) => ChartType::Pie,
            Self::Scatter(_) => ChartType::Scatter,
            Self::Table(_) => ChartType::Table,
            Self::Map(_) => ChartType::Map,
            Self::ComboLineSingle(_) => ChartType::ComboLineSingle,
            Self::ComboLineDual(_) => ChartType::ComboLineDual,
            Self::ComboLineColumn(_) => ChartType::ComboLineColumn,
        }
    }

    /// Normalized (percentage) mode for chart types that support it.
    #[must_use]
    pub fn is_normalized(&self) -> bool {
        let calculation = match self {
            Self::Column(config) => config.calculation,
            Self::Bar(config) => config.calculation,
            Self::Area(config) => config.calculation,
            Self::Line(_)
            | Self::Pie(_)
            | Self::Scatter(_)
            | Self::Table(_)
            | Self::Map(_)
            | Self::ComboLineSingle(_)
            | Self::ComboLineDual(_)
            | Self::ComboLineColumn(_) => CalculationType::Identity,
        };
        calculation == CalculationType::Percent
    }

    /// Component id of the animation field, when one is bound.
    #[must_use]
    pub fn animation_component_id(&self) -> Option<&str> {
        let field = match self {
            Self::Column(config) => config.fields.animation.as_ref(),
            Self::Bar(config) => config.fields.animation.as_ref(),
            Self::Pie(config) => config.fields.animation.as_ref(),
            Self::Scatter(config) => config.fields.animation.as_ref(),
            Self::Map(config) => config.fields.animation.as_ref(),
            Self::Line(_)
            | Self::Area(_)
            | Self::Table(_)
            | Self::ComboLineSingle(_)
            | Self::ComboLineDual(_)
            | Self::ComboLineColumn(_) => None,
        };
        field.map(|field| field.component_id.as_str())
    }

    pub fn from_json_str(input: &str) -> ChartResult<Self> {
        serde_json::from_str(input)
            .map_err(|e| ChartError::Serialization(format!("failed to parse chart config: {e}")))
    }

    pub fn to_json_pretty(&self) -> ChartResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            ChartError::Serialization(format!("failed to serialize chart config: {e}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{CalculationType, ChartConfig, ChartType, SegmentLayout, SortingType};

    #[test]
    fn column_config_parses_from_tagged_json() {
        let json = r#"{
            "chartType": "column",
            "calculation": "percent",
            "fields": {
                "x": {
                    "componentId": "year",
                    "sorting": { "sortingType": "byMeasure", "sortingOrder": "desc" }
                },
                "y": { "componentId": "amount", "showValues": true },
                "segment": { "componentId": "canton", "layout": "grouped" }
            }
        }"#;
        let config = ChartConfig::from_json_str(json).expect("parse config");
        assert_eq!(config.chart_type(), ChartType::Column);
        assert!(config.is_normalized());
        let ChartConfig::Column(column) = config else {
            panic!("expected column config");
        };
        assert_eq!(column.calculation, CalculationType::Percent);
        assert_eq!(
            column.fields.x.sorting.map(|s| s.sorting_type),
            Some(SortingType::ByMeasure)
        );
        let segment = column.fields.segment.expect("segment");
        assert_eq!(segment.layout, SegmentLayout::Grouped);
        assert!(column.fields.y.show_values);
    }

    #[test]
    fn unknown_chart_type_is_rejected() {
        let err = ChartConfig::from_json_str(r#"{ "chartType": "radar", "fields": {} }"#)
            .expect_err("unknown variant");
        assert!(err.to_string().contains("failed to parse chart config"));
    }
}
