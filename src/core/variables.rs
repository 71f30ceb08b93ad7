//! Variable binding: resolves a chart configuration's field assignments into
//! typed accessors plus the component metadata they read.

use indexmap::IndexMap;
use tracing::debug;

use crate::core::accessor::{CategoryAccessor, MeasureAccessor, TemporalAccessor};
use crate::core::config::{
    AnimationField, AxisField, MeasureField, SegmentField, TableSortingOption,
};
use crate::core::{
    AxisSide, ChartConfig, ChartType, ComponentRef, Components, Dimension, ImputationType,
    Measure, Observation, SegmentLayout, Sorting,
};
use crate::error::{ChartError, ChartResult};

/// Categorical or temporal axis accessor.
#[derive(Debug, Clone, PartialEq)]
pub enum AxisAccessor {
    Category(CategoryAccessor),
    Temporal(TemporalAccessor),
}

impl AxisAccessor {
    #[must_use]
    pub fn key(&self, observation: &Observation) -> Option<String> {
        match self {
            Self::Category(accessor) => accessor.key(observation),
            Self::Temporal(accessor) => accessor.key(observation),
        }
    }

    #[must_use]
    pub fn label(&self, observation: &Observation) -> Option<String> {
        match self {
            Self::Category(accessor) => accessor.label(observation),
            Self::Temporal(accessor) => accessor.label(observation),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AxisVariable {
    pub accessor: AxisAccessor,
    pub dimension: Dimension,
    pub sorting: Option<Sorting>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TemporalVariable {
    pub accessor: TemporalAccessor,
    pub dimension: Dimension,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MeasureVariable {
    pub accessor: MeasureAccessor,
    pub measure: Measure,
    pub custom_domain: Option<[f64; 2]>,
    pub show_values: bool,
    pub imputation: ImputationType,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SegmentVariable {
    pub accessor: CategoryAccessor,
    pub dimension: Dimension,
    pub layout: SegmentLayout,
    pub sorting: Option<Sorting>,
    pub color_mapping: IndexMap<String, String>,
}

impl SegmentVariable {
    /// Colors attached to the dimension's own values.
    #[must_use]
    pub fn value_colors(&self) -> IndexMap<String, String> {
        self.dimension
            .values
            .iter()
            .filter_map(|value| value.color.clone().map(|color| (value.value.clone(), color)))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnimationVariable {
    pub accessor: CategoryAccessor,
    pub dimension: Dimension,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BandVariables {
    pub category: AxisVariable,
    pub value: MeasureVariable,
    pub segment: Option<SegmentVariable>,
    pub animation: Option<AnimationVariable>,
    pub normalized: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineVariables {
    pub x: TemporalVariable,
    pub y: MeasureVariable,
    pub segment: Option<SegmentVariable>,
    pub normalized: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PieVariables {
    pub y: MeasureVariable,
    pub segment: SegmentVariable,
    pub animation: Option<AnimationVariable>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterVariables {
    pub x: MeasureVariable,
    pub y: MeasureVariable,
    pub segment: Option<SegmentVariable>,
    pub animation: Option<AnimationVariable>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TableCell {
    Dimension(CategoryAccessor, Dimension),
    Measure(MeasureAccessor, Measure),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableColumnVariable {
    pub component_id: String,
    pub label: String,
    pub index: usize,
    pub cell: TableCell,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableVariables {
    /// Visible columns in display order.
    pub columns: Vec<TableColumnVariable>,
    pub sorting: Vec<TableSortingOption>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapAreaVariables {
    pub feature: CategoryAccessor,
    pub dimension: Dimension,
    pub color: MeasureVariable,
    pub palette: Option<[String; 2]>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapSymbolVariables {
    pub feature: CategoryAccessor,
    pub dimension: Dimension,
    pub size: Option<MeasureVariable>,
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapVariables {
    pub area: Option<MapAreaVariables>,
    pub symbol: Option<MapSymbolVariables>,
    pub animation: Option<AnimationVariable>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComboSingleVariables {
    pub x: TemporalVariable,
    pub measures: Vec<MeasureVariable>,
    pub color_mapping: IndexMap<String, String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComboDualVariables {
    pub x: TemporalVariable,
    pub left: MeasureVariable,
    pub right: MeasureVariable,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComboLineColumnVariables {
    pub x: TemporalVariable,
    pub line: MeasureVariable,
    pub column: MeasureVariable,
    pub line_axis: AxisSide,
}

/// Bound variables for exactly one chart type.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartVariables {
    Column(BandVariables),
    Bar(BandVariables),
    Line(LineVariables),
    Area(LineVariables),
    Pie(PieVariables),
    Scatter(ScatterVariables),
    Table(TableVariables),
    Map(MapVariables),
    ComboLineSingle(ComboSingleVariables),
    ComboLineDual(ComboDualVariables),
    ComboLineColumn(ComboLineColumnVariables),
}

impl ChartVariables {
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

    /// Measures a row must carry to be plottable.
    ///
    /// Combo charts and tables tolerate per-measure gaps, so they require none.
    #[must_use]
    pub fn required_measures(&self) -> Vec<&MeasureAccessor> {
        match self {
            Self::Column(vars) | Self::Bar(vars) => vec![&vars.value.accessor],
            Self::Line(vars) | Self::Area(vars) => vec![&vars.y.accessor],
            Self::Pie(vars) => vec![&vars.y.accessor],
            Self::Scatter(vars) => vec![&vars.x.accessor, &vars.y.accessor],
            Self::Map(_)
            | Self::Table(_)
            | Self::ComboLineSingle(_)
            | Self::ComboLineDual(_)
            | Self::ComboLineColumn(_) => Vec::new(),
        }
    }

    #[must_use]
    pub fn segment(&self) -> Option<&SegmentVariable> {
        match self {
            Self::Column(vars) | Self::Bar(vars) => vars.segment.as_ref(),
            Self::Line(vars) | Self::Area(vars) => vars.segment.as_ref(),
            Self::Pie(vars) => Some(&vars.segment),
            Self::Scatter(vars) => vars.segment.as_ref(),
            Self::Table(_)
            | Self::Map(_)
            | Self::ComboLineSingle(_)
            | Self::ComboLineDual(_)
            | Self::ComboLineColumn(_) => None,
        }
    }

    #[must_use]
    pub fn animation(&self) -> Option<&AnimationVariable> {
        match self {
            Self::Column(vars) | Self::Bar(vars) => vars.animation.as_ref(),
            Self::Pie(vars) => vars.animation.as_ref(),
            Self::Scatter(vars) => vars.animation.as_ref(),
            Self::Map(vars) => vars.animation.as_ref(),
            Self::Line(_)
            | Self::Area(_)
            | Self::Table(_)
            | Self::ComboLineSingle(_)
            | Self::ComboLineDual(_)
            | Self::ComboLineColumn(_) => None,
        }
    }
}

/// Binds `config` against `components`.
///
/// Fails fast with `Configuration` when a field references a missing component
/// or one of the wrong kind, and with `UnsupportedCombination` when a shared
/// combo axis would mix units.
pub fn bind_variables(
    config: &ChartConfig,
    components: &Components,
) -> ChartResult<ChartVariables> {
    let variables = match config {
        ChartConfig::Column(column) => ChartVariables::Column(BandVariables {
            category: bind_axis(components, &column.fields.x, "x")?,
            value: bind_measure(components, &column.fields.y, "y")?,
            segment: bind_optional_segment(components, column.fields.segment.as_ref())?,
            animation: bind_animation(components, column.fields.animation.as_ref())?,
            normalized: config.is_normalized(),
        }),
        ChartConfig::Bar(bar) => ChartVariables::Bar(BandVariables {
            category: bind_axis(components, &bar.fields.y, "y")?,
            value: bind_measure(components, &bar.fields.x, "x")?,
            segment: bind_optional_segment(components, bar.fields.segment.as_ref())?,
            animation: bind_animation(components, bar.fields.animation.as_ref())?,
            normalized: config.is_normalized(),
        }),
        ChartConfig::Line(line) => ChartVariables::Line(LineVariables {
            x: bind_temporal(components, &line.fields.x.component_id, "x")?,
            y: bind_measure(components, &line.fields.y, "y")?,
            segment: bind_optional_segment(components, line.fields.segment.as_ref())?,
            normalized: false,
        }),
        ChartConfig::Area(area) => ChartVariables::Area(LineVariables {
            x: bind_temporal(components, &area.fields.x.component_id, "x")?,
            y: bind_measure(components, &area.fields.y, "y")?,
            segment: bind_optional_segment(components, area.fields.segment.as_ref())?,
            normalized: config.is_normalized(),
        }),
        ChartConfig::Pie(pie) => ChartVariables::Pie(PieVariables {
            y: bind_measure(components, &pie.fields.y, "y")?,
            segment: bind_segment(components, &pie.fields.segment)?,
            animation: bind_animation(components, pie.fields.animation.as_ref())?,
        }),
        ChartConfig::Scatter(scatter) => ChartVariables::Scatter(ScatterVariables {
            x: bind_measure(components, &scatter.fields.x, "x")?,
            y: bind_measure(components, &scatter.fields.y, "y")?,
            segment: bind_optional_segment(components, scatter.fields.segment.as_ref())?,
            animation: bind_animation(components, scatter.fields.animation.as_ref())?,
        }),
        ChartConfig::Table(table) => ChartVariables::Table(bind_table(components, table)?),
        ChartConfig::Map(map) => ChartVariables::Map(bind_map(components, map)?),
        ChartConfig::ComboLineSingle(combo) => {
            let x = bind_temporal(components, &combo.fields.x.component_id, "x")?;
            if combo.fields.y.component_ids.is_empty() {
                return Err(ChartError::Configuration(
                    "combo line chart needs at least one measure".to_owned(),
                ));
            }
            let measures = combo
                .fields
                .y
                .component_ids
                .iter()
                .map(|id| bind_measure_id(components, id, "y"))
                .collect::<ChartResult<Vec<_>>>()?;
            let first_unit = measures[0].measure.unit.as_deref();
            if let Some(other) = measures
                .iter()
                .find(|measure| measure.measure.unit.as_deref() != first_unit)
            {
                return Err(ChartError::UnsupportedCombination(format!(
                    "measures `{}` and `{}` have different units and cannot share one axis",
                    measures[0].measure.label, other.measure.label
                )));
            }
            ChartVariables::ComboLineSingle(ComboSingleVariables {
                x,
                measures,
                color_mapping: combo.fields.y.color_mapping.clone(),
            })
        }
        ChartConfig::ComboLineDual(combo) => {
            let y = &combo.fields.y;
            if y.left_axis_component_id == y.right_axis_component_id {
                return Err(ChartError::Configuration(format!(
                    "dual-axis chart binds `{}` to both axes",
                    y.left_axis_component_id
                )));
            }
            ChartVariables::ComboLineDual(ComboDualVariables {
                x: bind_temporal(components, &combo.fields.x.component_id, "x")?,
                left: bind_measure_id(components, &y.left_axis_component_id, "left axis")?,
                right: bind_measure_id(components, &y.right_axis_component_id, "right axis")?,
            })
        }
        ChartConfig::ComboLineColumn(combo) => {
            let y = &combo.fields.y;
            if y.line_component_id == y.column_component_id {
                return Err(ChartError::Configuration(format!(
                    "line/column chart binds `{}` as both line and column",
                    y.line_component_id
                )));
            }
            ChartVariables::ComboLineColumn(ComboLineColumnVariables {
                x: bind_temporal(components, &combo.fields.x.component_id, "x")?,
                line: bind_measure_id(components, &y.line_component_id, "line")?,
                column: bind_measure_id(components, &y.column_component_id, "column")?,
                line_axis: y.line_axis_orientation,
            })
        }
    };
    debug!(chart_type = ?variables.chart_type(), "bound chart variables");
    Ok(variables)
}

fn find_dimension<'a>(
    components: &'a Components,
    id: &str,
    role: &str,
) -> ChartResult<&'a Dimension> {
    match components.find(id) {
        Some(ComponentRef::Dimension(dimension)) => Ok(dimension),
        Some(ComponentRef::Measure(_)) => Err(ChartError::Configuration(format!(
            "{role} field `{id}` must reference a dimension, found a measure"
        ))),
        None => Err(ChartError::Configuration(format!(
            "{role} field references unknown component `{id}`"
        ))),
    }
}

fn find_measure<'a>(components: &'a Components, id: &str, role: &str) -> ChartResult<&'a Measure> {
    match components.find(id) {
        Some(ComponentRef::Measure(measure)) => Ok(measure),
        Some(ComponentRef::Dimension(_)) => Err(ChartError::Configuration(format!(
            "{role} field `{id}` must reference a measure, found a dimension"
        ))),
        None => Err(ChartError::Configuration(format!(
            "{role} field references unknown component `{id}`"
        ))),
    }
}

fn category_accessor(dimension: &Dimension, use_abbreviations: bool) -> CategoryAccessor {
    if use_abbreviations {
        CategoryAccessor::with_abbreviations(dimension)
    } else {
        CategoryAccessor::new(dimension.id.clone())
    }
}

fn bind_axis(components: &Components, field: &AxisField, role: &str) -> ChartResult<AxisVariable> {
    let dimension = find_dimension(components, &field.component_id, role)?;
    let accessor = match dimension.kind.time_spec() {
        Some((unit, format)) if dimension.kind.is_temporal() => {
            AxisAccessor::Temporal(TemporalAccessor::new(dimension.id.clone(), unit, format))
        }
        _ => AxisAccessor::Category(category_accessor(dimension, field.use_abbreviations)),
    };
    Ok(AxisVariable {
        accessor,
        dimension: dimension.clone(),
        sorting: field.sorting,
    })
}

fn bind_temporal(components: &Components, id: &str, role: &str) -> ChartResult<TemporalVariable> {
    let dimension = find_dimension(components, id, role)?;
    match dimension.kind.time_spec() {
        Some((unit, format)) => Ok(TemporalVariable {
            accessor: TemporalAccessor::new(dimension.id.clone(), unit, format),
            dimension: dimension.clone(),
        }),
        None => Err(ChartError::Configuration(format!(
            "{role} field `{id}` must reference a temporal dimension"
        ))),
    }
}

fn bind_measure(
    components: &Components,
    field: &MeasureField,
    role: &str,
) -> ChartResult<MeasureVariable> {
    let measure = find_measure(components, &field.component_id, role)?;
    if let Some([start, end]) = field.custom_domain {
        if !start.is_finite() || !end.is_finite() || start == end {
            return Err(ChartError::Configuration(format!(
                "{role} custom domain [{start}, {end}] must be finite and non-empty"
            )));
        }
    }
    Ok(MeasureVariable {
        accessor: MeasureAccessor::new(measure.id.clone()),
        measure: measure.clone(),
        custom_domain: field.custom_domain,
        show_values: field.show_values,
        imputation: field.imputation_type,
    })
}

fn bind_measure_id(components: &Components, id: &str, role: &str) -> ChartResult<MeasureVariable> {
    bind_measure(
        components,
        &MeasureField {
            component_id: id.to_owned(),
            custom_domain: None,
            show_values: false,
            imputation_type: ImputationType::None,
        },
        role,
    )
}

fn bind_segment(components: &Components, field: &SegmentField) -> ChartResult<SegmentVariable> {
    let dimension = find_dimension(components, &field.component_id, "segment")?;
    Ok(SegmentVariable {
        accessor: category_accessor(dimension, field.use_abbreviations),
        dimension: dimension.clone(),
        layout: field.layout,
        sorting: field.sorting,
        color_mapping: field.color_mapping.clone(),
    })
}

fn bind_optional_segment(
    components: &Components,
    field: Option<&SegmentField>,
) -> ChartResult<Option<SegmentVariable>> {
    field.map(|field| bind_segment(components, field)).transpose()
}

fn bind_animation(
    components: &Components,
    field: Option<&AnimationField>,
) -> ChartResult<Option<AnimationVariable>> {
    field
        .map(|field| {
            let dimension = find_dimension(components, &field.component_id, "animation")?;
            Ok(AnimationVariable {
                accessor: CategoryAccessor::new(dimension.id.clone()),
                dimension: dimension.clone(),
            })
        })
        .transpose()
}

fn bind_table(
    components: &Components,
    table: &crate::core::config::TableConfig,
) -> ChartResult<TableVariables> {
    let mut columns = Vec::with_capacity(table.fields.len());
    for (component_id, column) in &table.fields {
        if column.hidden {
            continue;
        }
        let (label, cell) = match components.find(component_id) {
            Some(ComponentRef::Dimension(dimension)) => (
                dimension.label.clone(),
                TableCell::Dimension(
                    CategoryAccessor::new(dimension.id.clone()),
                    dimension.clone(),
                ),
            ),
            Some(ComponentRef::Measure(measure)) => (
                measure.label.clone(),
                TableCell::Measure(MeasureAccessor::new(measure.id.clone()), measure.clone()),
            ),
            None => {
                return Err(ChartError::Configuration(format!(
                    "table column references unknown component `{component_id}`"
                )));
            }
        };
        columns.push(TableColumnVariable {
            component_id: component_id.clone(),
            label,
            index: column.index,
            cell,
        });
    }
    columns.sort_by_key(|column| column.index);

    for option in &table.sorting {
        if components.find(&option.component_id).is_none() {
            return Err(ChartError::Configuration(format!(
                "table sorting references unknown component `{}`",
                option.component_id
            )));
        }
    }

    Ok(TableVariables {
        columns,
        sorting: table.sorting.clone(),
    })
}

fn bind_map(
    components: &Components,
    map: &crate::core::config::MapConfig,
) -> ChartResult<MapVariables> {
    let area = match &map.fields.area_layer {
        Some(layer) => {
            let dimension = find_dimension(components, &layer.component_id, "area layer")?;
            if !matches!(dimension.kind, crate::core::DimensionKind::GeoShapes) {
                return Err(ChartError::Configuration(format!(
                    "area layer field `{}` must reference a geographic shapes dimension",
                    layer.component_id
                )));
            }
            Some(MapAreaVariables {
                feature: CategoryAccessor::new(dimension.id.clone()),
                dimension: dimension.clone(),
                color: bind_measure_id(components, &layer.color.component_id, "area color")?,
                palette: layer.color.palette.clone(),
            })
        }
        None => None,
    };
    let symbol = match &map.fields.symbol_layer {
        Some(layer) => {
            let dimension = find_dimension(components, &layer.component_id, "symbol layer")?;
            if !dimension.kind.is_geographic() {
                return Err(ChartError::Configuration(format!(
                    "symbol layer field `{}` must reference a geographic dimension",
                    layer.component_id
                )));
            }
            Some(MapSymbolVariables {
                feature: CategoryAccessor::new(dimension.id.clone()),
                dimension: dimension.clone(),
                size: layer
                    .measure_id
                    .as_deref()
                    .map(|id| bind_measure_id(components, id, "symbol size"))
                    .transpose()?,
                color: layer.color.clone(),
            })
        }
        None => None,
    };
    Ok(MapVariables {
        area,
        symbol,
        animation: bind_animation(components, map.fields.animation.as_ref())?,
    })
}
