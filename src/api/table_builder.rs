//! Table layout: visible columns in index order, rows in multi-column sort order.

use std::cmp::Ordering;

use ordered_float::OrderedFloat;
use tracing::{debug, trace};

use crate::api::chart_builder::{BuildContext, OccurrenceKeys};
use crate::api::scene::{ChartScene, RenderDatum, TableLayout, TableRow};
use crate::core::format::format_with_unit;
use crate::core::sorting::compare_label;
use crate::core::variables::{TableCell, TableColumnVariable, TableVariables};
use crate::core::{Category, ChartType, Observation, SortingOrder};
use crate::error::ChartResult;
use crate::render::{Color, Paint, Primitive, Shape, TextHAlign};

const CELL_PADDING_PX: f64 = 6.0;

fn cell_text(cell: &TableCell, row: &Observation) -> String {
    match cell {
        TableCell::Dimension(accessor, _) => accessor.label(row).unwrap_or_default(),
        TableCell::Measure(accessor, measure) => accessor
            .get(row)
            .map(|value| format_with_unit(value, measure.unit.as_deref()))
            .unwrap_or_default(),
    }
}

/// Identity of a row for keying: its dimension keys, or every cell when the
/// table shows no dimension.
fn row_identity(vars: &TableVariables, row: &Observation) -> String {
    let dimension_keys: Vec<String> = vars
        .columns
        .iter()
        .filter_map(|column| match &column.cell {
            TableCell::Dimension(accessor, _) => Some(accessor.key(row).unwrap_or_default()),
            TableCell::Measure(..) => None,
        })
        .collect();
    if dimension_keys.is_empty() {
        vars.columns
            .iter()
            .map(|column| cell_text(&column.cell, row))
            .collect::<Vec<_>>()
            .join("/")
    } else {
        dimension_keys.join("/")
    }
}

/// Ascending comparison of one column; missing cells sort last in either order.
fn compare_cells(
    cell: &TableCell,
    a: &Observation,
    b: &Observation,
    order: SortingOrder,
) -> Ordering {
    let directed = |ordering: Ordering| match order {
        SortingOrder::Asc => ordering,
        SortingOrder::Desc => ordering.reverse(),
    };
    match cell {
        TableCell::Dimension(accessor, dimension) => {
            let category = |row: &Observation| {
                let key = accessor.key(row)?;
                let label = accessor.label(row).unwrap_or_else(|| key.clone());
                Some(Category::from_dimension(Some(dimension), &key, &label))
            };
            match (category(a), category(b)) {
                (Some(left), Some(right)) => compare_label(&left, &right, order),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            }
        }
        TableCell::Measure(accessor, _) => match (accessor.get(a), accessor.get(b)) {
            (Some(left), Some(right)) => directed(OrderedFloat(left).cmp(&OrderedFloat(right))),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
    }
}

/// Row indices of `rows` in sort order. Sorting is stable, so unsorted ties
/// keep their input order.
pub(crate) fn sorted_row_order(vars: &TableVariables, rows: &[Observation]) -> Vec<usize> {
    let criteria: Vec<(&TableColumnVariable, SortingOrder)> = vars
        .sorting
        .iter()
        .filter_map(|option| {
            let column = vars
                .columns
                .iter()
                .find(|column| column.component_id == option.component_id);
            if column.is_none() {
                trace!(
                    component_id = %option.component_id,
                    "table sort option names no visible column"
                );
            }
            column.map(|column| (column, option.sorting_order))
        })
        .collect();

    let mut order: Vec<usize> = (0..rows.len()).collect();
    order.sort_by(|&a, &b| {
        criteria
            .iter()
            .map(|(column, sorting_order)| {
                compare_cells(&column.cell, &rows[a], &rows[b], *sorting_order)
            })
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    });
    order
}

pub(crate) fn build_table(
    vars: &TableVariables,
    ctx: &BuildContext<'_>,
) -> ChartResult<ChartScene> {
    let mut scene = ChartScene::empty(ChartType::Table, ctx.bounds, ctx.config.font_size_px);
    let bounds = ctx.bounds;
    let row_height = ctx.config.table_row_height_px;
    let font_size = ctx.config.font_size_px;
    let column_width = if vars.columns.is_empty() {
        0.0
    } else {
        bounds.chart_width() / vars.columns.len() as f64
    };
    let baseline = |row_index: usize| {
        bounds.top() + row_height * (row_index as f64 + 1.0) - (row_height - font_size) / 2.0
    };
    let anchor = |column_index: usize, cell: &TableCell| {
        let left = bounds.left() + column_width * column_index as f64;
        match cell {
            TableCell::Dimension(..) => (left + CELL_PADDING_PX, TextHAlign::Left),
            TableCell::Measure(..) => (left + column_width - CELL_PADDING_PX, TextHAlign::Right),
        }
    };

    let header: Vec<String> = vars.columns.iter().map(|column| column.label.clone()).collect();
    for (column_index, column) in vars.columns.iter().enumerate() {
        let (x, h_align) = anchor(column_index, &column.cell);
        scene.overlays.push(Primitive::new(
            format!("table-header:{}", column.component_id),
            "table-header",
            Shape::Text {
                x,
                y: baseline(0),
                text: column.label.clone(),
                font_size_px: font_size,
                h_align,
            },
            Paint::fill(Color::TEXT),
        ));
    }

    let order = sorted_row_order(vars, ctx.rows);
    let mut rows = Vec::with_capacity(order.len());
    let mut row_keys = OccurrenceKeys::default();
    for (position, observation) in order.into_iter().enumerate() {
        let row = &ctx.rows[observation];
        let cells: Vec<String> = vars
            .columns
            .iter()
            .map(|column| cell_text(&column.cell, row))
            .collect();
        let identity = row_keys.key_for(row_identity(vars, row));
        for ((column_index, column), text) in vars.columns.iter().enumerate().zip(&cells) {
            let (x, h_align) = anchor(column_index, &column.cell);
            scene.data.push(
                RenderDatum::new(
                    ctx.datum_key(
                        "table-cell",
                        &[Some(identity.as_str()), Some(column.component_id.as_str())],
                    ),
                    "table-cell",
                    Shape::Text {
                        x,
                        y: baseline(position + 1),
                        text: text.clone(),
                        font_size_px: font_size,
                        h_align,
                    },
                    Paint::fill(Color::TEXT),
                )
                .with_source(Some(observation), None),
            );
        }
        rows.push(TableRow { observation, cells });
    }

    debug!(columns = header.len(), rows = rows.len(), "built table layout");
    scene.table = Some(TableLayout { header, rows });
    scene.observations = ctx.rows.to_vec();
    Ok(scene)
}
