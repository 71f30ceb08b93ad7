use approx::assert_relative_eq;
use indexmap::IndexMap;
use obs_charts::api::{ChartInputs, GeoFeature, PipelineConfig, compute_render_data};
use obs_charts::core::color::palette_color;
use obs_charts::core::config::{
    AnimationField, AxisField, BarConfig, BarFields, ColumnConfig, ColumnFields,
    ComboLineColumnConfig, ComboLineColumnFields, ComboLineColumnY, ComboLineDualConfig,
    ComboLineDualFields, ComboLineDualY, ComboLineSingleConfig, ComboLineSingleFields,
    ComboLineSingleY, GenericField, LineConfig, LineFields, MapAreaLayer, MapConfig, MapFields,
    MeasureColorField, MeasureField, PieConfig, PieFields, ScatterConfig, ScatterFields,
    SegmentField, TableColumn, TableConfig, TableSortingOption,
};
use obs_charts::core::{
    AxisSide, CalculationType, ChartConfig, ChartType, Components, Dimension, DimensionKind,
    ImputationType, Measure, Observation, ObservationValue, SegmentLayout, SortingOrder,
    TimeUnit, Viewport,
};
use obs_charts::interaction::HitTester;
use obs_charts::render::{Color, Shape, TransitionOptions};
use obs_charts::{ChartError, ChartScene};

fn pipeline_config() -> PipelineConfig {
    PipelineConfig::new(Viewport::new(640, 400)).with_transitions(TransitionOptions::disabled())
}

fn nominal(id: &str, label: &str) -> Dimension {
    Dimension::new(id, label, DimensionKind::Nominal)
}

fn daily(id: &str) -> Dimension {
    Dimension::new(
        id,
        "Date",
        DimensionKind::Temporal {
            time_unit: TimeUnit::Day,
            time_format: "%Y-%m-%d".to_owned(),
        },
    )
}

fn render(config: &ChartConfig, components: &Components, rows: Vec<Observation>) -> ChartScene {
    compute_render_data(&ChartInputs::new(rows), config, components, &pipeline_config())
        .expect("render data")
}

fn column_config(segment: Option<SegmentField>, calculation: CalculationType) -> ChartConfig {
    ChartConfig::Column(ColumnConfig {
        fields: ColumnFields {
            x: AxisField::new("region"),
            y: MeasureField::new("amount"),
            segment,
            animation: None,
        },
        calculation,
    })
}

fn rect(shape: &Shape) -> (f64, f64, f64, f64) {
    match shape {
        Shape::Rect {
            x,
            y,
            width,
            height,
        } => (*x, *y, *width, *height),
        other => panic!("expected rect, got {other:?}"),
    }
}

#[test]
fn single_column_grows_from_the_zero_baseline() {
    let components = Components::new(
        vec![nominal("region", "Region")],
        vec![Measure::new("amount", "Amount")],
    );
    let scene = render(
        &column_config(None, CalculationType::Identity),
        &components,
        vec![Observation::new().with("region", "A").with("amount", 1500.0)],
    );

    let bars: Vec<_> = scene.data_by_class("column").collect();
    assert_eq!(bars.len(), 1);
    assert_eq!(bars[0].key, "column:A");
    let (_, y, _, height) = rect(&bars[0].shape);
    assert_relative_eq!(y + height, scene.bounds.bottom(), epsilon = 1e-9);
    assert!(height > 0.0);
    assert_eq!(scene.tooltip_rows[0].value_text, "1500");
}

#[test]
fn non_ascii_segment_color_falls_back_to_the_palette() {
    let components = Components::new(
        vec![nominal("region", "Region"), nominal("kind", "Kind")],
        vec![Measure::new("amount", "Amount")],
    );
    let segment = SegmentField::new("kind").with_color("x", "#aéaé");
    let scene = render(
        &column_config(Some(segment), CalculationType::Identity),
        &components,
        vec![
            Observation::new().with("region", "A").with("kind", "x").with("amount", 1.0),
        ],
    );

    assert_eq!(scene.legend.len(), 1);
    assert_eq!(scene.legend[0].color, palette_color(0));
}

#[test]
fn normalized_stacked_tooltip_shows_share_and_raw_value() {
    let components = Components::new(
        vec![nominal("region", "Region"), nominal("kind", "Kind")],
        vec![Measure::new("amount", "Amount").with_unit("ABC")],
    );
    let rows = vec![
        Observation::new().with("region", "A").with("kind", "x").with("amount", 3.0),
        Observation::new().with("region", "A").with("kind", "y").with("amount", 1.0),
    ];
    let scene = render(
        &column_config(Some(SegmentField::new("kind")), CalculationType::Percent),
        &components,
        rows,
    );

    let row = scene
        .tooltip_rows
        .iter()
        .find(|row| row.segment.as_deref() == Some("x"))
        .expect("segment x");
    assert_eq!(row.value_text, "75% (3 ABC)");
    assert_eq!(scene.legend.len(), 2);

    let heights: f64 = scene
        .data_by_class("column")
        .map(|datum| rect(&datum.shape).3)
        .sum();
    assert_relative_eq!(heights, scene.bounds.chart_height(), epsilon = 1e-6);
}

#[test]
fn custom_domain_clips_the_value_axis_unless_normalized() {
    let components = Components::new(
        vec![nominal("region", "Region")],
        vec![Measure::new("amount", "Amount")],
    );
    let rows = vec![Observation::new().with("region", "A").with("amount", 1.0)];
    let config = ChartConfig::Column(ColumnConfig {
        fields: ColumnFields {
            x: AxisField::new("region"),
            y: MeasureField::new("amount").with_custom_domain(-1.0, 1.0),
            segment: None,
            animation: None,
        },
        calculation: CalculationType::Identity,
    });
    let scene = render(&config, &components, rows.clone());
    let (_, y, _, height) = rect(&scene.data[0].shape);
    assert_relative_eq!(y, scene.bounds.top(), epsilon = 1e-9);
    assert_relative_eq!(height, scene.bounds.chart_height() / 2.0, epsilon = 1e-9);

    let ChartConfig::Column(mut normalized) = config else {
        unreachable!()
    };
    normalized.calculation = CalculationType::Percent;
    let scene = render(&ChartConfig::Column(normalized), &components, rows);
    let (_, _, _, height) = rect(&scene.data[0].shape);
    assert_relative_eq!(height, scene.bounds.chart_height(), epsilon = 1e-9);
}

#[test]
fn grouped_bars_share_a_band_side_by_side() {
    let components = Components::new(
        vec![nominal("region", "Region"), nominal("kind", "Kind")],
        vec![Measure::new("amount", "Amount")],
    );
    let config = ChartConfig::Bar(BarConfig {
        fields: BarFields {
            x: MeasureField::new("amount").with_show_values(),
            y: AxisField::new("region"),
            segment: Some(SegmentField::new("kind").with_layout(SegmentLayout::Grouped)),
            animation: None,
        },
        calculation: CalculationType::Identity,
    });
    let rows = vec![
        Observation::new().with("region", "A").with("kind", "x").with("amount", 3.0),
        Observation::new().with("region", "A").with("kind", "y").with("amount", 5.0),
    ];
    let scene = render(&config, &components, rows);
    assert_eq!(scene.chart_type, ChartType::Bar);

    let bars: Vec<_> = scene.data_by_class("bar").collect();
    assert_eq!(bars.len(), 2);
    let (x0, y0, w0, h0) = rect(&bars[0].shape);
    let (x1, y1, w1, _) = rect(&bars[1].shape);
    assert_relative_eq!(x0, x1, epsilon = 1e-9);
    assert!(y1 >= y0 + h0 - 1e-9);
    assert!(w1 > w0);
    assert_eq!(
        bars[0].value_label.as_ref().map(|label| label.text.as_str()),
        Some("3")
    );
}

#[test]
fn linear_imputation_fills_the_missing_middle_point() {
    let components = Components::new(vec![daily("date")], vec![Measure::new("v", "Value")]);
    let config = ChartConfig::Line(LineConfig {
        fields: LineFields {
            x: GenericField::new("date"),
            y: MeasureField::new("v").with_imputation(ImputationType::Linear),
            segment: None,
        },
    });
    let rows = vec![
        Observation::new().with("date", "2024-01-01").with("v", 0.0),
        Observation::new().with("date", "2024-01-02").with("v", ObservationValue::Null),
        Observation::new().with("date", "2024-01-04").with("v", 3.0),
    ];
    let scene = render(&config, &components, rows);

    assert_eq!(scene.data_by_class("line").count(), 1);
    let values: Vec<&str> = scene
        .tooltip_rows
        .iter()
        .map(|row| row.value_text.as_str())
        .collect();
    assert_eq!(values, vec!["0", "1", "3"]);
    assert!(matches!(scene.hit_tester, HitTester::NearestPoint(_)));
}

#[test]
fn line_without_imputation_drops_gaps() {
    let components = Components::new(vec![daily("date")], vec![Measure::new("v", "Value")]);
    let config = ChartConfig::Line(LineConfig {
        fields: LineFields {
            x: GenericField::new("date"),
            y: MeasureField::new("v"),
            segment: None,
        },
    });
    let rows = vec![
        Observation::new().with("date", "2024-01-01").with("v", 0.0),
        Observation::new().with("date", "2024-01-02").with("v", ObservationValue::Null),
        Observation::new().with("date", "2024-01-04").with("v", 3.0),
    ];
    let scene = render(&config, &components, rows);
    assert_eq!(scene.tooltip_rows.len(), 2);
}

#[test]
fn mismatched_units_on_a_shared_axis_render_a_hint() {
    let components = Components::new(
        vec![daily("date")],
        vec![
            Measure::new("a", "Alpha").with_unit("CHF"),
            Measure::new("b", "Beta").with_unit("kg"),
        ],
    );
    let config = ChartConfig::ComboLineSingle(ComboLineSingleConfig {
        fields: ComboLineSingleFields {
            x: GenericField::new("date"),
            y: ComboLineSingleY {
                component_ids: vec!["a".to_owned(), "b".to_owned()],
                color_mapping: IndexMap::new(),
            },
        },
    });
    let scene = render(
        &config,
        &components,
        vec![Observation::new().with("date", "2024-01-01").with("a", 1.0).with("b", 2.0)],
    );
    assert!(scene.hint.is_some());
    assert!(scene.data.is_empty());
    assert_eq!(scene.to_frame().by_class("hint").count(), 1);
}

#[test]
fn field_bound_to_wrong_component_kind_is_a_configuration_error() {
    let components = Components::new(
        vec![nominal("region", "Region")],
        vec![Measure::new("amount", "Amount")],
    );
    let config = ChartConfig::Column(ColumnConfig {
        fields: ColumnFields {
            x: AxisField::new("amount"),
            y: MeasureField::new("amount"),
            segment: None,
            animation: None,
        },
        calculation: CalculationType::Identity,
    });
    let err = compute_render_data(&ChartInputs::default(), &config, &components, &pipeline_config())
        .expect_err("measure on a category axis");
    assert!(matches!(err, ChartError::Configuration(_)));
    assert!(err.is_fatal());
}

#[test]
fn dual_axis_combo_rejects_the_same_measure_twice() {
    let components = Components::new(vec![daily("date")], vec![Measure::new("a", "Alpha")]);
    let config = ChartConfig::ComboLineDual(ComboLineDualConfig {
        fields: ComboLineDualFields {
            x: GenericField::new("date"),
            y: ComboLineDualY {
                left_axis_component_id: "a".to_owned(),
                right_axis_component_id: "a".to_owned(),
            },
        },
    });
    let err = compute_render_data(&ChartInputs::default(), &config, &components, &pipeline_config())
        .expect_err("duplicate measure");
    assert!(matches!(err, ChartError::Configuration(_)));
}

#[test]
fn dual_axis_combo_draws_one_line_per_axis() {
    let components = Components::new(
        vec![daily("date")],
        vec![Measure::new("a", "Alpha"), Measure::new("b", "Beta").with_unit("%")],
    );
    let config = ChartConfig::ComboLineDual(ComboLineDualConfig {
        fields: ComboLineDualFields {
            x: GenericField::new("date"),
            y: ComboLineDualY {
                left_axis_component_id: "a".to_owned(),
                right_axis_component_id: "b".to_owned(),
            },
        },
    });
    let rows = vec![
        Observation::new().with("date", "2024-01-01").with("a", 10.0).with("b", 0.5),
        Observation::new().with("date", "2024-01-02").with("a", 20.0).with("b", 0.7),
    ];
    let scene = render(&config, &components, rows);
    assert_eq!(scene.data_by_class("line").count(), 2);
    assert_eq!(scene.legend.len(), 2);
    assert!(matches!(scene.hit_tester, HitTester::Voronoi(_)));
}

#[test]
fn line_column_combo_draws_columns_and_a_line() {
    let components = Components::new(
        vec![daily("date")],
        vec![Measure::new("a", "Alpha"), Measure::new("b", "Beta")],
    );
    let config = ChartConfig::ComboLineColumn(ComboLineColumnConfig {
        fields: ComboLineColumnFields {
            x: GenericField::new("date"),
            y: ComboLineColumnY {
                line_component_id: "a".to_owned(),
                line_axis_orientation: AxisSide::Right,
                column_component_id: "b".to_owned(),
            },
        },
    });
    let rows = vec![
        Observation::new().with("date", "2024-01-01").with("a", 1.0).with("b", 4.0),
        Observation::new().with("date", "2024-01-02").with("a", 2.0).with("b", 5.0),
        Observation::new().with("date", "2024-01-03").with("a", 3.0).with("b", 6.0),
    ];
    let scene = render(&config, &components, rows);
    assert_eq!(scene.data_by_class("column").count(), 3);
    assert_eq!(scene.data_by_class("line").count(), 1);
    assert!(matches!(scene.hit_tester, HitTester::Bands(_)));
}

#[test]
fn pie_slices_cover_the_full_circle_in_proportion() {
    let components = Components::new(
        vec![nominal("kind", "Kind")],
        vec![Measure::new("amount", "Amount")],
    );
    let config = ChartConfig::Pie(PieConfig {
        fields: PieFields {
            y: MeasureField::new("amount"),
            segment: SegmentField::new("kind"),
            animation: None,
        },
    });
    let rows = vec![
        Observation::new().with("kind", "a").with("amount", 1.0),
        Observation::new().with("kind", "b").with("amount", 3.0),
        Observation::new().with("kind", "c").with("amount", -2.0),
    ];
    let scene = render(&config, &components, rows);

    let arcs: Vec<(f64, f64)> = scene
        .data_by_class("pie")
        .map(|datum| match datum.shape {
            Shape::Arc {
                start_angle,
                end_angle,
                ..
            } => (start_angle, end_angle),
            ref other => panic!("expected arc, got {other:?}"),
        })
        .collect();
    assert_eq!(arcs.len(), 2);
    assert_relative_eq!(arcs[0].0, 0.0);
    assert_relative_eq!(arcs[1].1, std::f64::consts::TAU, epsilon = 1e-9);
    assert_relative_eq!(arcs[0].1 - arcs[0].0, std::f64::consts::TAU / 4.0, epsilon = 1e-9);
    assert!(matches!(scene.hit_tester, HitTester::Arcs(_)));
}

#[test]
fn scatter_points_are_circles_on_linear_scales() {
    let components = Components::new(
        vec![],
        vec![Measure::new("gdp", "GDP"), Measure::new("life", "Life expectancy")],
    );
    let config = ChartConfig::Scatter(ScatterConfig {
        fields: ScatterFields {
            x: MeasureField::new("gdp"),
            y: MeasureField::new("life"),
            segment: None,
            animation: None,
        },
    });
    let rows = vec![
        Observation::new().with("gdp", 10.0).with("life", 70.0),
        Observation::new().with("gdp", 20.0).with("life", 80.0),
        Observation::new().with("gdp", ObservationValue::Null).with("life", 75.0),
    ];
    let scene = render(&config, &components, rows);
    assert_eq!(scene.data_by_class("scatter").count(), 2);
    assert_eq!(scene.observations.len(), 2);
    assert!(
        scene
            .data_by_class("scatter")
            .all(|datum| matches!(datum.shape, Shape::Circle { .. }))
    );
}

#[test]
fn table_rows_follow_multi_column_sorting_with_missing_cells_last() {
    let components = Components::new(
        vec![nominal("region", "Region")],
        vec![Measure::new("amount", "Amount")],
    );
    let mut fields = IndexMap::new();
    fields.insert("amount".to_owned(), TableColumn::visible(1));
    fields.insert("region".to_owned(), TableColumn::visible(0));
    let config = ChartConfig::Table(TableConfig {
        fields,
        sorting: vec![TableSortingOption {
            component_id: "amount".to_owned(),
            sorting_order: SortingOrder::Desc,
        }],
    });
    let rows = vec![
        Observation::new().with("region", "North").with("amount", 2.0),
        Observation::new().with("region", "South").with("amount", ObservationValue::Null),
        Observation::new().with("region", "East").with("amount", 7.0),
    ];
    let scene = render(&config, &components, rows);

    let table = scene.table.as_ref().expect("table layout");
    assert_eq!(table.header, vec!["Region", "Amount"]);
    let first_cells: Vec<&str> = table.rows.iter().map(|row| row.cells[0].as_str()).collect();
    assert_eq!(first_cells, vec!["East", "North", "South"]);
    assert_eq!(table.rows[2].cells[1], "");
    assert_eq!(scene.data_by_class("table-cell").count(), 6);
    assert!(matches!(scene.hit_tester, HitTester::None));
}

#[test]
fn scatter_and_table_keys_survive_removing_an_earlier_row() {
    let components = Components::new(
        vec![nominal("region", "Region")],
        vec![Measure::new("gdp", "GDP"), Measure::new("life", "Life expectancy")],
    );
    let scatter = ChartConfig::Scatter(ScatterConfig {
        fields: ScatterFields {
            x: MeasureField::new("gdp"),
            y: MeasureField::new("life"),
            segment: None,
            animation: None,
        },
    });
    let mut fields = IndexMap::new();
    fields.insert("region".to_owned(), TableColumn::visible(0));
    fields.insert("gdp".to_owned(), TableColumn::visible(1));
    let table = ChartConfig::Table(TableConfig {
        fields,
        sorting: vec![],
    });
    let row = |region: &str, gdp: f64, life: f64| {
        Observation::new()
            .with("region", region)
            .with("gdp", gdp)
            .with("life", life)
    };
    let all = vec![row("North", 10.0, 70.0), row("South", 20.0, 80.0), row("East", 20.0, 80.0)];
    let without_first = all[1..].to_vec();

    for config in [&scatter, &table] {
        let regions_by_key = |rows: Vec<Observation>| -> IndexMap<String, String> {
            let scene = render(config, &components, rows);
            scene
                .data
                .iter()
                .map(|datum| {
                    let source = datum.observation.expect("source row");
                    let region = scene.observations[source].label("region").expect("region");
                    (datum.key.clone(), region)
                })
                .collect()
        };
        let full = regions_by_key(all.clone());
        let trimmed = regions_by_key(without_first.clone());
        assert_eq!(full.len(), render(config, &components, all.clone()).data.len());
        for (key, region) in &trimmed {
            assert_eq!(full.get(key), Some(region), "{:?} {key}", config.chart_type());
        }
    }
}

#[test]
fn unmatched_map_features_are_drawn_neutral() {
    let components = Components::new(
        vec![Dimension::new("canton", "Canton", DimensionKind::GeoShapes)],
        vec![Measure::new("pop", "Population")],
    );
    let config = ChartConfig::Map(MapConfig {
        fields: MapFields {
            area_layer: Some(MapAreaLayer {
                component_id: "canton".to_owned(),
                color: MeasureColorField {
                    component_id: "pop".to_owned(),
                    palette: None,
                },
            }),
            symbol_layer: None,
            animation: None,
        },
    });
    let square = |x: f64| vec![(x, 0.0), (x + 1.0, 0.0), (x + 1.0, 1.0), (x, 1.0)];
    let inputs = ChartInputs::new(vec![Observation::new().with("canton", "ZH").with("pop", 10.0)])
        .with_geo_features(vec![
            GeoFeature::new("ZH").with_ring(square(0.0)),
            GeoFeature::new("BE").with_ring(square(2.0)),
        ]);
    let scene =
        compute_render_data(&inputs, &config, &components, &pipeline_config()).expect("map");

    let areas: Vec<_> = scene.data_by_class("map-area").collect();
    assert_eq!(areas.len(), 2);
    let be = areas
        .iter()
        .find(|datum| datum.key.starts_with("map-area:BE"))
        .expect("BE");
    assert_eq!(be.paint.fill, Color::NEUTRAL);
    assert_eq!(be.observation, None);
    let zh = areas
        .iter()
        .find(|datum| datum.key.starts_with("map-area:ZH"))
        .expect("ZH");
    assert_ne!(zh.paint.fill, Color::NEUTRAL);
    assert_eq!(scene.tooltip_rows.len(), 1);
}

#[test]
fn animation_field_selects_one_frame_and_keys_by_it() {
    let components = Components::new(
        vec![nominal("region", "Region"), nominal("year", "Year")],
        vec![Measure::new("amount", "Amount")],
    );
    let config = ChartConfig::Column(ColumnConfig {
        fields: ColumnFields {
            x: AxisField::new("region"),
            y: MeasureField::new("amount"),
            segment: None,
            animation: Some(AnimationField::new("year")),
        },
        calculation: CalculationType::Identity,
    });
    let rows = vec![
        Observation::new().with("region", "A").with("year", "2021").with("amount", 4.0),
        Observation::new().with("region", "A").with("year", "2020").with("amount", 2.0),
    ];

    let first = compute_render_data(
        &ChartInputs::new(rows.clone()),
        &config,
        &components,
        &pipeline_config(),
    )
    .expect("default frame");
    assert_eq!(first.animation.frames, vec!["2020", "2021"]);
    assert_eq!(first.animation.active.as_deref(), Some("2020"));
    assert_eq!(first.data[0].key, "column:A|2020");

    let second = compute_render_data(
        &ChartInputs::new(rows.clone()).with_active_frame("2021"),
        &config,
        &components,
        &pipeline_config(),
    )
    .expect("second frame");
    assert_eq!(second.data[0].key, "column:A|2021");
    assert_eq!(second.tooltip_rows[0].value_text, "4");

    let unknown = compute_render_data(
        &ChartInputs::new(rows).with_active_frame("1999"),
        &config,
        &components,
        &pipeline_config(),
    )
    .expect("unknown frame");
    assert_eq!(unknown.animation.active.as_deref(), Some("2020"));
}

#[test]
fn identical_inputs_produce_identical_scenes() {
    let components = Components::new(
        vec![nominal("region", "Region"), nominal("kind", "Kind")],
        vec![Measure::new("amount", "Amount")],
    );
    let config = column_config(Some(SegmentField::new("kind")), CalculationType::Identity);
    let rows = vec![
        Observation::new().with("region", "A").with("kind", "x").with("amount", 3.0),
        Observation::new().with("region", "B").with("kind", "y").with("amount", 1.0),
        Observation::new().with("region", "B").with("kind", "x").with("amount", -2.0),
    ];
    let first = render(&config, &components, rows.clone());
    let second = render(&config, &components, rows);
    assert_eq!(first, second);
    assert_eq!(first.to_frame(), second.to_frame());
}
