use obs_charts::ChartError;
use obs_charts::api::{
    CHART_CONFIG_JSON_SCHEMA_V1, ChartInputs, PipelineConfig, SceneSnapshot, compute_render_data,
};
use obs_charts::core::config::{AxisField, ColumnConfig, ColumnFields, MeasureField, SegmentField};
use obs_charts::core::{
    CalculationType, ChartConfig, ChartType, Components, Dimension, DimensionKind, ImputationType,
    Measure, Observation, SegmentLayout, Sorting, SortingOrder, SortingType, Viewport,
};
use obs_charts::render::{Primitive, TransitionOptions};

fn grouped_column() -> ChartConfig {
    ChartConfig::Column(ColumnConfig {
        fields: ColumnFields {
            x: AxisField::new("region")
                .with_sorting(Sorting::new(SortingType::ByMeasure, SortingOrder::Desc)),
            y: MeasureField::new("amount").with_show_values(),
            segment: Some(
                SegmentField::new("kind")
                    .with_layout(SegmentLayout::Grouped)
                    .with_color("x", "#ff0000"),
            ),
            animation: None,
        },
        calculation: CalculationType::Identity,
    })
}

fn keys_of(primitives: &[Primitive]) -> Vec<&str> {
    primitives.iter().map(|primitive| primitive.key.as_str()).collect()
}

#[test]
fn chart_config_round_trips_through_the_versioned_contract() {
    let config = grouped_column();
    let json = config.to_json_contract_v1_pretty().expect("serialize");
    assert!(json.contains(&format!("\"schema_version\": {CHART_CONFIG_JSON_SCHEMA_V1}")));
    assert!(json.contains("\"chartType\": \"column\""));
    assert_eq!(ChartConfig::from_json_compat_str(&json).expect("parse"), config);
}

#[test]
fn bare_chart_config_documents_use_field_defaults() {
    let json = r#"{
        "chartType": "line",
        "fields": {
            "x": { "componentId": "date" },
            "y": { "componentId": "amount", "imputationType": "linear" }
        }
    }"#;
    let config = ChartConfig::from_json_compat_str(json).expect("parse");
    assert_eq!(config.chart_type(), ChartType::Line);
    let ChartConfig::Line(line) = config else {
        panic!("expected line config");
    };
    assert_eq!(line.fields.y.imputation_type, ImputationType::Linear);
    assert!(line.fields.segment.is_none());
    assert!(!line.fields.y.show_values);
}

#[test]
fn malformed_chart_config_is_a_serialization_error() {
    let err = ChartConfig::from_json_compat_str(r#"{ "chartType": "radar" }"#).expect_err("radar");
    assert!(matches!(err, ChartError::Serialization(_)));
}

#[test]
fn pipeline_config_defaults_survive_a_round_trip() {
    let config = PipelineConfig::new(Viewport::new(800, 600))
        .with_transitions(TransitionOptions::disabled());
    let json = config.to_json_contract_v1_pretty().expect("serialize");
    let parsed = PipelineConfig::from_json_compat_str(&json).expect("parse");
    assert_eq!(parsed, config);
    assert!(!parsed.transitions.enabled);
}

#[test]
fn scene_snapshot_keeps_primitive_keys_and_tooltips() {
    let components = Components::new(
        vec![
            Dimension::new("region", "Region", DimensionKind::Nominal),
            Dimension::new("kind", "Kind", DimensionKind::Nominal),
        ],
        vec![Measure::new("amount", "Amount")],
    );
    let rows = vec![
        Observation::new().with("region", "North").with("kind", "x").with("amount", 2.0),
        Observation::new().with("region", "North").with("kind", "y").with("amount", 4.0),
        Observation::new().with("region", "South").with("kind", "x").with("amount", 1.0),
    ];
    let pipeline_config = PipelineConfig::new(Viewport::new(400, 300));
    let scene = compute_render_data(
        &ChartInputs::new(rows),
        &grouped_column(),
        &components,
        &pipeline_config,
    )
    .expect("scene");

    let json = scene.snapshot_json_contract_v1_pretty().expect("serialize");
    let snapshot = SceneSnapshot::from_json_compat_str(&json).expect("parse");
    let expected = scene.snapshot();

    assert_eq!(snapshot.chart_type, ChartType::Column);
    assert_eq!(snapshot.viewport, Viewport::new(400, 300));
    assert_eq!(keys_of(&snapshot.primitives), keys_of(&expected.primitives));
    assert_eq!(snapshot.tooltip_rows.len(), 3);
    assert_eq!(snapshot.legend.len(), 2);
    assert_eq!(snapshot.hint, None);
}

#[test]
fn snapshot_with_unknown_version_is_rejected() {
    let payload = serde_json::json!({
        "schema_version": 7,
        "snapshot": {
            "chartType": "pie",
            "viewport": { "width": 10, "height": 10 },
            "primitives": []
        }
    });
    let err = SceneSnapshot::from_json_compat_str(&payload.to_string()).expect_err("version");
    assert!(matches!(err, ChartError::Serialization(message) if message.contains('7')));
}
