use criterion::{Criterion, criterion_group, criterion_main};
use indexmap::IndexMap;
use obs_charts::api::{ChartInputs, PipelineConfig, compute_render_data};
use obs_charts::core::config::{AxisField, ColumnConfig, ColumnFields, MeasureField, SegmentField};
use obs_charts::core::{
    CalculationType, Category, ChartConfig, Components, Dimension, DimensionKind, LinearScale,
    Measure, MeasureBasis, Observation, Point, Sorting, SortingOrder, SortingType, StackEntry,
    Viewport, sort_categories, stack,
};
use obs_charts::interaction::{HitTarget, VoronoiPicker};
use std::hint::black_box;

fn bench_linear_scale_round_trip(c: &mut Criterion) {
    let scale = LinearScale::new((0.0, 10_000.0), (1_080.0, 0.0)).expect("valid scale");

    c.bench_function("linear_scale_round_trip", |b| {
        b.iter(|| {
            let px = scale.scale(black_box(4_321.123));
            let _ = scale.invert(px);
        })
    });
}

fn bench_stack_200x10(c: &mut Criterion) {
    let x_keys: Vec<String> = (0..200).map(|i| format!("x{i}")).collect();
    let segments: Vec<String> = (0..10).map(|i| format!("s{i}")).collect();
    let entries: Vec<StackEntry> = x_keys
        .iter()
        .flat_map(|x| segments.iter().map(move |s| (x, s)))
        .enumerate()
        .map(|(i, (x, s))| {
            let value = if i % 7 == 0 { -(i as f64) } else { i as f64 * 0.5 };
            StackEntry::new(x.clone(), s.clone(), value, i)
        })
        .collect();

    c.bench_function("stack_200x10", |b| {
        b.iter(|| {
            let _ = stack(black_box(&entries), black_box(&x_keys), black_box(&segments));
        })
    });
}

fn bench_sort_categories_by_measure_5k(c: &mut Criterion) {
    let categories: Vec<Category> = (0..5_000)
        .map(|i| Category::new(format!("k{i}"), format!("label {}", (i * 7_919) % 5_000)))
        .collect();
    let values: IndexMap<String, f64> = (0..5_000)
        .map(|i| (format!("k{i}"), ((i * 31) % 97) as f64))
        .collect();
    let sorting = Sorting::new(SortingType::ByMeasure, SortingOrder::Desc);

    c.bench_function("sort_categories_by_measure_5k", |b| {
        b.iter(|| {
            let mut categories = categories.clone();
            sort_categories(&mut categories, sorting, MeasureBasis::Values(black_box(&values)));
        })
    });
}

fn bench_voronoi_pick_10k(c: &mut Criterion) {
    let sites: Vec<(Point, HitTarget)> = (0..10_000)
        .map(|i| {
            let point = Point::new(((i * 37) % 1_920) as f64, ((i * 53) % 1_080) as f64);
            (point, HitTarget::new(i, None, point))
        })
        .collect();
    let picker = VoronoiPicker::build(sites);

    c.bench_function("voronoi_pick_10k", |b| {
        b.iter(|| {
            let _ = picker.pick(black_box(Point::new(913.5, 407.25)));
        })
    });
}

fn bench_stacked_column_render_data_500(c: &mut Criterion) {
    let config = ChartConfig::Column(ColumnConfig {
        fields: ColumnFields {
            x: AxisField::new("region"),
            y: MeasureField::new("amount"),
            segment: Some(SegmentField::new("kind")),
            animation: None,
        },
        calculation: CalculationType::Identity,
    });
    let components = Components::new(
        vec![
            Dimension::new("region", "Region", DimensionKind::Nominal),
            Dimension::new("kind", "Kind", DimensionKind::Nominal),
        ],
        vec![Measure::new("amount", "Amount")],
    );
    let rows: Vec<Observation> = (0..500)
        .map(|i| {
            Observation::new()
                .with("region", format!("r{}", i / 5))
                .with("kind", format!("k{}", i % 5))
                .with("amount", (i % 13) as f64 + 1.0)
        })
        .collect();
    let inputs = ChartInputs::new(rows);
    let pipeline_config = PipelineConfig::new(Viewport::new(1600, 900));

    c.bench_function("stacked_column_render_data_500", |b| {
        b.iter(|| {
            let _ = compute_render_data(
                black_box(&inputs),
                black_box(&config),
                black_box(&components),
                black_box(&pipeline_config),
            )
            .expect("render data should succeed");
        })
    });
}

criterion_group!(
    benches,
    bench_linear_scale_round_trip,
    bench_stack_200x10,
    bench_sort_categories_by_measure_5k,
    bench_voronoi_pick_10k,
    bench_stacked_column_render_data_500
);
criterion_main!(benches);
