use chart_data::{
    create_series_data, AxisModel, CoordAxes, CoordinateSystemRegistry, CreateOptions, SeriesLayout, SeriesModel,
    Source, SourceHeader,
};
use criterion::{criterion_group, criterion_main, black_box, BatchSize, BenchmarkId, Criterion};
use serde_json::{json, Value};

fn gen_items(n: usize) -> Value {
    let items: Vec<Value> = (0..n)
        .map(|i| json!([format!("c{}", i % 50), (i as f64 * 0.01).sin() * 10.0, i]))
        .collect();
    Value::Array(items)
}

fn gen_rows(n: usize) -> Value {
    let mut rows = vec![json!(["name", "a", "b", "c"])];
    rows.extend((0..n).map(|i| json!([format!("r{i}"), i, i * 2, (i as f64).sqrt()])));
    Value::Array(rows)
}

fn bench_series_data(c: &mut Criterion) {
    let registry = CoordinateSystemRegistry::with_builtin();
    let mut group = c.benchmark_group("create_series_data");
    for &n in &[10_000usize, 100_000usize] {
        let data = gen_items(n);
        group.bench_with_input(BenchmarkId::from_parameter(format!("items_n{n}")), &n, |b, _| {
            b.iter_batched(
                || {
                    let series = SeriesModel::new("s", "scatter").with_axes(CoordAxes::Cartesian2d {
                        x: AxisModel::category(None, true),
                        y: AxisModel::value(),
                    });
                    (data.clone(), series)
                },
                |(d, series)| {
                    let _ = black_box(create_series_data(d, &series, &registry, &CreateOptions::default()));
                },
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

fn bench_dataset(c: &mut Criterion) {
    let registry = CoordinateSystemRegistry::with_builtin();
    let mut group = c.benchmark_group("dataset_source");
    for &n in &[10_000usize, 100_000usize] {
        let rows = gen_rows(n);
        group.bench_with_input(BenchmarkId::from_parameter(format!("rows_n{n}")), &n, |b, _| {
            b.iter_batched(
                || rows.clone(),
                |r| {
                    let source = Source::from_dataset(r, SourceHeader::Auto, SeriesLayout::Column, None);
                    if let Ok(source) = source {
                        let series = SeriesModel::new("s", "scatter").with_coordinate_system("cartesian2d");
                        let _ = black_box(create_series_data(source, &series, &registry, &CreateOptions::default()));
                    }
                },
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_series_data, bench_dataset);
criterion_main!(benches);
