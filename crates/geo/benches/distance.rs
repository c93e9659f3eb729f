//! Benchmarks for geo crate distance and centroid calculations.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use urbancover_geo::{haversine_distance, parse_geometry, Coordinate, Polygon};
use serde_json::json;

fn ring(vertex_count: usize) -> Vec<Coordinate> {
    (0..vertex_count)
        .map(|i| {
            let angle = i as f64 / vertex_count as f64 * std::f64::consts::TAU;
            Coordinate::new(12.97 + 0.01 * angle.sin(), 77.59 + 0.01 * angle.cos())
        })
        .collect()
}

fn bench_single_distance(c: &mut Criterion) {
    let a = Coordinate::new(12.9716, 77.5946);
    let b = Coordinate::new(13.0827, 80.2707);

    c.bench_function("haversine_single", |bench| {
        bench.iter(|| haversine_distance(black_box(&a), black_box(&b)))
    });
}

fn bench_centroid(c: &mut Criterion) {
    let mut group = c.benchmark_group("polygon_centroid");

    for size in [4, 32, 256, 2048].iter() {
        let vertices = ring(*size);
        group.bench_with_input(BenchmarkId::new("new", size), size, |b, _| {
            b.iter(|| Polygon::new(black_box(vertices.clone())))
        });
    }

    group.finish();
}

fn bench_geometry_parsing(c: &mut Criterion) {
    let geojson = json!({"type": "Point", "coordinates": [77.5946, 12.9716]});
    let wkt = json!("POLYGON((77.59 12.97, 77.60 12.97, 77.60 12.98, 77.59 12.98, 77.59 12.97))");

    let mut group = c.benchmark_group("geometry_parsing");

    group.bench_function("geojson_point", |b| b.iter(|| parse_geometry(black_box(&geojson))));

    group.bench_function("wkt_polygon", |b| b.iter(|| parse_geometry(black_box(&wkt))));

    group.finish();
}

criterion_group!(benches, bench_single_distance, bench_centroid, bench_geometry_parsing);
criterion_main!(benches);
