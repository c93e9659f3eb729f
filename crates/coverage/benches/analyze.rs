//! Benchmarks for coverage analysis over growing candidate sets.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use urbancover_coverage::{CoverageAnalyzer, Facility, FacilityId, NewFacility};
use urbancover_geo::Coordinate;

const CATEGORIES: [&str; 5] = ["hospital", "pharmacy", "atm", "bank", "school"];

fn create_facilities(count: usize) -> Vec<Facility> {
    (0..count)
        .map(|i| {
            // Grid around central Bengaluru
            let lat = 12.8 + (i as f64 * 0.003) % 0.4;
            let lon = 77.4 + (i as f64 * 0.007) % 0.4;
            let category = CATEGORIES[i % CATEGORIES.len()];
            Facility::from_new(FacilityId(i as u64), NewFacility::point(format!("f{}", i), category, lat, lon))
        })
        .collect()
}

fn bench_analyze(c: &mut Criterion) {
    let analyzer = CoverageAnalyzer::default();
    let query = Coordinate::new(12.9716, 77.5946);
    let mut group = c.benchmark_group("analyze");

    for size in [10, 100, 1000, 10000].iter() {
        let facilities = create_facilities(*size);
        group.bench_with_input(BenchmarkId::new("report", size), size, |b, _| {
            b.iter(|| analyzer.analyze(black_box(query), Some(1500.0), black_box(&facilities)))
        });
    }

    group.finish();
}

fn bench_find_within(c: &mut Criterion) {
    let analyzer = CoverageAnalyzer::default();
    let facilities = create_facilities(10000);
    let query = Coordinate::new(12.9716, 77.5946);

    c.bench_function("find_within_10000", |b| {
        b.iter(|| analyzer.find_within(black_box(query), 3.0, black_box(&facilities)))
    });
}

criterion_group!(benches, bench_analyze, bench_find_within);
criterion_main!(benches);
