//! Criterion benchmarks for normalization and sorting of insurer responses

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;
use std::path::PathBuf;

use cotizador::services::{normalize_results, sort_insurers, Aggregator};
use cotizador::types::{CoveragePlan, RawInsurerResult, SortOrder};

/// Fixture responses repeated `copies` times
fn load_results(copies: usize) -> Vec<RawInsurerResult> {
    let fixture = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("quote_results.json");

    let base: Vec<RawInsurerResult> = std::fs::read_to_string(&fixture)
        .ok()
        .and_then(|content| serde_json::from_str(&content).ok())
        .unwrap_or_default();

    if base.is_empty() {
        eprintln!("Warning: fixture not found: {}", fixture.display());
    }

    base.iter().cycle().take(base.len() * copies).cloned().collect()
}

fn bench_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalizer");

    for copies in [1, 20, 200] {
        let results = load_results(copies);
        if results.is_empty() {
            return;
        }
        group.throughput(Throughput::Elements(results.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("normalize_results", results.len()),
            &results,
            |b, results| {
                b.iter(|| normalize_results(black_box(results)));
            },
        );
    }

    group.finish();
}

fn bench_compare(c: &mut Criterion) {
    let results = load_results(200);
    if results.is_empty() {
        return;
    }
    let insurers = normalize_results(&results);

    let mut group = c.benchmark_group("comparison");
    group.throughput(Throughput::Elements(insurers.len() as u64));

    group.bench_function("lowest_prices", |b| {
        b.iter(|| Aggregator::lowest_prices(black_box(&insurers)));
    });

    group.bench_function("sort_asc", |b| {
        b.iter(|| sort_insurers(black_box(&insurers), CoveragePlan::Amplia, SortOrder::Asc));
    });

    group.bench_function("normalize_and_sort", |b| {
        b.iter(|| {
            let mut insurers = normalize_results(black_box(&results));
            Aggregator::highlight_lowest(&mut insurers, CoveragePlan::Amplia);
            sort_insurers(&insurers, CoveragePlan::Amplia, SortOrder::Asc)
        });
    });

    group.finish();
}

criterion_group!(benches, bench_normalize, bench_compare);
criterion_main!(benches);
