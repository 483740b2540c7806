//! Benchmarks for boundary clipping.
//!
//! Run with: cargo bench --package grid-processor --bench clip_benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use grid_processor::{ClipConfig, DecimationPlan, RasterClipper};
use relief_common::{Crs, Geometry};
use test_utils::generators::{create_dome_elevation, planar_grid, star_ring};

// =============================================================================
// CLIPPING BENCHMARKS
// =============================================================================

fn bench_clip_grid_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("clip_grid_sizes");

    for size in [128usize, 512, 1024] {
        let grid = planar_grid(create_dome_elevation(size, size, -50.0, 900.0), size, size, 1.0);
        let half = size as f64 / 2.0;
        let boundary = Geometry::from_ring(star_ring(half, half, half * 0.9, half * 0.4, 64), Crs::Local);
        let clipper = RasterClipper::default();

        group.throughput(Throughput::Elements((size * size) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| clipper.clip(black_box(&grid), black_box(&boundary)).unwrap())
        });
    }

    group.finish();
}

fn bench_clip_strategies(c: &mut Criterion) {
    let mut group = c.benchmark_group("clip_strategies");
    let size = 512;
    let grid = planar_grid(create_dome_elevation(size, size, 0.0, 500.0), size, size, 1.0);
    // 4000 vertices: enough for the edge index to pay off
    let boundary = Geometry::from_ring(star_ring(256.0, 256.0, 240.0, 120.0, 2000), Crs::Local);

    let configs = [
        ("serial_direct", false, usize::MAX),
        ("serial_indexed", false, 256),
        ("parallel_direct", true, usize::MAX),
        ("parallel_indexed", true, 256),
    ];
    for (name, parallel, index_threshold) in configs {
        let clipper = RasterClipper::new(ClipConfig {
            parallel,
            index_threshold,
        });
        group.bench_function(name, |b| {
            b.iter(|| clipper.clip(black_box(&grid), black_box(&boundary)).unwrap())
        });
    }

    group.finish();
}

// =============================================================================
// DECIMATION BENCHMARKS
// =============================================================================

fn bench_decimation_plan(c: &mut Criterion) {
    c.bench_function("decimation_plan_10k", |b| {
        b.iter(|| DecimationPlan::for_ceiling(black_box(10_000), black_box(10_000), 10_000).unwrap())
    });
}

criterion_group!(
    benches,
    bench_clip_grid_sizes,
    bench_clip_strategies,
    bench_decimation_plan
);
criterion_main!(benches);
