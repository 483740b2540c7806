//! Benchmarks for classification, 2D maps and terrain meshes.
//!
//! Run with: cargo bench --package renderer --bench render_benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use grid_processor::RasterClipper;
use relief_common::{Crs, Geometry};
use renderer::{build_mesh, render_2d, render_view, ElevationClassifier, Render2DConfig, Render3DConfig, Scene};
use test_utils::generators::{create_dome_elevation, planar_grid, star_ring};

fn dome_scene(size: usize) -> Scene {
    let grid = planar_grid(create_dome_elevation(size, size, -200.0, 2500.0), size, size, 30.0);
    let half = size as f64 * 15.0;
    let outline = Geometry::from_ring(star_ring(half, half, half * 0.95, half * 0.6, 24), Crs::Local);
    let mask = RasterClipper::default().clip(&grid, &outline).unwrap();
    let colors = ElevationClassifier::default().classify(&grid, &mask).unwrap();
    Scene::new(grid, mask, colors, outline).unwrap()
}

// =============================================================================
// CLASSIFICATION AND 2D BENCHMARKS
// =============================================================================

fn bench_classify(c: &mut Criterion) {
    let mut group = c.benchmark_group("classify");

    for size in [256usize, 1024] {
        let scene = dome_scene(size);
        let classifier = ElevationClassifier::default();
        group.throughput(Throughput::Elements((size * size) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| classifier.classify(black_box(scene.grid()), black_box(scene.mask())).unwrap())
        });
    }

    group.finish();
}

fn bench_render_2d(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_2d");
    let config = Render2DConfig::default();

    for size in [256usize, 1024] {
        let scene = dome_scene(size);
        group.throughput(Throughput::Elements((size * size) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| render_2d(black_box(&scene), &config).unwrap())
        });
    }

    group.finish();
}

// =============================================================================
// 3D BENCHMARKS
// =============================================================================

fn bench_mesh_and_view(c: &mut Criterion) {
    let scene = dome_scene(1024);
    let config = Render3DConfig::default();

    c.bench_function("build_mesh_1024", |b| {
        b.iter(|| build_mesh(black_box(&scene), &config).unwrap())
    });

    let mesh = build_mesh(&scene, &config).unwrap();
    c.bench_function("render_view_10k", |b| {
        b.iter(|| render_view(black_box(&mesh), &config.camera).unwrap())
    });
}

criterion_group!(benches, bench_classify, bench_render_2d, bench_mesh_and_view);
criterion_main!(benches);
