//! Benchmarks for the distance primitives.
//!
//! Nearest-centroid search dominates both k-means iterations and SOM epochs.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::prelude::*;

use prefetch_cluster::distance::{l2_distance, l2_distance_squared, nearest_centroid};

fn random_vectors(n: usize, dim: usize) -> Vec<Vec<f32>> {
    let mut rng = StdRng::seed_from_u64(42);
    (0..n)
        .map(|_| (0..dim).map(|_| rng.random::<f32>()).collect())
        .collect()
}

fn bench_l2_dimensions(c: &mut Criterion) {
    let mut group = c.benchmark_group("l2_distance");

    for dim in [16, 64, 256, 1024].iter() {
        group.throughput(Throughput::Elements(*dim as u64));

        let vectors = random_vectors(2, *dim);
        let a = &vectors[0];
        let b = &vectors[1];

        group.bench_with_input(BenchmarkId::new("checked", dim), dim, |bench, _| {
            bench.iter(|| l2_distance(black_box(a), black_box(b)));
        });
        group.bench_with_input(BenchmarkId::new("squared", dim), dim, |bench, _| {
            bench.iter(|| l2_distance_squared(black_box(a), black_box(b)));
        });
    }

    group.finish();
}

fn bench_nearest_centroid(c: &mut Criterion) {
    let mut group = c.benchmark_group("nearest_centroid");

    let dim = 64;

    for k in [4, 16, 64, 256].iter() {
        group.throughput(Throughput::Elements(*k as u64));

        let centroids = random_vectors(*k, dim);
        let query = random_vectors(1, dim).remove(0);

        group.bench_with_input(BenchmarkId::from_parameter(k), k, |bench, _| {
            bench.iter(|| nearest_centroid(black_box(&query), black_box(&centroids)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_l2_dimensions, bench_nearest_centroid);
criterion_main!(benches);
