// Copyright 2025 the Boxsift Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use boxsift::{
    Aabb, Aabb2D, Aabb3D, BoxPairSelector, BoxSelector, BuildConfig, Builder, LinearBuilder,
    SahBuilder, Scalar, Selector, Tree, select,
};
use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};

fn gen_grid_rects(n: usize, cell: f64) -> Vec<Aabb2D<f64>> {
    let mut out = Vec::with_capacity(n * n);
    for y in 0..n {
        for x in 0..n {
            let x0 = x as f64 * cell;
            let y0 = y as f64 * cell;
            out.push(Aabb2D::from_coords(x0, y0, x0 + cell, y0 + cell));
        }
    }
    out
}

fn gen_grid_rects_i64(n: usize, cell: i64) -> Vec<Aabb2D<i64>> {
    let mut out = Vec::with_capacity(n * n);
    for y in 0..n {
        for x in 0..n {
            let x0 = x as i64 * cell;
            let y0 = y as i64 * cell;
            out.push(Aabb2D::from_coords(x0, y0, x0 + cell, y0 + cell));
        }
    }
    out
}

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
    fn next_f64(&mut self) -> f64 {
        let v = self.next_u64() >> 11;
        (v as f64) / ((1u64 << 53) as f64)
    }
}

fn gen_random_boxes_3d(count: usize, extent: f64, max_side: f64, seed: u64) -> Vec<Aabb3D<f64>> {
    let mut rng = Rng::new(seed);
    (0..count)
        .map(|_| {
            let min = [0, 1, 2].map(|_| rng.next_f64() * extent);
            let max = min.map(|v| v + rng.next_f64() * max_side);
            Aabb::new(min, max)
        })
        .collect()
}

fn gen_queries_3d(count: usize, extent: f64, side: f64, seed: u64) -> Vec<Aabb3D<f64>> {
    let mut rng = Rng::new(seed);
    (0..count)
        .map(|_| {
            let min = [0, 1, 2].map(|_| rng.next_f64() * (extent - side));
            Aabb::new(min, min.map(|v| v + side))
        })
        .collect()
}

/// Counts node tests on top of the overlaps a [`BoxSelector`] would report.
struct VisitCounter<'a, T: Scalar, const D: usize> {
    inner: BoxSelector<'a, T, D, [Aabb<T, D>]>,
    node_tests: core::cell::Cell<usize>,
}

impl<T: Scalar, const D: usize> Selector<T, D> for VisitCounter<'_, T, D> {
    fn reject_node(&self, min: &[T; D], max: &[T; D]) -> (bool, bool) {
        self.node_tests.set(self.node_tests.get() + 1);
        self.inner.reject_node(min, max)
    }
    fn reject_element(&self, index: usize) -> bool {
        self.inner.reject_element(index)
    }
    fn accept(&mut self, index: usize, is_fully_inside: bool) -> bool {
        self.inner.accept(index, is_fully_inside)
    }
}

fn node_tests<T: Scalar, const D: usize>(
    tree: &Tree<T, D>,
    set: &[Aabb<T, D>],
    queries: &[Aabb<T, D>],
) -> usize {
    let mut counter = VisitCounter {
        inner: BoxSelector::new(set, Aabb::empty()),
        node_tests: core::cell::Cell::new(0),
    };
    for q in queries {
        counter.inner.clear();
        counter.inner.set_query(*q);
        select(tree, &mut counter);
    }
    counter.node_tests.get()
}

fn bench_build_f64(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_f64_3d");
    for &count in &[10_000usize, 100_000] {
        let boxes = gen_random_boxes_3d(count, 1000.0, 5.0, 0x5eed);
        group.throughput(Throughput::Elements(count as u64));
        let config = BuildConfig::new(4, 32).unwrap();

        group.bench_function(format!("linear_n{}", count), |b| {
            b.iter_batched(
                || boxes.clone(),
                |mut set| black_box(LinearBuilder::new(config).build(&mut set).unwrap()),
                BatchSize::LargeInput,
            )
        });
        group.bench_function(format!("linear_parallel_n{}", count), |b| {
            b.iter_batched(
                || boxes.clone(),
                |mut set| {
                    let builder = LinearBuilder::new(config.with_parallel(true));
                    black_box(builder.build(&mut set).unwrap())
                },
                BatchSize::LargeInput,
            )
        });
        group.bench_function(format!("sah_n{}", count), |b| {
            b.iter_batched(
                || boxes.clone(),
                |mut set| black_box(SahBuilder::new(config).build(&mut set).unwrap()),
                BatchSize::LargeInput,
            )
        });
    }
    group.finish();
}

fn bench_query_f64(c: &mut Criterion) {
    let mut group = c.benchmark_group("query_f64_3d");
    let count = 100_000;
    let boxes = gen_random_boxes_3d(count, 1000.0, 5.0, 0x5eed);
    let queries = gen_queries_3d(1000, 1000.0, 20.0, 0xfeed);
    group.throughput(Throughput::Elements(queries.len() as u64));

    let mut lin_set = boxes.clone();
    let lin = LinearBuilder::default().build(&mut lin_set).unwrap();
    let mut sah_set = boxes;
    let sah = SahBuilder::default().build(&mut sah_set).unwrap();

    // Results are identical; the difference is how many nodes each tree makes us test.
    println!(
        "node tests over {} queries: linear {}, sah {}",
        queries.len(),
        node_tests(&lin, &lin_set, &queries),
        node_tests(&sah, &sah_set, &queries)
    );

    for (name, tree, set) in [("linear", &lin, &lin_set), ("sah", &sah, &sah_set)] {
        group.bench_function(format!("{}_n{}", name, count), |b| {
            let mut sel = BoxSelector::new(set, Aabb::empty());
            b.iter(|| {
                let mut hits = 0;
                for q in &queries {
                    sel.clear();
                    sel.set_query(*q);
                    hits += sel.select(tree);
                }
                black_box(hits)
            })
        });
    }
    group.finish();
}

fn bench_build_query_grid(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_query_grid_2d");
    for &n in &[64usize, 128] {
        let rects = gen_grid_rects(n, 10.0);
        let rects_i64 = gen_grid_rects_i64(n, 10);
        let query = Aabb2D::from_coords(100.0, 100.0, 500.0, 500.0);
        let query_i64 = Aabb2D::from_coords(100, 100, 500, 500);
        group.throughput(Throughput::Elements((n * n) as u64));

        group.bench_function(format!("linear_f64_n{}", n), |b| {
            b.iter_batched(
                || rects.clone(),
                |mut set| {
                    let tree = LinearBuilder::default().build(&mut set).unwrap();
                    black_box(tree.query_box(&set, &query).len())
                },
                BatchSize::SmallInput,
            )
        });
        group.bench_function(format!("linear_i64_n{}", n), |b| {
            b.iter_batched(
                || rects_i64.clone(),
                |mut set| {
                    let tree = LinearBuilder::default().build(&mut set).unwrap();
                    black_box(tree.query_box(&set, &query_i64).len())
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_self_pairs(c: &mut Criterion) {
    let mut group = c.benchmark_group("self_pairs_f64_3d");
    for &count in &[10_000usize, 50_000] {
        let mut set = gen_random_boxes_3d(count, 1000.0, 8.0, 0xabcd);
        let tree = LinearBuilder::default().build(&mut set).unwrap();
        group.throughput(Throughput::Elements(count as u64));
        group.bench_function(format!("linear_n{}", count), |b| {
            let mut sel = BoxPairSelector::new_same(&set);
            b.iter(|| {
                sel.clear();
                black_box(sel.select_self(&tree))
            })
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_build_f64,
    bench_query_f64,
    bench_build_query_grid,
    bench_self_pairs
);
criterion_main!(benches);
