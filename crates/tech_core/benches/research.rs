//! Research and routing benchmarks for tech_core.
//!
//! Run with: `cargo bench -p tech_core`

// Benchmark binaries don't need docs on macro-generated functions
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tech_core::prelude::*;
use tech_core::router::{plan_route, route_connections};
use tech_test_utils::fixtures::{lattice, linear_chain, obstacles, pos};

/// Settling a freshly loaded chain, where every pass unlocks one node.
pub fn settle_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("settle_chain");
    for len in [16usize, 64, 256] {
        let ledger = ResourceLedger::new();
        let sectors = SectorBoard::new();
        group.bench_with_input(BenchmarkId::from_parameter(len), &len, |b, &len| {
            b.iter_batched(
                || linear_chain(len),
                |mut graph| {
                    // Only the root is free; research it so the chain cascades.
                    graph.settle(&ledger, &sectors);
                    let mut ledger = ledger.clone();
                    for i in 0..len {
                        graph.research(&format!("Node {i}"), &mut ledger, &sectors);
                    }
                    black_box(graph)
                },
                criterion::BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

/// Single routes, cheapest to most expensive strategy.
pub fn route_benchmark(c: &mut Criterion) {
    let config = RouterConfig::default();
    let free = obstacles(&[]);
    let bends_blocked = obstacles(&[(6, 0), (0, 6)]);

    c.bench_function("route_primary_bend", |b| {
        b.iter(|| plan_route(black_box(pos(0, 0)), black_box(pos(6, 6)), &free, true, &config));
    });
    c.bench_function("route_search", |b| {
        b.iter(|| {
            plan_route(
                black_box(pos(0, 0)),
                black_box(pos(6, 6)),
                &bends_blocked,
                true,
                &config,
            )
        });
    });
}

/// Routing every connector of a dense lattice.
pub fn connections_benchmark(c: &mut Criterion) {
    let graph = lattice(10, 10);
    let config = RouterConfig::default();
    c.bench_function("route_connections_lattice_10x10", |b| {
        b.iter(|| route_connections(black_box(&graph), true, &config));
    });
}

criterion_group!(benches, settle_benchmark, route_benchmark, connections_benchmark);
criterion_main!(benches);
