//! Batch submission and temporal resolution benchmarks.

use std::sync::Arc;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use tempora_core::config::TemporalConfig;
use tempora_core::models::{BatchMode, NodeQuery, Operation, TemporalSelector};
use tempora_core::traits::ITemporalGraph;
use tempora_core::{Clock, FieldValue, Guid, ManualClock, Timestamp};
use tempora_storage::StorageEngine;
use tempora_temporal::TemporalEngine;

fn setup(
    rt: &tokio::runtime::Runtime,
    nodes: usize,
) -> (TemporalEngine<StorageEngine>, Arc<ManualClock>, Vec<Guid>) {
    let clock = Arc::new(ManualClock::new(Timestamp::from_millis(1)));
    let dyn_clock: Arc<dyn Clock> = clock.clone();
    let store = Arc::new(StorageEngine::open_in_memory().unwrap());
    let engine = TemporalEngine::new(store, dyn_clock, TemporalConfig::default());
    let guids: Vec<Guid> = (0..nodes).map(|_| Guid::new()).collect();
    let creates = guids.iter().map(|g| Operation::create(*g, "bench")).collect();
    rt.block_on(engine.submit("seed", BatchMode::Delta, creates)).unwrap();
    (engine, clock, guids)
}

fn bench_submit(c: &mut Criterion) {
    let rt = tokio::runtime::Builder::new_multi_thread().enable_all().build().unwrap();
    let mut group = c.benchmark_group("submit");
    for nodes in [8usize, 64] {
        let (engine, clock, guids) = setup(&rt, nodes);
        group.bench_with_input(BenchmarkId::new("set_fields", nodes), &nodes, |b, _| {
            b.iter(|| {
                clock.advance(1);
                let ops = guids
                    .iter()
                    .flat_map(|g| {
                        [
                            Operation::set_field(*g, "title", FieldValue::String(Some("x".into()))),
                            Operation::set_field(*g, "rank", FieldValue::Number(Some(1.0))),
                        ]
                    })
                    .collect();
                rt.block_on(engine.submit("bench", BatchMode::Delta, ops)).unwrap();
            })
        });
    }
    group.finish();
}

fn bench_resolve(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let (engine, clock, guids) = setup(&rt, 32);
    for (i, guid) in guids.iter().enumerate() {
        clock.advance(10);
        let op = Operation::set_field(*guid, "rank", FieldValue::Number(Some(i as f64)));
        rt.block_on(engine.submit("step", BatchMode::Delta, vec![op])).unwrap();
    }

    let mut group = c.benchmark_group("resolve");
    for (name, selector) in [
        ("now", TemporalSelector::Now),
        ("at", TemporalSelector::At(Timestamp::from_millis(150))),
        ("next", TemporalSelector::Next(Timestamp::from_millis(150))),
        ("previous", TemporalSelector::Previous(Timestamp::from_millis(150))),
        ("inception", TemporalSelector::Inception),
    ] {
        let query = NodeQuery::new(guids.clone(), selector);
        group.bench_function(name, |b| {
            b.iter(|| rt.block_on(engine.resolve(&query)).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_submit, bench_resolve);
criterion_main!(benches);
