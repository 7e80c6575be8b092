//! Ordered merge and fold benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use tempora_core::node::{fold, merge_ordered, CollectionDelta, CollectionPatch, NodeDelta, NodeState};
use tempora_core::{FieldValue, Guid};

fn base_list(len: u128) -> Vec<Guid> {
    (0..len).map(Guid::from_u128).collect()
}

/// Every added item points at the next added item, listed in reverse so each
/// pass resolves one more.
fn forward_chain(base: &[Guid], len: u128) -> CollectionPatch {
    let mut patch = CollectionPatch::new();
    let anchor = base[0];
    for i in 0..len {
        let item = Guid::from_u128(10_000 + i);
        let successor = if i + 1 == len {
            anchor
        } else {
            Guid::from_u128(10_000 + i + 1)
        };
        patch.insert(item, Some(successor));
    }
    patch
}

fn bench_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge_ordered");
    for len in [10u128, 100, 1000] {
        let base = base_list(len);
        let mut patch = CollectionPatch::new();
        for i in 0..10 {
            patch.insert(Guid::from_u128(50_000 + i), Some(base[(i as usize * 7) % base.len()]));
        }
        patch.remove(base[base.len() / 2]);

        group.bench_with_input(BenchmarkId::new("direct", len), &len, |b, _| {
            b.iter(|| {
                let mut list = base.clone();
                black_box(merge_ordered(&mut list, &patch));
            })
        });
    }

    let base = base_list(100);
    let chain = forward_chain(&base, 32);
    group.bench_function("forward_chain_32", |b| {
        b.iter(|| {
            let mut list = base.clone();
            black_box(merge_ordered(&mut list, &chain));
        })
    });
    group.finish();
}

fn bench_fold(c: &mut Criterion) {
    let mut data = NodeState::default();
    for i in 0..50 {
        data.fields
            .set(&format!("field_{i}"), FieldValue::Number(Some(i as f64)));
    }
    data.edge_collections.insert("items".into(), base_list(200));

    let mut delta = NodeDelta::default();
    for i in 0..10 {
        delta
            .fields
            .set(&format!("field_{i}"), FieldValue::String(Some(format!("v{i}"))));
    }
    let mut patch = CollectionPatch::new();
    patch.insert(Guid::from_u128(9_999), Some(Guid::from_u128(100)));
    delta
        .edge_collections
        .insert("items".into(), CollectionDelta::Patch(patch));

    c.bench_function("fold_50_fields_200_items", |b| {
        b.iter(|| black_box(fold(&data, &delta)))
    });
}

criterion_group!(benches, bench_merge, bench_fold);
criterion_main!(benches);
