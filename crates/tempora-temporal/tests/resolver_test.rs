//! Resolver integration tests over the SQLite store: At/Now tombstone
//! exclusion, Next batching, Previous, Inception.

use tempora_core::models::{Revision, RevisionBatch, TemporalSelector};
use tempora_core::node::NodeState;
use tempora_core::traits::IRevisionStore;
use tempora_core::{FieldValue, Guid, Timestamp};
use tempora_storage::StorageEngine;
use tempora_temporal::resolve;
use tempora_temporal::resolver::{resolve_at, resolve_inception, resolve_next, resolve_previous};

fn ts(ms: i64) -> Timestamp {
    Timestamp::from_millis(ms)
}

fn g(n: u128) -> Guid {
    Guid::from_u128(n)
}

fn state(title: &str) -> NodeState {
    let mut s = NodeState::default();
    s.fields.set("title", FieldValue::String(Some(title.to_string())));
    s
}

fn tombstone(title: &str) -> NodeState {
    let mut s = state(title);
    s.deleted = true;
    s
}

async fn put(store: &StorageEngine, at: i64, revisions: Vec<(Guid, NodeState)>) {
    let revisions = revisions
        .into_iter()
        .map(|(guid, s)| Revision::new(guid, "task", ts(at), s))
        .collect();
    store
        .append(RevisionBatch {
            action: "seed".to_string(),
            timestamp: ts(at),
            revisions,
        })
        .await
        .unwrap();
}

fn title(rev: &Revision) -> String {
    match rev.state.fields.get("title") {
        Some(FieldValue::String(Some(s))) => s,
        other => panic!("unexpected title {other:?}"),
    }
}

// ── RS-01: At / Now ──────────────────────────────────────────────────────

#[tokio::test]
async fn rs_01_at_returns_latest_revision_at_or_before() {
    let store = StorageEngine::open_in_memory().unwrap();
    put(&store, 10, vec![(g(1), state("v1"))]).await;
    put(&store, 20, vec![(g(1), state("v2"))]).await;

    assert!(resolve_at(&store, &[g(1)], ts(5)).await.unwrap().is_empty());
    let at_10 = resolve_at(&store, &[g(1)], ts(10)).await.unwrap();
    assert_eq!(title(at_10.get(&g(1)).unwrap()), "v1");
    let at_15 = resolve_at(&store, &[g(1)], ts(15)).await.unwrap();
    assert_eq!(at_15.timestamp, ts(15));
    assert_eq!(title(at_15.get(&g(1)).unwrap()), "v1");
    let at_25 = resolve_at(&store, &[g(1)], ts(25)).await.unwrap();
    assert_eq!(title(at_25.get(&g(1)).unwrap()), "v2");
}

#[tokio::test]
async fn rs_01_tombstone_excludes_node_for_good() {
    let store = StorageEngine::open_in_memory().unwrap();
    put(&store, 10, vec![(g(1), state("alive")), (g(2), state("other"))]).await;
    put(&store, 20, vec![(g(1), tombstone("alive"))]).await;
    // A stray later revision must not resurrect the node.
    put(&store, 30, vec![(g(1), state("ghost"))]).await;

    let before = resolve_at(&store, &[g(1), g(2)], ts(15)).await.unwrap();
    assert!(before.contains(&g(1)));

    for at in [20, 25, 30, 40] {
        let view = resolve_at(&store, &[g(1), g(2)], ts(at)).await.unwrap();
        assert!(!view.contains(&g(1)), "resurrected at {at}");
        assert!(view.contains(&g(2)));
    }
}

#[tokio::test]
async fn rs_01_unknown_guids_are_absent_not_errors() {
    let store = StorageEngine::open_in_memory().unwrap();
    put(&store, 10, vec![(g(1), state("x"))]).await;
    let view = resolve(&store, &[g(1), g(99)], TemporalSelector::Now, ts(100))
        .await
        .unwrap();
    assert_eq!(view.len(), 1);
    assert_eq!(view.timestamp, ts(100));
}

#[tokio::test]
async fn rs_01_now_uses_supplied_instant() {
    let store = StorageEngine::open_in_memory().unwrap();
    put(&store, 10, vec![(g(1), state("old"))]).await;
    put(&store, 50, vec![(g(1), state("new"))]).await;

    let early = resolve(&store, &[g(1)], TemporalSelector::Now, ts(20)).await.unwrap();
    assert_eq!(title(early.get(&g(1)).unwrap()), "old");
    let late = resolve(&store, &[g(1)], TemporalSelector::Now, ts(60)).await.unwrap();
    assert_eq!(title(late.get(&g(1)).unwrap()), "new");
}

// ── RS-02: Next ──────────────────────────────────────────────────────────

#[tokio::test]
async fn rs_02_next_steps_to_first_boundary_only() {
    let store = StorageEngine::open_in_memory().unwrap();
    let (a, b) = (g(1), g(2));
    put(&store, 1, vec![(a, state("a0")), (b, state("b0"))]).await;
    put(&store, 8, vec![(a, state("a1"))]).await;
    put(&store, 12, vec![(b, state("b1"))]).await;

    let next = resolve_next(&store, &[a, b], ts(5)).await.unwrap();
    assert_eq!(next.timestamp, ts(8));
    assert_eq!(title(next.get(&a).unwrap()), "a1");
    assert_eq!(title(next.get(&b).unwrap()), "b0");

    let after = resolve_next(&store, &[a, b], ts(8)).await.unwrap();
    assert_eq!(after.timestamp, ts(12));
    assert_eq!(title(after.get(&a).unwrap()), "a1");
    assert_eq!(title(after.get(&b).unwrap()), "b1");
}

#[tokio::test]
async fn rs_02_next_groups_same_timestamp_revisions() {
    let store = StorageEngine::open_in_memory().unwrap();
    let (a, b) = (g(1), g(2));
    put(&store, 1, vec![(a, state("a0")), (b, state("b0"))]).await;
    put(&store, 9, vec![(a, state("a1")), (b, state("b1"))]).await;

    let next = resolve_next(&store, &[a, b], ts(5)).await.unwrap();
    assert_eq!(next.timestamp, ts(9));
    assert_eq!(title(next.get(&a).unwrap()), "a1");
    assert_eq!(title(next.get(&b).unwrap()), "b1");
}

#[tokio::test]
async fn rs_02_next_includes_nodes_created_at_boundary() {
    let store = StorageEngine::open_in_memory().unwrap();
    put(&store, 1, vec![(g(1), state("a0"))]).await;
    put(&store, 7, vec![(g(2), state("born"))]).await;

    let next = resolve_next(&store, &[g(1), g(2)], ts(3)).await.unwrap();
    assert_eq!(next.timestamp, ts(7));
    assert_eq!(next.len(), 2);
}

#[tokio::test]
async fn rs_02_next_drops_nodes_deleted_at_boundary() {
    let store = StorageEngine::open_in_memory().unwrap();
    put(&store, 1, vec![(g(1), state("a0"))]).await;
    put(&store, 6, vec![(g(1), tombstone("a0"))]).await;

    let next = resolve_next(&store, &[g(1)], ts(2)).await.unwrap();
    assert_eq!(next.timestamp, ts(6));
    assert!(next.is_empty());
}

#[tokio::test]
async fn rs_02_next_keeps_live_write_after_earlier_tombstone() {
    let store = StorageEngine::open_in_memory().unwrap();
    put(&store, 1, vec![(g(1), state("a0"))]).await;
    put(&store, 3, vec![(g(1), tombstone("a0"))]).await;
    put(&store, 8, vec![(g(1), state("after"))]).await;

    let next = resolve_next(&store, &[g(1)], ts(5)).await.unwrap();
    assert_eq!(next.timestamp, ts(8));
    assert_eq!(title(next.get(&g(1)).unwrap()), "after");

    // At stays tombstone-exclusive for the same instant.
    assert!(!resolve_at(&store, &[g(1)], ts(8)).await.unwrap().contains(&g(1)));
}

#[tokio::test]
async fn rs_02_next_without_later_revision_returns_baseline() {
    let store = StorageEngine::open_in_memory().unwrap();
    put(&store, 1, vec![(g(1), state("only"))]).await;

    let next = resolve_next(&store, &[g(1)], ts(5)).await.unwrap();
    assert_eq!(next.timestamp, ts(5));
    assert_eq!(title(next.get(&g(1)).unwrap()), "only");
}

// ── RS-03: Previous ──────────────────────────────────────────────────────

#[tokio::test]
async fn rs_03_previous_steps_to_last_earlier_boundary() {
    let store = StorageEngine::open_in_memory().unwrap();
    let (a, b) = (g(1), g(2));
    put(&store, 2, vec![(a, state("a0"))]).await;
    put(&store, 6, vec![(b, state("b0"))]).await;
    put(&store, 10, vec![(a, state("a1"))]).await;

    let prev = resolve_previous(&store, &[a, b], ts(10)).await.unwrap();
    assert_eq!(prev.timestamp, ts(6));
    assert_eq!(title(prev.get(&a).unwrap()), "a0");
    assert_eq!(title(prev.get(&b).unwrap()), "b0");

    let before = resolve_previous(&store, &[a, b], ts(6)).await.unwrap();
    assert_eq!(before.timestamp, ts(2));
    assert!(before.contains(&a));
    assert!(!before.contains(&b));
}

#[tokio::test]
async fn rs_03_previous_without_earlier_revision_is_at_view() {
    let store = StorageEngine::open_in_memory().unwrap();
    put(&store, 10, vec![(g(1), state("x"))]).await;

    let prev = resolve_previous(&store, &[g(1)], ts(10)).await.unwrap();
    assert_eq!(prev.timestamp, ts(10));
    assert!(prev.contains(&g(1)));
}

// ── RS-04: Inception ─────────────────────────────────────────────────────

#[tokio::test]
async fn rs_04_inception_returns_founding_subset() {
    let store = StorageEngine::open_in_memory().unwrap();
    put(&store, 10, vec![(g(1), state("a")), (g(2), state("b"))]).await;
    put(&store, 20, vec![(g(3), state("c"))]).await;
    put(&store, 30, vec![(g(1), state("a2"))]).await;

    let founding = resolve_inception(&store, &[g(1), g(2), g(3)]).await.unwrap();
    assert_eq!(founding.timestamp, ts(10));
    assert_eq!(founding.len(), 2);
    assert_eq!(title(founding.get(&g(1)).unwrap()), "a");
    assert!(!founding.contains(&g(3)));
}

#[tokio::test]
async fn rs_04_inception_of_unknown_set_is_empty_at_min() {
    let store = StorageEngine::open_in_memory().unwrap();
    let founding = resolve(&store, &[g(7)], TemporalSelector::Inception, ts(0))
        .await
        .unwrap();
    assert!(founding.is_empty());
    assert_eq!(founding.timestamp, Timestamp::MIN);
}
