//! Property tests for temporal resolution and batch atomicity.

use std::collections::BTreeSet;
use std::sync::Arc;

use proptest::prelude::*;

use tempora_core::config::TemporalConfig;
use tempora_core::models::{BatchMode, Operation, Revision, RevisionBatch};
use tempora_core::node::NodeState;
use tempora_core::traits::IRevisionStore;
use tempora_core::{Clock, FieldValue, Guid, ManualClock, Timestamp};
use tempora_storage::StorageEngine;
use tempora_temporal::resolver::{resolve_at, resolve_next, resolve_previous};
use tempora_temporal::Cursor;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

fn state(n: i64) -> NodeState {
    let mut s = NodeState::default();
    s.fields.set("n", FieldValue::Number(Some(n as f64)));
    s
}

/// Per-node sets of distinct revision timestamps.
fn histories_strategy() -> impl Strategy<Value = Vec<BTreeSet<i64>>> {
    prop::collection::vec(prop::collection::btree_set(1i64..200, 1..8), 1..5)
}

async fn seed(store: &StorageEngine, histories: &[BTreeSet<i64>]) -> Vec<Guid> {
    let guids: Vec<Guid> = (0..histories.len() as u128).map(Guid::from_u128).collect();
    for (guid, stamps) in guids.iter().zip(histories) {
        for t in stamps {
            store
                .append(RevisionBatch {
                    action: "seed".to_string(),
                    timestamp: Timestamp::from_millis(*t),
                    revisions: vec![Revision::new(*guid, "n", Timestamp::from_millis(*t), state(*t))],
                })
                .await
                .unwrap();
        }
    }
    guids
}

fn number(rev: &Revision) -> i64 {
    match rev.state.fields.get("n") {
        Some(FieldValue::Number(Some(n))) => n as i64,
        other => panic!("unexpected field {other:?}"),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn at_returns_last_write_at_or_before(histories in histories_strategy(), query_ms in 0i64..220) {
        let rt = runtime();
        rt.block_on(async {
            let store = StorageEngine::open_in_memory().unwrap();
            let guids = seed(&store, &histories).await;
            let view = resolve_at(&store, &guids, Timestamp::from_millis(query_ms)).await.unwrap();

            for (guid, stamps) in guids.iter().zip(&histories) {
                let expected = stamps.range(..=query_ms).next_back();
                match expected {
                    Some(t) => {
                        prop_assert_eq!(number(view.get(guid).unwrap()), *t);
                    }
                    None => {
                        prop_assert!(!view.contains(guid));
                    }
                }
            }
            Ok(())
        })?;
    }

    #[test]
    fn next_and_previous_land_on_nearest_boundary(histories in histories_strategy(), query_ms in 0i64..220) {
        let rt = runtime();
        rt.block_on(async {
            let store = StorageEngine::open_in_memory().unwrap();
            let guids = seed(&store, &histories).await;
            let all: BTreeSet<i64> = histories.iter().flatten().copied().collect();
            let at = Timestamp::from_millis(query_ms);

            let next = resolve_next(&store, &guids, at).await.unwrap();
            let expected_next = all.range(query_ms + 1..).next().copied().unwrap_or(query_ms);
            prop_assert_eq!(next.timestamp, Timestamp::from_millis(expected_next));

            let previous = resolve_previous(&store, &guids, at).await.unwrap();
            let expected_prev = all.range(..query_ms).next_back().copied().unwrap_or(query_ms);
            prop_assert_eq!(previous.timestamp, Timestamp::from_millis(expected_prev));
            Ok(())
        })?;
    }

    #[test]
    fn failing_batch_never_appends(valid in 0usize..20, fail_at in 0usize..20) {
        let rt = runtime();
        rt.block_on(async {
            let store = Arc::new(StorageEngine::open_in_memory().unwrap());
            let clock: Arc<dyn Clock> = Arc::new(ManualClock::new(Timestamp::from_millis(1)));
            let mut cursor = Cursor::new(store.clone(), clock, TemporalConfig::default());

            let mut ops: Vec<Operation> = (0..valid)
                .map(|i| Operation::create(Guid::from_u128(i as u128), "n"))
                .collect();
            // Targets a node that was never loaded.
            let bad = Operation::set_field(Guid::from_u128(999), "n", FieldValue::Number(Some(0.0)));
            ops.insert(fail_at.min(ops.len()), bad);

            prop_assert!(cursor.run_batch("mixed", BatchMode::Delta, ops).await.is_err());
            prop_assert_eq!(store.count_batches().await.unwrap(), 0);
            prop_assert!(cursor.guids().is_empty());
            Ok(())
        })?;
    }
}
