//! Temporal diff between two instants of a node set.

use std::collections::HashMap;

use tracing::debug;

use tempora_core::errors::{TemporaError, TemporaResult};
use tempora_core::models::{DiffStats, NodeModification, Revision, TemporalDiff, TemporalDiffQuery};
use tempora_core::traits::IRevisionStore;
use tempora_core::Guid;

use crate::resolver::resolve_at;

/// Resolve the node set at both instants and classify the differences.
///
/// Invariants:
/// - diff(T, T) is empty apart from its stats
/// - a node deleted between a and b shows up in `deleted`, never in `modified`
pub async fn execute_diff<S: IRevisionStore>(
    store: &S,
    query: &TemporalDiffQuery,
) -> TemporaResult<TemporalDiff> {
    if query.time_a > query.time_b {
        return Err(TemporaError::InvalidTemporalBounds(format!(
            "time_a {} is after time_b {}",
            query.time_a, query.time_b
        )));
    }

    let at_a = resolve_at(store, &query.guids, query.time_a).await?.revisions;
    let at_b = resolve_at(store, &query.guids, query.time_b).await?.revisions;
    let diff = classify(&at_a, &at_b);

    debug!(
        time_a = %query.time_a,
        time_b = %query.time_b,
        created = diff.created.len(),
        deleted = diff.deleted.len(),
        modified = diff.modified.len(),
        "computed temporal diff"
    );
    Ok(diff)
}

fn classify(at_a: &HashMap<Guid, Revision>, at_b: &HashMap<Guid, Revision>) -> TemporalDiff {
    let mut created: Vec<Guid> = at_b.keys().filter(|g| !at_a.contains_key(g)).copied().collect();
    let mut deleted: Vec<Guid> = at_a.keys().filter(|g| !at_b.contains_key(g)).copied().collect();
    let mut modified = Vec::new();
    let mut unchanged = 0;

    for (guid, before) in at_a {
        let Some(after) = at_b.get(guid) else {
            continue;
        };
        if before.content_hash == after.content_hash {
            unchanged += 1;
        } else {
            modified.push(NodeModification {
                guid: *guid,
                from: before.timestamp,
                to: after.timestamp,
            });
        }
    }

    created.sort();
    deleted.sort();
    modified.sort_by_key(|m| m.guid);

    TemporalDiff {
        created,
        deleted,
        modified,
        stats: DiffStats {
            nodes_at_a: at_a.len(),
            nodes_at_b: at_b.len(),
            unchanged,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempora_core::node::NodeState;
    use tempora_core::{FieldValue, Timestamp};

    fn rev(n: u128, ts: i64, title: &str) -> (Guid, Revision) {
        let mut state = NodeState::default();
        state.fields.set("title", FieldValue::String(Some(title.into())));
        let guid = Guid::from_u128(n);
        (
            guid,
            Revision::new(guid, "doc", Timestamp::from_millis(ts), state),
        )
    }

    #[test]
    fn classifies_created_deleted_modified_unchanged() {
        let at_a: HashMap<_, _> = [rev(1, 10, "a"), rev(2, 10, "b"), rev(3, 10, "c")].into();
        let at_b: HashMap<_, _> = [rev(2, 10, "b"), rev(3, 20, "c2"), rev(4, 20, "d")].into();

        let diff = classify(&at_a, &at_b);
        assert_eq!(diff.created, vec![Guid::from_u128(4)]);
        assert_eq!(diff.deleted, vec![Guid::from_u128(1)]);
        assert_eq!(diff.modified.len(), 1);
        assert_eq!(diff.modified[0].guid, Guid::from_u128(3));
        assert_eq!(diff.modified[0].from, Timestamp::from_millis(10));
        assert_eq!(diff.modified[0].to, Timestamp::from_millis(20));
        assert_eq!(
            diff.stats,
            DiffStats {
                nodes_at_a: 3,
                nodes_at_b: 3,
                unchanged: 1
            }
        );
    }

    #[test]
    fn rewrite_with_same_content_is_unchanged() {
        let at_a: HashMap<_, _> = [rev(1, 10, "same")].into();
        let at_b: HashMap<_, _> = [rev(1, 30, "same")].into();
        let diff = classify(&at_a, &at_b);
        assert!(diff.modified.is_empty());
        assert_eq!(diff.stats.unchanged, 1);
    }
}
