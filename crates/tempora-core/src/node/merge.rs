//! Ordered-reference merge: fold an added/removed patch into a persisted
//! ordered list of GUIDs.
//!
//! Algorithm:
//! 1. Drop every occurrence of every removed GUID.
//! 2. Walk `added` in insertion order. `(x, None)` appends `x`. `(x, Some(y))`
//!    inserts `x` directly before the first `y`; if `y` is not in the list yet
//!    the pair is deferred.
//! 3. Retry the deferred pairs pass after pass until a pass inserts nothing.
//!    Forward references inside one patch (`x → y`, `y → z`) resolve here.
//! 4. Pairs whose successor never shows up are dropped without error and
//!    reported back to the caller.
//!
//! Worst case O(n·p) for n deferred pairs over p passes; patches come from a
//! single mutation batch so both stay small.

use tracing::debug;

use super::state::CollectionPatch;
use crate::ids::Guid;

/// What the merge could not place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    /// `(item, successor)` pairs whose successor never resolved.
    pub unresolved: Vec<(Guid, Guid)>,
    /// Number of deferred passes run after the first walk.
    pub passes: usize,
}

/// Merge `patch` into `list` in place.
pub fn merge_ordered(list: &mut Vec<Guid>, patch: &CollectionPatch) -> MergeOutcome {
    if !patch.removed().is_empty() {
        list.retain(|g| !patch.removed().contains(g));
    }

    let mut pending: Vec<(Guid, Guid)> = Vec::new();
    for &(item, successor) in patch.added() {
        match successor {
            None => list.push(item),
            Some(successor) => {
                if !insert_before(list, item, successor) {
                    pending.push((item, successor));
                }
            }
        }
    }

    let mut passes = 0;
    while !pending.is_empty() {
        passes += 1;
        let before = pending.len();
        pending.retain(|&(item, successor)| !insert_before(list, item, successor));
        if pending.len() == before {
            break;
        }
    }

    if !pending.is_empty() {
        debug!(
            unresolved = pending.len(),
            passes, "ordered merge dropped entries with dangling successors"
        );
    }

    MergeOutcome {
        unresolved: pending,
        passes,
    }
}

fn insert_before(list: &mut Vec<Guid>, item: Guid, successor: Guid) -> bool {
    match list.iter().position(|g| *g == successor) {
        Some(idx) => {
            list.insert(idx, item);
            true
        }
        None => false,
    }
}
