//! Delta → Data fold.
//!
//! Rules:
//! - `deleted` is monotonic: `data.deleted || delta.deleted`.
//! - Scalar fields, list fields and edges: present in Delta overwrites Data,
//!   absent is left untouched.
//! - Edge collections: `Replace` swaps the list wholesale, `Patch` goes through
//!   the ordered merge (an empty patch is "no change"), `Clear` empties it.
//!
//! The fold reads nothing but its inputs and cannot fail.

use super::merge::{merge_ordered, MergeOutcome};
use super::state::{CollectionDelta, NodeDelta, NodeState};

/// Fold `delta` into a copy of `data`.
pub fn fold(data: &NodeState, delta: &NodeDelta) -> NodeState {
    let mut next = data.clone();
    fold_in_place(&mut next, delta);
    next
}

/// Fold `delta` into `data`, returning the merge outcome per patched collection.
pub fn fold_in_place(data: &mut NodeState, delta: &NodeDelta) -> Vec<(String, MergeOutcome)> {
    data.deleted = data.deleted || delta.deleted;
    data.fields.overlay(&delta.fields);

    for (name, target) in &delta.edges {
        data.edges.insert(name.clone(), *target);
    }

    let mut outcomes = Vec::new();
    for (name, change) in &delta.edge_collections {
        match change {
            CollectionDelta::Replace(items) => {
                data.edge_collections.insert(name.clone(), items.clone());
            }
            CollectionDelta::Clear => {
                data.edge_collections.insert(name.clone(), Vec::new());
            }
            CollectionDelta::Patch(patch) if patch.is_empty() => {}
            CollectionDelta::Patch(patch) => {
                let list = data.edge_collections.entry(name.clone()).or_default();
                let outcome = merge_ordered(list, patch);
                if !outcome.unresolved.is_empty() {
                    outcomes.push((name.clone(), outcome));
                }
            }
        }
    }
    outcomes
}
