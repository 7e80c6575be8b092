//! The two parallel node representations: materialized Data and pending Delta.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::fields::FieldStore;
use crate::ids::Guid;

/// Materialized node state (Data). Also the persisted revision snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeState {
    pub deleted: bool,
    pub fields: FieldStore,
    pub edges: BTreeMap<String, Option<Guid>>,
    pub edge_collections: BTreeMap<String, Vec<Guid>>,
}

impl NodeState {
    /// Every GUID this state points at, through edges or edge collections.
    pub fn references(&self) -> BTreeSet<Guid> {
        self.edges
            .values()
            .flatten()
            .chain(self.edge_collections.values().flatten())
            .copied()
            .collect()
    }

    /// blake3 of the canonical JSON encoding. Maps are ordered, so equal
    /// states hash equally.
    ///
    /// Encoding cannot fail: every map key is a string, non-finite numbers
    /// encode as `null`, and the hasher's writer is infallible. The Debug
    /// fallback only keeps distinct states distinct should that change.
    pub fn content_hash(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        if serde_json::to_writer(&mut hasher, self).is_err() {
            hasher = blake3::Hasher::new();
            hasher.update(format!("{self:?}").as_bytes());
        }
        hasher.finalize().to_hex().to_string()
    }
}

/// Incremental change to an ordered edge collection.
///
/// `added` keeps insertion order; that order decides placement when several
/// entries name the same successor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionPatch {
    added: Vec<(Guid, Option<Guid>)>,
    removed: BTreeSet<Guid>,
}

impl CollectionPatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `item` immediately before `successor`, or append when `None`.
    /// Re-adding an item replaces its successor but keeps its original slot
    /// in the iteration order.
    pub fn insert(&mut self, item: Guid, successor: Option<Guid>) {
        match self.added.iter_mut().find(|(g, _)| *g == item) {
            Some(entry) => entry.1 = successor,
            None => self.added.push((item, successor)),
        }
    }

    /// Remove every occurrence of `item`, including a pending insert of it.
    pub fn remove(&mut self, item: Guid) {
        self.added.retain(|(g, _)| *g != item);
        self.removed.insert(item);
    }

    pub fn added(&self) -> &[(Guid, Option<Guid>)] {
        &self.added
    }

    pub fn removed(&self) -> &BTreeSet<Guid> {
        &self.removed
    }

    /// Neither added nor removed: folds as "no change".
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Pending change to one edge collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", content = "value", rename_all = "snake_case")]
pub enum CollectionDelta {
    /// Replace the list wholesale.
    Replace(Vec<Guid>),
    /// Merge into the existing list.
    Patch(CollectionPatch),
    /// Present but structurally empty: the list becomes empty.
    Clear,
}

/// Pending, unfolded changes since the last fold (Delta).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeDelta {
    pub deleted: bool,
    pub fields: FieldStore,
    pub edges: BTreeMap<String, Option<Guid>>,
    pub edge_collections: BTreeMap<String, CollectionDelta>,
}

impl NodeDelta {
    pub fn is_empty(&self) -> bool {
        !self.deleted
            && self.fields.is_empty()
            && self.edges.is_empty()
            && self.edge_collections.is_empty()
    }

    /// Pending delta for `collection`, starting as an empty patch.
    pub(crate) fn collection_entry(&mut self, collection: &str) -> &mut CollectionDelta {
        self.edge_collections
            .entry(collection.to_string())
            .or_insert_with(|| CollectionDelta::Patch(CollectionPatch::new()))
    }

    /// A delta that rebuilds `state` from nothing. Used for creates.
    pub fn from_state(state: &NodeState) -> Self {
        Self {
            deleted: state.deleted,
            fields: state.fields.clone(),
            edges: state.edges.clone(),
            edge_collections: state
                .edge_collections
                .iter()
                .map(|(k, v)| (k.clone(), CollectionDelta::Replace(v.clone())))
                .collect(),
        }
    }
}
