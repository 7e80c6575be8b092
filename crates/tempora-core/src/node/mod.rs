//! Generic, tag-keyed graph node with its Delta and Data representations.

pub mod fold;
pub mod merge;
mod observer;
mod state;

use std::fmt;
use std::sync::Arc;

pub use fold::{fold, fold_in_place};
pub use merge::{merge_ordered, MergeOutcome};
pub use observer::{ChangeObserver, FieldChange};
pub use state::{CollectionDelta, CollectionPatch, NodeDelta, NodeState};

use crate::errors::{CursorError, TemporaError, TemporaResult};
use crate::fields::FieldValue;
use crate::ids::{Guid, Timestamp};
use crate::models::{InsertPosition, NodeOperation, Revision};

/// Which representation a read looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadMode {
    /// Working view: the pending Delta value where one was written, the
    /// baseline otherwise.
    Delta,
    /// The last folded baseline only. Never reflects uncommitted writes.
    Data,
}

/// A node loaded into memory.
///
/// Writes always land in `delta`. `data` only changes through
/// [`Node::delta_to_data`], so it always reflects a prior revision.
#[derive(Clone)]
pub struct Node {
    guid: Guid,
    tag: String,
    timestamp: Timestamp,
    delta: NodeDelta,
    data: NodeState,
    observers: Vec<Arc<dyn ChangeObserver>>,
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("guid", &self.guid)
            .field("tag", &self.tag)
            .field("timestamp", &self.timestamp)
            .field("delta", &self.delta)
            .field("data", &self.data)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl Node {
    /// A node with no revision yet.
    pub fn new(guid: Guid, tag: impl Into<String>) -> Self {
        Self {
            guid,
            tag: tag.into(),
            timestamp: Timestamp::MIN,
            delta: NodeDelta::default(),
            data: NodeState::default(),
            observers: Vec::new(),
        }
    }

    pub fn from_revision(revision: &Revision) -> Self {
        Self {
            guid: revision.guid,
            tag: revision.tag.clone(),
            timestamp: revision.timestamp,
            delta: NodeDelta::default(),
            data: revision.state.clone(),
            observers: Vec::new(),
        }
    }

    pub fn guid(&self) -> Guid {
        self.guid
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Timestamp of the revision `data` reflects. `Timestamp::MIN` if never committed.
    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    pub fn is_persisted(&self) -> bool {
        self.timestamp != Timestamp::MIN
    }

    pub fn delta(&self) -> &NodeDelta {
        &self.delta
    }

    pub fn data(&self) -> &NodeState {
        &self.data
    }

    pub fn has_changes(&self) -> bool {
        !self.delta.is_empty()
    }

    pub fn is_deleted(&self, mode: ReadMode) -> bool {
        match mode {
            ReadMode::Data => self.data.deleted,
            ReadMode::Delta => self.data.deleted || self.delta.deleted,
        }
    }

    pub fn add_observer(&mut self, observer: Arc<dyn ChangeObserver>) {
        self.observers.push(observer);
    }

    pub fn with_observer(mut self, observer: Arc<dyn ChangeObserver>) -> Self {
        self.add_observer(observer);
        self
    }

    // ── Fields ──────────────────────────────────────────────────────────

    /// Write a field into Delta and notify observers.
    pub fn set_value(&mut self, name: &str, value: FieldValue) -> FieldChange {
        let previous = self.get_value(name, ReadMode::Delta);
        self.delta.fields.set(name, value.clone());
        let change = FieldChange {
            guid: self.guid,
            field: name.to_string(),
            previous,
            value,
        };
        for observer in &self.observers {
            observer.on_change(&change);
        }
        change
    }

    pub fn get_value(&self, name: &str, mode: ReadMode) -> Option<FieldValue> {
        match mode {
            ReadMode::Data => self.data.fields.get(name),
            ReadMode::Delta => self
                .delta
                .fields
                .get(name)
                .or_else(|| self.data.fields.get(name)),
        }
    }

    // ── Edges ───────────────────────────────────────────────────────────

    pub fn set_edge(&mut self, name: &str, target: Option<Guid>) {
        self.delta.edges.insert(name.to_string(), target);
    }

    /// Referenced GUID, `None` when the edge is unset or null.
    pub fn edge(&self, name: &str, mode: ReadMode) -> Option<Guid> {
        let pending = match mode {
            ReadMode::Delta => self.delta.edges.get(name),
            ReadMode::Data => None,
        };
        pending.or_else(|| self.data.edges.get(name)).copied().flatten()
    }

    // ── Edge collections ────────────────────────────────────────────────

    pub fn insert_into_collection(&mut self, collection: &str, item: Guid, position: InsertPosition) {
        let successor = position.successor();
        match self.delta.collection_entry(collection) {
            CollectionDelta::Patch(patch) => patch.insert(item, successor),
            CollectionDelta::Replace(items) => insert_into_list(items, item, successor),
            entry @ CollectionDelta::Clear => {
                let mut items = Vec::new();
                insert_into_list(&mut items, item, successor);
                *entry = CollectionDelta::Replace(items);
            }
        }
    }

    pub fn remove_from_collection(&mut self, collection: &str, item: Guid) {
        match self.delta.collection_entry(collection) {
            CollectionDelta::Patch(patch) => patch.remove(item),
            CollectionDelta::Replace(items) => items.retain(|g| *g != item),
            CollectionDelta::Clear => {}
        }
    }

    pub fn replace_collection(&mut self, collection: &str, items: Vec<Guid>) {
        self.delta
            .edge_collections
            .insert(collection.to_string(), CollectionDelta::Replace(items));
    }

    pub fn clear_collection(&mut self, collection: &str) {
        self.delta
            .edge_collections
            .insert(collection.to_string(), CollectionDelta::Clear);
    }

    /// Collection contents. The Delta view runs the pending change through
    /// the same fold the commit will use.
    pub fn collection(&self, name: &str, mode: ReadMode) -> Vec<Guid> {
        let base = self.data.edge_collections.get(name).cloned().unwrap_or_default();
        if mode == ReadMode::Data {
            return base;
        }
        match self.delta.edge_collections.get(name) {
            None => base,
            Some(CollectionDelta::Replace(items)) => items.clone(),
            Some(CollectionDelta::Clear) => Vec::new(),
            Some(CollectionDelta::Patch(patch)) => {
                let mut list = base;
                merge_ordered(&mut list, patch);
                list
            }
        }
    }

    // ── Lifecycle ───────────────────────────────────────────────────────

    pub fn mark_deleted(&mut self) {
        self.delta.deleted = true;
    }

    /// What `data` would be after a fold, without folding.
    pub fn folded(&self) -> NodeState {
        fold(&self.data, &self.delta)
    }

    /// Fold Delta into Data and clear Delta. A no-op on an empty Delta.
    pub fn delta_to_data(&mut self) -> Vec<(String, MergeOutcome)> {
        if self.delta.is_empty() {
            return Vec::new();
        }
        let delta = std::mem::take(&mut self.delta);
        fold_in_place(&mut self.data, &delta)
    }

    /// Discard uncommitted changes without folding.
    pub fn clear_delta(&mut self) {
        self.delta = NodeDelta::default();
    }

    /// Fold and stamp the node with the revision timestamp it was persisted at.
    pub fn commit(&mut self, timestamp: Timestamp) {
        self.delta_to_data();
        self.timestamp = timestamp;
    }

    /// The revision this node would persist at `timestamp`.
    pub fn to_revision(&self, timestamp: Timestamp) -> Revision {
        Revision::new(self.guid, self.tag.clone(), timestamp, self.folded())
    }

    // ── Operations ──────────────────────────────────────────────────────

    /// Execute one typed operation against this node's Delta.
    pub fn apply(&mut self, op: &NodeOperation) -> TemporaResult<()> {
        if self.data.deleted || (self.delta.deleted && !matches!(op, NodeOperation::DeleteNode)) {
            return Err(CursorError::NodeDeleted { guid: self.guid }.into());
        }

        match op {
            NodeOperation::CreateNode {
                tag,
                fields,
                edges,
                edge_collections,
            } => {
                if self.is_persisted() {
                    return Err(TemporaError::NodeConflict { guid: self.guid });
                }
                if *tag != self.tag {
                    return Err(TemporaError::ValidationError(format!(
                        "node {} is tagged {}, create asked for {tag}",
                        self.guid, self.tag
                    )));
                }
                for (name, value) in fields.entries() {
                    self.set_value(&name, value);
                }
                for (name, target) in edges {
                    self.set_edge(name, *target);
                }
                for (name, items) in edge_collections {
                    self.replace_collection(name, items.clone());
                }
            }
            NodeOperation::DeleteNode => self.mark_deleted(),
            NodeOperation::SetField { name, value } => {
                self.set_value(name, value.clone());
            }
            NodeOperation::SetEdge { name, target } => self.set_edge(name, *target),
            NodeOperation::InsertIntoCollection {
                collection,
                item,
                position,
            } => self.insert_into_collection(collection, *item, *position),
            NodeOperation::RemoveFromCollection { collection, item } => {
                self.remove_from_collection(collection, *item)
            }
            NodeOperation::ReplaceCollection { collection, items } => {
                self.replace_collection(collection, items.clone())
            }
            NodeOperation::ClearCollection { collection } => self.clear_collection(collection),
            NodeOperation::UpdateListItem {
                name,
                selector,
                item,
            } => {
                let current = self.get_value(name, ReadMode::Delta).ok_or_else(|| {
                    TemporaError::ValidationError(format!("node {} has no field {name}", self.guid))
                })?;
                let updated = current.replace_list_item(selector, item.clone())?;
                self.set_value(name, updated);
            }
        }
        Ok(())
    }
}

fn insert_into_list(items: &mut Vec<Guid>, item: Guid, successor: Option<Guid>) {
    let mut patch = CollectionPatch::new();
    patch.insert(item, successor);
    merge_ordered(items, &patch);
}
