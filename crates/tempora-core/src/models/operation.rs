//! Typed batch operations.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::fields::{FieldStore, FieldValue, ListItem, ListItemSelector};
use crate::ids::Guid;

/// Where an item lands in an edge collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsertPosition {
    /// Immediately before this GUID. If it is not in the collection once the
    /// batch folds, the insert is dropped.
    Before(Guid),
    End,
}

impl InsertPosition {
    pub fn successor(&self) -> Option<Guid> {
        match self {
            Self::Before(g) => Some(*g),
            Self::End => None,
        }
    }
}

/// A single mutation of one node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum NodeOperation {
    CreateNode {
        tag: String,
        #[serde(default)]
        fields: FieldStore,
        #[serde(default)]
        edges: BTreeMap<String, Option<Guid>>,
        #[serde(default)]
        edge_collections: BTreeMap<String, Vec<Guid>>,
    },
    DeleteNode,
    SetField {
        name: String,
        value: FieldValue,
    },
    SetEdge {
        name: String,
        target: Option<Guid>,
    },
    InsertIntoCollection {
        collection: String,
        item: Guid,
        position: InsertPosition,
    },
    RemoveFromCollection {
        collection: String,
        item: Guid,
    },
    ReplaceCollection {
        collection: String,
        items: Vec<Guid>,
    },
    ClearCollection {
        collection: String,
    },
    UpdateListItem {
        name: String,
        selector: ListItemSelector,
        item: ListItem,
    },
}

impl NodeOperation {
    pub fn is_create(&self) -> bool {
        matches!(self, Self::CreateNode { .. })
    }

    /// Field written by this operation, if any.
    pub fn field_name(&self) -> Option<&str> {
        match self {
            Self::SetField { name, .. } | Self::UpdateListItem { name, .. } => Some(name),
            _ => None,
        }
    }
}

/// An operation addressed to a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    pub guid: Guid,
    pub kind: NodeOperation,
}

impl Operation {
    pub fn new(guid: Guid, kind: NodeOperation) -> Self {
        Self { guid, kind }
    }

    pub fn create(guid: Guid, tag: impl Into<String>) -> Self {
        Self::new(
            guid,
            NodeOperation::CreateNode {
                tag: tag.into(),
                fields: FieldStore::new(),
                edges: BTreeMap::new(),
                edge_collections: BTreeMap::new(),
            },
        )
    }

    /// Create with initial fields, edges and collections.
    pub fn create_with(
        guid: Guid,
        tag: impl Into<String>,
        fields: FieldStore,
        edges: BTreeMap<String, Option<Guid>>,
        edge_collections: BTreeMap<String, Vec<Guid>>,
    ) -> Self {
        Self::new(
            guid,
            NodeOperation::CreateNode {
                tag: tag.into(),
                fields,
                edges,
                edge_collections,
            },
        )
    }

    pub fn delete(guid: Guid) -> Self {
        Self::new(guid, NodeOperation::DeleteNode)
    }

    pub fn set_field(guid: Guid, name: impl Into<String>, value: FieldValue) -> Self {
        Self::new(
            guid,
            NodeOperation::SetField {
                name: name.into(),
                value,
            },
        )
    }

    pub fn set_edge(guid: Guid, name: impl Into<String>, target: Option<Guid>) -> Self {
        Self::new(
            guid,
            NodeOperation::SetEdge {
                name: name.into(),
                target,
            },
        )
    }

    pub fn insert(
        guid: Guid,
        collection: impl Into<String>,
        item: Guid,
        position: InsertPosition,
    ) -> Self {
        Self::new(
            guid,
            NodeOperation::InsertIntoCollection {
                collection: collection.into(),
                item,
                position,
            },
        )
    }

    pub fn remove(guid: Guid, collection: impl Into<String>, item: Guid) -> Self {
        Self::new(
            guid,
            NodeOperation::RemoveFromCollection {
                collection: collection.into(),
                item,
            },
        )
    }

    pub fn replace_collection(guid: Guid, collection: impl Into<String>, items: Vec<Guid>) -> Self {
        Self::new(
            guid,
            NodeOperation::ReplaceCollection {
                collection: collection.into(),
                items,
            },
        )
    }

    pub fn clear_collection(guid: Guid, collection: impl Into<String>) -> Self {
        Self::new(
            guid,
            NodeOperation::ClearCollection {
                collection: collection.into(),
            },
        )
    }

    pub fn update_list_item(
        guid: Guid,
        name: impl Into<String>,
        selector: ListItemSelector,
        item: ListItem,
    ) -> Self {
        Self::new(
            guid,
            NodeOperation::UpdateListItem {
                name: name.into(),
                selector,
                item,
            },
        )
    }
}
