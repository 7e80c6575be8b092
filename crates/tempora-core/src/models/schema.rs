//! Node shapes supplied by the schema collaborator.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::NodeOperation;
use crate::errors::{TemporaError, TemporaResult};
use crate::fields::{FieldKind, FieldStore, FieldValue};

/// Declared fields, edges and edge collections for one tag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeShape {
    pub tag: String,
    pub fields: BTreeMap<String, FieldKind>,
    pub edges: BTreeSet<String>,
    pub edge_collections: BTreeSet<String>,
    /// Values a freshly created node starts with.
    pub defaults: FieldStore,
}

impl NodeShape {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    pub fn field(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.fields.insert(name.into(), kind);
        self
    }

    pub fn edge(mut self, name: impl Into<String>) -> Self {
        self.edges.insert(name.into());
        self
    }

    pub fn edge_collection(mut self, name: impl Into<String>) -> Self {
        self.edge_collections.insert(name.into());
        self
    }

    pub fn default_value(mut self, name: &str, value: FieldValue) -> Self {
        self.defaults.set(name, value);
        self
    }

    /// Reject an operation that touches something this shape does not declare.
    pub fn validate(&self, op: &NodeOperation) -> TemporaResult<()> {
        match op {
            NodeOperation::CreateNode {
                fields,
                edges,
                edge_collections,
                ..
            } => {
                for (name, value) in fields.entries() {
                    self.check_field(&name, value.kind())?;
                }
                for name in edges.keys() {
                    self.check_edge(name)?;
                }
                for name in edge_collections.keys() {
                    self.check_collection(name)?;
                }
                Ok(())
            }
            NodeOperation::DeleteNode => Ok(()),
            NodeOperation::SetField { name, value } => self.check_field(name, value.kind()),
            NodeOperation::UpdateListItem { name, item, .. } => self.check_field(name, item.kind()),
            NodeOperation::SetEdge { name, .. } => self.check_edge(name),
            NodeOperation::InsertIntoCollection { collection, .. }
            | NodeOperation::RemoveFromCollection { collection, .. }
            | NodeOperation::ReplaceCollection { collection, .. }
            | NodeOperation::ClearCollection { collection } => self.check_collection(collection),
        }
    }

    fn check_field(&self, name: &str, kind: FieldKind) -> TemporaResult<()> {
        match self.fields.get(name) {
            Some(declared) if *declared == kind => Ok(()),
            Some(declared) => Err(TemporaError::ValidationError(format!(
                "{}.{name} is {declared:?}, got {kind:?}",
                self.tag
            ))),
            None => Err(TemporaError::ValidationError(format!(
                "{} declares no field {name}",
                self.tag
            ))),
        }
    }

    fn check_edge(&self, name: &str) -> TemporaResult<()> {
        if self.edges.contains(name) {
            Ok(())
        } else {
            Err(TemporaError::ValidationError(format!(
                "{} declares no edge {name}",
                self.tag
            )))
        }
    }

    fn check_collection(&self, name: &str) -> TemporaResult<()> {
        if self.edge_collections.contains(name) {
            Ok(())
        } else {
            Err(TemporaError::ValidationError(format!(
                "{} declares no edge collection {name}",
                self.tag
            )))
        }
    }
}
