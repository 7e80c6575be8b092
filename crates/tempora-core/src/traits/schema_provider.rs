//! Schema collaborator seam.

use std::collections::HashMap;

use crate::ids::Guid;
use crate::models::{NodeOperation, NodeShape};

/// Supplies node shapes and the operations a fresh node starts with.
pub trait ISchemaProvider: Send + Sync {
    fn shape(&self, tag: &str) -> Option<&NodeShape>;

    /// Operations applied to a newly created node before its create payload.
    fn derive_operations(&self, guid: Guid, tag: &str) -> Vec<NodeOperation>;
}

/// In-memory provider built from a fixed set of shapes. Derived operations
/// set each declared default.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    shapes: HashMap<String, NodeShape>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, shape: NodeShape) -> &mut Self {
        self.shapes.insert(shape.tag.clone(), shape);
        self
    }

    pub fn with_shape(mut self, shape: NodeShape) -> Self {
        self.register(shape);
        self
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

impl ISchemaProvider for SchemaRegistry {
    fn shape(&self, tag: &str) -> Option<&NodeShape> {
        self.shapes.get(tag)
    }

    fn derive_operations(&self, _guid: Guid, tag: &str) -> Vec<NodeOperation> {
        let Some(shape) = self.shapes.get(tag) else {
            return Vec::new();
        };
        shape
            .defaults
            .entries()
            .into_iter()
            .map(|(name, value)| NodeOperation::SetField { name, value })
            .collect()
    }
}
