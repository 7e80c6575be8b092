//! Persisted node revisions.

use serde::{Deserialize, Serialize};

use crate::ids::{Guid, Timestamp};
use crate::node::NodeState;

/// One immutable, timestamped, full snapshot of a node.
///
/// Revisions are never updated once written; a node's current state is a
/// function of its revision history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Revision {
    pub guid: Guid,
    pub tag: String,
    pub timestamp: Timestamp,
    pub state: NodeState,
    /// blake3 of `state`, for cheap change detection.
    pub content_hash: String,
    /// Batch that wrote this revision. `None` until persisted.
    pub batch_id: Option<u64>,
}

impl Revision {
    pub fn new(guid: Guid, tag: impl Into<String>, timestamp: Timestamp, state: NodeState) -> Self {
        let content_hash = state.content_hash();
        Self {
            guid,
            tag: tag.into(),
            timestamp,
            state,
            content_hash,
            batch_id: None,
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.state.deleted
    }
}
