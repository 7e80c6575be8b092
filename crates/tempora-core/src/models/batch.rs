//! Batch commit types.

use serde::{Deserialize, Serialize};

use super::Revision;
use crate::ids::{Guid, Timestamp};

/// When a batch folds its nodes relative to the store append.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchMode {
    /// Fold Delta into Data first, then write the Data snapshots.
    Data,
    /// Write the folded snapshots first, fold in memory only once the append
    /// succeeded.
    #[default]
    Delta,
}

/// Revisions handed to the store as one atomic append.
#[derive(Debug, Clone)]
pub struct RevisionBatch {
    /// Action identifier the collaborator scoped this batch with.
    pub action: String,
    pub timestamp: Timestamp,
    pub revisions: Vec<Revision>,
}

/// What a committed batch produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReceipt {
    pub batch_id: u64,
    pub action: String,
    pub timestamp: Timestamp,
    /// Every node that received a revision.
    pub guids: Vec<Guid>,
}
