//! Differences between two resolved states of a node set.

use serde::{Deserialize, Serialize};

use crate::ids::{Guid, Timestamp};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemporalDiffQuery {
    pub guids: Vec<Guid>,
    /// Earlier time point
    pub time_a: Timestamp,
    /// Later time point
    pub time_b: Timestamp,
}

/// Node set changes between `time_a` and `time_b`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemporalDiff {
    /// Absent at `time_a`, present at `time_b`.
    pub created: Vec<Guid>,
    /// Present at `time_a`, absent at `time_b`.
    pub deleted: Vec<Guid>,
    pub modified: Vec<NodeModification>,
    pub stats: DiffStats,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeModification {
    pub guid: Guid,
    pub from: Timestamp,
    pub to: Timestamp,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffStats {
    pub nodes_at_a: usize,
    pub nodes_at_b: usize,
    pub unchanged: usize,
}
