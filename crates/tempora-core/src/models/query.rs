//! Read queries: a GUID set plus a temporal selector.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::Revision;
use crate::ids::{Guid, Timestamp};

/// Which instant of the revision history to read. Pure description, no state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "at", rename_all = "snake_case")]
pub enum TemporalSelector {
    /// The current instant.
    Now,
    /// Latest state at or before the timestamp.
    At(Timestamp),
    /// The first event boundary strictly after the timestamp.
    Next(Timestamp),
    /// The last event boundary strictly before the timestamp.
    Previous(Timestamp),
    /// The founding transaction of the requested node set.
    Inception,
}

impl TemporalSelector {
    pub fn is_now(&self) -> bool {
        matches!(self, Self::Now)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeQuery {
    pub guids: Vec<Guid>,
    pub selector: TemporalSelector,
}

impl NodeQuery {
    pub fn new(guids: impl Into<Vec<Guid>>, selector: TemporalSelector) -> Self {
        Self {
            guids: guids.into(),
            selector,
        }
    }

    pub fn now(guids: impl Into<Vec<Guid>>) -> Self {
        Self::new(guids, TemporalSelector::Now)
    }
}

/// Resolved node set. Absent GUIDs had no qualifying revision, which is a
/// valid result rather than a failure. Iteration order is unspecified.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub timestamp: Timestamp,
    pub revisions: HashMap<Guid, Revision>,
}

impl Resolution {
    pub fn empty(timestamp: Timestamp) -> Self {
        Self {
            timestamp,
            revisions: HashMap::new(),
        }
    }

    pub fn get(&self, guid: &Guid) -> Option<&Revision> {
        self.revisions.get(guid)
    }

    pub fn contains(&self, guid: &Guid) -> bool {
        self.revisions.contains_key(guid)
    }

    pub fn len(&self) -> usize {
        self.revisions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.revisions.is_empty()
    }
}
