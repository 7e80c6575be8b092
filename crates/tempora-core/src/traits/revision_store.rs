//! The narrow contract any backing store must satisfy.

use std::collections::{HashMap, HashSet};

use crate::errors::TemporaResult;
use crate::ids::{Guid, Timestamp};
use crate::models::{Revision, RevisionBatch};

/// Append-only revision log, indexed by GUID and timestamp.
///
/// Lookups return at most one revision per requested GUID; GUIDs with no
/// qualifying revision are simply absent from the map. When two revisions of
/// one GUID share a timestamp, the later write wins.
#[allow(async_fn_in_trait)]
pub trait IRevisionStore: Send + Sync {
    /// Persist every revision of the batch atomically. Returns the batch id.
    async fn append(&self, batch: RevisionBatch) -> TemporaResult<u64>;

    /// Latest revision with `timestamp <= at`.
    async fn search_at_or_before(
        &self,
        guids: &[Guid],
        at: Timestamp,
    ) -> TemporaResult<HashMap<Guid, Revision>>;

    /// Earliest revision with `timestamp > after`.
    async fn search_after(
        &self,
        guids: &[Guid],
        after: Timestamp,
    ) -> TemporaResult<HashMap<Guid, Revision>>;

    /// Latest revision with `timestamp < before`.
    async fn search_before(
        &self,
        guids: &[Guid],
        before: Timestamp,
    ) -> TemporaResult<HashMap<Guid, Revision>>;

    /// First-ever revision.
    async fn search_earliest(&self, guids: &[Guid]) -> TemporaResult<HashMap<Guid, Revision>>;

    /// GUIDs carrying any tombstone at or before `at`. `Timestamp::MAX` asks "ever".
    async fn deleted_at_or_before(
        &self,
        guids: &[Guid],
        at: Timestamp,
    ) -> TemporaResult<HashSet<Guid>>;

    /// Latest revision of every live node whose latest revision references `target`.
    async fn referencing_nodes(&self, target: Guid) -> TemporaResult<Vec<Revision>>;

    /// Every revision of `guid`, oldest first.
    async fn history(&self, guid: Guid) -> TemporaResult<Vec<Revision>>;
}
