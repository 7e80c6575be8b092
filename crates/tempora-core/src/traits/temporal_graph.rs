//! What the API collaborator sees of the core.

use crate::errors::TemporaResult;
use crate::ids::Guid;
use crate::models::{
    BatchMode, BatchReceipt, NodeQuery, Operation, Resolution, Revision, TemporalDiff,
    TemporalDiffQuery,
};

/// Submit typed operation batches and resolve temporal reads.
#[allow(async_fn_in_trait)]
pub trait ITemporalGraph: Send + Sync {
    /// Resolve a GUID set at a temporal selector.
    async fn resolve(&self, query: &NodeQuery) -> TemporaResult<Resolution>;

    /// Run one atomic batch scoped by `action`.
    async fn submit(
        &self,
        action: &str,
        mode: BatchMode,
        operations: Vec<Operation>,
    ) -> TemporaResult<BatchReceipt>;

    async fn history(&self, guid: Guid) -> TemporaResult<Vec<Revision>>;

    async fn diff(&self, query: &TemporalDiffQuery) -> TemporaResult<TemporalDiff>;

    async fn referencing(&self, target: Guid) -> TemporaResult<Vec<Revision>>;
}
