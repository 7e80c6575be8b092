//! Atomic batch execution.
//!
//! 1. Refuse while Rewound, validate limits and schema, check creates for
//!    conflicts and GUID reuse. Nothing is written before all checks pass.
//! 2. Build created nodes sequentially: derived operations, then payload.
//! 3. Fan the remaining operations out as one task each, serialized per
//!    node by its mutex, and join them all.
//! 4. Any failure rolls every touched node back and persists nothing.
//! 5. Otherwise stamp one timestamp, build one revision per touched node and
//!    append them in a single call.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tracing::{info, warn};

use tempora_core::errors::{CursorError, TemporaResult};
use tempora_core::models::{BatchMode, BatchReceipt, NodeOperation, Operation, RevisionBatch};
use tempora_core::traits::IRevisionStore;
use tempora_core::{Guid, Node, TemporaError, Timestamp};

use super::{Cursor, CursorMode, SharedNode};

impl<S: IRevisionStore> Cursor<S> {
    /// Execute `operations` as one all-or-nothing batch scoped by `action`.
    pub async fn run_batch(
        &mut self,
        action: &str,
        mode: BatchMode,
        operations: Vec<Operation>,
    ) -> TemporaResult<BatchReceipt> {
        if let CursorMode::Rewound { at } = self.mode {
            return Err(CursorError::RewoundWrite { at }.into());
        }
        if operations.is_empty() {
            return Err(TemporaError::ValidationError(format!(
                "batch {action} has no operations"
            )));
        }
        if operations.len() > self.config.max_batch_operations {
            return Err(CursorError::BatchTooLarge {
                count: operations.len(),
                limit: self.config.max_batch_operations,
            }
            .into());
        }

        let (creates, updates): (Vec<Operation>, Vec<Operation>) =
            operations.into_iter().partition(|op| op.kind.is_create());

        self.check_creates(&creates).await?;
        self.check_updates(&creates, &updates).await?;

        let created: Vec<Guid> = creates.iter().map(|op| op.guid).collect();
        let touched: BTreeSet<Guid> = creates
            .iter()
            .chain(updates.iter())
            .map(|op| op.guid)
            .collect();

        let applied = match self.build_creates(&creates) {
            Ok(()) => self.apply_concurrently(updates).await,
            Err(e) => Err(e),
        };
        if let Err(e) = applied {
            warn!(action, error = %e, "batch aborted, rolling back");
            self.roll_back(&touched, &created, HashMap::new()).await;
            return Err(e);
        }

        self.commit(action, mode, &touched, &created).await
    }

    /// Conflicts and GUID reuse, checked against the working set and the store.
    async fn check_creates(&self, creates: &[Operation]) -> TemporaResult<()> {
        if creates.is_empty() {
            return Ok(());
        }

        let mut seen = HashSet::new();
        for op in creates {
            if self.nodes.contains_key(&op.guid) || !seen.insert(op.guid) {
                return Err(TemporaError::NodeConflict { guid: op.guid });
            }
        }

        let guids: Vec<Guid> = creates.iter().map(|op| op.guid).collect();
        let tombstoned = self.store.deleted_at_or_before(&guids, Timestamp::MAX).await?;
        if let Some(guid) = guids.iter().find(|g| tombstoned.contains(g)) {
            return Err(CursorError::GuidReuse { guid: *guid }.into());
        }

        let existing = self.store.search_earliest(&guids).await?;
        if let Some(guid) = guids.iter().find(|g| existing.contains_key(g)) {
            return Err(TemporaError::NodeConflict { guid: *guid });
        }
        Ok(())
    }

    /// Every update must target a loaded or newly created node and, with a
    /// schema present, fit the node's shape. Creates are validated too.
    async fn check_updates(&self, creates: &[Operation], updates: &[Operation]) -> TemporaResult<()> {
        let mut tags: HashMap<Guid, String> = HashMap::new();
        for op in creates {
            if let NodeOperation::CreateNode { tag, .. } = &op.kind {
                tags.insert(op.guid, tag.clone());
            }
        }
        for op in updates {
            if tags.contains_key(&op.guid) {
                continue;
            }
            let shared = self
                .nodes
                .get(&op.guid)
                .ok_or(CursorError::NodeNotLoaded { guid: op.guid })?;
            let tag = shared.lock().await.tag().to_string();
            tags.insert(op.guid, tag);
        }

        let Some(schema) = &self.schema else {
            return Ok(());
        };
        for op in creates.iter().chain(updates.iter()) {
            let tag = tags.get(&op.guid).map(String::as_str).unwrap_or_default();
            let shape = schema.shape(tag).ok_or_else(|| {
                TemporaError::ValidationError(format!("no shape registered for tag {tag}"))
            })?;
            shape.validate(&op.kind)?;
        }
        Ok(())
    }

    /// Sequential pre-phase: new nodes get their derived operations, then
    /// their create payload, before any other operation runs.
    fn build_creates(&mut self, creates: &[Operation]) -> TemporaResult<()> {
        for op in creates {
            let NodeOperation::CreateNode { tag, .. } = &op.kind else {
                continue;
            };
            let mut node = self.attach_observers(Node::new(op.guid, tag.clone()));
            if let Some(schema) = &self.schema {
                for derived in schema.derive_operations(op.guid, tag) {
                    node.apply(&derived)?;
                }
            }
            node.apply(&op.kind)?;
            self.nodes.insert(op.guid, Arc::new(Mutex::new(node)));
        }
        Ok(())
    }

    /// One task per operation; each holds only its node's lock.
    async fn apply_concurrently(&self, updates: Vec<Operation>) -> TemporaResult<()> {
        let mut tasks = JoinSet::new();
        for op in updates {
            let shared = self
                .nodes
                .get(&op.guid)
                .cloned()
                .ok_or(CursorError::NodeNotLoaded { guid: op.guid })?;
            tasks.spawn(async move {
                let mut node = shared.lock().await;
                node.apply(&op.kind)
            });
        }

        let mut first_error = None;
        while let Some(joined) = tasks.join_next().await {
            let result = joined
                .map_err(|e| TemporaError::ConcurrencyError(format!("operation task: {e}")))
                .and_then(|r| r);
            if let Err(e) = result {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    async fn commit(
        &mut self,
        action: &str,
        mode: BatchMode,
        touched: &BTreeSet<Guid>,
        created: &[Guid],
    ) -> TemporaResult<BatchReceipt> {
        let shared = self.shared(touched)?;
        let timestamp = self.batch_timestamp(&shared).await;

        let mut revisions = Vec::with_capacity(shared.len());
        let mut baselines = HashMap::new();
        for (guid, node) in &shared {
            let mut node = node.lock().await;
            match mode {
                BatchMode::Data => {
                    baselines.insert(*guid, node.clone());
                    node.commit(timestamp);
                    revisions.push(node.to_revision(timestamp));
                }
                BatchMode::Delta => revisions.push(node.to_revision(timestamp)),
            }
        }

        let batch = RevisionBatch {
            action: action.to_string(),
            timestamp,
            revisions,
        };
        let batch_id = match self.store.append(batch).await {
            Ok(id) => id,
            Err(e) => {
                warn!(action, error = %e, "revision append failed, rolling back");
                self.roll_back(touched, created, baselines).await;
                return Err(e);
            }
        };

        if mode == BatchMode::Delta {
            for (_, node) in &shared {
                node.lock().await.commit(timestamp);
            }
        }
        self.timestamp = timestamp;
        self.last_commit = Some(timestamp);

        info!(
            batch_id,
            action,
            %timestamp,
            nodes = touched.len(),
            ?mode,
            "batch committed"
        );
        Ok(BatchReceipt {
            batch_id,
            action: action.to_string(),
            timestamp,
            guids: touched.iter().copied().collect(),
        })
    }

    /// At least the clock reading, strictly after every touched node's
    /// revision and this cursor's previous commit.
    async fn batch_timestamp(&self, shared: &[(Guid, SharedNode)]) -> Timestamp {
        let clock = self.clock.now().as_millis();
        let mut floor = Timestamp::from_millis(
            clock.saturating_add(self.config.clock_skew_tolerance_ms),
        );
        if let Some(last) = self.last_commit {
            floor = floor.max(last.successor());
        }
        for (_, node) in shared {
            let node = node.lock().await;
            if node.is_persisted() {
                floor = floor.max(node.timestamp().successor());
            }
        }
        floor
    }

    /// Restore Data-mode baselines, clear every touched Delta, forget created nodes.
    async fn roll_back(
        &mut self,
        touched: &BTreeSet<Guid>,
        created: &[Guid],
        mut baselines: HashMap<Guid, Node>,
    ) {
        for guid in created {
            self.nodes.remove(guid);
        }
        for guid in touched {
            let Some(shared) = self.nodes.get(guid) else {
                continue;
            };
            let mut node = shared.lock().await;
            if let Some(baseline) = baselines.remove(guid) {
                *node = baseline;
            }
            node.clear_delta();
        }
    }

    fn shared(&self, guids: &BTreeSet<Guid>) -> TemporaResult<Vec<(Guid, SharedNode)>> {
        guids
            .iter()
            .map(|guid| {
                self.nodes
                    .get(guid)
                    .cloned()
                    .map(|node| (*guid, node))
                    .ok_or_else(|| CursorError::NodeNotLoaded { guid: *guid }.into())
            })
            .collect()
    }
}
