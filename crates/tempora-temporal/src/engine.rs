//! TemporalEngine: the facade the API collaborator talks to.

use std::sync::Arc;

use tracing::info;

use tempora_core::config::TemporalConfig;
use tempora_core::errors::TemporaResult;
use tempora_core::models::{
    BatchMode, BatchReceipt, NodeQuery, Operation, Resolution, Revision, TemporalDiff,
    TemporalDiffQuery,
};
use tempora_core::traits::{IRevisionStore, ISchemaProvider, ITemporalGraph};
use tempora_core::{Clock, Guid, SystemClock, TemporaConfig};
use tempora_storage::StorageEngine;

use crate::cursor::Cursor;
use crate::query;
use crate::resolver;

/// Shared store, clock and schema. Every request gets its own cursor.
pub struct TemporalEngine<S: IRevisionStore> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    schema: Option<Arc<dyn ISchemaProvider>>,
    config: TemporalConfig,
}

impl<S: IRevisionStore> TemporalEngine<S> {
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>, config: TemporalConfig) -> Self {
        Self {
            store,
            clock,
            schema: None,
            config,
        }
    }

    pub fn with_schema(mut self, schema: Arc<dyn ISchemaProvider>) -> Self {
        self.schema = Some(schema);
        self
    }

    /// A fresh Live cursor with an empty working set.
    pub fn cursor(&self) -> Cursor<S> {
        let cursor = Cursor::new(self.store.clone(), self.clock.clone(), self.config.clone());
        match &self.schema {
            Some(schema) => cursor.with_schema(schema.clone()),
            None => cursor,
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn config(&self) -> &TemporalConfig {
        &self.config
    }
}

impl TemporalEngine<StorageEngine> {
    /// SQLite-backed engine on the wall clock.
    pub fn open(config: &TemporaConfig) -> TemporaResult<Self> {
        config.validate()?;
        let store = StorageEngine::open(&config.storage)?;
        info!(
            persistent = store.path().is_some(),
            max_batch_operations = config.temporal.max_batch_operations,
            "temporal engine ready"
        );
        Ok(Self::new(
            Arc::new(store),
            Arc::new(SystemClock::new()),
            config.temporal.clone(),
        ))
    }
}

impl<S: IRevisionStore> ITemporalGraph for TemporalEngine<S> {
    async fn resolve(&self, query: &NodeQuery) -> TemporaResult<Resolution> {
        resolver::resolve(self.store.as_ref(), &query.guids, query.selector, self.clock.now()).await
    }

    async fn submit(
        &self,
        action: &str,
        mode: BatchMode,
        operations: Vec<Operation>,
    ) -> TemporaResult<BatchReceipt> {
        let mut targets: Vec<Guid> = operations
            .iter()
            .filter(|op| !op.kind.is_create())
            .map(|op| op.guid)
            .collect();
        targets.sort();
        targets.dedup();

        let mut cursor = self.cursor();
        cursor.load(&targets).await?;
        cursor.run_batch(action, mode, operations).await
    }

    async fn history(&self, guid: Guid) -> TemporaResult<Vec<Revision>> {
        self.store.history(guid).await
    }

    async fn diff(&self, query: &TemporalDiffQuery) -> TemporaResult<TemporalDiff> {
        query::execute_diff(self.store.as_ref(), query).await
    }

    async fn referencing(&self, target: Guid) -> TemporaResult<Vec<Revision>> {
        self.store.referencing_nodes(target).await
    }
}
