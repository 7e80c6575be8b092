//! `StorageEngine`: SQLite implementation of `IRevisionStore`.
//!
//! Owns the write connection and, for file-backed databases, a read pool.
//! In-memory databases are private to one connection, so reads go through
//! the writer there.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use rusqlite::Connection;
use tracing::{debug, info, warn};

use tempora_core::config::StorageConfig;
use tempora_core::errors::TemporaResult;
use tempora_core::models::{Revision, RevisionBatch};
use tempora_core::traits::IRevisionStore;
use tempora_core::{Guid, TemporaError, Timestamp};

use crate::codec::{decode_revision, encode_state};
use crate::migrations;
use crate::pool::{ReadPool, WriteConnection};
use crate::queries::batch_ops::{self, RawBatch};
use crate::queries::revision_ops::{self, RawRevision};
use crate::queries::reference_ops;
use crate::to_storage_err;

/// Connection handles owned by the engine.
pub struct ConnectionPool {
    pub writer: WriteConnection,
    /// `None` for in-memory databases.
    pub readers: Option<ReadPool>,
}

pub struct StorageEngine {
    pool: ConnectionPool,
    path: Option<PathBuf>,
}

impl StorageEngine {
    /// Open per `config`: a file when `db_path` is set, in-memory otherwise.
    pub fn open(config: &StorageConfig) -> TemporaResult<Self> {
        match &config.db_path {
            Some(path) => Self::open_file(path, config.read_pool_size, config.busy_timeout_ms),
            None => Self::open_in_memory(),
        }
    }

    /// Open a file-backed engine. Runs migrations before the readers attach.
    pub fn open_file(path: &Path, read_pool_size: usize, busy_timeout_ms: u64) -> TemporaResult<Self> {
        let conn = WriteConnection::connect(path, busy_timeout_ms)?;
        migrations::run_migrations(&conn)?;

        let writer = WriteConnection::from_connection(conn);
        let readers = ReadPool::open(path, read_pool_size, busy_timeout_ms)?;
        info!(path = %path.display(), readers = readers.size(), "opened revision store");

        Ok(Self {
            pool: ConnectionPool {
                writer,
                readers: Some(readers),
            },
            path: Some(path.to_path_buf()),
        })
    }

    /// Open a private in-memory engine (for tests and ephemeral sessions).
    pub fn open_in_memory() -> TemporaResult<Self> {
        let conn = WriteConnection::connect_in_memory()?;
        migrations::run_migrations(&conn)?;
        debug!("opened in-memory revision store");

        Ok(Self {
            pool: ConnectionPool {
                writer: WriteConnection::from_connection(conn),
                readers: None,
            },
            path: None,
        })
    }

    pub fn pool(&self) -> &ConnectionPool {
        &self.pool
    }

    /// Database file path (None for in-memory).
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Route a read to the pool, or to the writer when there is none.
    async fn read<F, T>(&self, f: F) -> TemporaResult<T>
    where
        F: FnOnce(&Connection) -> TemporaResult<T>,
    {
        match &self.pool.readers {
            Some(readers) => readers.with_conn(f),
            None => self.pool.writer.with_conn(f).await,
        }
    }

    /// Per-GUID lookup shared by the search methods.
    async fn search_each<F>(&self, guids: &[Guid], lookup: F) -> TemporaResult<HashMap<Guid, Revision>>
    where
        F: Fn(&Connection, &str) -> TemporaResult<Option<RawRevision>>,
    {
        let raws = self
            .read(|conn| {
                let mut found = Vec::with_capacity(guids.len());
                for guid in guids {
                    if let Some(raw) = lookup(conn, &guid.to_string())? {
                        found.push(raw);
                    }
                }
                Ok(found)
            })
            .await?;

        let mut out = HashMap::with_capacity(raws.len());
        for raw in raws {
            let revision = decode_revision(raw)?;
            out.insert(revision.guid, revision);
        }
        Ok(out)
    }

    pub async fn batch(&self, batch_id: u64) -> TemporaResult<Option<RawBatch>> {
        self.read(|conn| batch_ops::get_batch(conn, batch_id)).await
    }

    pub async fn count_batches(&self) -> TemporaResult<u64> {
        self.read(batch_ops::count_batches).await
    }

    pub async fn count_revisions(&self) -> TemporaResult<u64> {
        self.read(revision_ops::count_revisions).await
    }
}

impl IRevisionStore for StorageEngine {
    async fn append(&self, batch: RevisionBatch) -> TemporaResult<u64> {
        if batch.revisions.is_empty() {
            return Err(TemporaError::ValidationError(format!(
                "batch {} has no revisions",
                batch.action
            )));
        }

        let prepared = batch
            .revisions
            .iter()
            .map(|r| Ok((r.guid.to_string(), r, encode_state(&r.state)?)))
            .collect::<TemporaResult<Vec<_>>>()?;
        let recorded_at = batch.timestamp.as_millis();

        let result = self
            .pool
            .writer
            .with_conn(|conn| {
                let tx = conn
                    .unchecked_transaction()
                    .map_err(|e| to_storage_err(format!("begin transaction: {e}")))?;

                let batch_id =
                    batch_ops::insert_batch(&tx, &batch.action, recorded_at, prepared.len())?;
                for (guid, revision, blob) in &prepared {
                    let revision_id = revision_ops::insert_revision(
                        &tx,
                        guid,
                        &revision.tag,
                        revision.state.deleted,
                        recorded_at,
                        blob,
                        &revision.content_hash,
                        batch_id,
                    )?;
                    reference_ops::insert_references(&tx, revision_id, guid, &revision.state)?;
                }

                tx.commit()
                    .map_err(|e| to_storage_err(format!("commit batch: {e}")))?;
                Ok(batch_id)
            })
            .await;

        match &result {
            Ok(batch_id) => info!(
                batch_id,
                action = %batch.action,
                timestamp = %batch.timestamp,
                revisions = prepared.len(),
                "appended revision batch"
            ),
            Err(e) => warn!(action = %batch.action, error = %e, "revision batch append failed"),
        }
        result
    }

    async fn search_at_or_before(
        &self,
        guids: &[Guid],
        at: Timestamp,
    ) -> TemporaResult<HashMap<Guid, Revision>> {
        let at = at.as_millis();
        self.search_each(guids, |conn, guid| {
            revision_ops::latest_at_or_before(conn, guid, at)
        })
        .await
    }

    async fn search_after(
        &self,
        guids: &[Guid],
        after: Timestamp,
    ) -> TemporaResult<HashMap<Guid, Revision>> {
        let after = after.as_millis();
        self.search_each(guids, |conn, guid| {
            revision_ops::earliest_after(conn, guid, after)
        })
        .await
    }

    async fn search_before(
        &self,
        guids: &[Guid],
        before: Timestamp,
    ) -> TemporaResult<HashMap<Guid, Revision>> {
        let before = before.as_millis();
        self.search_each(guids, |conn, guid| {
            revision_ops::latest_before(conn, guid, before)
        })
        .await
    }

    async fn search_earliest(&self, guids: &[Guid]) -> TemporaResult<HashMap<Guid, Revision>> {
        self.search_each(guids, revision_ops::earliest).await
    }

    async fn deleted_at_or_before(
        &self,
        guids: &[Guid],
        at: Timestamp,
    ) -> TemporaResult<HashSet<Guid>> {
        let at = at.as_millis();
        self.read(|conn| {
            let mut deleted = HashSet::new();
            for guid in guids {
                if revision_ops::has_tombstone_at_or_before(conn, &guid.to_string(), at)? {
                    deleted.insert(*guid);
                }
            }
            Ok(deleted)
        })
        .await
    }

    async fn referencing_nodes(&self, target: Guid) -> TemporaResult<Vec<Revision>> {
        let target = target.to_string();
        let raws = self
            .read(|conn| reference_ops::latest_referencing(conn, &target))
            .await?;
        raws.into_iter().map(decode_revision).collect()
    }

    async fn history(&self, guid: Guid) -> TemporaResult<Vec<Revision>> {
        let guid = guid.to_string();
        let raws = self.read(|conn| revision_ops::history(conn, &guid)).await?;
        raws.into_iter().map(decode_revision).collect()
    }
}
