//! Raw SQL operations for the node_revisions table.
//!
//! Same-timestamp collisions for one GUID resolve to the highest
//! `revision_id`, i.e. the last write.

use rusqlite::{params, Connection, OptionalExtension, Row};

use tempora_core::errors::TemporaResult;

use crate::to_storage_err;

const COLUMNS: &str =
    "revision_id, guid, tag, deleted, recorded_at, state, content_hash, batch_id";

/// Raw revision row from the database.
#[derive(Debug, Clone)]
pub struct RawRevision {
    pub revision_id: u64,
    pub guid: String,
    pub tag: String,
    pub deleted: bool,
    pub recorded_at: i64,
    /// zstd-compressed JSON `NodeState`.
    pub state: Vec<u8>,
    pub content_hash: String,
    pub batch_id: u64,
}

/// Insert a single revision. Returns the assigned revision_id.
#[allow(clippy::too_many_arguments)]
pub fn insert_revision(
    conn: &Connection,
    guid: &str,
    tag: &str,
    deleted: bool,
    recorded_at: i64,
    state: &[u8],
    content_hash: &str,
    batch_id: u64,
) -> TemporaResult<u64> {
    conn.execute(
        "INSERT INTO node_revisions
            (guid, tag, deleted, recorded_at, state, content_hash, batch_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            guid,
            tag,
            deleted,
            recorded_at,
            state,
            content_hash,
            batch_id as i64
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;

    Ok(conn.last_insert_rowid() as u64)
}

/// Latest revision with `recorded_at <= at`.
pub fn latest_at_or_before(
    conn: &Connection,
    guid: &str,
    at: i64,
) -> TemporaResult<Option<RawRevision>> {
    query_one(
        conn,
        &format!(
            "SELECT {COLUMNS} FROM node_revisions
             WHERE guid = ?1 AND recorded_at <= ?2
             ORDER BY recorded_at DESC, revision_id DESC LIMIT 1"
        ),
        guid,
        at,
    )
}

/// Latest revision with `recorded_at < before`.
pub fn latest_before(
    conn: &Connection,
    guid: &str,
    before: i64,
) -> TemporaResult<Option<RawRevision>> {
    query_one(
        conn,
        &format!(
            "SELECT {COLUMNS} FROM node_revisions
             WHERE guid = ?1 AND recorded_at < ?2
             ORDER BY recorded_at DESC, revision_id DESC LIMIT 1"
        ),
        guid,
        before,
    )
}

/// Earliest revision with `recorded_at > after`. Among revisions sharing that
/// timestamp the last write wins.
pub fn earliest_after(
    conn: &Connection,
    guid: &str,
    after: i64,
) -> TemporaResult<Option<RawRevision>> {
    query_one(
        conn,
        &format!(
            "SELECT {COLUMNS} FROM node_revisions
             WHERE guid = ?1 AND recorded_at > ?2
             ORDER BY recorded_at ASC, revision_id DESC LIMIT 1"
        ),
        guid,
        after,
    )
}

/// First-ever revision.
pub fn earliest(conn: &Connection, guid: &str) -> TemporaResult<Option<RawRevision>> {
    let mut stmt = conn
        .prepare_cached(&format!(
            "SELECT {COLUMNS} FROM node_revisions
             WHERE guid = ?1
             ORDER BY recorded_at ASC, revision_id DESC LIMIT 1"
        ))
        .map_err(|e| to_storage_err(e.to_string()))?;
    stmt.query_row(params![guid], row_to_raw_revision)
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))
}

/// Whether any tombstone exists with `recorded_at <= at`.
pub fn has_tombstone_at_or_before(conn: &Connection, guid: &str, at: i64) -> TemporaResult<bool> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT 1 FROM node_revisions
             WHERE guid = ?1 AND deleted = 1 AND recorded_at <= ?2
             LIMIT 1",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    stmt.exists(params![guid, at])
        .map_err(|e| to_storage_err(e.to_string()))
}

/// Every revision of a GUID, oldest first.
pub fn history(conn: &Connection, guid: &str) -> TemporaResult<Vec<RawRevision>> {
    let mut stmt = conn
        .prepare_cached(&format!(
            "SELECT {COLUMNS} FROM node_revisions
             WHERE guid = ?1
             ORDER BY recorded_at ASC, revision_id ASC"
        ))
        .map_err(|e| to_storage_err(e.to_string()))?;

    let rows = stmt
        .query_map(params![guid], row_to_raw_revision)
        .map_err(|e| to_storage_err(e.to_string()))?;

    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| to_storage_err(e.to_string()))
}

pub fn count_revisions(conn: &Connection) -> TemporaResult<u64> {
    conn.query_row("SELECT COUNT(*) FROM node_revisions", [], |row| {
        row.get::<_, i64>(0)
    })
    .map(|n| n as u64)
    .map_err(|e| to_storage_err(e.to_string()))
}

fn query_one(
    conn: &Connection,
    sql: &str,
    guid: &str,
    at: i64,
) -> TemporaResult<Option<RawRevision>> {
    let mut stmt = conn
        .prepare_cached(sql)
        .map_err(|e| to_storage_err(e.to_string()))?;
    stmt.query_row(params![guid, at], row_to_raw_revision)
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))
}

pub(crate) fn row_to_raw_revision(row: &Row<'_>) -> rusqlite::Result<RawRevision> {
    Ok(RawRevision {
        revision_id: row.get::<_, i64>(0)? as u64,
        guid: row.get(1)?,
        tag: row.get(2)?,
        deleted: row.get(3)?,
        recorded_at: row.get(4)?,
        state: row.get(5)?,
        content_hash: row.get(6)?,
        batch_id: row.get::<_, i64>(7)? as u64,
    })
}
