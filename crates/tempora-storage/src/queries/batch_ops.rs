//! Raw SQL operations for the revision_batches table.

use rusqlite::{params, Connection};

use tempora_core::errors::TemporaResult;

use crate::to_storage_err;

/// Raw batch row from the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawBatch {
    pub batch_id: u64,
    pub action: String,
    pub recorded_at: i64,
    pub revision_count: u64,
}

/// Insert a batch record. Returns the assigned batch_id.
pub fn insert_batch(
    conn: &Connection,
    action: &str,
    recorded_at: i64,
    revision_count: usize,
) -> TemporaResult<u64> {
    conn.execute(
        "INSERT INTO revision_batches (action, recorded_at, revision_count) VALUES (?1, ?2, ?3)",
        params![action, recorded_at, revision_count as i64],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;

    Ok(conn.last_insert_rowid() as u64)
}

pub fn get_batch(conn: &Connection, batch_id: u64) -> TemporaResult<Option<RawBatch>> {
    let result = conn.query_row(
        "SELECT batch_id, action, recorded_at, revision_count
         FROM revision_batches WHERE batch_id = ?1",
        params![batch_id as i64],
        |row| {
            Ok(RawBatch {
                batch_id: row.get::<_, i64>(0)? as u64,
                action: row.get(1)?,
                recorded_at: row.get(2)?,
                revision_count: row.get::<_, i64>(3)? as u64,
            })
        },
    );

    match result {
        Ok(b) => Ok(Some(b)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(to_storage_err(e.to_string())),
    }
}

pub fn count_batches(conn: &Connection) -> TemporaResult<u64> {
    conn.query_row("SELECT COUNT(*) FROM revision_batches", [], |row| {
        row.get::<_, i64>(0)
    })
    .map(|n| n as u64)
    .map_err(|e| to_storage_err(e.to_string()))
}
