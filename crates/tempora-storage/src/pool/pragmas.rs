use rusqlite::Connection;

use tempora_core::errors::TemporaResult;

use crate::to_storage_err;

/// WAL, relaxed sync, FK enforcement and a busy timeout for the writer.
pub fn apply_write_pragmas(conn: &Connection, busy_timeout_ms: u64) -> TemporaResult<()> {
    conn.execute_batch(&format!(
        "PRAGMA journal_mode = WAL;
         PRAGMA synchronous = NORMAL;
         PRAGMA foreign_keys = ON;
         PRAGMA busy_timeout = {busy_timeout_ms};"
    ))
    .map_err(|e| to_storage_err(format!("write pragmas: {e}")))
}

/// Readers never write.
pub fn apply_read_pragmas(conn: &Connection, busy_timeout_ms: u64) -> TemporaResult<()> {
    conn.execute_batch(&format!(
        "PRAGMA query_only = ON;
         PRAGMA busy_timeout = {busy_timeout_ms};"
    ))
    .map_err(|e| to_storage_err(format!("read pragmas: {e}")))
}
