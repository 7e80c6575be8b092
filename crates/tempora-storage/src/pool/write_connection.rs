use std::path::Path;

use rusqlite::Connection;
use tokio::sync::Mutex;

use tempora_core::errors::TemporaResult;

use super::pragmas::apply_write_pragmas;
use crate::to_storage_err;

/// The single write connection. Every write is serialized through its mutex.
pub struct WriteConnection {
    conn: Mutex<Connection>,
}

impl WriteConnection {
    /// Open `path` with the write pragmas applied. Callers migrate the raw
    /// connection, then wrap it with [`WriteConnection::from_connection`].
    pub fn connect(path: &Path, busy_timeout_ms: u64) -> TemporaResult<Connection> {
        let conn = Connection::open(path)
            .map_err(|e| to_storage_err(format!("open {}: {e}", path.display())))?;
        apply_write_pragmas(&conn, busy_timeout_ms)?;
        Ok(conn)
    }

    /// A private in-memory database. Only this connection can see it.
    pub fn connect_in_memory() -> TemporaResult<Connection> {
        let conn = Connection::open_in_memory()
            .map_err(|e| to_storage_err(format!("open in-memory: {e}")))?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(|e| to_storage_err(format!("write pragmas: {e}")))?;
        Ok(conn)
    }

    /// Wrap an already configured connection (used after migrations ran on it).
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// Run `f` with exclusive access to the connection.
    pub async fn with_conn<F, T>(&self, f: F) -> TemporaResult<T>
    where
        F: FnOnce(&Connection) -> TemporaResult<T>,
    {
        let conn = self.conn.lock().await;
        f(&conn)
    }
}
