use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use rusqlite::{Connection, OpenFlags};

use tempora_core::errors::{StorageError, TemporaResult};

use super::pragmas::apply_read_pragmas;
use crate::to_storage_err;

const MAX_POOL_SIZE: usize = 8;
const DEFAULT_POOL_SIZE: usize = 4;

/// Round-robin pool of read-only connections to a file-backed database.
pub struct ReadPool {
    conns: Vec<Mutex<Connection>>,
    next: AtomicUsize,
}

impl ReadPool {
    /// Open `size` readers, clamped to `1..=MAX_POOL_SIZE`.
    pub fn open(path: &Path, size: usize, busy_timeout_ms: u64) -> TemporaResult<Self> {
        let size = size.clamp(1, MAX_POOL_SIZE);
        let mut conns = Vec::with_capacity(size);
        for _ in 0..size {
            let conn = Connection::open_with_flags(
                path,
                OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )
            .map_err(|e| to_storage_err(format!("open reader {}: {e}", path.display())))?;
            apply_read_pragmas(&conn, busy_timeout_ms)?;
            conns.push(Mutex::new(conn));
        }
        Ok(Self {
            conns,
            next: AtomicUsize::new(0),
        })
    }

    pub fn default_size() -> usize {
        DEFAULT_POOL_SIZE
    }

    pub fn size(&self) -> usize {
        self.conns.len()
    }

    /// Run `f` on the next reader in rotation.
    pub fn with_conn<F, T>(&self, f: F) -> TemporaResult<T>
    where
        F: FnOnce(&Connection) -> TemporaResult<T>,
    {
        let idx = self.next.fetch_add(1, Ordering::Relaxed) % self.conns.len();
        let conn = self.conns[idx].lock().map_err(|_| {
            tempora_core::TemporaError::StorageError(StorageError::ConnectionPoolExhausted {
                active: self.conns.len(),
            })
        })?;
        f(&conn)
    }
}
