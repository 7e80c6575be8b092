/// Storage-layer errors for the SQLite revision log.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("SQLite error: {message}")]
    SqliteError { message: String },

    #[error("migration failed at version {version}: {reason}")]
    MigrationFailed { version: u32, reason: String },

    #[error("connection pool exhausted: {active} active connections")]
    ConnectionPoolExhausted { active: usize },

    #[error("corrupt revision {revision_id}: {details}")]
    CorruptRevision { revision_id: u64, details: String },

    #[error("backing store unavailable: {0}")]
    Unavailable(String),
}
