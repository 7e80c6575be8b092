use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Configuration for the SQLite revision store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    /// Database file. `None` opens a private in-memory database.
    pub db_path: Option<PathBuf>,
    pub read_pool_size: usize,
    pub busy_timeout_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            read_pool_size: 4,
            busy_timeout_ms: 5000,
        }
    }
}
