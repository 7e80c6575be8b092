//! # tempora-storage
//!
//! SQLite persistence layer for the Tempora revision log.
//! Implements `IRevisionStore`.
//! Single write connection + read pool (WAL mode).

pub mod codec;
pub mod engine;
pub mod migrations;
pub mod pool;
pub mod queries;

pub use engine::StorageEngine;

/// Helper to convert a string message into a TemporaError::StorageError.
pub fn to_storage_err(msg: String) -> tempora_core::TemporaError {
    tempora_core::TemporaError::StorageError(tempora_core::errors::StorageError::SqliteError {
        message: msg,
    })
}
