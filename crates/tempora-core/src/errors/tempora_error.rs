use super::{CursorError, StorageError};
use crate::ids::Guid;

/// Top-level error type for the Tempora graph store.
/// All subsystem errors convert into this via `From` impls.
#[derive(Debug, thiserror::Error)]
pub enum TemporaError {
    #[error("storage error: {0}")]
    StorageError(#[from] StorageError),

    #[error("cursor error: {0}")]
    CursorError(#[from] CursorError),

    #[error("node {guid} already exists")]
    NodeConflict { guid: Guid },

    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("invalid temporal bounds: {0}")]
    InvalidTemporalBounds(String),

    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("concurrency error: {0}")]
    ConcurrencyError(String),

    #[error("config error: {0}")]
    ConfigError(String),
}

/// Coarse classification handed to collaborators that translate core
/// failures into their own error surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Caller contract violation; never retried.
    Usage,
    /// A create collided with an existing node.
    Conflict,
    /// The backing store failed; the whole batch or query aborted.
    Store,
}

impl TemporaError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::StorageError(_) | Self::SerializationError(_) => ErrorCategory::Store,
            Self::NodeConflict { .. } => ErrorCategory::Conflict,
            Self::CursorError(_)
            | Self::ValidationError(_)
            | Self::InvalidTemporalBounds(_)
            | Self::ConcurrencyError(_)
            | Self::ConfigError(_) => ErrorCategory::Usage,
        }
    }
}

/// Convenience type alias.
pub type TemporaResult<T> = Result<T, TemporaError>;
