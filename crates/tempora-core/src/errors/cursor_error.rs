use crate::ids::{Guid, Timestamp};

/// Cursor/session usage errors. All of these are caller contract violations.
#[derive(Debug, thiserror::Error)]
pub enum CursorError {
    #[error("cannot write while rewound to {at}")]
    RewoundWrite { at: Timestamp },

    #[error("guid {guid} belongs to a deleted node and cannot be reused")]
    GuidReuse { guid: Guid },

    #[error("node {guid} is not loaded in this cursor")]
    NodeNotLoaded { guid: Guid },

    #[error("node {guid} is deleted")]
    NodeDeleted { guid: Guid },

    #[error("batch has {count} operations, limit is {limit}")]
    BatchTooLarge { count: usize, limit: usize },
}
