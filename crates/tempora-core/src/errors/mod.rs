mod cursor_error;
mod storage_error;
mod tempora_error;

pub use cursor_error::CursorError;
pub use storage_error::StorageError;
pub use tempora_error::{ErrorCategory, TemporaError, TemporaResult};
