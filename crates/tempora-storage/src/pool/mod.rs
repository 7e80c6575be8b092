//! Connection management: one serialized writer, a small pool of readers.

mod pragmas;
mod read_pool;
mod write_connection;

pub use pragmas::{apply_read_pragmas, apply_write_pragmas};
pub use read_pool::ReadPool;
pub use write_connection::WriteConnection;
