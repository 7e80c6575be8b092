//! # tempora-temporal
//!
//! Point-in-time resolution over the revision log, the cursor/session that
//! batches operations into atomic revision sets, and the `TemporalEngine`
//! facade the API layer talks to.

pub mod cursor;
pub mod engine;
pub mod query;
pub mod resolver;

pub use cursor::{Cursor, CursorMode};
pub use engine::TemporalEngine;
pub use resolver::resolve;
