mod batch;
mod diff;
mod operation;
mod query;
mod revision;
mod schema;

pub use batch::{BatchMode, BatchReceipt, RevisionBatch};
pub use diff::{DiffStats, NodeModification, TemporalDiff, TemporalDiffQuery};
pub use operation::{InsertPosition, NodeOperation, Operation};
pub use query::{NodeQuery, Resolution, TemporalSelector};
pub use revision::Revision;
pub use schema::NodeShape;
