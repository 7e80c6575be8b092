//! Raw SQL, one module per table.

pub mod batch_ops;
pub mod reference_ops;
pub mod revision_ops;
