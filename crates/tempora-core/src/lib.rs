//! Core types, traits, errors and config for the Tempora temporal graph store.
//!
//! Nodes carry two representations: a pending Delta and a materialized Data
//! baseline. [`node::fold`] reconciles one into the other, using
//! [`node::merge_ordered`] for ordered edge collections.

pub mod clock;
pub mod config;
pub mod errors;
pub mod fields;
pub mod ids;
pub mod models;
pub mod node;
pub mod observability;
pub mod traits;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::TemporaConfig;
pub use errors::{CursorError, ErrorCategory, StorageError, TemporaError, TemporaResult};
pub use fields::{FieldKind, FieldStore, FieldValue, ListItem, ListItemSelector};
pub use ids::{Guid, Timestamp};
pub use node::{Node, ReadMode};
