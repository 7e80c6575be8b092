//! Synchronous value-changed notifications.

use crate::fields::FieldValue;
use crate::ids::Guid;

/// One field write, as seen by observers and returned from `Node::set_value`.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldChange {
    pub guid: Guid,
    pub field: String,
    /// Working value before the write (pending Delta, else Data).
    pub previous: Option<FieldValue>,
    pub value: FieldValue,
}

/// Receives every field write on the nodes it is attached to, synchronously,
/// before `set_value` returns. Field validators hang off this seam; the core
/// works the same with none attached.
pub trait ChangeObserver: Send + Sync {
    fn on_change(&self, change: &FieldChange);
}

impl<F> ChangeObserver for F
where
    F: Fn(&FieldChange) + Send + Sync,
{
    fn on_change(&self, change: &FieldChange) {
        self(change)
    }
}
