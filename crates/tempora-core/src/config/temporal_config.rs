//! Cursor and resolver configuration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TemporalConfig {
    /// Upper bound on operations in one batch.
    pub max_batch_operations: usize,
    /// Added on top of the clock reading when stamping a batch, in millis.
    pub clock_skew_tolerance_ms: i64,
}

impl Default for TemporalConfig {
    fn default() -> Self {
        Self {
            max_batch_operations: 10_000,
            clock_skew_tolerance_ms: 0,
        }
    }
}
