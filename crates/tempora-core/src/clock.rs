//! Time sources for batch timestamps and `Now` queries.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;

use crate::ids::Timestamp;

/// Source of "now" for the resolver and the cursor.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Wall clock, made monotonic: a reading never goes below the previous one,
/// even when the system clock steps backward.
#[derive(Debug, Default)]
pub struct SystemClock {
    last: AtomicI64,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            last: AtomicI64::new(i64::MIN),
        }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        let wall = Utc::now().timestamp_millis();
        let prev = self.last.fetch_max(wall, Ordering::AcqRel);
        Timestamp::from_millis(prev.max(wall))
    }
}

/// Hand-driven clock for tests and deterministic replays.
#[derive(Debug)]
pub struct ManualClock {
    millis: AtomicI64,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self {
            millis: AtomicI64::new(start.as_millis()),
        }
    }

    pub fn set(&self, to: Timestamp) {
        self.millis.store(to.as_millis(), Ordering::Release);
    }

    pub fn advance(&self, millis: i64) -> Timestamp {
        Timestamp::from_millis(self.millis.fetch_add(millis, Ordering::AcqRel) + millis)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_millis(self.millis.load(Ordering::Acquire))
    }
}
