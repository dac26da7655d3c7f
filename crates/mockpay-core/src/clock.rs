//! # Clock
//!
//! Time source seam. Session expiry is a pure function of "now", so the
//! gateway takes its clock as a dependency; production wires in
//! [`SystemClock`], tests drive a [`ManualClock`] past the TTL.

use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};

/// Time source for the session lifecycle
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Type alias for a shared clock (dynamic dispatch)
pub type SharedClock = Arc<dyn Clock>;

/// Wall-clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Settable clock for tests
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    /// Move the clock forward
    pub fn advance(&self, by: chrono::Duration) {
        let mut now = self.now.lock().expect("clock lock poisoned");
        *now = *now + by;
    }

    pub fn set(&self, to: DateTime<Utc>) {
        *self.now.lock().expect("clock lock poisoned") = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().expect("clock lock poisoned")
    }
}
