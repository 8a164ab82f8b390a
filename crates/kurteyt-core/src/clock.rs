use jiff::Timestamp;
use std::sync::{Arc, Mutex};

pub trait Clock: Send + Sync + 'static {
    /// Returns the current time of the clock
    fn now(&self) -> Timestamp;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// A clock pinned to a settable instant.
///
/// Record construction is deterministic under this clock, which is what the
/// service tests rely on.
#[derive(Debug, Clone)]
pub struct FixedClock {
    inner: Arc<Mutex<Timestamp>>,
}

impl FixedClock {
    pub fn new(now: Timestamp) -> Self {
        Self {
            inner: Arc::new(Mutex::new(now)),
        }
    }

    /// Moves the clock to `target`.
    pub fn set(&self, target: Timestamp) {
        let mut now = self
            .inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *now = target;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        *self
            .inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
