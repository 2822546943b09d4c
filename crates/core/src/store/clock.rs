//! Time source for record timestamps

use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};

/// Source of "now" for the store
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Deterministic clock that advances by a fixed step on every reading
///
/// Gives strictly increasing timestamps without sleeping.
#[derive(Debug)]
pub struct SteppingClock {
    next: Mutex<DateTime<Utc>>,
    step: Duration,
}

impl SteppingClock {
    pub fn new(start: DateTime<Utc>, step: Duration) -> Self {
        Self {
            next: Mutex::new(start),
            step,
        }
    }

    /// Start at 2024-01-01T00:00:00Z and advance one second per reading
    pub fn from_epoch_2024() -> Self {
        let start = DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z")
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now());
        Self::new(start, Duration::seconds(1))
    }
}

impl Clock for SteppingClock {
    fn now(&self) -> DateTime<Utc> {
        let mut next = match self.next.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let current = *next;
        *next = current + self.step;
        current
    }
}
