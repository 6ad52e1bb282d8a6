use chrono::{DateTime, FixedOffset};
use sideload_core::Clock;

/// A clock that always reports the same instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock {
    now: DateTime<FixedOffset>,
}

impl FixedClock {
    pub fn new(now: DateTime<FixedOffset>) -> Self {
        Self { now }
    }

    /// Clock fixed at an RFC3339 instant.
    ///
    /// # Panics
    ///
    /// Panics if `rfc3339` does not parse.
    pub fn at(rfc3339: &str) -> Self {
        Self::new(
            DateTime::parse_from_rfc3339(rfc3339)
                .unwrap_or_else(|e| panic!("invalid fixed clock time '{}': {}", rfc3339, e)),
        )
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.now
    }
}
