// Time Provider Port (for testability)

use chrono::{DateTime, Utc};

/// Clock interface (allows fixed instants in tests)
pub trait TimeProvider: Send + Sync {
    /// Current time in milliseconds since epoch
    fn now_millis(&self) -> i64;

    /// Current time as a UTC instant; `None` if the clock is out of chrono's range
    fn now_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.now_millis())
    }
}

/// Wall clock (production)
pub struct SystemTimeProvider;

impl TimeProvider for SystemTimeProvider {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }

    fn now_utc(&self) -> Option<DateTime<Utc>> {
        Some(Utc::now())
    }
}
