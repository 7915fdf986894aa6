//! Time source used for token expiry decisions.

use chrono::{DateTime, Utc};
use std::fmt::Debug;

/// Supplies the current time.
///
/// Production code uses [`SystemClock`]; tests substitute a manually advanced
/// clock so expiry can be exercised without sleeping.
pub trait Clock: Debug + Send + Sync {
    /// Current instant in UTC.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time from the operating system.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
