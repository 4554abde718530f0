//! Time sources for ID generation
//!
//! The generator asks its clock for wall-clock milliseconds since the Unix
//! epoch and subtracts the layout epoch itself.

use chrono::Utc;

/// A source of wall-clock time in milliseconds since the Unix epoch.
///
/// Implementations may jump backwards (NTP steps, manual changes); the
/// generator detects that and never issues a smaller timestamp.
pub trait Clock {
    fn unix_millis(&self) -> i64;
}

/// The system wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[inline(always)]
    fn unix_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    #[inline(always)]
    fn unix_millis(&self) -> i64 {
        (**self).unix_millis()
    }
}

impl<C: Clock + ?Sized> Clock for std::sync::Arc<C> {
    #[inline(always)]
    fn unix_millis(&self) -> i64 {
        (**self).unix_millis()
    }
}
