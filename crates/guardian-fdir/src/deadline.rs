//! Deadlines on a monotonic `Duration` timeline.

use core::time::Duration;

/// Point on the monotonic timeline after which a timer has expired.
///
/// `Duration` handles seconds/nanoseconds carry, so arming across a second
/// boundary needs no manual normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Deadline(Duration);

impl Deadline {
    /// Deadline `ms` milliseconds after `now`, saturating at `Duration::MAX`.
    #[must_use]
    pub fn after(now: Duration, ms: u32) -> Self {
        Self(now.saturating_add(Duration::from_millis(u64::from(ms))))
    }

    /// True once `now` has reached the deadline.
    #[must_use]
    pub fn is_due(&self, now: Duration) -> bool {
        now >= self.0
    }

    /// Time left until the deadline, zero once due.
    #[must_use]
    pub fn remaining(&self, now: Duration) -> Duration {
        self.0.saturating_sub(now)
    }

    /// Timeline position of the deadline.
    #[must_use]
    pub fn instant(&self) -> Duration {
        self.0
    }
}
