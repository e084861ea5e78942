//! Monotonic time source.

use core::time::Duration;
use std::time::Instant;

/// Monotonic clock reporting time elapsed since an arbitrary fixed origin.
pub trait MonotonicClock {
    /// Current position on the monotonic timeline.
    fn now(&self) -> Duration;
}

/// [`MonotonicClock`] backed by `std::time::Instant`.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Clock whose origin is the moment of construction.
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

impl<C: MonotonicClock + ?Sized> MonotonicClock for &C {
    fn now(&self) -> Duration {
        (**self).now()
    }
}
