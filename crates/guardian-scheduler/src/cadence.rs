//! Wake-time grid arithmetic.
//!
//! Ticks are scheduled at `origin + k × period`. A late wake is measured
//! against its grid point and the next wake is the first grid point strictly
//! after the current time, so lateness never shifts the grid.

use core::time::Duration;

use crate::error::{RTError, RTResult};

/// Result of one scheduled wake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickOutcome {
    /// 1-based count of ticks delivered.
    pub index: u64,
    /// Grid point this tick was scheduled for.
    pub scheduled: Duration,
    /// How far past `scheduled` the wake happened.
    pub lateness: Duration,
    /// Whole periods skipped because the wake was a period or more late.
    pub skipped: u64,
    /// Lateness exceeded the configured budget.
    pub over_budget: bool,
}

impl TickOutcome {
    /// True when at least one grid point was skipped.
    pub fn missed(&self) -> bool {
        self.skipped > 0
    }
}

/// Fixed-period grid on a `Duration` timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cadence {
    period_ns: u64,
    next_ns: u64,
    ticks: u64,
}

impl Cadence {
    /// Grid with the given period; the first tick is due one period after
    /// the origin.
    ///
    /// # Errors
    ///
    /// Returns [`RTError::InvalidConfig`] if `period` is zero or does not fit
    /// in 64-bit nanoseconds.
    pub fn new(period: Duration) -> RTResult<Self> {
        let period_ns = u64::try_from(period.as_nanos())
            .map_err(|err| RTError::invalid_config(format!("period out of range: {err}")))?;
        if period_ns == 0 {
            return Err(RTError::invalid_config("period must be non-zero"));
        }
        Ok(Self {
            period_ns,
            next_ns: period_ns,
            ticks: 0,
        })
    }

    /// Grid period.
    pub fn period(&self) -> Duration {
        Duration::from_nanos(self.period_ns)
    }

    /// Next grid point to wake at.
    pub fn next_wake(&self) -> Duration {
        Duration::from_nanos(self.next_ns)
    }

    /// Ticks delivered so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Account for a wake at `now` and advance to the next grid point.
    ///
    /// A wake before the scheduled point is treated as on time.
    pub fn on_wake(&mut self, now: Duration, max_jitter: Duration) -> TickOutcome {
        let now_ns = u64::try_from(now.as_nanos()).unwrap_or(u64::MAX);
        let scheduled_ns = self.next_ns;
        let lateness_ns = now_ns.saturating_sub(scheduled_ns);
        let skipped = lateness_ns / self.period_ns;

        let advance = self.period_ns.saturating_mul(skipped.saturating_add(1));
        self.next_ns = scheduled_ns.saturating_add(advance);
        self.ticks = self.ticks.saturating_add(1);

        let lateness = Duration::from_nanos(lateness_ns);
        TickOutcome {
            index: self.ticks,
            scheduled: Duration::from_nanos(scheduled_ns),
            lateness,
            skipped,
            over_budget: lateness > max_jitter,
        }
    }

    /// Restart the grid at the origin.
    pub fn reset(&mut self) {
        self.next_ns = self.period_ns;
        self.ticks = 0;
    }
}
