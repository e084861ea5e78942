//! Absolute-time cadence scheduler.

use std::time::{Duration, Instant};

use crate::cadence::{Cadence, TickOutcome};
use crate::error::RTResult;
use crate::jitter::JitterMetrics;
use crate::rt_setup::{RTSetup, RTSetupStatus};

#[cfg(target_os = "linux")]
use crate::linux::PlatformSleep;

#[cfg(not(target_os = "linux"))]
use crate::fallback::PlatformSleep;

/// Fixed-cadence scheduler for the control loop.
///
/// Wake times are `origin + k × period`, where `origin` is the construction
/// (or [`CadenceScheduler::restart`]) instant. A tick whose work overruns is
/// followed by an immediate wake, and any grid points it covered are counted
/// as skipped rather than replayed.
///
/// # Example
///
/// ```no_run
/// use guardian_scheduler::CadenceScheduler;
///
/// let mut scheduler = CadenceScheduler::with_period_ms(1).expect("valid period");
/// let tick = scheduler.wait_for_tick().expect("sleep failed");
/// assert_eq!(tick.index, 1);
/// ```
#[derive(Debug)]
pub struct CadenceScheduler {
    origin: Instant,
    cadence: Cadence,
    max_jitter: Duration,
    metrics: JitterMetrics,
    rt_status: Option<RTSetupStatus>,
    platform_sleep: PlatformSleep,
}

impl CadenceScheduler {
    /// Create a scheduler with the given period, anchored now.
    ///
    /// # Errors
    ///
    /// Returns [`crate::RTError::InvalidConfig`] for a zero period.
    pub fn new(period: Duration) -> RTResult<Self> {
        Ok(Self {
            origin: Instant::now(),
            cadence: Cadence::new(period)?,
            max_jitter: Duration::from_nanos(crate::DEFAULT_MAX_JITTER_NS),
            metrics: JitterMetrics::new(),
            rt_status: None,
            platform_sleep: PlatformSleep::new(),
        })
    }

    /// Create a scheduler with a period in whole milliseconds.
    ///
    /// # Errors
    ///
    /// Returns [`crate::RTError::InvalidConfig`] for a zero period.
    pub fn with_period_ms(period_ms: u32) -> RTResult<Self> {
        Self::new(Duration::from_millis(u64::from(period_ms)))
    }

    /// Set the lateness budget above which a tick is flagged.
    #[must_use]
    pub fn with_max_jitter(mut self, max_jitter: Duration) -> Self {
        self.max_jitter = max_jitter;
        self
    }

    /// Request real-time scheduling for the calling thread.
    ///
    /// Call once from the loop thread before the first tick. Later calls
    /// return the first result. Refusals are logged and never fatal.
    pub fn apply_rt_setup(&mut self, setup: &RTSetup) -> RTSetupStatus {
        if let Some(status) = self.rt_status {
            return status;
        }

        let status = match self.platform_sleep.apply_rt_setup(setup) {
            Ok(status) => status,
            Err(err) => {
                tracing::warn!(error = %err, "Real-time setup rejected");
                RTSetupStatus::default()
            }
        };
        tracing::info!(
            priority_raised = status.priority_raised,
            memory_locked = status.memory_locked,
            "Real-time setup applied"
        );
        self.rt_status = Some(status);
        status
    }

    /// Sleep until the next grid point and account for the wake.
    ///
    /// Late wakes are logged at warn level and counted in
    /// [`CadenceScheduler::metrics`].
    ///
    /// # Errors
    ///
    /// Returns [`crate::RTError::SleepFailed`] if the platform sleep fails.
    pub fn wait_for_tick(&mut self) -> RTResult<TickOutcome> {
        let target = self.origin + self.cadence.next_wake();
        self.platform_sleep.sleep_until(target)?;

        let outcome = self.cadence.on_wake(self.elapsed(), self.max_jitter);
        let lateness_ns = u64::try_from(outcome.lateness.as_nanos()).unwrap_or(u64::MAX);
        self.metrics
            .record_tick(lateness_ns, outcome.skipped, outcome.over_budget);

        if outcome.missed() {
            tracing::warn!(
                tick = outcome.index,
                skipped = outcome.skipped,
                lateness_us = lateness_ns / 1_000,
                "Control loop missed its deadline"
            );
        } else if outcome.over_budget {
            tracing::debug!(
                tick = outcome.index,
                lateness_us = lateness_ns / 1_000,
                "Tick exceeded the jitter budget"
            );
        }

        Ok(outcome)
    }

    /// Time since the origin.
    pub fn elapsed(&self) -> Duration {
        Instant::now().saturating_duration_since(self.origin)
    }

    /// Move the origin to now and clear counters.
    pub fn restart(&mut self) {
        self.origin = Instant::now();
        self.cadence.reset();
        self.metrics.reset();
    }

    /// Scheduling period.
    #[inline]
    pub fn period(&self) -> Duration {
        self.cadence.period()
    }

    /// Lateness budget.
    #[inline]
    pub fn max_jitter(&self) -> Duration {
        self.max_jitter
    }

    /// Ticks delivered since the origin.
    #[inline]
    pub fn tick_count(&self) -> u64 {
        self.cadence.ticks()
    }

    /// Jitter metrics.
    #[inline]
    pub fn metrics(&self) -> &JitterMetrics {
        &self.metrics
    }

    /// Mutable jitter metrics for percentile calculations.
    #[inline]
    pub fn metrics_mut(&mut self) -> &mut JitterMetrics {
        &mut self.metrics
    }

    /// Result of [`CadenceScheduler::apply_rt_setup`], if it has run.
    #[inline]
    pub fn rt_status(&self) -> Option<RTSetupStatus> {
        self.rt_status
    }
}
