//! Jitter metrics collection and analysis.
//!
//! Lateness is measured per tick against its grid point. Percentiles come
//! from a bounded ring of recent samples.

use std::vec::Vec;

/// Default number of recent samples kept for percentiles.
pub const DEFAULT_SAMPLE_CAPACITY: usize = 10_000;

/// Jitter metrics collection and analysis.
///
/// Tracks:
/// - Total ticks, ticks that skipped grid points, and total periods skipped
/// - Maximum, mean and last observed lateness
/// - Percentile estimation over a bounded window
///
/// `record_tick` does not allocate once the sample ring has filled.
#[derive(Debug, Clone)]
pub struct JitterMetrics {
    /// Total number of ticks recorded.
    pub total_ticks: u64,

    /// Ticks that arrived a period or more late.
    pub missed_ticks: u64,

    /// Grid points skipped across all missed ticks.
    pub skipped_periods: u64,

    /// Ticks whose lateness exceeded the budget.
    pub over_budget_ticks: u64,

    /// Maximum observed lateness in nanoseconds.
    pub max_jitter_ns: u64,

    /// Last observed lateness in nanoseconds.
    pub last_jitter_ns: u64,

    jitter_sum_ns: u128,

    /// Recent samples (ring buffer).
    recent_jitter_samples: Vec<u64>,

    max_samples: usize,

    next_sample_index: usize,

    percentile_scratch: Vec<u64>,
}

impl Default for JitterMetrics {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_SAMPLE_CAPACITY)
    }
}

impl JitterMetrics {
    /// Create a collector with the default sample capacity.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a collector keeping at most `max_samples` recent samples.
    pub fn with_capacity(max_samples: usize) -> Self {
        Self {
            total_ticks: 0,
            missed_ticks: 0,
            skipped_periods: 0,
            over_budget_ticks: 0,
            max_jitter_ns: 0,
            last_jitter_ns: 0,
            jitter_sum_ns: 0,
            recent_jitter_samples: Vec::with_capacity(max_samples),
            max_samples,
            next_sample_index: 0,
            percentile_scratch: Vec::with_capacity(max_samples),
        }
    }

    /// Record one tick.
    ///
    /// * `jitter_ns` - lateness against the grid point
    /// * `skipped` - grid points skipped by this tick
    /// * `over_budget` - lateness exceeded the budget
    pub fn record_tick(&mut self, jitter_ns: u64, skipped: u64, over_budget: bool) {
        self.total_ticks = self.total_ticks.saturating_add(1);
        if skipped > 0 {
            self.missed_ticks = self.missed_ticks.saturating_add(1);
            self.skipped_periods = self.skipped_periods.saturating_add(skipped);
        }
        if over_budget {
            self.over_budget_ticks = self.over_budget_ticks.saturating_add(1);
        }

        self.max_jitter_ns = self.max_jitter_ns.max(jitter_ns);
        self.jitter_sum_ns = self.jitter_sum_ns.saturating_add(u128::from(jitter_ns));
        self.last_jitter_ns = jitter_ns;

        if self.max_samples == 0 {
            return;
        }

        if self.recent_jitter_samples.len() < self.max_samples {
            self.recent_jitter_samples.push(jitter_ns);
        } else if let Some(slot) = self.recent_jitter_samples.get_mut(self.next_sample_index) {
            *slot = jitter_ns;
            self.next_sample_index = (self.next_sample_index + 1) % self.max_samples;
        }
    }

    /// p99 lateness in nanoseconds.
    pub fn p99_jitter_ns(&mut self) -> u64 {
        self.percentile_jitter_ns(0.99)
    }

    /// p50 (median) lateness in nanoseconds.
    pub fn p50_jitter_ns(&mut self) -> u64 {
        self.percentile_jitter_ns(0.50)
    }

    /// Lateness at `percentile` (0.0 to 1.0) over the recent samples, or 0
    /// with no samples.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        clippy::cast_sign_loss,
        reason = "index is clamped to the sample count"
    )]
    pub fn percentile_jitter_ns(&mut self, percentile: f64) -> u64 {
        if self.recent_jitter_samples.is_empty() {
            return 0;
        }
        let percentile = if percentile.is_nan() {
            0.0
        } else {
            percentile.clamp(0.0, 1.0)
        };

        self.percentile_scratch.clear();
        self.percentile_scratch
            .extend_from_slice(&self.recent_jitter_samples);

        let len = self.percentile_scratch.len();
        let index = ((len as f64 * percentile) as usize).min(len.saturating_sub(1));
        let (_, value, _) = self.percentile_scratch.select_nth_unstable(index);
        *value
    }

    /// Mean lateness over all recorded ticks in nanoseconds.
    #[allow(
        clippy::cast_precision_loss,
        reason = "statistics tolerate rounding"
    )]
    pub fn mean_jitter_ns(&self) -> f64 {
        if self.total_ticks == 0 {
            return 0.0;
        }
        self.jitter_sum_ns as f64 / self.total_ticks as f64
    }

    /// Fraction of ticks that skipped grid points (0.0 to 1.0).
    #[allow(
        clippy::cast_precision_loss,
        reason = "statistics tolerate rounding"
    )]
    pub fn missed_tick_rate(&self) -> f64 {
        if self.total_ticks == 0 {
            0.0
        } else {
            self.missed_ticks as f64 / self.total_ticks as f64
        }
    }

    /// Check p99 lateness and missed rate against limits.
    pub fn meets_requirements(&mut self, max_p99_jitter_ns: u64, max_missed_rate: f64) -> bool {
        self.p99_jitter_ns() <= max_p99_jitter_ns && self.missed_tick_rate() <= max_missed_rate
    }

    /// Number of samples currently stored.
    pub fn sample_count(&self) -> usize {
        self.recent_jitter_samples.len()
    }

    /// Reset all metrics.
    pub fn reset(&mut self) {
        self.total_ticks = 0;
        self.missed_ticks = 0;
        self.skipped_periods = 0;
        self.over_budget_ticks = 0;
        self.max_jitter_ns = 0;
        self.last_jitter_ns = 0;
        self.jitter_sum_ns = 0;
        self.recent_jitter_samples.clear();
        self.next_sample_index = 0;
        self.percentile_scratch.clear();
    }
}
