//! Absolute-time cadence scheduling with jitter tracking for the Eclipse
//! Guardian control loop.
//!
//! This crate provides:
//!
//! - **CadenceScheduler**: wake times on a fixed grid anchored at start-up,
//!   so late ticks never accumulate drift
//! - **Cadence**: the pure grid arithmetic, usable without sleeping
//! - **JitterMetrics**: lateness statistics with percentile estimation and
//!   missed-tick counting
//! - **RTSetup**: real-time priority and memory locking requested once at
//!   start-up
//!
//! A late tick is never an error. It is reported in [`TickOutcome`], counted
//! in [`JitterMetrics`] and logged.
//!
//! # Example
//!
//! ```no_run
//! use guardian_scheduler::{CadenceScheduler, RTSetup};
//!
//! let mut scheduler = CadenceScheduler::with_period_ms(1).expect("valid period");
//! let status = scheduler.apply_rt_setup(&RTSetup::default());
//! println!("priority raised: {}", status.priority_raised);
//!
//! for _ in 0..1000 {
//!     let tick = scheduler.wait_for_tick().expect("sleep failed");
//!     // Control-loop work here
//!     let _ = tick.index;
//! }
//! ```

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]
#![deny(static_mut_refs)]
#![deny(unused_must_use)]

pub mod cadence;
pub mod error;
pub mod jitter;
pub mod rt_setup;
pub mod scheduler;

#[cfg(target_os = "linux")]
mod linux;

#[cfg(not(target_os = "linux"))]
mod fallback;

pub mod prelude;

pub use cadence::{Cadence, TickOutcome};
pub use error::{RTError, RTResult};
pub use jitter::JitterMetrics;
pub use rt_setup::{DEFAULT_RT_PRIORITY, RTSetup, RTSetupStatus};
pub use scheduler::CadenceScheduler;

/// Default control-loop period in nanoseconds (1 ms).
pub const DEFAULT_PERIOD_NS: u64 = 1_000_000;

/// Default lateness budget in nanoseconds (0.25 ms).
pub const DEFAULT_MAX_JITTER_NS: u64 = 250_000;
