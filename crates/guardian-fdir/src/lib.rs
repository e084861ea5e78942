//! # guardian-fdir
//!
//! Fault detection, isolation and recovery for the Eclipse Guardian power
//! path.
//!
//! This crate provides:
//! - [`FdirController`]: the `Normal → Hold → Verify → Normal | Safe`
//!   automaton with dwell counting and hold/verify timers
//! - [`PowerActuator`]: the power-line boundary, with [`SoftwareActuator`]
//!   for hardware-free deployments
//! - [`MonotonicClock`]: the time boundary, with [`SystemClock`]
//! - [`Deadline`]: timers on a monotonic `Duration` timeline
//!
//! ## Example
//!
//! ```rust
//! use core::time::Duration;
//! use guardian_fdir::prelude::*;
//!
//! let mut fdir = FdirController::new(FdirConfig::default()).expect("valid config");
//! let mut actuator = SoftwareActuator::new();
//! actuator.init().expect("actuator init");
//!
//! let anomaly = FdirInput { anomaly: true, ..FdirInput::default() };
//! fdir.step(Duration::from_millis(0), &anomaly, &mut actuator);
//! fdir.step(Duration::from_millis(1), &anomaly, &mut actuator);
//!
//! assert_eq!(fdir.state(), FdirState::Hold);
//! assert!(!actuator.is_powered());
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs, missing_debug_implementations, rust_2018_idioms)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod actuator;
pub mod clock;
pub mod config;
pub mod deadline;
pub mod error;
pub mod machine;
pub mod prelude;
pub mod state;

pub use actuator::{PowerActuator, PowerLines, SoftwareActuator};
pub use clock::{MonotonicClock, SystemClock};
pub use config::{FdirConfig, FdirConfigBuilder, RelatchThresholds};
pub use deadline::Deadline;
pub use error::{ActuatorError, ActuatorResult, FdirError, FdirResult};
pub use machine::{FdirContext, FdirController, FdirInput, FdirMetrics, Transition, TransitionCause};
pub use state::FdirState;
