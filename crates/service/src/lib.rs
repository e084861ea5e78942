//! Eclipse Guardian service.
//!
//! Wires the telemetry, detection, FDIR and scheduler crates into the
//! 1 ms power-path monitoring loop, and provides the configuration and
//! sample-source boundaries used by the `eclipse-guardian` binary.
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! use eclipse_guardian_service::prelude::*;
//! use guardian_detect::AnomalyScorer;
//! use guardian_fdir::{PowerActuator, SoftwareActuator, SystemClock};
//! use guardian_scheduler::CadenceScheduler;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = GuardianConfig::load(Path::new("eclipse-guardian.yaml"))?;
//! let mut actuator = SoftwareActuator::new();
//! actuator.init()?;
//! let scorer = AnomalyScorer::load(config.model_path()?, config.detection.fallback_threshold)?;
//! let source = NominalSource::new(config.sampling.use_ripple);
//!
//! let mut controller = GuardianController::new(&config, scorer, source, actuator)?;
//! let mut scheduler = CadenceScheduler::new(config.hop())?;
//! let summary = run_loop(&mut controller, &mut scheduler, &SystemClock::new(), Some(1000))?;
//! println!("{} ticks, final state {}", summary.ticks, summary.final_state);
//! # Ok(())
//! # }
//! ```

#![deny(static_mut_refs)]
#![deny(unused_must_use)]
#![deny(clippy::unwrap_used)]

pub mod config;
pub mod controller;
pub mod error;
pub mod prelude;
pub mod source;

pub use config::{
    DEFAULT_CONFIG_FILE, DetectionConfig, FdirSettings, GuardianConfig, RuntimeConfig,
    SamplingConfig,
};
pub use controller::{GuardianController, RunSummary, TickReport, run_loop};
pub use error::{ServiceError, ServiceResult};
pub use source::{NOMINAL_RIPPLE_V, NominalSource, ReplaySource, SampleSource};
