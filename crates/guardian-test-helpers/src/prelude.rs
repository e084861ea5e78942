//! Convenience re-exports for common test utilities.
//!
//! ```rust,ignore
//! use guardian_test_helpers::prelude::*;
//! ```

pub use crate::samples::{NOMINAL_SAMPLE, SampleScript};

#[cfg(feature = "fixtures")]
pub use crate::fixtures::{balanced_forest, model_json, stump_forest};

#[cfg(feature = "mock")]
pub use crate::mock::{ActuatorAction, ManualClock, RecordingActuator};

pub type TestResult = Result<(), Box<dyn std::error::Error>>;
