//! Prelude for guardian-fdir.
//!
//! ```rust
//! use guardian_fdir::prelude::*;
//! ```

pub use crate::actuator::{PowerActuator, PowerLines, SoftwareActuator};
pub use crate::clock::{MonotonicClock, SystemClock};
pub use crate::config::{FdirConfig, RelatchThresholds};
pub use crate::deadline::Deadline;
pub use crate::error::{ActuatorError, ActuatorResult, FdirError, FdirResult};
pub use crate::machine::{FdirController, FdirInput, FdirMetrics, Transition, TransitionCause};
pub use crate::state::FdirState;
