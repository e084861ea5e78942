//! Prelude module for common scheduler types.

pub use crate::cadence::{Cadence, TickOutcome};
pub use crate::error::{RTError, RTResult};
pub use crate::jitter::JitterMetrics;
pub use crate::rt_setup::{RTSetup, RTSetupStatus};
pub use crate::scheduler::CadenceScheduler;
pub use crate::{DEFAULT_MAX_JITTER_NS, DEFAULT_PERIOD_NS};
