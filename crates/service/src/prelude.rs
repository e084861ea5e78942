//! Prelude for the service crate.

pub use crate::config::GuardianConfig;
pub use crate::controller::{GuardianController, RunSummary, TickReport, run_loop};
pub use crate::error::{ServiceError, ServiceResult};
pub use crate::source::{NominalSource, ReplaySource, SampleSource};
