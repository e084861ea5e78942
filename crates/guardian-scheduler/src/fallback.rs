//! Fallback platform implementation for non-Linux systems.

use std::time::Instant;

use crate::error::RTResult;
use crate::rt_setup::{RTSetup, RTSetupStatus};

/// Sleep using the standard library; no RT features.
#[derive(Debug, Default)]
pub struct PlatformSleep;

impl PlatformSleep {
    pub fn new() -> Self {
        Self
    }

    pub fn apply_rt_setup(&mut self, setup: &RTSetup) -> RTResult<RTSetupStatus> {
        if setup.has_rt_features() {
            tracing::warn!("Real-time setup is not supported on this platform");
        }
        Ok(RTSetupStatus::default())
    }

    pub fn sleep_until(&mut self, target: Instant) -> RTResult {
        let now = Instant::now();
        if target > now {
            std::thread::sleep(target.duration_since(now));
        }
        Ok(())
    }
}
