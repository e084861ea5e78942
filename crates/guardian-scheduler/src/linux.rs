//! Linux platform implementation.

#![allow(unsafe_code, reason = "libc calls for FIFO scheduling, page locking and sleeping")]

use core::time::Duration;
use std::io;
use std::time::Instant;

use libc::{
    CLOCK_MONOTONIC, EINTR, MCL_CURRENT, MCL_FUTURE, SCHED_FIFO, clock_nanosleep, mlockall,
    sched_get_priority_max, sched_get_priority_min, sched_param, sched_setscheduler, timespec,
};

use crate::error::{RTError, RTResult};
use crate::rt_setup::{RTSetup, RTSetupStatus};

/// Busy-spin tail before each wake.
const SPIN_TAIL: Duration = Duration::from_micros(80);

/// Linux sleep and RT setup.
#[derive(Debug, Default)]
pub struct PlatformSleep;

impl PlatformSleep {
    pub fn new() -> Self {
        Self
    }

    /// Request FIFO scheduling and page locking for the calling thread.
    ///
    /// Refusals are logged and reported in the status; an out-of-range
    /// priority is a configuration error.
    pub fn apply_rt_setup(&mut self, setup: &RTSetup) -> RTResult<RTSetupStatus> {
        let mut status = RTSetupStatus::default();

        if setup.high_priority {
            // SAFETY: plain query of the FIFO priority range.
            let min = unsafe { sched_get_priority_min(SCHED_FIFO) };
            // SAFETY: plain query of the FIFO priority range.
            let max = unsafe { sched_get_priority_max(SCHED_FIFO) };
            if setup.priority < min || setup.priority > max {
                return Err(RTError::invalid_config(format!(
                    "FIFO priority {} outside {min}..={max}",
                    setup.priority
                )));
            }

            let param = sched_param {
                sched_priority: setup.priority,
            };
            // SAFETY: `param` is a valid sched_param that outlives the call;
            // pid 0 targets the calling thread.
            let rc = unsafe { sched_setscheduler(0, SCHED_FIFO, &param) };
            if rc == 0 {
                status.priority_raised = true;
            } else {
                tracing::warn!(
                    priority = setup.priority,
                    error = %io::Error::last_os_error(),
                    "SCHED_FIFO not granted, continuing with default scheduling"
                );
            }
        }

        if setup.lock_memory {
            // SAFETY: mlockall takes only flags and touches no Rust memory.
            let rc = unsafe { mlockall(MCL_CURRENT | MCL_FUTURE) };
            if rc == 0 {
                status.memory_locked = true;
            } else {
                tracing::warn!(
                    error = %io::Error::last_os_error(),
                    "mlockall failed, pages may be swapped"
                );
            }
        }

        Ok(status)
    }

    /// Sleep until `target`.
    ///
    /// `clock_nanosleep` covers all but the last [`SPIN_TAIL`], which is
    /// busy-waited. Interrupted sleeps resume.
    pub fn sleep_until(&mut self, target: Instant) -> RTResult {
        loop {
            let now = Instant::now();
            if target <= now {
                return Ok(());
            }
            let remaining = target.duration_since(now);
            if remaining <= SPIN_TAIL {
                break;
            }

            let bulk = remaining.saturating_sub(SPIN_TAIL);
            let ts = timespec {
                tv_sec: libc::time_t::try_from(bulk.as_secs()).unwrap_or(libc::time_t::MAX),
                tv_nsec: libc::c_long::from(
                    i32::try_from(bulk.subsec_nanos()).unwrap_or(999_999_999),
                ),
            };
            // SAFETY: `ts` is a valid relative timespec and the remainder
            // pointer may be null.
            let rc = unsafe { clock_nanosleep(CLOCK_MONOTONIC, 0, &ts, core::ptr::null_mut()) };
            match rc {
                0 => break,
                EINTR => continue,
                code => return Err(RTError::SleepFailed(code)),
            }
        }

        while Instant::now() < target {
            std::hint::spin_loop();
        }
        Ok(())
    }
}
