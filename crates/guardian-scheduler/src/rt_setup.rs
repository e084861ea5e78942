//! Real-time setup configuration.

/// Default `SCHED_FIFO` priority requested for the control-loop thread.
pub const DEFAULT_RT_PRIORITY: i32 = 80;

/// Real-time parameters to request for the control-loop thread.
///
/// Failure to obtain any of them is non-fatal: the loop still runs, with
/// more jitter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RTSetup {
    /// Request real-time FIFO scheduling.
    ///
    /// On Linux this is `SCHED_FIFO` at [`RTSetup::priority`]. Usually needs
    /// `CAP_SYS_NICE`.
    pub high_priority: bool,

    /// FIFO priority used when `high_priority` is set.
    pub priority: i32,

    /// Lock all current and future pages into RAM.
    pub lock_memory: bool,
}

impl Default for RTSetup {
    fn default() -> Self {
        Self {
            high_priority: true,
            priority: DEFAULT_RT_PRIORITY,
            lock_memory: true,
        }
    }
}

impl RTSetup {
    /// Create a new RTSetup with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request nothing.
    pub fn minimal() -> Self {
        Self {
            high_priority: false,
            priority: DEFAULT_RT_PRIORITY,
            lock_memory: false,
        }
    }

    /// Set high priority.
    #[must_use]
    pub fn with_high_priority(mut self, enabled: bool) -> Self {
        self.high_priority = enabled;
        self
    }

    /// Set the FIFO priority.
    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Set memory locking.
    #[must_use]
    pub fn with_lock_memory(mut self, enabled: bool) -> Self {
        self.lock_memory = enabled;
        self
    }

    /// Check if any RT features are requested.
    pub fn has_rt_features(&self) -> bool {
        self.high_priority || self.lock_memory
    }
}

/// What the platform actually granted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RTSetupStatus {
    /// Real-time scheduling is active.
    pub priority_raised: bool,
    /// Memory is locked.
    pub memory_locked: bool,
}

impl RTSetupStatus {
    /// True when every requested feature was granted.
    pub fn satisfies(&self, setup: &RTSetup) -> bool {
        (!setup.high_priority || self.priority_raised) && (!setup.lock_memory || self.memory_locked)
    }
}
