//! Power actuator boundary.
//!
//! The power path has two enable lines: the regulator enable and the
//! eFuse enable. A cut drops the regulator first and then opens the eFuse;
//! a soft restart closes the eFuse first and then enables the regulator.

use crate::error::{ActuatorError, ActuatorResult};

/// Drives the power-path enable lines.
///
/// `cut()` and `soft_restart()` are idempotent: repeating either leaves the
/// lines in the same state.
///
/// # State Machine
///
/// ```text
/// Uninitialized ──init()──► Powered ◄──soft_restart()──┐
///                              │                        │
///                            cut()                      │
///                              ▼                        │
///                           Cut ────────────────────────┘
/// ```
pub trait PowerActuator {
    /// Acquire the output lines and drive them to the powered state.
    ///
    /// # Errors
    ///
    /// Returns an error if the lines cannot be acquired. This is fatal at
    /// startup.
    fn init(&mut self) -> ActuatorResult<()>;

    /// Remove power from the protected load.
    ///
    /// # Errors
    ///
    /// Returns an error if a line could not be driven.
    fn cut(&mut self) -> ActuatorResult<()>;

    /// Restore power to the protected load.
    ///
    /// # Errors
    ///
    /// Returns an error if a line could not be driven.
    fn soft_restart(&mut self) -> ActuatorResult<()>;

    /// True when both lines are enabled.
    fn is_powered(&self) -> bool;
}

impl<A: PowerActuator + ?Sized> PowerActuator for Box<A> {
    fn init(&mut self) -> ActuatorResult<()> {
        (**self).init()
    }

    fn cut(&mut self) -> ActuatorResult<()> {
        (**self).cut()
    }

    fn soft_restart(&mut self) -> ActuatorResult<()> {
        (**self).soft_restart()
    }

    fn is_powered(&self) -> bool {
        (**self).is_powered()
    }
}

/// Logical state of the two enable lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PowerLines {
    /// Regulator enable line.
    pub regulator_enable: bool,
    /// eFuse enable line.
    pub efuse_enable: bool,
}

impl PowerLines {
    /// Both lines enabled.
    pub const POWERED: Self = Self {
        regulator_enable: true,
        efuse_enable: true,
    };

    /// Both lines disabled.
    pub const CUT: Self = Self {
        regulator_enable: false,
        efuse_enable: false,
    };
}

/// In-memory actuator for hardware-free deployments and bench testing.
///
/// Tracks the enable lines and logs every command.
#[derive(Debug, Default)]
pub struct SoftwareActuator {
    initialized: bool,
    lines: PowerLines,
    cut_count: u64,
    restart_count: u64,
}

impl SoftwareActuator {
    /// Create an uninitialized actuator with both lines low.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current line levels.
    #[must_use]
    pub fn lines(&self) -> PowerLines {
        self.lines
    }

    /// Number of `cut()` calls since construction.
    #[must_use]
    pub fn cut_count(&self) -> u64 {
        self.cut_count
    }

    /// Number of `soft_restart()` calls since construction.
    #[must_use]
    pub fn restart_count(&self) -> u64 {
        self.restart_count
    }

    fn ensure_initialized(&self) -> ActuatorResult<()> {
        if self.initialized {
            Ok(())
        } else {
            Err(ActuatorError::NotInitialized)
        }
    }
}

impl PowerActuator for SoftwareActuator {
    fn init(&mut self) -> ActuatorResult<()> {
        self.lines = PowerLines::POWERED;
        self.initialized = true;
        tracing::info!("Software power actuator initialized, load powered");
        Ok(())
    }

    fn cut(&mut self) -> ActuatorResult<()> {
        self.ensure_initialized()?;
        self.lines.regulator_enable = false;
        self.lines.efuse_enable = false;
        self.cut_count = self.cut_count.saturating_add(1);
        tracing::info!(cuts = self.cut_count, "Power cut");
        Ok(())
    }

    fn soft_restart(&mut self) -> ActuatorResult<()> {
        self.ensure_initialized()?;
        self.lines.efuse_enable = true;
        self.lines.regulator_enable = true;
        self.restart_count = self.restart_count.saturating_add(1);
        tracing::info!(restarts = self.restart_count, "Power soft restart");
        Ok(())
    }

    fn is_powered(&self) -> bool {
        self.lines == PowerLines::POWERED
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commands_require_init() {
        let mut actuator = SoftwareActuator::new();
        assert!(!actuator.is_powered());
        assert_eq!(actuator.cut(), Err(ActuatorError::NotInitialized));
        assert_eq!(actuator.soft_restart(), Err(ActuatorError::NotInitialized));
    }

    #[test]
    fn test_init_powers_both_lines() -> ActuatorResult<()> {
        let mut actuator = SoftwareActuator::new();
        actuator.init()?;
        assert!(actuator.is_powered());
        assert_eq!(actuator.lines(), PowerLines::POWERED);
        Ok(())
    }

    #[test]
    fn test_cut_and_restart_are_idempotent() -> ActuatorResult<()> {
        let mut actuator = SoftwareActuator::new();
        actuator.init()?;

        actuator.cut()?;
        actuator.cut()?;
        assert_eq!(actuator.lines(), PowerLines::CUT);
        assert!(!actuator.is_powered());

        actuator.soft_restart()?;
        actuator.soft_restart()?;
        assert_eq!(actuator.lines(), PowerLines::POWERED);

        assert_eq!(actuator.cut_count(), 2);
        assert_eq!(actuator.restart_count(), 2);
        Ok(())
    }

    #[test]
    fn test_boxed_actuator_delegates() -> ActuatorResult<()> {
        let mut actuator: Box<dyn PowerActuator> = Box::new(SoftwareActuator::new());
        actuator.init()?;
        actuator.cut()?;
        assert!(!actuator.is_powered());
        Ok(())
    }
}
