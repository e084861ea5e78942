//! Error types for the FDIR controller and power actuators.

/// Errors raised by a [`crate::PowerActuator`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActuatorError {
    /// The actuator could not acquire or configure its outputs.
    #[error("actuator initialization failed: {0}")]
    InitFailed(String),

    /// A command was issued before a successful `init()`.
    #[error("actuator is not initialized")]
    NotInitialized,

    /// Driving a power line failed.
    #[error("power line `{line}` command failed: {reason}")]
    LineFault {
        /// Line that failed.
        line: &'static str,
        /// Failure description.
        reason: String,
    },
}

impl ActuatorError {
    /// Create an initialization error.
    #[must_use]
    pub fn init_failed(msg: impl Into<String>) -> Self {
        Self::InitFailed(msg.into())
    }

    /// Create a line fault error.
    #[must_use]
    pub fn line_fault(line: &'static str, reason: impl Into<String>) -> Self {
        Self::LineFault {
            line,
            reason: reason.into(),
        }
    }
}

/// Errors raised while configuring the FDIR controller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FdirError {
    /// Invalid dwell, timer or relatch configuration.
    #[error("invalid FDIR configuration: {0}")]
    InvalidConfiguration(String),

    /// Actuator failure surfaced to the caller.
    #[error(transparent)]
    Actuator(#[from] ActuatorError),
}

impl FdirError {
    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_configuration(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }
}

/// A specialized `Result` type for actuator operations.
pub type ActuatorResult<T> = core::result::Result<T, ActuatorError>;

/// A specialized `Result` type for FDIR configuration.
pub type FdirResult<T> = core::result::Result<T, FdirError>;
