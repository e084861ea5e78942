//! Error types for the scheduler crate.

use thiserror::Error;

/// Scheduler errors.
///
/// Lateness is not an error; see [`crate::TickOutcome`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RTError {
    /// Invalid configuration parameter.
    #[error("Invalid scheduler configuration: {0}")]
    InvalidConfig(String),

    /// The platform sleep call failed with the given error code.
    #[error("Platform sleep failed with code {0}")]
    SleepFailed(i32),
}

impl RTError {
    /// Create an invalid-configuration error.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}

/// Scheduler result type.
pub type RTResult<T = ()> = Result<T, RTError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        insta::assert_snapshot!(
            RTError::invalid_config("period must be non-zero").to_string(),
            @"Invalid scheduler configuration: period must be non-zero"
        );
        insta::assert_snapshot!(
            RTError::SleepFailed(22).to_string(),
            @"Platform sleep failed with code 22"
        );
    }
}
