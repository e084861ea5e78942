//! Error types for telemetry buffering and feature extraction.

/// Errors raised by the ring buffer and the feature extractor.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TelemetryError {
    /// A window larger than the buffered history was requested.
    ///
    /// This is the normal "not ready" condition during buffer fill; callers
    /// skip scoring for the tick.
    #[error("insufficient data: window of {requested} samples requested, {available} buffered")]
    InsufficientData {
        /// Number of samples requested.
        requested: usize,
        /// Number of samples currently buffered.
        available: usize,
    },

    /// Invalid sampling or window configuration.
    #[error("invalid telemetry configuration: {0}")]
    InvalidConfiguration(String),
}

impl TelemetryError {
    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_configuration(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    /// Returns true when the error only means the window is not filled yet.
    #[must_use]
    pub fn is_not_ready(&self) -> bool {
        matches!(self, Self::InsufficientData { .. })
    }
}

/// A specialized `Result` type for telemetry operations.
pub type TelemetryResult<T> = core::result::Result<T, TelemetryError>;
