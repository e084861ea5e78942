//! Service error types.

use std::path::PathBuf;

use guardian_detect::DetectError;
use guardian_fdir::{ActuatorError, FdirError};
use guardian_scheduler::RTError;
use guardian_telemetry::TelemetryError;
use thiserror::Error;

/// Errors raised while configuring or running the monitor.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// A file could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid YAML for [`crate::GuardianConfig`].
    #[error("Failed to parse config {}: {source}", path.display())]
    ConfigParse {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: serde_yaml::Error,
    },

    /// A configuration value is out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Neither `--model` nor `model_path` named a model file.
    #[error("No model file: pass --model or set model_path in the config")]
    MissingModel,

    /// Command-line input could not be used.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// YAML configuration could not be parsed or serialized.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Feature extraction setup failed.
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),

    /// Model loading or rule setup failed.
    #[error(transparent)]
    Detect(#[from] DetectError),

    /// FDIR setup failed.
    #[error(transparent)]
    Fdir(#[from] FdirError),

    /// The power actuator failed.
    #[error(transparent)]
    Actuator(#[from] ActuatorError),

    /// The scheduler failed.
    #[error(transparent)]
    Scheduler(#[from] RTError),
}

impl ServiceError {
    /// Create an invalid-configuration error.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create an invalid-input error.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::ConfigParse { .. }
            | Self::InvalidConfig(_)
            | Self::InvalidInput(_)
            | Self::Telemetry(_)
            | Self::Fdir(_) => 2,
            Self::MissingModel | Self::Detect(_) => 3,
            Self::Actuator(_) => 4,
            Self::Io { .. } | Self::Yaml(_) | Self::Scheduler(_) => 1,
        }
    }
}

/// Service result type.
pub type ServiceResult<T> = Result<T, ServiceError>;
