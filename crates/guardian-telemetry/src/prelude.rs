//! Prelude for guardian-telemetry.
//!
//! ```rust
//! use guardian_telemetry::prelude::*;
//! ```

pub use crate::error::{TelemetryError, TelemetryResult};
pub use crate::features::{
    FeatureConfig, FeatureConfigBuilder, FeatureExtractor, FeatureVector, NUM_FEATURES,
};
pub use crate::ring::SampleRingBuffer;
pub use crate::sample::{Channel, RawSample};
