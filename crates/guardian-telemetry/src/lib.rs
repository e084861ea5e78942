//! # guardian-telemetry
//!
//! Sample acquisition storage and windowed feature extraction for the
//! Eclipse Guardian power-path controller.
//!
//! This crate provides:
//! - [`RawSample`]: one synchronized reading of the six telemetry channels
//! - [`SampleRingBuffer`]: fixed-capacity circular store with wrap-around windows
//! - [`FeatureExtractor`]: the 5-element [`FeatureVector`] computed per window
//!
//! ## Real-Time Safety
//!
//! - **No heap allocations** after the buffer is created
//! - `push()` is O(1) and infallible
//! - `compute()` is O(baseline window) and allocation-free
//!
//! ## Example
//!
//! ```rust
//! use guardian_telemetry::prelude::*;
//!
//! let extractor = FeatureExtractor::new(FeatureConfig::default()).expect("valid config");
//! let mut buffer = extractor.new_buffer().expect("valid capacity");
//!
//! // Not enough history yet
//! assert!(extractor.compute(&buffer).is_err());
//!
//! for _ in 0..extractor.window_samples() {
//!     buffer.push(RawSample::new(8.0, 0.40, 5.0, 0.50, 40.0, 0.0));
//! }
//! let features = extractor.compute(&buffer).expect("full window");
//! assert!(features.di_dt.abs() < 1e-6);
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs, missing_debug_implementations, rust_2018_idioms)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod error;
pub mod features;
pub mod prelude;
pub mod ring;
pub mod sample;

pub use error::{TelemetryError, TelemetryResult};
pub use features::{
    FeatureConfig, FeatureConfigBuilder, FeatureExtractor, FeatureVector, NUM_FEATURES,
    TEMPERATURE_EPSILON_C,
};
pub use ring::SampleRingBuffer;
pub use sample::{Channel, EFFICIENCY_CEILING, POWER_EPSILON_W, RawSample};
