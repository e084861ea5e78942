//! # guardian-detect
//!
//! Anomaly detection for the Eclipse Guardian power-path controller.
//!
//! This crate provides:
//! - [`ModelData`]: the JSON contract for an exported isolation forest with
//!   Q15 fixed-point constants
//! - [`IsolationForest`]: a validated, immutable node arena with bounded
//!   traversal
//! - [`AnomalyScorer`]: standardization, path-length scoring and the
//!   resolved [`DecisionThreshold`]
//! - [`GuardRails`]: hand-tuned threshold rules ORed with the model verdict
//!
//! All validation happens at load time. Scoring and rule evaluation are
//! infallible and allocation-free.
//!
//! ## Example
//!
//! ```rust
//! use guardian_detect::prelude::*;
//! use guardian_telemetry::FeatureVector;
//!
//! let rails = GuardRails::default();
//! let features = FeatureVector {
//!     di_dt: 1.2,
//!     vout_droop: 0.06,
//!     ..FeatureVector::default()
//! };
//! assert_eq!(rails.evaluate(&features), Some(RuleHit::CurrentSurgeWithDroop));
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs, missing_debug_implementations, rust_2018_idioms)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod error;
pub mod forest;
pub mod model;
pub mod prelude;
pub mod rules;
pub mod scaler;
pub mod scorer;
pub mod threshold;

pub use error::{DetectError, DetectResult};
pub use forest::{
    EULER_GAMMA, IsolationForest, MAX_TRAVERSAL_DEPTH, Node, PathLength, average_path_length,
};
pub use model::{ModelData, NO_CHILD, Q15_MAX, dequantize};
pub use rules::{GuardRailConfig, GuardRails, RuleHit};
pub use scaler::{STD_EPSILON, StandardScaler};
pub use scorer::{AnomalyScorer, ModelSummary, Score, Verdict};
pub use threshold::{DecisionThreshold, FALLBACK_THRESHOLD, ThresholdSource};
