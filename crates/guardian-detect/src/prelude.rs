//! Prelude for guardian-detect.
//!
//! ```rust
//! use guardian_detect::prelude::*;
//! ```

pub use crate::error::{DetectError, DetectResult};
pub use crate::forest::{IsolationForest, average_path_length};
pub use crate::model::{ModelData, dequantize};
pub use crate::rules::{GuardRailConfig, GuardRails, RuleHit};
pub use crate::scaler::StandardScaler;
pub use crate::scorer::{AnomalyScorer, ModelSummary, Score, Verdict};
pub use crate::threshold::{DecisionThreshold, FALLBACK_THRESHOLD, ThresholdSource};
