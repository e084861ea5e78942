//! Decision threshold resolution.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{DetectError, DetectResult};
use crate::model::ModelData;

/// Threshold used when the model does not export one.
pub const FALLBACK_THRESHOLD: f32 = 0.56;

/// Where the active threshold came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdSource {
    /// Dequantized from the model's `model_threshold_q15`.
    Model,
    /// Configured fallback value.
    Fallback,
}

impl fmt::Display for ThresholdSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThresholdSource::Model => f.write_str("model"),
            ThresholdSource::Fallback => f.write_str("fallback"),
        }
    }
}

/// Score threshold resolved once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecisionThreshold {
    value: f32,
    source: ThresholdSource,
}

impl DecisionThreshold {
    /// Prefer the model's exported threshold, else `fallback`.
    ///
    /// # Errors
    ///
    /// Returns [`DetectError::InvalidThreshold`] if the chosen value is not
    /// finite.
    pub fn resolve(data: &ModelData, fallback: f32) -> DetectResult<Self> {
        let (value, source) = match data.decision_threshold() {
            Some(value) => (value, ThresholdSource::Model),
            None => (fallback, ThresholdSource::Fallback),
        };
        if !value.is_finite() {
            return Err(DetectError::InvalidThreshold(value));
        }
        Ok(Self { value, source })
    }

    /// Threshold value.
    #[must_use]
    pub fn value(&self) -> f32 {
        self.value
    }

    /// Threshold provenance.
    #[must_use]
    pub fn source(&self) -> ThresholdSource {
        self.source
    }

    /// True when `score` is strictly above the threshold.
    #[must_use]
    pub fn is_exceeded_by(&self, score: f32) -> bool {
        score > self.value
    }
}
