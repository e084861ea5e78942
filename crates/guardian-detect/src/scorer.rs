//! Anomaly scoring over the quantized forest.

use std::path::Path;

use guardian_telemetry::{FeatureVector, NUM_FEATURES};
use serde::Serialize;

use crate::error::DetectResult;
use crate::forest::IsolationForest;
use crate::model::ModelData;
use crate::scaler::StandardScaler;
use crate::threshold::{DecisionThreshold, ThresholdSource};

/// Anomaly score for one feature vector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Score {
    /// `2^(−E[h]/c_max)` in `(0, 1]`; higher is more anomalous.
    pub value: f32,
    /// Mean corrected path length `E[h]`.
    pub mean_path_length: f32,
    /// Trees whose walk hit the depth cap.
    pub truncated_trees: usize,
}

/// Model classification of one feature vector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Verdict {
    /// The score.
    pub score: Score,
    /// `score.value > threshold`.
    pub model_hit: bool,
}

/// Summary of a loaded model for diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelSummary {
    /// Number of trees.
    pub num_trees: usize,
    /// Number of nodes across all trees.
    pub num_nodes: usize,
    /// Training sub-sample size.
    pub max_samples: u32,
    /// Normalization constant `c(max_samples)`.
    pub normalization: f32,
    /// Active decision threshold.
    pub threshold: f32,
    /// Provenance of the decision threshold.
    pub threshold_source: ThresholdSource,
}

/// Scaler, forest and threshold bundled for per-tick scoring.
///
/// Immutable after construction; scoring never allocates.
#[derive(Debug, Clone)]
pub struct AnomalyScorer {
    scaler: StandardScaler,
    forest: IsolationForest,
    threshold: DecisionThreshold,
    max_samples: u32,
}

impl AnomalyScorer {
    /// Validate `data` and build a scorer.
    ///
    /// # Errors
    ///
    /// Returns a [`crate::DetectError`] if the model is malformed or the
    /// resolved threshold is not finite.
    #[allow(
        clippy::cast_precision_loss,
        reason = "training sub-sample sizes are far below f32 integer precision"
    )]
    pub fn from_model(data: &ModelData, fallback_threshold: f32) -> DetectResult<Self> {
        // Forest construction validates the whole model once.
        let forest = IsolationForest::from_model(data)?;
        let scaler = StandardScaler::from_model(data);
        let threshold = DecisionThreshold::resolve(data, fallback_threshold)?;

        let expected_c = crate::forest::average_path_length(data.max_samples as f32);
        if (expected_c - data.c_max_samples).abs() > 1e-3 * expected_c.max(1.0) {
            tracing::warn!(
                max_samples = data.max_samples,
                c_max_samples = data.c_max_samples,
                expected = expected_c,
                "Normalization constant differs from c(max_samples)"
            );
        }

        tracing::info!(
            trees = forest.num_trees(),
            nodes = forest.num_nodes(),
            threshold = threshold.value(),
            source = %threshold.source(),
            "Anomaly model loaded"
        );

        Ok(Self {
            scaler,
            forest,
            threshold,
            max_samples: data.max_samples,
        })
    }

    /// Read, validate and build a scorer from a JSON model file.
    ///
    /// # Errors
    ///
    /// Returns a [`crate::DetectError`] if the file cannot be read, parsed
    /// or validated.
    pub fn load(path: &Path, fallback_threshold: f32) -> DetectResult<Self> {
        let data = ModelData::from_path(path)?;
        Self::from_model(&data, fallback_threshold)
    }

    /// Score a feature vector.
    #[must_use]
    pub fn score(&self, features: &FeatureVector) -> Score {
        self.score_array(&features.to_array())
    }

    /// Score a raw feature array in model order.
    #[must_use]
    pub fn score_array(&self, x: &[f32; NUM_FEATURES]) -> Score {
        let z = self.scaler.transform(x);
        let (mean_path_length, truncated_trees) = self.forest.mean_path_length(&z);
        let value = 2.0f32
            .powf(-mean_path_length / self.forest.normalization())
            .max(f32::MIN_POSITIVE);
        Score {
            value,
            mean_path_length,
            truncated_trees,
        }
    }

    /// Score and compare against the decision threshold.
    ///
    /// Truncated traversals are logged at warn level.
    #[must_use]
    pub fn classify(&self, features: &FeatureVector) -> Verdict {
        let score = self.score(features);
        if score.truncated_trees > 0 {
            tracing::warn!(
                truncated_trees = score.truncated_trees,
                score = score.value,
                "Tree traversal hit the depth cap"
            );
        }
        Verdict {
            score,
            model_hit: self.threshold.is_exceeded_by(score.value),
        }
    }

    /// Active decision threshold.
    #[must_use]
    pub fn threshold(&self) -> DecisionThreshold {
        self.threshold
    }

    /// Loaded forest.
    #[must_use]
    pub fn forest(&self) -> &IsolationForest {
        &self.forest
    }

    /// Loaded scaler.
    #[must_use]
    pub fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }

    /// Diagnostic summary of the loaded model.
    #[must_use]
    pub fn summary(&self) -> ModelSummary {
        ModelSummary {
            num_trees: self.forest.num_trees(),
            num_nodes: self.forest.num_nodes(),
            max_samples: self.max_samples,
            normalization: self.forest.normalization(),
            threshold: self.threshold.value(),
            threshold_source: self.threshold.source(),
        }
    }
}
