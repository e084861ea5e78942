//! Quantized model data contract.
//!
//! [`ModelData`] is the JSON document produced by the offline exporter. All
//! per-node arrays are indexed by global node id; `tree_offsets` gives the
//! root of each tree in that arena. Leaves are nodes whose two children are
//! both `-1`.

use std::path::Path;

use guardian_telemetry::NUM_FEATURES;
use serde::{Deserialize, Serialize};

use crate::error::{DetectError, DetectResult};

/// Largest positive Q15 value.
pub const Q15_MAX: f32 = 32767.0;

/// Child id marking "no child".
pub const NO_CHILD: i32 = -1;

/// Convert a Q15 value to a real number with the given scale.
#[must_use]
pub fn dequantize(q: i16, scale: f32) -> f32 {
    f32::from(q) / Q15_MAX * scale
}

/// Exported isolation-forest model with Q15 constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelData {
    /// Number of trees in the ensemble.
    pub num_trees: usize,
    /// Number of input features. Must equal 5.
    pub num_features: usize,
    /// Total node count across all trees.
    pub num_nodes: usize,

    /// Split feature per node. Ignored at leaves.
    pub features_idx: Vec<i16>,
    /// Split threshold per node in Q15, scaled by `scale_thresholds`.
    pub thresholds_q15: Vec<i16>,
    /// Left child id per node, `-1` at leaves.
    pub children_left: Vec<i32>,
    /// Right child id per node, `-1` at leaves.
    pub children_right: Vec<i32>,
    /// Training samples that reached each node.
    pub node_samples: Vec<i32>,
    /// Root node id of each tree.
    pub tree_offsets: Vec<i32>,

    /// Standardization means in Q15, scaled by `scale_mean`.
    pub scaler_mean_q15: Vec<i16>,
    /// Standardization deviations in Q15, scaled by `scale_scale`.
    pub scaler_scale_q15: Vec<i16>,

    /// Dequantization scale for `scaler_mean_q15`.
    pub scale_mean: f32,
    /// Dequantization scale for `scaler_scale_q15`.
    pub scale_scale: f32,
    /// Dequantization scale for `thresholds_q15`.
    pub scale_thresholds: f32,

    /// Optional exported decision threshold in Q15.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_threshold_q15: Option<i16>,
    /// Dequantization scale for `model_threshold_q15`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale_decision_th: Option<f32>,

    /// Sub-sample size used to train each tree.
    pub max_samples: u32,
    /// Normalization constant `c(max_samples)`.
    pub c_max_samples: f32,
}

impl ModelData {
    /// Parse a model from a JSON string. The result is not yet validated.
    ///
    /// # Errors
    ///
    /// Returns [`DetectError::Parse`] on malformed JSON or missing fields.
    pub fn from_json_str(json: &str) -> DetectResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a model file. The result is not yet validated.
    ///
    /// # Errors
    ///
    /// Returns [`DetectError::Io`] if the file cannot be read and
    /// [`DetectError::Parse`] if it is not a valid model document.
    pub fn from_path(path: &Path) -> DetectResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| DetectError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Serialize to pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`DetectError::Parse`] if serialization fails.
    pub fn to_json_pretty(&self) -> DetectResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check counts, array lengths, scales and the normalization constant.
    ///
    /// Topology (child bounds, leaf/split shape, cycles) is checked when the
    /// arena is built in [`crate::IsolationForest::from_model`].
    ///
    /// # Errors
    ///
    /// Returns the first inconsistency found.
    pub fn validate(&self) -> DetectResult<()> {
        if self.num_features != NUM_FEATURES {
            return Err(DetectError::FeatureCount {
                expected: NUM_FEATURES,
                found: self.num_features,
            });
        }
        if self.num_trees == 0 || self.num_nodes == 0 {
            return Err(DetectError::EmptyForest);
        }

        check_len("features_idx", self.features_idx.len(), self.num_nodes)?;
        check_len("thresholds_q15", self.thresholds_q15.len(), self.num_nodes)?;
        check_len("children_left", self.children_left.len(), self.num_nodes)?;
        check_len("children_right", self.children_right.len(), self.num_nodes)?;
        check_len("node_samples", self.node_samples.len(), self.num_nodes)?;
        check_len("tree_offsets", self.tree_offsets.len(), self.num_trees)?;
        check_len("scaler_mean_q15", self.scaler_mean_q15.len(), NUM_FEATURES)?;
        check_len("scaler_scale_q15", self.scaler_scale_q15.len(), NUM_FEATURES)?;

        check_finite("scale_mean", self.scale_mean)?;
        check_finite("scale_scale", self.scale_scale)?;
        check_finite("scale_thresholds", self.scale_thresholds)?;

        match (self.model_threshold_q15, self.scale_decision_th) {
            (Some(_), None) => return Err(DetectError::MissingDecisionScale),
            (_, Some(scale)) => check_finite("scale_decision_th", scale)?,
            (None, None) => {}
        }

        if !self.c_max_samples.is_finite() || self.c_max_samples <= 0.0 {
            return Err(DetectError::InvalidNormalization(self.c_max_samples));
        }
        Ok(())
    }

    /// Dequantized exported decision threshold, if present.
    #[must_use]
    pub fn decision_threshold(&self) -> Option<f32> {
        match (self.model_threshold_q15, self.scale_decision_th) {
            (Some(q), Some(scale)) => Some(dequantize(q, scale)),
            _ => None,
        }
    }
}

fn check_len(field: &'static str, found: usize, expected: usize) -> DetectResult<()> {
    if found == expected {
        Ok(())
    } else {
        Err(DetectError::LengthMismatch {
            field,
            expected,
            found,
        })
    }
}

fn check_finite(field: &'static str, value: f32) -> DetectResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(DetectError::NonFiniteScale { field, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn single_leaf() -> ModelData {
        ModelData {
            num_trees: 1,
            num_features: 5,
            num_nodes: 1,
            features_idx: vec![-2],
            thresholds_q15: vec![0],
            children_left: vec![NO_CHILD],
            children_right: vec![NO_CHILD],
            node_samples: vec![1],
            tree_offsets: vec![0],
            scaler_mean_q15: vec![0; 5],
            scaler_scale_q15: vec![32767; 5],
            scale_mean: 1.0,
            scale_scale: 1.0,
            scale_thresholds: 1.0,
            model_threshold_q15: None,
            scale_decision_th: None,
            max_samples: 256,
            c_max_samples: 10.244_69,
        }
    }

    #[test]
    fn test_dequantize() {
        assert_relative_eq!(dequantize(32767, 2.5), 2.5);
        assert_relative_eq!(dequantize(-32767, 0.5), -0.5);
        assert_relative_eq!(dequantize(0, 100.0), 0.0);
        assert_relative_eq!(dequantize(16384, 1.0), 0.500_015_3, epsilon = 1e-6);
    }

    #[test]
    fn test_valid_model_passes() {
        assert!(single_leaf().validate().is_ok());
    }

    #[test]
    fn test_feature_count_enforced() {
        let mut model = single_leaf();
        model.num_features = 4;
        assert!(matches!(
            model.validate(),
            Err(DetectError::FeatureCount { expected: 5, found: 4 })
        ));
    }

    #[test]
    fn test_array_length_mismatch() {
        let mut model = single_leaf();
        model.node_samples.push(3);
        assert!(matches!(
            model.validate(),
            Err(DetectError::LengthMismatch {
                field: "node_samples",
                expected: 1,
                found: 2
            })
        ));
    }

    #[test]
    fn test_empty_forest_rejected() {
        let mut model = single_leaf();
        model.num_trees = 0;
        model.tree_offsets.clear();
        assert!(matches!(model.validate(), Err(DetectError::EmptyForest)));
    }

    #[test]
    fn test_non_finite_scale_rejected() {
        let mut model = single_leaf();
        model.scale_thresholds = f32::NAN;
        assert!(matches!(
            model.validate(),
            Err(DetectError::NonFiniteScale {
                field: "scale_thresholds",
                ..
            })
        ));
    }

    #[test]
    fn test_normalization_must_be_positive() {
        let mut model = single_leaf();
        model.c_max_samples = 0.0;
        assert!(matches!(
            model.validate(),
            Err(DetectError::InvalidNormalization(_))
        ));
    }

    #[test]
    fn test_threshold_requires_scale() {
        let mut model = single_leaf();
        model.model_threshold_q15 = Some(18350);
        assert!(matches!(
            model.validate(),
            Err(DetectError::MissingDecisionScale)
        ));
        model.scale_decision_th = Some(1.0);
        assert!(model.validate().is_ok());
        let threshold = model.decision_threshold().unwrap_or_default();
        assert_relative_eq!(threshold, 18350.0 / 32767.0, epsilon = 1e-6);
    }

    #[test]
    fn test_json_roundtrip_omits_absent_threshold() -> DetectResult<()> {
        let model = single_leaf();
        let json = model.to_json_pretty()?;
        assert!(!json.contains("model_threshold_q15"));
        assert_eq!(ModelData::from_json_str(&json)?, model);
        Ok(())
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let json = r#"{"num_trees": 1, "bogus": true}"#;
        assert!(matches!(
            ModelData::from_json_str(json),
            Err(DetectError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = ModelData::from_path(Path::new("/nonexistent/guardian/model.json"));
        assert!(matches!(
            err,
            Err(DetectError::Io { ref path, .. }) if path.ends_with("model.json")
        ));
    }
}
