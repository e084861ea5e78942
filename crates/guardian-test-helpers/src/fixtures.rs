//! Hand-built isolation-forest models.
//!
//! Both fixtures standardize with mean 0 and std 1, so tree thresholds are
//! in raw feature units. Splits sit at 0.5 (Q15 16384 at scale 1.0).

use guardian_detect::{DetectResult, ModelData, NO_CHILD, average_path_length};

const SPLIT_Q15: i16 = 16384;
const MAX_SAMPLES: u32 = 256;

fn base(num_trees: usize, num_nodes: usize) -> ModelData {
    ModelData {
        num_trees,
        num_features: 5,
        num_nodes,
        features_idx: Vec::new(),
        thresholds_q15: Vec::new(),
        children_left: Vec::new(),
        children_right: Vec::new(),
        node_samples: Vec::new(),
        tree_offsets: Vec::new(),
        scaler_mean_q15: vec![0; 5],
        scaler_scale_q15: vec![32767; 5],
        scale_mean: 1.0,
        scale_scale: 1.0,
        scale_thresholds: 1.0,
        model_threshold_q15: None,
        scale_decision_th: None,
        max_samples: MAX_SAMPLES,
        c_max_samples: average_path_length(MAX_SAMPLES as f32),
    }
}

/// One tree splitting `di_dt` at 0.5 A/ms.
///
/// `di_dt <= 0.5` lands in a 255-sample leaf (score ≈ 0.47); anything
/// above is isolated in a single-sample leaf (score ≈ 0.93). No exported
/// threshold, so the fallback applies.
pub fn stump_forest() -> ModelData {
    let mut model = base(1, 3);
    model.features_idx = vec![0, -2, -2];
    model.thresholds_q15 = vec![SPLIT_Q15, 0, 0];
    model.children_left = vec![1, NO_CHILD, NO_CHILD];
    model.children_right = vec![2, NO_CHILD, NO_CHILD];
    model.node_samples = vec![256, 255, 1];
    model.tree_offsets = vec![0];
    model
}

/// Two depth-2 trees over `di_dt` and `vout_droop`, with an exported
/// decision threshold of ≈ 0.56.
///
/// Tree 0 splits `di_dt` then `vout_droop`; tree 1 the reverse. Both
/// features low: 200-sample leaves. Both high: single-sample leaves.
pub fn balanced_forest() -> ModelData {
    let mut model = base(2, 14);
    let mut features = Vec::with_capacity(14);
    let mut left = Vec::with_capacity(14);
    let mut right = Vec::with_capacity(14);
    let mut samples = Vec::with_capacity(14);

    for (offset, (outer, inner)) in [(0i32, (0i16, 1i16)), (7, (1, 0))] {
        // root, low child, high child, then four leaves
        features.extend([outer, inner, inner, -2, -2, -2, -2]);
        left.extend([offset + 1, offset + 3, offset + 5, NO_CHILD, NO_CHILD, NO_CHILD, NO_CHILD]);
        right.extend([offset + 2, offset + 4, offset + 6, NO_CHILD, NO_CHILD, NO_CHILD, NO_CHILD]);
        samples.extend([206, 202, 4, 200, 2, 3, 1]);
    }

    model.features_idx = features;
    model.thresholds_q15 = vec![SPLIT_Q15; 14];
    model.children_left = left;
    model.children_right = right;
    model.node_samples = samples;
    model.tree_offsets = vec![0, 7];
    model.model_threshold_q15 = Some(18350);
    model.scale_decision_th = Some(1.0);
    model
}

/// Serialize a fixture as the JSON model document.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn model_json(model: &ModelData) -> DetectResult<String> {
    model.to_json_pretty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use guardian_detect::IsolationForest;

    #[test]
    fn test_fixtures_validate() {
        assert!(IsolationForest::from_model(&stump_forest()).is_ok());
        assert!(IsolationForest::from_model(&balanced_forest()).is_ok());
    }

    #[test]
    fn test_json_roundtrip() -> DetectResult<()> {
        let json = model_json(&balanced_forest())?;
        assert_eq!(ModelData::from_json_str(&json)?, balanced_forest());
        Ok(())
    }
}
