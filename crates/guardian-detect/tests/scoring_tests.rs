//! End-to-end scoring against the shared model fixtures.

#![cfg(test)]

use approx::assert_relative_eq;
use guardian_detect::prelude::*;
use guardian_telemetry::FeatureVector;
use guardian_test_helpers::fixtures::{balanced_forest, model_json, stump_forest};

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn surge(di_dt: f32, vout_droop: f32) -> FeatureVector {
    FeatureVector {
        di_dt,
        vout_droop,
        efficiency: 0.78,
        ..FeatureVector::default()
    }
}

#[test]
fn test_stump_separates_nominal_from_surge() -> TestResult {
    let scorer = AnomalyScorer::from_model(&stump_forest(), FALLBACK_THRESHOLD)?;

    let nominal = scorer.classify(&surge(0.0, 0.0));
    let anomalous = scorer.classify(&surge(2.0, 0.0));

    // Long path through the 255-sample leaf vs. an isolated single sample.
    let c_max = average_path_length(256.0);
    assert_relative_eq!(
        nominal.score.mean_path_length,
        1.0 + average_path_length(255.0),
        epsilon = 1e-4
    );
    assert_relative_eq!(
        nominal.score.value,
        2.0f32.powf(-(1.0 + average_path_length(255.0)) / c_max),
        epsilon = 1e-5
    );
    assert_relative_eq!(anomalous.score.value, 2.0f32.powf(-1.0 / c_max), epsilon = 1e-5);

    assert!(!nominal.model_hit);
    assert!(anomalous.model_hit);
    assert!(anomalous.score.value > nominal.score.value);
    assert_eq!(nominal.score.truncated_trees, 0);
    Ok(())
}

#[test]
fn test_threshold_falls_back_when_model_has_none() -> TestResult {
    let scorer = AnomalyScorer::from_model(&stump_forest(), 0.7)?;
    let threshold = scorer.threshold();
    assert_eq!(threshold.source(), ThresholdSource::Fallback);
    assert_relative_eq!(threshold.value(), 0.7);
    Ok(())
}

#[test]
fn test_threshold_prefers_model_value() -> TestResult {
    let scorer = AnomalyScorer::from_model(&balanced_forest(), 0.9)?;
    let threshold = scorer.threshold();
    assert_eq!(threshold.source(), ThresholdSource::Model);
    assert_relative_eq!(threshold.value(), 18350.0 / 32767.0, epsilon = 1e-6);
    Ok(())
}

#[test]
fn test_non_finite_fallback_rejected() {
    let result = AnomalyScorer::from_model(&stump_forest(), f32::NAN);
    assert!(matches!(result, Err(DetectError::InvalidThreshold(_))));
}

#[test]
fn test_balanced_forest_scores_by_isolation_depth() -> TestResult {
    let scorer = AnomalyScorer::from_model(&balanced_forest(), FALLBACK_THRESHOLD)?;
    assert_eq!(scorer.forest().num_trees(), 2);

    let nominal = scorer.score(&surge(0.0, 0.0));
    let partial = scorer.score(&surge(2.0, 0.0));
    let severe = scorer.score(&surge(2.0, 2.0));

    assert!(nominal.value < partial.value);
    assert!(partial.value < severe.value);
    assert!(severe.value <= 1.0);
    assert!(nominal.value > 0.0);
    assert_relative_eq!(severe.mean_path_length, 2.0, epsilon = 1e-6);
    Ok(())
}

#[test]
fn test_summary_reports_model_shape() -> TestResult {
    let scorer = AnomalyScorer::from_model(&balanced_forest(), FALLBACK_THRESHOLD)?;
    let summary = scorer.summary();
    assert_eq!(summary.num_trees, 2);
    assert_eq!(summary.num_nodes, 14);
    assert_eq!(summary.max_samples, 256);
    assert_eq!(summary.threshold_source, ThresholdSource::Model);
    assert_relative_eq!(summary.normalization, average_path_length(256.0), epsilon = 1e-4);
    Ok(())
}

#[test]
fn test_load_from_json_file() -> TestResult {
    let dir = std::env::temp_dir().join(format!("guardian-detect-{}", std::process::id()));
    std::fs::create_dir_all(&dir)?;
    let path = dir.join("stump.json");
    std::fs::write(&path, model_json(&stump_forest())?)?;

    let scorer = AnomalyScorer::load(&path, FALLBACK_THRESHOLD)?;
    assert_eq!(scorer.forest().num_nodes(), 3);

    std::fs::remove_dir_all(&dir)?;
    Ok(())
}

#[test]
fn test_standardization_applied_before_traversal() -> TestResult {
    let mut model = stump_forest();
    // Mean of di_dt shifted to 1.0: raw 1.2 now standardizes to 0.2, below the split.
    if let Some(mean) = model.scaler_mean_q15.first_mut() {
        *mean = 32767;
    }
    let scorer = AnomalyScorer::from_model(&model, FALLBACK_THRESHOLD)?;
    assert_relative_eq!(scorer.scaler().mean()[0], 1.0);
    assert!(!scorer.classify(&surge(1.2, 0.0)).model_hit);
    assert!(scorer.classify(&surge(1.6, 0.0)).model_hit);
    Ok(())
}

#[test]
fn test_malformed_scaler_rejected_on_load() {
    let mut model = stump_forest();
    model.scaler_scale_q15.pop();
    assert!(matches!(
        AnomalyScorer::from_model(&model, FALLBACK_THRESHOLD),
        Err(DetectError::LengthMismatch {
            field: "scaler_scale_q15",
            expected: 5,
            found: 4,
        })
    ));
}
