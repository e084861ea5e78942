//! Property-based tests for path-length normalization and score bounds.

#![cfg(test)]

use guardian_detect::prelude::*;
use guardian_telemetry::FeatureVector;
use guardian_test_helpers::fixtures::balanced_forest;
use proptest::prelude::*;

fn scorer() -> Result<AnomalyScorer, TestCaseError> {
    AnomalyScorer::from_model(&balanced_forest(), FALLBACK_THRESHOLD)
        .map_err(|e| TestCaseError::fail(e.to_string()))
}

fn feature_vector() -> impl Strategy<Value = FeatureVector> {
    prop::array::uniform5(-1.0e6f32..1.0e6).prop_map(FeatureVector::from_array)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_c_is_zero_at_or_below_one(n in -1.0e3f32..=1.0) {
        prop_assert!(average_path_length(n).abs() < f32::EPSILON);
    }

    #[test]
    fn prop_c_strictly_increasing_above_one(n in 2.0f32..10_000.0, delta in 1.0f32..100.0) {
        prop_assert!(average_path_length(n + delta) > average_path_length(n));
    }

    #[test]
    fn prop_c_continuous_above_one(n in 2.0f32..10_000.0) {
        let step = n * 1e-4;
        let jump = (average_path_length(n + step) - average_path_length(n)).abs();
        prop_assert!(jump < 1e-2);
    }

    #[test]
    fn prop_score_in_unit_interval(features in feature_vector()) {
        let scorer = scorer()?;
        let score = scorer.score(&features);
        prop_assert!(score.value > 0.0);
        prop_assert!(score.value <= 1.0);
        prop_assert_eq!(score.truncated_trees, 0);
    }

    #[test]
    fn prop_shorter_paths_score_higher(a in feature_vector(), b in feature_vector()) {
        let scorer = scorer()?;
        let sa = scorer.score(&a);
        let sb = scorer.score(&b);
        if sa.mean_path_length < sb.mean_path_length {
            prop_assert!(sa.value >= sb.value);
        }
        if sb.mean_path_length < sa.mean_path_length {
            prop_assert!(sb.value >= sa.value);
        }
    }

    #[test]
    fn prop_verdict_matches_threshold(features in feature_vector()) {
        let scorer = scorer()?;
        let verdict = scorer.classify(&features);
        prop_assert_eq!(verdict.model_hit, verdict.score.value > scorer.threshold().value());
    }

    #[test]
    fn prop_rules_never_fire_at_or_below_thresholds(
        di_dt in -10.0f32..=0.8,
        droop in -1.0f32..=0.040,
        ripple in -1.0f32..=0.030,
    ) {
        let rails = GuardRails::new(GuardRailConfig { use_ripple: true, ..GuardRailConfig::default() })
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
        let features = FeatureVector { di_dt, vout_droop: droop, ripple_rms: ripple, ..FeatureVector::default() };
        prop_assert_eq!(rails.evaluate(&features), None);
    }
}
