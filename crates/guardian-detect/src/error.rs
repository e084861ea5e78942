//! Error types for model loading and detection setup.

use std::path::PathBuf;

/// Errors raised while loading, validating or configuring the detector.
///
/// Every variant is fatal at startup; nothing in the scoring path returns
/// an error.
#[derive(Debug, thiserror::Error)]
pub enum DetectError {
    /// The model file could not be read.
    #[error("failed to read model file {path}: {source}")]
    Io {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The model document is not valid JSON for the model contract.
    #[error("failed to parse model data: {0}")]
    Parse(#[from] serde_json::Error),

    /// The model was trained on a different number of features.
    #[error("model declares {found} features, expected {expected}")]
    FeatureCount {
        /// Required feature count.
        expected: usize,
        /// Declared feature count.
        found: usize,
    },

    /// An array does not match its declared length.
    #[error("array `{field}` has {found} entries, expected {expected}")]
    LengthMismatch {
        /// Name of the offending array.
        field: &'static str,
        /// Declared length.
        expected: usize,
        /// Actual length.
        found: usize,
    },

    /// The model contains no trees or no nodes.
    #[error("model contains no trees")]
    EmptyForest,

    /// A tree root offset lies outside the node arena.
    #[error("tree {tree} root offset {offset} is outside 0..{num_nodes}")]
    TreeOffsetOutOfBounds {
        /// Tree index.
        tree: usize,
        /// Offending offset.
        offset: i64,
        /// Arena size.
        num_nodes: usize,
    },

    /// A child id lies outside the node arena.
    #[error("node {node} has child id {child} outside 0..{num_nodes}")]
    ChildOutOfBounds {
        /// Parent node id.
        node: usize,
        /// Offending child id.
        child: i64,
        /// Arena size.
        num_nodes: usize,
    },

    /// A node is neither a proper leaf nor a proper split.
    #[error("node {node} is malformed: {reason}")]
    MalformedNode {
        /// Node id.
        node: usize,
        /// Description of the inconsistency.
        reason: &'static str,
    },

    /// A split node references a feature outside the model's feature set.
    #[error("split node {node} references feature {feature}")]
    FeatureOutOfRange {
        /// Node id.
        node: usize,
        /// Offending feature index.
        feature: i64,
    },

    /// Traversal from a root reaches a node twice.
    #[error("tree {tree} reaches node {node} more than once")]
    Cycle {
        /// Tree index.
        tree: usize,
        /// Node reached twice.
        node: usize,
    },

    /// A dequantization scale is NaN or infinite.
    #[error("scale `{field}` is not finite: {value}")]
    NonFiniteScale {
        /// Name of the scale.
        field: &'static str,
        /// Offending value.
        value: f32,
    },

    /// The path-length normalization constant is not a positive finite number.
    #[error("normalization constant c_max_samples must be positive and finite, got {0}")]
    InvalidNormalization(f32),

    /// A quantized decision threshold was supplied without its scale.
    #[error("model_threshold_q15 is present but scale_decision_th is missing")]
    MissingDecisionScale,

    /// The resolved decision threshold is unusable.
    #[error("decision threshold must be finite, got {0}")]
    InvalidThreshold(f32),

    /// A guard-rail threshold is negative or not finite.
    #[error("guard-rail threshold `{name}` must be finite and non-negative, got {value}")]
    InvalidRuleThreshold {
        /// Threshold name.
        name: &'static str,
        /// Offending value.
        value: f32,
    },
}

/// A specialized `Result` type for detector setup.
pub type DetectResult<T> = core::result::Result<T, DetectError>;
