//! Feature standardization.

use guardian_telemetry::NUM_FEATURES;

use crate::model::{ModelData, dequantize};

/// Deviations smaller than this in magnitude are replaced by `1`.
pub const STD_EPSILON: f32 = 1e-12;

/// Per-feature `z = (x − mean) / std` transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StandardScaler {
    mean: [f32; NUM_FEATURES],
    std: [f32; NUM_FEATURES],
}

impl StandardScaler {
    /// Create a scaler, substituting `1` for near-zero deviations.
    #[must_use]
    pub fn new(mean: [f32; NUM_FEATURES], std: [f32; NUM_FEATURES]) -> Self {
        let std = std.map(|s| if s.abs() < STD_EPSILON { 1.0 } else { s });
        Self { mean, std }
    }

    /// Dequantize the scaler constants of a model.
    ///
    /// `data` is expected to have passed [`ModelData::validate`]; a short
    /// vector leaves the remaining features at mean `0`, deviation `1`.
    #[must_use]
    pub fn from_model(data: &ModelData) -> Self {
        let mut mean = [0.0; NUM_FEATURES];
        let mut std = [1.0; NUM_FEATURES];
        for (slot, &q) in mean.iter_mut().zip(&data.scaler_mean_q15) {
            *slot = dequantize(q, data.scale_mean);
        }
        for (slot, &q) in std.iter_mut().zip(&data.scaler_scale_q15) {
            *slot = dequantize(q, data.scale_scale);
        }
        Self::new(mean, std)
    }

    /// Standardize a feature array in model order.
    #[must_use]
    pub fn transform(&self, x: &[f32; NUM_FEATURES]) -> [f32; NUM_FEATURES] {
        let mut z = [0.0; NUM_FEATURES];
        for (((out, &value), &mean), &std) in z.iter_mut().zip(x).zip(&self.mean).zip(&self.std) {
            *out = (value - mean) / std;
        }
        z
    }

    /// Dequantized means.
    #[must_use]
    pub fn mean(&self) -> &[f32; NUM_FEATURES] {
        &self.mean
    }

    /// Dequantized deviations after epsilon substitution.
    #[must_use]
    pub fn std(&self) -> &[f32; NUM_FEATURES] {
        &self.std
    }
}
