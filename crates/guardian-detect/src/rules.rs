//! Guard-rail rules evaluated alongside the model.
//!
//! Rules are stateless threshold checks on the feature vector. Comparisons
//! are strict: a feature exactly at its threshold does not fire.

use core::fmt;

use guardian_telemetry::FeatureVector;
use serde::{Deserialize, Serialize};

use crate::error::{DetectError, DetectResult};

/// Guard-rail thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GuardRailConfig {
    /// Input current slope threshold (A/ms).
    ///
    /// Default: 0.8 A/ms.
    pub didt_a_per_ms: f32,

    /// Output droop threshold (V).
    ///
    /// Default: 40 mV.
    pub droop_v: f32,

    /// Ripple threshold (V). Only used when `use_ripple` is set.
    ///
    /// Default: 30 mV.
    pub ripple_v: f32,

    /// Whether the ripple rule participates.
    pub use_ripple: bool,
}

impl GuardRailConfig {
    /// Validate the thresholds.
    ///
    /// # Errors
    ///
    /// Returns [`DetectError::InvalidRuleThreshold`] for a negative or
    /// non-finite threshold.
    pub fn validate(&self) -> DetectResult<()> {
        for (name, value) in [
            ("didt_a_per_ms", self.didt_a_per_ms),
            ("droop_v", self.droop_v),
            ("ripple_v", self.ripple_v),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(DetectError::InvalidRuleThreshold { name, value });
            }
        }
        Ok(())
    }
}

impl Default for GuardRailConfig {
    fn default() -> Self {
        Self {
            didt_a_per_ms: 0.8,
            droop_v: 0.040,
            ripple_v: 0.030,
            use_ripple: false,
        }
    }
}

/// Which rule fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleHit {
    /// Input current surging while the output sags.
    CurrentSurgeWithDroop,
    /// Output ripple above its limit.
    RippleExcess,
}

impl fmt::Display for RuleHit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleHit::CurrentSurgeWithDroop => f.write_str("current surge with droop"),
            RuleHit::RippleExcess => f.write_str("ripple excess"),
        }
    }
}

/// Stateless rule evaluator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GuardRails {
    config: GuardRailConfig,
}

impl GuardRails {
    /// Create an evaluator from validated thresholds.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` fails validation.
    pub fn new(config: GuardRailConfig) -> DetectResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Thresholds in use.
    #[must_use]
    pub fn config(&self) -> &GuardRailConfig {
        &self.config
    }

    /// First rule that fires for `features`, if any.
    #[must_use]
    pub fn evaluate(&self, features: &FeatureVector) -> Option<RuleHit> {
        let c = &self.config;
        if features.di_dt > c.didt_a_per_ms && features.vout_droop > c.droop_v {
            return Some(RuleHit::CurrentSurgeWithDroop);
        }
        if c.use_ripple && features.ripple_rms > c.ripple_v {
            return Some(RuleHit::RippleExcess);
        }
        None
    }
}

impl Default for GuardRails {
    fn default() -> Self {
        Self {
            config: GuardRailConfig::default(),
        }
    }
}
