//! Configuration types for the FDIR controller.

use serde::{Deserialize, Serialize};

use crate::error::{FdirError, FdirResult};

/// Thresholds for detecting fault re-latch during `Verify`.
///
/// Re-latch fires when both `di_dt > didt_a_per_ms * factor` and
/// `vout_droop > droop_v * factor`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RelatchThresholds {
    /// Base input current slope threshold (A/ms).
    pub didt_a_per_ms: f32,
    /// Base output droop threshold (V).
    pub droop_v: f32,
    /// Multiplier applied to both base thresholds.
    ///
    /// Default: 0.8.
    pub factor: f32,
}

impl RelatchThresholds {
    /// Effective current slope limit.
    #[must_use]
    pub fn didt_limit(&self) -> f32 {
        self.didt_a_per_ms * self.factor
    }

    /// Effective droop limit.
    #[must_use]
    pub fn droop_limit(&self) -> f32 {
        self.droop_v * self.factor
    }
}

impl Default for RelatchThresholds {
    fn default() -> Self {
        Self {
            didt_a_per_ms: 0.8,
            droop_v: 0.040,
            factor: 0.8,
        }
    }
}

/// FDIR controller configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FdirConfig {
    /// Consecutive anomalous ticks required before cutting power.
    ///
    /// Default: 2.
    pub dwell_hits: u32,

    /// Time to hold power off after a cut, in milliseconds.
    ///
    /// Default: 10 ms.
    pub hold_ms: u32,

    /// Time to watch for re-latch after a restart, in milliseconds.
    ///
    /// Default: 100 ms.
    pub verify_ms: u32,

    /// Re-latch thresholds.
    pub relatch: RelatchThresholds,
}

impl FdirConfig {
    /// Create a configuration builder.
    #[must_use]
    pub fn builder() -> FdirConfigBuilder {
        FdirConfigBuilder::default()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the dwell count or either timer is zero, or a
    /// re-latch threshold is negative or not finite.
    pub fn validate(&self) -> FdirResult<()> {
        if self.dwell_hits == 0 {
            return Err(FdirError::invalid_configuration(
                "dwell_hits must be at least 1",
            ));
        }
        if self.hold_ms == 0 {
            return Err(FdirError::invalid_configuration(
                "hold_ms must be at least 1",
            ));
        }
        if self.verify_ms == 0 {
            return Err(FdirError::invalid_configuration(
                "verify_ms must be at least 1",
            ));
        }
        let r = &self.relatch;
        for (name, value) in [
            ("relatch.didt_a_per_ms", r.didt_a_per_ms),
            ("relatch.droop_v", r.droop_v),
            ("relatch.factor", r.factor),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(FdirError::invalid_configuration(format!(
                    "{name} must be finite and non-negative, got {value}"
                )));
            }
        }
        Ok(())
    }
}

impl Default for FdirConfig {
    fn default() -> Self {
        Self {
            dwell_hits: 2,
            hold_ms: 10,
            verify_ms: 100,
            relatch: RelatchThresholds::default(),
        }
    }
}

/// Builder for `FdirConfig`.
#[derive(Debug, Default)]
pub struct FdirConfigBuilder {
    config: FdirConfig,
}

impl FdirConfigBuilder {
    /// Set the dwell count.
    #[must_use]
    pub fn dwell_hits(mut self, hits: u32) -> Self {
        self.config.dwell_hits = hits;
        self
    }

    /// Set the hold-off time in milliseconds.
    #[must_use]
    pub fn hold_ms(mut self, ms: u32) -> Self {
        self.config.hold_ms = ms;
        self
    }

    /// Set the verification window in milliseconds.
    #[must_use]
    pub fn verify_ms(mut self, ms: u32) -> Self {
        self.config.verify_ms = ms;
        self
    }

    /// Set the re-latch thresholds.
    #[must_use]
    pub fn relatch(mut self, relatch: RelatchThresholds) -> Self {
        self.config.relatch = relatch;
        self
    }

    /// Set only the re-latch factor.
    #[must_use]
    pub fn relatch_factor(mut self, factor: f32) -> Self {
        self.config.relatch.factor = factor;
        self
    }

    /// Build the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> FdirResult<FdirConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
