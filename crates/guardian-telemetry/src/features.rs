//! Windowed feature extraction.
//!
//! The extractor turns the most recent window of the ring buffer into a
//! five-element [`FeatureVector`] in the order the anomaly model expects.

use crate::error::{TelemetryError, TelemetryResult};
use crate::ring::SampleRingBuffer;
use crate::sample::Channel;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Number of features produced per window.
pub const NUM_FEATURES: usize = 5;

/// Temperature deltas smaller than this yield a zero efficiency slope (°C).
pub const TEMPERATURE_EPSILON_C: f32 = 1e-6;

/// Feature vector derived from one window of samples.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FeatureVector {
    /// Input current slope across the window (A/ms).
    pub di_dt: f32,
    /// Output voltage baseline mean minus window mean (V). Positive when drooping.
    pub vout_droop: f32,
    /// Mean ripple voltage over the window (V), zero when ripple sensing is off.
    pub ripple_rms: f32,
    /// Mean clipped conversion efficiency over the window.
    pub efficiency: f32,
    /// Efficiency change per degree between window quarters (1/°C).
    pub deff_dt: f32,
}

impl FeatureVector {
    /// Features in model order `[di_dt, vout_droop, ripple_rms, efficiency, deff_dt]`.
    #[must_use]
    pub fn to_array(&self) -> [f32; NUM_FEATURES] {
        [
            self.di_dt,
            self.vout_droop,
            self.ripple_rms,
            self.efficiency,
            self.deff_dt,
        ]
    }

    /// Inverse of [`FeatureVector::to_array`].
    #[must_use]
    pub fn from_array(values: [f32; NUM_FEATURES]) -> Self {
        let [di_dt, vout_droop, ripple_rms, efficiency, deff_dt] = values;
        Self {
            di_dt,
            vout_droop,
            ripple_rms,
            efficiency,
            deff_dt,
        }
    }

    /// True when every feature is a finite number.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.to_array().iter().all(|v| v.is_finite())
    }
}

/// Sampling and window parameters for the extractor.
///
/// Validated once at construction; the per-tick path performs no checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FeatureConfig {
    /// Nominal sampling rate. Must be a positive multiple of 1000.
    ///
    /// Default: 10 kHz.
    pub sample_rate_hz: u32,

    /// Analysis window length in milliseconds.
    ///
    /// Default: 2 ms.
    pub window_ms: u32,

    /// Extra history kept in the ring buffer beyond the window, in milliseconds.
    ///
    /// Default: 4 ms.
    pub margin_ms: u32,

    /// Baseline length as a multiple of the window, bounded by buffered history.
    ///
    /// Default: 5.
    pub baseline_multiplier: u32,

    /// Whether the ripple channel feeds the ripple feature.
    pub use_ripple: bool,
}

impl FeatureConfig {
    /// Create a configuration builder.
    #[must_use]
    pub fn builder() -> FeatureConfigBuilder {
        FeatureConfigBuilder::default()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`TelemetryError::InvalidConfiguration`] if the sampling rate is
    /// not a positive multiple of 1000, the window is shorter than two samples,
    /// or the baseline multiplier is zero.
    pub fn validate(&self) -> TelemetryResult<()> {
        if self.sample_rate_hz == 0 || self.sample_rate_hz % 1000 != 0 {
            return Err(TelemetryError::invalid_configuration(format!(
                "sample_rate_hz must be a positive multiple of 1000, got {}",
                self.sample_rate_hz
            )));
        }
        if self.window_ms == 0 {
            return Err(TelemetryError::invalid_configuration(
                "window_ms must be at least 1",
            ));
        }
        let win = self.window_samples();
        if win < 2 {
            return Err(TelemetryError::invalid_configuration(format!(
                "window must span at least 2 samples, got {win}"
            )));
        }
        if self.baseline_multiplier == 0 {
            return Err(TelemetryError::invalid_configuration(
                "baseline_multiplier must be at least 1",
            ));
        }
        Ok(())
    }

    /// Samples per millisecond at the nominal rate.
    #[must_use]
    pub fn samples_per_ms(&self) -> usize {
        (self.sample_rate_hz / 1000) as usize
    }

    /// Window length in samples.
    #[must_use]
    pub fn window_samples(&self) -> usize {
        self.samples_per_ms().saturating_mul(self.window_ms as usize)
    }

    /// Ring buffer capacity: window plus margin, in samples.
    #[must_use]
    pub fn buffer_capacity(&self) -> usize {
        self.samples_per_ms()
            .saturating_mul(self.window_ms.saturating_add(self.margin_ms) as usize)
    }
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: 10_000,
            window_ms: 2,
            margin_ms: 4,
            baseline_multiplier: 5,
            use_ripple: false,
        }
    }
}

/// Builder for `FeatureConfig`.
#[derive(Debug, Default)]
pub struct FeatureConfigBuilder {
    config: FeatureConfig,
}

impl FeatureConfigBuilder {
    /// Set the nominal sampling rate in Hz.
    #[must_use]
    pub fn sample_rate_hz(mut self, hz: u32) -> Self {
        self.config.sample_rate_hz = hz;
        self
    }

    /// Set the window length in milliseconds.
    #[must_use]
    pub fn window_ms(mut self, ms: u32) -> Self {
        self.config.window_ms = ms;
        self
    }

    /// Set the history margin in milliseconds.
    #[must_use]
    pub fn margin_ms(mut self, ms: u32) -> Self {
        self.config.margin_ms = ms;
        self
    }

    /// Set the baseline multiplier.
    #[must_use]
    pub fn baseline_multiplier(mut self, multiplier: u32) -> Self {
        self.config.baseline_multiplier = multiplier;
        self
    }

    /// Enable or disable ripple sensing.
    #[must_use]
    pub fn use_ripple(mut self, enabled: bool) -> Self {
        self.config.use_ripple = enabled;
        self
    }

    /// Build the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> TelemetryResult<FeatureConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Computes [`FeatureVector`]s from a [`SampleRingBuffer`].
///
/// A pure function of the buffer contents. Holds only the resolved window
/// geometry.
#[derive(Debug, Clone, Copy)]
pub struct FeatureExtractor {
    config: FeatureConfig,
    window: usize,
    quarter: usize,
    baseline: usize,
}

impl FeatureExtractor {
    /// Create an extractor for a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`TelemetryError::InvalidConfiguration`] if `config` is invalid.
    pub fn new(config: FeatureConfig) -> TelemetryResult<Self> {
        config.validate()?;
        let window = config.window_samples();
        Ok(Self {
            config,
            window,
            quarter: (window / 4).max(1),
            baseline: window.saturating_mul(config.baseline_multiplier as usize),
        })
    }

    /// Configuration this extractor was built from.
    #[must_use]
    pub fn config(&self) -> &FeatureConfig {
        &self.config
    }

    /// Window length in samples.
    #[must_use]
    pub fn window_samples(&self) -> usize {
        self.window
    }

    /// Allocate a ring buffer sized for this extractor.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured capacity is zero.
    pub fn new_buffer(&self) -> TelemetryResult<SampleRingBuffer> {
        SampleRingBuffer::with_capacity(self.config.buffer_capacity().max(self.window))
    }

    /// Compute the feature vector over the most recent window.
    ///
    /// # Errors
    ///
    /// Returns [`TelemetryError::InsufficientData`] until a full window has
    /// been buffered.
    #[allow(
        clippy::cast_precision_loss,
        reason = "window and quarter lengths are far below f32 integer precision"
    )]
    pub fn compute(&self, buffer: &SampleRingBuffer) -> TelemetryResult<FeatureVector> {
        let win = self.window;
        let start = buffer.window(win)?;

        let i_first = buffer.value(Channel::InputCurrent, start);
        let i_last = buffer.value(Channel::InputCurrent, start + win - 1);
        let di_dt = (i_last - i_first) / self.config.window_ms as f32;

        let baseline_len = self.baseline.min(buffer.len());
        let baseline_start = buffer.window(baseline_len)?;
        let vout_droop = buffer.mean(Channel::OutputVoltage, baseline_start, baseline_len)
            - buffer.mean(Channel::OutputVoltage, start, win);

        let ripple_rms = if self.config.use_ripple {
            buffer.mean(Channel::Ripple, start, win)
        } else {
            0.0
        };

        let efficiency = mean_efficiency(buffer, start, win);

        let q = self.quarter;
        let trailing_start = start + win - q;
        let eff_lead = mean_efficiency(buffer, start, q);
        let eff_trail = mean_efficiency(buffer, trailing_start, q);
        let temp_lead = buffer.mean(Channel::Temperature, start, q);
        let temp_trail = buffer.mean(Channel::Temperature, trailing_start, q);
        let delta_t = temp_trail - temp_lead;
        let deff_dt = if delta_t.abs() < TEMPERATURE_EPSILON_C {
            0.0
        } else {
            (eff_trail - eff_lead) / delta_t
        };

        Ok(FeatureVector {
            di_dt,
            vout_droop,
            ripple_rms,
            efficiency,
            deff_dt,
        })
    }
}

#[allow(
    clippy::cast_precision_loss,
    reason = "window lengths are far below f32 integer precision"
)]
fn mean_efficiency(buffer: &SampleRingBuffer, start: usize, n: usize) -> f32 {
    if n == 0 {
        return 0.0;
    }
    let sum: f32 = buffer.samples(start, n).map(|s| s.efficiency()).sum();
    sum / n as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::RawSample;
    use approx::assert_relative_eq;

    const NOMINAL: RawSample = RawSample::new(8.0, 0.40, 5.0, 0.50, 40.0, 0.010);

    fn filled(extractor: &FeatureExtractor, n: usize) -> TelemetryResult<SampleRingBuffer> {
        let mut buffer = extractor.new_buffer()?;
        for _ in 0..n {
            buffer.push(NOMINAL);
        }
        Ok(buffer)
    }

    #[test]
    fn test_default_geometry() -> TelemetryResult<()> {
        let config = FeatureConfig::default();
        assert_eq!(config.samples_per_ms(), 10);
        assert_eq!(config.window_samples(), 20);
        assert_eq!(config.buffer_capacity(), 60);
        let extractor = FeatureExtractor::new(config)?;
        assert_eq!(extractor.window_samples(), 20);
        assert_eq!(extractor.new_buffer()?.capacity(), 60);
        Ok(())
    }

    #[test]
    fn test_config_validation() {
        assert!(FeatureConfig::builder().sample_rate_hz(0).build().is_err());
        assert!(FeatureConfig::builder().sample_rate_hz(1500).build().is_err());
        assert!(FeatureConfig::builder().window_ms(0).build().is_err());
        assert!(
            FeatureConfig::builder()
                .sample_rate_hz(1000)
                .window_ms(1)
                .build()
                .is_err()
        );
        assert!(
            FeatureConfig::builder()
                .baseline_multiplier(0)
                .build()
                .is_err()
        );
        assert!(
            FeatureConfig::builder()
                .sample_rate_hz(1000)
                .window_ms(2)
                .build()
                .is_ok()
        );
    }

    #[test]
    fn test_not_ready_until_window_full() -> TelemetryResult<()> {
        let extractor = FeatureExtractor::new(FeatureConfig::default())?;
        let buffer = filled(&extractor, 19)?;
        let err = extractor.compute(&buffer);
        assert_eq!(
            err,
            Err(TelemetryError::InsufficientData {
                requested: 20,
                available: 19,
            })
        );
        let buffer = filled(&extractor, 20)?;
        assert!(extractor.compute(&buffer).is_ok());
        Ok(())
    }

    #[test]
    fn test_steady_state_features() -> TelemetryResult<()> {
        let extractor = FeatureExtractor::new(FeatureConfig::default())?;
        let buffer = filled(&extractor, 100)?;
        let features = extractor.compute(&buffer)?;
        assert_relative_eq!(features.di_dt, 0.0);
        assert_relative_eq!(features.vout_droop, 0.0, epsilon = 1e-6);
        assert_relative_eq!(features.ripple_rms, 0.0);
        assert_relative_eq!(features.efficiency, 2.5 / 3.2, epsilon = 1e-5);
        assert_relative_eq!(features.deff_dt, 0.0);
        Ok(())
    }

    #[test]
    fn test_ripple_feature_follows_config() -> TelemetryResult<()> {
        let config = FeatureConfig::builder().use_ripple(true).build()?;
        let extractor = FeatureExtractor::new(config)?;
        let buffer = filled(&extractor, 20)?;
        let features = extractor.compute(&buffer)?;
        assert_relative_eq!(features.ripple_rms, 0.010, epsilon = 1e-6);
        Ok(())
    }

    #[test]
    fn test_deff_dt_slope_across_quarters() -> TelemetryResult<()> {
        let extractor = FeatureExtractor::new(FeatureConfig::default())?;
        let mut buffer = extractor.new_buffer()?;
        // Leading quarter at 40 °C and eff 0.78125, trailing quarter at 42 °C and eff 0.625.
        for k in 0..20 {
            let sample = if k < 10 {
                RawSample::new(8.0, 0.40, 5.0, 0.50, 40.0, 0.0)
            } else {
                RawSample::new(8.0, 0.40, 5.0, 0.40, 42.0, 0.0)
            };
            buffer.push(sample);
        }
        let features = extractor.compute(&buffer)?;
        assert_relative_eq!(features.deff_dt, (0.625 - 0.781_25) / 2.0, epsilon = 1e-5);
        Ok(())
    }

    #[test]
    fn test_vector_array_order() {
        let vector = FeatureVector {
            di_dt: 1.0,
            vout_droop: 2.0,
            ripple_rms: 3.0,
            efficiency: 4.0,
            deff_dt: 5.0,
        };
        let array = vector.to_array();
        for (got, want) in array.iter().zip([1.0_f32, 2.0, 3.0, 4.0, 5.0]) {
            assert_relative_eq!(*got, want);
        }
        assert_eq!(FeatureVector::from_array(array), vector);
        assert!(vector.is_finite());
        assert!(!FeatureVector::from_array([f32::NAN, 0.0, 0.0, 0.0, 0.0]).is_finite());
    }
}
