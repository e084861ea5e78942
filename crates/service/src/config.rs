//! Service configuration.
//!
//! Loaded once at start-up from YAML. Every field has a default, so an empty
//! file or a missing file yields the bench configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use guardian_detect::{FALLBACK_THRESHOLD, GuardRailConfig};
use guardian_fdir::{FdirConfig, RelatchThresholds};
use guardian_scheduler::{DEFAULT_RT_PRIORITY, RTSetup};
use guardian_telemetry::FeatureConfig;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ServiceError, ServiceResult};

/// Default config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "eclipse-guardian.yaml";

/// Complete service configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GuardianConfig {
    /// Acquisition and windowing.
    pub sampling: SamplingConfig,
    /// Anomaly detection.
    pub detection: DetectionConfig,
    /// Recovery timing.
    pub fdir: FdirSettings,
    /// Control-loop runtime.
    pub runtime: RuntimeConfig,
    /// Model file. `--model` overrides it.
    pub model_path: Option<PathBuf>,
}

/// Acquisition and windowing parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SamplingConfig {
    /// Nominal sampling rate in Hz, a multiple of 1000.
    pub sample_rate_hz: u32,
    /// Analysis window in milliseconds.
    pub window_ms: u32,
    /// History kept beyond the window in milliseconds.
    pub margin_ms: u32,
    /// Control-loop period in milliseconds.
    pub hop_ms: u32,
    /// Droop baseline length as a multiple of the window.
    pub baseline_multiplier: u32,
    /// Sense ripple and enable the ripple feature and rule.
    pub use_ripple: bool,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: 10_000,
            window_ms: 2,
            margin_ms: 4,
            hop_ms: 1,
            baseline_multiplier: 5,
            use_ripple: false,
        }
    }
}

/// Guard-rail thresholds and the model fallback threshold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DetectionConfig {
    /// Input current slope threshold (A/ms).
    pub didt_a_per_ms: f32,
    /// Output droop threshold (V).
    pub droop_v: f32,
    /// Ripple threshold (V).
    pub ripple_v: f32,
    /// Decision threshold used when the model carries none.
    pub fallback_threshold: f32,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            didt_a_per_ms: 0.8,
            droop_v: 0.040,
            ripple_v: 0.030,
            fallback_threshold: FALLBACK_THRESHOLD,
        }
    }
}

/// Recovery timing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FdirSettings {
    /// Consecutive anomalous ticks before a cut.
    pub dwell_hits: u32,
    /// Power-off hold in milliseconds.
    pub hold_ms: u32,
    /// Post-restart verification window in milliseconds.
    pub verify_ms: u32,
    /// Fraction of the guard-rail thresholds that counts as a re-latch.
    pub relatch_factor: f32,
}

impl Default for FdirSettings {
    fn default() -> Self {
        Self {
            dwell_hits: 2,
            hold_ms: 10,
            verify_ms: 100,
            relatch_factor: 0.8,
        }
    }
}

/// Control-loop runtime options.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuntimeConfig {
    /// Request FIFO scheduling for the loop thread.
    pub realtime: bool,
    /// FIFO priority requested when `realtime` is set.
    pub priority: i32,
    /// Lock process memory.
    pub lock_memory: bool,
    /// Lateness above which a tick is flagged, in microseconds.
    pub max_jitter_us: u32,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            realtime: true,
            priority: DEFAULT_RT_PRIORITY,
            lock_memory: true,
            max_jitter_us: 250,
        }
    }
}

impl GuardianConfig {
    /// Load from `path`, falling back to defaults when the file is absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read, parsed or
    /// validated.
    pub fn load(path: &Path) -> ServiceResult<Self> {
        if !path.exists() {
            info!(path = %path.display(), "Config file not found, using defaults");
            let config = Self::default();
            config.validate()?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(path).map_err(|source| ServiceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml_str(&content).map_err(|err| match err {
            ServiceError::Yaml(source) => ServiceError::ConfigParse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })?;
        info!(path = %path.display(), "Configuration loaded");
        Ok(config)
    }

    /// Parse and validate YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed or a value is out of range.
    pub fn from_yaml_str(yaml: &str) -> ServiceResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize as YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_yaml(&self) -> ServiceResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Replace `model_path` when `model` is set.
    #[must_use]
    pub fn with_model_override(mut self, model: Option<PathBuf>) -> Self {
        if let Some(path) = model {
            debug!(path = %path.display(), "Model path overridden");
            self.model_path = Some(path);
        }
        self
    }

    /// Model file to load.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::MissingModel`] when none is configured.
    pub fn model_path(&self) -> ServiceResult<&Path> {
        self.model_path.as_deref().ok_or(ServiceError::MissingModel)
    }

    /// Check every section.
    ///
    /// # Errors
    ///
    /// Returns the first out-of-range value found.
    pub fn validate(&self) -> ServiceResult<()> {
        let features = self.feature_config();
        features.validate()?;

        let s = &self.sampling;
        if s.hop_ms == 0 {
            return Err(ServiceError::invalid_config(
                "sampling.hop_ms must be at least 1",
            ));
        }
        if s.hop_ms > s.window_ms.saturating_add(s.margin_ms) {
            return Err(ServiceError::invalid_config(format!(
                "sampling.hop_ms ({}) must not exceed window_ms + margin_ms ({})",
                s.hop_ms,
                s.window_ms.saturating_add(s.margin_ms)
            )));
        }

        self.guard_rail_config().validate()?;

        let th = self.detection.fallback_threshold;
        if !th.is_finite() || th <= 0.0 || th > 1.0 {
            return Err(ServiceError::invalid_config(format!(
                "detection.fallback_threshold must be in (0, 1], got {th}"
            )));
        }

        self.fdir_config().validate()?;

        if self.runtime.max_jitter_us == 0 {
            return Err(ServiceError::invalid_config(
                "runtime.max_jitter_us must be at least 1",
            ));
        }
        if !(1..=99).contains(&self.runtime.priority) {
            return Err(ServiceError::invalid_config(format!(
                "runtime.priority must be in 1..=99, got {}",
                self.runtime.priority
            )));
        }
        Ok(())
    }

    /// Feature extractor settings.
    pub fn feature_config(&self) -> FeatureConfig {
        let s = &self.sampling;
        FeatureConfig {
            sample_rate_hz: s.sample_rate_hz,
            window_ms: s.window_ms,
            margin_ms: s.margin_ms,
            baseline_multiplier: s.baseline_multiplier,
            use_ripple: s.use_ripple,
        }
    }

    /// Guard-rail thresholds.
    pub fn guard_rail_config(&self) -> GuardRailConfig {
        let d = &self.detection;
        GuardRailConfig {
            didt_a_per_ms: d.didt_a_per_ms,
            droop_v: d.droop_v,
            ripple_v: d.ripple_v,
            use_ripple: self.sampling.use_ripple,
        }
    }

    /// FDIR settings; re-latch limits scale the guard-rail thresholds.
    pub fn fdir_config(&self) -> FdirConfig {
        FdirConfig {
            dwell_hits: self.fdir.dwell_hits,
            hold_ms: self.fdir.hold_ms,
            verify_ms: self.fdir.verify_ms,
            relatch: RelatchThresholds {
                didt_a_per_ms: self.detection.didt_a_per_ms,
                droop_v: self.detection.droop_v,
                factor: self.fdir.relatch_factor,
            },
        }
    }

    /// Real-time request for the loop thread.
    pub fn rt_setup(&self) -> RTSetup {
        RTSetup::minimal()
            .with_high_priority(self.runtime.realtime)
            .with_priority(self.runtime.priority)
            .with_lock_memory(self.runtime.lock_memory)
    }

    /// Control-loop period.
    pub fn hop(&self) -> Duration {
        Duration::from_millis(u64::from(self.sampling.hop_ms))
    }

    /// Lateness budget per tick.
    pub fn max_jitter(&self) -> Duration {
        Duration::from_micros(u64::from(self.runtime.max_jitter_us))
    }

    /// Raw samples consumed per tick so the buffer fills at the nominal rate.
    pub fn samples_per_tick(&self) -> usize {
        self.feature_config()
            .samples_per_ms()
            .saturating_mul(usize::try_from(self.sampling.hop_ms).unwrap_or(usize::MAX))
    }
}
