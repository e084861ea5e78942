//! The FDIR controller.
//!
//! [`FdirController::step`] is called once per tick that produced a feature
//! vector. It is the only place that decides to cut or restore power.

use core::time::Duration;

use guardian_telemetry::FeatureVector;
use serde::Serialize;

use crate::actuator::PowerActuator;
use crate::config::FdirConfig;
use crate::deadline::Deadline;
use crate::error::FdirResult;
use crate::state::FdirState;

/// Per-tick input to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FdirInput {
    /// Model verdict ORed with the guard-rail rules.
    pub anomaly: bool,
    /// Feature vector for this tick.
    pub features: FeatureVector,
    /// Model score for this tick.
    pub score: f32,
}

/// Why a transition happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionCause {
    /// `dwell_hits` consecutive anomalies in `Normal`.
    DwellReached,
    /// Hold-off period elapsed.
    HoldElapsed,
    /// Fault indicators reappeared during `Verify`.
    Relatched,
    /// Verification window elapsed without re-latch.
    VerifyPassed,
}

/// A state change produced by [`FdirController::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Transition {
    /// State before the step.
    pub from: FdirState,
    /// State after the step.
    pub to: FdirState,
    /// Timeline position of the step.
    pub at: Duration,
    /// Trigger.
    pub cause: TransitionCause,
}

/// Mutable controller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FdirContext {
    state: FdirState,
    dwell: u32,
    deadline: Option<Deadline>,
}

impl FdirContext {
    /// Current state.
    #[must_use]
    pub fn state(&self) -> FdirState {
        self.state
    }

    /// Consecutive anomalous ticks counted in `Normal`.
    #[must_use]
    pub fn dwell(&self) -> u32 {
        self.dwell
    }

    /// Pending hold or verify deadline.
    #[must_use]
    pub fn deadline(&self) -> Option<Deadline> {
        self.deadline
    }
}

/// Counters accumulated by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct FdirMetrics {
    /// Power cuts commanded.
    pub power_cuts: u64,
    /// Soft restarts commanded.
    pub soft_restarts: u64,
    /// Verification windows completed without re-latch.
    pub verifications_passed: u64,
    /// Entries into `Safe`.
    pub safe_entries: u64,
    /// Actuator commands that returned an error.
    pub actuator_failures: u64,
    /// Longest run of consecutive anomalous ticks seen in `Normal`.
    pub longest_dwell: u32,
}

/// Four-state power-path FDIR automaton.
///
/// Owns its context exclusively. Actuator failures during a step are logged
/// and counted; the transition still takes effect so the automaton never
/// stalls on a faulty line driver.
#[derive(Debug, Clone)]
pub struct FdirController {
    config: FdirConfig,
    context: FdirContext,
    metrics: FdirMetrics,
}

impl FdirController {
    /// Create a controller in `Normal` with a zero dwell count.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` fails validation.
    pub fn new(config: FdirConfig) -> FdirResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            context: FdirContext::default(),
            metrics: FdirMetrics::default(),
        })
    }

    /// Advance the automaton by one tick.
    ///
    /// Returns the transition taken, if any.
    pub fn step<A>(&mut self, now: Duration, input: &FdirInput, actuator: &mut A) -> Option<Transition>
    where
        A: PowerActuator + ?Sized,
    {
        let from = self.context.state;
        let (to, cause) = match from {
            FdirState::Normal => {
                if !input.anomaly {
                    self.context.dwell = 0;
                    return None;
                }
                self.context.dwell = self.context.dwell.saturating_add(1);
                self.metrics.longest_dwell = self.metrics.longest_dwell.max(self.context.dwell);
                if self.context.dwell < self.config.dwell_hits {
                    tracing::debug!(
                        dwell = self.context.dwell,
                        score = input.score,
                        "Anomaly counted toward dwell"
                    );
                    return None;
                }
                self.cut(actuator);
                self.context.deadline = Some(Deadline::after(now, self.config.hold_ms));
                (FdirState::Hold, TransitionCause::DwellReached)
            }
            FdirState::Hold => {
                if !self.deadline_due(now) {
                    return None;
                }
                self.restart(actuator);
                self.context.deadline = Some(Deadline::after(now, self.config.verify_ms));
                (FdirState::Verify, TransitionCause::HoldElapsed)
            }
            FdirState::Verify => {
                if self.relatched(&input.features) {
                    self.cut(actuator);
                    self.context.deadline = None;
                    self.metrics.safe_entries = self.metrics.safe_entries.saturating_add(1);
                    tracing::warn!(
                        di_dt = input.features.di_dt,
                        vout_droop = input.features.vout_droop,
                        score = input.score,
                        "Fault re-latched during verification, entering safe state"
                    );
                    (FdirState::Safe, TransitionCause::Relatched)
                } else if self.deadline_due(now) {
                    self.context.dwell = 0;
                    self.context.deadline = None;
                    self.metrics.verifications_passed =
                        self.metrics.verifications_passed.saturating_add(1);
                    (FdirState::Normal, TransitionCause::VerifyPassed)
                } else {
                    return None;
                }
            }
            FdirState::Safe => return None,
        };

        self.context.state = to;
        tracing::info!(
            from = %from,
            to = %to,
            cause = ?cause,
            at_us = u64::try_from(now.as_micros()).unwrap_or(u64::MAX),
            "FDIR transition"
        );
        Some(Transition {
            from,
            to,
            at: now,
            cause,
        })
    }

    /// Restore the power-on context: `Normal`, zero dwell, no deadline.
    ///
    /// Metrics are kept. If the lines are not powered (reset out of `Hold`
    /// or `Safe`) the actuator is soft-restarted so power matches `Normal`.
    pub fn reset<A: PowerActuator + ?Sized>(&mut self, actuator: &mut A) {
        let from = self.context.state;
        self.context = FdirContext::default();
        if !actuator.is_powered() {
            self.restart(actuator);
        }
        tracing::info!(from = %from, powered = actuator.is_powered(), "FDIR controller reset");
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> FdirState {
        self.context.state
    }

    /// Current context.
    #[must_use]
    pub fn context(&self) -> &FdirContext {
        &self.context
    }

    /// Accumulated counters.
    #[must_use]
    pub fn metrics(&self) -> &FdirMetrics {
        &self.metrics
    }

    /// Configuration in use.
    #[must_use]
    pub fn config(&self) -> &FdirConfig {
        &self.config
    }

    fn deadline_due(&self, now: Duration) -> bool {
        self.context.deadline.is_none_or(|d| d.is_due(now))
    }

    fn relatched(&self, features: &FeatureVector) -> bool {
        let r = &self.config.relatch;
        features.di_dt > r.didt_limit() && features.vout_droop > r.droop_limit()
    }

    fn cut<A: PowerActuator + ?Sized>(&mut self, actuator: &mut A) {
        self.metrics.power_cuts = self.metrics.power_cuts.saturating_add(1);
        if let Err(err) = actuator.cut() {
            self.metrics.actuator_failures = self.metrics.actuator_failures.saturating_add(1);
            tracing::error!(error = %err, "Power cut command failed");
        }
    }

    fn restart<A: PowerActuator + ?Sized>(&mut self, actuator: &mut A) {
        self.metrics.soft_restarts = self.metrics.soft_restarts.saturating_add(1);
        if let Err(err) = actuator.soft_restart() {
            self.metrics.actuator_failures = self.metrics.actuator_failures.saturating_add(1);
            tracing::error!(error = %err, "Soft restart command failed");
        }
    }
}
