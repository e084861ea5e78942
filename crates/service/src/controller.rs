//! Per-tick wiring of acquisition, detection and recovery.
//!
//! Each tick: read raw samples → push → extract → score and rules → OR →
//! FDIR step. The FDIR controller is the only component that touches the
//! actuator.

use std::time::Duration;

use guardian_detect::{AnomalyScorer, GuardRails, RuleHit, Score};
use guardian_fdir::{
    FdirController, FdirInput, FdirMetrics, FdirState, MonotonicClock, PowerActuator, Transition,
};
use guardian_scheduler::CadenceScheduler;
use guardian_telemetry::{FeatureExtractor, FeatureVector, SampleRingBuffer};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::GuardianConfig;
use crate::error::ServiceResult;
use crate::source::SampleSource;

/// What one tick observed and did.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TickReport {
    /// 1-based tick count since construction or reset.
    pub tick: u64,
    /// Feature vector, absent while the buffer is filling.
    pub features: Option<FeatureVector>,
    /// Model score, absent while the buffer is filling.
    pub score: Option<Score>,
    /// Score exceeded the decision threshold.
    pub model_hit: bool,
    /// Guard rail that fired, if any.
    pub rule_hit: Option<RuleHit>,
    /// `model_hit || rule_hit.is_some()`.
    pub anomaly: bool,
    /// FDIR transition taken this tick.
    pub transition: Option<Transition>,
    /// FDIR state after the tick.
    pub state: FdirState,
}

impl TickReport {
    /// True when the tick produced a feature vector.
    pub fn is_ready(&self) -> bool {
        self.features.is_some()
    }
}

/// Owns the buffer, detectors and FDIR controller for one power path.
///
/// The actuator must already be initialized.
#[derive(Debug)]
pub struct GuardianController<S, A> {
    source: S,
    actuator: A,
    buffer: SampleRingBuffer,
    extractor: FeatureExtractor,
    scorer: AnomalyScorer,
    rules: GuardRails,
    fdir: FdirController,
    samples_per_tick: usize,
    ticks: u64,
    not_ready_ticks: u64,
    anomalous_ticks: u64,
}

impl<S, A> GuardianController<S, A>
where
    S: SampleSource,
    A: PowerActuator,
{
    /// Wire a controller from validated configuration and a loaded scorer.
    ///
    /// # Errors
    ///
    /// Returns an error if any section of `config` is invalid.
    pub fn new(
        config: &GuardianConfig,
        scorer: AnomalyScorer,
        source: S,
        actuator: A,
    ) -> ServiceResult<Self> {
        config.validate()?;
        let extractor = FeatureExtractor::new(config.feature_config())?;
        let buffer = extractor.new_buffer()?;
        let rules = GuardRails::new(config.guard_rail_config())?;
        let fdir = FdirController::new(config.fdir_config())?;

        info!(
            capacity = buffer.capacity(),
            window = extractor.window_samples(),
            samples_per_tick = config.samples_per_tick(),
            "Guardian controller ready"
        );

        Ok(Self {
            source,
            actuator,
            buffer,
            extractor,
            scorer,
            rules,
            fdir,
            samples_per_tick: config.samples_per_tick(),
            ticks: 0,
            not_ready_ticks: 0,
            anomalous_ticks: 0,
        })
    }

    /// Run one control-loop iteration at timeline position `now`.
    pub fn tick(&mut self, now: Duration) -> TickReport {
        self.ticks = self.ticks.saturating_add(1);
        for _ in 0..self.samples_per_tick {
            self.buffer.push(self.source.read());
        }

        let features = match self.extractor.compute(&self.buffer) {
            Ok(features) => features,
            Err(err) => {
                self.not_ready_ticks = self.not_ready_ticks.saturating_add(1);
                debug!(tick = self.ticks, error = %err, "Feature window not ready");
                return TickReport {
                    tick: self.ticks,
                    features: None,
                    score: None,
                    model_hit: false,
                    rule_hit: None,
                    anomaly: false,
                    transition: None,
                    state: self.fdir.state(),
                };
            }
        };

        let verdict = self.scorer.classify(&features);
        let rule_hit = self.rules.evaluate(&features);
        let anomaly = verdict.model_hit || rule_hit.is_some();
        if anomaly {
            self.anomalous_ticks = self.anomalous_ticks.saturating_add(1);
            debug!(
                tick = self.ticks,
                score = verdict.score.value,
                model_hit = verdict.model_hit,
                rule = ?rule_hit,
                "Anomalous tick"
            );
        }

        let input = FdirInput {
            anomaly,
            features,
            score: verdict.score.value,
        };
        let transition = self.fdir.step(now, &input, &mut self.actuator);

        TickReport {
            tick: self.ticks,
            features: Some(features),
            score: Some(verdict.score),
            model_hit: verdict.model_hit,
            rule_hit,
            anomaly,
            transition,
            state: self.fdir.state(),
        }
    }

    /// Power-on reset: empty buffer, fresh FDIR context, zeroed tick counters.
    ///
    /// FDIR metrics are kept. Unpowered lines are soft-restarted so the
    /// load is on again in `Normal`.
    pub fn reset(&mut self) {
        self.buffer.reset();
        self.fdir.reset(&mut self.actuator);
        self.ticks = 0;
        self.not_ready_ticks = 0;
        self.anomalous_ticks = 0;
    }

    /// Current FDIR state.
    pub fn state(&self) -> FdirState {
        self.fdir.state()
    }

    /// FDIR controller.
    pub fn fdir(&self) -> &FdirController {
        &self.fdir
    }

    /// Loaded scorer.
    pub fn scorer(&self) -> &AnomalyScorer {
        &self.scorer
    }

    /// Sample buffer.
    pub fn buffer(&self) -> &SampleRingBuffer {
        &self.buffer
    }

    /// Power actuator.
    pub fn actuator(&self) -> &A {
        &self.actuator
    }

    /// Sample source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Ticks run.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Ticks skipped because the window was not yet filled.
    pub fn not_ready_ticks(&self) -> u64 {
        self.not_ready_ticks
    }

    /// Ticks classified anomalous.
    pub fn anomalous_ticks(&self) -> u64 {
        self.anomalous_ticks
    }
}

/// Totals reported when the loop stops.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    /// Ticks run.
    pub ticks: u64,
    /// Ticks skipped while the buffer filled.
    pub not_ready_ticks: u64,
    /// Ticks classified anomalous.
    pub anomalous_ticks: u64,
    /// FDIR transitions taken.
    pub transitions: u64,
    /// FDIR state at exit.
    pub final_state: FdirState,
    /// FDIR counters.
    pub fdir: FdirMetrics,
    /// Scheduler ticks that skipped grid points.
    pub missed_ticks: u64,
    /// Worst lateness in microseconds.
    pub max_jitter_us: u64,
    /// p99 lateness in microseconds.
    pub p99_jitter_us: u64,
}

/// Drive `controller` at the scheduler cadence.
///
/// Runs `max_ticks` iterations, or forever when `None`. The scheduler is
/// re-anchored on entry, so setup time before the call is not counted as
/// missed ticks. Late ticks are counted by the scheduler and never stop
/// the loop.
///
/// # Errors
///
/// Returns an error only if the platform sleep fails.
pub fn run_loop<S, A, C>(
    controller: &mut GuardianController<S, A>,
    scheduler: &mut CadenceScheduler,
    clock: &C,
    max_ticks: Option<u64>,
) -> ServiceResult<RunSummary>
where
    S: SampleSource,
    A: PowerActuator,
    C: MonotonicClock + ?Sized,
{
    let mut transitions = 0u64;
    let mut safe_reported = false;

    scheduler.restart();
    while max_ticks.is_none_or(|limit| controller.ticks() < limit) {
        scheduler.wait_for_tick()?;
        let report = controller.tick(clock.now());
        if report.transition.is_some() {
            transitions = transitions.saturating_add(1);
        }
        if report.state == FdirState::Safe && !safe_reported {
            warn!(tick = report.tick, "Power path latched in safe state");
            safe_reported = true;
        }
    }

    let jitter = scheduler.metrics_mut();
    let summary = RunSummary {
        ticks: controller.ticks(),
        not_ready_ticks: controller.not_ready_ticks(),
        anomalous_ticks: controller.anomalous_ticks(),
        transitions,
        final_state: controller.state(),
        fdir: *controller.fdir().metrics(),
        missed_ticks: jitter.missed_ticks,
        max_jitter_us: jitter.max_jitter_ns / 1_000,
        p99_jitter_us: jitter.p99_jitter_ns() / 1_000,
    };
    info!(
        ticks = summary.ticks,
        transitions = summary.transitions,
        state = %summary.final_state,
        missed = summary.missed_ticks,
        "Control loop stopped"
    );
    Ok(summary)
}
