//! Mock time source and power actuator.
//!
//! Both mocks share their state between clones, so a test can hand one copy
//! to the code under test and keep another to drive or inspect it.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use guardian_fdir::{ActuatorError, ActuatorResult, MonotonicClock, PowerActuator};

/// Clock that only moves when told to.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
}

impl ManualClock {
    /// Clock at timeline position zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clock starting at `start`.
    pub fn starting_at(start: Duration) -> Self {
        Self {
            now: Rc::new(Cell::new(start)),
        }
    }

    /// Move forward by `delta`.
    pub fn advance(&self, delta: Duration) {
        self.now.set(self.now.get().saturating_add(delta));
    }

    /// Move forward by `ms` milliseconds.
    pub fn advance_ms(&self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }

    /// Jump to an absolute position.
    pub fn set(&self, now: Duration) {
        self.now.set(now);
    }
}

impl MonotonicClock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

/// Command received by a [`RecordingActuator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorAction {
    /// `init()` was called.
    Init,
    /// `cut()` was called.
    Cut,
    /// `soft_restart()` was called.
    SoftRestart,
}

#[derive(Debug, Default)]
struct RecorderState {
    actions: Vec<ActuatorAction>,
    powered: bool,
    fail_init: bool,
    fail_commands: bool,
}

/// Actuator that records every command and can be told to fail.
#[derive(Debug, Clone, Default)]
pub struct RecordingActuator {
    state: Rc<RefCell<RecorderState>>,
}

impl RecordingActuator {
    /// Actuator whose commands all succeed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Actuator whose `init()` fails.
    pub fn failing_init() -> Self {
        let actuator = Self::new();
        actuator.state.borrow_mut().fail_init = true;
        actuator
    }

    /// Actuator whose `cut()` and `soft_restart()` fail after recording.
    pub fn failing_commands() -> Self {
        let actuator = Self::new();
        actuator.state.borrow_mut().fail_commands = true;
        actuator
    }

    /// All commands received so far, in order.
    pub fn actions(&self) -> Vec<ActuatorAction> {
        self.state.borrow().actions.clone()
    }

    /// Number of times `action` was received.
    pub fn count(&self, action: ActuatorAction) -> usize {
        self.state
            .borrow()
            .actions
            .iter()
            .filter(|a| **a == action)
            .count()
    }

    /// Forget recorded commands.
    pub fn clear(&self) {
        self.state.borrow_mut().actions.clear();
    }

    fn record(&self, action: ActuatorAction, powered: bool) -> ActuatorResult<()> {
        let mut state = self.state.borrow_mut();
        state.actions.push(action);
        if state.fail_commands {
            return Err(ActuatorError::line_fault("mock", "injected failure"));
        }
        state.powered = powered;
        Ok(())
    }
}

impl PowerActuator for RecordingActuator {
    fn init(&mut self) -> ActuatorResult<()> {
        let mut state = self.state.borrow_mut();
        state.actions.push(ActuatorAction::Init);
        if state.fail_init {
            return Err(ActuatorError::init_failed("injected init failure"));
        }
        state.powered = true;
        Ok(())
    }

    fn cut(&mut self) -> ActuatorResult<()> {
        self.record(ActuatorAction::Cut, false)
    }

    fn soft_restart(&mut self) -> ActuatorResult<()> {
        self.record(ActuatorAction::SoftRestart, true)
    }

    fn is_powered(&self) -> bool {
        self.state.borrow().powered
    }
}
