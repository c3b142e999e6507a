//! Test and helper mocks for stepclock_core.
//!
//! `Mechanism` simulates the physical gear train: it decodes motion from the
//! phase masks the driver emits, integrates an absolute step position, and
//! exposes a window-based home sensor. This lets homing and mapper tests run
//! the real pulse path end to end without hardware.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use stepclock_traits::{DigitalInput, PhaseOutputs};

use crate::config::MotorConfig;
use crate::phase::PhaseSequence;

/// Output event captured by `RecordingBank`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BankEvent {
    Energize(u32),
    Clear(u32),
}

/// Phase output bank that records every mask it is handed.
#[derive(Default, Clone)]
pub struct RecordingBank {
    events: Rc<RefCell<Vec<BankEvent>>>,
}

impl RecordingBank {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<BankEvent> {
        self.events.borrow().clone()
    }

    pub fn energized_masks(&self) -> Vec<u32> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                BankEvent::Energize(m) => Some(*m),
                BankEvent::Clear(_) => None,
            })
            .collect()
    }
}

impl PhaseOutputs for RecordingBank {
    fn energize(&mut self, mask: u32) {
        self.events.borrow_mut().push(BankEvent::Energize(mask));
    }
    fn clear(&mut self, mask: u32) {
        self.events.borrow_mut().push(BankEvent::Clear(mask));
    }
}

/// Input pinned to a fixed level.
#[derive(Debug, Clone, Copy)]
pub struct ConstLevel(pub bool);

impl DigitalInput for ConstLevel {
    fn is_high(&mut self) -> bool {
        self.0
    }
}

/// Input backed by a shared flag, flippable from the test body.
#[derive(Default, Clone)]
pub struct SharedLevel(Rc<Cell<bool>>);

impl SharedLevel {
    pub fn new(level: bool) -> Self {
        Self(Rc::new(Cell::new(level)))
    }

    pub fn set(&self, level: bool) {
        self.0.set(level);
    }
}

impl DigitalInput for SharedLevel {
    fn is_high(&mut self) -> bool {
        self.0.get()
    }
}

/// Input driven by a closure, for scripted sensor behavior.
pub struct FnLevel<F: FnMut() -> bool>(pub F);

impl<F: FnMut() -> bool> DigitalInput for FnLevel<F> {
    fn is_high(&mut self) -> bool {
        (self.0)()
    }
}

struct MechanismState {
    sequence: PhaseSequence,
    prev_phase: usize,
    /// Absolute position in steps, unbounded (not wrapped).
    position: i64,
    steps_per_cycle: i64,
    /// Cycle-space window `[start, end)` within which the home sensor is
    /// active; `None` models a dead sensor.
    home_window: Option<(i64, i64)>,
    home_normally_open: bool,
}

impl MechanismState {
    fn sensor_active(&self) -> bool {
        let Some((start, end)) = self.home_window else {
            return false;
        };
        let pos = self.position.rem_euclid(self.steps_per_cycle);
        pos >= start && pos < end
    }
}

/// Shared simulated gear train. Clone handles implement the hardware traits.
#[derive(Clone)]
pub struct Mechanism {
    state: Rc<RefCell<MechanismState>>,
}

impl Mechanism {
    /// `home_window` is in cycle-space steps; `start_position` may be any
    /// (possibly negative) absolute step count.
    pub fn new(cfg: &MotorConfig, start_position: i64, home_window: Option<(i64, i64)>) -> Self {
        let sequence =
            PhaseSequence::from_config(cfg).unwrap_or_else(|e| panic!("mechanism config: {e}"));
        let geometry = crate::config::StepGeometry::from_config(cfg)
            .unwrap_or_else(|e| panic!("mechanism config: {e}"));
        Self {
            state: Rc::new(RefCell::new(MechanismState {
                sequence,
                // The driver starts at phase index 0.
                prev_phase: 0,
                position: start_position,
                steps_per_cycle: i64::from(geometry.steps_per_cycle),
                home_window,
                home_normally_open: cfg.home_normally_open,
            })),
        }
    }

    /// Absolute integrated position in steps.
    pub fn position(&self) -> i64 {
        self.state.borrow().position
    }

    /// Position wrapped into `[0, steps_per_cycle)`.
    pub fn cycle_position(&self) -> i64 {
        let s = self.state.borrow();
        s.position.rem_euclid(s.steps_per_cycle)
    }

    pub fn sensor_active(&self) -> bool {
        self.state.borrow().sensor_active()
    }

    /// Handle implementing `PhaseOutputs` for the driver under test.
    pub fn outputs(&self) -> MechanismOutputs {
        MechanismOutputs {
            state: Rc::clone(&self.state),
        }
    }

    /// Handle implementing `DigitalInput` with the configured sensor
    /// polarity applied at the electrical level.
    pub fn home_input(&self) -> MechanismHome {
        MechanismHome {
            state: Rc::clone(&self.state),
        }
    }
}

/// Decodes each energized mask back to a phase index and integrates motion.
pub struct MechanismOutputs {
    state: Rc<RefCell<MechanismState>>,
}

impl PhaseOutputs for MechanismOutputs {
    fn energize(&mut self, mask: u32) {
        let mut s = self.state.borrow_mut();
        let Some(idx) = s.sequence.position_of(mask) else {
            panic!("energized mask {mask:#b} is not a phase pattern");
        };
        let n = s.sequence.len();
        let delta = (idx + n - s.prev_phase) % n;
        match delta {
            1 => s.position += 1,
            d if d == n - 1 => s.position -= 1,
            other => panic!("non-adjacent phase transition (delta {other})"),
        }
        s.prev_phase = idx;
    }

    fn clear(&mut self, _mask: u32) {}
}

/// Raw home sensor line: a pulled-up normally-open sensor reads low while on
/// the mark, a normally-closed one reads high.
pub struct MechanismHome {
    state: Rc<RefCell<MechanismState>>,
}

impl DigitalInput for MechanismHome {
    fn is_high(&mut self) -> bool {
        let s = self.state.borrow();
        s.sensor_active() != s.home_normally_open
    }
}
