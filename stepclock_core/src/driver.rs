//! Timed phase-energization pulse generator.

use std::sync::Arc;
use std::time::Duration;

use stepclock_traits::{Clock, PhaseOutputs};

use crate::phase::PhaseSequence;
use crate::types::{StepCommand, StepSpeed};

/// Steps from the start (or end) of a move inside which `Auto` speed adds one
/// extra base-width delay each. Nested thresholds taper the ramp: a step in
/// the first 5 accrues all three extras.
const RAMP_THRESHOLDS: [i32; 3] = [20, 10, 5];

/// Owns the phase output bank and converts signed step counts into a timed
/// pulse train.
///
/// The current phase index persists across calls, so consecutive moves
/// continue the physical coil sequence and the motor position stays
/// consistent with the index modulo the phase count.
pub struct PhaseDriver<O: PhaseOutputs> {
    outputs: O,
    sequence: PhaseSequence,
    phase: usize,
    rapid_delay_us: u64,
    clock: Arc<dyn Clock + Send + Sync>,
}

impl<O: PhaseOutputs> std::fmt::Debug for PhaseDriver<O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhaseDriver")
            .field("phase", &self.phase)
            .field("phases", &self.sequence.len())
            .field("rapid_delay_us", &self.rapid_delay_us)
            .finish()
    }
}

impl<O: PhaseOutputs> PhaseDriver<O> {
    pub fn new(
        outputs: O,
        sequence: PhaseSequence,
        rapid_delay_us: u64,
        clock: Arc<dyn Clock + Send + Sync>,
    ) -> Self {
        Self {
            outputs,
            sequence,
            phase: 0,
            rapid_delay_us,
            clock,
        }
    }

    /// Current phase index, modulo the phase count.
    #[inline]
    pub fn phase_index(&self) -> usize {
        self.phase
    }

    /// Execute a move. Positive counts advance clockwise through the phase
    /// order, negative counts reverse. A zero count de-energizes every phase
    /// pin and issues no pulses.
    ///
    /// Output is pulsed, not held: each step energizes exactly the pins of
    /// the new phase, holds for the profile's delay, then clears all phase
    /// pins. Clearing before the hold completes loses steps.
    pub fn step(&mut self, steps: i32, speed: StepSpeed) {
        if steps == 0 {
            self.outputs.clear(self.sequence.clear_mask());
            return;
        }

        tracing::trace!(steps, ?speed, "stepper move");

        let phases = self.sequence.len();
        // Modular increment selects direction: +1 forward, +(n-1) reverse.
        let delta = if steps > 0 { 1 } else { phases - 1 };
        let abs_steps = steps.unsigned_abs() as i32;
        let hold = Duration::from_micros(self.rapid_delay_us);

        for j in 0..abs_steps {
            self.phase = (self.phase + delta) % phases;
            self.outputs.energize(self.sequence.mask(self.phase));

            self.clock.sleep(hold);
            match speed {
                StepSpeed::Fast => {}
                StepSpeed::Slow => self.clock.sleep(hold * 4),
                StepSpeed::Auto => {
                    for t in RAMP_THRESHOLDS {
                        if j < t {
                            self.clock.sleep(hold); // acceleration
                        }
                    }
                    for t in RAMP_THRESHOLDS {
                        if abs_steps - j < t {
                            self.clock.sleep(hold); // deceleration
                        }
                    }
                }
            }

            self.outputs.clear(self.sequence.clear_mask());
        }
    }

    /// Execute a prepared command.
    #[inline]
    pub fn apply(&mut self, cmd: StepCommand) {
        self.step(cmd.steps, cmd.speed);
    }

    /// De-energize every phase pin (coast/idle).
    #[inline]
    pub fn release(&mut self) {
        self.outputs.clear(self.sequence.clear_mask());
    }
}
