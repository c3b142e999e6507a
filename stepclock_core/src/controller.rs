//! Motion controller: homing state machine and time-to-position mapping.

use std::sync::Arc;
use std::time::Duration;

use stepclock_traits::{Clock, DigitalInput, PhaseOutputs};

use crate::config::{CalibrateCfg, MINUTES_PER_CYCLE, StepGeometry};
use crate::driver::PhaseDriver;
use crate::error::{HomingError, HomingOutcome};
use crate::types::{StepCommand, StepSpeed, WallTime};

/// Minimal signed delta from `last` to `target` on a cyclic space of `cycle`
/// steps. The result never exceeds half a cycle in either direction; a delta
/// of exactly half a cycle is left forward (tie rule).
#[inline]
pub fn shortest_cycle_delta(target: i32, last: i32, cycle: i32) -> i32 {
    let mut delta = target - last;
    if delta > cycle / 2 {
        delta -= cycle;
    } else if delta < -(cycle / 2) {
        delta += cycle;
    }
    delta
}

/// Phases of the homing sequence, entered in fixed order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HomingPhase {
    /// Fast clockwise until the sensor reports active.
    Seek,
    /// Fast counterclockwise until the sensor releases.
    Backoff,
    /// Slow clockwise until the sensor re-activates.
    Approach,
}

/// Single-axis controller that keeps a 12-hour indicator aligned with wall
/// time.
///
/// Owns the phase driver (composition, not inheritance: the board capability
/// objects are held, never derived from) plus the cyclic position state.
/// Callers must serialize access; a move blocks until the pulse train
/// completes.
pub struct MotionController<O, H, B>
where
    O: PhaseOutputs,
    H: DigitalInput,
    B: DigitalInput,
{
    driver: PhaseDriver<O>,
    home_sensor: H,
    button: B,
    geometry: StepGeometry,
    invert_home: bool,
    calibrate: CalibrateCfg,
    clock: Arc<dyn Clock + Send + Sync>,
    /// Last commanded absolute position within one 12-hour cycle, in steps.
    last_step_pos: i32,
    /// Last applied time as minutes since 12:00.
    last_minutes: i32,
}

impl<O, H, B> MotionController<O, H, B>
where
    O: PhaseOutputs,
    H: DigitalInput,
    B: DigitalInput,
{
    pub(crate) fn from_parts(
        driver: PhaseDriver<O>,
        home_sensor: H,
        button: B,
        geometry: StepGeometry,
        invert_home: bool,
        calibrate: CalibrateCfg,
        clock: Arc<dyn Clock + Send + Sync>,
    ) -> Self {
        Self {
            driver,
            home_sensor,
            button,
            geometry,
            invert_home,
            calibrate,
            clock,
            last_step_pos: 0,
            last_minutes: 0,
        }
    }

    /// Step geometry this controller was built with.
    #[inline]
    pub fn geometry(&self) -> StepGeometry {
        self.geometry
    }

    /// Last commanded position in steps, within one cycle.
    #[inline]
    pub fn last_position(&self) -> i32 {
        self.last_step_pos
    }

    /// Last applied minutes-since-noon value.
    #[inline]
    pub fn last_minutes(&self) -> i32 {
        self.last_minutes
    }

    /// Current phase index of the underlying driver.
    #[inline]
    pub fn phase_index(&self) -> usize {
        self.driver.phase_index()
    }

    /// Direct motion primitive; positive is clockwise.
    #[inline]
    pub fn step(&mut self, steps: i32, speed: StepSpeed) {
        self.driver.step(steps, speed);
    }

    /// De-energize the motor.
    #[inline]
    pub fn release(&mut self) {
        self.driver.release();
    }

    /// Home sensor state with the configured polarity applied, so the same
    /// logic serves normally-open and normally-closed wiring.
    #[inline]
    pub fn is_home(&mut self) -> bool {
        self.home_sensor.is_high() ^ self.invert_home
    }

    /// Pushbutton / abort input; the line is pulled up, pressed reads low.
    #[inline]
    pub fn is_button_pressed(&mut self) -> bool {
        !self.button.is_high()
    }

    /// Drive the indicator to the absolute 12:00 reference.
    ///
    /// Seek fast clockwise onto the sensor, back off counterclockwise until
    /// it releases, then re-approach slowly clockwise. The final detection is
    /// therefore always the same physical edge reached from the same
    /// direction at the same speed, which cancels backlash and sensor
    /// hysteresis. Every phase is bounded by step count, not wall time.
    ///
    /// On success the position reference is redefined: last position and last
    /// minutes are zeroed. On any error prior tracking is left untouched;
    /// stale-but-plausible state beats zeroing against an unverified
    /// reference.
    pub fn home(&mut self) -> HomingOutcome {
        tracing::info!("homing to 12:00 reference");

        let seek_bound = self.geometry.steps_per_cycle as u32 + self.geometry.steps_per_hour;
        self.run_homing_phase(HomingPhase::Seek, seek_bound)?;

        let hour_bound = self.geometry.steps_per_hour;
        self.run_homing_phase(HomingPhase::Backoff, hour_bound)?;
        self.run_homing_phase(HomingPhase::Approach, hour_bound)?;

        self.last_step_pos = 0;
        self.last_minutes = 0;
        tracing::info!("homing complete");
        Ok(())
    }

    /// One bounded phase of the homing sequence. A phase that uses up its
    /// whole step budget fails even if the sensor flips on the final boundary
    /// check.
    fn run_homing_phase(&mut self, phase: HomingPhase, max_steps: u32) -> HomingOutcome {
        let (steps, speed) = match phase {
            HomingPhase::Seek => (1, StepSpeed::Fast),
            HomingPhase::Backoff => (-1, StepSpeed::Fast),
            HomingPhase::Approach => (1, StepSpeed::Slow),
        };
        // Seek and Approach run while the sensor is inactive; Backoff runs
        // while it is still active.
        let sensor_target = matches!(phase, HomingPhase::Backoff);

        let mut taken = 0u32;
        while self.is_home() == sensor_target && taken < max_steps {
            self.driver.step(steps, speed);
            taken += 1;
        }
        if taken >= max_steps {
            let err = match phase {
                HomingPhase::Seek => HomingError::Seek { max_steps },
                HomingPhase::Backoff => HomingError::Backoff { max_steps },
                HomingPhase::Approach => HomingError::Approach { max_steps },
            };
            tracing::error!(?phase, taken, "homing phase exhausted its step budget");
            return Err(err);
        }
        tracing::debug!(?phase, taken, "homing phase complete");
        Ok(())
    }

    /// Align the indicator with the given wall time, taking the shortest
    /// rotational path. Idempotent within a minute: repeated calls with the
    /// same time issue no motion. Assumes the mechanism was homed at some
    /// point; the position reference is only meaningful post-homing.
    pub fn update_clock(&mut self, time: WallTime) {
        let minutes = time.minutes_since_noon();
        if minutes == self.last_minutes {
            return;
        }
        self.last_minutes = minutes;

        let cycle = self.geometry.steps_per_cycle;
        let target =
            ((i64::from(minutes) * i64::from(cycle)) / i64::from(MINUTES_PER_CYCLE)) as i32;

        // The mechanism has no wrap stop, so always take the shorter
        // rotational path.
        let delta = shortest_cycle_delta(target, self.last_step_pos, cycle);

        tracing::debug!(minutes, target, delta, pos = self.last_step_pos, "clock update");
        self.driver.apply(StepCommand::auto(delta));

        // Truncated remainder; a transiently negative position cancels out
        // on the next correction.
        self.last_step_pos = (self.last_step_pos + delta) % cycle;
    }

    /// Operator-assist loop for adjusting the home sensor position: home,
    /// pause for inspection, back up one hour, repeat until the button is
    /// pressed. Abort is polled between sub-steps only; a move in flight is
    /// not interruptible.
    ///
    /// Homing failures are logged and the loop continues; calibration is a
    /// diagnostic aid, not a production path.
    pub fn calibrate(&mut self) {
        tracing::info!("calibration loop started");
        while !self.is_button_pressed() {
            if let Err(e) = self.home() {
                tracing::warn!(error = %e, "homing failed during calibration");
            }
            if self.is_button_pressed() {
                break;
            }
            self.clock
                .sleep(Duration::from_millis(self.calibrate.inspect_pause_ms));
            if self.is_button_pressed() {
                break;
            }
            self.driver
                .step(-(self.geometry.steps_per_hour as i32), StepSpeed::Fast);
            if self.is_button_pressed() {
                break;
            }
            self.clock
                .sleep(Duration::from_millis(self.calibrate.settle_pause_ms));
        }
        tracing::info!("calibration loop finished");
    }
}
