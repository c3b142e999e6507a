//! Motor configuration and the step geometry derived from it.
//!
//! All derived quantities are required to be exact integers: a gear train
//! whose steps-per-hour or steps-per-cycle computation leaves a remainder
//! would accumulate indicator drift over a day, so such configurations are
//! rejected at build time instead of silently truncated.

use crate::error::BuildError;

pub const MINUTES_PER_HOUR: i32 = 60;
pub const HOURS_PER_CYCLE: i32 = 12;
/// Minutes in one full traversal of the 12-hour face.
pub const MINUTES_PER_CYCLE: i32 = MINUTES_PER_HOUR * HOURS_PER_CYCLE;

/// Coil drive lines on a unipolar stepper such as the 28BYJ-48.
pub const NUM_PHASE_PINS: usize = 4;

const MICROS_PER_SEC: u64 = 1_000_000;

/// Immutable description of the motor, gear train, and home sensor wiring.
#[derive(Debug, Clone)]
pub struct MotorConfig {
    /// Seconds for one output-shaft revolution at full speed. For the
    /// 28BYJ-48 a good range is 6 to 10.
    pub rapid_secs_per_rev: u32,
    /// Full steps per output-shaft revolution (2048 for the 28BYJ-48).
    pub full_steps_per_rev: u32,
    /// True if a positive step count turns the mechanism counterclockwise;
    /// reverses the phase pin order.
    pub reversed: bool,
    /// Half stepping doubles the per-revolution step count using blended
    /// phase patterns.
    pub half_stepping: bool,
    /// True for a normally-open home sensor, false for normally-closed.
    pub home_normally_open: bool,
    /// External reduction ratio between motor shaft and indicator.
    pub gear_ratio: u32,
    /// Hours of indicated time per mechanical revolution of the indicator.
    pub hours_per_rev: u32,
    /// Output line indices driving the four coil phases, in phase order.
    pub phase_pins: [u8; NUM_PHASE_PINS],
}

impl Default for MotorConfig {
    fn default() -> Self {
        Self {
            rapid_secs_per_rev: 8,
            full_steps_per_rev: 2048,
            reversed: false,
            half_stepping: true,
            home_normally_open: true,
            gear_ratio: 4,
            hours_per_rev: 4,
            phase_pins: [19, 16, 17, 21],
        }
    }
}

/// Pauses used by the operator-assist calibration loop.
#[derive(Debug, Clone, Copy)]
pub struct CalibrateCfg {
    /// Pause after each homing pass for inspection of the sensor position.
    pub inspect_pause_ms: u64,
    /// Pause after the one-hour reverse move before homing again.
    pub settle_pause_ms: u64,
}

impl Default for CalibrateCfg {
    fn default() -> Self {
        Self {
            inspect_pause_ms: 10_000,
            settle_pause_ms: 500,
        }
    }
}

/// Integer step quantities derived from a validated `MotorConfig`.
#[derive(Debug, Clone, Copy)]
pub struct StepGeometry {
    /// Discrete steps per output-shaft revolution (doubled when half stepping).
    pub steps_per_rev: u32,
    /// Steps per indicated hour.
    pub steps_per_hour: u32,
    /// Steps per full 12-hour traversal of the face.
    pub steps_per_cycle: i32,
    /// Phase hold time at full speed, in microseconds.
    pub rapid_delay_us: u64,
}

impl StepGeometry {
    /// Derive the geometry, rejecting any configuration whose step counts
    /// would not come out exact.
    pub fn from_config(cfg: &MotorConfig) -> std::result::Result<Self, BuildError> {
        if cfg.rapid_secs_per_rev == 0 {
            return Err(BuildError::InvalidConfig("rapid_secs_per_rev must be > 0"));
        }
        if cfg.full_steps_per_rev == 0 {
            return Err(BuildError::InvalidConfig("full_steps_per_rev must be > 0"));
        }
        if cfg.gear_ratio == 0 {
            return Err(BuildError::InvalidConfig("gear_ratio must be > 0"));
        }
        if cfg.hours_per_rev == 0 || cfg.hours_per_rev > HOURS_PER_CYCLE as u32 {
            return Err(BuildError::InvalidConfig(
                "hours_per_rev must be in 1..=12",
            ));
        }

        let steps_per_rev = cfg.full_steps_per_rev * if cfg.half_stepping { 2 } else { 1 };

        let steps_per_gear_rev = u64::from(steps_per_rev) * u64::from(cfg.gear_ratio);
        if steps_per_gear_rev % u64::from(cfg.hours_per_rev) != 0 {
            return Err(BuildError::InvalidConfig(
                "steps per hour is not an exact integer for this gear train",
            ));
        }
        let steps_per_hour = steps_per_gear_rev / u64::from(cfg.hours_per_rev);

        let steps_per_cycle = steps_per_hour * HOURS_PER_CYCLE as u64;
        if steps_per_cycle > i32::MAX as u64 {
            return Err(BuildError::InvalidConfig("steps per cycle overflows i32"));
        }

        let rapid_delay_us = MICROS_PER_SEC * u64::from(cfg.rapid_secs_per_rev)
            / u64::from(steps_per_rev);
        if rapid_delay_us == 0 {
            return Err(BuildError::InvalidConfig(
                "rapid pulse width rounds to zero microseconds",
            ));
        }

        Ok(Self {
            steps_per_rev,
            steps_per_hour: steps_per_hour as u32,
            steps_per_cycle: steps_per_cycle as i32,
            rapid_delay_us,
        })
    }
}
