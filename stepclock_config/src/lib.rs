#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! TOML config schema for the clock driver.
//!
//! `Config` and sub-structs are deserialized from TOML and validated. The
//! schema deals in wiring and mechanics only; the core crate derives step
//! geometry from it and applies its own exactness checks on top.
use serde::Deserialize;

/// BCM line assignments. Four coil phase lines plus two inputs.
#[derive(Debug, Deserialize, Clone)]
pub struct Pins {
    /// Coil drive lines in phase order.
    pub phase: [u8; 4],
    /// Home position sensor input.
    pub home: u8,
    /// Calibration / abort pushbutton input (pulled up, pressed reads low).
    pub button: u8,
}

impl Default for Pins {
    fn default() -> Self {
        Self {
            phase: [19, 16, 17, 21],
            home: 20,
            button: 26,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MotorCfg {
    /// Seconds for one output-shaft revolution at full speed.
    pub rapid_secs_per_rev: u32,
    /// Full steps per output-shaft revolution (2048 for the 28BYJ-48).
    pub full_steps_per_rev: u32,
    /// Reverse the rotation direction by reversing the phase pin order.
    pub reversed: bool,
    /// Half stepping doubles resolution using blended phase patterns.
    pub half_stepping: bool,
    /// True for a normally-open home sensor, false for normally-closed.
    pub home_normally_open: bool,
    /// External reduction ratio between motor shaft and indicator.
    pub gear_ratio: u32,
    /// Hours of indicated time per revolution of the indicator.
    pub hours_per_rev: u32,
}

impl Default for MotorCfg {
    fn default() -> Self {
        Self {
            rapid_secs_per_rev: 8,
            full_steps_per_rev: 2048,
            reversed: false,
            half_stepping: true,
            home_normally_open: true,
            gear_ratio: 4,
            hours_per_rev: 4,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct CalibratePauses {
    /// Pause after each homing pass for sensor inspection (ms).
    pub inspect_pause_ms: u64,
    /// Pause after the one-hour reverse move before homing again (ms).
    pub settle_pause_ms: u64,
}

impl Default for CalibratePauses {
    fn default() -> Self {
        Self {
            inspect_pause_ms: 10_000,
            settle_pause_ms: 500,
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct Config {
    pub pins: Pins,
    pub motor: MotorCfg,
    pub calibrate: CalibratePauses,
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

pub fn load_path(path: &std::path::Path) -> eyre::Result<Config> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("read config {:?}: {}", path, e))?;
    let cfg = load_toml(&text).map_err(|e| eyre::eyre!("parse config {:?}: {}", path, e))?;
    cfg.validate()?;
    Ok(cfg)
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Pins: the output bank is a 32-bit mask, and no line may be shared.
        let mut all = self.pins.phase.to_vec();
        all.push(self.pins.home);
        all.push(self.pins.button);
        for &p in &all {
            if p >= 32 {
                eyre::bail!("pin {} out of range (bank lines are 0..=31)", p);
            }
        }
        let mut sorted = all.clone();
        sorted.sort_unstable();
        sorted.dedup();
        if sorted.len() != all.len() {
            eyre::bail!("pin assignments must be distinct");
        }

        // Motor
        if self.motor.rapid_secs_per_rev == 0 {
            eyre::bail!("motor.rapid_secs_per_rev must be > 0");
        }
        if self.motor.full_steps_per_rev == 0 {
            eyre::bail!("motor.full_steps_per_rev must be > 0");
        }
        if self.motor.gear_ratio == 0 {
            eyre::bail!("motor.gear_ratio must be > 0");
        }
        if self.motor.hours_per_rev == 0 || self.motor.hours_per_rev > 12 {
            eyre::bail!("motor.hours_per_rev must be in 1..=12");
        }

        // Calibrate
        if self.calibrate.inspect_pause_ms > 5 * 60 * 1000 {
            eyre::bail!("calibrate.inspect_pause_ms is unreasonably large (>5min)");
        }

        // Logging
        if let Some(level) = self.logging.level.as_deref()
            && !matches!(level, "trace" | "debug" | "info" | "warn" | "error")
        {
            eyre::bail!("logging.level must be one of trace|debug|info|warn|error");
        }
        if let Some(rot) = self.logging.rotation.as_deref()
            && !matches!(rot, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly");
        }

        Ok(())
    }
}
