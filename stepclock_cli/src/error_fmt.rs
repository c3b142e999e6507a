//! Human-readable error descriptions and structured JSON error formatting.

use stepclock_core::{BuildError, HomingError};

/// Map an eyre::Report to a human-readable explanation with likely causes
/// and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    if let Some(he) = err.downcast_ref::<HomingError>() {
        return match he {
            HomingError::Seek { max_steps } => format!(
                "What happened: The home sensor never went active during the fast seek ({max_steps} steps, one full cycle plus an hour).\nLikely causes: Sensor unplugged or dead, wrong polarity (motor.home_normally_open), or the motor is not actually turning.\nHow to fix: Check the sensor wiring and polarity setting, verify the phase pins, then rerun `home`."
            ),
            HomingError::Backoff { max_steps } => format!(
                "What happened: The home sensor stayed active through a full hour of reverse steps ({max_steps}).\nLikely causes: Sensor stuck or shorted, polarity inverted, or the sensed mark is far too wide.\nHow to fix: Check the sensor and the motor.home_normally_open setting, then rerun `home`."
            ),
            HomingError::Approach { max_steps } => format!(
                "What happened: The home sensor did not re-activate during the slow approach ({max_steps} steps).\nLikely causes: Flaky sensor contact or a loose sensed mark that moved during backoff.\nHow to fix: Check the sensor mounting; `calibrate` helps position it.",
            ),
        };
    }

    if let Some(BuildError::InvalidConfig(msg)) = err.downcast_ref::<BuildError>() {
        return format!(
            "What happened: Invalid configuration ({msg}).\nLikely causes: Missing or out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun."
        );
    }

    // Generic fallback
    let msg = err.to_string();
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Map homing failures to stable exit codes; other errors return 1.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    if let Some(he) = err.downcast_ref::<HomingError>() {
        return match he {
            HomingError::Seek { .. } => 3,
            HomingError::Backoff { .. } => 4,
            HomingError::Approach { .. } => 5,
        };
    }
    1
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;

    if let Some(he) = err.downcast_ref::<HomingError>() {
        let (reason, max_steps) = match he {
            HomingError::Seek { max_steps } => ("HomingSeek", *max_steps),
            HomingError::Backoff { max_steps } => ("HomingBackoff", *max_steps),
            HomingError::Approach { max_steps } => ("HomingApproach", *max_steps),
        };
        return json!({
            "reason": reason,
            "details": { "max_steps": max_steps },
            "message": humanize(err),
        })
        .to_string();
    }

    json!({ "reason": "Error", "message": humanize(err) }).to_string()
}
