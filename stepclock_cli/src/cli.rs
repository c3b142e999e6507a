//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::OnceLock;

use stepclock_core::StepSpeed;

/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "stepclock", version, about = "Stepper clock driver CLI")]
pub struct Cli {
    /// Path to config TOML; built-in defaults are used when the default path
    /// does not exist
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log as JSON lines instead of pretty
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace)
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    pub log_level: String,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

/// Default config location when `--config` is not given.
pub const DEFAULT_CONFIG: &str = "etc/stepclock.toml";

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum SpeedArg {
    /// Five times the base phase hold, for precise positioning
    Slow,
    /// Base phase hold throughout
    Fast,
    /// Base hold with acceleration/deceleration ramps near both ends
    Auto,
}

impl From<SpeedArg> for StepSpeed {
    fn from(s: SpeedArg) -> Self {
        match s {
            SpeedArg::Slow => StepSpeed::Slow,
            SpeedArg::Fast => StepSpeed::Fast,
            SpeedArg::Auto => StepSpeed::Auto,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Home, then keep the indicator aligned with local wall time
    Run {
        /// Seconds between wall clock checks
        #[arg(long, value_name = "SECS", default_value_t = 10)]
        poll_secs: u64,
        /// Enable real-time mode (SCHED_FIFO, mlockall)
        #[arg(
            long,
            action = ArgAction::SetTrue,
            long_help = "Enable real-time mode on Linux: attempts SCHED_FIFO priority and calls mlockall(MCL_CURRENT|MCL_FUTURE) so pulse timing does not stall on page faults. May require elevated privileges (CAP_SYS_NICE, memlock ulimit)."
        )]
        rt: bool,
        /// SCHED_FIFO priority on Linux (1..=max); defaults to the platform maximum
        #[arg(long, value_name = "PRIO")]
        rt_prio: Option<i32>,
    },
    /// Drive the indicator to the 12:00 reference and exit
    Home,
    /// Operator-assist loop for adjusting the home sensor position
    Calibrate,
    /// Execute a raw move and release the motor
    Step {
        /// Step count; negative runs counterclockwise
        #[arg(long, allow_hyphen_values = true)]
        steps: i32,
        /// Speed profile
        #[arg(long, value_enum, default_value_t = SpeedArg::Auto)]
        speed: SpeedArg,
    },
    /// Quick health check (hardware presence / sim ok)
    SelfCheck,
}
