//! Binary entrypoint: config loading, logging setup, and command dispatch.

mod cli;
mod commands;
mod error_fmt;
mod rt;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use clap::Parser;
use eyre::WrapErr;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

use cli::{Cli, Commands, DEFAULT_CONFIG, JSON_MODE};
use stepclock_config::Config;
use stepclock_core::{CalibrateCfg, MotionControllerBuilder, MotorConfig};

fn main() {
    let code = match try_main() {
        Ok(()) => 0,
        Err(err) => {
            if JSON_MODE.get().copied().unwrap_or(false) {
                println!("{}", error_fmt::format_error_json(&err));
            } else {
                eprintln!("{}", error_fmt::humanize(&err));
            }
            error_fmt::exit_code_for_error(&err)
        }
    };
    std::process::exit(code);
}

fn try_main() -> eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);

    let cfg = load_config(&cli)?;
    // Dropped on return, which flushes any buffered file log lines.
    let _log_guard = init_logging(&cli, &cfg.logging)?;

    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let flag = Arc::clone(&shutdown);
        ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed))
            .wrap_err("install Ctrl-C handler")?;
    }

    let motor = motor_config(&cfg);
    let pauses = CalibrateCfg {
        inspect_pause_ms: cfg.calibrate.inspect_pause_ms,
        settle_pause_ms: cfg.calibrate.settle_pause_ms,
    };

    #[cfg(feature = "hardware")]
    let mut ctl = {
        use stepclock_hardware::{GpioBank, GpioInput};

        let bank = GpioBank::new(&cfg.pins.phase)?;
        let home = GpioInput::new(cfg.pins.home)?;
        let button = commands::AbortButton::new(
            GpioInput::new(cfg.pins.button)?,
            Arc::clone(&shutdown),
        );
        MotionControllerBuilder::new(bank, home, button)
            .with_config(motor)
            .with_calibrate(pauses)
            .build()?
    };

    #[cfg(not(feature = "hardware"))]
    let mut ctl = {
        use stepclock_core::StepGeometry;
        use stepclock_core::mocks::Mechanism;
        use stepclock_hardware::SimulatedInput;
        use stepclock_traits::clock::test_clock::TestClock;

        let geometry = StepGeometry::from_config(&motor)?;
        // Simulated gear train on a virtual clock, so moves are instant. The
        // home window sits at the reference and spans three minutes of face
        // travel; the train starts a quarter cycle past it.
        let window = i64::from(geometry.steps_per_hour / 20).max(1);
        let mech = Mechanism::new(
            &motor,
            i64::from(geometry.steps_per_cycle) / 4,
            Some((0, window)),
        );
        tracing::info!("no hardware support compiled in; using the simulated mechanism");
        let button =
            commands::AbortButton::new(SimulatedInput::new(true), Arc::clone(&shutdown));
        MotionControllerBuilder::new(mech.outputs(), mech.home_input(), button)
            .with_config(motor)
            .with_calibrate(pauses)
            .with_clock(Box::new(TestClock::new()))
            .build()?
    };

    match cli.cmd {
        Commands::Run {
            poll_secs,
            rt,
            rt_prio,
        } => {
            rt::setup_rt_once(rt, rt_prio);
            commands::run(&mut ctl, &shutdown, Duration::from_secs(poll_secs.max(1)))
        }
        Commands::Home => commands::home(&mut ctl),
        Commands::Calibrate => commands::calibrate(&mut ctl),
        Commands::Step { steps, speed } => commands::step(&mut ctl, steps, speed.into()),
        Commands::SelfCheck => commands::self_check(&mut ctl, cli.json),
    }
}

fn load_config(cli: &Cli) -> eyre::Result<Config> {
    match &cli.config {
        Some(path) => stepclock_config::load_path(path),
        None => {
            let default = std::path::Path::new(DEFAULT_CONFIG);
            if default.exists() {
                stepclock_config::load_path(default)
            } else {
                Ok(Config::default())
            }
        }
    }
}

fn motor_config(cfg: &Config) -> MotorConfig {
    MotorConfig {
        rapid_secs_per_rev: cfg.motor.rapid_secs_per_rev,
        full_steps_per_rev: cfg.motor.full_steps_per_rev,
        reversed: cfg.motor.reversed,
        half_stepping: cfg.motor.half_stepping,
        home_normally_open: cfg.motor.home_normally_open,
        gear_ratio: cfg.motor.gear_ratio,
        hours_per_rev: cfg.motor.hours_per_rev,
        phase_pins: cfg.pins.phase,
    }
}

/// Console logs go to stderr (pretty or JSON per `--json`); an optional
/// rotating JSON-lines file sink comes from `[logging]` in the config.
fn init_logging(
    cli: &Cli,
    logging: &stepclock_config::Logging,
) -> eyre::Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level.clone()));

    let console = if cli.json {
        fmt::layer()
            .json()
            .with_target(false)
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
            .boxed()
    };

    let mut guard = None;
    let file_layer = match &logging.file {
        Some(file) => {
            let path = std::path::Path::new(file);
            let dir = match path.parent() {
                Some(d) if !d.as_os_str().is_empty() => d,
                _ => std::path::Path::new("."),
            };
            let name = path
                .file_name()
                .map(std::ffi::OsStr::to_os_string)
                .unwrap_or_else(|| "stepclock.log".into());
            let appender = match logging.rotation.as_deref() {
                Some("daily") => tracing_appender::rolling::daily(dir, name),
                Some("hourly") => tracing_appender::rolling::hourly(dir, name),
                _ => tracing_appender::rolling::never(dir, name),
            };
            let (writer, worker_guard) = tracing_appender::non_blocking(appender);
            guard = Some(worker_guard);
            Some(fmt::layer().json().with_ansi(false).with_writer(writer))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file_layer)
        .try_init()
        .map_err(|e| eyre::eyre!("init logging: {e}"))?;
    Ok(guard)
}
