//! Command execution over an assembled controller.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::Timelike;

use stepclock_core::{MotionController, StepSpeed, WallTime};
use stepclock_traits::{DigitalInput, PhaseOutputs};

/// Wraps the abort/calibrate button so a Ctrl-C reads as a press. The line
/// is pulled up, so pressed means low.
pub struct AbortButton<B: DigitalInput> {
    inner: B,
    shutdown: Arc<AtomicBool>,
}

impl<B: DigitalInput> AbortButton<B> {
    pub fn new(inner: B, shutdown: Arc<AtomicBool>) -> Self {
        Self { inner, shutdown }
    }
}

impl<B: DigitalInput> DigitalInput for AbortButton<B> {
    fn is_high(&mut self) -> bool {
        !self.shutdown.load(Ordering::Relaxed) && self.inner.is_high()
    }
}

/// Current local time as a clock face position.
fn local_wall_time() -> WallTime {
    let now = chrono::Local::now();
    WallTime::new(now.hour() as u8, now.minute() as u8)
}

/// Home once, then keep the indicator aligned with local wall time until
/// shutdown is requested.
pub fn run<O, H, B>(
    ctl: &mut MotionController<O, H, B>,
    shutdown: &Arc<AtomicBool>,
    poll: Duration,
) -> eyre::Result<()>
where
    O: PhaseOutputs,
    H: DigitalInput,
    B: DigitalInput,
{
    ctl.home()?;
    tracing::info!(poll_secs = poll.as_secs(), "tracking wall time");
    while !shutdown.load(Ordering::Relaxed) {
        ctl.update_clock(local_wall_time());
        // Sleep in short slices so Ctrl-C is honored promptly.
        let mut left = poll;
        while !shutdown.load(Ordering::Relaxed) && left > Duration::ZERO {
            let slice = left.min(Duration::from_millis(200));
            std::thread::sleep(slice);
            left -= slice;
        }
    }
    ctl.release();
    tracing::info!("run loop stopped");
    Ok(())
}

pub fn home<O, H, B>(ctl: &mut MotionController<O, H, B>) -> eyre::Result<()>
where
    O: PhaseOutputs,
    H: DigitalInput,
    B: DigitalInput,
{
    ctl.home()?;
    ctl.release();
    println!("Homed to the 12:00 reference.");
    Ok(())
}

pub fn calibrate<O, H, B>(ctl: &mut MotionController<O, H, B>) -> eyre::Result<()>
where
    O: PhaseOutputs,
    H: DigitalInput,
    B: DigitalInput,
{
    println!(
        "Calibration loop: homes, pauses for inspection, backs up one hour, repeats. \
         Press the button or Ctrl-C to stop."
    );
    ctl.calibrate();
    ctl.release();
    Ok(())
}

pub fn step<O, H, B>(
    ctl: &mut MotionController<O, H, B>,
    steps: i32,
    speed: StepSpeed,
) -> eyre::Result<()>
where
    O: PhaseOutputs,
    H: DigitalInput,
    B: DigitalInput,
{
    ctl.step(steps, speed);
    ctl.release();
    println!("Moved {steps} steps.");
    Ok(())
}

pub fn self_check<O, H, B>(ctl: &mut MotionController<O, H, B>, json: bool) -> eyre::Result<()>
where
    O: PhaseOutputs,
    H: DigitalInput,
    B: DigitalInput,
{
    let geo = ctl.geometry();
    let home_active = ctl.is_home();
    let button_pressed = ctl.is_button_pressed();
    if json {
        println!(
            "{}",
            serde_json::json!({
                "status": "ok",
                "steps_per_rev": geo.steps_per_rev,
                "steps_per_hour": geo.steps_per_hour,
                "steps_per_cycle": geo.steps_per_cycle,
                "rapid_delay_us": geo.rapid_delay_us,
                "home_active": home_active,
                "button_pressed": button_pressed,
            })
        );
    } else {
        println!(
            "self-check ok: {} steps/cycle, {} steps/hour, {} us base hold; home sensor {}",
            geo.steps_per_cycle,
            geo.steps_per_hour,
            geo.rapid_delay_us,
            if home_active { "active" } else { "inactive" }
        );
    }
    Ok(())
}
