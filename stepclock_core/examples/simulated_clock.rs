//! Example: drive a simulated mechanism through homing and a morning of
//! wall-time updates, printing the positions it lands on.

use stepclock_core::mocks::{ConstLevel, Mechanism};
use stepclock_core::{MotionControllerBuilder, MotorConfig, WallTime};
use stepclock_traits::clock::test_clock::TestClock;

fn main() -> eyre::Result<()> {
    let cfg = MotorConfig::default();
    // Start mid-cycle with the home sensor covering a small window at the
    // reference.
    let mech = Mechanism::new(&cfg, 20_000, Some((0, 200)));

    let mut ctl = MotionControllerBuilder::new(mech.outputs(), mech.home_input(), ConstLevel(true))
        .with_config(cfg)
        .with_clock(Box::new(TestClock::new()))
        .build()?;

    ctl.home()?;
    println!("homed: mechanism at cycle position {}", mech.cycle_position());

    for (hour, minute) in [(12, 15), (12, 30), (13, 0), (15, 45)] {
        ctl.update_clock(WallTime::new(hour, minute));
        println!(
            "{hour:02}:{minute:02} -> {} steps from the reference",
            ctl.last_position()
        );
    }
    Ok(())
}
