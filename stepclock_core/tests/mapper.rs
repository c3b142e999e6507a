//! Time-to-position mapping: shortest-path deltas, idempotence, closure.

use rstest::rstest;
use stepclock_core::mocks::{ConstLevel, Mechanism, MechanismHome, MechanismOutputs};
use stepclock_core::{
    MotionController, MotionControllerBuilder, MotorConfig, WallTime, shortest_cycle_delta,
};
use stepclock_traits::clock::test_clock::TestClock;

type SimController = MotionController<MechanismOutputs, MechanismHome, ConstLevel>;

fn sim_controller(cfg: &MotorConfig, mech: &Mechanism) -> SimController {
    MotionControllerBuilder::new(mech.outputs(), mech.home_input(), ConstLevel(true))
        .with_config(cfg.clone())
        .with_clock(Box::new(TestClock::new()))
        .build()
        .unwrap()
}

// Default config: 49152 steps per cycle, 4096 per hour.
const CYCLE: i32 = 49_152;

#[test]
fn six_oclock_is_exactly_half_a_cycle_forward() {
    let cfg = MotorConfig::default();
    let mech = Mechanism::new(&cfg, 0, None);
    let mut ctl = sim_controller(&cfg, &mech);

    ctl.update_clock(WallTime::new(18, 0));

    // Raw delta equals exactly half the cycle; the tie stays forward.
    assert_eq!(mech.position(), i64::from(CYCLE) / 2);
    assert_eq!(ctl.last_position(), CYCLE / 2);
    assert_eq!(ctl.last_minutes(), 360);
}

#[rstest]
// (360 * 49152) / 720 with the tie kept forward.
#[case(360, 0, 24_576)]
// (1 * 49152) / 720 truncates to 68; from 40000 the short path is forward.
#[case(1, 40_000, 9_220)]
// Wrap backward across 12:00.
#[case(719, 0, -69)]
fn shortest_delta_matches_known_scenarios(
    #[case] minutes: i32,
    #[case] last: i32,
    #[case] expected: i32,
) {
    let target = ((i64::from(minutes) * i64::from(CYCLE)) / 720) as i32;
    assert_eq!(shortest_cycle_delta(target, last, CYCLE), expected);
}

#[test]
fn repeated_updates_within_a_minute_are_no_ops() {
    let cfg = MotorConfig::default();
    let mech = Mechanism::new(&cfg, 0, None);
    let mut ctl = sim_controller(&cfg, &mech);

    ctl.update_clock(WallTime::new(3, 17));
    let pos = mech.position();
    ctl.update_clock(WallTime::new(3, 17));
    // Same minutes-since-noon in the other half of the day is also a no-op.
    ctl.update_clock(WallTime::new(15, 17));

    assert_eq!(mech.position(), pos);
}

#[test]
fn startup_at_noon_issues_no_motion() {
    // last_minutes starts at zero, which by construction means 12:00 at the
    // home reference.
    let cfg = MotorConfig::default();
    let mech = Mechanism::new(&cfg, 0, None);
    let mut ctl = sim_controller(&cfg, &mech);

    ctl.update_clock(WallTime::new(12, 0));
    assert_eq!(mech.position(), 0);
}

#[test]
fn full_day_walk_returns_to_the_reference() {
    let cfg = MotorConfig::default();
    let mech = Mechanism::new(&cfg, 0, None);
    let mut ctl = sim_controller(&cfg, &mech);

    for m in 1..720u32 {
        let t = WallTime::new(12 + (m / 60) as u8, (m % 60) as u8);
        ctl.update_clock(t);
        // Every intermediate move lands on the exact target position.
        assert_eq!(
            mech.cycle_position(),
            (i64::from(m) * i64::from(CYCLE)) / 720
        );
    }
    // Wrapping back to 12:00 closes the cycle with one short forward move.
    ctl.update_clock(WallTime::new(12, 0));

    assert_eq!(ctl.last_position(), 0);
    assert_eq!(mech.cycle_position(), 0);
    // The indicator went forward the whole way: exactly one revolution of
    // the cycle space, never the long way around.
    assert_eq!(mech.position(), i64::from(CYCLE));
}

#[test]
fn backward_time_step_takes_the_short_reverse_path() {
    let cfg = MotorConfig::default();
    let mech = Mechanism::new(&cfg, 0, None);
    let mut ctl = sim_controller(&cfg, &mech);

    ctl.update_clock(WallTime::new(1, 0)); // 60 min -> 4096 steps
    ctl.update_clock(WallTime::new(12, 30)); // 30 min -> 2048 steps

    assert_eq!(mech.position(), 2_048);
    assert_eq!(ctl.last_position(), 2_048);
}
