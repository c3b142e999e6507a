//! Homing state machine: determinism, fault bounds, calibration loop.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use rstest::rstest;
use stepclock_core::mocks::{ConstLevel, FnLevel, Mechanism, RecordingBank, SharedLevel};
use stepclock_core::{HomingError, MotionControllerBuilder, MotorConfig, WallTime};
use stepclock_traits::clock::test_clock::TestClock;

const CYCLE: i64 = 49_152;
const HOUR: i64 = 4_096;
const WINDOW: (i64, i64) = (1_000, 1_200);

#[rstest]
#[case::below_window(0)]
#[case::just_below(999)]
#[case::inside_window(1_100)]
#[case::just_past(1_200)]
#[case::opposite_side(24_576)]
#[case::above_window(40_000)]
#[case::end_of_cycle(49_151)]
fn homing_always_ends_at_the_same_edge(#[case] start: i64) {
    let cfg = MotorConfig::default();
    let mech = Mechanism::new(&cfg, start, Some(WINDOW));
    let mut ctl =
        MotionControllerBuilder::new(mech.outputs(), mech.home_input(), ConstLevel(true))
            .with_config(cfg)
            .with_clock(Box::new(TestClock::new()))
            .build()
            .unwrap();

    ctl.home().unwrap();

    // The slow forward approach always terminates on the window's leading
    // edge, independent of where the mechanism started.
    assert_eq!(mech.cycle_position(), WINDOW.0);
    assert_eq!(ctl.last_position(), 0);
    assert_eq!(ctl.last_minutes(), 0);
}

#[test]
fn homing_works_with_normally_closed_sensor_wiring() {
    let cfg = MotorConfig {
        home_normally_open: false,
        ..MotorConfig::default()
    };
    let mech = Mechanism::new(&cfg, 12_345, Some(WINDOW));
    let mut ctl =
        MotionControllerBuilder::new(mech.outputs(), mech.home_input(), ConstLevel(true))
            .with_config(cfg)
            .with_clock(Box::new(TestClock::new()))
            .build()
            .unwrap();

    ctl.home().unwrap();
    assert_eq!(mech.cycle_position(), WINDOW.0);
}

#[test]
fn dead_sensor_fails_seek_after_exactly_the_step_bound() {
    let cfg = MotorConfig::default();
    let mech = Mechanism::new(&cfg, 0, None);
    let mut ctl =
        MotionControllerBuilder::new(mech.outputs(), mech.home_input(), ConstLevel(true))
            .with_config(cfg)
            .with_clock(Box::new(TestClock::new()))
            .build()
            .unwrap();

    let err = ctl.home().unwrap_err();
    assert_eq!(
        err,
        HomingError::Seek {
            max_steps: (CYCLE + HOUR) as u32
        }
    );
    // Exactly one cycle plus one hour of forward steps, not more, not fewer.
    assert_eq!(mech.position(), CYCLE + HOUR);
}

#[test]
fn stuck_sensor_fails_backoff_after_one_hour_of_steps() {
    let cfg = MotorConfig::default();
    let mech = Mechanism::new(&cfg, 0, Some((0, CYCLE)));
    let mut ctl =
        MotionControllerBuilder::new(mech.outputs(), mech.home_input(), ConstLevel(true))
            .with_config(cfg)
            .with_clock(Box::new(TestClock::new()))
            .build()
            .unwrap();

    let err = ctl.home().unwrap_err();
    assert_eq!(
        err,
        HomingError::Backoff {
            max_steps: HOUR as u32
        }
    );
    // Seek found the sensor immediately; only the reverse budget was spent.
    assert_eq!(mech.position(), -HOUR);
}

#[test]
fn vanishing_sensor_fails_the_slow_approach() {
    // Scripted raw sensor: active on the first three reads (seek satisfied
    // without moving, then two backoff steps), dead afterwards. Wired
    // normally closed so the raw level is the active level.
    let cfg = MotorConfig {
        home_normally_open: false,
        ..MotorConfig::default()
    };
    let reads = Rc::new(Cell::new(0u32));
    let reads_in_sensor = Rc::clone(&reads);
    let sensor = FnLevel(move || {
        let n = reads_in_sensor.get();
        reads_in_sensor.set(n + 1);
        n < 3
    });
    let mut ctl = MotionControllerBuilder::new(RecordingBank::new(), sensor, ConstLevel(true))
        .with_config(cfg)
        .with_clock(Box::new(TestClock::new()))
        .build()
        .unwrap();

    let err = ctl.home().unwrap_err();
    assert_eq!(
        err,
        HomingError::Approach {
            max_steps: HOUR as u32
        }
    );
}

#[test]
fn failed_homing_leaves_position_tracking_untouched() {
    let cfg = MotorConfig::default();
    let mech = Mechanism::new(&cfg, 0, None);
    let mut ctl =
        MotionControllerBuilder::new(mech.outputs(), mech.home_input(), ConstLevel(true))
            .with_config(cfg)
            .with_clock(Box::new(TestClock::new()))
            .build()
            .unwrap();

    ctl.update_clock(WallTime::new(12, 30));
    assert_eq!(ctl.last_position(), 2_048);

    ctl.home().unwrap_err();

    // Stale-but-plausible state is kept; only success redefines the
    // reference.
    assert_eq!(ctl.last_position(), 2_048);
    assert_eq!(ctl.last_minutes(), 30);
}

#[test]
fn successful_homing_redefines_noon_for_the_mapper() {
    let cfg = MotorConfig::default();
    let mech = Mechanism::new(&cfg, 20_000, Some(WINDOW));
    let mut ctl =
        MotionControllerBuilder::new(mech.outputs(), mech.home_input(), ConstLevel(true))
            .with_config(cfg)
            .with_clock(Box::new(TestClock::new()))
            .build()
            .unwrap();

    ctl.home().unwrap();
    let edge = mech.position();

    ctl.update_clock(WallTime::new(12, 1));
    assert_eq!(mech.position() - edge, 68);
}

#[test]
fn calibrate_homes_then_backs_up_an_hour_until_aborted() {
    // Scripted abort button: reads high (unpressed) for the first four
    // polls, which covers loop-top, post-home, post-pause, and post-move of
    // one iteration, then reads pressed.
    let presses = Rc::new(Cell::new(0u32));
    let presses_in_button = Rc::clone(&presses);
    let button = FnLevel(move || {
        let n = presses_in_button.get();
        presses_in_button.set(n + 1);
        n < 4
    });

    let cfg = MotorConfig::default();
    let mech = Mechanism::new(&cfg, 500, Some(WINDOW));
    let clock = TestClock::new();
    let mut ctl = MotionControllerBuilder::new(mech.outputs(), mech.home_input(), button)
        .with_config(cfg)
        .with_clock(Box::new(clock.clone()))
        .build()
        .unwrap();

    ctl.calibrate();

    // Homed to the edge, then one hour backward.
    assert_eq!(mech.cycle_position(), (WINDOW.0 - HOUR).rem_euclid(CYCLE));
    // The inspection pause ran on the injected clock.
    assert!(clock.elapsed() >= Duration::from_millis(10_000));
}

#[test]
fn calibrate_exits_immediately_when_button_already_pressed() {
    let cfg = MotorConfig::default();
    let mech = Mechanism::new(&cfg, 500, Some(WINDOW));
    let button = SharedLevel::new(false); // pressed: line pulled low
    let mut ctl = MotionControllerBuilder::new(mech.outputs(), mech.home_input(), button)
        .with_config(cfg)
        .with_clock(Box::new(TestClock::new()))
        .build()
        .unwrap();

    ctl.calibrate();
    assert_eq!(mech.position(), 500);
}
