//! Property tests for the cyclic position arithmetic.

use proptest::prelude::*;
use stepclock_core::mocks::{ConstLevel, Mechanism};
use stepclock_core::{
    MINUTES_PER_CYCLE, MotionControllerBuilder, MotorConfig, StepGeometry, WallTime,
    shortest_cycle_delta,
};
use stepclock_traits::clock::test_clock::TestClock;

proptest! {
    #[test]
    fn minutes_since_noon_stays_in_range(hour in 0u8..24, minute in 0u8..60) {
        let m = WallTime::new(hour, minute).minutes_since_noon();
        prop_assert!((0..MINUTES_PER_CYCLE).contains(&m));
        // Stable under repetition.
        prop_assert_eq!(m, WallTime::new(hour, minute).minutes_since_noon());
    }

    #[test]
    fn target_position_stays_inside_the_cycle(minutes in 0i32..MINUTES_PER_CYCLE) {
        let geo = StepGeometry::from_config(&MotorConfig::default()).unwrap();
        let cycle = geo.steps_per_cycle;
        let target = ((i64::from(minutes) * i64::from(cycle))
            / i64::from(MINUTES_PER_CYCLE)) as i32;
        prop_assert!((0..cycle).contains(&target));
    }

    #[test]
    fn corrected_delta_is_at_most_half_a_cycle(
        target in 0i32..49_152,
        last in -49_151i32..49_152,
    ) {
        let cycle = 49_152;
        let delta = shortest_cycle_delta(target, last, cycle);
        prop_assert!(delta > -(cycle / 2) && delta <= cycle / 2);
        // The delta is congruent to the raw difference.
        prop_assert_eq!((target - last - delta).rem_euclid(cycle), 0);
    }

    #[test]
    fn mapper_position_always_tracks_the_mechanism(
        times in prop::collection::vec((0u8..24, 0u8..60), 1..40),
    ) {
        let cfg = MotorConfig::default();
        let geo = StepGeometry::from_config(&cfg).unwrap();
        let cycle = i64::from(geo.steps_per_cycle);
        let mech = Mechanism::new(&cfg, 0, None);
        let mut ctl =
            MotionControllerBuilder::new(mech.outputs(), mech.home_input(), ConstLevel(true))
                .with_config(cfg)
                .with_clock(Box::new(TestClock::new()))
                .build()
                .unwrap();

        let mut prev_pos = mech.position();
        for (hour, minute) in times {
            ctl.update_clock(WallTime::new(hour, minute));

            // No single update ever moves more than half a cycle.
            let moved = (mech.position() - prev_pos).abs();
            prop_assert!(moved <= cycle / 2);
            prev_pos = mech.position();

            // Internal tracking agrees with the physical train modulo one
            // cycle.
            prop_assert_eq!(
                i64::from(ctl.last_position()).rem_euclid(cycle),
                mech.cycle_position()
            );

            // The commanded target is hit exactly.
            let minutes = i64::from(WallTime::new(hour, minute).minutes_since_noon());
            let target = (minutes * cycle) / i64::from(MINUTES_PER_CYCLE);
            prop_assert_eq!(mech.cycle_position(), target);
        }
    }
}
