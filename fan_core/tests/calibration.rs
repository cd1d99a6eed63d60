use fan_core::{MappingCfg, actuator_target, recalibrated_threshold, rising_edge};
use proptest::prelude::*;
use rstest::rstest;

#[rstest]
#[case(600, 400, 900)]
#[case(512, 512, 505)]
#[case(300, 40, 579)]
#[case(0, 1023, 1023)]
#[case(100, 200, 0)]
#[case(1023, 0, 1)]
fn golden_thresholds(#[case] light: u16, #[case] threshold: u16, #[case] expected: u16) {
    assert_eq!(recalibrated_threshold(light, threshold, 1023), expected);
}

#[rstest]
#[case(800, 160)]
#[case(1023, 180)]
#[case(51, 93)]
#[case(600, 142)]
fn golden_dial_positions(#[case] dial: u16, #[case] expected: u8) {
    assert_eq!(
        actuator_target(&MappingCfg::default(), dial, 600, 400),
        expected
    );
}

#[test]
fn smaller_analog_range_clamps_lower() {
    assert_eq!(recalibrated_threshold(0, 1023, 255), 255);
}

proptest! {
    #[test]
    fn candidate_stays_in_analog_range(light in 0u16..=1023, threshold in 0u16..=1023) {
        prop_assert!(recalibrated_threshold(light, threshold, 1023) <= 1023);
    }

    #[test]
    fn candidate_is_deterministic(light in 0u16..=1023, threshold in 0u16..=1023) {
        prop_assert_eq!(
            recalibrated_threshold(light, threshold, 1023),
            recalibrated_threshold(light, threshold, 1023)
        );
    }

    #[test]
    fn only_false_to_true_is_an_edge(prev: bool, cur: bool) {
        prop_assert_eq!(rising_edge(prev, cur), cur && !prev);
    }

    #[test]
    fn gated_inputs_park(dial in 0u16..=1023, light in 0u16..=1023, threshold in 0u16..=1023) {
        let cfg = MappingCfg::default();
        prop_assume!(dial <= cfg.dial_threshold || light <= threshold);
        prop_assert_eq!(actuator_target(&cfg, dial, light, threshold), 93);
    }

    #[test]
    fn target_is_monotonic_in_dial(a in 51u16..=1023, b in 51u16..=1023) {
        let cfg = MappingCfg::default();
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let t_lo = actuator_target(&cfg, lo, 1023, 0);
        let t_hi = actuator_target(&cfg, hi, 1023, 0);
        prop_assert!(t_lo <= t_hi);
        prop_assert!((93..=180).contains(&t_lo));
        prop_assert!((93..=180).contains(&t_hi));
    }
}
