use mediacache::utils::num::{fraction_of, ratio};
use proptest::prelude::*;

proptest! {
    #![proptest_config(proptest::test_runner::Config {
        failure_persistence: Some(Box::new(proptest::test_runner::FileFailurePersistence::WithSource("proptest-regressions"))),
        cases: 24,
        .. proptest::test_runner::Config::default()
    })]
    #[test]
    fn prop_fraction_never_exceeds_whole(value in any::<u64>(), num in 0u64..=10, den in 1u64..=10) {
        prop_assume!(num <= den);
        prop_assert!(fraction_of(value, num, den) <= value);
    }

    #[test]
    fn prop_ratio_is_a_probability(n in 0u64..1_000_000, extra in 0u64..1_000_000) {
        let r = ratio(n, n + extra);
        prop_assert!((0.0..=1.0).contains(&r));
    }
}
