use crate::integration_tests::support::{build, bytes, config};
use mediacache::cache::{Category, ManualClock};
use proptest::prelude::*;
use std::time::Duration;

#[derive(Debug, Clone)]
enum Op {
    Set { key: u8, cat: usize, size: usize },
    Get { key: u8, cat: usize },
    Delete { key: u8, cat: usize },
    Protect { key: u8, cat: usize },
    Clear { cat: usize },
    Tick { secs: u64 },
}

fn op() -> impl Strategy<Value = Op> {
    let cat = 0..Category::ALL.len();
    prop_oneof![
        6 => (0u8..24, cat.clone(), 1usize..120).prop_map(|(key, cat, size)| Op::Set { key, cat, size }),
        4 => (0u8..24, cat.clone()).prop_map(|(key, cat)| Op::Get { key, cat }),
        1 => (0u8..24, cat.clone()).prop_map(|(key, cat)| Op::Delete { key, cat }),
        1 => (0u8..24, cat.clone()).prop_map(|(key, cat)| Op::Protect { key, cat }),
        1 => cat.prop_map(|cat| Op::Clear { cat }),
        1 => (0u64..200).prop_map(|secs| Op::Tick { secs }),
    ]
}

proptest! {
    #![proptest_config(proptest::test_runner::Config {
        failure_persistence: Some(Box::new(proptest::test_runner::FileFailurePersistence::WithSource("proptest-regressions"))),
        cases: 24,
        .. proptest::test_runner::Config::default()
    })]
    #[test]
    fn prop_accounting_and_budget_hold_after_every_op(ops in proptest::collection::vec(op(), 1..80)) {
        let dir = tempfile::tempdir().unwrap();
        let clock = ManualClock::default();
        let mut cfg = config(dir.path(), 1000);
        cfg.hot_threshold = 2;
        cfg.hot_ttl_secs = 50;
        cfg.cold_ttl_secs = 120;
        let cache = build(cfg, &clock);
        let mut last_evictions = 0;
        for op in ops {
            match op {
                Op::Set { key, cat, size } => {
                    let accepted = cache.set(&format!("k{key}"), bytes(size), Category::ALL[cat], None);
                    prop_assert_eq!(accepted, size <= 100);
                }
                Op::Get { key, cat } => { cache.get(&format!("k{key}"), Category::ALL[cat]); }
                Op::Delete { key, cat } => {
                    let key = format!("k{key}");
                    cache.delete(&key, Category::ALL[cat]);
                    prop_assert!(!cache.contains(&key, Category::ALL[cat]));
                }
                Op::Protect { key, cat } => { cache.protect(&format!("k{key}"), Category::ALL[cat]); }
                Op::Clear { cat } => { cache.clear(Some(Category::ALL[cat])); }
                Op::Tick { secs } => {
                    clock.advance(Duration::from_secs(secs));
                    cache.run_maintenance();
                }
            }
            prop_assert!(cache.validate_invariants().is_ok(), "{:?}", cache.validate_invariants());
            let stats = cache.stats();
            prop_assert!(stats.total_size_bytes <= 1000);
            prop_assert!(stats.eviction_count >= last_evictions);
            last_evictions = stats.eviction_count;
            let summed: u64 = stats.categories.iter().map(|c| c.size_bytes).sum();
            prop_assert_eq!(summed, stats.total_size_bytes);
        }
    }

    #[test]
    fn prop_set_then_get_round_trips(key in "[a-z0-9_-]{1,24}", size in 1usize..100, cat in 0..Category::ALL.len()) {
        let dir = tempfile::tempdir().unwrap();
        let cache = build(config(dir.path(), 10_000), &ManualClock::default());
        let category = Category::ALL[cat];
        prop_assert!(cache.set(&key, bytes(size), category, None));
        prop_assert_eq!(cache.get(&key, category), Some(bytes(size)));
    }
}
