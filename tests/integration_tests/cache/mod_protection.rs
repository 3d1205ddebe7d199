use crate::integration_tests::support::{build, bytes, config};
use mediacache::cache::{Category, CategoryConfig, ManualClock};
use std::time::Duration;
use tempfile::tempdir;

#[test]
fn frequent_reads_promote_and_protect_from_eviction() {
    let dir = tempdir().unwrap();
    let mut cfg = config(dir.path(), 1000);
    cfg.hot_threshold = 3;
    let cache = build(cfg, &ManualClock::default());
    cache.set("hot", bytes(100), Category::General, None);
    for _ in 0..3 {
        cache.get("hot", Category::General);
    }
    assert!(cache.is_protected("hot", Category::General));
    assert_eq!(cache.metrics_snapshot().promotions, 1);

    for i in 0..20 {
        cache.set(&format!("cold{i}"), bytes(100), Category::General, None);
    }
    assert!(cache.contains("hot", Category::General));
    assert!(cache.stats().total_size_bytes <= 1000);
}

#[test]
fn promotion_needs_threshold_reads() {
    let dir = tempdir().unwrap();
    let mut cfg = config(dir.path(), 1000);
    cfg.hot_threshold = 3;
    let cache = build(cfg, &ManualClock::default());
    cache.set("k", bytes(10), Category::General, None);
    cache.get("k", Category::General);
    cache.get("k", Category::General);
    assert!(!cache.is_protected("k", Category::General));
}

#[test]
fn category_can_opt_out_of_protection() {
    let dir = tempdir().unwrap();
    let mut cfg = config(dir.path(), 1000);
    cfg.hot_threshold = 1;
    let cfg = cfg.with_category(
        Category::SearchResults,
        CategoryConfig { protection_enabled: Some(false), ..Default::default() },
    );
    let cache = build(cfg, &ManualClock::default());
    cache.set("q", bytes(10), Category::SearchResults, None);
    cache.set("v", bytes(10), Category::Vectors, None);
    cache.get("q", Category::SearchResults);
    cache.get("v", Category::Vectors);
    assert!(!cache.is_protected("q", Category::SearchResults));
    assert!(cache.is_protected("v", Category::Vectors));
}

#[test]
fn idle_hot_entries_are_demoted_by_maintenance() {
    let dir = tempdir().unwrap();
    let clock = ManualClock::default();
    let mut cfg = config(dir.path(), 10_000);
    cfg.hot_ttl_secs = 60;
    let cache = build(cfg, &clock);
    cache.set("k", bytes(10), Category::Vectors, None);
    assert!(cache.protect("k", Category::Vectors));
    assert!(!cache.protect("missing", Category::Vectors));

    clock.advance(Duration::from_secs(30));
    assert_eq!(cache.run_maintenance().demoted, 0);
    assert!(cache.is_protected("k", Category::Vectors));

    clock.advance(Duration::from_secs(31));
    assert_eq!(cache.run_maintenance().demoted, 1);
    assert!(!cache.is_protected("k", Category::Vectors));
    assert!(cache.contains("k", Category::Vectors));
}

#[test]
fn unprotect_and_overwrite_clear_hot_status() {
    let dir = tempdir().unwrap();
    let cache = build(config(dir.path(), 10_000), &ManualClock::default());
    cache.set("k", bytes(10), Category::Previews, None);
    cache.protect("k", Category::Previews);
    assert!(cache.unprotect("k", Category::Previews));
    assert!(!cache.unprotect("k", Category::Previews));

    cache.protect("k", Category::Previews);
    cache.set("k", bytes(12), Category::Previews, None);
    assert!(!cache.is_protected("k", Category::Previews));
    let info = cache.entries(Some(Category::Previews));
    assert!(!info[0].is_hot);
    cache.validate_invariants().unwrap();
}
