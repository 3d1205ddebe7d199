use crate::integration_tests::support::{build, bytes, config};
use mediacache::cache::{CacheConfig, Category, CategoryConfig, ManualClock, RetentionPolicy};
use std::time::Duration;
use tempfile::tempdir;

fn with_category(dir: &std::path::Path, category: Category, cat: CategoryConfig) -> CacheConfig {
    config(dir, 10_000).with_category(category, cat)
}

fn fill(cache: &mediacache::cache::Cache<Vec<u8>>, category: Category, keys: &[&str]) {
    for k in keys {
        assert!(cache.set(k, bytes(100), category, None));
    }
}

#[test]
fn lru_evicts_least_recently_used() {
    let dir = tempdir().unwrap();
    let cfg = with_category(dir.path(), Category::General, CategoryConfig::bounded(300, RetentionPolicy::Lru));
    let cache = build(cfg, &ManualClock::default());
    fill(&cache, Category::General, &["a", "b", "c"]);
    cache.get("a", Category::General);
    cache.set("d", bytes(100), Category::General, None);
    assert!(cache.contains("a", Category::General));
    assert!(!cache.contains("b", Category::General));
    assert_eq!(cache.stats().eviction_count, 1);
    assert_eq!(cache.category_stats(Category::General).evictions, 1);
}

#[test]
fn fifo_ignores_access_order() {
    let dir = tempdir().unwrap();
    let cfg = with_category(dir.path(), Category::Preprocessing, CategoryConfig::bounded(300, RetentionPolicy::Fifo));
    let cache = build(cfg, &ManualClock::default());
    fill(&cache, Category::Preprocessing, &["a", "b", "c"]);
    cache.get("a", Category::Preprocessing);
    cache.set("d", bytes(100), Category::Preprocessing, None);
    assert!(!cache.contains("a", Category::Preprocessing));
    assert!(cache.contains("b", Category::Preprocessing));
}

#[test]
fn lfu_evicts_least_frequently_used() {
    let dir = tempdir().unwrap();
    let cfg = with_category(dir.path(), Category::Metadata, CategoryConfig::bounded(300, RetentionPolicy::Lfu));
    let cache = build(cfg, &ManualClock::default());
    fill(&cache, Category::Metadata, &["a", "b", "c"]);
    cache.get("a", Category::Metadata);
    cache.get("a", Category::Metadata);
    cache.get("c", Category::Metadata);
    cache.set("d", bytes(100), Category::Metadata, None);
    assert!(!cache.contains("b", Category::Metadata));
    for k in ["a", "c", "d"] {
        assert!(cache.contains(k, Category::Metadata));
    }
}

#[test]
fn ttl_evicts_expired_entry_first() {
    let dir = tempdir().unwrap();
    let clock = ManualClock::default();
    let cat = CategoryConfig { cold_ttl_secs: Some(60), ..CategoryConfig::bounded(300, RetentionPolicy::Ttl) };
    let cache = build(with_category(dir.path(), Category::SearchResults, cat), &clock);
    cache.set("a", bytes(100), Category::SearchResults, None);
    cache.set("b", bytes(100), Category::SearchResults, None);
    clock.advance(Duration::from_secs(50));
    cache.set("c", bytes(100), Category::SearchResults, None);
    cache.get("a", Category::SearchResults);
    clock.advance(Duration::from_secs(20));
    // "a" was read 20s ago; "b" has idled 70s, past the 60s TTL.
    cache.set("d", bytes(100), Category::SearchResults, None);
    assert!(cache.contains("a", Category::SearchResults));
    assert!(!cache.contains("b", Category::SearchResults));
}

#[test]
fn ttl_falls_back_to_oldest_when_nothing_expired() {
    let dir = tempdir().unwrap();
    let clock = ManualClock::default();
    let cat = CategoryConfig { cold_ttl_secs: Some(600), ..CategoryConfig::bounded(200, RetentionPolicy::Ttl) };
    let cache = build(with_category(dir.path(), Category::SearchResults, cat), &clock);
    fill(&cache, Category::SearchResults, &["a", "b"]);
    cache.get("a", Category::SearchResults);
    cache.set("c", bytes(100), Category::SearchResults, None);
    assert!(!cache.contains("a", Category::SearchResults));
}

#[test]
fn global_pressure_falls_back_to_lowest_priority_category() {
    let dir = tempdir().unwrap();
    let cache = build(config(dir.path(), 1000), &ManualClock::default());
    cache.set("g", bytes(100), Category::General, None);
    cache.set("p", bytes(100), Category::Previews, None);
    for i in 0..7 {
        let key = format!("v{i}");
        cache.set(&key, bytes(100), Category::Vectors, None);
        cache.protect(&key, Category::Vectors);
    }
    assert_eq!(cache.stats().total_size_bytes, 900);
    cache.set("v7", bytes(100), Category::Vectors, None);
    cache.protect("v7", Category::Vectors);
    assert_eq!(cache.stats().total_size_bytes, 1000);

    cache.set("v8", bytes(100), Category::Vectors, None);
    // General (priority 0) gives way before Previews (priority 3).
    assert!(!cache.contains("g", Category::General));
    assert!(cache.contains("p", Category::Previews));
    cache.set("v9", bytes(100), Category::Vectors, None);
    // v8 was never protected, so it goes first from the target category.
    assert!(!cache.contains("v8", Category::Vectors));
    assert!(cache.contains("p", Category::Previews));
    assert!(cache.stats().total_size_bytes <= 1000);
    cache.validate_invariants().unwrap();
}

#[test]
fn forced_demotion_when_everything_is_protected() {
    let dir = tempdir().unwrap();
    let cache = build(config(dir.path(), 500), &ManualClock::default());
    for k in ["a", "b", "c", "d", "e", "f", "g", "h", "i", "j"] {
        cache.set(k, bytes(50), Category::Thumbnails, None);
        cache.protect(k, Category::Thumbnails);
    }
    assert_eq!(cache.stats().total_size_bytes, 500);
    assert!(cache.set("k", bytes(50), Category::Thumbnails, None));
    assert!(!cache.contains("a", Category::Thumbnails));
    assert_eq!(cache.metrics_snapshot().forced_evictions, 1);
    assert!(cache.stats().total_size_bytes <= 500);
    cache.validate_invariants().unwrap();
}

#[test]
fn none_policy_entries_survive_pressure_and_expiry() {
    let dir = tempdir().unwrap();
    let clock = ManualClock::default();
    let cfg = config(dir.path(), 1000).with_category(Category::Models, CategoryConfig::bounded(0, RetentionPolicy::None));
    let cache = build(cfg, &clock);
    for i in 0..9 {
        cache.set(&format!("m{i}"), bytes(100), Category::Models, None);
    }
    cache.set("g1", bytes(100), Category::General, None);
    cache.set("g2", bytes(100), Category::General, None);
    assert!(!cache.contains("g1", Category::General));

    cache.set("m9", bytes(100), Category::Models, None);
    assert!(!cache.contains("g2", Category::General));
    // Nothing evictable remains: the write is still accepted over budget.
    assert!(cache.set("m10", bytes(100), Category::Models, None));
    assert_eq!(cache.stats().total_size_bytes, 1100);
    assert_eq!(cache.metrics_snapshot().forced_evictions, 0);

    clock.advance(Duration::from_secs(30 * 24 * 3600));
    cache.run_maintenance();
    assert_eq!(cache.category_stats(Category::Models).entries, 11);
    cache.validate_invariants().unwrap();
}

#[test]
fn category_budget_applies_on_its_own() {
    let dir = tempdir().unwrap();
    let cfg = with_category(dir.path(), Category::Thumbnails, CategoryConfig::bounded(250, RetentionPolicy::Lru));
    let cache = build(cfg, &ManualClock::default());
    cache.set("other", bytes(100), Category::General, None);
    fill(&cache, Category::Thumbnails, &["a", "b", "c"]);
    assert!(cache.category_stats(Category::Thumbnails).size_bytes <= 250);
    assert!(cache.contains("other", Category::General));
    assert!(!cache.contains("a", Category::Thumbnails));
}
