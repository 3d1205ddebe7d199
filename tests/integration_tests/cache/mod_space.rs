use crate::integration_tests::support::{bytes, config};
use mediacache::cache::{Cache, Category, FixedDiskProbe, ManualClock};
use std::sync::Arc;
use tempfile::tempdir;

fn cache_with_probe(dir: &std::path::Path, floor: u64, probe: &Arc<FixedDiskProbe>) -> Cache<Vec<u8>> {
    let mut cfg = config(dir, 1000);
    cfg.min_free_disk_bytes = floor;
    Cache::builder(cfg)
        .clock(ManualClock::default())
        .disk_probe(Arc::clone(probe))
        .background_maintenance(false)
        .build()
        .unwrap()
}

#[test]
fn low_disk_space_triggers_cleanup_to_eighty_percent() {
    let dir = tempdir().unwrap();
    let probe = Arc::new(FixedDiskProbe::new(Some(1 << 30)));
    let cache = cache_with_probe(dir.path(), 1 << 20, &probe);
    for i in 0..9 {
        cache.set(&format!("k{i}"), bytes(100), Category::General, None);
    }
    assert_eq!(cache.stats().total_size_bytes, 900);

    probe.set(Some(1024));
    assert!(cache.set("new", bytes(100), Category::General, None));
    assert!(!cache.contains("k0", Category::General));
    assert_eq!(cache.stats().total_size_bytes, 900);
    assert_eq!(cache.metrics_snapshot().disk_pressure_events, 1);
}

#[test]
fn unknown_free_space_skips_the_floor() {
    let dir = tempdir().unwrap();
    let probe = Arc::new(FixedDiskProbe::new(None));
    let cache = cache_with_probe(dir.path(), 1 << 20, &probe);
    for i in 0..10 {
        cache.set(&format!("k{i}"), bytes(100), Category::General, None);
    }
    assert_eq!(cache.stats().total_size_bytes, 1000);
    assert_eq!(cache.metrics_snapshot().disk_pressure_events, 0);
}

#[test]
fn budget_never_exceeded_by_regular_writes() {
    let dir = tempdir().unwrap();
    let probe = Arc::new(FixedDiskProbe::new(None));
    let cache = cache_with_probe(dir.path(), 0, &probe);
    let categories = [Category::General, Category::Vectors, Category::Thumbnails, Category::Metadata];
    for i in 0..200 {
        let c = categories[i % categories.len()];
        cache.set(&format!("k{i}"), bytes(1 + (i * 37) % 100), c, None);
        assert!(cache.stats().total_size_bytes <= 1000);
    }
    cache.validate_invariants().unwrap();
}
