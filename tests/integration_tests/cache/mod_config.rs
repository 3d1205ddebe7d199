use mediacache::cache::{CacheConfig, Category, RetentionPolicy};
use std::time::Duration;
use tempfile::tempdir;

#[test]
fn default_presets_match_the_pipeline_categories() {
    let cfg = CacheConfig::default();
    assert_eq!(cfg.resolve(Category::Vectors).retention_policy, RetentionPolicy::Lru);
    assert_eq!(cfg.resolve(Category::Metadata).retention_policy, RetentionPolicy::Lfu);
    assert_eq!(cfg.resolve(Category::SearchResults).retention_policy, RetentionPolicy::Ttl);
    assert_eq!(cfg.resolve(Category::SearchResults).cold_ttl, Duration::from_secs(600));
    assert_eq!(cfg.resolve(Category::Preprocessing).retention_policy, RetentionPolicy::Fifo);
    assert!(!cfg.resolve(Category::Models).is_bounded());
    assert!(!cfg.resolve(Category::General).is_bounded());
    assert_eq!(cfg.resolve(Category::Thumbnails).max_size_bytes, 512 * 1024 * 1024);
}

#[test]
fn load_reads_and_validates_a_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("cache.toml");
    std::fs::write(
        &path,
        format!(
            "root_dir = {:?}\nmax_size_bytes = 2048\ncleanup_interval_secs = 5\n\n[categories.previews]\nmax_size_bytes = 512\nhot_ttl_secs = 7\n",
            dir.path().display().to_string()
        ),
    )
    .unwrap();
    let cfg = CacheConfig::load(&path).unwrap();
    assert_eq!(cfg.root_dir, dir.path());
    assert_eq!(cfg.cleanup_interval(), Duration::from_secs(5));
    assert_eq!(cfg.index_path(), dir.path().join("cache_index.json"));
    let previews = cfg.resolve(Category::Previews);
    assert_eq!(previews.max_size_bytes, 512);
    assert_eq!(previews.hot_ttl, Duration::from_secs(7));
    // A categories table replaces the presets.
    assert!(!cfg.resolve(Category::Thumbnails).is_bounded());
}

#[test]
fn load_reports_missing_and_malformed_files() {
    let dir = tempdir().unwrap();
    assert!(CacheConfig::load(&dir.path().join("absent.toml")).is_err());
    let bad = dir.path().join("bad.toml");
    std::fs::write(&bad, "retention_policy = \"random\"").unwrap();
    assert!(CacheConfig::load(&bad).is_err());
}
