use crate::cache::category::Category;
use crate::errors::CacheError;
use crate::utils::num::fraction_of;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

const MIB: u64 = 1024 * 1024;
const GIB: u64 = 1024 * MIB;

/// Retention policies that drive victim selection within a category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RetentionPolicy {
    #[default]
    Lru,
    Lfu,
    Ttl,
    Fifo,
    /// Never evicted automatically; entries leave only via delete/clear.
    None,
}

/// Per-category overrides. Unset fields fall back to the global values in [`CacheConfig`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryConfig {
    /// 0 means unbounded (still subject to the global budget).
    pub max_size_bytes: Option<u64>,
    pub retention_policy: Option<RetentionPolicy>,
    pub protection_enabled: Option<bool>,
    pub hot_threshold: Option<u64>,
    pub hot_ttl_secs: Option<u64>,
    pub cold_ttl_secs: Option<u64>,
    /// Free-form category knobs, e.g. `quality = 85` for thumbnails.
    pub extensions: toml::Table,
}

impl CategoryConfig {
    #[must_use]
    pub fn bounded(max_size_bytes: u64, policy: RetentionPolicy) -> Self {
        Self { max_size_bytes: Some(max_size_bytes), retention_policy: Some(policy), ..Default::default() }
    }

    #[must_use]
    pub fn extension(&self, key: &str) -> Option<&toml::Value> {
        self.extensions.get(key)
    }
}

/// Configuration for the cache.
///
/// Loadable from TOML. Providing a `[categories]` table replaces the built-in
/// per-category presets; categories left out use the global values.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    /// Directory holding the metadata index; also the path probed for free disk space.
    pub root_dir: PathBuf,
    pub index_file: String,
    pub max_size_bytes: u64,
    pub retention_policy: RetentionPolicy,
    pub hot_threshold: u64,
    pub hot_ttl_secs: u64,
    pub cold_ttl_secs: u64,
    pub cleanup_interval_secs: u64,
    pub min_free_disk_bytes: u64,
    pub protection_enabled: bool,
    pub shutdown_timeout_ms: u64,
    /// Write the metadata index on flush/shutdown and read it back at startup.
    pub persist_index: bool,
    pub categories: BTreeMap<Category, CategoryConfig>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            root_dir: default_root_dir(),
            index_file: "cache_index.json".to_string(),
            max_size_bytes: 4 * GIB,
            retention_policy: RetentionPolicy::Lru,
            hot_threshold: 10,
            hot_ttl_secs: 3600,
            cold_ttl_secs: 24 * 3600,
            cleanup_interval_secs: 300,
            min_free_disk_bytes: GIB,
            protection_enabled: true,
            shutdown_timeout_ms: 5_000,
            persist_index: true,
            categories: default_categories(),
        }
    }
}

fn default_root_dir() -> PathBuf {
    dirs_next::cache_dir()
        .map(|d| d.join("mediacache"))
        .unwrap_or_else(|| PathBuf::from(".mediacache"))
}

fn default_categories() -> BTreeMap<Category, CategoryConfig> {
    let mut map = BTreeMap::new();
    map.insert(Category::Vectors, CategoryConfig::bounded(GIB, RetentionPolicy::Lru));
    let mut thumbnails = CategoryConfig::bounded(512 * MIB, RetentionPolicy::Lru);
    thumbnails.extensions.insert("quality".to_string(), toml::Value::Integer(85));
    map.insert(Category::Thumbnails, thumbnails);
    map.insert(Category::Previews, CategoryConfig::bounded(GIB, RetentionPolicy::Lru));
    map.insert(Category::Metadata, CategoryConfig::bounded(256 * MIB, RetentionPolicy::Lfu));
    map.insert(
        Category::SearchResults,
        CategoryConfig { cold_ttl_secs: Some(600), ..CategoryConfig::bounded(128 * MIB, RetentionPolicy::Ttl) },
    );
    map.insert(
        Category::Models,
        CategoryConfig { hot_threshold: Some(2), ..CategoryConfig::bounded(0, RetentionPolicy::Lfu) },
    );
    map.insert(Category::Preprocessing, CategoryConfig::bounded(512 * MIB, RetentionPolicy::Fifo));
    map
}

/// Effective settings for one category after applying global defaults.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct CategorySettings {
    pub max_size_bytes: u64,
    pub retention_policy: RetentionPolicy,
    pub protection_enabled: bool,
    pub hot_threshold: u64,
    pub hot_ttl: Duration,
    pub cold_ttl: Duration,
}

impl CategorySettings {
    #[must_use]
    pub const fn is_bounded(&self) -> bool {
        self.max_size_bytes > 0
    }
}

impl CacheConfig {
    /// Parses a TOML document and validates the result.
    ///
    /// # Errors
    /// Returns an error on malformed TOML or an invalid configuration.
    pub fn from_toml_str(s: &str) -> Result<Self, CacheError> {
        let cfg: CacheConfig = toml::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Loads and validates a TOML configuration file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or fails validation.
    pub fn load(path: &Path) -> Result<Self, CacheError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    /// # Errors
    /// Returns `InvalidConfig` describing the first offending field.
    pub fn validate(&self) -> Result<(), CacheError> {
        if self.max_size_bytes == 0 {
            return Err(CacheError::InvalidConfig("max_size_bytes must be greater than 0".into()));
        }
        if self.cleanup_interval_secs == 0 {
            return Err(CacheError::InvalidConfig("cleanup_interval_secs must be greater than 0".into()));
        }
        if self.hot_threshold == 0 {
            return Err(CacheError::InvalidConfig("hot_threshold must be greater than 0".into()));
        }
        if self.index_file.trim().is_empty() {
            return Err(CacheError::InvalidConfig("index_file must not be empty".into()));
        }
        for (category, cfg) in &self.categories {
            if cfg.hot_threshold == Some(0) {
                return Err(CacheError::InvalidConfig(format!("{category}: hot_threshold must be greater than 0")));
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn with_category(mut self, category: Category, cfg: CategoryConfig) -> Self {
        self.categories.insert(category, cfg);
        self
    }

    #[must_use]
    pub fn category(&self, category: Category) -> Option<&CategoryConfig> {
        self.categories.get(&category)
    }

    #[must_use]
    pub fn resolve(&self, category: Category) -> CategorySettings {
        let overrides = self.categories.get(&category);
        let pick = |f: fn(&CategoryConfig) -> Option<u64>, global: u64| overrides.and_then(f).unwrap_or(global);
        let category_protection =
            overrides.and_then(|c| c.protection_enabled).unwrap_or(self.protection_enabled);
        CategorySettings {
            max_size_bytes: pick(|c| c.max_size_bytes, 0),
            retention_policy: overrides.and_then(|c| c.retention_policy).unwrap_or(self.retention_policy),
            protection_enabled: self.protection_enabled && category_protection,
            hot_threshold: pick(|c| c.hot_threshold, self.hot_threshold),
            hot_ttl: Duration::from_secs(pick(|c| c.hot_ttl_secs, self.hot_ttl_secs)),
            cold_ttl: Duration::from_secs(pick(|c| c.cold_ttl_secs, self.cold_ttl_secs)),
        }
    }

    /// Largest single entry admitted: 10% of the global budget.
    #[must_use]
    pub fn max_entry_bytes(&self) -> u64 {
        fraction_of(self.max_size_bytes, 1, 10)
    }

    /// Occupancy that cleanup passes evict down to: 80% of the global budget.
    #[must_use]
    pub fn cleanup_target_bytes(&self) -> u64 {
        fraction_of(self.max_size_bytes, 8, 10)
    }

    #[must_use]
    pub fn index_path(&self) -> PathBuf {
        self.root_dir.join(&self.index_file)
    }

    #[must_use]
    pub const fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs)
    }

    #[must_use]
    pub const fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }
}
