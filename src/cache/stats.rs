use crate::cache::category::Category;
use crate::cache::config::RetentionPolicy;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryStats {
    pub category: Category,
    pub entries: usize,
    pub size_bytes: u64,
    /// 0 when the category is only bounded by the global budget.
    pub max_size_bytes: u64,
    pub protected: usize,
    pub retention_policy: RetentionPolicy,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheStats {
    pub enabled: bool,
    pub entries: usize,
    pub total_size_bytes: u64,
    pub max_size_bytes: u64,
    pub hit_count: u64,
    pub miss_count: u64,
    pub eviction_count: u64,
    /// `hits / (hits + misses)`, 0.0 before any lookup.
    pub hit_rate: f64,
    pub categories: Vec<CategoryStats>,
}

impl CacheStats {
    #[must_use]
    pub fn category(&self, category: Category) -> Option<&CategoryStats> {
        self.categories.iter().find(|c| c.category == category)
    }
}

/// Metadata view of one entry. Values are never exposed here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryInfo {
    pub category: Category,
    pub key: String,
    pub size_bytes: u64,
    pub created_at: DateTime<Utc>,
    pub last_accessed_at: DateTime<Utc>,
    pub access_count: u64,
    pub is_hot: bool,
    pub is_protected: bool,
    /// False for entries restored from the index whose payload is gone.
    pub has_value: bool,
}
