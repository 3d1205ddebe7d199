//! Cache entry and its persistable metadata

use crate::cache::clock::elapsed;
use crate::cache::config::CategorySettings;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A stored artifact plus the bookkeeping eviction and protection rely on.
#[derive(Debug, Clone)]
pub struct Entry<V> {
    pub key: String,
    /// `None` for entries rebuilt from the metadata index: the statistics survived a restart, the payload did not.
    pub value: Option<V>,
    pub size_bytes: u64,
    pub created_at: DateTime<Utc>,
    pub last_accessed_at: DateTime<Utc>,
    pub access_count: u64,
    pub is_hot: bool,
}

impl<V> Entry<V> {
    pub fn new(key: String, value: V, size_bytes: u64, now: DateTime<Utc>) -> Self {
        Self {
            key,
            value: Some(value),
            size_bytes,
            created_at: now,
            last_accessed_at: now,
            access_count: 0,
            is_hot: false,
        }
    }

    /// Rebuilds a value-less entry from persisted metadata.
    pub fn restored(key: String, meta: &EntryMetadata) -> Self {
        Self {
            key,
            value: None,
            size_bytes: meta.size_bytes,
            created_at: meta.created_at,
            last_accessed_at: meta.last_accessed_at,
            access_count: meta.access_count,
            is_hot: meta.is_hot,
        }
    }

    pub fn mark_accessed(&mut self, now: DateTime<Utc>) {
        self.last_accessed_at = now;
        self.access_count = self.access_count.saturating_add(1);
    }

    #[must_use]
    pub fn idle(&self, now: DateTime<Utc>) -> Duration {
        elapsed(self.last_accessed_at, now)
    }

    /// TTL that applies to this entry given its hot/cold status.
    #[must_use]
    pub fn applicable_ttl(&self, settings: &CategorySettings) -> Duration {
        if self.is_hot { settings.hot_ttl } else { settings.cold_ttl }
    }

    #[must_use]
    pub fn is_expired(&self, settings: &CategorySettings, now: DateTime<Utc>) -> bool {
        self.idle(now) > self.applicable_ttl(settings)
    }

    #[must_use]
    pub fn metadata(&self) -> EntryMetadata {
        EntryMetadata {
            size_bytes: self.size_bytes,
            created_at: self.created_at,
            last_accessed_at: self.last_accessed_at,
            access_count: self.access_count,
            is_hot: self.is_hot,
        }
    }
}

/// The persisted subset of an [`Entry`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryMetadata {
    pub size_bytes: u64,
    pub created_at: DateTime<Utc>,
    pub last_accessed_at: DateTime<Utc>,
    pub access_count: u64,
    pub is_hot: bool,
}
