use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Process-wide counters for observing cache behavior.
///
/// Mutated while the cache lock is held, read lock-free through [`CacheMetrics::snapshot`].
#[derive(Default, Debug)]
pub struct CacheMetrics {
    pub hits: AtomicU64,
    pub misses: AtomicU64,
    pub inserts: AtomicU64,
    pub deletes: AtomicU64,
    pub evictions: AtomicU64,
    pub forced_evictions: AtomicU64,
    pub promotions: AtomicU64,
    pub demotions: AtomicU64,
    pub maintenance_ticks: AtomicU64,
    pub disk_pressure_events: AtomicU64,
    pub index_saves: AtomicU64,
    pub index_save_failures: AtomicU64,
}

impl CacheMetrics {
    pub(crate) fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> CacheMetricsSnapshot {
        CacheMetricsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            inserts: self.inserts.load(Ordering::Relaxed),
            deletes: self.deletes.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            forced_evictions: self.forced_evictions.load(Ordering::Relaxed),
            promotions: self.promotions.load(Ordering::Relaxed),
            demotions: self.demotions.load(Ordering::Relaxed),
            maintenance_ticks: self.maintenance_ticks.load(Ordering::Relaxed),
            disk_pressure_events: self.disk_pressure_events.load(Ordering::Relaxed),
            index_saves: self.index_saves.load(Ordering::Relaxed),
            index_save_failures: self.index_save_failures.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheMetricsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub inserts: u64,
    pub deletes: u64,
    pub evictions: u64,
    /// Evictions that had to demote a protected entry first.
    pub forced_evictions: u64,
    pub promotions: u64,
    pub demotions: u64,
    pub maintenance_ticks: u64,
    pub disk_pressure_events: u64,
    pub index_saves: u64,
    pub index_save_failures: u64,
}
