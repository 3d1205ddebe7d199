//! Victim selection and eviction.
//!
//! Every function here runs on the already-locked [`CacheState`]; none of them
//! touch the public facade.

use crate::cache::category::Category;
use crate::cache::clock::Clock;
use crate::cache::config::RetentionPolicy;
use crate::cache::core::Runtime;
use crate::cache::metrics::CacheMetrics;
use crate::cache::state::CacheState;
use chrono::{DateTime, Utc};
use log::{debug, warn};

/// Record of one entry removed by the eviction engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Evicted {
    pub category: Category,
    pub key: String,
    pub size_bytes: u64,
    /// The entry was protected and had to be demoted first.
    pub forced: bool,
}

/// Picks the next unprotected victim in `category` according to its retention policy.
pub(crate) fn select_victim<V>(state: &CacheState<V>, category: Category, now: DateTime<Utc>) -> Option<String> {
    let settings = state.settings(category);
    let store = state.store(category);
    let mut unprotected = store.iter().filter(|e| !store.is_protected(&e.key));
    let victim = match settings.retention_policy {
        RetentionPolicy::None => None,
        RetentionPolicy::Lru | RetentionPolicy::Fifo => unprotected.next(),
        // min_by_key keeps the first of equal minima, i.e. the oldest insert.
        RetentionPolicy::Lfu => unprotected.min_by_key(|e| e.access_count),
        RetentionPolicy::Ttl => {
            let oldest = store.iter().find(|e| !store.is_protected(&e.key));
            unprotected.find(|e| e.is_expired(&settings, now)).or(oldest)
        }
    };
    victim.map(|e| e.key.clone())
}

/// Removes `key` from `category` and accounts it as an eviction.
pub(crate) fn evict_key<V>(
    state: &mut CacheState<V>,
    category: Category,
    key: &str,
    forced: bool,
    metrics: &CacheMetrics,
) -> Option<Evicted> {
    let entry = state.remove_entry(category, key)?;
    let store = state.store_mut(category);
    store.counters.evictions = store.counters.evictions.saturating_add(1);
    CacheMetrics::bump(&metrics.evictions);
    if forced {
        CacheMetrics::bump(&metrics.forced_evictions);
    }
    debug!("evicted {category}/{key} ({} bytes)", entry.size_bytes);
    Some(Evicted { category, key: entry.key, size_bytes: entry.size_bytes, forced })
}

/// Evicts one entry, starting in `start` and falling back through the other
/// categories in ascending priority order.
///
/// With `force` set and no unprotected victim anywhere, the oldest entry of
/// the lowest-priority category that allows eviction is demoted and evicted.
pub(crate) fn evict_one<V>(state: &mut CacheState<V>, start: Category, force: bool, rt: &Runtime) -> Option<Evicted> {
    let now = rt.clock.now();
    let order = std::iter::once(start).chain(Category::by_priority().into_iter().filter(|c| *c != start));
    for category in order {
        if let Some(key) = select_victim(state, category, now) {
            return evict_key(state, category, &key, false, &rt.metrics);
        }
    }
    if force { force_evict(state, rt) } else { None }
}

fn force_evict<V>(state: &mut CacheState<V>, rt: &Runtime) -> Option<Evicted> {
    let (category, key) = Category::by_priority().into_iter().find_map(|category| {
        if state.settings(category).retention_policy == RetentionPolicy::None {
            return None;
        }
        state.store(category).front().map(|e| (category, e.key.clone()))
    })?;
    warn!("every evictable entry is protected; demoting {category}/{key} to make room");
    if state.store_mut(category).unprotect(&key) {
        CacheMetrics::bump(&rt.metrics.demotions);
    }
    evict_key(state, category, &key, true, &rt.metrics)
}

/// Evicts across categories, lowest priority first, until the global total is
/// at most `target`. Protected entries are left alone. Returns the number evicted.
pub(crate) fn evict_down_to<V>(state: &mut CacheState<V>, target: u64, rt: &Runtime) -> usize {
    let lowest = Category::by_priority()[0];
    let mut evicted = 0;
    while state.total_size_bytes() > target {
        if evict_one(state, lowest, false, rt).is_none() {
            break;
        }
        evicted += 1;
    }
    evicted
}

/// Evicts within `category` only until its size is at most `target`.
pub(crate) fn evict_category_down_to<V>(
    state: &mut CacheState<V>,
    category: Category,
    target: u64,
    rt: &Runtime,
) -> usize {
    let now = rt.clock.now();
    let mut evicted = 0;
    while state.store(category).size_bytes() > target {
        let Some(key) = select_victim(state, category, now) else { break };
        if evict_key(state, category, &key, false, &rt.metrics).is_none() {
            break;
        }
        evicted += 1;
    }
    evicted
}

/// Evicts every unprotected entry idle past its TTL, skipping categories with
/// the `none` policy. Returns the number evicted.
pub(crate) fn purge_expired<V>(state: &mut CacheState<V>, rt: &Runtime) -> usize {
    let now = rt.clock.now();
    let mut evicted = 0;
    for category in Category::ALL {
        let settings = state.settings(category);
        if settings.retention_policy == RetentionPolicy::None {
            continue;
        }
        let store = state.store(category);
        let expired: Vec<String> = store
            .iter()
            .filter(|e| !store.is_protected(&e.key) && e.is_expired(&settings, now))
            .map(|e| e.key.clone())
            .collect();
        for key in expired {
            if evict_key(state, category, &key, false, &rt.metrics).is_some() {
                evicted += 1;
            }
        }
    }
    evicted
}
