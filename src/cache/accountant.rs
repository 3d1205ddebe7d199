//! Space accounting: disk floor, global budget and category budgets.

use crate::cache::category::Category;
use crate::cache::core::Runtime;
use crate::cache::metrics::CacheMetrics;
use crate::cache::policy::{evict_category_down_to, evict_down_to, evict_one};
use crate::cache::state::CacheState;
use crate::utils::fsutil;
use log::{debug, warn};
use parking_lot::Mutex;
use std::path::Path;

/// Source of free-space readings for the cache root.
pub trait DiskProbe: Send + Sync {
    /// Bytes available to unprivileged writers at `path`, or `None` if unknown.
    fn free_bytes(&self, path: &Path) -> Option<u64>;
}

/// Reads free space from the filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct StatvfsProbe;

impl DiskProbe for StatvfsProbe {
    fn free_bytes(&self, path: &Path) -> Option<u64> {
        fsutil::free_disk_bytes(path)
    }
}

/// Reports a settable value; handy for simulating a full disk.
#[derive(Debug, Default)]
pub struct FixedDiskProbe {
    free: Mutex<Option<u64>>,
}

impl FixedDiskProbe {
    #[must_use]
    pub fn new(free: Option<u64>) -> Self {
        Self { free: Mutex::new(free) }
    }

    pub fn set(&self, free: Option<u64>) {
        *self.free.lock() = free;
    }
}

impl DiskProbe for FixedDiskProbe {
    fn free_bytes(&self, _path: &Path) -> Option<u64> {
        *self.free.lock()
    }
}

impl<T: DiskProbe + ?Sized> DiskProbe for std::sync::Arc<T> {
    fn free_bytes(&self, path: &Path) -> Option<u64> {
        (**self).free_bytes(path)
    }
}

/// Whether an entry of `size` bytes may be admitted at all.
pub(crate) fn fits_single_entry<V>(state: &CacheState<V>, size: u64) -> bool {
    size <= state.config.max_entry_bytes()
}

/// Runs the disk floor check. Returns true if the floor was breached.
pub(crate) fn check_disk_floor<V>(state: &mut CacheState<V>, rt: &Runtime) -> bool {
    let floor = state.config.min_free_disk_bytes;
    if floor == 0 {
        return false;
    }
    let Some(free) = rt.disk.free_bytes(&state.config.root_dir) else {
        return false;
    };
    if free >= floor {
        return false;
    }
    CacheMetrics::bump(&rt.metrics.disk_pressure_events);
    let target = state.config.cleanup_target_bytes();
    let evicted = evict_down_to(state, target, rt);
    warn!("free disk space {free} bytes is below the {floor} byte floor; evicted {evicted} entries");
    true
}

/// Makes room for `incoming` bytes in `category`.
///
/// Best effort: admission never fails here. Bytes that cannot be freed
/// because every remaining entry is pinned leave the budget exceeded.
pub(crate) fn make_room<V>(state: &mut CacheState<V>, category: Category, incoming: u64, rt: &Runtime) {
    check_disk_floor(state, rt);

    let max = state.config.max_size_bytes;
    while state.total_size_bytes().saturating_add(incoming) > max {
        if evict_one(state, category, true, rt).is_none() {
            debug!("global budget still exceeded for {category}; nothing left to evict");
            break;
        }
    }

    let settings = state.settings(category);
    if !settings.is_bounded() {
        return;
    }
    while state.store(category).size_bytes().saturating_add(incoming) > settings.max_size_bytes {
        match evict_one(state, category, false, rt) {
            Some(evicted) if evicted.category == category => {}
            Some(evicted) => {
                debug!(
                    "{category} budget exceeded but only {} entries were evictable; giving up",
                    evicted.category
                );
                break;
            }
            None => break,
        }
    }
}

/// Brings a freshly restored state back inside its budgets: each bounded
/// category to its own limit, then the global total. Protected entries are
/// kept. Returns the number evicted.
pub(crate) fn fit_to_budget<V>(state: &mut CacheState<V>, rt: &Runtime) -> usize {
    let mut evicted = 0;
    for category in Category::ALL {
        let settings = state.settings(category);
        if settings.is_bounded() {
            evicted += evict_category_down_to(state, category, settings.max_size_bytes, rt);
        }
    }
    let max = state.config.max_size_bytes;
    evicted += evict_down_to(state, max, rt);
    if state.total_size_bytes() > max {
        warn!(
            "restored cache holds {} bytes over a {max} byte budget; remaining entries are pinned",
            state.total_size_bytes()
        );
    }
    evicted
}
