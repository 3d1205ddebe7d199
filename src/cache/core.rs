use crate::cache::accountant::{self, DiskProbe, StatvfsProbe};
use crate::cache::category::Category;
use crate::cache::clock::{Clock, SystemClock};
use crate::cache::config::{CacheConfig, RetentionPolicy};
use crate::cache::entry::Entry;
use crate::cache::maintenance::{self, MaintenanceHandle, MaintenanceReport};
use crate::cache::metrics::{CacheMetrics, CacheMetricsSnapshot};
use crate::cache::persistence::MetadataIndex;
use crate::cache::protection;
use crate::cache::size::{Artifact, CacheWeight};
use crate::cache::state::CacheState;
use crate::cache::stats::{CacheStats, CategoryStats, EntryInfo};
use crate::errors::CacheError;
use crate::utils::logger::METRICS_TARGET;
use crate::utils::num::ratio;
use log::{debug, error, info, warn};
use parking_lot::Mutex;
use std::marker::PhantomData;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Collaborators shared by the facade and the maintenance thread.
pub(crate) struct Runtime {
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) disk: Arc<dyn DiskProbe>,
    pub(crate) metrics: Arc<CacheMetrics>,
}

#[cfg(test)]
impl Runtime {
    pub(crate) fn for_tests(clock: crate::cache::clock::ManualClock) -> Self {
        Self {
            clock: Arc::new(clock),
            disk: Arc::new(accountant::FixedDiskProbe::new(None)),
            metrics: Arc::new(CacheMetrics::default()),
        }
    }
}

pub(crate) struct Shared<V> {
    pub(crate) state: Mutex<CacheState<V>>,
    pub(crate) runtime: Runtime,
}

impl<V> Shared<V> {
    /// Runs one maintenance tick and logs the resulting counters.
    pub(crate) fn maintain(&self) -> MaintenanceReport {
        let mut state = self.state.lock();
        let report = maintenance::run_tick(&mut state, &self.runtime);
        let total = state.total_size_bytes();
        let entries = state.len();
        drop(state);
        let m = self.runtime.metrics.snapshot();
        info!(
            target: METRICS_TARGET,
            "tick expired={} trimmed={} demoted={} entries={} total_bytes={} hits={} misses={} evictions={}",
            report.expired,
            report.trimmed,
            report.demoted,
            entries,
            total,
            m.hits,
            m.misses,
            m.evictions
        );
        report
    }
}

/// Builds a [`Cache`] with optional clock, disk probe and maintenance overrides.
pub struct CacheBuilder<V = Artifact> {
    config: CacheConfig,
    clock: Arc<dyn Clock>,
    disk: Arc<dyn DiskProbe>,
    background: bool,
    _value: PhantomData<fn() -> V>,
}

impl<V: CacheWeight + Clone + Send + 'static> CacheBuilder<V> {
    #[must_use]
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            clock: Arc::new(SystemClock),
            disk: Arc::new(StatvfsProbe),
            background: true,
            _value: PhantomData,
        }
    }

    #[must_use]
    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    #[must_use]
    pub fn disk_probe(mut self, probe: impl DiskProbe + 'static) -> Self {
        self.disk = Arc::new(probe);
        self
    }

    /// Whether to start the background maintenance thread (default true).
    #[must_use]
    pub fn background_maintenance(mut self, enabled: bool) -> Self {
        self.background = enabled;
        self
    }

    /// Validates the configuration, restores the metadata index and starts maintenance.
    ///
    /// # Errors
    /// Returns `InvalidConfig` if validation fails. Index and thread failures
    /// are logged and do not prevent construction.
    pub fn build(self) -> Result<Cache<V>, CacheError> {
        self.config.validate()?;
        let interval = self.config.cleanup_interval();
        let runtime = Runtime { clock: self.clock, disk: self.disk, metrics: Arc::new(CacheMetrics::default()) };
        let mut state = CacheState::new(self.config);
        if state.config.persist_index {
            let path = state.config.index_path();
            match MetadataIndex::load(&path) {
                Ok(Some(index)) => {
                    let restored = index.restore_into(&mut state);
                    let evicted = accountant::fit_to_budget(&mut state, &runtime);
                    info!("restored {restored} entries from {} ({evicted} evicted to fit budget)", path.display());
                }
                Ok(None) => debug!("no cache index at {}", path.display()),
                Err(e) => warn!("failed to load cache index {}: {e}; starting empty", path.display()),
            }
        }
        let shared = Arc::new(Shared { state: Mutex::new(state), runtime });
        let maintenance = if self.background {
            match MaintenanceHandle::spawn(Arc::clone(&shared), interval) {
                Ok(handle) => Some(handle),
                Err(e) => {
                    warn!("could not start cache maintenance thread: {e}");
                    None
                }
            }
        } else {
            None
        };
        Ok(Cache { shared, maintenance: Mutex::new(maintenance), shut_down: AtomicBool::new(false) })
    }
}

/// A thread-safe, multi-category cache for pipeline artifacts.
///
/// Every public operation holds one lock for its full duration, so callers
/// observe operations as atomic. Lookups and writes never fail: a rejected
/// write returns `false`, a miss returns `None`.
pub struct Cache<V = Artifact> {
    shared: Arc<Shared<V>>,
    maintenance: Mutex<Option<MaintenanceHandle>>,
    shut_down: AtomicBool,
}

impl<V: CacheWeight + Clone + Send + 'static> Cache<V> {
    #[must_use]
    pub fn builder(config: CacheConfig) -> CacheBuilder<V> {
        CacheBuilder::new(config)
    }

    /// Creates a cache with the provided configuration and starts background maintenance.
    ///
    /// # Errors
    /// Returns `InvalidConfig` if validation fails.
    pub fn new_with_config(config: CacheConfig) -> Result<Self, CacheError> {
        CacheBuilder::new(config).build()
    }

    /// Looks up `key` and records the access.
    pub fn get(&self, key: &str, category: Category) -> Option<V> {
        let rt = self.runtime();
        let mut state = self.shared.state.lock();
        if !state.config.enabled {
            return None;
        }
        let lru = state.settings(category).retention_policy == RetentionPolicy::Lru;
        let store = state.store_mut(category);
        if !store.get(key).is_some_and(|e| e.value.is_some()) {
            store.counters.misses = store.counters.misses.saturating_add(1);
            CacheMetrics::bump(&rt.metrics.misses);
            return None;
        }
        let value = store.record_access(key, rt.clock.now(), lru).and_then(|e| e.value.clone());
        store.counters.hits = store.counters.hits.saturating_add(1);
        CacheMetrics::bump(&rt.metrics.hits);
        protection::promote_if_hot(&mut state, category, key, rt);
        value
    }

    /// Stores `value` under `key`, sized by `size` or [`CacheWeight::weight`].
    ///
    /// Returns false without touching the cache when it is disabled or the
    /// entry is larger than a tenth of the global budget.
    pub fn set(&self, key: &str, value: V, category: Category, size: Option<u64>) -> bool {
        let size = size.unwrap_or_else(|| value.weight());
        let rt = self.runtime();
        let mut state = self.shared.state.lock();
        if !state.config.enabled {
            return false;
        }
        if !accountant::fits_single_entry(&state, size) {
            debug!(
                "rejecting {category}/{key}: {size} bytes exceeds the {} byte entry cap",
                state.config.max_entry_bytes()
            );
            return false;
        }
        state.remove_entry(category, key);
        accountant::make_room(&mut state, category, size, rt);
        state.insert_entry(category, Entry::new(key.to_string(), value, size, rt.clock.now()));
        CacheMetrics::bump(&rt.metrics.inserts);
        true
    }
}

impl<V> Cache<V> {
    fn runtime(&self) -> &Runtime {
        &self.shared.runtime
    }

    /// Removes `key`. Returns whether an entry was present.
    pub fn delete(&self, key: &str, category: Category) -> bool {
        let removed = self.shared.state.lock().remove_entry(category, key).is_some();
        if removed {
            CacheMetrics::bump(&self.runtime().metrics.deletes);
        }
        removed
    }

    /// Empties one category, or every category when `None`.
    pub fn clear(&self, category: Option<Category>) {
        let mut state = self.shared.state.lock();
        let targets = match category {
            Some(c) => vec![c],
            None => Category::ALL.to_vec(),
        };
        let cleared: usize = targets.into_iter().map(|c| state.clear_category(c)).sum();
        debug!("cleared {cleared} entries");
    }

    #[must_use]
    pub fn contains(&self, key: &str, category: Category) -> bool {
        self.shared.state.lock().store(category).contains(key)
    }

    /// Marks an entry hot so eviction skips it until it idles past `hot_ttl`.
    /// Returns false if the entry does not exist.
    pub fn protect(&self, key: &str, category: Category) -> bool {
        let protected = self.shared.state.lock().store_mut(category).protect(key);
        if protected {
            CacheMetrics::bump(&self.runtime().metrics.promotions);
        }
        protected
    }

    /// Returns true if the entry was protected.
    pub fn unprotect(&self, key: &str, category: Category) -> bool {
        let was = self.shared.state.lock().store_mut(category).unprotect(key);
        if was {
            CacheMetrics::bump(&self.runtime().metrics.demotions);
        }
        was
    }

    #[must_use]
    pub fn is_protected(&self, key: &str, category: Category) -> bool {
        self.shared.state.lock().store(category).is_protected(key)
    }

    #[must_use]
    pub fn stats(&self) -> CacheStats {
        let state = self.shared.state.lock();
        let m = self.runtime().metrics.snapshot();
        CacheStats {
            enabled: state.config.enabled,
            entries: state.len(),
            total_size_bytes: state.total_size_bytes(),
            max_size_bytes: state.config.max_size_bytes,
            hit_count: m.hits,
            miss_count: m.misses,
            eviction_count: m.evictions,
            hit_rate: ratio(m.hits, m.hits.saturating_add(m.misses)),
            categories: Category::ALL.into_iter().map(|c| category_stats(&state, c)).collect(),
        }
    }

    #[must_use]
    pub fn category_stats(&self, category: Category) -> CategoryStats {
        category_stats(&self.shared.state.lock(), category)
    }

    /// Metadata for every entry in `category`, or all categories, oldest first.
    #[must_use]
    pub fn entries(&self, category: Option<Category>) -> Vec<EntryInfo> {
        let state = self.shared.state.lock();
        let categories = match category {
            Some(c) => vec![c],
            None => Category::ALL.to_vec(),
        };
        categories
            .into_iter()
            .flat_map(|c| {
                let store = state.store(c);
                store.iter().map(move |e| EntryInfo {
                    category: c,
                    key: e.key.clone(),
                    size_bytes: e.size_bytes,
                    created_at: e.created_at,
                    last_accessed_at: e.last_accessed_at,
                    access_count: e.access_count,
                    is_hot: e.is_hot,
                    is_protected: store.is_protected(&e.key),
                    has_value: e.value.is_some(),
                })
            })
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.shared.state.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn metrics_snapshot(&self) -> CacheMetricsSnapshot {
        self.runtime().metrics.snapshot()
    }

    #[must_use]
    pub fn config(&self) -> CacheConfig {
        self.shared.state.lock().config.clone()
    }

    /// Turns the cache on or off at runtime. While disabled, `get` misses and `set` rejects.
    pub fn set_enabled(&self, enabled: bool) {
        self.shared.state.lock().config.enabled = enabled;
    }

    /// Runs one maintenance tick synchronously.
    pub fn run_maintenance(&self) -> MaintenanceReport {
        self.shared.maintain()
    }

    /// Writes the metadata index now. Returns false if persistence is off or the write failed.
    pub fn flush(&self) -> bool {
        let (path, index) = {
            let state = self.shared.state.lock();
            if !state.config.persist_index {
                return false;
            }
            (state.config.index_path(), MetadataIndex::capture(&state))
        };
        match index.save(&path) {
            Ok(()) => {
                CacheMetrics::bump(&self.runtime().metrics.index_saves);
                debug!("saved {} index entries to {}", index.len(), path.display());
                true
            }
            Err(e) => {
                CacheMetrics::bump(&self.runtime().metrics.index_save_failures);
                error!("failed to save cache index {}: {e}", path.display());
                false
            }
        }
    }

    /// Stops background maintenance and saves the index. Later calls are no-ops.
    pub fn shutdown(&self) {
        if self.shut_down.swap(true, Ordering::SeqCst) {
            return;
        }
        let timeout = self.shared.state.lock().config.shutdown_timeout();
        if let Some(mut handle) = self.maintenance.lock().take() {
            handle.stop(timeout);
        }
        self.flush();
        info!("cache shut down");
    }

    /// Checks the accounting invariants of every store.
    ///
    /// # Errors
    /// Returns a description of the first violated invariant.
    pub fn validate_invariants(&self) -> Result<(), String> {
        self.shared.state.lock().validate_invariants()
    }
}

fn category_stats<V>(state: &CacheState<V>, category: Category) -> CategoryStats {
    let settings = state.settings(category);
    let store = state.store(category);
    CategoryStats {
        category,
        entries: store.len(),
        size_bytes: store.size_bytes(),
        max_size_bytes: settings.max_size_bytes,
        protected: store.protected_len(),
        retention_policy: settings.retention_policy,
        hits: store.counters.hits,
        misses: store.counters.misses,
        evictions: store.counters.evictions,
    }
}

impl<V> Drop for Cache<V> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
