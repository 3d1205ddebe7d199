use crate::cache::category::Category;
use crate::cache::config::{CacheConfig, CategorySettings};
use crate::cache::entry::Entry;
use crate::cache::store::CategoryStore;

/// Everything guarded by the cache lock: configuration, one store per
/// category and the global byte total.
///
/// Helpers here assume the caller already holds the lock; none of them call
/// back into the public facade.
#[derive(Debug)]
pub(crate) struct CacheState<V> {
    pub(crate) config: CacheConfig,
    settings: [CategorySettings; Category::ALL.len()],
    stores: [CategoryStore<V>; Category::ALL.len()],
    total_size_bytes: u64,
}

impl<V> CacheState<V> {
    pub(crate) fn new(config: CacheConfig) -> Self {
        let settings = std::array::from_fn(|i| config.resolve(Category::ALL[i]));
        Self { config, settings, stores: std::array::from_fn(|_| CategoryStore::new()), total_size_bytes: 0 }
    }

    pub(crate) fn settings(&self, category: Category) -> CategorySettings {
        self.settings[category.index()]
    }

    pub(crate) fn store(&self, category: Category) -> &CategoryStore<V> {
        &self.stores[category.index()]
    }

    pub(crate) fn store_mut(&mut self, category: Category) -> &mut CategoryStore<V> {
        &mut self.stores[category.index()]
    }

    pub(crate) const fn total_size_bytes(&self) -> u64 {
        self.total_size_bytes
    }

    pub(crate) fn len(&self) -> usize {
        self.stores.iter().map(CategoryStore::len).sum()
    }

    /// Appends `entry`, replacing any entry stored under the same key.
    pub(crate) fn insert_entry(&mut self, category: Category, entry: Entry<V>) {
        let size = entry.size_bytes;
        if let Some(old) = self.store_mut(category).push_back(entry) {
            self.total_size_bytes = self.total_size_bytes.saturating_sub(old.size_bytes);
        }
        self.total_size_bytes = self.total_size_bytes.saturating_add(size);
    }

    pub(crate) fn remove_entry(&mut self, category: Category, key: &str) -> Option<Entry<V>> {
        let removed = self.store_mut(category).remove(key)?;
        self.total_size_bytes = self.total_size_bytes.saturating_sub(removed.size_bytes);
        Some(removed)
    }

    pub(crate) fn clear_category(&mut self, category: Category) -> usize {
        let (count, bytes) = self.store_mut(category).clear();
        self.total_size_bytes = self.total_size_bytes.saturating_sub(bytes);
        count
    }

    pub(crate) fn validate_invariants(&self) -> Result<(), String> {
        let mut sum = 0u64;
        for category in Category::ALL {
            let store = self.store(category);
            store.validate_invariants().map_err(|e| format!("{category}: {e}"))?;
            sum += store.size_bytes();
        }
        if sum != self.total_size_bytes {
            return Err(format!("categories sum to {sum} bytes, total reports {}", self.total_size_bytes));
        }
        Ok(())
    }
}
