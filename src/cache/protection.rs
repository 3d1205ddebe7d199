//! Hot-entry promotion and demotion.

use crate::cache::category::Category;
use crate::cache::clock::Clock;
use crate::cache::core::Runtime;
use crate::cache::metrics::CacheMetrics;
use crate::cache::state::CacheState;
use log::debug;

/// Promotes `key` once its access count reaches the category's hot threshold.
/// Returns true if the entry was promoted by this call.
pub(crate) fn promote_if_hot<V>(state: &mut CacheState<V>, category: Category, key: &str, rt: &Runtime) -> bool {
    let settings = state.settings(category);
    if !settings.protection_enabled {
        return false;
    }
    let store = state.store_mut(category);
    let eligible = store.get(key).is_some_and(|e| !e.is_hot && e.access_count >= settings.hot_threshold);
    if !eligible || !store.protect(key) {
        return false;
    }
    CacheMetrics::bump(&rt.metrics.promotions);
    debug!("promoted {category}/{key} to hot");
    true
}

/// Demotes hot entries idle longer than their category's `hot_ttl`.
pub(crate) fn demote_idle<V>(state: &mut CacheState<V>, rt: &Runtime) -> usize {
    let now = rt.clock.now();
    let mut demoted = 0;
    for category in Category::ALL {
        let hot_ttl = state.settings(category).hot_ttl;
        let store = state.store_mut(category);
        let stale: Vec<String> = store
            .protected_keys()
            .filter(|k| store.get(k).is_some_and(|e| e.idle(now) > hot_ttl))
            .cloned()
            .collect();
        for key in stale {
            if store.unprotect(&key) {
                CacheMetrics::bump(&rt.metrics.demotions);
                debug!("demoted {category}/{key}");
                demoted += 1;
            }
        }
    }
    demoted
}
