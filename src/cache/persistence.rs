//! Metadata index persistence.
//!
//! The index is a single JSON document keyed by category name, then entry key.
//! Values are never written: a restart restores statistics and accounting, and
//! restored entries read as misses until they are set again.

use crate::cache::category::Category;
use crate::cache::config::RetentionPolicy;
use crate::cache::entry::{Entry, EntryMetadata};
use crate::cache::state::CacheState;
use crate::errors::CacheError;
use crate::utils::fsutil;
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::{BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetadataIndex {
    pub categories: BTreeMap<String, BTreeMap<String, EntryMetadata>>,
}

/// Per-category totals, used by `mediacache inspect`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IndexSummary {
    pub category: String,
    pub entries: usize,
    pub size_bytes: u64,
    pub hot: usize,
}

impl MetadataIndex {
    pub(crate) fn capture<V>(state: &CacheState<V>) -> Self {
        let mut categories = BTreeMap::new();
        for category in Category::ALL {
            let store = state.store(category);
            if store.is_empty() {
                continue;
            }
            let entries = store.iter().map(|e| (e.key.clone(), e.metadata())).collect();
            categories.insert(category.to_string(), entries);
        }
        Self { categories }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.categories.values().map(BTreeMap::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn summary(&self) -> Vec<IndexSummary> {
        self.categories
            .iter()
            .map(|(name, entries)| IndexSummary {
                category: name.clone(),
                entries: entries.len(),
                size_bytes: entries.values().map(|m| m.size_bytes).sum(),
                hot: entries.values().filter(|m| m.is_hot).count(),
            })
            .collect()
    }

    /// Loads the index at `path`. A missing file yields `Ok(None)`.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Option<Self>, CacheError> {
        let raw = match std::fs::read(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_slice(&raw)?))
    }

    /// Writes the index through a temp file in the same directory, then renames it into place.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created or the write or rename fails.
    pub fn save(&self, path: &Path) -> Result<(), CacheError> {
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        fsutil::ensure_dir(dir)?;
        let tmp = NamedTempFile::new_in(dir)?;
        {
            let mut writer = BufWriter::new(tmp.as_file());
            serde_json::to_writer_pretty(&mut writer, self)?;
            writer.flush()?;
        }
        tmp.as_file().sync_all()?;
        tmp.persist(path)?;
        Ok(())
    }

    /// Rebuilds value-less entries into `state`. Returns the number restored.
    ///
    /// Entries larger than the current single-entry cap are dropped. Budgets
    /// are not enforced here; see [`accountant::fit_to_budget`].
    ///
    /// [`accountant::fit_to_budget`]: crate::cache::accountant::fit_to_budget
    pub(crate) fn restore_into<V>(self, state: &mut CacheState<V>) -> usize {
        let cap = state.config.max_entry_bytes();
        let mut restored = 0;
        for (name, entries) in self.categories {
            let category = match name.parse::<Category>() {
                Ok(c) => c,
                Err(_) => {
                    warn!("skipping {} indexed entries for unknown category '{name}'", entries.len());
                    continue;
                }
            };
            let by_access = state.settings(category).retention_policy == RetentionPolicy::Lru;
            let mut ordered: Vec<(String, EntryMetadata)> = entries.into_iter().collect();
            if by_access {
                ordered.sort_by_key(|(_, m)| m.last_accessed_at);
            } else {
                ordered.sort_by_key(|(_, m)| m.created_at);
            }
            for (key, meta) in ordered {
                if meta.size_bytes > cap {
                    warn!("dropping indexed {category}/{key}: {} bytes exceeds the {cap} byte entry cap", meta.size_bytes);
                    continue;
                }
                state.insert_entry(category, Entry::restored(key, &meta));
                restored += 1;
            }
        }
        restored
    }
}
