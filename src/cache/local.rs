//! Per-client shortcut between a status check and the read that follows it.

use cached::{Cached, SizedCache};
use serde::{Deserialize, Serialize};

fn default_item_size_limit() -> usize {
    1000
}

fn default_max_entries() -> usize {
    1000
}

fn default_true() -> bool {
    true
}

/// Local read cache configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalCacheConfig {
    /// Whether `have()` results are kept for the next `get()`
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Envelopes of this many bytes or more are never kept
    #[serde(default = "default_item_size_limit")]
    pub item_size_limit: usize,

    /// Maximum number of kept envelopes; least recently used go first
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

impl LocalCacheConfig {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }
}

impl Default for LocalCacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            item_size_limit: default_item_size_limit(),
            max_entries: default_max_entries(),
        }
    }
}

/// Envelope bytes keyed by backend key.
pub struct LocalReadCache {
    store: Option<SizedCache<String, Vec<u8>>>,
    item_size_limit: usize,
}

impl LocalReadCache {
    pub fn new(config: &LocalCacheConfig) -> Self {
        let store = config
            .enabled
            .then(|| SizedCache::with_size(config.max_entries.max(1)));
        Self {
            store,
            item_size_limit: config.item_size_limit,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.store.is_some()
    }

    /// Look up `key`. The entry is consumed unless `retain` is set.
    pub fn try_get(&mut self, key: &str, retain: bool) -> Option<Vec<u8>> {
        let store = self.store.as_mut()?;
        if retain {
            store.cache_get(key).cloned()
        } else {
            store.cache_remove(key)
        }
    }

    /// Keep `bytes` if they are under the item size limit.
    ///
    /// Returns whether the entry was stored.
    pub fn put(&mut self, key: &str, bytes: &[u8]) -> bool {
        let limit = self.item_size_limit;
        match self.store.as_mut() {
            Some(store) if bytes.len() < limit => {
                store.cache_set(key.to_string(), bytes.to_vec());
                true
            }
            _ => false,
        }
    }

    pub fn remove(&mut self, key: &str) {
        if let Some(store) = self.store.as_mut() {
            store.cache_remove(key);
        }
    }

    pub fn clear(&mut self) {
        if let Some(store) = self.store.as_mut() {
            store.cache_clear();
        }
    }

    pub fn len(&self) -> usize {
        self.store.as_ref().map_or(0, |store| store.cache_size())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
