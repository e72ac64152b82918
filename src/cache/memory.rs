//! In-process backend with absolute-expiry semantics.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::cache::clock::{Clock, SystemClock};
use crate::cache::{BackendStore, CacheError, ExpiryConvention};

/// Minimum clock seconds between two sweeps of expired entries.
const SWEEP_INTERVAL_SECS: u64 = 60;

struct StoredValue {
    bytes: Vec<u8>,
    expires_at: u64,
}

impl StoredValue {
    fn is_live_at(&self, now: f64) -> bool {
        (self.expires_at as f64) > now
    }
}

/// A backend living in this process.
///
/// Expiries are absolute epoch seconds, like memcached timestamps. They are
/// enforced on access, and writes sweep out expired entries at most once per
/// [`SWEEP_INTERVAL_SECS`] so keys that are never read again do not pile up.
pub struct MemoryStore {
    entries: DashMap<String, StoredValue>,
    clock: Arc<dyn Clock>,
    last_sweep: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            clock,
            last_sweep: AtomicU64::new(0),
        }
    }

    fn is_live(&self, value: &StoredValue) -> bool {
        value.is_live_at(self.clock.now())
    }

    /// Drop every expired entry if the last sweep is old enough.
    fn sweep_expired(&self) {
        let now = self.clock.now();
        let now_secs = now as u64;
        let last = self.last_sweep.load(Ordering::Relaxed);
        if now_secs < last.saturating_add(SWEEP_INTERVAL_SECS) {
            return;
        }
        // One writer sweeps; the others carry on.
        if self
            .last_sweep
            .compare_exchange(last, now_secs, Ordering::AcqRel, Ordering::Relaxed)
            .is_err()
        {
            return;
        }

        let before = self.entries.len();
        self.entries.retain(|_, value| value.is_live_at(now));
        let removed = before.saturating_sub(self.entries.len());
        if removed > 0 {
            tracing::debug!(removed, "Swept expired memory entries");
        }
    }

    /// Number of entries held, including ones not yet reaped.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BackendStore for MemoryStore {
    fn expiry_convention(&self) -> ExpiryConvention {
        ExpiryConvention::Absolute
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        if let Some(value) = self.entries.get(key) {
            if self.is_live(&value) {
                return Ok(Some(value.bytes.clone()));
            }
        } else {
            return Ok(None);
        }
        // A concurrent writer may have replaced the stale value meanwhile.
        self.entries.remove_if(key, |_, value| !self.is_live(value));
        Ok(None)
    }

    async fn set(&self, key: &str, value: Vec<u8>, expiry: u64) -> Result<(), CacheError> {
        self.sweep_expired();
        self.entries.insert(
            key.to_string(),
            StoredValue {
                bytes: value,
                expires_at: expiry,
            },
        );
        Ok(())
    }

    async fn add(&self, key: &str, value: Vec<u8>, expiry: u64) -> Result<bool, CacheError> {
        self.sweep_expired();
        let stored = StoredValue {
            bytes: value,
            expires_at: expiry,
        };
        match self.entries.entry(key.to_string()) {
            Entry::Occupied(mut existing) => {
                if self.is_live(existing.get()) {
                    return Ok(false);
                }
                existing.insert(stored);
                Ok(true)
            }
            Entry::Vacant(slot) => {
                slot.insert(stored);
                Ok(true)
            }
        }
    }

    async fn delete(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.entries.remove(key).is_some())
    }

    async fn flush(&self) -> Result<(), CacheError> {
        self.entries.clear();
        Ok(())
    }
}
