//! BackendStore trait definition.

use async_trait::async_trait;

use crate::cache::CacheError;

/// How a backend interprets the expiry passed to `set`/`add`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryConvention {
    /// Seconds from now.
    Relative,
    /// Seconds since the Unix epoch.
    Absolute,
}

impl ExpiryConvention {
    /// Backend expiry argument for an entry expiring at `expires_at`.
    ///
    /// Rounded up to whole seconds and never below one second; the envelope
    /// keeps the precise value.
    pub fn expiry_for(self, expires_at: f64, now: f64) -> u64 {
        let seconds = match self {
            ExpiryConvention::Relative => expires_at - now,
            ExpiryConvention::Absolute => expires_at,
        };
        seconds.ceil().max(1.0) as u64
    }
}

/// Raw key-value operations the cache client is built on.
///
/// Keys arrive already namespaced and values already enveloped; adapters
/// never interpret either.
#[async_trait]
pub trait BackendStore: Send + Sync {
    /// How `expiry` arguments should be computed for this backend.
    fn expiry_convention(&self) -> ExpiryConvention;

    /// Get the raw bytes stored under `key`.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    /// Store `value` under `key`, replacing any existing entry.
    async fn set(&self, key: &str, value: Vec<u8>, expiry: u64) -> Result<(), CacheError>;

    /// Store `value` only if `key` is absent. Returns `false` if it existed.
    async fn add(&self, key: &str, value: Vec<u8>, expiry: u64) -> Result<bool, CacheError>;

    /// Remove `key`. Returns whether something was removed.
    async fn delete(&self, key: &str) -> Result<bool, CacheError>;

    /// Remove every entry this store owns.
    async fn flush(&self) -> Result<(), CacheError>;

    /// Get several keys at once. The result is aligned with `keys`.
    async fn get_multi(&self, keys: &[String]) -> Result<Vec<Option<Vec<u8>>>, CacheError> {
        let mut values = Vec::with_capacity(keys.len());
        for key in keys {
            values.push(self.get(key).await?);
        }
        Ok(values)
    }

    /// Store several entries with one expiry.
    async fn set_multi(&self, entries: Vec<(String, Vec<u8>)>, expiry: u64) -> Result<(), CacheError> {
        for (key, value) in entries {
            self.set(&key, value, expiry).await?;
        }
        Ok(())
    }
}
