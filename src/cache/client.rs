//! The cache client facade.
//!
//! A [`CacheClient`] owns one session: a namespace, an optional active tag, a
//! local read cache, statistics and an error log. It talks to the storage
//! through an `Arc<dyn BackendStore>` only.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::cache::clock::{Clock, SystemClock};
use crate::cache::codec;
use crate::cache::local::{LocalCacheConfig, LocalReadCache};
use crate::cache::namespace::{DEFAULT_DOMAIN, KeyNamespacer};
use crate::cache::tags::{IndexContext, Tag, TagIndex};
use crate::cache::{BackendStore, CacheError, CacheValue, Timeout};
use crate::config::settings::CacheSettings;

/// Default lifetime of entries and tag indexes in seconds.
pub const DEFAULT_TIMEOUT: f64 = 3600.0;

/// How a client surfaces failed operations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorMode {
    /// Record the error, log it and carry on with a safe default.
    #[default]
    Silent,
    /// Return the error to the caller.
    Strict,
}

/// Per-client counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Names looked up.
    pub hits: u64,
    /// Names written, successful or not.
    pub sets: u64,
    /// Lookups that found nothing usable.
    pub loose_hits: u64,
}

/// Batch read results keyed by logical name.
pub type Fetched = BTreeMap<String, Option<CacheValue>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum WriteKind {
    Set,
    Add,
}

/// Builder for [`CacheClient`].
pub struct CacheClientBuilder {
    backend: Arc<dyn BackendStore>,
    clock: Arc<dyn Clock>,
    domain: String,
    namespacing: bool,
    default_timeout: f64,
    tag_timeout: f64,
    mode: ErrorMode,
    local: LocalCacheConfig,
}

impl CacheClientBuilder {
    pub fn new(backend: Arc<dyn BackendStore>) -> Self {
        Self {
            backend,
            clock: Arc::new(SystemClock),
            domain: DEFAULT_DOMAIN.to_string(),
            namespacing: true,
            default_timeout: DEFAULT_TIMEOUT,
            tag_timeout: DEFAULT_TIMEOUT,
            mode: ErrorMode::default(),
            local: LocalCacheConfig::default(),
        }
    }

    /// Apply every field of a `[cache]` config section.
    pub fn settings(mut self, settings: &CacheSettings) -> Self {
        if let Some(domain) = &settings.domain {
            self.domain = domain.clone();
        }
        self.namespacing = settings.namespacing;
        self.default_timeout = settings.default_timeout;
        self.tag_timeout = settings.tag_timeout;
        self.mode = settings.mode;
        self.local = settings.local.clone();
        self
    }

    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }

    pub fn namespacing(mut self, enabled: bool) -> Self {
        self.namespacing = enabled;
        self
    }

    pub fn default_timeout(mut self, seconds: f64) -> Self {
        self.default_timeout = seconds;
        self
    }

    pub fn tag_timeout(mut self, seconds: f64) -> Self {
        self.tag_timeout = seconds;
        self
    }

    pub fn mode(mut self, mode: ErrorMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn local_cache(mut self, config: LocalCacheConfig) -> Self {
        self.local = config;
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn build(self) -> CacheClient {
        let namespace = if self.namespacing {
            KeyNamespacer::new(&self.domain)
        } else {
            KeyNamespacer::disabled()
        };
        CacheClient {
            backend: self.backend,
            clock: self.clock,
            namespace,
            local: LocalReadCache::new(&self.local),
            tags: TagIndex::new(self.tag_timeout),
            default_timeout: self.default_timeout,
            mode: self.mode,
            stats: CacheStats::default(),
            errors: Vec::new(),
        }
    }
}

/// A cache session over one backend.
///
/// Every operation takes `&mut self`; share a client between tasks through a
/// [`ClientRegistry`](super::ClientRegistry) or your own mutex.
///
/// ```ignore
/// let mut client = CacheClient::new(Arc::new(MemoryStore::new()));
/// client.tag("news").set("front", "page", Timeout::Seconds(60.0)).await?;
/// let members = client.tag_members().await?;
/// client.delete_by_tag().await?;
/// ```
pub struct CacheClient {
    backend: Arc<dyn BackendStore>,
    clock: Arc<dyn Clock>,
    namespace: KeyNamespacer,
    local: LocalReadCache,
    tags: TagIndex,
    default_timeout: f64,
    mode: ErrorMode,
    stats: CacheStats,
    errors: Vec<CacheError>,
}

impl CacheClient {
    pub fn builder(backend: Arc<dyn BackendStore>) -> CacheClientBuilder {
        CacheClientBuilder::new(backend)
    }

    /// A client with default settings for the `localhost` domain.
    pub fn new(backend: Arc<dyn BackendStore>) -> Self {
        Self::builder(backend).build()
    }

    // ========================================================================
    // Session state
    // ========================================================================

    pub fn backend(&self) -> &Arc<dyn BackendStore> {
        &self.backend
    }

    pub fn domain(&self) -> &str {
        self.namespace.domain()
    }

    pub fn namespace(&self) -> &KeyNamespacer {
        &self.namespace
    }

    pub fn mode(&self) -> ErrorMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: ErrorMode) -> &mut Self {
        self.mode = mode;
        self
    }

    pub fn default_timeout(&self) -> f64 {
        self.default_timeout
    }

    pub fn set_default_timeout(&mut self, seconds: f64) -> &mut Self {
        self.default_timeout = seconds;
        self
    }

    pub fn tag_timeout(&self) -> f64 {
        self.tags.timeout()
    }

    pub fn set_tag_timeout(&mut self, seconds: f64) -> &mut Self {
        self.tags.set_timeout(seconds);
        self
    }

    /// Make `tag` the active tag. Later writes are recorded under it.
    pub fn tag(&mut self, tag: impl Into<Tag>) -> &mut Self {
        self.tags.activate(tag.into());
        self
    }

    pub fn untag(&mut self) -> &mut Self {
        self.tags.deactivate();
        self
    }

    pub fn active_tag(&self) -> Option<&Tag> {
        self.tags.active()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Errors recorded in silent mode, oldest first.
    pub fn errors(&self) -> &[CacheError] {
        &self.errors
    }

    pub fn take_errors(&mut self) -> Vec<CacheError> {
        std::mem::take(&mut self.errors)
    }

    // ========================================================================
    // Plain operations
    // ========================================================================

    /// Store `value` under `name`, replacing what was there.
    pub async fn set(
        &mut self,
        name: &str,
        value: impl Into<CacheValue>,
        timeout: Timeout,
    ) -> Result<&mut Self, CacheError> {
        let value = value.into();
        self.write_entry(name, &value, timeout, WriteKind::Set).await?;
        Ok(self)
    }

    /// Store every entry with one timeout using the backend's batch write.
    pub async fn set_many<I, K, V>(&mut self, entries: I, timeout: Timeout) -> Result<&mut Self, CacheError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<CacheValue>,
    {
        let Some(lifetime) = self.lifetime(timeout)? else {
            return Ok(self);
        };
        let now = self.now();
        let expires_at = now + lifetime;
        let mut names = Vec::new();
        let mut packed = Vec::new();
        for (name, value) in entries {
            let name = name.into();
            let key = self.namespace.key(&name);
            self.local.remove(&key);
            match codec::pack_until(&value.into(), expires_at) {
                Ok(bytes) => {
                    packed.push((key, bytes));
                    names.push(name);
                }
                Err(e) => self.report(e)?,
            }
        }
        if packed.is_empty() {
            return Ok(self);
        }

        self.stats.sets += packed.len() as u64;
        let expiry = self.backend.expiry_convention().expiry_for(expires_at, now);
        match self.backend.set_multi(packed, expiry).await {
            Ok(()) => {
                tracing::debug!(count = names.len(), "Stored cache entries");
                for name in &names {
                    self.record_membership(name, expires_at).await?;
                }
            }
            Err(e) => self.report(write_error(&names.join(","), e))?,
        }
        Ok(self)
    }

    /// Store `value` only if `name` holds nothing yet.
    pub async fn add(
        &mut self,
        name: &str,
        value: impl Into<CacheValue>,
        timeout: Timeout,
    ) -> Result<&mut Self, CacheError> {
        let value = value.into();
        self.write_entry(name, &value, timeout, WriteKind::Add).await?;
        Ok(self)
    }

    pub async fn add_many<I, K, V>(&mut self, entries: I, timeout: Timeout) -> Result<&mut Self, CacheError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<CacheValue>,
    {
        for (name, value) in entries {
            let name = name.into();
            self.write_entry(&name, &value.into(), timeout, WriteKind::Add).await?;
        }
        Ok(self)
    }

    /// Fetch `name`. Missing and expired entries are `None`.
    pub async fn get(&mut self, name: &str) -> Result<Option<CacheValue>, CacheError> {
        let mut fetched = self.read_batch(&[name.to_string()], false).await?;
        Ok(fetched.pop().and_then(|(_, value)| value))
    }

    pub async fn get_many<S: AsRef<str>>(&mut self, names: &[S]) -> Result<Fetched, CacheError> {
        let names: Vec<String> = names.iter().map(|n| n.as_ref().to_string()).collect();
        Ok(self.read_batch(&names, false).await?.into_iter().collect())
    }

    /// Whether `name` holds a live entry.
    ///
    /// Small entries are kept in the local read cache so that the following
    /// `get` is served without a round trip.
    pub async fn have(&mut self, name: &str) -> Result<bool, CacheError> {
        self.have_many(&[name]).await
    }

    /// Whether every name holds a live entry.
    pub async fn have_many<S: AsRef<str>>(&mut self, names: &[S]) -> Result<bool, CacheError> {
        let names: Vec<String> = names.iter().map(|n| n.as_ref().to_string()).collect();
        let fetched = self.read_batch(&names, true).await?;
        Ok(fetched.iter().all(|(_, value)| value.is_some()))
    }

    pub async fn delete(&mut self, name: &str) -> Result<&mut Self, CacheError> {
        self.delete_many(&[name]).await
    }

    pub async fn delete_many<S: AsRef<str>>(&mut self, names: &[S]) -> Result<&mut Self, CacheError> {
        let keys: Vec<String> = names.iter().map(|n| self.namespace.key(n.as_ref())).collect();
        self.delete_keys(keys).await?;
        Ok(self)
    }

    /// Delete `name` and report whether it held a live entry beforehand.
    pub async fn delete_checked(&mut self, name: &str) -> Result<bool, CacheError> {
        self.delete_many_checked(&[name]).await
    }

    pub async fn delete_many_checked<S: AsRef<str>>(&mut self, names: &[S]) -> Result<bool, CacheError> {
        let existed = self.have_many(names).await?;
        self.delete_many(names).await?;
        Ok(existed)
    }

    /// Drop everything the backend holds for this client, and the local cache.
    pub async fn flush(&mut self) -> Result<&mut Self, CacheError> {
        self.local.clear();
        match self.backend.flush().await {
            Ok(()) => tracing::info!(domain = self.domain(), "Flushed cache backend"),
            Err(e) => self.report(e)?,
        }
        Ok(self)
    }

    // ========================================================================
    // Internals shared with the arithmetic and tag-scoped operations
    // ========================================================================

    pub(super) fn now(&self) -> f64 {
        self.clock.now()
    }

    /// Surface `err` according to the error mode.
    pub(super) fn report(&mut self, err: CacheError) -> Result<(), CacheError> {
        tracing::warn!(error = %err, mode = ?self.mode, "Cache operation failed");
        match self.mode {
            ErrorMode::Strict => Err(err),
            ErrorMode::Silent => {
                self.errors.push(err);
                Ok(())
            }
        }
    }

    pub(super) fn index_context(&self) -> IndexContext<'_> {
        IndexContext {
            backend: self.backend.as_ref(),
            namespace: &self.namespace,
            now: self.clock.now(),
        }
    }

    pub(super) fn tag_index(&self) -> &TagIndex {
        &self.tags
    }

    /// Write one entry. Returns whether the backend accepted it.
    pub(super) async fn write_entry(
        &mut self,
        name: &str,
        value: &CacheValue,
        timeout: Timeout,
        kind: WriteKind,
    ) -> Result<bool, CacheError> {
        let key = self.namespace.key(name);
        self.local.remove(&key);

        let Some(lifetime) = self.lifetime(timeout)? else {
            return Ok(false);
        };
        let now = self.now();
        let expires_at = now + lifetime;
        let bytes = match codec::pack_until(value, expires_at) {
            Ok(bytes) => bytes,
            Err(e) => {
                self.report(e)?;
                return Ok(false);
            }
        };
        let expiry = self.backend.expiry_convention().expiry_for(expires_at, now);

        self.stats.sets += 1;
        let outcome = match kind {
            WriteKind::Set => self.backend.set(&key, bytes, expiry).await.map(|()| true),
            WriteKind::Add => self.add_entry(&key, bytes, expiry, now).await,
        };
        match outcome {
            Ok(true) => {
                tracing::debug!(name, expiry, "Stored cache entry");
                self.record_membership(name, expires_at).await?;
                Ok(true)
            }
            Ok(false) => {
                self.report(CacheError::write_failure(name, "entry already exists"))?;
                Ok(false)
            }
            Err(e) => {
                self.report(write_error(name, e))?;
                Ok(false)
            }
        }
    }

    /// Seconds an entry written with `timeout` lives, or `None` after
    /// reporting a timeout that cannot be encoded.
    fn lifetime(&mut self, timeout: Timeout) -> Result<Option<f64>, CacheError> {
        let seconds = timeout.resolve(self.default_timeout);
        if seconds.is_finite() {
            return Ok(Some(seconds));
        }
        self.report(CacheError::Operation(format!(
            "timeout must be a finite number of seconds, got {}",
            seconds
        )))?;
        Ok(None)
    }

    /// Backend `add` that also claims a key whose stored envelope is stale
    /// or unreadable. Backends keep bytes for whole seconds, so such bytes
    /// can outlive the envelope they carry.
    async fn add_entry(&self, key: &str, bytes: Vec<u8>, expiry: u64, now: f64) -> Result<bool, CacheError> {
        if self.backend.add(key, bytes.clone(), expiry).await? {
            return Ok(true);
        }
        let existing = self.backend.get(key).await?;
        if existing.as_deref().and_then(|raw| codec::open(raw, now)).is_some() {
            return Ok(false);
        }
        self.backend.set(key, bytes, expiry).await?;
        tracing::debug!(key = %key, "Replaced stale entry on add");
        Ok(true)
    }

    /// Read `names`, local cache first, then one backend batch for the rest.
    ///
    /// A status read keeps local entries and populates the local cache from
    /// the backend; a plain read consumes them.
    pub(super) async fn read_batch(
        &mut self,
        names: &[String],
        status: bool,
    ) -> Result<Vec<(String, Option<CacheValue>)>, CacheError> {
        let now = self.now();
        let mut results: Vec<(String, Option<CacheValue>)> = Vec::with_capacity(names.len());
        let mut pending: Vec<(usize, String)> = Vec::new();

        for name in names {
            self.stats.hits += 1;
            let key = self.namespace.key(name);
            let local = self
                .local
                .try_get(&key, status)
                .and_then(|bytes| codec::unpack(&bytes, now));
            if local.is_none() {
                pending.push((results.len(), key));
            }
            results.push((name.clone(), local));
        }

        if !pending.is_empty() {
            let keys: Vec<String> = pending.iter().map(|(_, key)| key.clone()).collect();
            let raw = match self.backend.get_multi(&keys).await {
                Ok(raw) => raw,
                Err(e) => {
                    self.report(e)?;
                    vec![None; keys.len()]
                }
            };
            for ((index, key), bytes) in pending.into_iter().zip(raw) {
                let Some(bytes) = bytes else { continue };
                let value = codec::unpack(&bytes, now);
                if status && value.is_some() {
                    self.local.put(&key, &bytes);
                }
                results[index].1 = value;
            }
        }

        let misses = results.iter().filter(|(_, value)| value.is_none()).count();
        self.stats.loose_hits += misses as u64;
        tracing::debug!(requested = names.len(), misses, "Read cache entries");
        Ok(results)
    }

    /// Delete raw backend keys and their local copies.
    pub(super) async fn delete_keys(&mut self, keys: Vec<String>) -> Result<(), CacheError> {
        for key in keys {
            self.local.remove(&key);
            match self.backend.delete(&key).await {
                Ok(removed) => tracing::debug!(key = %key, removed, "Deleted cache entry"),
                Err(e) => self.report(e)?,
            }
        }
        Ok(())
    }

    async fn record_membership(&mut self, name: &str, expires_at: f64) -> Result<(), CacheError> {
        if self.tags.active().is_none() {
            return Ok(());
        }
        let result = {
            let ctx = self.index_context();
            self.tags.record_member(&ctx, name, expires_at).await
        };
        for key in self.tags.index_keys(&self.namespace) {
            self.local.remove(&key);
        }
        match result {
            Ok(()) => Ok(()),
            Err(e) => self.report(e),
        }
    }
}

fn write_error(name: &str, err: CacheError) -> CacheError {
    match err {
        CacheError::Connection(_) => err,
        other => CacheError::write_failure(name, other.to_string()),
    }
}
