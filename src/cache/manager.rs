//! Client construction and sharing.
//!
//! [`Connector`] turns configuration into a connected [`CacheClient`];
//! [`ClientRegistry`] hands out one shared client per distinct configuration.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;

use crate::cache::clock::{Clock, SystemClock};
use crate::cache::memory::MemoryStore;
#[cfg(feature = "redis")]
use crate::cache::redis::RedisStore;
use crate::cache::{BackendStore, CacheClient, CacheError};
use crate::config::settings::{BackendApi, BackendSettings, CacheSettings, ResolvedBackend, Settings};
use crate::config::source::{ConfigSource, backend_from_source};

/// A client shared between tasks.
pub type SharedClient = Arc<Mutex<CacheClient>>;

/// Open the backend described by `backend`.
pub async fn connect_backend(
    backend: &ResolvedBackend,
    clock: Arc<dyn Clock>,
) -> Result<Arc<dyn BackendStore>, CacheError> {
    let store: Arc<dyn BackendStore> = match backend.api {
        BackendApi::Memory => Arc::new(MemoryStore::with_clock(clock)),
        #[cfg(feature = "redis")]
        BackendApi::Redis => Arc::new(RedisStore::connect(backend).await?),
        #[cfg(not(feature = "redis"))]
        BackendApi::Redis => {
            return Err(CacheError::Configuration(
                "redis support is not compiled in".to_string(),
            ));
        }
    };
    tracing::info!(backend = %backend.canonical_key(), "Connected cache backend");
    Ok(store)
}

/// Connect a client for the given settings.
pub async fn connect(settings: &Settings) -> Result<CacheClient, CacheError> {
    Connector::new()
        .backend(settings.backend.clone())
        .cache(settings.cache.clone())
        .connect()
        .await
}

/// Builder for a connected [`CacheClient`].
///
/// Backend parameters come from the explicit [`BackendSettings`] first, then
/// from the `backend` section of an optional [`ConfigSource`], then from
/// built-in defaults. Construction errors are always returned, whatever the
/// error mode in [`CacheSettings`].
pub struct Connector<'a> {
    explicit: BackendSettings,
    source: Option<&'a dyn ConfigSource>,
    cache: CacheSettings,
    clock: Arc<dyn Clock>,
}

impl<'a> Connector<'a> {
    pub fn new() -> Self {
        Self {
            explicit: BackendSettings::default(),
            source: None,
            cache: CacheSettings::default(),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn backend(mut self, explicit: BackendSettings) -> Self {
        self.explicit = explicit;
        self
    }

    pub fn source(mut self, source: &'a dyn ConfigSource) -> Self {
        self.source = Some(source);
        self
    }

    pub fn cache(mut self, cache: CacheSettings) -> Self {
        self.cache = cache;
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// The backend parameters this connector would use.
    pub fn resolve(&self) -> Result<ResolvedBackend, CacheError> {
        backend_from_source(self.explicit.clone(), self.source).resolve()
    }

    pub async fn connect(self) -> Result<CacheClient, CacheError> {
        let resolved = self.resolve()?;
        let backend = connect_backend(&resolved, Arc::clone(&self.clock)).await?;

        let mut builder = CacheClient::builder(backend)
            .settings(&self.cache)
            .clock(self.clock);
        if let Some(timeout) = resolved.timeout {
            builder = builder.default_timeout(timeout);
        }
        Ok(builder.build())
    }
}

impl Default for Connector<'_> {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared clients keyed by canonical configuration.
///
/// Two lookups with settings that resolve to the same backend, domain and
/// namespacing get the same client. The first registration's remaining
/// session settings win. Clients live until removed or until the registry is
/// dropped.
#[derive(Default)]
pub struct ClientRegistry {
    clients: DashMap<String, SharedClient>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry key for `settings`.
    pub fn key_for(settings: &Settings) -> Result<String, CacheError> {
        let backend = settings.backend.resolve()?;
        let domain = match (&settings.cache.domain, settings.cache.namespacing) {
            (_, false) => "-".to_string(),
            (Some(domain), true) => crate::cache::namespace::normalize_domain(domain),
            (None, true) => crate::cache::namespace::DEFAULT_DOMAIN.to_string(),
        };
        Ok(format!("{}#{}", backend.canonical_key(), domain))
    }

    /// The client for `settings`, connecting one on first use.
    pub async fn get_or_connect(&self, settings: &Settings) -> Result<SharedClient, CacheError> {
        let key = Self::key_for(settings)?;
        if let Some(client) = self.clients.get(&key) {
            return Ok(Arc::clone(client.value()));
        }

        let client = Arc::new(Mutex::new(connect(settings).await?));
        // Another task may have connected the same key meanwhile; keep the first.
        let shared = self.clients.entry(key.clone()).or_insert(client);
        tracing::debug!(key = %key, "Registered cache client");
        Ok(Arc::clone(shared.value()))
    }

    pub fn remove(&self, settings: &Settings) -> Result<Option<SharedClient>, CacheError> {
        let key = Self::key_for(settings)?;
        Ok(self.clients.remove(&key).map(|(_, client)| client))
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    pub fn clear(&self) {
        self.clients.clear();
    }
}
