//! Tag-aware cache client over pluggable key-value backends.
//!
//! This module provides:
//! - A typed entry envelope with its own expiry ([`codec`])
//! - Domain-scoped key hashing ([`namespace`])
//! - A per-client local read cache
//! - Tag indexes stored as ordinary entries
//! - The [`CacheClient`] facade with set/add/get/have/delete, arithmetic and
//!   tag-scoped variants
//! - Memory and Redis backends behind [`BackendStore`]
//!
//! # Configuration
//!
//! ```toml
//! [backend]
//! api = "redis"          # or "memory"
//! host = "localhost"
//! port = 6379
//! pool_size = 4
//! connection_timeout = 5
//! key_prefix = "tagcache"
//!
//! [cache]
//! domain = "example.com"
//! default_timeout = 3600.0
//! tag_timeout = 3600.0
//! mode = "silent"
//! ```
//!
//! # Usage
//!
//! ```ignore
//! let mut client = connect(&settings).await?;
//! client.tag("news").set("front", "page", Timeout::Seconds(60.0)).await?;
//! client.inc("visits", 1, Timeout::Default).await?;
//! client.delete_by_tag().await?;
//! ```

mod arithmetic;
mod client;
pub mod clock;
pub mod codec;
mod error;
mod local;
mod manager;
mod memory;
pub mod namespace;
#[cfg(feature = "redis")]
mod redis;
mod tagged;
mod tags;
mod traits;
mod value;

#[cfg(test)]
mod tests;

pub use client::{CacheClient, CacheClientBuilder, CacheStats, DEFAULT_TIMEOUT, ErrorMode, Fetched};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::CacheError;
pub use local::{LocalCacheConfig, LocalReadCache};
pub use manager::{ClientRegistry, Connector, SharedClient, connect, connect_backend};
pub use memory::MemoryStore;
pub use namespace::KeyNamespacer;
#[cfg(feature = "redis")]
pub use self::redis::RedisStore;
pub use tags::{Tag, TagIndex};
pub use traits::{BackendStore, ExpiryConvention};
pub use value::{CacheValue, Number, Timeout};
