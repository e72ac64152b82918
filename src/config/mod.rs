//! Configuration management module for tagcache
//!
//! This module provides layered configuration loading with support for:
//! - TOML configuration files
//! - Environment variable overrides
//! - Named config sections consulted for backend connection parameters
//!
//! # Configuration Priority (lowest to highest)
//! 1. `default.toml` - Base configuration
//! 2. `local.toml` - Local overrides (not committed to version control)
//! 3. `TAGCACHE_*` environment variables
//!
//! # Example
//!
//! ```toml
//! [backend]
//! api = "redis"          # or "memory"
//! host = "localhost"
//! port = 6379
//! key_prefix = "tagcache"
//!
//! [cache]
//! domain = "example.com"
//! default_timeout = 3600.0
//! tag_timeout = 3600.0
//! mode = "silent"        # or "strict"
//!
//! [cache.local]
//! enabled = true
//! item_size_limit = 1000
//! max_entries = 1000
//!
//! [logger]
//! level = "info"
//! format = "full"
//! ```

pub mod error;
pub mod loader;
pub mod settings;
pub mod source;
pub mod validation;

// Re-export public types
pub use error::{ConfigError, Section};
pub use loader::ConfigLoader;
pub use settings::{BackendApi, BackendSettings, CacheSettings, LoggerSettings, ResolvedBackend, Settings};
pub use source::{BACKEND_SECTION, ConfigSource, backend_from_source};
