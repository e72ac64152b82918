//! Configuration settings structures for tagcache
//!
//! This module defines all configuration structures that can be loaded from
//! TOML files and environment variables.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::cache::{CacheError, DEFAULT_TIMEOUT, ErrorMode, LocalCacheConfig};
use crate::logger::{LogFormat, LoggerConfig};

// ============================================================================
// Default value functions
// ============================================================================

fn default_timeout() -> f64 {
    DEFAULT_TIMEOUT
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "full".to_string()
}

/// Host used when neither the caller nor the config source names one
pub const DEFAULT_HOST: &str = "localhost";

/// Port used when neither the caller nor the config source names one
pub const DEFAULT_PORT: u16 = 11211;

/// Default port of the redis variant
pub const DEFAULT_REDIS_PORT: u16 = 6379;

const DEFAULT_POOL_SIZE: u32 = 4;

const DEFAULT_CONNECTION_TIMEOUT: u64 = 5;

const DEFAULT_KEY_PREFIX: &str = "tagcache";

// ============================================================================
// Backend Configuration
// ============================================================================

/// Backend variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BackendApi {
    /// In-process store, absolute expiry convention
    #[default]
    Memory,
    /// Redis server, relative expiry convention
    Redis,
}

impl BackendApi {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendApi::Memory => "memory",
            BackendApi::Redis => "redis",
        }
    }

    pub fn default_port(&self) -> u16 {
        match self {
            BackendApi::Memory => DEFAULT_PORT,
            BackendApi::Redis => DEFAULT_REDIS_PORT,
        }
    }
}

impl fmt::Display for BackendApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendApi {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "memory" => Ok(BackendApi::Memory),
            "redis" => Ok(BackendApi::Redis),
            other => Err(CacheError::Configuration(format!(
                "Unsupported backend api '{}'. Supported: memory, redis",
                other
            ))),
        }
    }
}

/// Backend connection section as found in a config source
///
/// Every field is optional so that explicit parameters, the config source
/// and built-in defaults can be layered with [`BackendSettings::or`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendSettings {
    /// Backend variant name (`memory` or `redis`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    /// Default entry timeout in seconds, overriding `cache.default_timeout`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<f64>,

    /// Connection pool size (redis)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pool_size: Option<u32>,

    /// Connection timeout in seconds (redis)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_timeout: Option<u64>,

    /// Prefix applied to every backend key (redis)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_prefix: Option<String>,

    /// Whether to use TLS (redis)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tls_enabled: Option<bool>,
}

impl BackendSettings {
    /// Fill every unset field from `fallback`.
    pub fn or(self, fallback: BackendSettings) -> Self {
        Self {
            api: self.api.or(fallback.api),
            host: self.host.or(fallback.host),
            port: self.port.or(fallback.port),
            timeout: self.timeout.or(fallback.timeout),
            pool_size: self.pool_size.or(fallback.pool_size),
            connection_timeout: self.connection_timeout.or(fallback.connection_timeout),
            key_prefix: self.key_prefix.or(fallback.key_prefix),
            tls_enabled: self.tls_enabled.or(fallback.tls_enabled),
        }
    }

    /// Apply built-in defaults and parse the backend variant.
    pub fn resolve(&self) -> Result<ResolvedBackend, CacheError> {
        let api = match self.api.as_deref() {
            Some(name) => name.parse()?,
            None => BackendApi::default(),
        };
        Ok(ResolvedBackend {
            api,
            host: self.host.clone().unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: self.port.unwrap_or_else(|| api.default_port()),
            timeout: self.timeout,
            pool_size: self.pool_size.unwrap_or(DEFAULT_POOL_SIZE),
            connection_timeout: self.connection_timeout.unwrap_or(DEFAULT_CONNECTION_TIMEOUT),
            key_prefix: self
                .key_prefix
                .clone()
                .unwrap_or_else(|| DEFAULT_KEY_PREFIX.to_string()),
            tls_enabled: self.tls_enabled.unwrap_or(false),
        })
    }
}

/// Backend parameters after defaults have been applied
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedBackend {
    pub api: BackendApi,
    pub host: String,
    pub port: u16,
    pub timeout: Option<f64>,
    pub pool_size: u32,
    pub connection_timeout: u64,
    pub key_prefix: String,
    pub tls_enabled: bool,
}

impl ResolvedBackend {
    /// Canonical identity used to share clients between callers.
    pub fn canonical_key(&self) -> String {
        format!(
            "{}://{}:{}/{}{}",
            self.api,
            self.host.to_lowercase(),
            self.port,
            self.key_prefix,
            if self.tls_enabled { "?tls" } else { "" }
        )
    }
}

impl Default for ResolvedBackend {
    fn default() -> Self {
        Self {
            api: BackendApi::default(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            timeout: None,
            pool_size: DEFAULT_POOL_SIZE,
            connection_timeout: DEFAULT_CONNECTION_TIMEOUT,
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            tls_enabled: false,
        }
    }
}

// ============================================================================
// Cache Client Configuration
// ============================================================================

/// Cache client session configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheSettings {
    /// Namespace for logical names; `localhost` when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,

    /// Hash names into the domain namespace
    #[serde(default = "default_true")]
    pub namespacing: bool,

    /// Timeout in seconds applied when a write does not name one
    #[serde(default = "default_timeout")]
    pub default_timeout: f64,

    /// Minimum lifetime of tag index entries in seconds
    #[serde(default = "default_timeout")]
    pub tag_timeout: f64,

    /// Error reporting mode
    #[serde(default)]
    pub mode: ErrorMode,

    /// Local read cache settings
    #[serde(default)]
    pub local: LocalCacheConfig,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            domain: None,
            namespacing: true,
            default_timeout: default_timeout(),
            tag_timeout: default_timeout(),
            mode: ErrorMode::default(),
            local: LocalCacheConfig::default(),
        }
    }
}

// ============================================================================
// Logger Configuration
// ============================================================================

/// Logger configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggerSettings {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format (full, compact, json)
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Whether console output is colored
    #[serde(default = "default_true")]
    pub colored: bool,

    /// Also append logs to this file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl Default for LoggerSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            colored: true,
            file: None,
        }
    }
}

impl LoggerSettings {
    /// Convert to the logger module's configuration.
    pub fn to_logger_config(&self) -> LoggerConfig {
        LoggerConfig {
            level: self.level.clone(),
            format: self.format.parse().unwrap_or(LogFormat::Full),
            colored: self.colored,
            file: self.file.clone(),
        }
    }
}

// ============================================================================
// Main Settings Structure
// ============================================================================

/// Complete tagcache settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Backend connection section
    #[serde(default)]
    pub backend: BackendSettings,

    /// Cache client configuration
    #[serde(default)]
    pub cache: CacheSettings,

    /// Logger configuration
    #[serde(default)]
    pub logger: LoggerSettings,
}
