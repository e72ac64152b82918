//! Configuration validation logic
//!
//! This module provides validation methods for all configuration structures
//! to ensure configuration values are within acceptable ranges and formats.

use crate::config::error::{ConfigError, Section};
use crate::config::settings::{BackendApi, BackendSettings, CacheSettings, LoggerSettings, Settings};

/// Valid log levels
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Valid log formats
const VALID_LOG_FORMATS: &[&str] = &["full", "compact", "json"];

impl BackendSettings {
    /// Validate backend configuration
    ///
    /// # Validation Rules
    /// - API, when set, must name a supported backend variant
    /// - Port, when set, must be between 1 and 65535
    /// - Pool size, when set, must be greater than 0
    /// - Timeout, when set, must be a positive number of seconds
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(api) = self.api.as_deref() {
            api.parse::<BackendApi>()
                .map_err(|_| ConfigError::UnknownBackend { api: api.to_string() })?;
        }

        if self.port == Some(0) {
            return Err(ConfigError::invalid(
                Section::Backend,
                "port",
                "Port must be between 1 and 65535.",
            ));
        }

        if self.pool_size == Some(0) {
            return Err(ConfigError::invalid(
                Section::Backend,
                "pool_size",
                "Pool size must be greater than 0.",
            ));
        }

        if let Some(timeout) = self.timeout {
            validate_seconds(Section::Backend, "timeout", timeout)?;
        }

        Ok(())
    }
}

impl CacheSettings {
    /// Validate cache client configuration
    ///
    /// # Validation Rules
    /// - Default and tag timeouts must be positive
    /// - Local cache limits must be greater than 0 when the cache is enabled
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_seconds(Section::Cache, "default_timeout", self.default_timeout)?;
        validate_seconds(Section::Cache, "tag_timeout", self.tag_timeout)?;

        if self.domain.as_deref().is_some_and(|d| d.trim().is_empty()) {
            return Err(ConfigError::invalid(
                Section::Cache,
                "domain",
                "Domain must not be empty when set.",
            ));
        }

        if self.local.enabled {
            if self.local.item_size_limit == 0 {
                return Err(ConfigError::invalid(
                    Section::Cache,
                    "local.item_size_limit",
                    "Item size limit must be greater than 0. Disable the local cache instead.",
                ));
            }
            if self.local.max_entries == 0 {
                return Err(ConfigError::invalid(
                    Section::Cache,
                    "local.max_entries",
                    "Max entries must be greater than 0. Disable the local cache instead.",
                ));
            }
        }

        if self.tag_timeout < self.default_timeout {
            tracing::warn!(
                tag_timeout = self.tag_timeout,
                default_timeout = self.default_timeout,
                "Tag timeout is shorter than the default timeout; tag indexes will be extended to cover their members"
            );
        }

        Ok(())
    }
}

impl LoggerSettings {
    /// Validate logger configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !VALID_LOG_LEVELS.contains(&self.level.to_lowercase().as_str()) {
            return Err(ConfigError::invalid(
                Section::Logger,
                "level",
                format!(
                    "Invalid log level '{}'. Valid levels: {}",
                    self.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            ));
        }

        if !VALID_LOG_FORMATS.contains(&self.format.to_lowercase().as_str()) {
            return Err(ConfigError::invalid(
                Section::Logger,
                "format",
                format!(
                    "Invalid log format '{}'. Valid formats: {}",
                    self.format,
                    VALID_LOG_FORMATS.join(", ")
                ),
            ));
        }

        Ok(())
    }
}

impl Settings {
    /// Validate all configuration sections
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.backend.validate()?;
        self.cache.validate()?;
        self.logger.validate()?;
        Ok(())
    }
}

fn validate_seconds(section: Section, key: &'static str, seconds: f64) -> Result<(), ConfigError> {
    if !seconds.is_finite() || seconds <= 0.0 {
        return Err(ConfigError::invalid(
            section,
            key,
            format!("Timeout must be a positive number of seconds, got {}.", seconds),
        ));
    }
    Ok(())
}
