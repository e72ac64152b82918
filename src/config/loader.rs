//! Configuration loader for tagcache
//!
//! This module provides the `ConfigLoader` struct that handles loading
//! configuration from multiple sources with proper precedence.

use std::path::{Path, PathBuf};

use config::{Config, Environment, File, FileFormat};

use crate::config::error::ConfigError;
use crate::config::settings::Settings;

/// Environment variable for configuration directory
const CONFIG_DIR_ENV: &str = "TAGCACHE_CONFIG_DIR";

/// Environment variable for specific configuration file
const CONFIG_FILE_ENV: &str = "TAGCACHE_CONFIG_FILE";

/// Default configuration directory
const DEFAULT_CONFIG_DIR: &str = "config";

/// Environment variable prefix for configuration overrides
const ENV_PREFIX: &str = "TAGCACHE";

/// Separator for nested configuration keys in environment variables
const ENV_SEPARATOR: &str = "__";

/// Configuration loader that handles layered configuration loading
///
/// The loader supports the following configuration sources (in order of priority):
/// 1. `default.toml` - Base configuration (optional)
/// 2. `local.toml` - Local overrides (optional)
/// 3. `TAGCACHE_*` environment variables (highest priority)
///
/// A single file given with [`ConfigLoader::from_file`] or
/// `TAGCACHE_CONFIG_FILE` replaces the directory layers and must exist.
#[derive(Debug)]
pub struct ConfigLoader {
    /// Configuration directory path
    config_dir: PathBuf,
    /// Specific configuration file path (if set, skips layered loading)
    config_file: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a new configuration loader from the environment
    ///
    /// # Errors
    ///
    /// Returns an error if both `TAGCACHE_CONFIG_DIR` and `TAGCACHE_CONFIG_FILE`
    /// are set, as they are mutually exclusive.
    pub fn new() -> Result<Self, ConfigError> {
        let config_dir = std::env::var(CONFIG_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_DIR));

        let config_file = std::env::var(CONFIG_FILE_ENV).ok().map(PathBuf::from);

        if config_file.is_some() && std::env::var(CONFIG_DIR_ENV).is_ok() {
            return Err(ConfigError::ConflictingSources {
                dir_var: CONFIG_DIR_ENV,
                file_var: CONFIG_FILE_ENV,
            });
        }

        Ok(Self {
            config_dir,
            config_file,
        })
    }

    /// Load a single configuration file instead of the layered directory
    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: PathBuf::from(DEFAULT_CONFIG_DIR),
            config_file: Some(path.into()),
        }
    }

    /// Load layered configuration from a specific directory
    pub fn from_dir(path: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: path.into(),
            config_file: None,
        }
    }

    /// Get the configuration directory path
    pub fn config_dir(&self) -> &PathBuf {
        &self.config_dir
    }

    /// Load and validate settings from all sources
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the single configuration file does not exist
    /// - configuration parsing fails
    /// - configuration validation fails
    pub fn load(&self) -> Result<Settings, ConfigError> {
        let config = self.build_config()?;
        let settings: Settings = config.try_deserialize().map_err(|e| {
            ConfigError::Malformed(e.to_string())
        })?;

        settings.validate()?;

        Ok(settings)
    }

    /// Build the raw `config::Config`, usable as a [`ConfigSource`](super::ConfigSource)
    pub fn build_config(&self) -> Result<Config, ConfigError> {
        let builder = Config::builder();

        let builder = if let Some(ref config_file) = self.config_file {
            Self::add_file_source(builder, config_file, true)?
        } else {
            let builder =
                Self::add_file_source(builder, &self.config_dir.join("default.toml"), false)?;
            Self::add_file_source(builder, &self.config_dir.join("local.toml"), false)?
        };

        // TAGCACHE_BACKEND__HOST -> backend.host
        let builder = Self::add_env_source(builder);

        builder.build().map_err(ConfigError::from)
    }

    fn add_file_source(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
        path: &Path,
        required: bool,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        if required && !path.exists() {
            return Err(ConfigError::unreadable(path, "file not found"));
        }

        Ok(builder.add_source(
            File::new(path.to_str().unwrap_or_default(), FileFormat::Toml).required(required),
        ))
    }

    fn add_env_source(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> config::ConfigBuilder<config::builder::DefaultState> {
        builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator(ENV_SEPARATOR)
                .ignore_empty(true)
                .try_parsing(true),
        )
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new().unwrap_or_else(|_| Self::from_dir(DEFAULT_CONFIG_DIR))
    }
}
