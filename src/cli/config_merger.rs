//! Configuration merger for CLI arguments and config files
//!
//! This module handles merging CLI argument overrides with file-based configuration,
//! implementing the configuration precedence logic.

use std::path::PathBuf;

use super::parser::Cli;
use crate::cache::ErrorMode;
use crate::config::error::ConfigError;
use crate::config::{ConfigLoader, settings::Settings};

/// Applies CLI overrides on top of file-based configuration
pub struct ConfigurationMerger {
    base_config: Settings,
}

impl ConfigurationMerger {
    pub fn new(base_config: Settings) -> Self {
        Self { base_config }
    }

    /// Load the base configuration from `config_path`, or from the default
    /// layered directory when no path is given.
    ///
    /// # Errors
    /// Returns ConfigError if configuration loading or validation fails
    pub fn from_config_path(config_path: Option<&PathBuf>) -> Result<Self, ConfigError> {
        let config = match config_path {
            Some(path) => {
                Self::validate_config_file_access(path)?;
                ConfigLoader::from_file(path.clone()).load()?
            }
            None => ConfigLoader::new()?.load()?,
        };

        Ok(Self::new(config))
    }

    fn validate_config_file_access(path: &PathBuf) -> Result<(), ConfigError> {
        if !path.is_file() {
            return Err(ConfigError::unreadable(path.clone(), "not a regular file"));
        }

        std::fs::File::open(path)
            .map(|_| ())
            .map_err(|e| ConfigError::unreadable(path.clone(), e.to_string()))
    }

    /// Merge CLI arguments with the base configuration
    ///
    /// CLI arguments take precedence over file and environment values. The
    /// merged settings are validated before being returned.
    pub fn merge_cli_args(&self, cli: &Cli) -> Result<Settings, ConfigError> {
        let mut config = self.base_config.clone();

        if let Some(domain) = &cli.domain {
            config.cache.domain = Some(domain.clone());
        }

        if cli.strict {
            config.cache.mode = ErrorMode::Strict;
        }

        if cli.verbose {
            config.logger.level = "debug".to_string();
        } else if cli.quiet {
            config.logger.level = "error".to_string();
        }

        config.validate()?;

        Ok(config)
    }

    pub fn base_config(&self) -> &Settings {
        &self.base_config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_no_flags_keep_base_config() {
        let merger = ConfigurationMerger::new(Settings::default());
        let merged = merger.merge_cli_args(&parse(&["tagcache", "flush"])).unwrap();
        assert_eq!(&merged, merger.base_config());
    }

    #[test]
    fn test_cli_flags_override_config() {
        let merger = ConfigurationMerger::new(Settings::default());
        let merged = merger
            .merge_cli_args(&parse(&["tagcache", "--domain", "example.com", "--strict", "-q", "flush"]))
            .unwrap();

        assert_eq!(merged.cache.domain.as_deref(), Some("example.com"));
        assert_eq!(merged.cache.mode, ErrorMode::Strict);
        assert_eq!(merged.logger.level, "error");
    }

    #[test]
    fn test_verbose_sets_debug_level() {
        let merger = ConfigurationMerger::new(Settings::default());
        let merged = merger.merge_cli_args(&parse(&["tagcache", "-v", "flush"])).unwrap();
        assert_eq!(merged.logger.level, "debug");
    }

    #[test]
    fn test_invalid_base_config_fails_validation() {
        let mut base = Settings::default();
        base.cache.default_timeout = -1.0;
        let merger = ConfigurationMerger::new(base);
        assert!(merger.merge_cli_args(&parse(&["tagcache", "flush"])).is_err());
    }

    #[test]
    fn test_from_config_path_loads_file() {
        let mut file = NamedTempFile::with_suffix(".toml").unwrap();
        writeln!(
            file,
            "[backend]\napi = \"memory\"\n\n[cache]\ndomain = \"files.example\"\ntag_timeout = 60.0"
        )
        .unwrap();

        let path = file.path().to_path_buf();
        let merger = ConfigurationMerger::from_config_path(Some(&path)).unwrap();
        let config = merger.base_config();
        assert_eq!(config.backend.api.as_deref(), Some("memory"));
        assert_eq!(config.cache.domain.as_deref(), Some("files.example"));
        assert_eq!(config.cache.tag_timeout, 60.0);
    }

    #[test]
    fn test_from_config_path_rejects_directory() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().to_path_buf();
        let result = ConfigurationMerger::from_config_path(Some(&path));
        assert!(matches!(result, Err(ConfigError::UnreadableFile { .. })));
    }
}
