//! CLI module for tagcache
//!
//! This module provides command-line interface functionality including:
//! - Argument parsing with clap
//! - Configuration merging (CLI args + config files)
//! - Command execution against a connected cache client

pub mod config_merger;
pub mod executor;
pub mod parser;
pub mod validation;

// Re-export public types for convenience
pub use config_merger::ConfigurationMerger;
pub use executor::{execute_command, parse_value};
pub use parser::{Cli, Commands, TagAction};

use crate::config::error::ConfigError;
use crate::config::settings::Settings;

/// Load and merge configuration from CLI arguments
///
/// This function handles the complete configuration loading process:
/// 1. Load base configuration from files
/// 2. Merge CLI argument overrides
/// 3. Validate the final configuration
///
/// # Errors
/// Returns error if configuration loading, merging, or validation fails
pub fn load_and_merge_config(cli: &Cli) -> Result<Settings, ConfigError> {
    ConfigurationMerger::from_config_path(cli.config.as_ref())?.merge_cli_args(cli)
}
