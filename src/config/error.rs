//! Errors raised while loading and checking tagcache settings

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Top-level settings section an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Backend,
    Cache,
    Logger,
}

impl Section {
    pub fn as_str(self) -> &'static str {
        match self {
            Section::Backend => "backend",
            Section::Cache => "cache",
            Section::Logger => "logger",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    /// A single configuration file that is missing, not a file, or unreadable
    #[error("Config file '{}' is unusable: {reason}", .path.display())]
    UnreadableFile { path: PathBuf, reason: String },

    /// The layered directory and a single file were both requested
    #[error("{dir_var} and {file_var} cannot both be set; use a layered directory or a single file")]
    ConflictingSources {
        dir_var: &'static str,
        file_var: &'static str,
    },

    /// Sources merged fine but do not fit the settings layout
    #[error("Malformed configuration: {0}")]
    Malformed(String),

    /// `backend.api` names no supported backend
    #[error("Unknown backend api '{api}' (supported: memory, redis)")]
    UnknownBackend { api: String },

    /// A value outside its allowed range
    #[error("Invalid {section}.{key}: {message}")]
    InvalidSetting {
        section: Section,
        key: &'static str,
        message: String,
    },

    #[error(transparent)]
    Source(#[from] config::ConfigError),
}

impl ConfigError {
    pub fn unreadable(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        ConfigError::UnreadableFile {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid(section: Section, key: &'static str, message: impl Into<String>) -> Self {
        ConfigError::InvalidSetting {
            section,
            key,
            message: message.into(),
        }
    }

    /// Dotted path of the offending setting, when the error names one.
    pub fn field(&self) -> Option<String> {
        match self {
            ConfigError::InvalidSetting { section, key, .. } => Some(format!("{}.{}", section, key)),
            ConfigError::UnknownBackend { .. } => Some("backend.api".to_string()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_setting_names_its_field() {
        let err = ConfigError::invalid(Section::Cache, "local.max_entries", "must be greater than 0");
        assert_eq!(err.field().as_deref(), Some("cache.local.max_entries"));
        assert_eq!(err.to_string(), "Invalid cache.local.max_entries: must be greater than 0");
    }

    #[test]
    fn test_unknown_backend_points_at_api() {
        let err = ConfigError::UnknownBackend {
            api: "couchbase".to_string(),
        };
        assert_eq!(err.field().as_deref(), Some("backend.api"));
        assert!(err.to_string().contains("couchbase"));
    }

    #[test]
    fn test_unreadable_file_message() {
        let err = ConfigError::unreadable("/etc/tagcache.toml", "not found");
        assert!(err.field().is_none());
        assert_eq!(err.to_string(), "Config file '/etc/tagcache.toml' is unusable: not found");
    }
}
