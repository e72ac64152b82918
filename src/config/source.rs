//! Config sources consulted for backend connection parameters.

use std::collections::HashMap;

use crate::config::settings::{BackendSettings, Settings};

/// Name of the backend section in config sources.
pub const BACKEND_SECTION: &str = "backend";

/// Something that can hand out a backend connection section by name.
///
/// Consulted only for parameters the caller did not supply explicitly.
pub trait ConfigSource {
    fn section(&self, name: &str) -> Option<BackendSettings>;
}

impl ConfigSource for config::Config {
    fn section(&self, name: &str) -> Option<BackendSettings> {
        match self.get::<BackendSettings>(name) {
            Ok(section) => Some(section),
            Err(config::ConfigError::NotFound(_)) => None,
            Err(e) => {
                tracing::warn!(section = name, error = %e, "Ignoring unreadable config section");
                None
            }
        }
    }
}

impl ConfigSource for Settings {
    fn section(&self, name: &str) -> Option<BackendSettings> {
        (name == BACKEND_SECTION).then(|| self.backend.clone())
    }
}

impl ConfigSource for HashMap<String, BackendSettings> {
    fn section(&self, name: &str) -> Option<BackendSettings> {
        self.get(name).cloned()
    }
}

/// Layer explicit parameters over the source's section.
pub fn backend_from_source(
    explicit: BackendSettings,
    source: Option<&dyn ConfigSource>,
) -> BackendSettings {
    match source.and_then(|s| s.section(BACKEND_SECTION)) {
        Some(section) => explicit.or(section),
        None => explicit,
    }
}
