//! Domain-scoped backend key derivation.

use sha2::{Digest, Sha256};

/// Separator between the domain and the logical name before hashing.
const SEPARATOR: &str = "#!#";

/// Logical-name prefix of tag index entries.
pub const TAG_PREFIX: &str = "TAG#";

/// Domain used when none is configured.
pub const DEFAULT_DOMAIN: &str = "localhost";

/// Lower-case the domain and drop a leading `www.`.
pub fn normalize_domain(domain: &str) -> String {
    let lower = domain.trim().to_lowercase();
    match lower.strip_prefix("www.") {
        Some(rest) => rest.to_string(),
        None => lower,
    }
}

/// Hash `name` into the namespace of `domain`.
///
/// The result is 64 lowercase hex characters whatever the length of `name`.
pub fn to_backend_key(name: &str, domain: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(normalize_domain(domain).as_bytes());
    hasher.update(SEPARATOR.as_bytes());
    hasher.update(name.as_bytes());
    hex::encode(hasher.finalize())
}

/// Maps logical names to backend keys for one client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyNamespacer {
    domain: String,
    enabled: bool,
}

impl KeyNamespacer {
    pub fn new(domain: impl AsRef<str>) -> Self {
        Self {
            domain: normalize_domain(domain.as_ref()),
            enabled: true,
        }
    }

    /// Pass logical names through unchanged.
    ///
    /// Keys are then limited by whatever the backend accepts and deployments
    /// sharing a backend are no longer isolated.
    pub fn disabled() -> Self {
        Self {
            domain: String::new(),
            enabled: false,
        }
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn key(&self, name: &str) -> String {
        if self.enabled {
            to_backend_key(name, &self.domain)
        } else {
            name.to_string()
        }
    }

    /// Backend key of the index entry for `tag`.
    pub fn tag_key(&self, tag: &str) -> String {
        self.key(&tag_name(tag))
    }
}

impl Default for KeyNamespacer {
    fn default() -> Self {
        Self::new(DEFAULT_DOMAIN)
    }
}

/// Logical name of the index entry for `tag`.
pub fn tag_name(tag: &str) -> String {
    format!("{TAG_PREFIX}{tag}")
}
