//! Cache error types.

use thiserror::Error;

/// Errors that can occur during cache operations.
///
/// Missing or expired entries are not errors; reads report them through
/// `Option`/`bool` results and the `loose_hits` statistic.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CacheError {
    /// The requested backend variant is unknown or not compiled in.
    #[error("Cache configuration error: {0}")]
    Configuration(String),

    #[error("Cache connection failed: {0}")]
    Connection(String),

    /// The backend rejected a `set` or `add`.
    #[error("Can't write '{name}' to storage: {reason}")]
    WriteFailure { name: String, reason: String },

    #[error("Division by zero")]
    DivisionByZero,

    /// A tag-scoped operation was called without an active tag.
    #[error("Can't {operation} by unset tag")]
    UnsetTag { operation: &'static str },

    /// Arithmetic was requested on a value that is not a number.
    #[error("Value stored under '{name}' is not a number")]
    NotNumeric { name: String },

    #[error("Cache operation failed: {0}")]
    Operation(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl CacheError {
    pub fn write_failure(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::WriteFailure {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn unset_tag(operation: &'static str) -> Self {
        Self::UnsetTag { operation }
    }
}

impl From<serde_json::Error> for CacheError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(feature = "redis")]
impl From<redis::RedisError> for CacheError {
    fn from(err: redis::RedisError) -> Self {
        if err.is_connection_refusal() || err.is_io_error() || err.is_timeout() {
            Self::Connection(err.to_string())
        } else {
            Self::Operation(err.to_string())
        }
    }
}
