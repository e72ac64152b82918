//! Tagcache Library
//!
//! A tag-aware client over key-value cache backends, with the configuration,
//! logging and command-line layers used by the `tagcache` binary.

use shadow_rs::shadow;
shadow!(build);

pub mod cache;
pub mod cli;
pub mod config;
pub mod logger;

pub use cache::{CacheClient, CacheError, CacheValue, Timeout};

pub fn pkg_version() -> &'static str {
    build::PKG_VERSION
}

pub fn clap_long_version() -> &'static str {
    build::CLAP_LONG_VERSION
}
