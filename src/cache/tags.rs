//! Tag indexes built out of ordinary cache entries.
//!
//! Each tag owns one index entry, stored under the namespaced logical name
//! `TAG#<tag>`, whose value is the array of logical names written while the
//! tag was active. Index updates are read-modify-write: two clients writing
//! under the same tag at the same moment can each overwrite the other's
//! snapshot and lose a member. Readers treat members that no longer exist as
//! no-ops, so a lost or stale member only costs a wasted lookup.

use serde_json::Value;

use crate::cache::codec;
use crate::cache::namespace::{KeyNamespacer, tag_name};
use crate::cache::{BackendStore, CacheError, CacheValue};

/// One tag or an ordered set of tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tag {
    One(String),
    Many(Vec<String>),
}

impl Tag {
    pub fn names(&self) -> Vec<&str> {
        match self {
            Tag::One(name) => vec![name.as_str()],
            Tag::Many(names) => names.iter().map(String::as_str).collect(),
        }
    }
}

impl From<&str> for Tag {
    fn from(name: &str) -> Self {
        Tag::One(name.to_string())
    }
}

impl From<String> for Tag {
    fn from(name: String) -> Self {
        Tag::One(name)
    }
}

impl From<Vec<String>> for Tag {
    fn from(names: Vec<String>) -> Self {
        Tag::Many(names)
    }
}

impl From<Vec<&str>> for Tag {
    fn from(names: Vec<&str>) -> Self {
        Tag::Many(names.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for Tag {
    fn from(names: &[&str]) -> Self {
        Tag::Many(names.iter().map(|s| s.to_string()).collect())
    }
}

/// Everything index operations need from the client for one call.
pub(crate) struct IndexContext<'a> {
    pub backend: &'a dyn BackendStore,
    pub namespace: &'a KeyNamespacer,
    pub now: f64,
}

/// Active tag context plus the index protocol.
#[derive(Debug, Clone)]
pub struct TagIndex {
    active: Option<Tag>,
    timeout: f64,
}

impl TagIndex {
    pub fn new(timeout: f64) -> Self {
        Self {
            active: None,
            timeout,
        }
    }

    pub fn activate(&mut self, tag: Tag) {
        self.active = Some(tag);
    }

    pub fn deactivate(&mut self) {
        self.active = None;
    }

    pub fn active(&self) -> Option<&Tag> {
        self.active.as_ref()
    }

    /// Minimum lifetime of index entries in seconds.
    pub fn timeout(&self) -> f64 {
        self.timeout
    }

    pub fn set_timeout(&mut self, seconds: f64) {
        self.timeout = seconds;
    }

    /// Backend keys of the active tags' index entries.
    pub fn index_keys(&self, namespace: &KeyNamespacer) -> Vec<String> {
        self.active
            .iter()
            .flat_map(Tag::names)
            .map(|tag| namespace.tag_key(tag))
            .collect()
    }

    /// Add `name` to every active tag's index.
    ///
    /// The index expiry only ever grows: it is the latest of its current
    /// expiry, `now + timeout` and `member_expires_at`.
    pub(crate) async fn record_member(
        &self,
        ctx: &IndexContext<'_>,
        name: &str,
        member_expires_at: f64,
    ) -> Result<(), CacheError> {
        let Some(tag) = &self.active else {
            return Ok(());
        };

        for tag in tag.names() {
            let key = ctx.namespace.tag_key(tag);
            let (mut members, current_expiry) = read_index(ctx, &key).await?.unwrap_or_default();

            let expires_at = current_expiry
                .max(ctx.now + self.timeout)
                .max(member_expires_at);
            let known = members.iter().any(|m| m == name);
            if known && expires_at <= current_expiry {
                continue;
            }
            if !known {
                members.push(name.to_string());
            }

            let value = CacheValue::Array(members.into_iter().map(Value::String).collect());
            let bytes = codec::pack_until(&value, expires_at)?;
            let expiry = ctx.backend.expiry_convention().expiry_for(expires_at, ctx.now);
            ctx.backend
                .set(&key, bytes, expiry)
                .await
                .map_err(|e| CacheError::write_failure(tag_name(tag), e.to_string()))?;
            tracing::trace!(tag, member = name, "Recorded tag member");
        }
        Ok(())
    }

    /// Union of the active tags' members in first-seen order.
    ///
    /// A missing or unreadable index is an empty tag.
    pub(crate) async fn members(&self, ctx: &IndexContext<'_>) -> Result<Vec<String>, CacheError> {
        let mut all: Vec<String> = Vec::new();
        let Some(tag) = &self.active else {
            return Ok(all);
        };
        for tag in tag.names() {
            let key = ctx.namespace.tag_key(tag);
            if let Some((members, _)) = read_index(ctx, &key).await? {
                for member in members {
                    if !all.contains(&member) {
                        all.push(member);
                    }
                }
            }
        }
        Ok(all)
    }
}

async fn read_index(
    ctx: &IndexContext<'_>,
    key: &str,
) -> Result<Option<(Vec<String>, f64)>, CacheError> {
    let Some(bytes) = ctx.backend.get(key).await? else {
        return Ok(None);
    };
    let Some(entry) = codec::open(&bytes, ctx.now) else {
        return Ok(None);
    };
    let members = match entry.value {
        CacheValue::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    };
    Ok(Some((members, entry.expires_at)))
}
