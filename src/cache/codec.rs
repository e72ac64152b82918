//! Entry envelope serialization.
//!
//! Every value is stored as a JSON object with exactly three fields:
//!
//! ```json
//! {"v": 42, "t": "i", "s": 1718000000.25}
//! ```
//!
//! `v` is the value, `t` a one-letter type code and `s` the absolute expiry in
//! epoch seconds. The expiry is checked on every read, so an entry the
//! backend has not evicted yet is still reported as absent once `s` passes.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::cache::{CacheError, CacheValue};

/// One-letter type code carried in the envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeTag {
    Bool,
    Int,
    Float,
    Str,
    Object,
    Array,
}

impl TypeTag {
    pub fn code(self) -> &'static str {
        match self {
            TypeTag::Bool => "b",
            TypeTag::Int => "i",
            TypeTag::Float => "f",
            TypeTag::Str => "s",
            TypeTag::Object => "o",
            TypeTag::Array => "a",
        }
    }

    /// Unknown codes fall back to string.
    pub fn from_code(code: &str) -> Self {
        match code {
            "b" => TypeTag::Bool,
            "i" => TypeTag::Int,
            "f" => TypeTag::Float,
            "o" => TypeTag::Object,
            "a" => TypeTag::Array,
            _ => TypeTag::Str,
        }
    }

    pub fn of(value: &CacheValue) -> Self {
        match value {
            CacheValue::Bool(_) => TypeTag::Bool,
            CacheValue::Int(_) => TypeTag::Int,
            CacheValue::Float(_) => TypeTag::Float,
            CacheValue::Str(_) => TypeTag::Str,
            CacheValue::Object(_) => TypeTag::Object,
            CacheValue::Array(_) => TypeTag::Array,
        }
    }
}

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    v: &'a Value,
    t: &'static str,
    s: f64,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct Envelope {
    v: Value,
    t: String,
    s: f64,
}

/// A fresh entry read back from the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub value: CacheValue,
    /// Absolute expiry in epoch seconds.
    pub expires_at: f64,
}

/// Serialize `value` with an expiry `timeout` seconds after `now`.
pub fn pack(value: &CacheValue, timeout: f64, now: f64) -> Result<Vec<u8>, CacheError> {
    pack_until(value, now + timeout)
}

/// Serialize `value` with an explicit absolute expiry.
pub fn pack_until(value: &CacheValue, expires_at: f64) -> Result<Vec<u8>, CacheError> {
    let json = value.to_json();
    let envelope = EnvelopeRef {
        v: &json,
        t: TypeTag::of(value).code(),
        s: expires_at,
    };
    Ok(serde_json::to_vec(&envelope)?)
}

/// Decode an envelope, returning `None` when it is malformed or stale.
pub fn unpack(bytes: &[u8], now: f64) -> Option<CacheValue> {
    open(bytes, now).map(|entry| entry.value)
}

/// Like [`unpack`] but also returns the stored expiry.
pub fn open(bytes: &[u8], now: f64) -> Option<Entry> {
    let envelope: Envelope = serde_json::from_slice(bytes).ok()?;
    if !envelope.s.is_finite() || envelope.s < now {
        return None;
    }
    let value = coerce(envelope.v, TypeTag::from_code(&envelope.t));
    Some(Entry {
        value,
        expires_at: envelope.s,
    })
}

fn coerce(raw: Value, tag: TypeTag) -> CacheValue {
    match tag {
        TypeTag::Bool => CacheValue::Bool(truthy(&raw)),
        TypeTag::Int => CacheValue::Int(to_i64(&raw)),
        TypeTag::Float => CacheValue::Float(to_f64(&raw)),
        TypeTag::Object => CacheValue::Object(match raw {
            Value::Object(map) => map,
            Value::Array(items) => items
                .into_iter()
                .enumerate()
                .map(|(i, v)| (i.to_string(), v))
                .collect(),
            Value::Null => Map::new(),
            other => {
                let mut map = Map::new();
                map.insert("scalar".to_string(), other);
                map
            }
        }),
        TypeTag::Array => CacheValue::Array(match raw {
            Value::Array(items) => items,
            Value::Object(map) => map.into_iter().map(|(_, v)| v).collect(),
            Value::Null => Vec::new(),
            other => vec![other],
        }),
        TypeTag::Str => CacheValue::Str(match raw {
            Value::String(s) => s,
            Value::Null => String::new(),
            other => other.to_string(),
        }),
    }
}

fn truthy(raw: &Value) -> bool {
    match raw {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !(s.is_empty() || s == "0"),
        Value::Array(items) => !items.is_empty(),
        Value::Object(_) => true,
    }
}

fn to_i64(raw: &Value) -> i64 {
    match raw {
        Value::Bool(b) => i64::from(*b),
        Value::Number(n) => n
            .as_i64()
            .unwrap_or_else(|| n.as_f64().unwrap_or_default() as i64),
        Value::String(s) => s.trim().parse::<f64>().map(|f| f as i64).unwrap_or(0),
        _ => 0,
    }
}

fn to_f64(raw: &Value) -> f64 {
    match raw {
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::Number(n) => n.as_f64().unwrap_or_default(),
        Value::String(s) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}
