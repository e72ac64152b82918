//! Values stored through the cache client.

use std::fmt;
use std::time::Duration;

use serde_json::{Map, Value};

/// A typed cache value.
///
/// The variant survives the round trip through the backend, so an integer
/// written as `Int(1)` is read back as `Int(1)` and never as `"1"` or `1.0`.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Object(Map<String, Value>),
    Array(Vec<Value>),
}

impl CacheValue {
    /// Convert an arbitrary JSON value, inferring the variant.
    ///
    /// `null` becomes an empty string and integers outside the `i64` range
    /// become floats.
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Null => CacheValue::Str(String::new()),
            Value::Bool(b) => CacheValue::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => CacheValue::Int(i),
                None => CacheValue::Float(n.as_f64().unwrap_or_default()),
            },
            Value::String(s) => CacheValue::Str(s),
            Value::Array(items) => CacheValue::Array(items),
            Value::Object(map) => CacheValue::Object(map),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            CacheValue::Bool(b) => Value::Bool(*b),
            CacheValue::Int(i) => Value::from(*i),
            CacheValue::Float(f) => Value::from(*f),
            CacheValue::Str(s) => Value::String(s.clone()),
            CacheValue::Object(map) => Value::Object(map.clone()),
            CacheValue::Array(items) => Value::Array(items.clone()),
        }
    }

    /// The numeric view of this value, if it has one.
    pub fn as_number(&self) -> Option<Number> {
        match self {
            CacheValue::Int(i) => Some(Number::Int(*i)),
            CacheValue::Float(f) => Some(Number::Float(*f)),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            CacheValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.as_number().map(Number::as_f64)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CacheValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            CacheValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for CacheValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheValue::Str(s) => f.write_str(s),
            other => write!(f, "{}", other.to_json()),
        }
    }
}

impl From<bool> for CacheValue {
    fn from(value: bool) -> Self {
        CacheValue::Bool(value)
    }
}

impl From<i64> for CacheValue {
    fn from(value: i64) -> Self {
        CacheValue::Int(value)
    }
}

impl From<i32> for CacheValue {
    fn from(value: i32) -> Self {
        CacheValue::Int(value.into())
    }
}

impl From<u32> for CacheValue {
    fn from(value: u32) -> Self {
        CacheValue::Int(value.into())
    }
}

impl From<f64> for CacheValue {
    fn from(value: f64) -> Self {
        CacheValue::Float(value)
    }
}

impl From<&str> for CacheValue {
    fn from(value: &str) -> Self {
        CacheValue::Str(value.to_string())
    }
}

impl From<String> for CacheValue {
    fn from(value: String) -> Self {
        CacheValue::Str(value)
    }
}

impl From<Vec<Value>> for CacheValue {
    fn from(value: Vec<Value>) -> Self {
        CacheValue::Array(value)
    }
}

impl From<Map<String, Value>> for CacheValue {
    fn from(value: Map<String, Value>) -> Self {
        CacheValue::Object(value)
    }
}

impl From<Value> for CacheValue {
    fn from(value: Value) -> Self {
        CacheValue::from_json(value)
    }
}

impl From<Number> for CacheValue {
    fn from(value: Number) -> Self {
        match value {
            Number::Int(i) => CacheValue::Int(i),
            Number::Float(f) => CacheValue::Float(f),
        }
    }
}

/// Operand of the arithmetic helpers.
///
/// Integer operands keep integer results integral until they would overflow.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    pub fn as_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }

    pub fn is_zero(self) -> bool {
        self.as_f64() == 0.0
    }

    pub fn is_one(self) -> bool {
        self.as_f64() == 1.0
    }

    pub fn negate(self) -> Number {
        match self {
            Number::Int(i) => i
                .checked_neg()
                .map(Number::Int)
                .unwrap_or(Number::Float(-(i as f64))),
            Number::Float(f) => Number::Float(-f),
        }
    }

    /// `1 / self`; callers reject zero first.
    pub fn reciprocal(self) -> Number {
        Number::Float(1.0 / self.as_f64())
    }

    pub fn add(self, other: Number) -> Number {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => a
                .checked_add(b)
                .map(Number::Int)
                .unwrap_or(Number::Float(a as f64 + b as f64)),
            (a, b) => Number::Float(a.as_f64() + b.as_f64()),
        }
    }

    pub fn mul(self, other: Number) -> Number {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => a
                .checked_mul(b)
                .map(Number::Int)
                .unwrap_or(Number::Float(a as f64 * b as f64)),
            (a, b) => Number::Float(a.as_f64() * b.as_f64()),
        }
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        Number::Int(value)
    }
}

impl From<i32> for Number {
    fn from(value: i32) -> Self {
        Number::Int(value.into())
    }
}

impl From<f64> for Number {
    fn from(value: f64) -> Self {
        Number::Float(value)
    }
}

/// Lifetime requested for a write.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Timeout {
    /// Use the client's configured default timeout.
    #[default]
    Default,
    /// Keep the entry for this many seconds; fractions are honoured by the
    /// envelope even when the backend only supports whole seconds.
    Seconds(f64),
}

impl Timeout {
    pub fn resolve(self, default: f64) -> f64 {
        match self {
            Timeout::Default => default,
            Timeout::Seconds(seconds) => seconds,
        }
    }
}

impl From<f64> for Timeout {
    fn from(seconds: f64) -> Self {
        Timeout::Seconds(seconds)
    }
}

impl From<u64> for Timeout {
    fn from(seconds: u64) -> Self {
        Timeout::Seconds(seconds as f64)
    }
}

impl From<Duration> for Timeout {
    fn from(duration: Duration) -> Self {
        Timeout::Seconds(duration.as_secs_f64())
    }
}
