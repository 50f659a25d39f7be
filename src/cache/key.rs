//! Cache Key Module
//!
//! Derives canonical, order-independent cache keys from structured query
//! parameters.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Separator between the prefix and the parameter list.
pub const PREFIX_SEPARATOR: &str = "::";

/// Separator between `field:value` pairs.
pub const FIELD_SEPARATOR: &str = "|";

static UNIQUE_KEYS: AtomicU64 = AtomicU64::new(0);

/// Parameters that cannot be represented as a cache key.
#[derive(Debug, Error)]
#[error("cannot derive cache key for `{prefix}`: {reason}")]
pub struct KeyError {
    pub prefix: String,
    pub reason: String,
}

// == Cache Key ==
/// A canonical cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    /// Key for a fixed query or a single record, e.g. `listing::42`.
    pub fn new(prefix: &str, name: &str) -> Self {
        Self(format!("{prefix}{PREFIX_SEPARATOR}{name}"))
    }

    /// A key no other derivation will ever produce.
    ///
    /// Used when parameters cannot be serialized: the result is effectively
    /// uncached instead of sharing a slot with unrelated parameters.
    pub fn unique(prefix: &str) -> Self {
        let n = UNIQUE_KEYS.fetch_add(1, Ordering::Relaxed);
        Self(format!("{prefix}{PREFIX_SEPARATOR}!uncacheable#{n}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// == Derive Key ==
/// Builds `prefix::field:value|field:value...` with fields sorted by name.
///
/// Values are rendered as JSON with nested object keys sorted recursively.
/// Field names containing `:`, `|` or `"` are quoted.
/// Object fields holding `null` (an `Option::None`) are left out, so an unset
/// optional field and a missing one give the same key.
pub fn derive_key<P>(prefix: &str, params: &P) -> Result<CacheKey, KeyError>
where
    P: Serialize + ?Sized,
{
    let value = serde_json::to_value(params).map_err(|err| KeyError {
        prefix: prefix.to_string(),
        reason: err.to_string(),
    })?;

    let body = match canonicalize(value) {
        Value::Object(fields) => {
            let mut pairs: Vec<(String, Value)> = fields.into_iter().collect();
            pairs.sort_by(|a, b| a.0.cmp(&b.0));
            pairs
                .into_iter()
                .map(|(field, value)| format!("{}:{value}", render_field(&field)))
                .collect::<Vec<_>>()
                .join(FIELD_SEPARATOR)
        }
        Value::Null => String::new(),
        other => other.to_string(),
    };

    Ok(CacheKey(format!("{prefix}{PREFIX_SEPARATOR}{body}")))
}

/// Field names holding a separator or a quote are rendered as JSON strings,
/// so they cannot pose as several fields.
fn render_field(field: &str) -> String {
    if field.contains([':', '|', '"']) {
        Value::String(field.to_string()).to_string()
    } else {
        field.to_string()
    }
}

/// Drops null object fields and re-inserts object keys in sorted order.
fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(fields) => {
            let mut pairs: Vec<(String, Value)> = fields
                .into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k, canonicalize(v)))
                .collect();
            pairs.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(pairs.into_iter().collect())
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
        other => other,
    }
}
