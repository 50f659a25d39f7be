//! Request DTOs for the listing API
//!
//! Bodies and query strings not already covered by the domain types.

use serde::Deserialize;

/// Per-call read options, also accepted as `?skip_cache=true`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct ReadOptions {
    /// Bypass the cache lookup and fetch from the store.
    ///
    /// The fresh result is still written back to the cache.
    #[serde(default)]
    pub skip_cache: bool,
}

impl ReadOptions {
    pub fn cached() -> Self {
        Self { skip_cache: false }
    }

    pub fn fresh() -> Self {
        Self { skip_cache: true }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_options_default_uses_cache() {
        let opts: ReadOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(opts, ReadOptions::cached());
    }

    #[test]
    fn test_read_options_skip_cache() {
        let opts: ReadOptions = serde_json::from_str(r#"{"skip_cache": true}"#).unwrap();
        assert_eq!(opts, ReadOptions::fresh());
    }
}
