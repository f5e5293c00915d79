//! Engine configuration.

use std::env;

use serde::{Deserialize, Serialize};

use crate::{codec::DEFAULT_MAX_DECODE_DEPTH, parser::DEFAULT_MAX_DEPTH};

/// Query engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Log each compiled AST and result at DEBUG level.
    pub debug: bool,
    /// Deepest expression nesting the parser accepts.
    pub max_nesting_depth: usize,
    /// Deepest array/map nesting the MessagePack decoder accepts.
    pub max_decode_depth: usize,
    /// Log filter used by the binary when `RUST_LOG` is unset.
    pub log_level: String,
}

impl QueryConfig {
    /// Create configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            debug: env_bool("JSONQUERY_DEBUG", defaults.debug),
            max_nesting_depth: env_usize("JSONQUERY_MAX_DEPTH", defaults.max_nesting_depth),
            max_decode_depth: env_usize("JSONQUERY_MAX_DECODE_DEPTH", defaults.max_decode_depth),
            log_level: env::var("JSONQUERY_LOG_LEVEL").unwrap_or(defaults.log_level),
        }
    }
}

impl QueryConfig {
    /// Filter directive for the binary's subscriber. Debug mode raises this
    /// crate to DEBUG so the AST and result events are emitted.
    pub fn log_filter(&self) -> String {
        if self.debug {
            format!("{},jsonquery=debug", self.log_level)
        } else {
            self.log_level.clone()
        }
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            debug: false,
            max_nesting_depth: DEFAULT_MAX_DEPTH,
            max_decode_depth: DEFAULT_MAX_DECODE_DEPTH,
            log_level: "info".to_owned(),
        }
    }
}

fn env_bool(key: &str, default: bool) -> bool {
    env::var(key).map_or(default, |v| {
        matches!(v.as_str(), "1" | "true" | "yes" | "TRUE" | "YES")
    })
}

fn env_usize(key: &str, default: usize) -> usize {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = QueryConfig::default();
        assert!(!config.debug);
        assert_eq!(config.max_nesting_depth, 128);
        assert_eq!(config.max_decode_depth, 512);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: QueryConfig = serde_json::from_str(r#"{"debug": true}"#).unwrap();
        assert!(config.debug);
        assert_eq!(config.max_nesting_depth, DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn test_log_filter_follows_debug() {
        let mut config = QueryConfig::default();
        assert_eq!(config.log_filter(), "info");

        config.debug = true;
        assert_eq!(config.log_filter(), "info,jsonquery=debug");

        config.log_level = "warn,jsonquery::codec=trace".into();
        assert_eq!(config.log_filter(), "warn,jsonquery::codec=trace,jsonquery=debug");
    }

    #[test]
    fn test_unset_env_uses_default() {
        assert_eq!(env_usize("JSONQUERY_TEST_UNSET_VARIABLE", 7), 7);
        assert!(env_bool("JSONQUERY_TEST_UNSET_VARIABLE", true));
    }
}
