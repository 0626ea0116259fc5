//! Adapter configuration
//!
//! Every field has a default, so an empty TOML document is a valid config.
//!
//! ```toml
//! constants_policy = "cache_first"
//! catch_panics = true
//! log_params = false
//!
//! [log]
//! filter = "tether_bridge=debug"
//! json = true
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Whether `constants()` recomputes or serves a cached snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstantsPolicy {
    /// Ask the host on every request
    #[default]
    Recompute,
    /// Compute once, then serve the cached snapshot. Only for hosts whose
    /// constants never change.
    CacheFirst,
}

/// Logging setup used by [`crate::logging::init`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `EnvFilter` directive; `RUST_LOG` takes precedence when set
    pub filter: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            json: false,
        }
    }
}

/// Per-adapter configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdapterConfig {
    /// Constants caching policy
    pub constants_policy: ConstantsPolicy,
    /// Convert panics in native methods into error descriptors
    pub catch_panics: bool,
    /// Include rendered params in native error messages
    pub log_params: bool,
    /// Logging setup
    pub log: LogConfig,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            constants_policy: ConstantsPolicy::default(),
            catch_panics: true,
            log_params: true,
            log: LogConfig::default(),
        }
    }
}

impl AdapterConfig {
    /// Parse from a TOML document
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    /// Load from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_is_default() {
        let config = AdapterConfig::from_toml_str("").unwrap();
        assert_eq!(config, AdapterConfig::default());
        assert!(config.catch_panics);
        assert_eq!(config.constants_policy, ConstantsPolicy::Recompute);
    }

    #[test]
    fn test_partial_document_keeps_other_defaults() {
        let config = AdapterConfig::from_toml_str(
            r#"
            constants_policy = "cache_first"

            [log]
            json = true
            "#,
        )
        .unwrap();
        assert_eq!(config.constants_policy, ConstantsPolicy::CacheFirst);
        assert!(config.log.json);
        assert_eq!(config.log.filter, "info");
        assert!(config.log_params);
    }

    #[test]
    fn test_unknown_policy_is_rejected() {
        let err = AdapterConfig::from_toml_str(r#"constants_policy = "sometimes""#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
