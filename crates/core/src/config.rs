//! Configuration handed in by the host at setup
//!
//! The host passes a JSON object; every field is optional.
//!
//! ```json
//! { "dataDir": "/path/to/dir", "storageKey": "prompts", "logLevel": "debug" }
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{PromptError, Result};
use crate::store::DEFAULT_STORAGE_KEY;
use crate::util::is_blank;

const APP_DIR: &str = "prompt-pocket";
const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Core configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Directory holding the persisted collection
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Blob key the collection is stored under
    #[serde(default = "default_storage_key")]
    pub storage_key: String,

    /// Default tracing level; `RUST_LOG` still overrides it
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// `<platform data dir>/prompt-pocket`, or `~/.local/share/prompt-pocket`
///
/// Empty when neither can be determined; [`Config::validate`] rejects that.
fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join(APP_DIR))
        .or_else(|| dirs::home_dir().map(|home| home.join(".local").join("share").join(APP_DIR)))
        .unwrap_or_default()
}

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir:    default_data_dir(),
            storage_key: default_storage_key(),
            log_level:   default_log_level(),
        }
    }
}

impl Config {
    /// Parse and validate the host's setup object
    ///
    /// `null` yields the defaults.
    ///
    /// # Errors
    /// - `ConfigError`: wrong shape or a field fails [`Config::validate`]
    pub fn from_value(value: Value) -> Result<Self> {
        let config: Config = if value.is_null() {
            Config::default()
        } else {
            serde_json::from_value(value).map_err(|e| PromptError::ConfigError(e.to_string()))?
        };
        config.validate()?;
        Ok(config)
    }

    /// Check that the configuration is usable
    pub fn validate(&self) -> Result<()> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(PromptError::ConfigError(
                "Could not determine a data directory; set dataDir".into(),
            ));
        }
        if is_blank(Some(&self.storage_key)) {
            return Err(PromptError::ConfigError("storageKey cannot be empty".into()));
        }
        // The key becomes a file name under dataDir
        if self.storage_key.contains(['/', '\\']) || self.storage_key.contains("..") {
            return Err(PromptError::ConfigError(format!(
                "storageKey '{}' must not contain '/', '\\' or '..'",
                self.storage_key
            )));
        }
        if !LOG_LEVELS.contains(&self.log_level.to_ascii_lowercase().as_str()) {
            return Err(PromptError::ConfigError(format!(
                "Unknown log level '{}', expected one of {}",
                self.log_level,
                LOG_LEVELS.join(", ")
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_null_gives_defaults() {
        let config = Config::from_value(Value::Null).unwrap();
        assert_eq!(config.storage_key, "prompts");
        assert_eq!(config.log_level, "info");
        assert!(config.data_dir.ends_with(APP_DIR));
    }

    #[test]
    fn test_partial_object_fills_defaults() {
        let config = Config::from_value(json!({ "dataDir": "/tmp/pp", "logLevel": "DEBUG" })).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/tmp/pp"));
        assert_eq!(config.storage_key, "prompts");
        assert_eq!(config.log_level, "DEBUG");
    }

    #[test]
    fn test_rejects_empty_storage_key() {
        let err = Config::from_value(json!({ "storageKey": "  " })).unwrap_err();
        assert_eq!(err.category(), "config");
    }

    #[test]
    fn test_rejects_storage_key_with_path_parts() {
        for key in ["../escape", "nested/key", "nested\\key", "..", "a..b"] {
            let err = Config::from_value(json!({ "storageKey": key })).unwrap_err();
            assert!(matches!(err, PromptError::ConfigError(_)), "accepted {key}");
        }
    }

    #[test]
    fn test_accepts_plain_storage_key() {
        let config = Config::from_value(json!({ "storageKey": "team-prompts.v2" })).unwrap();
        assert_eq!(config.storage_key, "team-prompts.v2");
    }

    #[test]
    fn test_rejects_unknown_log_level() {
        let err = Config::from_value(json!({ "logLevel": "loud" })).unwrap_err();
        assert!(matches!(err, PromptError::ConfigError(_)));
    }

    #[test]
    fn test_rejects_wrong_shape() {
        let err = Config::from_value(json!({ "storageKey": 42 })).unwrap_err();
        assert!(matches!(err, PromptError::ConfigError(_)));
        assert!(Config::from_value(json!("nope")).is_err());
    }

    #[test]
    fn test_rejects_empty_data_dir() {
        let config = Config {
            data_dir: PathBuf::new(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }
}
