//! Process configuration, loaded by `infrastructure::config::ConfigLoader`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// HTTP control-plane configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 8080 }
    }
}

/// Top-level configuration: server settings, evaluation tick interval,
/// storage location, and per-component log levels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    /// Evaluation tick interval, as a duration string (`"1m"`, `"30s"`).
    /// Authoritative when parseable; falls back to the 1-minute default
    /// only when absent or unparseable.
    #[serde(default = "default_eval_time")]
    pub eval_time: String,
    /// Per-sub-component log level overrides, keyed by component name.
    #[serde(default, rename = "logConfig")]
    pub log_config: HashMap<String, String>,
    /// Blueprint/event store location.
    #[serde(default, rename = "storage")]
    pub storage: StorageConfig,
}

/// Storage location configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: ".deadline/deadline.db".to_string(),
        }
    }
}

fn default_eval_time() -> String {
    "1m".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            eval_time: default_eval_time(),
            log_config: HashMap::new(),
            storage: StorageConfig::default(),
        }
    }
}
