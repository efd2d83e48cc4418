//! Configuration loader: hierarchical merge of defaults, YAML file, and
//! environment variables.

use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use std::path::Path;
use thiserror::Error;

use crate::domain::models::Config;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("server.port is required")]
    MissingPort,

    #[error("invalid evalTime duration: {0}")]
    InvalidEvalTime(String),

    #[error("storage.path cannot be empty")]
    EmptyStoragePath,

    #[error("invalid log level {level:?} for component {component:?}")]
    InvalidLogLevel { component: String, level: String },
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging.
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults
    /// 2. `config.yaml` at `path`
    /// 3. `DEADLINE_*`-prefixed environment variables
    pub fn load(path: impl AsRef<Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .merge(Env::prefixed("DEADLINE_").split("__"))
            .extract()
            .context("failed to extract configuration")?;

        Self::validate(&config)?;
        Ok(config)
    }

    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.server.port == 0 {
            return Err(ConfigError::MissingPort);
        }
        if config.storage.path.is_empty() {
            return Err(ConfigError::EmptyStoragePath);
        }
        if crate::services::timing::parse_timing(&config.eval_time).is_err() {
            return Err(ConfigError::InvalidEvalTime(config.eval_time.clone()));
        }
        let valid_levels = ["debug", "info", "warn", "error"];
        for (component, level) in &config.log_config {
            if !valid_levels.contains(&level.as_str()) {
                return Err(ConfigError::InvalidLogLevel {
                    component: component.clone(),
                    level: level.clone(),
                });
            }
        }
        Ok(())
    }
}
