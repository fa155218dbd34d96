//! Dispatcher configuration
//!
//! Settings arrive as link values from the host (`config_b64` or
//! `config_json`) and are then overridden from the environment.

use base64::Engine as _;
use serde::Deserialize;
use std::collections::HashMap;
use std::env;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Environment variable naming the watched file.
pub const ENV_WATCH_PATH: &str = "DISPATCH_WATCH";

/// Environment variable for the background watcher interval.
pub const ENV_WATCH_INTERVAL_MS: &str = "DISPATCH_WATCH_INTERVAL_MS";

/// Errors raised while building a [`Config`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid base64 encoding: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("corrupt {key}: {source}")]
    CorruptJson {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("DISPATCH_WATCH_INTERVAL_MS is not a number: '{0}'")]
    InvalidInterval(String),

    #[error("watch_interval_ms must be greater than zero")]
    ZeroInterval,

    #[error("watch_path '{0}' is not a valid file")]
    InvalidWatchPath(String),
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// file whose modification triggers a reload: env DISPATCH_WATCH
    pub watch_path: Option<String>,

    /// poll interval for the background watcher: env DISPATCH_WATCH_INTERVAL_MS
    pub watch_interval_ms: Option<u64>,
}

impl Config {
    /// initialize from link values, override from environment
    pub fn init(values: HashMap<String, String>) -> Result<Config, ConfigError> {
        Self::init_with_env(values, |key| env::var(key).ok())
    }

    /// initialize from link values, override from `lookup`
    pub fn init_with_env<F>(values: HashMap<String, String>, lookup: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = if let Some(config_b64) = values.get("config_b64") {
            let bytes = base64::engine::general_purpose::STANDARD.decode(config_b64.as_bytes())?;
            serde_json::from_slice::<Config>(&bytes).map_err(|source| ConfigError::CorruptJson {
                key: "config_b64",
                source,
            })?
        } else if let Some(config) = values.get("config_json") {
            serde_json::from_str::<Config>(config).map_err(|source| ConfigError::CorruptJson {
                key: "config_json",
                source,
            })?
        } else {
            Config::default()
        };

        if let Some(path) = lookup(ENV_WATCH_PATH) {
            debug!(path = %path, "using watch_path");
            config.watch_path = Some(path);
        }
        if let Some(ms) = lookup(ENV_WATCH_INTERVAL_MS) {
            let ms = ms
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidInterval(ms.clone()))?;
            debug!(interval_ms = ms, "using watch_interval_ms");
            config.watch_interval_ms = Some(ms);
        }

        config.validate()?;
        debug!(config = ?config, "Config");
        Ok(config)
    }

    /// Checks that the watched file exists and the interval is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(path) = &self.watch_path {
            if !Path::new(path).is_file() {
                return Err(ConfigError::InvalidWatchPath(path.clone()));
            }
        }
        if self.watch_interval_ms == Some(0) {
            return Err(ConfigError::ZeroInterval);
        }
        Ok(())
    }

    /// Returns the background watcher interval, if one is configured.
    pub fn watch_interval(&self) -> Option<Duration> {
        self.watch_interval_ms.map(Duration::from_millis)
    }
}
