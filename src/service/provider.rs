//! Provider Service
//!
//! `Service` is what a hosting harness talks to. It owns the shared
//! dispatcher and handles the parts the dispatcher leaves to its caller:
//! decoding the argument payload, encoding the reply, and reloading the
//! registry when the watched file changes.
//!
//! ## Call Flow
//!
//! ```text
//! check_invoke(command, payload)
//!        │
//!        ├── watched file newer? ──> invoke("reload")
//!        ▼
//! invoke(command, payload)
//!        │
//!        ├── payload empty? ──> {}            (no "arg" key)
//!        ├── otherwise      ──> {"arg": JSON} (decoded Value)
//!        ▼
//! Dispatcher::main ──> Reply ──> JSON bytes
//! ```

use crate::commands::DispatchError;
use crate::config::{Config, ConfigError};
use crate::dispatch::watcher::{has_changed, modified_time};
use crate::dispatch::{Dispatcher, ARG_KEY, RELOAD_COMMAND};
use crate::protocol::{ArgMap, Value};
use bytes::Bytes;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, error, info};

/// Errors that can occur while serving a call.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Configuration could not be built
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// The argument payload is not valid JSON
    #[error("invalid argument payload: {0}")]
    Decode(#[source] serde_json::Error),

    /// The reply could not be encoded
    #[error("failed to encode reply: {0}")]
    Encode(#[source] serde_json::Error),

    /// The dispatcher rejected the call
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

/// The harness-facing wrapper around a shared [`Dispatcher`].
#[derive(Debug, Default)]
pub struct Service {
    config: Config,
    dispatcher: Arc<Dispatcher>,
    /// Modification time of the watched file at the last load
    modified: RwLock<Option<SystemTime>>,
}

impl Service {
    /// Builds the configuration from link values and the environment, then
    /// creates the service.
    pub async fn try_init(values: Option<HashMap<String, String>>) -> Result<Self, ServiceError> {
        let config = Config::init(values.unwrap_or_default())?;
        Ok(Self::with_config(config).await)
    }

    /// Creates a service from an already validated configuration.
    pub async fn with_config(config: Config) -> Self {
        let modified = match config.watch_path.as_deref() {
            Some(path) => modified_time(Path::new(path)).await,
            None => None,
        };
        info!(watch_path = ?config.watch_path, "Service initialized");

        Self {
            config,
            dispatcher: Arc::new(Dispatcher::new()),
            modified: RwLock::new(modified),
        }
    }

    /// Returns the service configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the shared dispatcher.
    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    fn watch_path(&self) -> Option<PathBuf> {
        self.config.watch_path.as_ref().map(PathBuf::from)
    }

    /// Checks whether the watched file changed since the last load.
    pub async fn reload_needed(&self) -> bool {
        let Some(path) = self.watch_path() else {
            return false;
        };
        let previous = *self.modified.read().await;
        let current = modified_time(&path).await;
        has_changed(previous, current)
    }

    /// Invokes a command, reloading first if the watched file changed.
    pub async fn check_invoke(&self, command: &str, arg: &[u8]) -> Result<Bytes, ServiceError> {
        if let Some(path) = self.watch_path() {
            let mut modified = self.modified.write().await;
            let current = modified_time(&path).await;
            if has_changed(*modified, current) {
                info!(path = %path.display(), "Dispatch change detected, reloading...");
                self.invoke(RELOAD_COMMAND, &[]).await?;
                *modified = current;
            }
        }
        self.invoke(command, arg).await
    }

    /// Invokes a command with a JSON argument payload and returns the JSON
    /// encoded reply.
    ///
    /// An empty payload means the call has no `"arg"` entry.
    pub async fn invoke(&self, command: &str, arg: &[u8]) -> Result<Bytes, ServiceError> {
        let mut params = ArgMap::new();
        if !arg.is_empty() {
            let value = Value::decode(arg).map_err(ServiceError::Decode)?;
            debug!("Invoking {}(arg: {:?})", command, &value);
            params.insert(ARG_KEY.to_string(), value);
        } else {
            debug!("Invoking {}()", command);
        }

        match self.dispatcher.main(command, &params) {
            Ok(reply) => {
                debug!("Result: {:?}", &reply);
                reply.encode().map_err(ServiceError::Encode)
            }
            Err(e) => {
                error!(command = command, error = %e, "Dispatch failed");
                Err(ServiceError::Dispatch(e))
            }
        }
    }
}
