//! Background Reload Watcher
//!
//! This module implements a background task that watches a file and reloads
//! the handler registry whenever the file's modification time moves forward.
//! The service layer performs the same check lazily before each call; the
//! watcher covers long idle periods so the first call after an edit does not
//! pay for the reload.
//!
//! ## Design
//!
//! The watcher runs as a Tokio task and:
//! 1. Records the file's modification time at startup
//! 2. Sleeps for the configured interval
//! 3. Reads the modification time again
//! 4. Reloads the dispatcher if the file appeared or got newer

use crate::dispatch::Dispatcher;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::sync::watch;
use tracing::{debug, info, trace};

/// Configuration for the reload watcher.
#[derive(Debug, Clone)]
pub struct WatchConfig {
    /// The file to watch
    pub path: PathBuf,

    /// Interval between checks (default: 1s)
    pub interval: Duration,
}

impl WatchConfig {
    /// Creates a watch configuration with the default interval.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            interval: Duration::from_secs(1),
        }
    }

    /// Sets the check interval.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }
}

/// A handle to the running reload watcher.
///
/// When this handle is dropped, the watcher task will be stopped.
#[derive(Debug)]
pub struct ReloadWatcher {
    /// Sender to signal shutdown
    shutdown_tx: watch::Sender<bool>,
}

impl ReloadWatcher {
    /// Starts the reload watcher as a background task.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Example
    ///
    /// ```ignore
    /// use capdispatch::dispatch::{Dispatcher, ReloadWatcher, WatchConfig};
    /// use std::sync::Arc;
    ///
    /// let dispatcher = Arc::new(Dispatcher::new());
    /// let watcher = ReloadWatcher::start(dispatcher, WatchConfig::new("handlers.toml"));
    ///
    /// // Dropping the watcher will stop it
    /// drop(watcher);
    /// ```
    pub fn start(dispatcher: Arc<Dispatcher>, config: WatchConfig) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        info!(
            path = %config.path.display(),
            interval_ms = config.interval.as_millis(),
            "Reload watcher started"
        );

        tokio::spawn(watcher_loop(dispatcher, config, shutdown_rx));

        Self { shutdown_tx }
    }

    /// Stops the reload watcher.
    ///
    /// This is called automatically when the handle is dropped.
    pub fn stop(&self) {
        if self.shutdown_tx.send(true).is_ok() {
            info!("Reload watcher stopped");
        }
    }
}

impl Drop for ReloadWatcher {
    fn drop(&mut self) {
        self.stop();
    }
}

/// The main watcher loop.
async fn watcher_loop(
    dispatcher: Arc<Dispatcher>,
    config: WatchConfig,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let mut last_modified = modified_time(&config.path).await;

    loop {
        tokio::select! {
            _ = tokio::time::sleep(config.interval) => {}
            result = shutdown_rx.changed() => {
                if result.is_err() || *shutdown_rx.borrow() {
                    debug!("Reload watcher received shutdown signal");
                    return;
                }
            }
        }

        let current = modified_time(&config.path).await;
        if has_changed(last_modified, current) {
            debug!(path = %config.path.display(), "Change detected, reloading");
            dispatcher.reload();
            last_modified = current;
        } else {
            trace!(path = %config.path.display(), "No change");
        }
    }
}

/// Reads a file's modification time, or `None` if it cannot be read.
pub async fn modified_time(path: &Path) -> Option<SystemTime> {
    tokio::fs::metadata(path)
        .await
        .ok()
        .and_then(|md| md.modified().ok())
}

/// Returns true if the file appeared or got strictly newer.
///
/// A file that disappears is not a change.
pub fn has_changed(previous: Option<SystemTime>, current: Option<SystemTime>) -> bool {
    match (previous, current) {
        (None, Some(_)) => true,
        (Some(prev), Some(cur)) => cur > prev,
        _ => false,
    }
}
