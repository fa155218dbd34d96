//! Dispatcher Entry Point
//!
//! `Dispatcher::main` is the single entry point a harness calls. It either
//! reloads the handler registry or forwards the `"arg"` entry of the
//! argument container to it.
//!
//! ## Concurrency Model
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       Dispatcher                            │
//! │                                                             │
//! │   main("ns.factorial", ..) ──read──┐                        │
//! │   main("ns.hello", ..)     ──read──┤                        │
//! │                                    ▼                        │
//! │                      RwLock<HandlerRegistry>                │
//! │                                    ▲                        │
//! │   main("reload", ..)       ──write─┘                        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! A dispatch holds the read side for the whole handler call, so a reload
//! waits for in-flight dispatches and no dispatch sees a half-swapped
//! registry.

use crate::commands::handler::unknown_command;
use crate::commands::{DispatchError, HandlerRegistry, Route};
use crate::protocol::{ArgMap, Reply};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};
use tracing::{debug, info, warn};

/// The command that rebuilds the handler registry (exact match).
pub const RELOAD_COMMAND: &str = "reload";

/// The only key read from the argument container.
pub const ARG_KEY: &str = "arg";

/// Counters for dispatcher activity
#[derive(Debug, Default)]
pub struct DispatchStats {
    /// Commands forwarded to the registry
    pub dispatched: AtomicU64,
    /// Commands that matched no suffix
    pub unmatched: AtomicU64,
    /// Commands that returned an error
    pub failed: AtomicU64,
    /// Registry reloads
    pub reloads: AtomicU64,
}

/// A point-in-time copy of [`DispatchStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub dispatched: u64,
    pub unmatched: u64,
    pub failed: u64,
    pub reloads: u64,
}

impl DispatchStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn command_dispatched(&self) {
        self.dispatched.fetch_add(1, Ordering::Relaxed);
    }

    pub fn command_unmatched(&self) {
        self.unmatched.fetch_add(1, Ordering::Relaxed);
    }

    pub fn command_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn registry_reloaded(&self) {
        self.reloads.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            dispatched: self.dispatched.load(Ordering::Relaxed),
            unmatched: self.unmatched.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            reloads: self.reloads.load(Ordering::Relaxed),
        }
    }
}

/// Routes commands to the current handler registry.
#[derive(Debug, Default)]
pub struct Dispatcher {
    /// The current registry, replaced wholesale on reload
    registry: RwLock<HandlerRegistry>,
    /// Activity counters
    stats: DispatchStats,
}

impl Dispatcher {
    /// Creates a dispatcher with a freshly loaded registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Executes a command and returns its reply.
    ///
    /// # Arguments
    ///
    /// * `command` - `"reload"`, or a command name routed by suffix
    /// * `args` - The argument container; only `"arg"` is read
    ///
    /// # Errors
    ///
    /// Returns `DispatchError::MissingArgument` if a non-reload command has
    /// no `"arg"` entry, or whatever error the selected handler raises.
    pub fn main(&self, command: &str, args: &ArgMap) -> Result<Reply, DispatchError> {
        if command == RELOAD_COMMAND {
            self.reload();
            return Ok(Reply::Bool(true));
        }

        let value = match args.get(ARG_KEY) {
            Some(v) => v,
            None => {
                self.stats.command_failed();
                warn!(command = command, "Missing argument");
                return Err(DispatchError::MissingArgument(ARG_KEY));
            }
        };

        // Held for the whole call so reload cannot interleave
        let registry = self.registry.read().unwrap_or_else(PoisonError::into_inner);
        let route = registry.route(command);
        let result = match route {
            Route::Matched(kind) => kind.call(value),
            Route::Unmatched => Ok(Reply::String(unknown_command(command))),
        };
        drop(registry);

        self.stats.command_dispatched();
        match (&result, route) {
            (Err(e), _) => {
                self.stats.command_failed();
                debug!(command = command, error = %e, "Command failed");
            }
            (Ok(_), Route::Unmatched) => {
                self.stats.command_unmatched();
                debug!(command = command, "Unknown command");
            }
            (Ok(_), Route::Matched(kind)) => {
                debug!(command = command, handler = %kind, "Command dispatched");
            }
        }

        result
    }

    /// Replaces the handler registry with a freshly built one.
    ///
    /// Returns the new generation number.
    pub fn reload(&self) -> u64 {
        let mut registry = self.registry.write().unwrap_or_else(PoisonError::into_inner);
        *registry = registry.reloaded();
        let generation = registry.generation();
        drop(registry);

        self.stats.registry_reloaded();
        info!(generation = generation, "Handler registry reloaded");
        generation
    }

    /// Returns the current registry generation.
    pub fn generation(&self) -> u64 {
        self.registry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .generation()
    }

    /// Returns the dispatcher's activity counters.
    pub fn stats(&self) -> &DispatchStats {
        &self.stats
    }
}
