//! Dispatcher Module
//!
//! This module provides the entry point that a harness calls, plus the
//! background task that keeps the handler registry fresh.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       Dispatcher                            │
//! │                                                             │
//! │   "reload" ──> rebuild HandlerRegistry ──> Bool(true)       │
//! │   other    ──> args["arg"] ──> HandlerRegistry::handle      │
//! └─────────────────────────────────────────────────────────────┘
//!                            ▲
//!                            │ reload()
//!              ┌─────────────┴─────────────┐
//!              │      ReloadWatcher        │
//!              │  (Background Tokio Task)  │
//!              └───────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use capdispatch::dispatch::Dispatcher;
//! use capdispatch::protocol::{ArgMap, Reply, Value};
//!
//! let dispatcher = Dispatcher::new();
//!
//! let mut args = ArgMap::new();
//! args.insert("arg".to_string(), Value::integer(4));
//! assert_eq!(dispatcher.main("ns.factorial", &args), Ok(Reply::Integer(24)));
//!
//! assert_eq!(dispatcher.main("reload", &ArgMap::new()), Ok(Reply::Bool(true)));
//! ```

pub mod dispatcher;
pub mod watcher;

// Re-export commonly used types
pub use dispatcher::{DispatchStats, Dispatcher, StatsSnapshot, ARG_KEY, RELOAD_COMMAND};
pub use watcher::{ReloadWatcher, WatchConfig};
