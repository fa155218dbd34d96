//! # capdispatch - A Suffix-Routed Command Dispatcher
//!
//! capdispatch is the dispatch core of a capability-provider test fixture.
//! A harness hands it a command name and an argument container; the command
//! is routed by suffix to one of three handlers and the reply is returned.
//!
//! ## Features
//!
//! - **Suffix Routing**: `ns.factorial`, `wasmbus.factorial` and `factorial` all
//!   reach the same handler
//! - **Explicit Reload**: the `reload` command rebuilds the handler registry
//! - **Change Detection**: a watched file triggers a reload when it changes
//! - **JSON Payloads**: arguments and replies travel as plain JSON
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                             capdispatch                                 │
//! │                                                                         │
//! │  ┌─────────────┐    ┌─────────────┐    ┌─────────────────────────────┐  │
//! │  │  Service    │───>│ Dispatcher  │───>│     HandlerRegistry         │  │
//! │  │ (JSON in/   │    │  main()     │    │  factorial | hello |        │  │
//! │  │  JSON out)  │    │  reload()   │    │  big_response | unmatched   │  │
//! │  └─────────────┘    └──────▲──────┘    └─────────────────────────────┘  │
//! │                            │                                            │
//! │                     ┌──────┴──────────────────┐                         │
//! │                     │     ReloadWatcher       │                         │
//! │                     │ (Background Tokio Task) │                         │
//! │                     └─────────────────────────┘                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use capdispatch::dispatch::Dispatcher;
//! use capdispatch::protocol::{ArgMap, Reply, Value};
//!
//! let dispatcher = Dispatcher::new();
//!
//! let mut args = ArgMap::new();
//! args.insert("arg".to_string(), Value::string("World"));
//! assert_eq!(
//!     dispatcher.main("wasmbus.hello", &args),
//!     Ok(Reply::string("Hello World!"))
//! );
//! ```
//!
//! ## Supported Commands
//!
//! - `*factorial n` - `n!` for `0 <= n <= 34`
//! - `*hello value` - `"Hello {value}!"`
//! - `*big_response n` - `n` repetitions of `x`
//! - `reload` - rebuild the registry, replies `true`
//! - anything else - `"unknown command {command}"`
//!
//! ## Module Overview
//!
//! - [`protocol`]: Argument values, replies and request-line parsing
//! - [`commands`]: The handler registry and the handlers themselves
//! - [`dispatch`]: The entry point, reload and the background watcher
//! - [`service`]: JSON payload handling and change-triggered reload
//! - [`config`]: Link-value and environment configuration

pub mod commands;
pub mod config;
pub mod dispatch;
pub mod protocol;
pub mod service;

// Re-export commonly used types for convenience
pub use commands::{DispatchError, HandlerKind, HandlerRegistry, Route};
pub use config::{Config, ConfigError};
pub use dispatch::{Dispatcher, ReloadWatcher, WatchConfig};
pub use protocol::{parse_request, ArgMap, ParseError, Reply, Request, Value};
pub use service::{Service, ServiceError};

/// Version of capdispatch
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
