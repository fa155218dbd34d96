//! Command Handler Module
//!
//! This module implements the handler layer of the dispatcher.
//! It receives a command name and a single argument value, selects a
//! handler by command suffix, and returns the handler's reply.
//!
//! ## Architecture
//!
//! ```text
//! Dispatcher::main(command, args)
//!       │
//!       ▼
//! ┌─────────────────┐
//! │ HandlerRegistry │  (this module)
//! │                 │
//! │  - Route        │
//! │  - Coerce       │
//! │  - Execute      │
//! └────────┬────────┘
//!          │
//!          ▼
//!        Reply
//! ```
//!
//! ## Supported Commands
//!
//! - `*factorial` - `n!` for a non-negative integer
//! - `*hello` - `"Hello {value}!"`
//! - `*big_response` - a string of `n` `x` characters

pub mod handler;

// Re-export the registry and its types
pub use handler::{DispatchError, HandlerKind, HandlerRegistry, Route};
