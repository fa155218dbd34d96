//! Argument, Reply and Request Types
//!
//! This module defines the data that crosses the dispatcher boundary.
//!
//! ## Modules
//!
//! - `types`: The `Value`, `Reply` and `ArgMap` types and their JSON encoding
//! - `parser`: Parser for `<command> [<json>]` request lines
//!
//! ## Example
//!
//! ```
//! use capdispatch::protocol::{parse_request, Reply, Value};
//!
//! let request = parse_request("ns.hello \"World\"").unwrap().unwrap();
//! let value = Value::decode(&request.arg).unwrap();
//! assert_eq!(value, Value::string("World"));
//!
//! let reply = Reply::string("Hello World!");
//! assert_eq!(&reply.encode().unwrap()[..], b"\"Hello World!\"");
//! ```

pub mod parser;
pub mod types;

// Re-export commonly used types for convenience
pub use parser::{parse_request, ParseError, ParseResult, Request};
pub use types::{ArgMap, Reply, Value};
