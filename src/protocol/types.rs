//! Argument and Reply Types
//!
//! This module defines the values that flow through the dispatcher.
//! Callers hand in an argument container keyed by name; only the `"arg"`
//! entry is read, and its `Value` is passed to the selected handler.
//! Handlers answer with a `Reply`.
//!
//! ## Encoding
//!
//! Both types map onto plain JSON, so a harness can exchange them as text:
//!
//! | Value / Reply        | JSON            |
//! |----------------------|-----------------|
//! | `Null`               | `null`          |
//! | `Bool(true)`         | `true`          |
//! | `Integer(120)`       | `120`           |
//! | `Float(1.5)`         | `1.5`           |
//! | `String("World")`    | `"World"`       |
//! | `List([..])`         | `[..]`          |
//! | `Map({..})`          | `{..}`          |

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The argument container passed to the dispatcher entry point.
pub type ArgMap = BTreeMap<String, Value>;

/// A dynamically typed argument value.
///
/// Variant order matters for decoding: integers are tried before floats,
/// so `5` decodes as `Integer(5)` and `5.0` as `Float(5.0)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Absent value (`null`)
    Null,

    /// Boolean
    Bool(bool),

    /// 64-bit signed integer
    Integer(i64),

    /// Floating point number
    Float(f64),

    /// UTF-8 text
    String(String),

    /// Ordered sequence of values
    List(Vec<Value>),

    /// String-keyed mapping of values
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// Creates a string value.
    ///
    /// # Example
    /// ```
    /// use capdispatch::protocol::types::Value;
    /// let name = Value::string("World");
    /// assert_eq!(name.to_string(), "World");
    /// ```
    pub fn string(s: impl Into<String>) -> Self {
        Value::String(s.into())
    }

    /// Creates an integer value.
    pub fn integer(n: i64) -> Self {
        Value::Integer(n)
    }

    /// Returns the name of this value's type, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "map",
        }
    }

    /// Attempts to extract the inner integer.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Decodes a value from JSON bytes.
    pub fn decode(buf: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(buf)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Integer(n) => write!(f, "{}", n),
            // Debug keeps the fraction on integral floats (`5.0`, not `5`)
            Value::Float(x) => write!(f, "{:?}", x),
            Value::String(s) => f.write_str(s),
            // Containers render as compact JSON
            Value::List(_) | Value::Map(_) => match serde_json::to_string(self) {
                Ok(json) => f.write_str(&json),
                Err(_) => Err(fmt::Error),
            },
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

/// The result of a dispatched command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Reply {
    /// Factorial results
    Integer(u128),

    /// Greetings, generated strings and unknown-command messages
    String(String),

    /// Reload acknowledgment
    Bool(bool),
}

impl Reply {
    /// Creates a string reply.
    pub fn string(s: impl Into<String>) -> Self {
        Reply::String(s.into())
    }

    /// Attempts to extract the inner string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Reply::String(s) => Some(s),
            _ => None,
        }
    }

    /// Encodes the reply as JSON bytes.
    pub fn encode(&self) -> Result<Bytes, serde_json::Error> {
        serde_json::to_vec(self).map(Bytes::from)
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Integer(n) => write!(f, "(integer) {}", n),
            Reply::String(s) => write!(f, "\"{}\"", s),
            Reply::Bool(b) => write!(f, "(bool) {}", b),
        }
    }
}
