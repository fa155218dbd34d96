//! Handler Registry
//!
//! This module implements the fixed set of command handlers and the suffix
//! table that routes a command name to one of them.
//!
//! ## Routing
//!
//! Commands are namespaced by the caller (e.g. `wasmbus.factorial`), so only
//! the suffix is significant. Routes are tried top to bottom and the first
//! match wins:
//!
//! | Suffix         | Handler        | Reply                          |
//! |----------------|----------------|--------------------------------|
//! | `factorial`    | `factorial`    | `Integer(n!)`                  |
//! | `hello`        | `say_hello`    | `String("Hello {value}!")`     |
//! | `big_response` | `big_response` | `String("xxx...")`             |
//! | (anything)     | unmatched      | `String("unknown command ..")` |
//!
//! An unmatched command is a normal reply, not an error.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     HandlerRegistry                         │
//! │                                                             │
//! │  ┌─────────────┐    ┌─────────────┐    ┌─────────────┐     │
//! │  │   route()   │───>│ HandlerKind │───>│   call()    │     │
//! │  └─────────────┘    └─────────────┘    └─────────────┘     │
//! │         │                                                   │
//! │         └──> Route::Unmatched ──> "unknown command .."      │
//! └─────────────────────────────────────────────────────────────┘
//! ```

use crate::protocol::{Reply, Value};
use std::fmt;
use std::time::Instant;
use thiserror::Error;

/// Largest input whose factorial fits in a `u128`.
pub const MAX_FACTORIAL_INPUT: u64 = 34;

/// Maximum length of a generated `big_response` string (512 MB)
pub const MAX_BIG_RESPONSE: usize = 512 * 1024 * 1024;

/// Errors raised while dispatching a command.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// The argument container has no entry under the expected key
    #[error("missing argument key '{0}'")]
    MissingArgument(&'static str),

    /// The argument has the wrong type for the selected handler
    #[error("{handler} expects {expected}, got {found}")]
    TypeMismatch {
        handler: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    /// Factorial of a negative number
    #[error("factorial is undefined for negative input {0}")]
    NegativeFactorial(i64),

    /// Factorial result does not fit in 128 bits
    #[error("factorial of {0} overflows 128 bits (max input 34)")]
    FactorialOverflow(u64),

    /// Generated response cannot be allocated
    #[error("response of {0} bytes is too large")]
    ResponseTooLarge(u64),
}

/// The handlers known to the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandlerKind {
    /// `n!` for a non-negative integer
    Factorial,
    /// `"Hello {value}!"`
    Hello,
    /// `n` repetitions of `x`
    BigResponse,
}

impl HandlerKind {
    /// Returns the handler's function name.
    pub fn name(&self) -> &'static str {
        match self {
            HandlerKind::Factorial => "factorial",
            HandlerKind::Hello => "say_hello",
            HandlerKind::BigResponse => "big_response",
        }
    }

    /// Invokes the handler with the given argument.
    pub fn call(self, value: &Value) -> Result<Reply, DispatchError> {
        match self {
            HandlerKind::Factorial => {
                let n = expect_integer(self, value)?;
                let n = u64::try_from(n).map_err(|_| DispatchError::NegativeFactorial(n))?;
                factorial(n).map(Reply::Integer)
            }
            HandlerKind::Hello => Ok(Reply::String(say_hello(value))),
            HandlerKind::BigResponse => {
                let n = expect_integer(self, value)?;
                // A non-positive count repeats zero times
                let n = u64::try_from(n).unwrap_or(0);
                big_response(n).map(Reply::String)
            }
        }
    }
}

impl fmt::Display for HandlerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The outcome of routing a command name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// A suffix matched; dispatch to this handler
    Matched(HandlerKind),
    /// No suffix matched
    Unmatched,
}

/// Default suffix table, in evaluation order.
const DEFAULT_ROUTES: [(&str, HandlerKind); 3] = [
    ("factorial", HandlerKind::Factorial),
    ("hello", HandlerKind::Hello),
    ("big_response", HandlerKind::BigResponse),
];

/// The fixed set of handlers, selected by command suffix.
///
/// A registry is immutable once built. Reloading means building a new one
/// with the next generation number.
#[derive(Debug, Clone)]
pub struct HandlerRegistry {
    /// Ordered `(suffix, handler)` pairs
    routes: Vec<(&'static str, HandlerKind)>,
    /// How many times the registry has been rebuilt
    generation: u64,
    /// When this instance was built
    loaded_at: Instant,
}

impl HandlerRegistry {
    /// Creates a freshly loaded registry (generation 0).
    pub fn new() -> Self {
        Self::with_generation(0)
    }

    /// Creates a registry with the given generation number.
    pub fn with_generation(generation: u64) -> Self {
        Self {
            routes: DEFAULT_ROUTES.to_vec(),
            generation,
            loaded_at: Instant::now(),
        }
    }

    /// Builds the registry that replaces this one on reload.
    pub fn reloaded(&self) -> Self {
        Self::with_generation(self.generation + 1)
    }

    /// Returns the generation number of this registry.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns when this registry was built.
    pub fn loaded_at(&self) -> Instant {
        self.loaded_at
    }

    /// Returns the routing table in evaluation order.
    pub fn routes(&self) -> &[(&'static str, HandlerKind)] {
        &self.routes
    }

    /// Selects the handler for a command by suffix.
    pub fn route(&self, command: &str) -> Route {
        self.routes
            .iter()
            .find(|(suffix, _)| command.ends_with(suffix))
            .map(|&(_, kind)| Route::Matched(kind))
            .unwrap_or(Route::Unmatched)
    }

    /// Dispatches a command to its handler.
    ///
    /// # Arguments
    ///
    /// * `command` - The command name, matched by suffix
    /// * `value` - The argument passed positionally to the handler
    ///
    /// # Returns
    ///
    /// The handler's reply, or `"unknown command {command}"` when no
    /// suffix matches.
    pub fn handle(&self, command: &str, value: &Value) -> Result<Reply, DispatchError> {
        match self.route(command) {
            Route::Matched(kind) => kind.call(value),
            Route::Unmatched => Ok(Reply::String(unknown_command(command))),
        }
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Computes `n!`.
///
/// `0!` and `1!` are `1`; inputs above [`MAX_FACTORIAL_INPUT`] overflow.
pub fn factorial(n: u64) -> Result<u128, DispatchError> {
    (2..=u128::from(n)).try_fold(1u128, |acc, i| {
        acc.checked_mul(i)
            .ok_or(DispatchError::FactorialOverflow(n))
    })
}

/// Formats a greeting for `name`.
pub fn say_hello(name: &Value) -> String {
    format!("Hello {}!", name)
}

/// Generates a string of `n` `x` characters.
///
/// Counts above [`MAX_BIG_RESPONSE`], or that cannot be allocated, fail
/// without touching the heap.
pub fn big_response(n: u64) -> Result<String, DispatchError> {
    let len = usize::try_from(n)
        .ok()
        .filter(|&len| len <= MAX_BIG_RESPONSE)
        .ok_or(DispatchError::ResponseTooLarge(n))?;

    let mut out = String::new();
    out.try_reserve_exact(len)
        .map_err(|_| DispatchError::ResponseTooLarge(n))?;
    out.extend(std::iter::repeat('x').take(len));
    Ok(out)
}

/// Formats the reply for a command with no matching suffix.
pub fn unknown_command(command: &str) -> String {
    format!("unknown command {}", command)
}

fn expect_integer(kind: HandlerKind, value: &Value) -> Result<i64, DispatchError> {
    value.as_integer().ok_or(DispatchError::TypeMismatch {
        handler: kind.name(),
        expected: "integer",
        found: value.type_name(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_registry() -> HandlerRegistry {
        HandlerRegistry::new()
    }

    #[test]
    fn test_factorial_base_cases() {
        let registry = create_registry();

        let response = registry.handle("x.factorial", &Value::integer(0));
        assert_eq!(response, Ok(Reply::Integer(1)));

        let response = registry.handle("x.factorial", &Value::integer(1));
        assert_eq!(response, Ok(Reply::Integer(1)));
    }

    #[test]
    fn test_factorial() {
        let registry = create_registry();

        let response = registry.handle("x.factorial", &Value::integer(5));
        assert_eq!(response, Ok(Reply::Integer(120)));

        let response = registry.handle("f.factorial", &Value::integer(10));
        assert_eq!(response, Ok(Reply::Integer(3_628_800)));
    }

    #[test]
    fn test_factorial_recurrence() {
        for n in 1..=MAX_FACTORIAL_INPUT {
            assert_eq!(
                factorial(n).unwrap(),
                factorial(n - 1).unwrap() * u128::from(n),
                "{}! != {}! * {}",
                n,
                n - 1,
                n
            );
        }
    }

    #[test]
    fn test_factorial_negative() {
        let registry = create_registry();

        let response = registry.handle("x.factorial", &Value::integer(-3));
        assert_eq!(response, Err(DispatchError::NegativeFactorial(-3)));
    }

    #[test]
    fn test_factorial_wrong_type() {
        let registry = create_registry();

        let response = registry.handle("x.factorial", &Value::string("five"));
        assert_eq!(
            response,
            Err(DispatchError::TypeMismatch {
                handler: "factorial",
                expected: "integer",
                found: "string",
            })
        );

        let response = registry.handle("x.factorial", &Value::Float(5.0));
        assert!(matches!(
            response,
            Err(DispatchError::TypeMismatch { found: "float", .. })
        ));
    }

    #[test]
    fn test_factorial_overflow() {
        assert!(factorial(MAX_FACTORIAL_INPUT).is_ok());
        assert_eq!(
            factorial(MAX_FACTORIAL_INPUT + 1),
            Err(DispatchError::FactorialOverflow(MAX_FACTORIAL_INPUT + 1))
        );
    }

    #[test]
    fn test_hello() {
        let registry = create_registry();

        let response = registry.handle("x.hello", &Value::string("World"));
        assert_eq!(response, Ok(Reply::string("Hello World!")));

        let response = registry.handle("hello", &Value::integer(7));
        assert_eq!(response, Ok(Reply::string("Hello 7!")));
    }

    #[test]
    fn test_big_response() {
        let registry = create_registry();

        let response = registry.handle("x.big_response", &Value::integer(3));
        assert_eq!(response, Ok(Reply::string("xxx")));

        let response = registry.handle("x.big_response", &Value::integer(0));
        assert_eq!(response, Ok(Reply::string("")));

        let response = registry.handle("x.big_response", &Value::integer(-4));
        assert_eq!(response, Ok(Reply::string("")));
    }

    #[test]
    fn test_big_response_too_large() {
        let registry = create_registry();

        let response = registry.handle("x.big_response", &Value::integer(i64::MAX));
        assert_eq!(
            response,
            Err(DispatchError::ResponseTooLarge(i64::MAX as u64))
        );

        let over = MAX_BIG_RESPONSE as i64 + 1;
        let response = registry.handle("x.big_response", &Value::integer(over));
        assert_eq!(response, Err(DispatchError::ResponseTooLarge(over as u64)));
    }

    #[test]
    fn test_big_response_wrong_type() {
        let registry = create_registry();

        let response = registry.handle("x.big_response", &Value::string("3"));
        assert_eq!(
            response,
            Err(DispatchError::TypeMismatch {
                handler: "big_response",
                expected: "integer",
                found: "string",
            })
        );

        let response = registry.handle("x.big_response", &Value::Float(3.0));
        assert!(matches!(
            response,
            Err(DispatchError::TypeMismatch { found: "float", .. })
        ));
    }

    #[test]
    fn test_hello_float() {
        let response = create_registry().handle("x.hello", &Value::Float(5.0));
        assert_eq!(response, Ok(Reply::string("Hello 5.0!")));
    }

    #[test]
    fn test_big_response_length() {
        let reply = create_registry()
            .handle("x.big_response", &Value::integer(64 * 1024))
            .unwrap();
        let s = reply.as_str().unwrap();
        assert_eq!(s.len(), 64 * 1024);
        assert!(s.bytes().all(|b| b == b'x'));
    }

    #[test]
    fn test_unknown_command() {
        let registry = create_registry();

        let response = registry.handle("x.unknown_thing", &Value::Null);
        assert_eq!(response, Ok(Reply::string("unknown command x.unknown_thing")));

        // Matching is by suffix only, never by prefix or substring
        let response = registry.handle("factorial.x", &Value::integer(3));
        assert_eq!(response, Ok(Reply::string("unknown command factorial.x")));
    }

    #[test]
    fn test_route_order() {
        let registry = create_registry();

        assert_eq!(
            registry.route("ns.factorial"),
            Route::Matched(HandlerKind::Factorial)
        );
        assert_eq!(registry.route("ns.hello"), Route::Matched(HandlerKind::Hello));
        assert_eq!(
            registry.route("ns.big_response"),
            Route::Matched(HandlerKind::BigResponse)
        );
        assert_eq!(registry.route("ns.reload"), Route::Unmatched);
        assert_eq!(registry.route(""), Route::Unmatched);

        let suffixes: Vec<&str> = registry.routes().iter().map(|(s, _)| *s).collect();
        assert_eq!(suffixes, vec!["factorial", "hello", "big_response"]);
    }

    #[test]
    fn test_reloaded_registry() {
        let registry = create_registry();
        let reloaded = registry.reloaded();

        assert_eq!(registry.generation(), 0);
        assert_eq!(reloaded.generation(), 1);
        assert!(reloaded.loaded_at() >= registry.loaded_at());
        assert_eq!(reloaded.routes(), registry.routes());
    }
}
