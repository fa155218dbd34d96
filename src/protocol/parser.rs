//! Request Line Parser
//!
//! The CLI harness feeds the dispatcher one request per line:
//!
//! ```text
//! <command> [<json argument>]
//! ```
//!
//! The command is the first whitespace-delimited token. Everything after it
//! (trimmed) is the argument payload, kept as raw bytes so the service layer
//! decides how to decode it. A missing payload is an empty buffer, which the
//! service treats as "no `arg` key".
//!
//! ## Examples
//!
//! ```text
//! ns.factorial 5
//! ns.hello "World"
//! ns.big_response 3
//! reload
//! ```

use bytes::Bytes;
use thiserror::Error;

/// Errors that can occur while parsing a request line.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParseError {
    /// The line is blank
    #[error("empty input")]
    EmptyInput,

    /// The line exceeds the maximum allowed size
    #[error("request too large: {size} bytes (max: {max})")]
    RequestTooLarge { size: usize, max: usize },
}

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Maximum size for a single request line (16 MB)
pub const MAX_REQUEST_SIZE: usize = 16 * 1024 * 1024;

/// A parsed request: the command and its undecoded argument payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// The command name, e.g. `wasmbus.factorial`
    pub command: String,
    /// The raw argument payload (empty if none was given)
    pub arg: Bytes,
}

impl Request {
    /// Returns true if the request carries an argument payload.
    pub fn has_arg(&self) -> bool {
        !self.arg.is_empty()
    }
}

/// Parses a single request line.
///
/// Returns `Ok(None)` for comment lines (starting with `#`), so a script of
/// requests can be annotated.
pub fn parse_request(line: &str) -> ParseResult<Option<Request>> {
    if line.len() > MAX_REQUEST_SIZE {
        return Err(ParseError::RequestTooLarge {
            size: line.len(),
            max: MAX_REQUEST_SIZE,
        });
    }

    let line = line.trim();
    if line.is_empty() {
        return Err(ParseError::EmptyInput);
    }
    if line.starts_with('#') {
        return Ok(None);
    }

    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };

    Ok(Some(Request {
        command: command.to_string(),
        arg: Bytes::copy_from_slice(rest.as_bytes()),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command_with_arg() {
        let request = parse_request("ns.factorial 5").unwrap().unwrap();
        assert_eq!(request.command, "ns.factorial");
        assert_eq!(request.arg, Bytes::from("5"));
        assert!(request.has_arg());
    }

    #[test]
    fn test_parse_command_without_arg() {
        let request = parse_request("reload").unwrap().unwrap();
        assert_eq!(request.command, "reload");
        assert!(!request.has_arg());
    }

    #[test]
    fn test_parse_keeps_json_whitespace() {
        let request = parse_request("  h.hello   \"Big World\"  ").unwrap().unwrap();
        assert_eq!(request.command, "h.hello");
        assert_eq!(request.arg, Bytes::from("\"Big World\""));
    }

    #[test]
    fn test_parse_tab_separator() {
        let request = parse_request("x.big_response\t3").unwrap().unwrap();
        assert_eq!(request.command, "x.big_response");
        assert_eq!(request.arg, Bytes::from("3"));
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(parse_request("   "), Err(ParseError::EmptyInput));
    }

    #[test]
    fn test_parse_comment() {
        assert_eq!(parse_request("# warm up").unwrap(), None);
    }
}
