//! Service Module
//!
//! This module wraps the dispatcher for a hosting harness: JSON argument
//! payloads in, JSON replies out, with the registry reloaded when the
//! watched file changes.
//!
//! ## Example
//!
//! ```ignore
//! use capdispatch::service::Service;
//!
//! let service = Service::try_init(None).await?;
//! let reply = service.check_invoke("wasmbus.factorial", b"5").await?;
//! assert_eq!(&reply[..], b"120");
//! ```

pub mod provider;

// Re-export commonly used types
pub use provider::{Service, ServiceError};
