//! Lodestone Core Library
//!
//! The I/O-free half of the Lodestone search engine client:
//! - Request targets that keep document ids verbatim
//! - Wire requests for every operation
//! - Typed decoding of engine responses
//! - The transport seam and error types

pub mod config;
pub mod decode;
pub mod error;
pub mod models;
pub mod path;
pub mod request;
pub mod transport;

// Re-export commonly used types
pub use config::ClientConfig;
pub use error::{Error, Result};
pub use models::*;
pub use request::DEFAULT_SEARCH_FIELDS;
pub use transport::{Transport, TransportRequest, TransportResponse};
