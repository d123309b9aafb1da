//! Lodestone Client Library
//!
//! Blocking HTTP client for Elasticsearch-compatible search engines.
//!
//! ```rust,no_run
//! use lodestone::{Client, DocumentRef};
//!
//! fn main() -> lodestone::Result<()> {
//!     let client = Client::new("localhost:9200");
//!     let doc = client.get_document(&DocumentRef::new("pages", "page", "http://example.com/"))?;
//!     println!("found: {}", doc.found);
//!     Ok(())
//! }
//! ```

mod client;
mod transport;

pub use client::Client;
pub use transport::HttpTransport;

pub use lodestone_core;
pub use lodestone_core::models::*;
pub use lodestone_core::{
    ClientConfig, Transport, TransportRequest, TransportResponse, DEFAULT_SEARCH_FIELDS,
};

pub use lodestone_core::Error as ClientError;

pub type Result<T> = std::result::Result<T, ClientError>;
