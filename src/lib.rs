//! # Wikigraph - GraphQL gateway over Wikipedia
//!
//! Exposes encyclopedia pages through a GraphQL endpoint.
//!
//! Wikigraph provides:
//! - A `PageSource` capability with a MediaWiki-backed and an in-memory implementation
//! - A GraphQL schema (`Query`, `Page`, `Image`, `Reference`) bound to that capability
//! - A query executor and a single-route HTTP server (`GET /graphql`)

pub mod source;
pub mod schema;
pub mod query;
pub mod server;
pub mod config;
pub mod output;
pub mod ui;

// Re-exports for convenient access
pub use source::{Image, PageHandle, PageSource, Reference, SourceError};
pub use schema::{build_schema, WikiSchema};
pub use query::QueryExecutor;

/// Result type alias for Wikigraph operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Wikigraph operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid page: {0}")]
    InvalidPage(String),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}
