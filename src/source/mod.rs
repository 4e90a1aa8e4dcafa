//! Page source framework
//!
//! Defines the capability the GraphQL schema resolves against. The schema never
//! talks to the network directly; it only sees a `PageSource` and the
//! `PageHandle`s it hands out.
//!
//! Two implementations ship with the crate:
//! - `MediaWikiSource`: reqwest-backed client for the MediaWiki action API
//! - `InMemorySource`: registered fixtures, for tests and substitution

pub mod dto;
pub mod mediawiki;
pub mod memory;

pub use mediawiki::{MediaWikiPage, MediaWikiSource, SourceSettings};
pub use memory::{InMemorySource, MemoryPage};

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// An image embedded in a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    /// Direct URL of the file
    pub url: String,
    /// File title, e.g. `File:Flag of Argentina.svg`
    pub title: String,
    /// URL of the file description page
    pub description_url: String,
}

impl Image {
    pub fn new(url: impl Into<String>, title: impl Into<String>, description_url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            description_url: description_url.into(),
        }
    }
}

/// An outbound (external) link of a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub url: String,
}

impl Reference {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

/// Errors reported by a page source
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("upstream returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("upstream API error {code}: {info}")]
    Api { code: String, info: String },

    #[error("invalid upstream payload: {0}")]
    Decode(String),

    #[error("{0}")]
    Upstream(String),
}

/// Lazy, finite, non-restartable sequence of source items.
///
/// Consumers stop at the first `Err`; nothing after it is meaningful.
pub type ItemStream<'a, T> = BoxStream<'a, Result<T, SourceError>>;

/// Handle to a single resolved page
///
/// Scalar accessors may fail independently of each other.
#[async_trait]
pub trait PageHandle: Send + Sync {
    /// Page identifier
    async fn id(&self) -> Result<String, SourceError>;

    /// Canonical page title
    async fn title(&self) -> Result<String, SourceError>;

    /// Plain-text content
    async fn content(&self) -> Result<String, SourceError>;

    /// Rendered HTML
    async fn html_content(&self) -> Result<String, SourceError>;

    /// Plain-text lead section
    async fn summary(&self) -> Result<String, SourceError>;

    /// Images embedded in the page, in source order
    fn images(&self) -> ItemStream<'_, Image>;

    /// External links of the page, in source order
    fn references(&self) -> ItemStream<'_, Reference>;
}

/// Capability to look pages up
///
/// `Ok(None)` means the page does not exist; it is not an error.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn page_by_id(&self, id: &str) -> Result<Option<Arc<dyn PageHandle>>, SourceError>;

    async fn page_by_title(&self, title: &str) -> Result<Option<Arc<dyn PageHandle>>, SourceError>;
}
