//! GraphQL object types
//!
//! Each object carries its own typed context: a `Page` wraps the page handle,
//! an `Image` / `Reference` wraps the plain value. No resolver downcasts.

use crate::source::{Image, PageHandle, Reference, SourceError};
use async_graphql::{Object, SimpleObject};
use futures::TryStreamExt;
use std::sync::Arc;

#[derive(Debug, Clone, SimpleObject)]
#[graphql(name = "Image")]
pub struct ImageObject {
    url: Option<String>,
    title: Option<String>,
    #[graphql(name = "description_url")]
    description_url: Option<String>,
}

impl From<Image> for ImageObject {
    fn from(image: Image) -> Self {
        Self {
            url: Some(image.url),
            title: Some(image.title),
            description_url: Some(image.description_url),
        }
    }
}

#[derive(Debug, Clone, SimpleObject)]
#[graphql(name = "Reference")]
pub struct ReferenceObject {
    url: Option<String>,
}

impl From<Reference> for ReferenceObject {
    fn from(reference: Reference) -> Self {
        Self { url: Some(reference.url) }
    }
}

/// A resolved page; every field asks the handle on demand
pub struct PageObject {
    handle: Arc<dyn PageHandle>,
}

impl PageObject {
    pub fn new(handle: Arc<dyn PageHandle>) -> Self {
        Self { handle }
    }
}

/// Turn a source result into a nullable field value, logging failures.
pub(crate) fn resolved<T>(field: &'static str, result: Result<T, SourceError>) -> async_graphql::Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            tracing::warn!(field, error = %e, "field resolution failed");
            Err(e.into())
        }
    }
}

#[Object(name = "Page")]
impl PageObject {
    async fn id(&self) -> async_graphql::Result<Option<String>> {
        resolved("id", self.handle.id().await)
    }

    async fn title(&self) -> async_graphql::Result<Option<String>> {
        resolved("title", self.handle.title().await)
    }

    async fn content(&self) -> async_graphql::Result<Option<String>> {
        resolved("content", self.handle.content().await)
    }

    #[graphql(name = "html_content")]
    async fn html_content(&self) -> async_graphql::Result<Option<String>> {
        resolved("html_content", self.handle.html_content().await)
    }

    async fn summary(&self) -> async_graphql::Result<Option<String>> {
        resolved("summary", self.handle.summary().await)
    }

    /// Drains the whole image sequence; the first error drops the list.
    async fn images(&self) -> async_graphql::Result<Option<Vec<Option<ImageObject>>>> {
        let images = self
            .handle
            .images()
            .map_ok(|image| Some(ImageObject::from(image)))
            .try_collect::<Vec<_>>()
            .await;
        resolved("images", images)
    }

    /// Drains the whole reference sequence; the first error drops the list.
    async fn references(&self) -> async_graphql::Result<Option<Vec<Option<ReferenceObject>>>> {
        let references = self
            .handle
            .references()
            .map_ok(|reference| Some(ReferenceObject::from(reference)))
            .try_collect::<Vec<_>>()
            .await;
        resolved("references", references)
    }
}
