//! In-memory page source
//!
//! Pages are registered up front and looked up by id or title. Every accessor
//! can be told to fail, which makes error propagation through the schema
//! testable without a network.

use super::{Image, ItemStream, PageHandle, PageSource, Reference, SourceError};
use crate::{Error, Result};
use async_trait::async_trait;
use futures::stream;
use std::collections::HashMap;
use std::sync::Arc;

/// A scalar field: either a value or the message of the error it reports
type Field = std::result::Result<String, String>;

fn read(field: &Field) -> std::result::Result<String, SourceError> {
    field.clone().map_err(SourceError::Upstream)
}

/// A registered page
#[derive(Debug, Clone)]
pub struct MemoryPage {
    id: Field,
    title: Field,
    content: Field,
    html_content: Field,
    summary: Field,
    images: Vec<std::result::Result<Image, String>>,
    references: Vec<std::result::Result<Reference, String>>,
}

impl MemoryPage {
    /// Create a page with the given id and title; either may be empty, not both.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: Ok(id.into()),
            title: Ok(title.into()),
            content: Ok(String::new()),
            html_content: Ok(String::new()),
            summary: Ok(String::new()),
            images: Vec::new(),
            references: Vec::new(),
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Ok(content.into());
        self
    }

    pub fn with_html_content(mut self, html: impl Into<String>) -> Self {
        self.html_content = Ok(html.into());
        self
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Ok(summary.into());
        self
    }

    pub fn with_image(mut self, image: Image) -> Self {
        self.images.push(Ok(image));
        self
    }

    pub fn with_reference(mut self, reference: Reference) -> Self {
        self.references.push(Ok(reference));
        self
    }

    /// Make the `id` accessor fail. The page is then only reachable by title.
    pub fn with_id_error(mut self, message: impl Into<String>) -> Self {
        self.id = Err(message.into());
        self
    }

    pub fn with_title_error(mut self, message: impl Into<String>) -> Self {
        self.title = Err(message.into());
        self
    }

    pub fn with_content_error(mut self, message: impl Into<String>) -> Self {
        self.content = Err(message.into());
        self
    }

    pub fn with_html_content_error(mut self, message: impl Into<String>) -> Self {
        self.html_content = Err(message.into());
        self
    }

    pub fn with_summary_error(mut self, message: impl Into<String>) -> Self {
        self.summary = Err(message.into());
        self
    }

    /// Append a failing element to the image sequence
    pub fn with_image_error(mut self, message: impl Into<String>) -> Self {
        self.images.push(Err(message.into()));
        self
    }

    /// Append a failing element to the reference sequence
    pub fn with_reference_error(mut self, message: impl Into<String>) -> Self {
        self.references.push(Err(message.into()));
        self
    }

    /// Keys the page is reachable under; failing or empty fields give none
    fn lookup_keys(&self) -> (Option<String>, Option<String>) {
        let key = |field: &Field| field.as_ref().ok().filter(|s| !s.is_empty()).cloned();
        (key(&self.id), key(&self.title))
    }
}

#[async_trait]
impl PageHandle for MemoryPage {
    async fn id(&self) -> std::result::Result<String, SourceError> {
        read(&self.id)
    }

    async fn title(&self) -> std::result::Result<String, SourceError> {
        read(&self.title)
    }

    async fn content(&self) -> std::result::Result<String, SourceError> {
        read(&self.content)
    }

    async fn html_content(&self) -> std::result::Result<String, SourceError> {
        read(&self.html_content)
    }

    async fn summary(&self) -> std::result::Result<String, SourceError> {
        read(&self.summary)
    }

    fn images(&self) -> ItemStream<'_, Image> {
        Box::pin(stream::iter(
            self.images.iter().cloned().map(|item| item.map_err(SourceError::Upstream)),
        ))
    }

    fn references(&self) -> ItemStream<'_, Reference> {
        Box::pin(stream::iter(
            self.references.iter().cloned().map(|item| item.map_err(SourceError::Upstream)),
        ))
    }
}

/// Page source backed by registered fixtures
#[derive(Default)]
pub struct InMemorySource {
    by_id: HashMap<String, Arc<MemoryPage>>,
    by_title: HashMap<String, Arc<MemoryPage>>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a page under its id and title.
    ///
    /// A page whose id accessor is configured to fail is only reachable by
    /// title, and vice versa.
    pub fn add_page(&mut self, page: MemoryPage) -> Result<()> {
        let (id, title) = page.lookup_keys();
        if id.is_none() && title.is_none() {
            return Err(Error::InvalidPage(
                "page needs to have either an id or a title".to_string(),
            ));
        }

        let page = Arc::new(page);
        if let Some(id) = id {
            self.by_id.insert(id, page.clone());
        }
        if let Some(title) = title {
            self.by_title.insert(title, page);
        }
        Ok(())
    }

    /// Number of distinct lookup keys registered
    pub fn len(&self) -> usize {
        self.by_id.len() + self.by_title.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty() && self.by_title.is_empty()
    }
}

#[async_trait]
impl PageSource for InMemorySource {
    async fn page_by_id(&self, id: &str) -> std::result::Result<Option<Arc<dyn PageHandle>>, SourceError> {
        Ok(self.by_id.get(id).map(|page| page.clone() as Arc<dyn PageHandle>))
    }

    async fn page_by_title(&self, title: &str) -> std::result::Result<Option<Arc<dyn PageHandle>>, SourceError> {
        Ok(self.by_title.get(title).map(|page| page.clone() as Arc<dyn PageHandle>))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::{StreamExt, TryStreamExt};

    #[test]
    fn test_rejects_page_without_keys() {
        let mut source = InMemorySource::new();
        let err = source.add_page(MemoryPage::new("", "")).unwrap_err();
        assert!(matches!(err, Error::InvalidPage(_)));
        assert!(source.is_empty());
    }

    #[tokio::test]
    async fn test_lookup_by_id_and_title() {
        let mut source = InMemorySource::new();
        source.add_page(MemoryPage::new("1234", "Argentina")).unwrap();
        source.add_page(MemoryPage::new("", "Chile")).unwrap();
        assert_eq!(source.len(), 3);

        let by_id = source.page_by_id("1234").await.unwrap().unwrap();
        assert_eq!(by_id.title().await.unwrap(), "Argentina");

        let by_title = source.page_by_title("Chile").await.unwrap().unwrap();
        assert_eq!(by_title.id().await.unwrap(), "");

        assert!(source.page_by_title("Peru").await.unwrap().is_none());
        assert!(source.page_by_id("").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_stream_reports_injected_error() {
        let page = MemoryPage::new("1", "One")
            .with_image(Image::new("url", "title", "description"))
            .with_image_error("quota exceeded")
            .with_image(Image::new("url3", "title3", "description3"));

        let items: Vec<_> = page.images().collect().await;
        assert_eq!(items.len(), 3);
        assert!(items[1].is_err());

        let drained = page.images().try_collect::<Vec<_>>().await;
        assert_eq!(drained.unwrap_err().to_string(), "quota exceeded");
    }
}
