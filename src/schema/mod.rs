//! GraphQL schema definition
//!
//! ```graphql
//! type Query { page(id: String, title: String): Page }
//! ```
//!
//! The page source is injected as schema data, so the same schema runs
//! against MediaWiki in production and fixtures in tests.

pub mod types;

pub use types::{ImageObject, PageObject, ReferenceObject};

use crate::source::PageSource;
use async_graphql::{Context, EmptyMutation, EmptySubscription, Object, Schema};
use std::sync::Arc;
use types::resolved;

/// The executable schema
pub type WikiSchema = Schema<QueryRoot, EmptyMutation, EmptySubscription>;

/// Root query type
pub struct QueryRoot;

#[Object(name = "Query")]
impl QueryRoot {
    /// Look a page up by `id`, or by `title` when no id is given.
    ///
    /// With neither argument the page is `null` and no error is raised.
    async fn page(
        &self,
        ctx: &Context<'_>,
        id: Option<String>,
        title: Option<String>,
    ) -> async_graphql::Result<Option<PageObject>> {
        let source = ctx.data::<Arc<dyn PageSource>>()?;
        let handle = match (id, title) {
            (Some(id), _) => {
                tracing::debug!(%id, "resolving page by id");
                source.page_by_id(&id).await
            }
            (None, Some(title)) => {
                tracing::debug!(%title, "resolving page by title");
                source.page_by_title(&title).await
            }
            (None, None) => return Ok(None),
        };
        Ok(resolved("page", handle)?.flatten().map(PageObject::new))
    }
}

/// Build the schema around a page source
pub fn build_schema(source: Arc<dyn PageSource>) -> WikiSchema {
    Schema::build(QueryRoot, EmptyMutation, EmptySubscription)
        .data(source)
        .finish()
}
