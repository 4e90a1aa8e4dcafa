//! Query executor
//!
//! Runs one GraphQL request string against the schema and returns the result
//! tree (`data` and/or `errors`). Field-level error isolation is left to the
//! GraphQL engine.

use crate::schema::{build_schema, WikiSchema};
use crate::source::PageSource;
use async_graphql::Response;
use std::sync::Arc;
use std::time::Instant;

/// Executes queries against a built schema
#[derive(Clone)]
pub struct QueryExecutor {
    schema: WikiSchema,
}

impl QueryExecutor {
    /// Create an executor resolving pages through `source`
    pub fn new(source: Arc<dyn PageSource>) -> Self {
        Self {
            schema: build_schema(source),
        }
    }

    /// Execute a single query string
    pub async fn execute(&self, query: &str) -> Response {
        let started = Instant::now();
        let response = self.schema.execute(query).await;
        tracing::debug!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            errors = response.errors.len(),
            "executed query"
        );
        response
    }

    /// Execute and serialize the result tree as JSON
    pub async fn execute_json(&self, query: &str) -> serde_json::Result<serde_json::Value> {
        let response = self.execute(query).await;
        serde_json::to_value(&response)
    }

    /// Schema in SDL form
    pub fn sdl(&self) -> String {
        self.schema.sdl()
    }
}
