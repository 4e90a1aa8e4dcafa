use axum::{
    extract::{Query, State},
    Json,
    http::StatusCode,
};
use async_graphql::{Response, ServerError};
use crate::server::AppState;
use std::sync::Arc;

/// `GET /graphql?query=...`
///
/// Only the first `query` value is used. Executed queries always answer
/// `200 OK`; resolution errors travel in the body. A request without a
/// `query` parameter is rejected with `400 Bad Request`.
pub async fn graphql(
    State(state): State<Arc<AppState>>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<Response>, (StatusCode, Json<Response>)> {
    let query = params
        .into_iter()
        .find_map(|(key, value)| (key == "query").then_some(value))
        .ok_or_else(|| {
            tracing::debug!("Rejected request without a query parameter");
            (
                StatusCode::BAD_REQUEST,
                Json(Response::from_errors(vec![ServerError::new(
                    "missing `query` parameter",
                    None,
                )])),
            )
        })?;

    Ok(Json(state.executor.execute(&query).await))
}
