use std::sync::Arc;

use autocontext_pipeline::{RagOutput, RagRequest};
use axum::{extract::State, Json};

use crate::dto::SearchRequest;
use crate::error::ApiError;
use crate::state::AppState;

pub async fn search(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<RagOutput>, ApiError> {
    tracing::info!(
        query = %request.query,
        limit = request.limit,
        filters = request.filters.len(),
        "Processing search request"
    );

    if request.query.trim().is_empty() {
        return Err(ApiError::bad_request("Query cannot be empty"));
    }

    let rag_request = RagRequest::new(request.query)
        .with_filters(request.filters)
        .with_limit(request.limit)
        .with_search_only(true);
    let output = state.pipelines.rag.run(rag_request).await?;

    Ok(Json(output))
}
