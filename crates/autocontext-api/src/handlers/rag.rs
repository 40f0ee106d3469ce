use std::sync::Arc;

use autocontext_pipeline::{RagOutput, RagRequest};
use axum::{extract::State, Json};

use crate::dto::RagCompletionRequest;
use crate::error::ApiError;
use crate::state::AppState;

pub async fn rag_completion(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RagCompletionRequest>,
) -> Result<Json<RagOutput>, ApiError> {
    tracing::info!(
        query = %request.query,
        limit = request.limit,
        model = request.generation_config.as_ref().map(|c| c.model.as_str()),
        "Processing RAG completion request"
    );

    if request.query.trim().is_empty() {
        return Err(ApiError::bad_request("Query cannot be empty"));
    }

    let mut rag_request = RagRequest::new(request.query)
        .with_filters(request.filters)
        .with_limit(request.limit)
        .with_search_only(false);
    if let Some(generation_config) = request.generation_config {
        rag_request = rag_request.with_generation_config(generation_config);
    }
    let output = state.pipelines.rag.run(rag_request).await?;

    Ok(Json(output))
}
