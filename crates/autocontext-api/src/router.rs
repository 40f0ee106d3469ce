use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Room left for multipart boundaries and form fields around the file itself
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Create the API router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    let body_limit = state.config().app.max_file_size_bytes() + MULTIPART_OVERHEAD_BYTES;

    Router::new()
        // Health
        .route("/health", get(handlers::health_check))

        // Ingestion
        .route("/ingest_documents", post(handlers::ingest_documents))
        .route("/upload_and_process_file", post(handlers::upload_and_process_file))

        // Retrieval
        .route("/search", post(handlers::search))
        .route("/rag_completion", post(handlers::rag_completion))

        // Pipeline logs
        .route("/logs", get(handlers::get_logs))

        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(DefaultBodyLimit::max(body_limit)),
        )
        .with_state(state)
}
