use std::sync::Arc;

use autocontext_core::models::LogEntry;
use autocontext_store::LoggingConnection;
use axum::{
    extract::{Query, State},
    Json,
};

use crate::dto::LogsQuery;
use crate::error::ApiError;
use crate::state::AppState;

/// Most recent pipeline log entries, capped at `app.max_logs`
pub async fn get_logs(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LogsQuery>,
) -> Result<Json<Vec<LogEntry>>, ApiError> {
    let max_logs = state.config().app.max_logs;
    let limit = query.limit.unwrap_or(max_logs).min(max_logs);

    let Some(connection) = &state.pipelines.logging else {
        tracing::debug!("Logging is disabled; returning no entries");
        return Ok(Json(Vec::new()));
    };

    let entries = connection.get_logs(limit).await?;
    Ok(Json(entries))
}
