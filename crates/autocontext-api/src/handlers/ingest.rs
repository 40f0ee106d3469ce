use std::path::Path;
use std::sync::Arc;

use autocontext_core::models::{Document, EntryData, IngestionType, Metadata};
use autocontext_pipeline::IngestionPipeline;
use axum::{extract::Multipart, extract::State, Json};
use serde_json::Value;
use uuid::Uuid;

use crate::dto::{IngestDocumentsRequest, IngestResponse};
use crate::error::ApiError;
use crate::state::AppState;

/// Ingest JSON documents in order
///
/// Every blob type is checked before anything is stored. A document that
/// fails later still leaves the earlier ones stored; their ids are listed in
/// the error details.
pub async fn ingest_documents(
    State(state): State<Arc<AppState>>,
    Json(request): Json<IngestDocumentsRequest>,
) -> Result<Json<IngestResponse>, ApiError> {
    tracing::info!(documents = request.documents.len(), "Processing ingest request");

    let mut batch = Vec::with_capacity(request.documents.len());
    for (position, document) in request.documents.into_iter().enumerate() {
        let mut blobs = Vec::with_capacity(document.blobs.len());
        for (entry_type, text) in document.blobs {
            let entry_type: IngestionType = entry_type.parse().map_err(|e| {
                ApiError::from(e).with_details(format!(
                    "documents[{}]: unsupported blob type '{}'. Use txt, json, html, or pdf",
                    position, entry_type
                ))
            })?;
            blobs.push((entry_type, EntryData::Text(text)));
        }
        let document_id = document.document_id.unwrap_or_else(Uuid::new_v4);
        batch.push((document_id, blobs, document.metadata));
    }

    let mut response = IngestResponse::default();
    for (document_id, blobs, metadata) in batch {
        let report = match state.pipelines.ingestion.run(document_id, blobs, metadata).await {
            Ok(report) => report,
            Err(e) => return Err(partial_failure(ApiError::from(e), document_id, &response)),
        };
        response.add(report.document_id, report.documents, report.chunks);
    }

    Ok(Json(response))
}

fn partial_failure(error: ApiError, failed: Uuid, stored: &IngestResponse) -> ApiError {
    if stored.document_ids.is_empty() {
        return error;
    }

    let stored_ids: Vec<String> = stored.document_ids.iter().map(Uuid::to_string).collect();
    let cause = error.details.clone().unwrap_or_else(|| error.message.clone());
    tracing::warn!(%failed, stored = stored_ids.len(), "Ingest request stopped part way");

    let message = error.message.clone();
    ApiError::new(error.status, message).with_details(format!(
        "{}; document {} failed; already stored: {}",
        cause,
        failed,
        stored_ids.join(", ")
    ))
}

pub async fn upload_and_process_file(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<IngestResponse>, ApiError> {
    let max_bytes = state.config().app.max_file_size_bytes();
    let upload = read_upload(&mut multipart).await?;

    tracing::info!(filename = %upload.filename, size = upload.data.len(), "Received file for ingestion");

    if upload.data.len() > max_bytes {
        return Err(ApiError::payload_too_large("File exceeds the upload limit").with_details(
            format!(
                "{} is {} bytes; the limit is {} MB",
                upload.filename,
                upload.data.len(),
                state.config().app.max_file_size_in_mb
            ),
        ));
    }

    let entry_type = IngestionType::from_path(Path::new(&upload.filename))?;
    let document_id =
        upload.document_id.unwrap_or_else(|| Document::id_from_label(&upload.filename));

    let mut metadata = upload.metadata;
    metadata
        .entry("file_name".to_string())
        .or_insert_with(|| Value::String(upload.filename.clone()));

    let report = state
        .pipelines
        .ingestion
        .run(document_id, vec![(entry_type, EntryData::Bytes(upload.data))], metadata)
        .await?;

    let mut response = IngestResponse::default();
    response.add(report.document_id, report.documents, report.chunks);
    Ok(Json(response))
}

struct Upload {
    filename: String,
    data: Vec<u8>,
    document_id: Option<Uuid>,
    metadata: Metadata,
}

async fn read_upload(multipart: &mut Multipart) -> Result<Upload, ApiError> {
    let mut file = None;
    let mut document_id = None;
    let mut metadata = Metadata::new();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        ApiError::new(e.status(), "Failed to parse multipart form").with_details(e.body_text())
    })? {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or("upload.txt").to_string();
                let data = field.bytes().await.map_err(|e| {
                    ApiError::new(e.status(), "Failed to read file data").with_details(e.body_text())
                })?;
                file = Some((filename, data.to_vec()));
            }
            "document_id" => {
                let text = field_text(field).await?;
                let id = Uuid::parse_str(text.trim()).map_err(|e| {
                    ApiError::bad_request("Invalid document_id").with_details(e.to_string())
                })?;
                document_id = Some(id);
            }
            "metadata" => {
                let text = field_text(field).await?;
                metadata = serde_json::from_str(&text).map_err(|e| {
                    ApiError::bad_request("Metadata must be a JSON object").with_details(e.to_string())
                })?;
            }
            other => tracing::debug!(field = other, "Ignoring multipart field"),
        }
    }

    let (filename, data) = file.ok_or_else(|| {
        ApiError::bad_request("No file provided")
            .with_details("Expected a 'file' field in the multipart form")
    })?;

    Ok(Upload { filename, data, document_id, metadata })
}

async fn field_text(field: axum::extract::multipart::Field<'_>) -> Result<String, ApiError> {
    field.text().await.map_err(|e| {
        ApiError::new(e.status(), "Failed to read form field").with_details(e.body_text())
    })
}
