use autocontext_core::models::{GenerationConfig, Metadata, SearchFilters};
use autocontext_pipeline::rag::DEFAULT_SEARCH_LIMIT;
use serde::Deserialize;
use std::collections::BTreeMap;
use uuid::Uuid;

/// Body of `POST /ingest_documents`
#[derive(Debug, Deserialize)]
pub struct IngestDocumentsRequest {
    pub documents: Vec<DocumentRequest>,
}

/// One document to ingest
#[derive(Debug, Deserialize)]
pub struct DocumentRequest {
    pub document_id: Option<Uuid>,
    /// Entry payloads keyed by entry type (`txt`, `json`, `html`)
    pub blobs: BTreeMap<String, String>,
    #[serde(default)]
    pub metadata: Metadata,
}

/// Body of `POST /search`
#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default)]
    pub filters: SearchFilters,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

/// Body of `POST /rag_completion`
#[derive(Debug, Deserialize)]
pub struct RagCompletionRequest {
    pub query: String,
    #[serde(default)]
    pub filters: SearchFilters,
    #[serde(default = "default_limit")]
    pub limit: usize,
    pub generation_config: Option<GenerationConfig>,
}

fn default_limit() -> usize {
    DEFAULT_SEARCH_LIMIT
}

/// Query string of `GET /logs`
#[derive(Debug, Deserialize)]
pub struct LogsQuery {
    pub limit: Option<usize>,
}
