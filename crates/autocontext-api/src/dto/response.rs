use serde::Serialize;
use uuid::Uuid;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    /// RAG pipeline serving `/search` and `/rag_completion`
    pub pipeline: String,
}

impl HealthResponse {
    pub fn ok(pipeline: impl ToString) -> Self {
        Self { status: "ok", service: "autocontext-api", pipeline: pipeline.to_string() }
    }
}

/// Ingest operation response
#[derive(Debug, Default, Serialize)]
pub struct IngestResponse {
    pub document_ids: Vec<Uuid>,
    pub documents: usize,
    pub chunks: usize,
}

impl IngestResponse {
    pub fn add(&mut self, document_id: Uuid, documents: usize, chunks: usize) {
        self.document_ids.push(document_id);
        self.documents += documents;
        self.chunks += chunks;
    }
}
