//! Ingestion pipelines
//!
//! An ingestion run turns raw entries into [`Document`]s, splits them into
//! chunks, embeds the chunks and upserts them into the vector database.

mod autocontext;
mod extract;

pub use autocontext::AutoContextIngestionPipeline;

use async_trait::async_trait;
use autocontext_core::error::Result;
use autocontext_core::models::{
    Document, EntryData, IngestionType, LogEntry, Metadata, PipelineType, VectorEntry,
};
use autocontext_llm::ports::EmbeddingProvider;
use autocontext_store::ports::{LoggingConnection, VectorDbProvider};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

use crate::chunk::TextSplitter;
use crate::embedding::EmbeddingPipeline;

/// Providers and settings shared by every ingestion pipeline
#[derive(Clone)]
pub struct IngestionComponents {
    pub db: Arc<dyn VectorDbProvider>,
    pub embeddings_provider: Arc<dyn EmbeddingProvider>,
    pub embedding_model: String,
    pub embedding_batch_size: usize,
    pub splitter: TextSplitter,
    pub logging_connection: Option<Arc<dyn LoggingConnection>>,
}

/// Summary of one ingestion run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestionReport {
    pub document_id: Uuid,
    /// Documents produced by `process_data`
    pub documents: usize,
    /// Chunks upserted into the vector database
    pub chunks: usize,
}

#[async_trait]
pub trait IngestionPipeline: Send + Sync {
    fn components(&self) -> &IngestionComponents;

    /// Turn one raw entry into documents
    async fn process_data(
        &self,
        entry_type: IngestionType,
        entry_data: &EntryData,
    ) -> Result<Vec<Document>>;

    /// Process, chunk, embed and store every blob of a document
    ///
    /// All produced documents take `document_id`; `metadata` is merged over
    /// whatever metadata `process_data` extracted.
    async fn run(
        &self,
        document_id: Uuid,
        blobs: Vec<(IngestionType, EntryData)>,
        metadata: Metadata,
    ) -> Result<IngestionReport> {
        let components = self.components();
        let run_id = Uuid::new_v4();

        let mut documents = Vec::new();
        for (entry_type, entry_data) in &blobs {
            tracing::debug!(%document_id, %entry_type, bytes = entry_data.len(), "Processing entry");
            for mut document in self.process_data(*entry_type, entry_data).await? {
                document.id = document_id;
                for (key, value) in &metadata {
                    document.metadata.insert(key.clone(), value.clone());
                }
                documents.push(document);
            }
        }

        let mut chunk_texts = Vec::new();
        let mut chunk_metadata = Vec::new();
        for document in &documents {
            for text in components.splitter.split(&document.text) {
                let mut chunk_meta = document.metadata.clone();
                chunk_meta.insert("document_id".to_string(), json!(document.id));
                chunk_meta.insert("chunk_index".to_string(), json!(chunk_texts.len()));
                chunk_meta.insert("text".to_string(), Value::String(text.clone()));
                chunk_texts.push(text);
                chunk_metadata.push(chunk_meta);
            }
        }

        let embedder = EmbeddingPipeline::new(
            components.embeddings_provider.clone(),
            components.embedding_model.clone(),
            components.embedding_batch_size,
        );
        let vectors = embedder
            .embed_chunks(&chunk_texts, |done, total| {
                tracing::debug!(%document_id, done, total, "Embedded chunk batch");
            })
            .await?;

        let entries: Vec<VectorEntry> = vectors
            .into_iter()
            .zip(chunk_metadata)
            .enumerate()
            .map(|(index, (vector, metadata))| {
                let id = Uuid::new_v5(&document_id, index.to_string().as_bytes());
                VectorEntry::new(id, vector, metadata)
            })
            .collect();

        // Chunks from an earlier ingestion of this document must not outlive it
        let replaced = components.db.filtered_deletion("document_id", &json!(document_id)).await?;
        if replaced > 0 {
            tracing::debug!(%document_id, replaced, "Removed previously stored chunks");
        }
        components.db.upsert(&entries).await?;

        let report = IngestionReport {
            document_id,
            documents: documents.len(),
            chunks: entries.len(),
        };
        tracing::info!(
            %document_id,
            documents = report.documents,
            chunks = report.chunks,
            "Ingested document"
        );

        if let Some(connection) = &components.logging_connection {
            connection
                .log(LogEntry::new(
                    run_id,
                    PipelineType::Ingestion,
                    "run",
                    serde_json::to_value(&report)?,
                ))
                .await?;
        }

        Ok(report)
    }
}

/// Ingestion pipeline extracting text from txt, json, html and pdf entries
pub struct BasicIngestionPipeline {
    components: IngestionComponents,
}

impl BasicIngestionPipeline {
    pub fn new(components: IngestionComponents) -> Self {
        Self { components }
    }
}

#[async_trait]
impl IngestionPipeline for BasicIngestionPipeline {
    fn components(&self) -> &IngestionComponents {
        &self.components
    }

    async fn process_data(
        &self,
        entry_type: IngestionType,
        entry_data: &EntryData,
    ) -> Result<Vec<Document>> {
        let (text, metadata) = match entry_type {
            IngestionType::Txt => (entry_data.as_text(entry_type)?.to_string(), Metadata::new()),
            IngestionType::Json => extract::json(entry_data.as_text(entry_type)?)?,
            IngestionType::Html => (extract::html(entry_data.as_text(entry_type)?)?, Metadata::new()),
            IngestionType::Pdf => (extract::pdf(entry_data.as_bytes())?, Metadata::new()),
        };

        Ok(vec![Document::new(Uuid::new_v4(), text, metadata)])
    }
}
