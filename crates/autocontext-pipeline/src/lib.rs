//! AutoContext Pipeline - RAG and ingestion pipelines
//!
//! This crate implements the retrieval and ingestion use cases on top of the
//! provider ports, including the AutoContext variants that shape prompt
//! context from browsing-history metadata.

pub mod chunk;
pub mod embedding;
pub mod factory;
pub mod ingestion;
pub mod rag;

pub use chunk::TextSplitter;
pub use embedding::EmbeddingPipeline;
pub use factory::{
    AnyRagPipeline, IngestionImpl, PipelineFactory, Pipelines, Providers, RagImpl, RagOutput,
};
pub use ingestion::{
    AutoContextIngestionPipeline, BasicIngestionPipeline, IngestionComponents, IngestionPipeline,
    IngestionReport,
};
pub use rag::{
    AutoContextRagOutput, AutoContextRagPipeline, BasicRagPipeline, PipelineRun, RagComponents,
    RagPipeline, RagPipelineOutput, RagRequest,
};
