//! Error types for AutoContext

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AutoContextError {
    // Configuration errors
    #[error("Configuration file not found at {path}")]
    ConfigNotFound { path: PathBuf },

    #[error("Missing required configuration: {key}")]
    ConfigMissing { key: String },

    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },

    // Search result errors
    #[error("Search result {result_id} is missing metadata field '{field}'")]
    MissingMetadata { result_id: String, field: String },

    // Provider errors
    #[error("Embedding provider unavailable: {reason}. Try: {remediation}")]
    EmbeddingUnavailable {
        reason: String,
        remediation: String,
    },

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Language model unavailable: {reason}. Try: {remediation}")]
    LlmUnavailable {
        reason: String,
        remediation: String,
    },

    #[error("Vector database error: {0}")]
    VectorDb(String),

    #[error("Logging database error: {0}")]
    Logging(String),

    // Ingestion errors
    #[error("Failed to ingest {entry_type} entry: {reason}")]
    Ingestion { entry_type: String, reason: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl AutoContextError {
    /// Whether the error was caused by an upstream provider (embedding, LLM, database)
    pub fn is_provider_failure(&self) -> bool {
        matches!(
            self,
            AutoContextError::EmbeddingUnavailable { .. }
                | AutoContextError::Embedding(_)
                | AutoContextError::LlmUnavailable { .. }
                | AutoContextError::VectorDb(_)
                | AutoContextError::Logging(_)
        )
    }
}

impl From<serde_json::Error> for AutoContextError {
    fn from(err: serde_json::Error) -> Self {
        AutoContextError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AutoContextError>;
