//! AutoContext API - HTTP application serving the pipelines
//!
//! Routes cover document ingestion, search, RAG completion and access to the
//! pipeline logs.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use error::ApiError;
pub use router::create_router;
pub use state::AppState;
