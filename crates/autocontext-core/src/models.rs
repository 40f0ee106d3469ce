pub mod document;
pub mod generation;
pub mod log;
pub mod search;

pub use document::{Document, EntryData, IngestionType};
pub use generation::{GenerationConfig, LlmCompletion, Message, Role, TokenUsage};
pub use log::{LogEntry, PipelineType};
pub use search::{
    metadata_field, render_metadata_value, Metadata, SearchFilters, VectorEntry,
    VectorSearchResult,
};
