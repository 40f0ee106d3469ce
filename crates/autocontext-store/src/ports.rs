use async_trait::async_trait;
use autocontext_core::error::Result;
use autocontext_core::models::{LogEntry, SearchFilters, VectorEntry, VectorSearchResult};
use serde_json::Value;

/// Port for vector storage and similarity search
#[async_trait]
pub trait VectorDbProvider: Send + Sync {
    /// Prepare the collection for vectors of the given dimension
    async fn initialize_collection(&self, dimension: usize) -> Result<()>;

    /// Insert entries, replacing any existing entry with the same id
    async fn upsert(&self, entries: &[VectorEntry]) -> Result<()>;

    /// Perform similarity search
    ///
    /// Returns at most `limit` entries matching every filter, ordered by
    /// descending cosine similarity to `query_vector`.
    async fn search(
        &self,
        query_vector: &[f32],
        filters: &SearchFilters,
        limit: usize,
    ) -> Result<Vec<VectorSearchResult>>;

    /// Delete every entry whose metadata has `key` equal to `value`
    ///
    /// Returns the number of deleted entries.
    async fn filtered_deletion(&self, key: &str, value: &Value) -> Result<usize>;

    /// Number of stored entries
    async fn count(&self) -> Result<usize>;

    fn collection_name(&self) -> &str;
}

/// Port for recording pipeline execution
#[async_trait]
pub trait LoggingConnection: Send + Sync {
    async fn log(&self, entry: LogEntry) -> Result<()>;

    /// Most recent entries first
    async fn get_logs(&self, limit: usize) -> Result<Vec<LogEntry>>;
}
