//! In-memory storage implementations for development and testing.
//!
//! These implementations use `RwLock::unwrap()` intentionally. Lock poisoning
//! only occurs when another thread panicked while holding the lock, which is
//! an unrecoverable state. For persistent workloads, use the pgvector backend.

use async_trait::async_trait;
use autocontext_core::error::{AutoContextError, Result};
use autocontext_core::models::{LogEntry, SearchFilters, VectorEntry, VectorSearchResult};
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, RwLock};
use uuid::Uuid;

use crate::ports::{LoggingConnection, VectorDbProvider};

/// In-memory implementation of VectorDbProvider
#[derive(Debug, Clone)]
pub struct MemoryVectorDb {
    collection_name: String,
    dimension: Arc<RwLock<Option<usize>>>,
    entries: Arc<RwLock<HashMap<Uuid, VectorEntry>>>,
}

impl MemoryVectorDb {
    /// Create a new in-memory vector database
    pub fn new(collection_name: impl Into<String>) -> Self {
        Self {
            collection_name: collection_name.into(),
            dimension: Arc::default(),
            entries: Arc::default(),
        }
    }

    /// Calculate cosine similarity between two vectors
    fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
        if a.len() != b.len() {
            return 0.0;
        }

        let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

        if norm_a == 0.0 || norm_b == 0.0 {
            return 0.0;
        }

        dot_product / (norm_a * norm_b)
    }

    fn check_dimension(&self, actual: usize) -> Result<()> {
        match *self.dimension.read().unwrap() {
            Some(expected) if expected != actual => Err(AutoContextError::VectorDb(format!(
                "Vector dimension {} does not match collection '{}' dimension {}",
                actual, self.collection_name, expected
            ))),
            _ => Ok(()),
        }
    }
}

impl Default for MemoryVectorDb {
    fn default() -> Self {
        Self::new("autocontext")
    }
}

#[async_trait]
impl VectorDbProvider for MemoryVectorDb {
    async fn initialize_collection(&self, dimension: usize) -> Result<()> {
        let mut current = self.dimension.write().unwrap();
        match *current {
            Some(existing) if existing != dimension => Err(AutoContextError::VectorDb(format!(
                "Collection '{}' already initialized with dimension {}",
                self.collection_name, existing
            ))),
            _ => {
                *current = Some(dimension);
                Ok(())
            }
        }
    }

    async fn upsert(&self, entries: &[VectorEntry]) -> Result<()> {
        for entry in entries {
            self.check_dimension(entry.vector.len())?;
        }

        let mut store = self.entries.write().unwrap();
        for entry in entries {
            store.insert(entry.id, entry.clone());
        }
        Ok(())
    }

    async fn search(
        &self,
        query_vector: &[f32],
        filters: &SearchFilters,
        limit: usize,
    ) -> Result<Vec<VectorSearchResult>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        self.check_dimension(query_vector.len())?;

        let entries = self.entries.read().unwrap();

        let mut results: Vec<VectorSearchResult> = entries
            .values()
            .filter(|entry| entry.matches(filters))
            .map(|entry| {
                VectorSearchResult::new(
                    entry.id,
                    Self::cosine_similarity(query_vector, &entry.vector),
                    entry.metadata.clone(),
                )
            })
            .collect();

        // Sort by score descending, ties broken by id for stable output
        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });

        results.truncate(limit);

        Ok(results)
    }

    async fn filtered_deletion(&self, key: &str, value: &Value) -> Result<usize> {
        let mut entries = self.entries.write().unwrap();
        let before = entries.len();
        entries.retain(|_, entry| entry.metadata.get(key) != Some(value));
        Ok(before - entries.len())
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.entries.read().unwrap().len())
    }

    fn collection_name(&self) -> &str {
        &self.collection_name
    }
}

/// In-memory implementation of LoggingConnection
///
/// Keeps at most `capacity` entries, dropping the oldest first.
#[derive(Debug, Clone)]
pub struct MemoryLoggingConnection {
    capacity: usize,
    entries: Arc<RwLock<VecDeque<LogEntry>>>,
}

impl MemoryLoggingConnection {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Arc::default(),
        }
    }
}

#[async_trait]
impl LoggingConnection for MemoryLoggingConnection {
    async fn log(&self, entry: LogEntry) -> Result<()> {
        let mut entries = self.entries.write().unwrap();
        entries.push_back(entry);
        while entries.len() > self.capacity {
            entries.pop_front();
        }
        Ok(())
    }

    async fn get_logs(&self, limit: usize) -> Result<Vec<LogEntry>> {
        let entries = self.entries.read().unwrap();
        Ok(entries.iter().rev().take(limit).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use autocontext_core::models::{Metadata, PipelineType};
    use serde_json::json;

    fn entry(vector: Vec<f32>, metadata: Value) -> VectorEntry {
        let Value::Object(map) = metadata else {
            panic!("metadata must be an object");
        };
        VectorEntry::new(Uuid::new_v4(), vector, map)
    }

    #[tokio::test]
    async fn test_search_orders_by_similarity() {
        let db = MemoryVectorDb::new("test");
        db.initialize_collection(2).await.unwrap();
        db.upsert(&[
            entry(vec![0.0, 1.0], json!({"title": "orthogonal"})),
            entry(vec![1.0, 0.0], json!({"title": "same"})),
            entry(vec![1.0, 1.0], json!({"title": "diagonal"})),
        ])
        .await
        .unwrap();

        let results = db.search(&[1.0, 0.0], &SearchFilters::new(), 2).await.unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].metadata["title"], "same");
        assert_eq!(results[1].metadata["title"], "diagonal");
        assert!(results[0].score >= results[1].score);
    }

    #[tokio::test]
    async fn test_search_applies_filters() {
        let db = MemoryVectorDb::default();
        db.upsert(&[
            entry(vec![1.0, 0.0], json!({"document_id": "a"})),
            entry(vec![1.0, 0.0], json!({"document_id": "b"})),
        ])
        .await
        .unwrap();

        let mut filters = SearchFilters::new();
        filters.insert("document_id".to_string(), json!("b"));
        let results = db.search(&[1.0, 0.0], &filters, 10).await.unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].metadata["document_id"], "b");
    }

    #[tokio::test]
    async fn test_zero_limit_returns_nothing() {
        let db = MemoryVectorDb::default();
        db.upsert(&[entry(vec![1.0], json!({}))]).await.unwrap();
        assert!(db.search(&[1.0], &SearchFilters::new(), 0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_dimension_mismatch_is_rejected() {
        let db = MemoryVectorDb::default();
        db.initialize_collection(3).await.unwrap();

        assert!(db.upsert(&[entry(vec![1.0, 0.0], json!({}))]).await.is_err());
        assert!(db.search(&[1.0, 0.0], &SearchFilters::new(), 1).await.is_err());
        assert!(db.initialize_collection(4).await.is_err());
        assert!(db.initialize_collection(3).await.is_ok());
    }

    #[tokio::test]
    async fn test_upsert_replaces_existing_entry() {
        let db = MemoryVectorDb::default();
        let id = Uuid::new_v4();
        db.upsert(&[VectorEntry::new(id, vec![1.0], Metadata::new())]).await.unwrap();

        let mut metadata = Metadata::new();
        metadata.insert("title".to_string(), json!("updated"));
        db.upsert(&[VectorEntry::new(id, vec![1.0], metadata)]).await.unwrap();

        assert_eq!(db.count().await.unwrap(), 1);
        let results = db.search(&[1.0], &SearchFilters::new(), 1).await.unwrap();
        assert_eq!(results[0].metadata["title"], "updated");
    }

    #[tokio::test]
    async fn test_filtered_deletion() {
        let db = MemoryVectorDb::default();
        db.upsert(&[
            entry(vec![1.0], json!({"document_id": "a"})),
            entry(vec![1.0], json!({"document_id": "a"})),
            entry(vec![1.0], json!({"document_id": "b"})),
        ])
        .await
        .unwrap();

        let deleted = db.filtered_deletion("document_id", &json!("a")).await.unwrap();
        assert_eq!(deleted, 2);
        assert_eq!(db.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_logging_capacity_and_order() {
        let logs = MemoryLoggingConnection::new(2);
        let run_id = Uuid::new_v4();
        for method in ["query", "search", "construct_context"] {
            logs.log(LogEntry::new(run_id, PipelineType::Rag, method, json!(null)))
                .await
                .unwrap();
        }

        let recent = logs.get_logs(10).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].method, "construct_context");
        assert_eq!(recent[1].method, "search");

        assert_eq!(logs.get_logs(1).await.unwrap().len(), 1);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn search_is_bounded_and_sorted(
                vectors in prop::collection::vec(prop::collection::vec(-1.0f32..1.0, 3), 0..20),
                query in prop::collection::vec(-1.0f32..1.0, 3),
                limit in 0usize..25,
            ) {
                let runtime = tokio::runtime::Runtime::new().unwrap();
                let results = runtime.block_on(async {
                    let db = MemoryVectorDb::default();
                    let entries: Vec<VectorEntry> =
                        vectors.iter().map(|v| entry(v.clone(), json!({}))).collect();
                    db.upsert(&entries).await.unwrap();
                    db.search(&query, &SearchFilters::new(), limit).await.unwrap()
                });

                prop_assert_eq!(results.len(), limit.min(vectors.len()));
                for pair in results.windows(2) {
                    prop_assert!(pair[0].score >= pair[1].score);
                }
            }
        }
    }
}
