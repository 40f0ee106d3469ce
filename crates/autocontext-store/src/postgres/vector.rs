use async_trait::async_trait;
use autocontext_core::error::{AutoContextError, Result};
use autocontext_core::models::{Metadata, SearchFilters, VectorEntry, VectorSearchResult};
use serde_json::Value;
use sqlx::types::Json;
use sqlx::Row;
use uuid::Uuid;

use super::{to_pgvector_literal, PgVectorDb};
use crate::ports::VectorDbProvider;

#[async_trait]
impl VectorDbProvider for PgVectorDb {
    async fn initialize_collection(&self, dimension: usize) -> Result<()> {
        sqlx::query("CREATE EXTENSION IF NOT EXISTS vector")
            .execute(self.pool())
            .await
            .map_err(|e| {
                AutoContextError::VectorDb(format!("Failed to enable pgvector extension: {}", e))
            })?;

        let create_table = format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                id UUID PRIMARY KEY,
                vector vector({dimension}) NOT NULL,
                metadata JSONB NOT NULL DEFAULT '{{}}'::jsonb
            )",
            table = self.table(),
            dimension = dimension
        );
        sqlx::query(&create_table).execute(self.pool()).await.map_err(|e| {
            AutoContextError::VectorDb(format!("Failed to create collection table: {}", e))
        })?;

        let create_index = format!(
            "CREATE INDEX IF NOT EXISTS {table}_metadata_idx ON {table} USING GIN (metadata)",
            table = self.table()
        );
        sqlx::query(&create_index).execute(self.pool()).await.map_err(|e| {
            AutoContextError::VectorDb(format!("Failed to create metadata index: {}", e))
        })?;

        Ok(())
    }

    async fn upsert(&self, entries: &[VectorEntry]) -> Result<()> {
        if entries.is_empty() {
            return Ok(());
        }
        let mut tx = self.pool().begin().await.map_err(|e| {
            AutoContextError::VectorDb(format!("Failed to begin transaction: {}", e))
        })?;

        let sql = format!(
            "INSERT INTO {table} (id, vector, metadata)
             VALUES ($1, $2::vector, $3)
             ON CONFLICT (id) DO UPDATE
             SET vector = EXCLUDED.vector,
                 metadata = EXCLUDED.metadata",
            table = self.table()
        );

        for entry in entries {
            sqlx::query(&sql)
                .bind(entry.id)
                .bind(to_pgvector_literal(&entry.vector))
                .bind(Json(&entry.metadata))
                .execute(&mut *tx)
                .await
                .map_err(|e| AutoContextError::VectorDb(format!("Failed to upsert entry: {}", e)))?;
        }

        // Commit transaction
        tx.commit().await.map_err(|e| {
            AutoContextError::VectorDb(format!("Failed to commit transaction: {}", e))
        })?;

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

        // JSONB containment gives key-equality semantics for scalar filter values
        let sql = format!(
            "SELECT id, metadata, (1 - (vector <=> $1::vector))::float4 AS score
             FROM {table}
             WHERE metadata @> $2
             ORDER BY vector <=> $1::vector, id
             LIMIT $3",
            table = self.table()
        );

        let rows = sqlx::query(&sql)
            .bind(to_pgvector_literal(query_vector))
            .bind(Json(filters))
            .bind(limit as i64)
            .fetch_all(self.pool())
            .await
            .map_err(|e| {
                AutoContextError::VectorDb(format!("Failed to execute similarity search: {}", e))
            })?;

        rows.into_iter()
            .map(|row| {
                let id: Uuid = row.try_get("id").map_err(row_error)?;
                let score: f32 = row.try_get("score").map_err(row_error)?;
                let Json(metadata): Json<Metadata> = row.try_get("metadata").map_err(row_error)?;
                Ok(VectorSearchResult::new(id, score, metadata))
            })
            .collect()
    }

    async fn filtered_deletion(&self, key: &str, value: &Value) -> Result<usize> {
        let mut filter = SearchFilters::new();
        filter.insert(key.to_string(), value.clone());

        let sql = format!("DELETE FROM {table} WHERE metadata @> $1", table = self.table());
        let result = sqlx::query(&sql)
            .bind(Json(&filter))
            .execute(self.pool())
            .await
            .map_err(|e| AutoContextError::VectorDb(format!("Failed to delete entries: {}", e)))?;

        Ok(result.rows_affected() as usize)
    }

    async fn count(&self) -> Result<usize> {
        let sql = format!("SELECT COUNT(*) FROM {table}", table = self.table());
        let count: i64 = sqlx::query_scalar(&sql)
            .fetch_one(self.pool())
            .await
            .map_err(|e| AutoContextError::VectorDb(format!("Failed to count entries: {}", e)))?;
        Ok(count as usize)
    }

    fn collection_name(&self) -> &str {
        self.table()
    }
}

fn row_error(e: sqlx::Error) -> AutoContextError {
    AutoContextError::VectorDb(format!("Failed to decode search row: {}", e))
}
