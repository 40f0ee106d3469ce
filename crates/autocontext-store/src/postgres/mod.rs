//! PostgreSQL/pgvector storage adapter implementation

pub mod vector;

use autocontext_core::error::{AutoContextError, Result};
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;

/// pgvector connection and collection settings
#[derive(Debug, Clone)]
pub struct PgVectorConfig {
    /// Database connection URL
    pub database_url: String,
    /// Table holding the collection
    pub collection_name: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl PgVectorConfig {
    pub fn new(database_url: impl Into<String>, collection_name: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            collection_name: collection_name.into(),
            max_connections: 5,
            acquire_timeout: Duration::from_secs(30),
        }
    }

    pub fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.database_url.trim().is_empty() {
            return Err(AutoContextError::ConfigInvalid {
                key: "vector_database.database_url".to_string(),
                reason: "cannot be empty".to_string(),
            });
        }

        // The collection name is interpolated into SQL as a table name
        let valid_identifier = !self.collection_name.is_empty()
            && self.collection_name.len() <= 63
            && self
                .collection_name
                .chars()
                .next()
                .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
            && self.collection_name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !valid_identifier {
            return Err(AutoContextError::ConfigInvalid {
                key: "vector_database.collection_name".to_string(),
                reason: format!(
                    "'{}' is not a valid table name (letters, digits, underscore)",
                    self.collection_name
                ),
            });
        }

        if self.max_connections == 0 {
            return Err(AutoContextError::ConfigInvalid {
                key: "vector_database.max_connections".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(())
    }
}

/// Vector database stored in a PostgreSQL table with the pgvector extension
pub struct PgVectorDb {
    pool: PgPool,
    config: PgVectorConfig,
}

impl PgVectorDb {
    /// Connect to PostgreSQL with the given configuration
    pub async fn connect(config: PgVectorConfig) -> Result<Self> {
        config.validate()?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect(&config.database_url)
            .await
            .map_err(|e| AutoContextError::VectorDb(format!("Failed to connect to database: {}", e)))?;

        // Test connection by executing a simple query
        sqlx::query("SELECT 1")
            .fetch_one(&pool)
            .await
            .map_err(|e| AutoContextError::VectorDb(format!("Connection test failed: {}", e)))?;

        tracing::info!(collection = %config.collection_name, "Connected to PostgreSQL vector database");
        Ok(Self { pool, config })
    }

    pub(crate) fn table(&self) -> &str {
        &self.config.collection_name
    }

    pub(crate) fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Render a vector in pgvector's text input format
pub(crate) fn to_pgvector_literal(vector: &[f32]) -> String {
    format!("[{}]", vector.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(","))
}
