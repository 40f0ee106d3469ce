//! AutoContext Store - Storage ports and adapters
//!
//! This crate defines the vector database and logging database ports and
//! provides in-memory, JSON-lines file, and PostgreSQL/pgvector adapters.

pub mod local;
pub mod memory;
pub mod ports;
pub mod postgres;

pub use local::JsonlLoggingConnection;
pub use memory::{MemoryLoggingConnection, MemoryVectorDb};
pub use ports::{LoggingConnection, VectorDbProvider};
pub use postgres::{PgVectorConfig, PgVectorDb};
