mod health;
mod ingest;
mod logs;
mod rag;
mod search;

pub use health::health_check;
pub use ingest::{ingest_documents, upload_and_process_file};
pub use logs::get_logs;
pub use rag::rag_completion;
pub use search::search;
