mod request;
mod response;

pub use request::{DocumentRequest, IngestDocumentsRequest, LogsQuery, RagCompletionRequest, SearchRequest};
pub use response::{HealthResponse, IngestResponse};
