use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Which pipeline produced a log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineType {
    Rag,
    Ingestion,
}

/// One logged pipeline step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub pipeline_run_id: Uuid,
    pub pipeline_type: PipelineType,
    /// Pipeline method or event name (e.g. "search", "query")
    pub method: String,
    pub result: Value,
}

impl LogEntry {
    pub fn new(
        pipeline_run_id: Uuid,
        pipeline_type: PipelineType,
        method: impl Into<String>,
        result: Value,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            pipeline_run_id,
            pipeline_type,
            method: method.into(),
            result,
        }
    }
}
