use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use uuid::Uuid;

use super::Metadata;
use crate::error::{AutoContextError, Result};

/// Kind of raw entry handed to an ingestion pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IngestionType {
    Txt,
    Json,
    Html,
    Pdf,
}

impl IngestionType {
    /// All supported entry kinds
    pub const ALL: [IngestionType; 4] =
        [IngestionType::Txt, IngestionType::Json, IngestionType::Html, IngestionType::Pdf];

    /// Detect the entry kind from a file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| AutoContextError::Ingestion {
                entry_type: "unknown".to_string(),
                reason: format!("{} has no file extension", path.display()),
            })?;
        extension.parse()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            IngestionType::Txt => "txt",
            IngestionType::Json => "json",
            IngestionType::Html => "html",
            IngestionType::Pdf => "pdf",
        }
    }
}

impl FromStr for IngestionType {
    type Err = AutoContextError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "txt" | "text" | "md" | "markdown" => Ok(IngestionType::Txt),
            "json" => Ok(IngestionType::Json),
            "html" | "htm" => Ok(IngestionType::Html),
            "pdf" => Ok(IngestionType::Pdf),
            other => Err(AutoContextError::Ingestion {
                entry_type: other.to_string(),
                reason: "Unsupported entry type. Use txt, json, html, or pdf".to_string(),
            }),
        }
    }
}

impl fmt::Display for IngestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw payload of an ingestion entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryData {
    Text(String),
    Bytes(Vec<u8>),
}

impl EntryData {
    /// View the payload as UTF-8 text
    pub fn as_text(&self, entry_type: IngestionType) -> Result<&str> {
        match self {
            EntryData::Text(text) => Ok(text),
            EntryData::Bytes(bytes) => {
                std::str::from_utf8(bytes).map_err(|e| AutoContextError::Ingestion {
                    entry_type: entry_type.to_string(),
                    reason: format!("Entry is not valid UTF-8: {}", e),
                })
            }
        }
    }

    /// View the payload as raw bytes
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            EntryData::Text(text) => text.as_bytes(),
            EntryData::Bytes(bytes) => bytes,
        }
    }

    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<String> for EntryData {
    fn from(text: String) -> Self {
        EntryData::Text(text)
    }
}

impl From<&str> for EntryData {
    fn from(text: &str) -> Self {
        EntryData::Text(text.to_string())
    }
}

impl From<Vec<u8>> for EntryData {
    fn from(bytes: Vec<u8>) -> Self {
        EntryData::Bytes(bytes)
    }
}

/// A document produced by an ingestion pipeline, prior to chunking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Document identifier, shared by all chunks of the document
    pub id: Uuid,

    /// Extracted text content
    pub text: String,

    /// Metadata copied onto every chunk
    pub metadata: Metadata,
}

impl Document {
    pub fn new(id: Uuid, text: impl Into<String>, metadata: Metadata) -> Self {
        Self { id, text: text.into(), metadata }
    }

    /// Deterministic document id for a label such as a file name
    pub fn id_from_label(label: &str) -> Uuid {
        Uuid::new_v5(&Uuid::NAMESPACE_OID, label.as_bytes())
    }
}
