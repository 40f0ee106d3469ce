use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::{AutoContextError, Result};

/// Metadata attached to a stored chunk, in insertion order
pub type Metadata = serde_json::Map<String, Value>;

/// Equality filters applied to result metadata
pub type SearchFilters = serde_json::Map<String, Value>;

/// A chunk embedding stored in the vector database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorEntry {
    /// Unique identifier of the stored chunk
    pub id: Uuid,

    /// Embedding vector
    pub vector: Vec<f32>,

    /// Metadata returned alongside search hits
    pub metadata: Metadata,
}

impl VectorEntry {
    pub fn new(id: Uuid, vector: Vec<f32>, metadata: Metadata) -> Self {
        Self { id, vector, metadata }
    }

    /// Check whether this entry satisfies every filter
    ///
    /// A filter matches when the key exists in the metadata with an equal value.
    /// Empty filters match every entry.
    pub fn matches(&self, filters: &SearchFilters) -> bool {
        filters.iter().all(|(key, expected)| self.metadata.get(key) == Some(expected))
    }
}

/// A ranked hit returned by a vector search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorSearchResult {
    /// Identifier of the matched chunk
    pub id: Uuid,

    /// Cosine similarity to the query vector
    pub score: f32,

    /// Metadata stored with the chunk (url, title, text, ...)
    pub metadata: Metadata,
}

impl VectorSearchResult {
    pub fn new(id: Uuid, score: f32, metadata: Metadata) -> Self {
        Self { id, score, metadata }
    }
}

/// Look up a required metadata field and render it for display
pub fn metadata_field(result: &VectorSearchResult, field: &str) -> Result<String> {
    result
        .metadata
        .get(field)
        .map(render_metadata_value)
        .ok_or_else(|| AutoContextError::MissingMetadata {
            result_id: result.id.to_string(),
            field: field.to_string(),
        })
}

/// Render a metadata value as display text
///
/// Strings are emitted without quotes, `null` as an empty string, and every
/// other value as compact JSON.
pub fn render_metadata_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(metadata: Value) -> VectorEntry {
        let Value::Object(map) = metadata else {
            panic!("metadata must be an object");
        };
        VectorEntry::new(Uuid::new_v4(), vec![1.0, 0.0], map)
    }

    #[test]
    fn test_empty_filters_match_everything() {
        let e = entry(json!({"url": "https://example.com"}));
        assert!(e.matches(&SearchFilters::new()));
    }

    #[test]
    fn test_filters_require_equal_values() {
        let e = entry(json!({"url": "https://example.com", "document_id": "abc"}));

        let mut filters = SearchFilters::new();
        filters.insert("document_id".to_string(), json!("abc"));
        assert!(e.matches(&filters));

        filters.insert("document_id".to_string(), json!("xyz"));
        assert!(!e.matches(&filters));
    }

    #[test]
    fn test_filter_on_missing_key_does_not_match() {
        let e = entry(json!({"url": "https://example.com"}));
        let mut filters = SearchFilters::new();
        filters.insert("title".to_string(), json!("Example"));
        assert!(!e.matches(&filters));
    }

    #[test]
    fn test_render_metadata_value() {
        assert_eq!(render_metadata_value(&json!("plain")), "plain");
        assert_eq!(render_metadata_value(&json!(1712345678)), "1712345678");
        assert_eq!(render_metadata_value(&Value::Null), "");
        assert_eq!(render_metadata_value(&json!(["a", 1])), r#"["a",1]"#);
    }

    #[test]
    fn test_metadata_field_missing() {
        let result = VectorSearchResult::new(Uuid::nil(), 0.5, Metadata::new());
        let err = metadata_field(&result, "url").unwrap_err();
        assert!(matches!(
            err,
            AutoContextError::MissingMetadata { ref field, .. } if field == "url"
        ));
    }
}
