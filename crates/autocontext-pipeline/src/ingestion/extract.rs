//! Text extraction for the supported entry kinds

use autocontext_core::error::{AutoContextError, Result};
use autocontext_core::models::Metadata;
use serde_json::Value;

/// Wrap width used when rendering HTML as plain text
const HTML_WIDTH: usize = 80;

/// Flatten a JSON entry into `key: value` lines
///
/// Nested object keys are joined with dots. Top-level string fields are also
/// returned as metadata.
pub(super) fn json(text: &str) -> Result<(String, Metadata)> {
    let value: Value = serde_json::from_str(text).map_err(|e| AutoContextError::Ingestion {
        entry_type: "json".to_string(),
        reason: format!("Invalid JSON: {}", e),
    })?;

    let mut lines = Vec::new();
    flatten(&value, "", &mut lines);

    let metadata = match &value {
        Value::Object(map) => map
            .iter()
            .filter(|(_, v)| v.is_string())
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
        _ => Metadata::new(),
    };

    Ok((lines.join("\n"), metadata))
}

fn flatten(value: &Value, prefix: &str, lines: &mut Vec<String>) {
    match value {
        Value::String(s) if prefix.is_empty() => lines.push(s.clone()),
        Value::String(s) => lines.push(format!("{}: {}", prefix, s)),
        Value::Object(map) => {
            for (key, child) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", prefix, key)
                };
                flatten(child, &path, lines);
            }
        }
        Value::Array(items) => {
            for item in items {
                flatten(item, prefix, lines);
            }
        }
        // Numbers, booleans and null carry no searchable text
        _ => {}
    }
}

pub(super) fn html(text: &str) -> Result<String> {
    html2text::from_read(text.as_bytes(), HTML_WIDTH).map_err(|e| AutoContextError::Ingestion {
        entry_type: "html".to_string(),
        reason: e.to_string(),
    })
}

pub(super) fn pdf(bytes: &[u8]) -> Result<String> {
    pdf_extract::extract_text_from_mem(bytes).map_err(|e| AutoContextError::Ingestion {
        entry_type: "pdf".to_string(),
        reason: format!("Failed to extract PDF text: {}", e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_flattens_nested_strings() {
        let (text, metadata) = json(
            r#"{"title": "Ownership", "page": {"heading": "Moves", "tags": ["rust", "memory"]}, "visits": 3}"#,
        )
        .unwrap();

        assert_eq!(text, "title: Ownership\npage.heading: Moves\npage.tags: rust\npage.tags: memory");
        assert_eq!(metadata.len(), 1);
        assert_eq!(metadata["title"], json!("Ownership"));
    }

    #[test]
    fn test_json_top_level_string() {
        let (text, metadata) = json(r#""just text""#).unwrap();
        assert_eq!(text, "just text");
        assert!(metadata.is_empty());
    }

    #[test]
    fn test_invalid_json_is_ingestion_error() {
        let err = json("{not json").unwrap_err();
        assert!(matches!(err, AutoContextError::Ingestion { ref entry_type, .. } if entry_type == "json"));
    }

    #[test]
    fn test_invalid_pdf_is_ingestion_error() {
        let err = pdf(b"definitely not a pdf").unwrap_err();
        assert!(matches!(err, AutoContextError::Ingestion { ref entry_type, .. } if entry_type == "pdf"));
    }
}
