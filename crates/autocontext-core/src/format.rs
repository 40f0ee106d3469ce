//! Rendering of search results into prompt context and display text

use crate::error::Result;
use crate::models::{metadata_field, VectorSearchResult};

/// Build the markdown context block handed to the language model
///
/// Each result contributes four labelled sections in fixed order:
/// URL, Visit Time, Title, Snippet.
pub fn construct_context(results: &[VectorSearchResult]) -> Result<String> {
    let mut context = String::new();

    for result in results {
        let url = metadata_field(result, "url")?;
        let visit_time = metadata_field(result, "visit_time")?;
        let title = metadata_field(result, "title")?;
        let snippet = metadata_field(result, "snippet")?;

        context.push_str(&format!(
            "## URL:\n{url}\n\n## Visit Time:\n{visit_time}\n\n## Title:\n{title}\n\n## Snippet:\n{snippet}\n\n"
        ));
    }

    Ok(context)
}

/// Format search results for display, one block per result separated by a blank line
pub fn filter_search_results(results: &[VectorSearchResult]) -> Result<String> {
    let formatted = results
        .iter()
        .map(|result| {
            let url = metadata_field(result, "url")?;
            let title = metadata_field(result, "title")?;
            let text = metadata_field(result, "text")?;
            let block = format!("URL: {url}\nTitle: {title}\nContext: {text}");
            tracing::trace!(result_id = %result.id, "{}", block);
            Ok(block)
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(formatted.join("\n\n"))
}

/// Default context: numbered `text` excerpts, used by the basic RAG pipeline
///
/// Results without a `text` field are skipped; numbering follows the kept results.
pub fn basic_context(results: &[VectorSearchResult]) -> String {
    results
        .iter()
        .filter_map(|result| metadata_field(result, "text").ok())
        .enumerate()
        .map(|(idx, text)| format!("[{}] {}", idx + 1, text))
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AutoContextError;
    use crate::models::Metadata;
    use serde_json::{json, Value};
    use uuid::Uuid;

    fn result(metadata: Value) -> VectorSearchResult {
        let Value::Object(map) = metadata else {
            panic!("metadata must be an object");
        };
        VectorSearchResult::new(Uuid::new_v4(), 0.9, map)
    }

    #[test]
    fn test_construct_context_single_result() {
        let results = vec![result(json!({
            "url": "https://rust-lang.org",
            "visit_time": "2024-03-01T10:00:00Z",
            "title": "Rust",
            "snippet": "A language empowering everyone",
        }))];

        let context = construct_context(&results).unwrap();
        assert_eq!(
            context,
            "## URL:\nhttps://rust-lang.org\n\n## Visit Time:\n2024-03-01T10:00:00Z\n\n## Title:\nRust\n\n## Snippet:\nA language empowering everyone\n\n"
        );
    }

    #[test]
    fn test_construct_context_renders_numeric_visit_time() {
        let results = vec![result(json!({
            "url": "u",
            "visit_time": 1709287200,
            "title": "t",
            "snippet": "s",
        }))];

        let context = construct_context(&results).unwrap();
        assert!(context.contains("## Visit Time:\n1709287200\n"));
    }

    #[test]
    fn test_filter_search_results_joins_with_blank_line() {
        let results = vec![
            result(json!({"url": "https://a.example", "title": "A", "text": "alpha"})),
            result(json!({"url": "https://b.example", "title": "B", "text": "beta"})),
        ];

        let filtered = filter_search_results(&results).unwrap();
        assert_eq!(
            filtered,
            "URL: https://a.example\nTitle: A\nContext: alpha\n\nURL: https://b.example\nTitle: B\nContext: beta"
        );
    }

    #[test]
    fn test_empty_results_produce_empty_strings() {
        assert_eq!(construct_context(&[]).unwrap(), "");
        assert_eq!(filter_search_results(&[]).unwrap(), "");
        assert_eq!(basic_context(&[]), "");
    }

    #[test]
    fn test_missing_field_is_reported() {
        let results = vec![result(json!({"url": "https://a.example", "title": "A"}))];
        let err = filter_search_results(&results).unwrap_err();
        assert!(matches!(err, AutoContextError::MissingMetadata { ref field, .. } if field == "text"));

        let err = construct_context(&results).unwrap_err();
        assert!(
            matches!(err, AutoContextError::MissingMetadata { ref field, .. } if field == "visit_time")
        );
    }

    #[test]
    fn test_basic_context_numbers_results() {
        let results = vec![
            result(json!({"text": "first"})),
            VectorSearchResult::new(Uuid::new_v4(), 0.1, Metadata::new()),
            result(json!({"text": "second"})),
        ];
        assert_eq!(basic_context(&results), "[1] first\n\n[2] second");
    }
}
