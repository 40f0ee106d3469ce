use async_trait::async_trait;
use autocontext_core::error::Result;
use autocontext_core::models::{Document, EntryData, IngestionType};

use super::{IngestionComponents, IngestionPipeline};

/// Ingestion pipeline for browsing-history entries
///
/// `process_data` extracts nothing, so a run stores no chunks.
pub struct AutoContextIngestionPipeline {
    components: IngestionComponents,
}

impl AutoContextIngestionPipeline {
    pub fn new(components: IngestionComponents) -> Self {
        tracing::debug!(
            collection = components.db.collection_name(),
            "Initializing `AutoContextIngestionPipeline`"
        );
        Self { components }
    }
}

#[async_trait]
impl IngestionPipeline for AutoContextIngestionPipeline {
    fn components(&self) -> &IngestionComponents {
        &self.components
    }

    async fn process_data(
        &self,
        entry_type: IngestionType,
        entry_data: &EntryData,
    ) -> Result<Vec<Document>> {
        tracing::warn!(
            %entry_type,
            bytes = entry_data.len(),
            "AutoContext ingestion does not process entries; nothing was extracted"
        );
        Ok(Vec::new())
    }
}
