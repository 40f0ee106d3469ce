use anyhow::{Context, Result};
use autocontext_core::config::LayeredConfig;
use autocontext_core::models::{Document, EntryData, IngestionType, Metadata};
use autocontext_pipeline::{IngestionImpl, IngestionPipeline, RagImpl};
use serde_json::Value;

use super::build_pipelines;
use crate::cli::IngestArgs;
use crate::output::OutputWriter;

pub async fn execute(args: IngestArgs, config: &LayeredConfig, output: &OutputWriter) -> Result<()> {
    let entry_type = IngestionType::from_path(&args.path)?;

    let mut metadata: Metadata = match &args.metadata {
        Some(raw) => serde_json::from_str(raw).context("--metadata must be a JSON object")?,
        None => Metadata::new(),
    };

    let data = tokio::fs::read(&args.path)
        .await
        .with_context(|| format!("Failed to read {}", args.path.display()))?;

    let file_name = args
        .path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| args.path.display().to_string());
    metadata
        .entry("file_name".to_string())
        .or_insert_with(|| Value::String(file_name.clone()));

    let document_id = args.document_id.unwrap_or_else(|| Document::id_from_label(&file_name));

    if config.config().vector_database.provider == "memory" {
        output.warning("The memory vector database does not outlive this command");
    }

    let pipelines = build_pipelines(config, RagImpl::AutoContext, IngestionImpl::Basic).await?;

    output.info(format!("Ingesting {} as {}", args.path.display(), entry_type));
    let report = pipelines
        .ingestion
        .run(document_id, vec![(entry_type, EntryData::Bytes(data))], metadata)
        .await?;

    if output.is_json() {
        return output.result(&report);
    }

    output.success(format!("Stored {} chunks", report.chunks));
    output.kv("Document", report.document_id);
    output.kv("Documents", report.documents);
    Ok(())
}
