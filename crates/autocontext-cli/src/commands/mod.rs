//! Command implementations

mod config;
mod ingest;
mod rag;
mod search;

use std::path::PathBuf;

use anyhow::{Context, Result};
use autocontext_core::config::{LayeredConfig, DEFAULT_CONFIG_FILE};
use autocontext_core::models::SearchFilters;
use autocontext_pipeline::{IngestionImpl, PipelineFactory, Pipelines, RagImpl};
use serde_json::Value;

use crate::cli::{Cli, Commands};
use crate::output::OutputWriter;

/// Execute a CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    let output = OutputWriter::new(cli.json);
    let config = load_layered_config(&cli)?;

    match cli.command {
        Commands::Search(args) => search::execute(args, &config, &output).await,
        Commands::Rag(args) => rag::execute(args, &config, &output).await,
        Commands::Ingest(args) => ingest::execute(args, &config, &output).await,
        Commands::Config => config::execute(&config, &output),
    }
}

/// Defaults, then the config file, then the environment, then CLI flags
///
/// A config file named with `--config` must exist; the default one is optional.
fn load_layered_config(cli: &Cli) -> Result<LayeredConfig> {
    let (path, explicit) = match &cli.config {
        Some(path) => (path.clone(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
    };

    let mut layered = LayeredConfig::with_defaults();
    if explicit || path.exists() {
        layered = layered
            .load_from_file(&path)
            .with_context(|| format!("Failed to load {}", path.display()))?;
    }

    let mut layered = layered.load_from_env();
    layered.update_from_cli(cli.config_overrides())?;
    layered.validate().context("Invalid configuration")?;
    Ok(layered)
}

async fn build_pipelines(
    config: &LayeredConfig,
    rag_impl: RagImpl,
    ingestion_impl: IngestionImpl,
) -> Result<Pipelines> {
    tracing::debug!(%rag_impl, "Creating pipelines");
    PipelineFactory::create_pipeline(config.config(), rag_impl, ingestion_impl)
        .await
        .context("Failed to create pipelines")
}

fn to_filters(pairs: Vec<(String, Value)>) -> SearchFilters {
    pairs.into_iter().collect()
}
