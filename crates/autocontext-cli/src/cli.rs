use autocontext_core::config::CliConfigOverrides;
use autocontext_pipeline::RagImpl;
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::Value;
use std::path::PathBuf;
use uuid::Uuid;

/// AutoContext - Retrieval over your browsing history
#[derive(Parser, Debug)]
#[command(name = "autocontext")]
#[command(about = "Search and question your browsing history", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Output results in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Path to the JSON configuration file [default: config.json]
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Embedding model (overrides configuration)
    #[arg(long, global = true)]
    pub embedding_model: Option<String>,

    /// Language model provider: openai or ollama (overrides configuration)
    #[arg(long, global = true)]
    pub llm_provider: Option<String>,

    /// Vector database provider: memory or pgvector (overrides configuration)
    #[arg(long, global = true)]
    pub vector_db: Option<String>,

    /// PostgreSQL connection URL for pgvector (overrides configuration)
    #[arg(long, global = true)]
    pub database_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Configuration overrides given on the command line
    pub fn config_overrides(&self) -> CliConfigOverrides {
        let llm_model = match &self.command {
            Commands::Rag(args) => args.model.clone(),
            _ => None,
        };

        CliConfigOverrides {
            embedding_model: self.embedding_model.clone(),
            llm_provider: self.llm_provider.clone(),
            llm_model,
            vector_db_provider: self.vector_db.clone(),
            database_url: self.database_url.clone(),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search indexed pages
    Search(SearchArgs),

    /// Search, then answer the question with the language model
    Rag(RagArgs),

    /// Ingest a txt, json, html or pdf file
    Ingest(IngestArgs),

    /// Show the effective configuration and where each value comes from
    Config,
}

/// RAG pipeline selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PipelineKind {
    /// Search, context and completion
    Basic,
    /// Browsing-history search with formatted results
    Autocontext,
}

impl From<PipelineKind> for RagImpl {
    fn from(kind: PipelineKind) -> Self {
        match kind {
            PipelineKind::Basic => RagImpl::Basic,
            PipelineKind::Autocontext => RagImpl::AutoContext,
        }
    }
}

#[derive(Parser, Debug)]
pub struct SearchArgs {
    /// Search query
    pub query: String,

    /// Maximum number of results
    #[arg(long, default_value = "5")]
    pub limit: usize,

    /// Metadata filter as key=value (repeatable)
    #[arg(long = "filter", value_parser = parse_filter)]
    pub filters: Vec<(String, Value)>,

    /// RAG pipeline to run
    #[arg(long, value_enum, default_value = "autocontext")]
    pub pipeline: PipelineKind,
}

#[derive(Parser, Debug)]
pub struct RagArgs {
    /// Question to answer
    pub query: String,

    /// Generation model (defaults to the configured language model)
    #[arg(long)]
    pub model: Option<String>,

    /// Maximum number of results used as context
    #[arg(long, default_value = "5")]
    pub limit: usize,

    /// Metadata filter as key=value (repeatable)
    #[arg(long = "filter", value_parser = parse_filter)]
    pub filters: Vec<(String, Value)>,

    /// RAG pipeline to run
    #[arg(long, value_enum, default_value = "basic")]
    pub pipeline: PipelineKind,
}

#[derive(Parser, Debug)]
pub struct IngestArgs {
    /// File to ingest; the type is taken from its extension
    pub path: PathBuf,

    /// Document id (defaults to an id derived from the file name)
    #[arg(long)]
    pub document_id: Option<Uuid>,

    /// Document metadata as a JSON object
    #[arg(long)]
    pub metadata: Option<String>,
}

/// Parse `key=value`; the value is read as JSON when it parses, else as a string
pub fn parse_filter(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", raw))?;

    let key = key.trim();
    if key.is_empty() {
        return Err(format!("filter key is empty in '{}'", raw));
    }

    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_filter() {
        assert_eq!(parse_filter("title=Rust Book").unwrap(), ("title".to_string(), json!("Rust Book")));
        assert_eq!(parse_filter("chunk_index=3").unwrap(), ("chunk_index".to_string(), json!(3)));
        assert_eq!(parse_filter("url=a=b").unwrap(), ("url".to_string(), json!("a=b")));
        assert!(parse_filter("no-separator").is_err());
        assert!(parse_filter("=value").is_err());
    }

    #[test]
    fn test_search_args() {
        let cli = Cli::try_parse_from([
            "autocontext",
            "search",
            "borrow checker",
            "--limit",
            "3",
            "--filter",
            "title=Rust",
            "--json",
        ])
        .unwrap();

        assert!(cli.json);
        assert!(cli.config.is_none());
        let Commands::Search(args) = cli.command else {
            panic!("expected search command");
        };
        assert_eq!(args.query, "borrow checker");
        assert_eq!(args.limit, 3);
        assert_eq!(args.filters, vec![("title".to_string(), json!("Rust"))]);
        assert_eq!(args.pipeline, PipelineKind::Autocontext);
    }

    #[test]
    fn test_rag_model_becomes_override() {
        let cli = Cli::try_parse_from(["autocontext", "rag", "what is a lifetime", "--model", "llama3"])
            .unwrap();

        let overrides = cli.config_overrides();
        assert_eq!(overrides.llm_model.as_deref(), Some("llama3"));
        assert!(overrides.embedding_model.is_none());
    }

    #[test]
    fn test_global_config_after_subcommand() {
        let cli = Cli::try_parse_from(["autocontext", "config", "--config", "custom.json"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("custom.json")));
        assert!(matches!(cli.command, Commands::Config));
    }

    #[test]
    fn test_ingest_rejects_bad_document_id() {
        let result =
            Cli::try_parse_from(["autocontext", "ingest", "page.html", "--document-id", "nope"]);
        assert!(result.is_err());
    }
}
