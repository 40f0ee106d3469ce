use crate::error::{AutoContextError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Default configuration file name, resolved against the working directory
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

/// Configuration source for tracking where values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default value
    Default,
    /// Loaded from config file
    File,
    /// Loaded from environment variable
    Environment,
    /// Provided via CLI argument
    Cli,
}

impl ConfigSource {
    /// Returns the precedence level (higher = higher priority)
    pub fn precedence(&self) -> u8 {
        match self {
            ConfigSource::Default => 0,
            ConfigSource::File => 1,
            ConfigSource::Environment => 2,
            ConfigSource::Cli => 3,
        }
    }
}

/// Embedding provider settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// `openai` or `ollama`
    pub provider: String,
    pub model: String,
    pub dimension: usize,
    pub batch_size: usize,
    pub base_url: Option<String>,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "text-embedding-3-small".to_string(),
            dimension: 1536,
            batch_size: 32,
            base_url: None,
        }
    }
}

/// Language model provider settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguageModelConfig {
    /// `openai` or `ollama`
    pub provider: String,
    /// Model used when a request carries no generation config
    pub model: String,
    pub base_url: Option<String>,
}

impl Default for LanguageModelConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: crate::models::generation::DEFAULT_GENERATION_MODEL.to_string(),
            base_url: None,
        }
    }
}

/// Vector database settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorDatabaseConfig {
    /// `memory` or `pgvector`
    pub provider: String,
    pub collection_name: String,
    pub database_url: Option<String>,
    pub max_connections: u32,
}

impl Default for VectorDatabaseConfig {
    fn default() -> Self {
        Self {
            provider: "memory".to_string(),
            collection_name: "autocontext".to_string(),
            database_url: None,
            max_connections: 5,
        }
    }
}

/// Logging database settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingDatabaseConfig {
    /// `none`, `memory`, or `local` (JSON lines file)
    pub provider: String,
    pub collection_name: String,
    /// File used by the `local` provider
    pub path: PathBuf,
}

impl Default for LoggingDatabaseConfig {
    fn default() -> Self {
        Self {
            provider: "memory".to_string(),
            collection_name: "logs".to_string(),
            path: PathBuf::from("logs.jsonl"),
        }
    }
}

/// Chunking settings for ingestion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestionConfig {
    /// Maximum chunk length in characters
    pub chunk_size: usize,
    /// Characters shared between consecutive chunks
    pub chunk_overlap: usize,
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self { chunk_size: 512, chunk_overlap: 20 }
    }
}

/// HTTP application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub host: String,
    pub port: u16,
    pub cors_origin: String,
    /// Maximum number of log entries returned by the logs endpoint
    pub max_logs: usize,
    pub max_file_size_in_mb: usize,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_origin: "http://localhost:3000".to_string(),
            max_logs: 100,
            max_file_size_in_mb: 100,
        }
    }
}

impl AppSettings {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn max_file_size_bytes(&self) -> usize {
        self.max_file_size_in_mb * 1024 * 1024
    }
}

/// Complete pipeline configuration, as read from `config.json`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub embedding: EmbeddingConfig,
    pub language_model: LanguageModelConfig,
    pub vector_database: VectorDatabaseConfig,
    pub logging_database: LoggingDatabaseConfig,
    pub ingestion: IngestionConfig,
    pub app: AppSettings,
}

impl PipelineConfig {
    /// Load from a JSON file, then apply environment overrides
    pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Self> {
        let layered = LayeredConfig::with_defaults().load_from_file(path)?.load_from_env();
        layered.validate()?;
        Ok(layered.into_config())
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> Result<()> {
        if self.ingestion.chunk_size == 0 {
            return Err(AutoContextError::ConfigInvalid {
                key: "ingestion.chunk_size".to_string(),
                reason: "chunk_size must be greater than zero".to_string(),
            });
        }

        if self.ingestion.chunk_overlap >= self.ingestion.chunk_size {
            return Err(AutoContextError::ConfigInvalid {
                key: "ingestion.chunk_overlap".to_string(),
                reason: format!(
                    "overlap ({}) must be less than chunk_size ({})",
                    self.ingestion.chunk_overlap, self.ingestion.chunk_size
                ),
            });
        }

        if self.embedding.dimension == 0 {
            return Err(AutoContextError::ConfigInvalid {
                key: "embedding.dimension".to_string(),
                reason: "dimension must be greater than zero".to_string(),
            });
        }

        if self.embedding.batch_size == 0 {
            return Err(AutoContextError::ConfigInvalid {
                key: "embedding.batch_size".to_string(),
                reason: "batch_size must be greater than zero".to_string(),
            });
        }

        Ok(())
    }
}

/// Environment variables recognised as overrides, keyed by dotted config path
const ENV_OVERRIDES: &[(&str, &str)] = &[
    ("AUTOCONTEXT_EMBEDDING_PROVIDER", "embedding.provider"),
    ("AUTOCONTEXT_EMBEDDING_MODEL", "embedding.model"),
    ("AUTOCONTEXT_EMBEDDING_DIMENSION", "embedding.dimension"),
    ("AUTOCONTEXT_EMBEDDING_BASE_URL", "embedding.base_url"),
    ("AUTOCONTEXT_LLM_PROVIDER", "language_model.provider"),
    ("AUTOCONTEXT_LLM_MODEL", "language_model.model"),
    ("AUTOCONTEXT_LLM_BASE_URL", "language_model.base_url"),
    ("AUTOCONTEXT_VECTOR_DB_PROVIDER", "vector_database.provider"),
    ("AUTOCONTEXT_COLLECTION", "vector_database.collection_name"),
    ("DATABASE_URL", "vector_database.database_url"),
    ("AUTOCONTEXT_LOGGING_PROVIDER", "logging_database.provider"),
    ("AUTOCONTEXT_LOG_PATH", "logging_database.path"),
    ("AUTOCONTEXT_CHUNK_SIZE", "ingestion.chunk_size"),
    ("AUTOCONTEXT_CHUNK_OVERLAP", "ingestion.chunk_overlap"),
    ("AUTOCONTEXT_HOST", "app.host"),
    ("AUTOCONTEXT_PORT", "app.port"),
    ("AUTOCONTEXT_CORS_ORIGIN", "app.cors_origin"),
];

/// Layered configuration with per-key source tracking
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    config: PipelineConfig,
    sources: BTreeMap<String, ConfigSource>,
}

impl LayeredConfig {
    /// Create a new configuration with default values
    pub fn with_defaults() -> Self {
        Self {
            config: PipelineConfig::default(),
            sources: BTreeMap::new(),
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn into_config(self) -> PipelineConfig {
        self.config
    }

    /// Source of a dotted key such as `embedding.model`
    pub fn source(&self, key: &str) -> ConfigSource {
        self.sources.get(key).copied().unwrap_or(ConfigSource::Default)
    }

    pub fn validate(&self) -> Result<()> {
        self.config.validate()
    }

    /// Load configuration from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(AutoContextError::ConfigNotFound { path: path.to_path_buf() });
        }

        let content = fs::read_to_string(path).map_err(|e| AutoContextError::ConfigInvalid {
            key: "file".to_string(),
            reason: format!("Failed to read config file: {}", e),
        })?;

        let file_value: Value =
            serde_json::from_str(&content).map_err(|e| AutoContextError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to parse JSON: {}", e),
            })?;

        let Value::Object(sections) = file_value else {
            return Err(AutoContextError::ConfigInvalid {
                key: "file".to_string(),
                reason: "Top-level value must be a JSON object".to_string(),
            });
        };

        for (section, fields) in sections {
            let Value::Object(fields) = fields else {
                tracing::warn!("Ignoring config section '{}': expected an object", section);
                continue;
            };
            for (field, value) in fields {
                let key = format!("{}.{}", section, field);
                if !self.is_known_key(&key) {
                    tracing::debug!("Ignoring unknown config key '{}'", key);
                    continue;
                }
                self.apply(&key, value, ConfigSource::File)?;
            }
        }

        tracing::debug!(path = %path.display(), "Loaded configuration file");
        Ok(self)
    }

    /// Load configuration from environment variables
    ///
    /// Values that do not fit the target field are logged and skipped.
    pub fn load_from_env(mut self) -> Self {
        for (var, key) in ENV_OVERRIDES {
            let Ok(raw) = env::var(var) else {
                continue;
            };
            let value = self.coerce_env_value(key, &raw);
            if let Err(e) = self.apply(key, value, ConfigSource::Environment) {
                tracing::warn!("Invalid {} value '{}': {}", var, raw, e);
            }
        }
        self
    }

    /// Update configuration from CLI arguments
    pub fn update_from_cli(&mut self, overrides: CliConfigOverrides) -> Result<()> {
        for (key, value) in overrides.into_pairs() {
            self.apply(key, value, ConfigSource::Cli)?;
        }
        Ok(())
    }

    /// Get all configuration values as a map for inspection
    pub fn to_inspection_map(&self) -> BTreeMap<String, (String, ConfigSource)> {
        let mut map = BTreeMap::new();
        let Ok(Value::Object(sections)) = serde_json::to_value(&self.config) else {
            return map;
        };

        for (section, fields) in sections {
            if let Value::Object(fields) = fields {
                for (field, value) in fields {
                    let key = format!("{}.{}", section, field);
                    let rendered = crate::models::render_metadata_value(&value);
                    let source = self.source(&key);
                    map.insert(key, (rendered, source));
                }
            }
        }

        map
    }

    fn is_known_key(&self, key: &str) -> bool {
        self.current_value(key).is_some()
    }

    fn current_value(&self, key: &str) -> Option<Value> {
        let tree = serde_json::to_value(&self.config).ok()?;
        tree.pointer(&json_pointer(key)).cloned()
    }

    /// Environment values are strings; numeric fields need a number
    fn coerce_env_value(&self, key: &str, raw: &str) -> Value {
        match self.current_value(key) {
            Some(Value::Number(_)) => raw
                .trim()
                .parse::<u64>()
                .map(Value::from)
                .unwrap_or_else(|_| Value::String(raw.to_string())),
            _ => Value::String(raw.to_string()),
        }
    }

    /// Set a dotted key if `source` outranks the source it currently comes from
    fn apply(&mut self, key: &str, value: Value, source: ConfigSource) -> Result<()> {
        if source.precedence() <= self.source(key).precedence() && self.sources.contains_key(key)
        {
            return Ok(());
        }

        let mut tree = serde_json::to_value(&self.config)?;
        let slot = tree.pointer_mut(&json_pointer(key)).ok_or_else(|| {
            AutoContextError::ConfigInvalid {
                key: key.to_string(),
                reason: "Unknown configuration key".to_string(),
            }
        })?;
        *slot = value;

        self.config =
            serde_json::from_value(tree).map_err(|e| AutoContextError::ConfigInvalid {
                key: key.to_string(),
                reason: e.to_string(),
            })?;
        self.sources.insert(key.to_string(), source);
        Ok(())
    }
}

fn json_pointer(key: &str) -> String {
    format!("/{}", key.replace('.', "/"))
}

/// CLI configuration overrides
#[derive(Debug, Default)]
pub struct CliConfigOverrides {
    pub embedding_model: Option<String>,
    pub llm_provider: Option<String>,
    pub llm_model: Option<String>,
    pub vector_db_provider: Option<String>,
    pub database_url: Option<String>,
}

impl CliConfigOverrides {
    fn into_pairs(self) -> Vec<(&'static str, Value)> {
        [
            ("embedding.model", self.embedding_model),
            ("language_model.provider", self.llm_provider),
            ("language_model.model", self.llm_model),
            ("vector_database.provider", self.vector_db_provider),
            ("vector_database.database_url", self.database_url),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| (key, Value::String(v))))
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = LayeredConfig::with_defaults();
        assert_eq!(config.config().embedding.provider, "openai");
        assert_eq!(config.config().language_model.model, "gpt-3.5-turbo");
        assert_eq!(config.config().ingestion.chunk_size, 512);
        assert_eq!(config.source("embedding.model"), ConfigSource::Default);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"{{
  "embedding": {{"provider": "ollama", "model": "nomic-embed-text", "dimension": 768}},
  "vector_database": {{"collection_name": "history"}},
  "evals": {{"provider": "none"}}
}}"#
        )
        .unwrap();

        let config = LayeredConfig::with_defaults().load_from_file(file.path()).unwrap();

        assert_eq!(config.config().embedding.provider, "ollama");
        assert_eq!(config.config().embedding.dimension, 768);
        assert_eq!(config.source("embedding.dimension"), ConfigSource::File);
        assert_eq!(config.config().vector_database.collection_name, "history");
        // Untouched keys keep their defaults
        assert_eq!(config.config().embedding.batch_size, 32);
        assert_eq!(config.source("embedding.batch_size"), ConfigSource::Default);
    }

    #[test]
    fn test_missing_file() {
        let err = LayeredConfig::with_defaults().load_from_file("/nonexistent/config.json");
        assert!(matches!(err, Err(AutoContextError::ConfigNotFound { .. })));
    }

    #[test]
    fn test_wrong_type_in_file_is_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"ingestion": {{"chunk_size": "large"}}}}"#).unwrap();

        let err = LayeredConfig::with_defaults().load_from_file(file.path()).unwrap_err();
        assert!(matches!(err, AutoContextError::ConfigInvalid { ref key, .. } if key == "ingestion.chunk_size"));
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = LayeredConfig::with_defaults();
        config
            .update_from_cli(CliConfigOverrides {
                llm_model: Some("gpt-4o-mini".to_string()),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(config.config().language_model.model, "gpt-4o-mini");
        assert_eq!(config.source("language_model.model"), ConfigSource::Cli);
        assert_eq!(config.source("language_model.provider"), ConfigSource::Default);
    }

    #[test]
    fn test_lower_precedence_does_not_override() {
        let mut config = LayeredConfig::with_defaults();
        config.apply("embedding.model", Value::from("cli-model"), ConfigSource::Cli).unwrap();
        config.apply("embedding.model", Value::from("file-model"), ConfigSource::File).unwrap();

        assert_eq!(config.config().embedding.model, "cli-model");
        assert_eq!(config.source("embedding.model"), ConfigSource::Cli);
    }

    #[test]
    fn test_validate_overlap() {
        let mut config = PipelineConfig::default();
        config.ingestion.chunk_overlap = config.ingestion.chunk_size;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_inspection_map() {
        let config = LayeredConfig::with_defaults();
        let map = config.to_inspection_map();

        let (model, source) = &map["embedding.model"];
        assert_eq!(model, "text-embedding-3-small");
        assert_eq!(*source, ConfigSource::Default);
        assert!(map.contains_key("app.port"));
        assert!(map.contains_key("logging_database.path"));
    }
}
