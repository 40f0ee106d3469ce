//! Integration tests for layered configuration
//!
//! These tests verify that configuration loading follows the correct precedence:
//! CLI arguments > Environment variables > Config file > Defaults

use autocontext_core::config::{CliConfigOverrides, ConfigSource, LayeredConfig, PipelineConfig};
use autocontext_core::AutoContextError;
use serial_test::serial;
use std::env;
use std::fs;
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};

const ENV_VARS: &[&str] = &[
    "AUTOCONTEXT_EMBEDDING_MODEL",
    "AUTOCONTEXT_LLM_MODEL",
    "AUTOCONTEXT_CHUNK_SIZE",
    "AUTOCONTEXT_PORT",
    "DATABASE_URL",
];

fn clear_env() {
    for var in ENV_VARS {
        env::remove_var(var);
    }
}

fn config_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", content).unwrap();
    file
}

#[test]
#[serial]
fn test_default_configuration() {
    clear_env();
    let config = LayeredConfig::with_defaults().load_from_env();

    assert_eq!(config.config(), &PipelineConfig::default());
    assert_eq!(config.source("embedding.provider"), ConfigSource::Default);
    assert_eq!(config.config().app.bind_address(), "0.0.0.0:8000");
}

#[test]
#[serial]
fn test_env_overrides_file() {
    clear_env();
    let file = config_file(
        r#"{"language_model": {"model": "gpt-4o"}, "ingestion": {"chunk_size": 256}}"#,
    );

    env::set_var("AUTOCONTEXT_LLM_MODEL", "llama3");
    env::set_var("AUTOCONTEXT_CHUNK_SIZE", "1024");
    let config = LayeredConfig::with_defaults().load_from_file(file.path()).unwrap().load_from_env();
    clear_env();

    assert_eq!(config.config().language_model.model, "llama3");
    assert_eq!(config.source("language_model.model"), ConfigSource::Environment);
    assert_eq!(config.config().ingestion.chunk_size, 1024);
    assert_eq!(config.source("ingestion.chunk_size"), ConfigSource::Environment);
}

#[test]
#[serial]
fn test_cli_overrides_env() {
    clear_env();
    env::set_var("AUTOCONTEXT_EMBEDDING_MODEL", "env-model");
    let mut config = LayeredConfig::with_defaults().load_from_env();
    clear_env();

    config
        .update_from_cli(CliConfigOverrides {
            embedding_model: Some("cli-model".to_string()),
            ..Default::default()
        })
        .unwrap();

    assert_eq!(config.config().embedding.model, "cli-model");
    assert_eq!(config.source("embedding.model"), ConfigSource::Cli);
}

#[test]
#[serial]
fn test_invalid_env_value_is_ignored() {
    clear_env();
    env::set_var("AUTOCONTEXT_PORT", "not-a-port");
    let config = LayeredConfig::with_defaults().load_from_env();
    clear_env();

    assert_eq!(config.config().app.port, 8000);
    assert_eq!(config.source("app.port"), ConfigSource::Default);
}

#[test]
#[serial]
fn test_database_url_from_env() {
    clear_env();
    env::set_var("DATABASE_URL", "postgres://localhost/autocontext");
    let config = LayeredConfig::with_defaults().load_from_env();
    clear_env();

    assert_eq!(
        config.config().vector_database.database_url.as_deref(),
        Some("postgres://localhost/autocontext")
    );
    let map = config.to_inspection_map();
    assert_eq!(map["vector_database.database_url"].1, ConfigSource::Environment);
}

#[test]
#[serial]
fn test_load_config_from_directory() {
    clear_env();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    fs::write(
        &path,
        r#"{
  "embedding": {"provider": "ollama", "model": "nomic-embed-text", "dimension": 768},
  "language_model": {"provider": "ollama", "model": "llama3"},
  "logging_database": {"provider": "local", "path": "runs.jsonl"}
}"#,
    )
    .unwrap();

    let config = PipelineConfig::load_config(&path).unwrap();

    assert_eq!(config.embedding.provider, "ollama");
    assert_eq!(config.embedding.dimension, 768);
    assert_eq!(config.language_model.model, "llama3");
    assert_eq!(config.logging_database.provider, "local");
    assert_eq!(config.logging_database.path, std::path::PathBuf::from("runs.jsonl"));
    assert_eq!(config.vector_database.provider, "memory");
}

#[test]
#[serial]
fn test_load_config_rejects_bad_overlap() {
    clear_env();
    let file = config_file(r#"{"ingestion": {"chunk_size": 100, "chunk_overlap": 100}}"#);

    let err = PipelineConfig::load_config(file.path()).unwrap_err();
    assert!(matches!(err, AutoContextError::ConfigInvalid { ref key, .. } if key == "ingestion.chunk_overlap"));
}

#[test]
fn test_top_level_array_is_rejected() {
    let file = config_file("[1, 2, 3]");
    let err = LayeredConfig::with_defaults().load_from_file(file.path()).unwrap_err();
    assert!(matches!(err, AutoContextError::ConfigInvalid { .. }));
}
