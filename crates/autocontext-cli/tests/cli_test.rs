//! End-to-end tests for the `autocontext` binary

use std::io::Write;
use std::process::Command;

use serde_json::Value;
use tempfile::{NamedTempFile, TempDir};

fn autocontext() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_autocontext"));
    cmd.env_remove("AUTOCONTEXT_EMBEDDING_MODEL")
        .env_remove("AUTOCONTEXT_CHUNK_SIZE")
        .env_remove("AUTOCONTEXT_LLM_MODEL")
        .env("RUST_LOG", "error");
    cmd
}

fn config_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_config_command_reports_sources() {
    let file = config_file(r#"{"ingestion": {"chunk_size": 800, "chunk_overlap": 40}}"#);

    let output = autocontext()
        .args(["config", "--json", "--config"])
        .arg(file.path())
        .args(["--embedding-model", "text-embedding-3-small"])
        .output()
        .unwrap();

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let body: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(body["status"], "success");

    let rows = body["data"].as_array().unwrap();
    let row = |key: &str| rows.iter().find(|row| row["key"] == key).cloned().unwrap();

    assert_eq!(row("ingestion.chunk_size")["value"], "800");
    assert_eq!(row("ingestion.chunk_size")["source"], "File");
    assert_eq!(row("embedding.model")["value"], "text-embedding-3-small");
    assert_eq!(row("embedding.model")["source"], "Cli");
    assert_eq!(row("app.port")["source"], "Default");
}

#[test]
fn test_missing_explicit_config_fails() {
    let dir = TempDir::new().unwrap();

    let output = autocontext()
        .args(["config", "--config"])
        .arg(dir.path().join("absent.json"))
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("absent.json"));
}

#[test]
fn test_invalid_config_fails() {
    let file = config_file(r#"{"ingestion": {"chunk_size": 100, "chunk_overlap": 100}}"#);

    let output = autocontext().args(["config", "--config"]).arg(file.path()).output().unwrap();

    assert!(!output.status.success());
}

#[test]
fn test_ingest_rejects_unsupported_extension() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("archive.zip");
    std::fs::write(&path, b"PK").unwrap();

    let output = autocontext()
        .current_dir(dir.path())
        .arg("ingest")
        .arg(&path)
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("zip"));
}
