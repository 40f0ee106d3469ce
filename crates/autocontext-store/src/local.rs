//! Logging connection backed by a JSON lines file

use async_trait::async_trait;
use autocontext_core::error::{AutoContextError, Result};
use autocontext_core::models::LogEntry;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::ports::LoggingConnection;

/// Appends one JSON object per line; reads return the tail of the file
///
/// The file holds at most `2 * capacity` lines. Once a write crosses that
/// mark, the file is rewritten with only the newest `capacity` entries.
pub struct JsonlLoggingConnection {
    path: PathBuf,
    capacity: usize,
    /// Lines currently in the file; `None` until the first write counts them
    line_count: Mutex<Option<usize>>,
}

impl JsonlLoggingConnection {
    pub fn new(path: impl Into<PathBuf>, capacity: usize) -> Self {
        Self {
            path: path.into(),
            capacity: capacity.max(1),
            line_count: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_lines(&self) -> Result<Vec<String>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => Ok(content
                .lines()
                .filter(|l| !l.trim().is_empty())
                .map(str::to_string)
                .collect()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Rewrite the file with its newest `capacity` lines
    async fn compact(&self) -> Result<usize> {
        let lines = self.read_lines().await?;
        let keep = &lines[lines.len().saturating_sub(self.capacity)..];

        let mut content = keep.join("\n");
        content.push('\n');

        let tmp = self.path.with_extension("jsonl.tmp");
        tokio::fs::write(&tmp, content).await?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(|e| {
            AutoContextError::Logging(format!("Failed to replace {}: {}", self.path.display(), e))
        })?;

        tracing::debug!(
            path = %self.path.display(),
            dropped = lines.len() - keep.len(),
            "Compacted log file"
        );
        Ok(keep.len())
    }
}

#[async_trait]
impl LoggingConnection for JsonlLoggingConnection {
    async fn log(&self, entry: LogEntry) -> Result<()> {
        let mut line = serde_json::to_string(&entry)?;
        line.push('\n');

        let mut line_count = self.line_count.lock().await;
        let current = match *line_count {
            Some(count) => count,
            None => self.read_lines().await?.len(),
        };

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| {
                AutoContextError::Logging(format!(
                    "Failed to open {}: {}",
                    self.path.display(),
                    e
                ))
            })?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        drop(file);

        let mut count = current + 1;
        if count > self.capacity * 2 {
            count = self.compact().await?;
        }
        *line_count = Some(count);
        Ok(())
    }

    async fn get_logs(&self, limit: usize) -> Result<Vec<LogEntry>> {
        let lines = self.read_lines().await?;

        let mut entries = Vec::new();
        for (line_no, line) in lines.iter().enumerate() {
            match serde_json::from_str::<LogEntry>(line) {
                Ok(entry) => entries.push(entry),
                Err(e) => tracing::warn!(
                    path = %self.path.display(),
                    line = line_no + 1,
                    "Skipping unreadable log line: {}",
                    e
                ),
            }
        }

        Ok(entries.into_iter().rev().take(limit).collect())
    }
}
