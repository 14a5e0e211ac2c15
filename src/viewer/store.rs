//! File operations over the configured log directory.
//!
//! # Responsibilities
//! - List, read, clear, delete and export log files
//! - Reject file names that could escape the directory
//! - Enforce the dev-mode and per-operation switches
//!
//! Every operation assumes the caller has already passed the access gate.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use std::path::PathBuf;
use tokio::fs;

use crate::config::LogDirConfig;
use crate::observability::metrics;

/// One JSON log line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogEntry {
    pub level: String,
    pub time: String,
    pub msg: String,
}

/// Operations that can be switched off in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Clear,
    Delete,
    Export,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Clear => "clear",
            Operation::Delete => "delete",
            Operation::Export => "export",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{0} operation is disabled")]
    Disabled(Operation),

    #[error("Missing 'name' parameter")]
    MissingName,

    #[error("Invalid filename")]
    InvalidName,

    #[error("File not found")]
    NotFound,

    #[error("Failed to access log file: {0}")]
    Io(#[source] io::Error),
}

impl StoreError {
    /// Business code carried in the JSON envelope.
    pub fn code(&self) -> u16 {
        match self {
            StoreError::Disabled(_) => 3001,
            StoreError::MissingName => 3002,
            StoreError::InvalidName => 3003,
            StoreError::NotFound => 3004,
            StoreError::Io(_) => 3005,
        }
    }
}

impl From<io::Error> for StoreError {
    fn from(e: io::Error) -> Self {
        if e.kind() == io::ErrorKind::NotFound {
            StoreError::NotFound
        } else {
            StoreError::Io(e)
        }
    }
}

/// Check a user-supplied file name. Anything that could name a path outside
/// the log directory is refused.
pub fn validate_name(name: &str) -> Result<&str, StoreError> {
    if name.is_empty() {
        return Err(StoreError::MissingName);
    }
    if name.contains("..") || name.contains('/') || name.contains('\\') {
        return Err(StoreError::InvalidName);
    }
    Ok(name)
}

/// Log directory access with the configured feature switches.
#[derive(Debug, Clone)]
pub struct LogStore {
    root: PathBuf,
    dev_mode: bool,
    enable_delete: bool,
    enable_export: bool,
    enable_clear: bool,
}

impl LogStore {
    pub fn new(config: &LogDirConfig) -> Self {
        Self {
            root: PathBuf::from(&config.log_dir),
            dev_mode: config.dev_mode,
            enable_delete: config.enable_delete,
            enable_export: config.enable_export,
            enable_clear: config.enable_clear,
        }
    }

    pub fn is_enabled(&self, op: Operation) -> bool {
        match op {
            Operation::Clear => self.dev_mode && self.enable_clear,
            Operation::Delete => self.dev_mode && self.enable_delete,
            Operation::Export => self.enable_export,
        }
    }

    fn ensure_enabled(&self, op: Operation) -> Result<(), StoreError> {
        if self.is_enabled(op) {
            Ok(())
        } else {
            tracing::debug!(op = %op, "Rejected disabled operation");
            Err(StoreError::Disabled(op))
        }
    }

    fn path_for(&self, name: &str) -> Result<PathBuf, StoreError> {
        Ok(self.root.join(validate_name(name)?))
    }

    /// Names of the regular files in the log directory, sorted.
    pub async fn list_files(&self) -> Result<Vec<String>, StoreError> {
        let mut dir = fs::read_dir(&self.root).await?;
        let mut files = Vec::new();
        while let Some(entry) = dir.next_entry().await? {
            if entry.file_type().await?.is_dir() {
                continue;
            }
            files.push(entry.file_name().to_string_lossy().into_owned());
        }
        files.sort();
        Ok(files)
    }

    /// Parse a file as JSON lines. Lines that are not valid entries are
    /// skipped.
    pub async fn read_entries(&self, name: &str) -> Result<Vec<LogEntry>, StoreError> {
        let path = self.path_for(name)?;
        let content = fs::read(&path).await?;

        let entries = content
            .split(|b| *b == b'\n')
            .filter_map(|line| serde_json::from_slice::<LogEntry>(line).ok())
            .collect();
        Ok(entries)
    }

    /// Truncate a file to zero bytes.
    pub async fn clear_file(&self, name: &str) -> Result<(), StoreError> {
        self.ensure_enabled(Operation::Clear)?;
        let path = self.path_for(name)?;
        fs::OpenOptions::new()
            .write(true)
            .truncate(true)
            .open(&path)
            .await?;

        tracing::info!(file = %name, "Log file cleared");
        metrics::record_file_operation("clear", "ok");
        Ok(())
    }

    /// Remove every regular file in the log directory. Returns the number
    /// removed.
    pub async fn delete_all(&self) -> Result<usize, StoreError> {
        self.ensure_enabled(Operation::Delete)?;

        let mut dir = fs::read_dir(&self.root).await?;
        let mut removed = 0;
        while let Some(entry) = dir.next_entry().await? {
            if entry.file_type().await?.is_dir() {
                continue;
            }
            fs::remove_file(entry.path()).await?;
            removed += 1;
        }

        tracing::info!(removed, dir = %self.root.display(), "Log files deleted");
        metrics::record_file_operation("delete", "ok");
        Ok(removed)
    }

    /// Raw file contents for download.
    pub async fn export_file(&self, name: &str) -> Result<String, StoreError> {
        self.ensure_enabled(Operation::Export)?;
        let path = self.path_for(name)?;
        let bytes = fs::read(&path).await?;

        metrics::record_file_operation("export", "ok");
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}
