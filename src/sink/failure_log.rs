use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One exhausted delivery, written as a single JSON line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureEntry {
    pub destination: String,
    pub body: Value,
    pub error: String,
    pub failed_at: DateTime<Utc>,
}

/// Append-only on-disk log of records whose delivery retries were
/// exhausted. The backing path is injectable so tests run against a
/// temporary directory.
#[derive(Debug, Clone)]
pub struct FailureLog {
    path: PathBuf,
}

impl FailureLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one entry, creating the file on first use.
    pub fn append(&self, entry: &FailureEntry) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let line = serde_json::to_string(entry)?;
        writeln!(file, "{line}")?;
        Ok(())
    }
}
