//! Append-only evidence trail with size-bounded rotation
//!
//! Every provider call attempt lands here as one JSON line. When a write
//! would push the file past the rotation threshold, the current file is
//! renamed to a timestamped archive and a fresh file is started first, so
//! no write is ever split across the boundary and no single call fails
//! because of log size. Writes are serialized by a mutex; the log is
//! shared by every run in the process.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::Utc;
use serde_json::json;
use thiserror::Error;

use crate::domain::SourceRecord;

/// Rotation threshold for the live log file.
pub const ROTATE_BYTES: u64 = 1024 * 1024;

/// A failed evidence write. Callers report this on the diagnostics channel
/// and carry on; evidence is best-effort, not a correctness dependency.
#[derive(Debug, Error)]
pub enum EvidenceError {
    #[error("evidence I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("evidence entry could not be serialized: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// The shared, rotating audit log of upstream call attempts.
pub struct EvidenceLog {
    path: PathBuf,
    max_bytes: u64,
    write_lock: Mutex<()>,
}

impl EvidenceLog {
    pub fn new(path: PathBuf) -> Self {
        Self::with_max_bytes(path, ROTATE_BYTES)
    }

    /// Custom rotation threshold, for tests.
    pub fn with_max_bytes(path: PathBuf, max_bytes: u64) -> Self {
        Self {
            path,
            max_bytes,
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one provider call attempt.
    pub fn record(&self, record: &SourceRecord) -> Result<(), EvidenceError> {
        let line = serde_json::to_string(record)?;
        self.append_line(&line)
    }

    /// Append a non-fatal note (e.g. malformed records dropped during
    /// ingest). Notes share the trail but are not SourceRecords.
    pub fn note(&self, tool: &str, error_class: &str, detail: &str) -> Result<(), EvidenceError> {
        let line = serde_json::to_string(&json!({
            "tool": tool,
            "timestamp": Utc::now(),
            "outcome": "note",
            "error_class": error_class,
            "detail": detail,
        }))?;
        self.append_line(&line)
    }

    fn append_line(&self, line: &str) -> Result<(), EvidenceError> {
        let guard = self
            .write_lock
            .lock()
            .map_err(|_| std::io::Error::other("evidence write lock poisoned"))?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let entry_len = line.len() as u64 + 1;
        let current_len = std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0);
        if current_len > 0 && current_len + entry_len > self.max_bytes {
            let archive = self.archive_path();
            std::fs::rename(&self.path, &archive)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())?;
        file.write_all(b"\n")?;

        drop(guard);
        Ok(())
    }

    /// Timestamped archive name, de-duplicated when two rotations land in
    /// the same second.
    fn archive_path(&self) -> PathBuf {
        let stamp = Utc::now().format("%Y%m%d%H%M%S");
        let mut name = self.path.as_os_str().to_os_string();
        name.push(format!(".{}", stamp));
        let base = PathBuf::from(name);
        if !base.exists() {
            return base;
        }
        let mut counter = 1;
        loop {
            let mut name = base.as_os_str().to_os_string();
            name.push(format!(".{}", counter));
            let candidate = PathBuf::from(name);
            if !candidate.exists() {
                return candidate;
            }
            counter += 1;
        }
    }
}
