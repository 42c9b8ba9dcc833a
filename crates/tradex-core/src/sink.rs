//! Record sinks: where a normalized batch is persisted.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::SinkError;
use crate::models::CanonicalRecord;

/// Batch persistence. A batch is stored whole or not at all.
#[async_trait]
pub trait RecordSink: Send + Sync {
    /// Insert every record, returning the records as stored.
    async fn insert_batch(
        &self,
        records: Vec<CanonicalRecord>,
    ) -> Result<Vec<CanonicalRecord>, SinkError>;
}

/// Keeps inserted records in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<CanonicalRecord>>,
    batches: Mutex<usize>,
    reject_with: Option<String>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink that refuses every batch with the given reason.
    pub fn rejecting(reason: impl Into<String>) -> Self {
        Self {
            reject_with: Some(reason.into()),
            ..Self::default()
        }
    }

    /// Snapshot of every stored record.
    pub fn records(&self) -> Vec<CanonicalRecord> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }

    /// Number of `insert_batch` calls that succeeded.
    pub fn batch_count(&self) -> usize {
        self.batches.lock().map(|count| *count).unwrap_or_default()
    }
}

#[async_trait]
impl RecordSink for MemorySink {
    async fn insert_batch(
        &self,
        records: Vec<CanonicalRecord>,
    ) -> Result<Vec<CanonicalRecord>, SinkError> {
        if let Some(reason) = &self.reject_with {
            return Err(SinkError::Rejected(reason.clone()));
        }

        let mut stored = self
            .records
            .lock()
            .map_err(|_| SinkError::Rejected("sink lock poisoned".to_string()))?;
        stored.extend(records.iter().cloned());

        if let Ok(mut batches) = self.batches.lock() {
            *batches += 1;
        }
        Ok(records)
    }
}

/// Appends batches to a JSON array file.
///
/// The whole file is rewritten through a temporary file in the same
/// directory and renamed into place, so a failed insert leaves it unchanged.
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Records currently stored in the file.
    pub fn load(&self) -> Result<Vec<CanonicalRecord>, SinkError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = std::fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    fn write_all(&self, records: &[CanonicalRecord]) -> Result<(), SinkError> {
        let json = serde_json::to_string_pretty(records)?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir)?;

        let mut temp = NamedTempFile::new_in(&dir)?;
        temp.write_all(json.as_bytes())?;
        temp.flush()?;
        temp.persist(&self.path).map_err(|e| SinkError::Io(e.error))?;
        Ok(())
    }
}

#[async_trait]
impl RecordSink for JsonFileSink {
    async fn insert_batch(
        &self,
        records: Vec<CanonicalRecord>,
    ) -> Result<Vec<CanonicalRecord>, SinkError> {
        let mut stored = self.load()?;
        stored.extend(records.iter().cloned());

        self.write_all(&stored)?;
        debug!(
            "Appended {} records to {} ({} total)",
            records.len(),
            self.path.display(),
            stored.len()
        );
        Ok(records)
    }
}
