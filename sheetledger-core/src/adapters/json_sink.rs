//! JSON Lines record sink

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

use crate::domain::result::{Error, Result};
use crate::domain::CanonicalRecord;
use crate::ports::RecordSink;

/// Appends each record as one JSON object per line
pub struct JsonLinesSink {
    path: PathBuf,
}

impl JsonLinesSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl RecordSink for JsonLinesSink {
    async fn insert_batch(&self, batch: &[CanonicalRecord]) -> Result<usize> {
        let mut buffer = Vec::new();
        for record in batch {
            serde_json::to_writer(&mut buffer, record)?;
            buffer.push(b'\n');
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| Error::sink(format!("Failed to open {}: {}", self.path.display(), e)))?;
        file.write_all(&buffer).await?;
        file.flush().await?;

        Ok(batch.len())
    }
}
