//! In-memory record sink for tests

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::result::{Error, Result};
use crate::domain::CanonicalRecord;
use crate::ports::RecordSink;

/// Collects records in memory; chosen batches can be made to fail
#[derive(Default)]
pub struct MemorySink {
    records: Mutex<Vec<CanonicalRecord>>,
    calls: Mutex<usize>,
    failing_batches: HashSet<usize>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the given batches (1-based call order)
    pub fn failing_on(batches: &[usize]) -> Self {
        Self {
            failing_batches: batches.iter().copied().collect(),
            ..Self::default()
        }
    }

    pub fn records(&self) -> Vec<CanonicalRecord> {
        self.records.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl RecordSink for MemorySink {
    async fn insert_batch(&self, batch: &[CanonicalRecord]) -> Result<usize> {
        let call = {
            let mut calls = self.calls.lock().map_err(|e| Error::sink(format!("Lock poisoned: {}", e)))?;
            *calls += 1;
            *calls
        };
        if self.failing_batches.contains(&call) {
            return Err(Error::sink("simulated insert failure"));
        }

        let mut records = self
            .records
            .lock()
            .map_err(|e| Error::sink(format!("Lock poisoned: {}", e)))?;
        records.extend_from_slice(batch);
        Ok(batch.len())
    }
}
