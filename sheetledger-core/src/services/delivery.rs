//! Batched delivery of accepted records to a sink
//!
//! Records go out in fixed-size batches. A failed batch is counted and
//! logged; delivery carries on with the next batch.

use serde::Serialize;
use tracing::{debug, warn};

use crate::domain::result::{Error, Result};
use crate::domain::CanonicalRecord;
use crate::ports::RecordSink;

pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Progress after one batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchProgress {
    /// 1-based batch number
    pub batch: usize,
    pub batches: usize,
    /// Records handled so far, including failed batches
    pub processed: usize,
    pub succeeded: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeliverySummary {
    pub attempted: usize,
    pub inserted: usize,
    pub failed_batches: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl DeliverySummary {
    pub fn is_complete(&self) -> bool {
        self.failed_batches == 0 && self.inserted == self.attempted
    }

    pub fn summary(&self) -> String {
        let mut text = format!("inserted {} of {} records", self.inserted, self.attempted);
        if self.failed_batches > 0 {
            let noun = if self.failed_batches == 1 { "batch" } else { "batches" };
            text.push_str(&format!("; {} {} failed", self.failed_batches, noun));
        }
        text
    }
}

/// Send `records` to `sink` in batches of `batch_size`
///
/// Only a zero batch size is an error; sink failures end up in the summary.
pub async fn deliver_in_batches<F>(
    sink: &dyn RecordSink,
    records: &[CanonicalRecord],
    batch_size: usize,
    mut on_batch: F,
) -> Result<DeliverySummary>
where
    F: FnMut(BatchProgress),
{
    if batch_size == 0 {
        return Err(Error::validation("Batch size must be at least 1"));
    }

    let batches = records.len().div_ceil(batch_size);
    let mut summary = DeliverySummary {
        attempted: records.len(),
        ..DeliverySummary::default()
    };
    let mut processed = 0;

    for (idx, batch) in records.chunks(batch_size).enumerate() {
        let number = idx + 1;
        processed += batch.len();

        let succeeded = match sink.insert_batch(batch).await {
            Ok(inserted) => {
                debug!(batch = number, inserted, "batch delivered");
                summary.inserted += inserted;
                true
            }
            Err(e) => {
                warn!(batch = number, size = batch.len(), error = %e, "batch failed");
                summary.failed_batches += 1;
                summary.errors.push(format!("batch {}: {}", number, e));
                false
            }
        };

        on_batch(BatchProgress {
            batch: number,
            batches,
            processed,
            succeeded,
        });
    }

    Ok(summary)
}
