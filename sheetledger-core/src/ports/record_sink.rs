//! Record sink port - downstream storage of accepted records

use async_trait::async_trait;

use crate::domain::result::Result;
use crate::domain::CanonicalRecord;

/// Receives accepted records in batches
///
/// The sink decides how records are stored. It does not retry; a failed
/// batch is reported back and the caller moves on.
#[async_trait]
pub trait RecordSink: Send + Sync {
    /// Store one batch, returning how many records were written
    async fn insert_batch(&self, batch: &[CanonicalRecord]) -> Result<usize>;
}
