//! Ingestion batch report.

use serde::{Deserialize, Serialize};

/// Outcome counts for one `embed_and_upsert` batch.
///
/// Every submitted message lands in exactly one bucket: `accepted`
/// (vector written), `skipped` (fingerprint unchanged or an in-batch
/// duplicate), or `failed` (listed by id, retryable individually).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IngestReport {
    /// Messages whose vector was written or replaced
    pub accepted: usize,

    /// Idempotent no-ops: unchanged fingerprints and in-batch duplicates
    pub skipped: usize,

    /// Ids of messages that failed; the rest of the batch still landed
    #[serde(default)]
    pub failed: Vec<String>,
}

impl IngestReport {
    /// Fold another report into this one.
    pub fn merge(&mut self, other: IngestReport) {
        self.accepted += other.accepted;
        self.skipped += other.skipped;
        self.failed.extend(other.failed);
    }

    /// Total messages accounted for.
    pub fn total(&self) -> usize {
        self.accepted + self.skipped + self.failed.len()
    }

    /// Whether every message landed without failure.
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}
