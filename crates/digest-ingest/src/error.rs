//! Ingestion errors.

use thiserror::Error;

/// Errors that abort an ingestion call outright.
///
/// Per-message trouble never lands here; it is collected into the
/// report's `failed` list so one bad message cannot sink a batch.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The provider was unreachable for the entire batch. Nothing was
    /// written; the caller may retry the whole batch.
    #[error("embedding provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// The message source failed while fetching a sync batch.
    #[error("message store unavailable: {0}")]
    SourceUnavailable(String),
}
