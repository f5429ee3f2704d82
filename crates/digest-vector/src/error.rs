//! Error types for vector storage.

use thiserror::Error;

/// Error type for vector store operations.
#[derive(Debug, Error)]
pub enum VectorStoreError {
    /// Backend could not be reached or failed mid-call
    #[error("vector store unavailable: {0}")]
    Unavailable(String),

    /// Call exceeded its timeout
    #[error("vector store timeout")]
    Timeout,

    /// Point was rejected before any write happened
    #[error("invalid point: {0}")]
    InvalidPoint(String),
}

impl VectorStoreError {
    /// Transport-class failures worth retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            VectorStoreError::Unavailable(_) | VectorStoreError::Timeout
        )
    }
}
