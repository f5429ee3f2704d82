//! Ranking engine errors.

use thiserror::Error;

use digest_types::ValidationError;

/// Errors from the search path.
///
/// A search either returns a complete ranked set or fails whole:
/// candidates lost to a half-failed query would silently skew quotas
/// and diversity, so partial results are never surfaced.
#[derive(Debug, Error)]
pub enum RankingError {
    /// Caller-supplied timeframe or knobs failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The embedding provider could not produce query vectors.
    #[error("embedding provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// The vector store failed or timed out mid-query.
    #[error("vector retrieval unavailable: {0}")]
    RetrievalUnavailable(String),
}

impl RankingError {
    /// Whether the caller may retry the same search unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            RankingError::ProviderUnavailable(_) | RankingError::RetrievalUnavailable(_)
        )
    }
}
