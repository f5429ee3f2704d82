//! Error types for embedding providers.

use thiserror::Error;

/// Error type for embedding operations.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Request could not be sent or came back non-2xx
    #[error("embedding request failed: {0}")]
    Api(String),

    /// Response body did not match the expected shape
    #[error("failed to parse embedding response: {0}")]
    Parse(String),

    /// Provider returned 429
    #[error("rate limit exceeded")]
    RateLimitExceeded,

    /// Request exceeded the configured timeout
    #[error("timeout waiting for embedding response")]
    Timeout,

    /// Provider misconfiguration, not retryable
    #[error("invalid provider configuration: {0}")]
    Config(String),

    /// Returned vector had the wrong dimension
    #[error("embedding dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
}

impl ProviderError {
    /// Transport-class failures that a retry may resolve. Config and
    /// shape errors are not retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ProviderError::Api(_) | ProviderError::RateLimitExceeded | ProviderError::Timeout
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(ProviderError::Timeout.is_retryable());
        assert!(ProviderError::RateLimitExceeded.is_retryable());
        assert!(ProviderError::Api("503".to_string()).is_retryable());
        assert!(!ProviderError::Config("missing key".to_string()).is_retryable());
        assert!(!ProviderError::DimensionMismatch {
            expected: 1536,
            got: 768
        }
        .is_retryable());
    }
}
