//! Embedding provider trait.
//!
//! The capability boundary between the engine and whatever produces
//! vectors. Implementations must be thread-safe for concurrent batches.

use async_trait::async_trait;

use digest_types::Embedding;

use crate::error::ProviderError;

/// Pluggable embedding provider.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Version stamp recorded with every vector this provider produces.
    /// A version bump makes old vectors invisible to new queries.
    fn model_version(&self) -> &str;

    /// Dimension of the vectors this provider returns.
    fn dimension(&self) -> usize;

    /// Embed a batch of texts, returning one vector per input in order.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>, ProviderError>;

    /// Embed a single text.
    async fn embed(&self, text: &str) -> Result<Embedding, ProviderError> {
        let texts = [text.to_string()];
        let vectors = self.embed_batch(&texts).await?;
        vectors
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::Parse("provider returned no vectors".to_string()))
    }
}
