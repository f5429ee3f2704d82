//! Deterministic token-hash embedder for development and tests.
//!
//! Each token maps to a fixed pseudo-random vector derived from its
//! SHA-256 digest; a text embeds as the normalized sum of its token
//! vectors. Identical texts produce identical vectors and texts sharing
//! tokens land close together, which is enough signal for ranking to be
//! exercised without a live provider.

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use digest_types::Embedding;

use crate::error::ProviderError;
use crate::fingerprint::normalize_text;
use crate::provider::EmbeddingProvider;

/// Version stamp written by the default hash embedder.
pub const HASH_MODEL_VERSION: &str = "hash-v1";

/// Deterministic local embedder.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimension: usize,
    version: String,
}

impl HashEmbedder {
    /// Create an embedder producing vectors of the given dimension.
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            version: HASH_MODEL_VERSION.to_string(),
        }
    }

    /// Override the version stamp, e.g. to simulate a model bump.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    fn token_vector(&self, token: &str) -> Vec<f32> {
        let mut values = Vec::with_capacity(self.dimension);
        let mut block = Sha256::digest(token.as_bytes());
        'fill: loop {
            for byte in block.iter() {
                if values.len() == self.dimension {
                    break 'fill;
                }
                values.push((*byte as f32) / 127.5 - 1.0);
            }
            block = Sha256::digest(block);
        }
        values
    }

    fn embed_one(&self, text: &str) -> Embedding {
        let normalized = normalize_text(text);
        let mut sum = vec![0.0f32; self.dimension];
        for token in normalized.split_whitespace() {
            for (slot, value) in sum.iter_mut().zip(self.token_vector(token)) {
                *slot += value;
            }
        }
        Embedding::new(sum)
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(64)
    }
}

#[async_trait]
impl EmbeddingProvider for HashEmbedder {
    fn model_version(&self) -> &str {
        &self.version
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>, ProviderError> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }
}
