//! # digest-embeddings
//!
//! Embedding providers and content fingerprints for the chat-digest engine.
//!
//! The [`EmbeddingProvider`] trait is the capability boundary to whatever
//! turns text into vectors. Two implementations ship here:
//! - [`HttpEmbeddingProvider`]: OpenAI-compatible embeddings endpoint with
//!   timeouts, retry with exponential backoff, and secret-wrapped API keys
//! - [`HashEmbedder`]: deterministic token-hash embedder for development
//!   and tests; no network, stable across runs
//!
//! Fingerprints (SHA-256 of normalized text) drive idempotent ingestion.

pub mod error;
pub mod fingerprint;
pub mod hash;
pub mod http;
pub mod provider;

pub use error::ProviderError;
pub use fingerprint::{fingerprint, normalize_text};
pub use hash::HashEmbedder;
pub use http::{HttpEmbeddingProvider, HttpProviderConfig};
pub use provider::EmbeddingProvider;
