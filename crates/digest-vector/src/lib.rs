//! # digest-vector
//!
//! Vector store capability for the chat-digest engine.
//!
//! The [`VectorStore`] trait is the only writer-side boundary to vector
//! storage: points carry vector and metadata together so the two can
//! never diverge, and queries filter on workspace, timeframe, model
//! version, and a similarity floor before ranking sees anything.
//!
//! [`InMemoryVectorStore`] is the reference implementation: brute-force
//! cosine over normalized vectors. Production deployments plug a real
//! index behind the same trait.

pub mod error;
pub mod memory;
pub mod store;

pub use error::VectorStoreError;
pub use memory::InMemoryVectorStore;
pub use store::{QueryRequest, ScoredPoint, VectorPoint, VectorStore};
