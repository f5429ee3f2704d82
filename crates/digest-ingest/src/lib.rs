//! # digest-ingest
//!
//! The embedding ingestion pipeline: the only writer to the vector
//! store.
//!
//! [`IngestPipeline::embed_and_upsert`] fingerprints each message,
//! skips unchanged content, embeds the rest (one provider call per
//! distinct fingerprint, concurrency-bounded), and upserts vector plus
//! metadata as one atomic point. Per-message failures are reported, not
//! fatal; a provider outage spanning the whole batch fails closed with
//! zero writes. Concurrent writers for the same message id serialize
//! through a per-(workspace, message) lock registry.
//!
//! [`IngestPipeline::sync_workspace`] pulls changed messages from a
//! [`MessageStore`] and advances a per-workspace watermark once the
//! batch is reported.

pub mod error;
pub mod pipeline;
pub mod report;
pub mod source;

pub use error::IngestError;
pub use pipeline::IngestPipeline;
pub use report::IngestReport;
pub use source::{InMemoryMessageStore, MessageStore};
