//! Client library for the chat-digest service.
//!
//! Wraps the two tool endpoints, `embed_and_upsert` and `search_similar`,
//! plus the health probe, behind typed methods.
//!
//! # Example
//!
//! ```rust,no_run
//! use digest_client::DigestClient;
//! use digest_types::Timeframe;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = DigestClient::connect("http://localhost:8000")?;
//!
//!     let digest = client
//!         .search_similar("u-1", Timeframe::last_days(7), None)
//!         .await?;
//!
//!     for group in &digest.topics {
//!         println!("{}: {} items", group.topic, group.items.len());
//!     }
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;

pub use client::{DigestClient, DEFAULT_ENDPOINT};
pub use error::ClientError;

// Re-export the wire types callers hold onto
pub use digest_ingest::IngestReport;
pub use digest_types::{DigestResult, Message, Timeframe, TuningOverride};
