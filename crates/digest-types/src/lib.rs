//! # digest-types
//!
//! Shared domain types for the chat-digest engine.
//!
//! This crate defines the core data structures used throughout the system:
//! - Messages: immutable chat records flowing in from the message store
//! - Embeddings: unit-normalized semantic vectors
//! - Tuning parameters: ranking knobs with global/user/call scoping
//! - Ranked items and digest results: the query-side output shapes
//! - Settings: layered daemon configuration
//!
//! ## Usage
//!
//! ```rust
//! use digest_types::{Message, TuningParams};
//! ```

pub mod config;
pub mod embedding;
pub mod error;
pub mod message;
pub mod params;
pub mod ranked;
pub mod timeframe;

pub use config::{
    ConfigError, IngestSettings, ProviderSettings, RankingSettings, Settings, TuningSettings,
};
pub use embedding::Embedding;
pub use error::ValidationError;
pub use message::{Message, GENERAL_TOPIC};
pub use params::{TuningOverride, TuningParams};
pub use ranked::{DigestResult, RankedItem, TopicGroup};
pub use timeframe::Timeframe;
