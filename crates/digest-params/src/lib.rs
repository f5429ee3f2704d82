//! # digest-params
//!
//! Tuning parameter store for the chat-digest engine.
//!
//! Holds the global default knob values and per-user overrides, resolves
//! them field-by-field (call over user over global), and keeps reads
//! snapshot-consistent while administrative writes are in flight. Scopes
//! persist as a JSON document under the daemon state directory.

pub mod error;
pub mod store;

pub use error::ParamsError;
pub use store::{TuningStore, SCOPES_FILE};
