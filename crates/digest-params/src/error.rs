//! Error types for the tuning parameter store.

use digest_types::ValidationError;
use thiserror::Error;

/// Failure while reading or updating tuning scopes.
#[derive(Debug, Error)]
pub enum ParamsError {
    /// A knob value violated its domain; carries the offending field
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Scope persistence could not be read or written
    #[error("tuning scope persistence failed: {0}")]
    Persistence(String),
}
