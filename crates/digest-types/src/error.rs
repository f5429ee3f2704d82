//! Validation errors shared across the engine.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A malformed input, named by the field that violated its domain.
///
/// Validation failures are caller bugs: they are reported with the
/// offending field and never retried or silently clamped.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("invalid {field}: {message}")]
pub struct ValidationError {
    /// Dotted path of the offending field (e.g. `knobs.diversity_lambda`)
    pub field: String,
    /// Human-readable description of the violated domain
    pub message: String,
}

impl ValidationError {
    /// Create a validation error for the given field.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Prefix the field path, for errors bubbling up through nested inputs.
    pub fn scoped(mut self, prefix: &str) -> Self {
        self.field = format!("{}.{}", prefix, self.field);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_field() {
        let err = ValidationError::new("top_k", "must be greater than zero");
        assert_eq!(err.to_string(), "invalid top_k: must be greater than zero");
    }

    #[test]
    fn test_scoped_prefixes_path() {
        let err = ValidationError::new("diversity_lambda", "must be in [0, 1]").scoped("knobs");
        assert_eq!(err.field, "knobs.diversity_lambda");
    }
}
