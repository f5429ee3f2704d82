//! Wire types for the tool endpoints.
//!
//! Identifier fields are validated for shape before any work happens, so a
//! typo'd workspace never reaches the embedding provider or the vector
//! store. Responses reuse the domain types directly; there is no separate
//! response DTO layer to drift out of sync.

use serde::{Deserialize, Serialize};

use digest_types::{Message, Timeframe, TuningOverride, ValidationError};

/// Identifiers longer than this are almost certainly payload mix-ups.
const MAX_ID_LEN: usize = 64;

/// Batch of raw messages to embed and persist for one workspace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedAndUpsertRequest {
    pub workspace_id: String,
    pub messages: Vec<Message>,
}

impl EmbedAndUpsertRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_id("workspace_id", &self.workspace_id)?;
        for (i, message) in self.messages.iter().enumerate() {
            validate_id(&format!("messages[{i}].message_id"), &message.message_id)?;
        }
        Ok(())
    }
}

/// Personalized retrieval over a time window, with optional one-call knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchSimilarRequest {
    pub user_id: String,
    pub timeframe: Timeframe,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub knobs: Option<TuningOverride>,
}

impl SearchSimilarRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_id("user_id", &self.user_id)?;
        self.timeframe.validate()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Shape check for identifiers: non-empty, bounded, and limited to
/// characters that survive URLs and log lines unescaped.
pub(crate) fn validate_id(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::new(field, "must not be empty"));
    }
    if value.len() > MAX_ID_LEN {
        return Err(ValidationError::new(
            field,
            format!("must be at most {MAX_ID_LEN} characters"),
        ));
    }
    if !value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
    {
        return Err(ValidationError::new(
            field,
            "may only contain ASCII alphanumerics, '_', '-', and '.'",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;

    #[test]
    fn test_accepts_typical_ids() {
        assert!(validate_id("workspace_id", "ws-prod.eu-1").is_ok());
        assert!(validate_id("user_id", "u_42").is_ok());
    }

    #[test]
    fn test_rejects_empty_id() {
        let err = validate_id("workspace_id", "").unwrap_err();
        assert_eq!(err.field, "workspace_id");
    }

    #[test]
    fn test_rejects_oversized_id() {
        let long = "x".repeat(MAX_ID_LEN + 1);
        assert!(validate_id("user_id", &long).is_err());
    }

    #[test]
    fn test_rejects_exotic_characters() {
        assert!(validate_id("workspace_id", "ws one").is_err());
        assert!(validate_id("workspace_id", "ws/1").is_err());
        assert!(validate_id("user_id", "u@example").is_err());
    }

    #[test]
    fn test_batch_validation_names_offending_message() {
        let now = Utc::now();
        let request = EmbedAndUpsertRequest {
            workspace_id: "ws-1".to_string(),
            messages: vec![
                Message::new("m-1", "ws-1", "ch-1", "u-1", "fine", now),
                Message::new("bad id!", "ws-1", "ch-1", "u-1", "broken", now),
            ],
        };
        let err = request.validate().unwrap_err();
        assert_eq!(err.field, "messages[1].message_id");
    }

    #[test]
    fn test_search_validation_covers_timeframe() {
        let now = Utc::now();
        let request = SearchSimilarRequest {
            user_id: "u-1".to_string(),
            timeframe: Timeframe::new(now, now - Duration::hours(1)),
            knobs: None,
        };
        let err = request.validate().unwrap_err();
        assert_eq!(err.field, "timeframe");
    }
}
