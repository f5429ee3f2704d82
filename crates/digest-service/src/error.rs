//! HTTP error mapping.
//!
//! Domain errors cross the wire as a JSON body with a stable `error_code`,
//! a human-readable message, and (for validation failures) the offending
//! field paths. Infrastructure outages map to 503 so callers can retry.

use std::net::SocketAddr;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use digest_ingest::IngestError;
use digest_ranking::RankingError;
use digest_types::ValidationError;

/// Failures starting or running the HTTP server itself.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("failed to bind {0}: {1}")]
    Bind(SocketAddr, std::io::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Wire shape for every error the handlers produce themselves.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error_code: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<Vec<String>>,
}

/// An error ready to be rendered as an HTTP response.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    error_code: String,
    message: String,
    fields: Option<Vec<String>>,
}

impl ApiError {
    fn new(status: StatusCode, error_code: &str, message: impl Into<String>) -> Self {
        Self {
            status,
            error_code: error_code.to_string(),
            message: message.into(),
            fields: None,
        }
    }

    /// 422 with the offending field named in `fields`.
    pub fn validation(err: ValidationError) -> Self {
        let message = err.to_string();
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            error_code: "validation_error".to_string(),
            message,
            fields: Some(vec![err.field]),
        }
    }
}

impl From<RankingError> for ApiError {
    fn from(err: RankingError) -> Self {
        match err {
            RankingError::Validation(e) => Self::validation(e),
            RankingError::ProviderUnavailable(_) => Self::new(
                StatusCode::SERVICE_UNAVAILABLE,
                "provider_unavailable",
                err.to_string(),
            ),
            RankingError::RetrievalUnavailable(_) => Self::new(
                StatusCode::SERVICE_UNAVAILABLE,
                "retrieval_unavailable",
                err.to_string(),
            ),
        }
    }
}

impl From<IngestError> for ApiError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::ProviderUnavailable(_) => Self::new(
                StatusCode::SERVICE_UNAVAILABLE,
                "provider_unavailable",
                err.to_string(),
            ),
            IngestError::SourceUnavailable(_) => Self::new(
                StatusCode::SERVICE_UNAVAILABLE,
                "source_unavailable",
                err.to_string(),
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error_code: self.error_code,
            message: self.message,
            fields: self.fields,
        };
        (self.status, Json(body)).into_response()
    }
}
