//! Error types for the digest client.

use thiserror::Error;

/// Errors that can occur when talking to the digest service.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Request could not be sent or the response could not be read
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Service answered with an error body
    #[error("server error {status} ({error_code}): {message}")]
    Api {
        status: u16,
        error_code: String,
        message: String,
        fields: Option<Vec<String>>,
    },

    /// Endpoint URL could not be parsed
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),
}

impl ClientError {
    /// Whether retrying the same call later could succeed.
    ///
    /// Transport failures and 503s are transient; validation rejections
    /// are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Api { status, .. } => *status == 503,
            Self::InvalidEndpoint(_) => false,
        }
    }
}
