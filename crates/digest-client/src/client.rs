//! HTTP client for the digest service tool endpoints.

use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info};

use digest_ingest::IngestReport;
use digest_service::{EmbedAndUpsertRequest, HealthResponse, SearchSimilarRequest};
use digest_types::{DigestResult, Message, Timeframe, TuningOverride};

use crate::error::ClientError;

/// Default endpoint for a locally running digest service.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8000";

/// Error body the service produces for rejected requests.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error_code: String,
    message: String,
    #[serde(default)]
    fields: Option<Vec<String>>,
}

/// Client for the digest service.
#[derive(Debug)]
pub struct DigestClient {
    http: reqwest::Client,
    base_url: String,
}

impl DigestClient {
    /// Create a client for the given endpoint (e.g. `http://localhost:8000`).
    ///
    /// No connection is opened here; the URL is only checked for shape.
    pub fn connect(endpoint: &str) -> Result<Self, ClientError> {
        let base_url = endpoint.trim_end_matches('/').to_string();
        Url::parse(&base_url).map_err(|e| ClientError::InvalidEndpoint(e.to_string()))?;
        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
        })
    }

    /// Create a client for the default endpoint.
    pub fn connect_default() -> Result<Self, ClientError> {
        Self::connect(DEFAULT_ENDPOINT)
    }

    /// Check service liveness.
    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        debug!("health request");
        let response = self
            .http
            .get(format!("{}/health", self.base_url))
            .send()
            .await?;
        handle(response).await
    }

    /// Embed and persist a batch of messages for a workspace.
    ///
    /// Returns the per-batch report: accepted, skipped (unchanged), and
    /// the ids that failed individually.
    pub async fn embed_and_upsert(
        &self,
        workspace_id: &str,
        messages: Vec<Message>,
    ) -> Result<IngestReport, ClientError> {
        debug!(workspace_id, messages = messages.len(), "embed_and_upsert request");
        let request = EmbedAndUpsertRequest {
            workspace_id: workspace_id.to_string(),
            messages,
        };
        let response = self
            .http
            .post(format!("{}/tools/embed_and_upsert", self.base_url))
            .json(&request)
            .send()
            .await?;
        let report: IngestReport = handle(response).await?;
        info!(
            workspace_id,
            accepted = report.accepted,
            skipped = report.skipped,
            failed = report.failed.len(),
            "ingest batch reported"
        );
        Ok(report)
    }

    /// Retrieve a personalized digest for a user over a time window.
    ///
    /// `knobs` tune this one call without touching stored scopes.
    pub async fn search_similar(
        &self,
        user_id: &str,
        timeframe: Timeframe,
        knobs: Option<TuningOverride>,
    ) -> Result<DigestResult, ClientError> {
        debug!(user_id, "search_similar request");
        let request = SearchSimilarRequest {
            user_id: user_id.to_string(),
            timeframe,
            knobs,
        };
        let response = self
            .http
            .post(format!("{}/tools/search_similar", self.base_url))
            .json(&request)
            .send()
            .await?;
        handle(response).await
    }
}

/// Deserialize a success body, or surface the service's error body.
async fn handle<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json::<T>().await?);
    }
    let body = response.json::<ApiErrorBody>().await.unwrap_or(ApiErrorBody {
        error_code: "unknown".to_string(),
        message: format!("HTTP {status}"),
        fields: None,
    });
    Err(ClientError::Api {
        status: status.as_u16(),
        error_code: body.error_code,
        message: body.message,
        fields: body.fields,
    })
}
