//! HTTP embedding provider for OpenAI-compatible endpoints.

use async_trait::async_trait;
use backoff::{backoff::Backoff, ExponentialBackoff};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, warn};

use digest_types::{Embedding, ProviderSettings};

use crate::error::ProviderError;
use crate::provider::EmbeddingProvider;

/// Configuration for the HTTP embedding provider.
#[derive(Debug, Clone)]
pub struct HttpProviderConfig {
    /// API base URL (e.g., "https://api.openai.com/v1")
    pub base_url: String,

    /// Embedding model to request; doubles as the stored model version
    pub model: String,

    /// API key
    pub api_key: SecretString,

    /// Expected vector dimension
    pub dimensions: usize,

    /// Request timeout
    pub timeout: Duration,

    /// Maximum retries on transient failure
    pub max_retries: u32,
}

impl HttpProviderConfig {
    /// Create config for the OpenAI embeddings API.
    pub fn openai(api_key: impl Into<String>, model: impl Into<String>, dimensions: usize) -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: model.into(),
            api_key: SecretString::from(api_key.into()),
            dimensions,
            timeout: Duration::from_secs(30),
            max_retries: 3,
        }
    }

    /// Build config from daemon settings. The API key comes from the
    /// settings value or, failing that, the OPENAI_API_KEY environment
    /// variable.
    pub fn from_settings(settings: &ProviderSettings) -> Result<Self, ProviderError> {
        let api_key = settings
            .api_key
            .clone()
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .ok_or_else(|| {
                ProviderError::Config(
                    "no API key: set provider.api_key or OPENAI_API_KEY".to_string(),
                )
            })?;

        Ok(Self {
            base_url: settings.base_url.clone(),
            model: settings.model.clone(),
            api_key: SecretString::from(api_key),
            dimensions: settings.dimensions,
            timeout: settings.timeout(),
            max_retries: settings.max_retries,
        })
    }
}

/// Embedding provider backed by an OpenAI-compatible `/embeddings`
/// endpoint.
pub struct HttpEmbeddingProvider {
    client: Client,
    config: HttpProviderConfig,
}

impl HttpEmbeddingProvider {
    /// Create a new HTTP provider.
    pub fn new(config: HttpProviderConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ProviderError::Config(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Call the embeddings endpoint with retry logic.
    async fn call_api(&self, texts: &[String]) -> Result<Vec<Embedding>, ProviderError> {
        let mut backoff = ExponentialBackoff {
            max_elapsed_time: Some(Duration::from_secs(120)),
            ..Default::default()
        };

        let mut attempts = 0;

        loop {
            attempts += 1;
            debug!(attempt = attempts, inputs = texts.len(), "Calling embeddings API");

            match self.make_request(texts).await {
                Ok(vectors) => return Ok(vectors),
                Err(e) if !e.is_retryable() => return Err(e),
                Err(e) => {
                    if attempts >= self.config.max_retries {
                        error!(error = %e, "Max retries exceeded");
                        return Err(e);
                    }

                    match backoff.next_backoff() {
                        Some(duration) => {
                            warn!(
                                error = %e,
                                retry_in_ms = duration.as_millis(),
                                "Embedding call failed, retrying"
                            );
                            tokio::time::sleep(duration).await;
                        }
                        None => {
                            error!(error = %e, "Backoff exhausted");
                            return Err(e);
                        }
                    }
                }
            }
        }
    }

    /// Make a single embeddings request.
    async fn make_request(&self, texts: &[String]) -> Result<Vec<Embedding>, ProviderError> {
        #[derive(Serialize)]
        struct EmbeddingsRequest<'a> {
            model: &'a str,
            input: &'a [String],
            dimensions: usize,
        }

        #[derive(Deserialize)]
        struct EmbeddingsResponse {
            data: Vec<EmbeddingData>,
        }

        #[derive(Deserialize)]
        struct EmbeddingData {
            index: usize,
            embedding: Vec<f32>,
        }

        let request = EmbeddingsRequest {
            model: &self.config.model,
            input: texts,
            dimensions: self.config.dimensions,
        };

        let url = format!("{}/embeddings", self.config.base_url);

        let response = self
            .client
            .post(&url)
            .header(
                "Authorization",
                format!("Bearer {}", self.config.api_key.expose_secret()),
            )
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout
                } else {
                    ProviderError::Api(e.to_string())
                }
            })?;

        if response.status() == 429 {
            return Err(ProviderError::RateLimitExceeded);
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api(format!("HTTP {}: {}", status, body)));
        }

        let body: EmbeddingsResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        if body.data.len() != texts.len() {
            return Err(ProviderError::Parse(format!(
                "expected {} vectors, got {}",
                texts.len(),
                body.data.len()
            )));
        }

        // The API may return entries out of order; index restores it.
        let mut data = body.data;
        data.sort_by_key(|d| d.index);

        let mut vectors = Vec::with_capacity(data.len());
        for entry in data {
            if entry.embedding.len() != self.config.dimensions {
                return Err(ProviderError::DimensionMismatch {
                    expected: self.config.dimensions,
                    got: entry.embedding.len(),
                });
            }
            vectors.push(Embedding::new(entry.embedding));
        }
        Ok(vectors)
    }
}

#[async_trait]
impl EmbeddingProvider for HttpEmbeddingProvider {
    fn model_version(&self) -> &str {
        &self.config.model
    }

    fn dimension(&self) -> usize {
        self.config.dimensions
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>, ProviderError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.call_api(texts).await
    }
}
