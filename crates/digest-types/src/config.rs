//! Configuration loading for the digest daemon.
//!
//! Layered precedence: built-in defaults -> config file
//! (~/.config/chat-digest/config.toml) -> CLI-specified file -> environment
//! variables (DIGEST_*, double underscore for nesting, e.g.
//! DIGEST_PROVIDER__API_KEY).

use config::{Config, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::params::TuningParams;

/// Configuration loading or validation failure.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Sources could not be read or deserialized
    #[error("configuration error: {0}")]
    Load(String),

    /// A loaded value violates its domain
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Embedding provider endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSettings {
    /// Provider backend: "openai" (HTTP, OpenAI-compatible) or "hash"
    /// (deterministic local embedder for development)
    #[serde(default = "default_provider_backend")]
    pub backend: String,

    /// Base URL of the embeddings API
    #[serde(default = "default_provider_base_url")]
    pub base_url: String,

    /// Embedding model requested from the provider. Also the model
    /// version stamped onto stored vectors.
    #[serde(default = "default_provider_model")]
    pub model: String,

    /// API key; prefer DIGEST_PROVIDER__API_KEY over the config file
    #[serde(default)]
    pub api_key: Option<String>,

    /// Expected vector dimension
    #[serde(default = "default_provider_dimensions")]
    pub dimensions: usize,

    /// Per-request timeout in seconds
    #[serde(default = "default_provider_timeout_secs")]
    pub timeout_secs: u64,

    /// Retry attempts for transient provider failures
    #[serde(default = "default_provider_max_retries")]
    pub max_retries: u32,
}

fn default_provider_backend() -> String {
    "openai".to_string()
}

fn default_provider_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_provider_model() -> String {
    "text-embedding-3-small".to_string()
}

fn default_provider_dimensions() -> usize {
    1536
}

fn default_provider_timeout_secs() -> u64 {
    30
}

fn default_provider_max_retries() -> u32 {
    3
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            backend: default_provider_backend(),
            base_url: default_provider_base_url(),
            model: default_provider_model(),
            api_key: None,
            dimensions: default_provider_dimensions(),
            timeout_secs: default_provider_timeout_secs(),
            max_retries: default_provider_max_retries(),
        }
    }
}

impl ProviderSettings {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.backend != "openai" && self.backend != "hash" {
            return Err(format!(
                "provider.backend must be \"openai\" or \"hash\", got {:?}",
                self.backend
            ));
        }
        if self.base_url.is_empty() {
            return Err("provider.base_url must not be empty".to_string());
        }
        if self.dimensions == 0 {
            return Err("provider.dimensions must be > 0".to_string());
        }
        if self.timeout_secs == 0 {
            return Err("provider.timeout_secs must be > 0".to_string());
        }
        Ok(())
    }

    /// Request timeout as a duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Ingestion pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestSettings {
    /// Maximum provider calls in flight per batch. Callers queue when
    /// the limit is reached; they are never rejected.
    #[serde(default = "default_max_concurrent_embeds")]
    pub max_concurrent_embeds: usize,
}

fn default_max_concurrent_embeds() -> usize {
    8
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self {
            max_concurrent_embeds: default_max_concurrent_embeds(),
        }
    }
}

impl IngestSettings {
    pub fn validate(&self) -> Result<(), String> {
        if self.max_concurrent_embeds == 0 {
            return Err("ingest.max_concurrent_embeds must be > 0".to_string());
        }
        Ok(())
    }
}

/// Retrieval-side configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingSettings {
    /// Nearest-neighbor oversampling multiplier: the store is asked for
    /// oversample_factor * top_k candidates to leave room for filtering.
    #[serde(default = "default_oversample_factor")]
    pub oversample_factor: usize,

    /// Hard cap on the oversampled candidate request
    #[serde(default = "default_max_oversample")]
    pub max_oversample: usize,

    /// Per-call vector store query timeout in seconds
    #[serde(default = "default_query_timeout_secs")]
    pub query_timeout_secs: u64,
}

fn default_oversample_factor() -> usize {
    5
}

fn default_max_oversample() -> usize {
    500
}

fn default_query_timeout_secs() -> u64 {
    10
}

impl Default for RankingSettings {
    fn default() -> Self {
        Self {
            oversample_factor: default_oversample_factor(),
            max_oversample: default_max_oversample(),
            query_timeout_secs: default_query_timeout_secs(),
        }
    }
}

impl RankingSettings {
    pub fn validate(&self) -> Result<(), String> {
        if self.oversample_factor == 0 {
            return Err("ranking.oversample_factor must be > 0".to_string());
        }
        if self.max_oversample == 0 {
            return Err("ranking.max_oversample must be > 0".to_string());
        }
        if self.query_timeout_secs == 0 {
            return Err("ranking.query_timeout_secs must be > 0".to_string());
        }
        Ok(())
    }

    /// Query timeout as a duration.
    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs)
    }
}

/// Initial global tuning scope, loaded once at startup. Administrative
/// updates after that go through the tuning store, not the config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TuningSettings {
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    #[serde(default = "default_min_relevance")]
    pub min_relevance: f32,

    #[serde(default = "default_recency_half_life_hours")]
    pub recency_half_life_hours: u64,

    #[serde(default = "default_diversity_lambda")]
    pub diversity_lambda: f32,

    #[serde(default)]
    pub topic_quota: HashMap<String, usize>,

    #[serde(default)]
    pub user_interest_weight: HashMap<String, f32>,
}

fn default_top_k() -> usize {
    20
}

fn default_min_relevance() -> f32 {
    0.0
}

fn default_recency_half_life_hours() -> u64 {
    72
}

fn default_diversity_lambda() -> f32 {
    0.7
}

impl Default for TuningSettings {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            min_relevance: default_min_relevance(),
            recency_half_life_hours: default_recency_half_life_hours(),
            diversity_lambda: default_diversity_lambda(),
            topic_quota: HashMap::new(),
            user_interest_weight: HashMap::new(),
        }
    }
}

impl TuningSettings {
    /// Materialize the configured global scope.
    pub fn to_params(&self) -> TuningParams {
        TuningParams {
            top_k: self.top_k,
            min_relevance: self.min_relevance,
            recency_half_life: Duration::from_secs(self.recency_half_life_hours * 3600),
            diversity_lambda: self.diversity_lambda,
            topic_quota: self.topic_quota.clone(),
            user_interest_weight: self.user_interest_weight.clone(),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        self.to_params().validate().map_err(|e| e.to_string())
    }
}

/// Main application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// HTTP server bind host
    #[serde(default = "default_http_host")]
    pub http_host: String,

    /// HTTP server port
    #[serde(default = "default_http_port")]
    pub http_port: u16,

    /// Directory for persisted engine state (tuning scopes, watermarks)
    #[serde(default = "default_state_dir")]
    pub state_dir: String,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Embedding provider endpoint
    #[serde(default)]
    pub provider: ProviderSettings,

    /// Ingestion pipeline knobs
    #[serde(default)]
    pub ingest: IngestSettings,

    /// Retrieval knobs
    #[serde(default)]
    pub ranking: RankingSettings,

    /// Initial global tuning scope
    #[serde(default)]
    pub tuning: TuningSettings,
}

fn default_http_host() -> String {
    "0.0.0.0".to_string()
}

fn default_http_port() -> u16 {
    8000
}

fn default_state_dir() -> String {
    ProjectDirs::from("", "", "chat-digest")
        .map(|p| p.data_local_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("./data"))
        .to_string_lossy()
        .to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            http_host: default_http_host(),
            http_port: default_http_port(),
            state_dir: default_state_dir(),
            log_level: default_log_level(),
            provider: ProviderSettings::default(),
            ingest: IngestSettings::default(),
            ranking: RankingSettings::default(),
            tuning: TuningSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings with layered precedence:
    /// 1. Built-in defaults
    /// 2. Config file (~/.config/chat-digest/config.toml)
    /// 3. CLI-specified config file (optional)
    /// 4. Environment variables (DIGEST_*)
    ///
    /// CLI flags should be applied by the caller after this returns.
    pub fn load(cli_config_path: Option<&str>) -> Result<Self, ConfigError> {
        let config_dir = ProjectDirs::from("", "", "chat-digest")
            .map(|p| p.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        let default_config_path = config_dir.join("config");

        let mut builder = Config::builder()
            .set_default("http_host", default_http_host())
            .map_err(|e| ConfigError::Load(e.to_string()))?
            .set_default("http_port", default_http_port() as i64)
            .map_err(|e| ConfigError::Load(e.to_string()))?
            .set_default("state_dir", default_state_dir())
            .map_err(|e| ConfigError::Load(e.to_string()))?
            .set_default("log_level", default_log_level())
            .map_err(|e| ConfigError::Load(e.to_string()))?
            .set_default("provider.backend", default_provider_backend())
            .map_err(|e| ConfigError::Load(e.to_string()))?
            .set_default("provider.base_url", default_provider_base_url())
            .map_err(|e| ConfigError::Load(e.to_string()))?
            .set_default("provider.model", default_provider_model())
            .map_err(|e| ConfigError::Load(e.to_string()))?
            .add_source(File::with_name(&default_config_path.to_string_lossy()).required(false));

        if let Some(path) = cli_config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // DIGEST_HTTP_PORT, DIGEST_PROVIDER__API_KEY, etc. The double
        // underscore separates nesting so flat keys may keep underscores.
        builder = builder.add_source(
            Environment::with_prefix("DIGEST")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| ConfigError::Load(e.to_string()))?;

        let settings: Settings = config
            .try_deserialize()
            .map_err(|e| ConfigError::Load(e.to_string()))?;

        settings.validate().map_err(ConfigError::Invalid)?;
        Ok(settings)
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<(), String> {
        if self.http_port == 0 {
            return Err("http_port must be > 0".to_string());
        }
        self.provider.validate()?;
        self.ingest.validate()?;
        self.ranking.validate()?;
        self.tuning.validate()?;
        Ok(())
    }

    /// Socket address for the HTTP server.
    pub fn http_addr(&self) -> String {
        format!("{}:{}", self.http_host, self.http_port)
    }

    /// State directory as a path.
    pub fn state_path(&self) -> PathBuf {
        PathBuf::from(&self.state_dir)
    }
}
