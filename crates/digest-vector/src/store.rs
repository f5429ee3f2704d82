//! Vector store trait and point types.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use digest_types::{Embedding, Timeframe};

use crate::error::VectorStoreError;

/// A stored vector plus the metadata that travels with it.
///
/// Keyed by (workspace, message, model version): re-upserting the same
/// key replaces the point, so at most one vector exists per message per
/// model version.
#[derive(Debug, Clone)]
pub struct VectorPoint {
    pub workspace_id: String,
    pub message_id: String,
    pub channel_id: String,

    /// Topic labels copied from the message at ingest time
    pub topics: Vec<String>,

    /// Source timestamp of the message
    pub ts: DateTime<Utc>,

    /// Content fingerprint the vector was computed from
    pub fingerprint: String,

    /// Embedding model version that produced the vector
    pub model_version: String,

    pub embedding: Embedding,

    /// When this point was written
    pub created_at: DateTime<Utc>,
}

impl VectorPoint {
    /// Storage key of this point.
    pub fn key(&self) -> (String, String, String) {
        (
            self.workspace_id.clone(),
            self.message_id.clone(),
            self.model_version.clone(),
        )
    }
}

/// A filtered nearest-neighbor query.
#[derive(Debug, Clone)]
pub struct QueryRequest {
    /// Query vector
    pub vector: Embedding,

    /// Only messages inside this window are candidates
    pub timeframe: Timeframe,

    /// Raw-similarity floor, applied before any rescoring
    pub min_similarity: f32,

    /// Maximum candidates to return
    pub limit: usize,

    /// Only points written by this model version are visible
    pub model_version: String,

    /// Restrict to one workspace; `None` searches all
    pub workspace_id: Option<String>,
}

/// One query hit: point metadata plus the raw similarity.
///
/// Carries the stored vector so downstream rescoring can compare hits
/// against each other without a second store round-trip.
#[derive(Debug, Clone)]
pub struct ScoredPoint {
    pub message_id: String,
    pub channel_id: String,
    pub topics: Vec<String>,
    pub ts: DateTime<Utc>,

    /// Cosine similarity against the query vector, in [-1, 1]
    pub similarity: f32,

    /// The stored embedding this hit was scored from
    pub embedding: Embedding,
}

impl ScoredPoint {
    /// Topic this hit ranks under: the first label, or the catch-all
    /// topic when the message carries none.
    pub fn primary_topic(&self) -> &str {
        self.topics
            .first()
            .map(String::as_str)
            .unwrap_or(digest_types::GENERAL_TOPIC)
    }
}

/// Trait for vector storage backends.
///
/// The ingestion pipeline is the only writer; queries are read-only and
/// may run fully in parallel.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Upsert one point as a single atomic unit.
    /// Returns `true` when the point is new, `false` when it replaced an
    /// existing point for the same key.
    async fn upsert(&self, point: VectorPoint) -> Result<bool, VectorStoreError>;

    /// Fingerprint stored for (workspace, message, model version), if a
    /// point exists. Drives the idempotent skip in ingestion.
    async fn stored_fingerprint(
        &self,
        workspace_id: &str,
        message_id: &str,
        model_version: &str,
    ) -> Result<Option<String>, VectorStoreError>;

    /// Nearest neighbors under the request's filters, sorted by
    /// similarity descending, at most `limit` entries.
    async fn query(&self, request: QueryRequest) -> Result<Vec<ScoredPoint>, VectorStoreError>;

    /// Number of stored points, for diagnostics.
    async fn count(&self) -> Result<usize, VectorStoreError>;
}
