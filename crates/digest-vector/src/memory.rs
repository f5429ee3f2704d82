//! In-memory reference vector store.
//!
//! Brute-force cosine over normalized vectors. Fine for tests, local
//! development, and modest corpora; production deployments put a real
//! ANN index behind the same trait.

use async_trait::async_trait;
use std::cmp::Ordering;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::VectorStoreError;
use crate::store::{QueryRequest, ScoredPoint, VectorPoint, VectorStore};

type PointKey = (String, String, String);

/// In-memory vector store.
#[derive(Default)]
pub struct InMemoryVectorStore {
    points: RwLock<HashMap<PointKey, VectorPoint>>,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn upsert(&self, point: VectorPoint) -> Result<bool, VectorStoreError> {
        if point.embedding.dimension() == 0 {
            return Err(VectorStoreError::InvalidPoint(
                "empty embedding".to_string(),
            ));
        }
        let key = point.key();
        let mut points = self.points.write().await;
        let created = points.insert(key, point).is_none();
        Ok(created)
    }

    async fn stored_fingerprint(
        &self,
        workspace_id: &str,
        message_id: &str,
        model_version: &str,
    ) -> Result<Option<String>, VectorStoreError> {
        let key = (
            workspace_id.to_string(),
            message_id.to_string(),
            model_version.to_string(),
        );
        let points = self.points.read().await;
        Ok(points.get(&key).map(|p| p.fingerprint.clone()))
    }

    async fn query(&self, request: QueryRequest) -> Result<Vec<ScoredPoint>, VectorStoreError> {
        let points = self.points.read().await;

        let mut hits: Vec<ScoredPoint> = points
            .values()
            .filter(|p| p.model_version == request.model_version)
            .filter(|p| match &request.workspace_id {
                Some(ws) => p.workspace_id == *ws,
                None => true,
            })
            .filter(|p| request.timeframe.contains(p.ts))
            .filter_map(|p| {
                let similarity = request.vector.cosine_similarity(&p.embedding);
                if similarity >= request.min_similarity {
                    Some(ScoredPoint {
                        message_id: p.message_id.clone(),
                        channel_id: p.channel_id.clone(),
                        topics: p.topics.clone(),
                        ts: p.ts,
                        similarity,
                        embedding: p.embedding.clone(),
                    })
                } else {
                    None
                }
            })
            .collect();

        hits.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(Ordering::Equal)
        });
        hits.truncate(request.limit);

        debug!(hits = hits.len(), limit = request.limit, "vector query");
        Ok(hits)
    }

    async fn count(&self) -> Result<usize, VectorStoreError> {
        Ok(self.points.read().await.len())
    }
}
