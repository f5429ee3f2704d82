//! Search orchestration: resolve params, fan out nearest-neighbor
//! queries, then score and select.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use futures::future::join_all;
use tracing::{debug, warn};

use digest_embeddings::EmbeddingProvider;
use digest_params::TuningStore;
use digest_types::{Embedding, RankedItem, RankingSettings, Timeframe, TuningOverride, TuningParams};
use digest_vector::{QueryRequest, ScoredPoint, VectorStore};

use crate::error::RankingError;
use crate::{scoring, selection};

/// The ranking engine. Read-only against the vector store and tuning
/// scopes; any number of searches may run in parallel.
pub struct RankingEngine {
    store: Arc<dyn VectorStore>,
    provider: Arc<dyn EmbeddingProvider>,
    tuning: Arc<TuningStore>,
    settings: RankingSettings,
}

impl RankingEngine {
    pub fn new(
        store: Arc<dyn VectorStore>,
        provider: Arc<dyn EmbeddingProvider>,
        tuning: Arc<TuningStore>,
    ) -> Self {
        Self {
            store,
            provider,
            tuning,
            settings: RankingSettings::default(),
        }
    }

    /// Override the default query settings.
    pub fn with_settings(mut self, settings: RankingSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Rank messages in `timeframe` for one user.
    ///
    /// Resolves tuning scopes (call-scoped `knobs` win, and are never
    /// persisted), embeds the user's interest topics into query vectors,
    /// runs one nearest-neighbor query per topic concurrently, merges
    /// hits by best similarity, then applies recency decay, interest
    /// weighting, and diversity selection under topic quotas.
    ///
    /// Returns items in display order (weighted score descending). An
    /// empty candidate set is an empty result, not an error.
    pub async fn search_similar(
        &self,
        user_id: &str,
        timeframe: Timeframe,
        knobs: Option<&TuningOverride>,
    ) -> Result<Vec<RankedItem>, RankingError> {
        timeframe.validate()?;
        let params = match knobs {
            Some(knobs) => self.tuning.resolve_with_knobs(user_id, knobs)?,
            None => self.tuning.resolve(user_id),
        };

        let topics = params.interest_topics();
        if topics.is_empty() {
            warn!(user_id, "no positive interest topics; digest will be empty");
            return Ok(Vec::new());
        }

        let query_vectors = self
            .provider
            .embed_batch(&topics)
            .await
            .map_err(|e| RankingError::ProviderUnavailable(e.to_string()))?;

        let hits = self
            .gather_candidates(query_vectors, timeframe, &params)
            .await?;
        debug!(
            user_id,
            candidates = hits.len(),
            top_k = params.top_k,
            "scoring merged candidates"
        );

        let candidates = scoring::score_candidates(hits, &params, Utc::now());
        let mut items = selection::select_diverse(candidates, &params);
        selection::sort_display(&mut items);
        Ok(items)
    }

    /// One nearest-neighbor query per interest topic, concurrently, all
    /// under a single deadline. Hits for the same message across topics
    /// collapse to the best similarity. Any failed query fails the whole
    /// search: a truncated candidate set would skew quotas and
    /// diversity downstream.
    async fn gather_candidates(
        &self,
        query_vectors: Vec<Embedding>,
        timeframe: Timeframe,
        params: &TuningParams,
    ) -> Result<Vec<ScoredPoint>, RankingError> {
        let limit = oversample_limit(params.top_k, &self.settings);
        let model_version = self.provider.model_version().to_string();

        // Unspawned futures: dropping a cancelled search abandons the
        // in-flight queries with it.
        let queries = query_vectors.into_iter().map(|vector| {
            self.store.query(QueryRequest {
                vector,
                timeframe,
                min_similarity: params.min_relevance,
                limit,
                model_version: model_version.clone(),
                workspace_id: None,
            })
        });

        let joined = tokio::time::timeout(self.settings.query_timeout(), join_all(queries))
            .await
            .map_err(|_| {
                RankingError::RetrievalUnavailable("vector query timed out".to_string())
            })?;

        let mut merged: HashMap<String, ScoredPoint> = HashMap::new();
        for result in joined {
            let hits = result.map_err(|e| RankingError::RetrievalUnavailable(e.to_string()))?;
            for hit in hits {
                match merged.entry(hit.message_id.clone()) {
                    Entry::Occupied(mut slot) => {
                        if hit.similarity > slot.get().similarity {
                            slot.insert(hit);
                        }
                    }
                    Entry::Vacant(slot) => {
                        slot.insert(hit);
                    }
                }
            }
        }
        Ok(merged.into_values().collect())
    }
}

/// Candidates requested from the store: `oversample_factor * top_k`,
/// capped, but never below `top_k` itself.
fn oversample_limit(top_k: usize, settings: &RankingSettings) -> usize {
    top_k
        .saturating_mul(settings.oversample_factor)
        .min(settings.max_oversample)
        .max(top_k)
}
