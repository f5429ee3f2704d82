//! Shared handler state.

use std::sync::Arc;

use digest_ingest::IngestPipeline;
use digest_params::TuningStore;
use digest_ranking::RankingEngine;

/// Everything the handlers need, cheap to clone per request.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<IngestPipeline>,
    pub engine: Arc<RankingEngine>,
    pub tuning: Arc<TuningStore>,
}

impl AppState {
    pub fn new(
        pipeline: Arc<IngestPipeline>,
        engine: Arc<RankingEngine>,
        tuning: Arc<TuningStore>,
    ) -> Self {
        Self {
            pipeline,
            engine,
            tuning,
        }
    }
}
