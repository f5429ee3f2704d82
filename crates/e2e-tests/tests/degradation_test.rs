//! Failure-path tests: infrastructure outages fail closed with zero
//! writes, isolated errors stay isolated, and recovery needs no cleanup.

use std::sync::Arc;

use async_trait::async_trait;
use pretty_assertions::assert_eq;

use digest_embeddings::{EmbeddingProvider, HashEmbedder, ProviderError};
use digest_ingest::{IngestError, IngestPipeline};
use digest_params::TuningStore;
use digest_ranking::{RankingEngine, RankingError};
use digest_types::Embedding;
use digest_vector::{
    InMemoryVectorStore, QueryRequest, ScoredPoint, VectorPoint, VectorStore, VectorStoreError,
};
use e2e_tests::{default_global, last_week, make_batch, make_message, TEST_WORKSPACE};

struct OfflineProvider;

#[async_trait]
impl EmbeddingProvider for OfflineProvider {
    fn model_version(&self) -> &str {
        "hash-v1"
    }

    fn dimension(&self) -> usize {
        64
    }

    async fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Embedding>, ProviderError> {
        Err(ProviderError::Api("connection refused".to_string()))
    }
}

struct DownStore;

#[async_trait]
impl VectorStore for DownStore {
    async fn upsert(&self, _point: VectorPoint) -> Result<bool, VectorStoreError> {
        Err(VectorStoreError::Unavailable("down".to_string()))
    }

    async fn stored_fingerprint(
        &self,
        _workspace_id: &str,
        _message_id: &str,
        _model_version: &str,
    ) -> Result<Option<String>, VectorStoreError> {
        Err(VectorStoreError::Unavailable("down".to_string()))
    }

    async fn query(&self, _request: QueryRequest) -> Result<Vec<ScoredPoint>, VectorStoreError> {
        Err(VectorStoreError::Unavailable("down".to_string()))
    }

    async fn count(&self) -> Result<usize, VectorStoreError> {
        Err(VectorStoreError::Unavailable("down".to_string()))
    }
}

/// Healthy store that refuses writes for one message id.
struct RefusingStore {
    inner: InMemoryVectorStore,
    refuse: &'static str,
}

#[async_trait]
impl VectorStore for RefusingStore {
    async fn upsert(&self, point: VectorPoint) -> Result<bool, VectorStoreError> {
        if point.message_id == self.refuse {
            return Err(VectorStoreError::Unavailable("write refused".to_string()));
        }
        self.inner.upsert(point).await
    }

    async fn stored_fingerprint(
        &self,
        workspace_id: &str,
        message_id: &str,
        model_version: &str,
    ) -> Result<Option<String>, VectorStoreError> {
        self.inner
            .stored_fingerprint(workspace_id, message_id, model_version)
            .await
    }

    async fn query(&self, request: QueryRequest) -> Result<Vec<ScoredPoint>, VectorStoreError> {
        self.inner.query(request).await
    }

    async fn count(&self) -> Result<usize, VectorStoreError> {
        self.inner.count().await
    }
}

fn tuning() -> Arc<TuningStore> {
    Arc::new(TuningStore::new(default_global()).unwrap())
}

#[tokio::test]
async fn test_provider_outage_fails_whole_batch_with_zero_writes() {
    let store = Arc::new(InMemoryVectorStore::new());
    let pipeline = IngestPipeline::new(store.clone(), Arc::new(OfflineProvider));

    let err = pipeline
        .embed_and_upsert(
            make_batch("rs", 3, "rust ffi boundaries", "rust"),
            TEST_WORKSPACE,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, IngestError::ProviderUnavailable(_)));
    assert_eq!(store.count().await.unwrap(), 0, "fail closed means zero writes");
}

#[tokio::test]
async fn test_store_write_failure_is_isolated_per_message() {
    let store = Arc::new(RefusingStore {
        inner: InMemoryVectorStore::new(),
        refuse: "m-bad",
    });
    let pipeline = IngestPipeline::new(store.clone(), Arc::new(HashEmbedder::default()));

    let report = pipeline
        .embed_and_upsert(
            vec![
                make_message("m-ok-1", "rust unsafe guidelines", "rust", 1),
                make_message("m-bad", "rust unsound patterns", "rust", 2),
                make_message("m-ok-2", "rust miri findings", "rust", 3),
            ],
            TEST_WORKSPACE,
        )
        .await
        .unwrap();

    assert_eq!(report.accepted, 2);
    assert_eq!(report.failed, vec!["m-bad".to_string()]);
    assert_eq!(store.count().await.unwrap(), 2);
}

#[tokio::test]
async fn test_search_fails_closed_when_store_is_down() {
    let engine = RankingEngine::new(
        Arc::new(DownStore),
        Arc::new(HashEmbedder::default()),
        tuning(),
    );

    let err = engine
        .search_similar("u-1", last_week(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, RankingError::RetrievalUnavailable(_)));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_search_fails_closed_when_provider_is_down() {
    let engine = RankingEngine::new(
        Arc::new(InMemoryVectorStore::new()),
        Arc::new(OfflineProvider),
        tuning(),
    );

    let err = engine
        .search_similar("u-1", last_week(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, RankingError::ProviderUnavailable(_)));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_recovery_after_outage_needs_no_cleanup() {
    let store = Arc::new(InMemoryVectorStore::new());
    let messages = make_batch("rs", 3, "rust pinning and self-reference", "rust");

    let broken = IngestPipeline::new(store.clone(), Arc::new(OfflineProvider));
    assert!(broken
        .embed_and_upsert(messages.clone(), TEST_WORKSPACE)
        .await
        .is_err());
    assert_eq!(store.count().await.unwrap(), 0);

    // same messages, same store, healthy provider
    let healthy = IngestPipeline::new(store.clone(), Arc::new(HashEmbedder::default()));
    let report = healthy
        .embed_and_upsert(messages, TEST_WORKSPACE)
        .await
        .unwrap();
    assert_eq!(report.accepted, 3);
    assert_eq!(report.skipped, 0);
    assert_eq!(store.count().await.unwrap(), 3);
}
