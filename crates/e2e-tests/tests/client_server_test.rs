//! Client-to-server tests over a real local socket.
//!
//! Everything here goes through DigestClient, so the wire DTOs, the
//! error body mapping, and the client's retry classification all get
//! exercised against the actual axum server.

use std::sync::Arc;

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use ulid::Ulid;

use digest_client::{ClientError, DigestClient};
use digest_embeddings::{EmbeddingProvider, ProviderError};
use digest_ingest::IngestPipeline;
use digest_params::TuningStore;
use digest_ranking::RankingEngine;
use digest_service::AppState;
use digest_types::{Embedding, TuningOverride};
use digest_vector::InMemoryVectorStore;
use e2e_tests::{
    default_global, last_week, make_batch, spawn_app, spawn_server, TestHarness, TEST_WORKSPACE,
};

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

async fn connect(harness: &TestHarness) -> DigestClient {
    let addr = spawn_server(harness).await;
    DigestClient::connect(&format!("http://{addr}")).unwrap()
}

#[tokio::test]
async fn test_health_over_the_wire() {
    let harness = TestHarness::new();
    let client = connect(&harness).await;

    let health = client.health().await.unwrap();
    assert_eq!(health.status, "ok");
    assert!(!health.version.is_empty());
}

#[tokio::test]
async fn test_ingest_and_search_through_client() {
    let harness = TestHarness::new();
    let client = connect(&harness).await;

    let report = client
        .embed_and_upsert(
            TEST_WORKSPACE,
            make_batch("rs", 3, "rust channel backpressure", "rust"),
        )
        .await
        .unwrap();
    assert_eq!(report.accepted, 3);
    assert!(report.is_clean());

    let digest = client
        .search_similar("u-1", last_week(), None)
        .await
        .unwrap();
    assert_eq!(digest.user_id, "u-1");
    assert_eq!(digest.total_items(), 3);
    assert_eq!(digest.topics[0].topic, "rust");
    assert!(Ulid::from_string(&digest.digest_id).is_ok());
}

#[tokio::test]
async fn test_knobs_apply_over_the_wire() {
    let harness = TestHarness::new();
    let client = connect(&harness).await;

    client
        .embed_and_upsert(
            TEST_WORKSPACE,
            make_batch("rs", 5, "rust allocator tuning", "rust"),
        )
        .await
        .unwrap();

    let knobs = TuningOverride {
        top_k: Some(1),
        ..Default::default()
    };
    let digest = client
        .search_similar("u-1", last_week(), Some(knobs))
        .await
        .unwrap();
    assert_eq!(digest.total_items(), 1);
}

#[tokio::test]
async fn test_validation_error_surfaces_fields() {
    let harness = TestHarness::new();
    let client = connect(&harness).await;

    let err = client
        .embed_and_upsert("bad ws!", Vec::new())
        .await
        .unwrap_err();
    match &err {
        ClientError::Api {
            status,
            error_code,
            fields,
            ..
        } => {
            assert_eq!(*status, 422);
            assert_eq!(error_code, "validation_error");
            assert_eq!(fields.as_deref(), Some(&["workspace_id".to_string()][..]));
        }
        other => panic!("expected Api error, got {other:?}"),
    }
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_bad_knob_rejected_over_the_wire() {
    let harness = TestHarness::new();
    let client = connect(&harness).await;

    let knobs = TuningOverride {
        diversity_lambda: Some(7.0),
        ..Default::default()
    };
    let err = client
        .search_similar("u-1", last_week(), Some(knobs))
        .await
        .unwrap_err();
    match err {
        ClientError::Api { status, fields, .. } => {
            assert_eq!(status, 422);
            assert_eq!(fields, Some(vec!["diversity_lambda".to_string()]));
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_provider_outage_is_retryable_through_client() {
    let provider = Arc::new(OfflineProvider);
    let store = Arc::new(InMemoryVectorStore::new());
    let tuning = Arc::new(TuningStore::new(default_global()).unwrap());
    let state = AppState::new(
        Arc::new(IngestPipeline::new(store.clone(), provider.clone())),
        Arc::new(RankingEngine::new(store, provider, tuning.clone())),
        tuning,
    );
    let addr = spawn_app(state).await;
    let client = DigestClient::connect(&format!("http://{addr}")).unwrap();

    let err = client
        .embed_and_upsert(
            TEST_WORKSPACE,
            make_batch("rs", 2, "rust build caching", "rust"),
        )
        .await
        .unwrap_err();
    match &err {
        ClientError::Api {
            status, error_code, ..
        } => {
            assert_eq!(*status, 503);
            assert_eq!(error_code, "provider_unavailable");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
    assert!(err.is_retryable());
}
