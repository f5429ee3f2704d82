//! End-to-end test infrastructure for chat-digest.
//!
//! Provides a shared TestHarness wiring the deterministic embedder, the
//! in-memory vector store, tuning scopes, ingest pipeline, and ranking
//! engine together the same way the daemon does, plus fixture helpers
//! and a real HTTP server spawner for client tests.

use std::net::SocketAddr;
use std::sync::Arc;

use chrono::{Duration, Utc};

use digest_embeddings::HashEmbedder;
use digest_ingest::IngestPipeline;
use digest_params::TuningStore;
use digest_ranking::RankingEngine;
use digest_service::{router, AppState};
use digest_types::{Message, Timeframe, TuningParams};
use digest_vector::InMemoryVectorStore;

/// Workspace id used by all harness fixtures.
pub const TEST_WORKSPACE: &str = "ws-e2e";

/// Shared test harness for E2E tests.
///
/// Everything is process-local: the hash embedder stands in for the
/// provider, vectors live in memory, tuning scopes persist into the
/// harness temp dir.
pub struct TestHarness {
    /// Keeps temp dir alive for the lifetime of the harness
    pub _temp_dir: tempfile::TempDir,
    pub provider: Arc<HashEmbedder>,
    pub store: Arc<InMemoryVectorStore>,
    pub tuning: Arc<TuningStore>,
    pub pipeline: Arc<IngestPipeline>,
    pub engine: Arc<RankingEngine>,
}

impl TestHarness {
    /// Harness with the default global scope (see [`default_global`]).
    pub fn new() -> Self {
        Self::with_global(default_global())
    }

    /// Harness seeded with a specific global tuning scope.
    pub fn with_global(global: TuningParams) -> Self {
        let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        let provider = Arc::new(HashEmbedder::default());
        let store = Arc::new(InMemoryVectorStore::new());
        let tuning = Arc::new(
            TuningStore::load_or_init(temp_dir.path(), global)
                .expect("Failed to open tuning store"),
        );
        let pipeline = Arc::new(IngestPipeline::new(store.clone(), provider.clone()));
        let engine = Arc::new(RankingEngine::new(
            store.clone(),
            provider.clone(),
            tuning.clone(),
        ));

        Self {
            _temp_dir: temp_dir,
            provider,
            store,
            tuning,
            pipeline,
            engine,
        }
    }

    /// Handler state wired the way the daemon wires it.
    pub fn app_state(&self) -> AppState {
        AppState::new(
            self.pipeline.clone(),
            self.engine.clone(),
            self.tuning.clone(),
        )
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Global scope used by most tests: interested in rust and databases,
/// top_k of 10, everything else at defaults.
pub fn default_global() -> TuningParams {
    let mut global = TuningParams::default();
    global.top_k = 10;
    global.user_interest_weight.insert("rust".to_string(), 1.0);
    global
        .user_interest_weight
        .insert("databases".to_string(), 0.5);
    global
}

/// A chat message `hours_ago` hours old, labeled with one topic.
pub fn make_message(id: &str, text: &str, topic: &str, hours_ago: i64) -> Message {
    let mut message = Message::new(
        id,
        TEST_WORKSPACE,
        "ch-general",
        "author-1",
        text,
        Utc::now() - Duration::hours(hours_ago),
    );
    message.topics = vec![topic.to_string()];
    message
}

/// `count` messages sharing a text template and topic, one hour apart,
/// newest first.
pub fn make_batch(prefix: &str, count: usize, template: &str, topic: &str) -> Vec<Message> {
    (0..count)
        .map(|i| {
            make_message(
                &format!("{prefix}-{i}"),
                &format!("{template} {i}"),
                topic,
                i as i64 + 1,
            )
        })
        .collect()
}

/// The trailing week, which covers every fixture built with
/// [`make_message`] at single-digit hour ages.
pub fn last_week() -> Timeframe {
    Timeframe::last_days(7)
}

/// Serve a router over the given state on an ephemeral local port.
///
/// The server task runs until the test's runtime shuts down.
pub async fn spawn_app(state: AppState) -> SocketAddr {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Failed to read listener addr");
    tokio::spawn(async move {
        axum::serve(listener, app)
            .await
            .expect("Test server failed");
    });
    addr
}

/// Serve the harness wiring on an ephemeral local port.
pub async fn spawn_server(harness: &TestHarness) -> SocketAddr {
    spawn_app(harness.app_state()).await
}
