//! The embedding ingestion pipeline.
//!
//! Ingestion runs in three phases so that a provider outage can fail
//! the whole batch before anything is written:
//!
//! 1. collapse in-batch duplicates, fingerprint every message, and skip
//!    the ones whose stored fingerprint is unchanged
//! 2. embed each distinct fingerprint once, bounded by the concurrency
//!    limit; if every call fails at the transport level the batch fails
//!    closed with zero writes
//! 3. upsert, serialized per (workspace, message) through a lock
//!    registry, re-checking the stored fingerprint under the lock so
//!    concurrent duplicate writers collapse to one effective write

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::Mutex as StdMutex;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use tokio::sync::{Mutex, Semaphore};
use tracing::{debug, info, warn};

use digest_embeddings::{fingerprint, EmbeddingProvider, ProviderError};
use digest_types::{Embedding, IngestSettings, Message};
use digest_vector::{VectorPoint, VectorStore};

use crate::error::IngestError;
use crate::report::IngestReport;
use crate::source::MessageStore;

type MessageKey = (String, String);

enum UpsertOutcome {
    Accepted,
    Skipped,
    Failed,
}

/// The only writer to the vector store.
///
/// Batches for different workspaces run concurrently; writers for the
/// same message id serialize through the per-message lock registry.
pub struct IngestPipeline {
    store: Arc<dyn VectorStore>,
    provider: Arc<dyn EmbeddingProvider>,
    embed_limit: Arc<Semaphore>,
    locks: StdMutex<HashMap<MessageKey, Arc<Mutex<()>>>>,
    watermarks: Mutex<HashMap<String, DateTime<Utc>>>,
}

impl IngestPipeline {
    pub fn new(store: Arc<dyn VectorStore>, provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self::with_settings(store, provider, &IngestSettings::default())
    }

    pub fn with_settings(
        store: Arc<dyn VectorStore>,
        provider: Arc<dyn EmbeddingProvider>,
        settings: &IngestSettings,
    ) -> Self {
        Self {
            store,
            provider,
            embed_limit: Arc::new(Semaphore::new(settings.max_concurrent_embeds)),
            locks: StdMutex::new(HashMap::new()),
            watermarks: Mutex::new(HashMap::new()),
        }
    }

    /// Embed a batch of messages and upsert their vectors.
    ///
    /// Idempotent per (message, model version): unchanged fingerprints
    /// skip, edited content replaces. Individual failures land in the
    /// report's `failed` list; only a provider outage affecting the
    /// entire batch aborts the call, and then with zero writes.
    pub async fn embed_and_upsert(
        &self,
        messages: Vec<Message>,
        workspace_id: &str,
    ) -> Result<IngestReport, IngestError> {
        let mut report = IngestReport::default();
        let model_version = self.provider.model_version().to_string();

        // in-batch duplicates collapse to the first occurrence
        let mut seen: HashSet<String> = HashSet::new();
        let mut batch: Vec<(Message, String)> = Vec::new();
        for message in messages {
            if !seen.insert(message.message_id.clone()) {
                report.skipped += 1;
                continue;
            }
            let fp = fingerprint(&message.text);
            batch.push((message, fp));
        }

        // phase 1: advisory fingerprint check, read-only
        let mut pending: Vec<(Message, String)> = Vec::new();
        for (message, fp) in batch {
            match self
                .store
                .stored_fingerprint(workspace_id, &message.message_id, &model_version)
                .await
            {
                Ok(Some(stored)) if stored == fp => {
                    debug!(message_id = %message.message_id, "fingerprint unchanged; skipping");
                    report.skipped += 1;
                }
                Ok(_) => pending.push((message, fp)),
                Err(e) => {
                    warn!(message_id = %message.message_id, error = %e, "fingerprint check failed");
                    report.failed.push(message.message_id);
                }
            }
        }

        if pending.is_empty() {
            info!(
                workspace_id = %workspace_id,
                accepted = report.accepted,
                skipped = report.skipped,
                failed = report.failed.len(),
                "ingest batch complete"
            );
            return Ok(report);
        }

        // phase 2: one provider call per distinct fingerprint, bounded
        let mut texts_by_fp: HashMap<String, String> = HashMap::new();
        for (message, fp) in &pending {
            texts_by_fp
                .entry(fp.clone())
                .or_insert_with(|| message.text.clone());
        }

        let embeds = texts_by_fp.into_iter().map(|(fp, text)| {
            let provider = Arc::clone(&self.provider);
            let limit = Arc::clone(&self.embed_limit);
            async move {
                let _permit = limit.acquire().await.expect("embed semaphore closed");
                let result = provider.embed(&text).await;
                (fp, result)
            }
        });
        let embed_results: HashMap<String, Result<Embedding, ProviderError>> =
            join_all(embeds).await.into_iter().collect();

        let transport_failures = embed_results
            .values()
            .filter(|r| matches!(r, Err(e) if e.is_retryable()))
            .count();
        if transport_failures == embed_results.len() {
            let detail = embed_results
                .values()
                .find_map(|r| r.as_ref().err())
                .map(|e| e.to_string())
                .unwrap_or_else(|| "no provider calls succeeded".to_string());
            warn!(
                workspace_id = %workspace_id,
                batch = embed_results.len(),
                "provider unreachable for the whole batch; nothing written"
            );
            return Err(IngestError::ProviderUnavailable(detail));
        }

        // phase 3: upserts, serialized per message id
        let upserts = pending.into_iter().map(|(message, fp)| {
            let embedding = match embed_results.get(&fp) {
                Some(Ok(embedding)) => Some(embedding.clone()),
                _ => None,
            };
            let model_version = model_version.clone();
            async move {
                let message_id = message.message_id.clone();
                let Some(embedding) = embedding else {
                    warn!(message_id = %message_id, "embedding failed; message marked failed");
                    return (message_id, UpsertOutcome::Failed);
                };

                let lock = self.message_lock(workspace_id, &message_id);
                let _guard = lock.lock().await;

                // authoritative re-check under the lock: a concurrent
                // writer may have landed since phase 1
                match self
                    .store
                    .stored_fingerprint(workspace_id, &message_id, &model_version)
                    .await
                {
                    Ok(Some(stored)) if stored == fp => {
                        debug!(message_id = %message_id, "concurrent writer landed first; skipping");
                        return (message_id, UpsertOutcome::Skipped);
                    }
                    Ok(_) => {}
                    Err(e) => {
                        warn!(message_id = %message_id, error = %e, "fingerprint re-check failed");
                        return (message_id, UpsertOutcome::Failed);
                    }
                }

                let point = VectorPoint {
                    workspace_id: workspace_id.to_string(),
                    message_id: message.message_id.clone(),
                    channel_id: message.channel_id.clone(),
                    topics: message.topics.clone(),
                    ts: message.ts,
                    fingerprint: fp,
                    model_version,
                    embedding,
                    created_at: Utc::now(),
                };
                match self.store.upsert(point).await {
                    Ok(_) => (message_id, UpsertOutcome::Accepted),
                    Err(e) => {
                        warn!(message_id = %message_id, error = %e, "vector upsert failed");
                        (message_id, UpsertOutcome::Failed)
                    }
                }
            }
        });

        for (message_id, outcome) in join_all(upserts).await {
            match outcome {
                UpsertOutcome::Accepted => report.accepted += 1,
                UpsertOutcome::Skipped => report.skipped += 1,
                UpsertOutcome::Failed => report.failed.push(message_id),
            }
        }

        info!(
            workspace_id = %workspace_id,
            accepted = report.accepted,
            skipped = report.skipped,
            failed = report.failed.len(),
            "ingest batch complete"
        );
        Ok(report)
    }

    /// Pull messages changed since the workspace's watermark, ingest
    /// them, and advance the watermark. The watermark only moves after
    /// the batch is reported, so a failed sync re-fetches the same rows.
    pub async fn sync_workspace(
        &self,
        source: &dyn MessageStore,
        workspace_id: &str,
    ) -> Result<IngestReport, IngestError> {
        let since = {
            let watermarks = self.watermarks.lock().await;
            watermarks.get(workspace_id).copied()
        };

        let (messages, new_watermark) = source.fetch_changed_since(workspace_id, since).await?;
        if messages.is_empty() {
            debug!(workspace_id = %workspace_id, "no changes since watermark");
            return Ok(IngestReport::default());
        }

        let fetched = messages.len();
        let report = self.embed_and_upsert(messages, workspace_id).await?;

        if let Some(watermark) = new_watermark {
            let mut watermarks = self.watermarks.lock().await;
            watermarks.insert(workspace_id.to_string(), watermark);
        }

        info!(
            workspace_id = %workspace_id,
            fetched,
            accepted = report.accepted,
            "workspace sync complete"
        );
        Ok(report)
    }

    fn message_lock(&self, workspace_id: &str, message_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().expect("message lock registry poisoned");
        locks
            .entry((workspace_id.to_string(), message_id.to_string()))
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}
