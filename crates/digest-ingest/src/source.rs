//! Message source capability for workspace sync.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use digest_types::Message;

use crate::error::IngestError;

/// Read-side capability of the external message store.
///
/// The message store owns message content; this engine only reads
/// changed rows to keep vectors in step with edits and re-labels.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Messages changed strictly after `watermark` (all messages when
    /// `None`), in change order, plus the new high-water mark to store.
    /// Returns `None` for the watermark when nothing changed.
    async fn fetch_changed_since(
        &self,
        workspace_id: &str,
        watermark: Option<DateTime<Utc>>,
    ) -> Result<(Vec<Message>, Option<DateTime<Utc>>), IngestError>;
}

/// In-memory message source for tests and local development.
///
/// Tracks a change timestamp per record, separate from the message's
/// own `ts`: edits and topic re-labels move the change time while the
/// source timestamp stays put.
#[derive(Default)]
pub struct InMemoryMessageStore {
    records: RwLock<Vec<(DateTime<Utc>, Message)>>,
}

impl InMemoryMessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message as changed now.
    pub async fn push(&self, message: Message) {
        self.push_at(Utc::now(), message).await;
    }

    /// Record a message as changed at an explicit time.
    pub async fn push_at(&self, changed_at: DateTime<Utc>, message: Message) {
        self.records.write().await.push((changed_at, message));
    }
}

#[async_trait]
impl MessageStore for InMemoryMessageStore {
    async fn fetch_changed_since(
        &self,
        workspace_id: &str,
        watermark: Option<DateTime<Utc>>,
    ) -> Result<(Vec<Message>, Option<DateTime<Utc>>), IngestError> {
        let records = self.records.read().await;

        let mut changed: Vec<(DateTime<Utc>, Message)> = records
            .iter()
            .filter(|(_, m)| m.workspace_id == workspace_id)
            .filter(|(changed_at, _)| match watermark {
                Some(mark) => *changed_at > mark,
                None => true,
            })
            .cloned()
            .collect();
        changed.sort_by_key(|(changed_at, _)| *changed_at);

        let new_watermark = changed.last().map(|(changed_at, _)| *changed_at);
        let messages = changed.into_iter().map(|(_, m)| m).collect();
        Ok((messages, new_watermark))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn message(id: &str, workspace_id: &str) -> Message {
        Message::new(id, workspace_id, "ch-1", "u-1", "some text", Utc::now())
    }

    #[tokio::test]
    async fn test_fetch_all_without_watermark() {
        let store = InMemoryMessageStore::new();
        store.push(message("m-1", "ws-1")).await;
        store.push(message("m-2", "ws-1")).await;
        store.push(message("m-3", "ws-2")).await;

        let (messages, watermark) = store.fetch_changed_since("ws-1", None).await.unwrap();
        assert_eq!(messages.len(), 2);
        assert!(watermark.is_some());
    }

    #[tokio::test]
    async fn test_watermark_is_a_strict_lower_bound() {
        let store = InMemoryMessageStore::new();
        let t0 = Utc::now();
        store.push_at(t0, message("m-1", "ws-1")).await;
        store
            .push_at(t0 + Duration::seconds(5), message("m-2", "ws-1"))
            .await;

        let (messages, watermark) = store.fetch_changed_since("ws-1", Some(t0)).await.unwrap();
        let ids: Vec<&str> = messages.iter().map(|m| m.message_id.as_str()).collect();
        assert_eq!(ids, vec!["m-2"]);
        assert_eq!(watermark, Some(t0 + Duration::seconds(5)));
    }

    #[tokio::test]
    async fn test_no_changes_returns_no_watermark() {
        let store = InMemoryMessageStore::new();
        let t0 = Utc::now();
        store.push_at(t0, message("m-1", "ws-1")).await;

        let (messages, watermark) = store.fetch_changed_since("ws-1", Some(t0)).await.unwrap();
        assert!(messages.is_empty());
        assert!(watermark.is_none());
    }
}
