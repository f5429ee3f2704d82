//! Message type for chat content flowing into the engine.
//!
//! Messages are owned by the external message store. The engine reads them
//! during ingestion and never mutates their content; only topic labels may
//! be refreshed by re-ingesting after the upstream classifier relabels.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Topic bucket for messages the upstream classifier left unlabeled.
///
/// The general topic takes no interest boost and no quota unless one is
/// configured explicitly, so classifier gaps never hide content.
pub const GENERAL_TOPIC: &str = "general";

/// A chat message.
///
/// Immutable once ingested except for topic re-labeling. The source
/// timestamp orders messages, not ingestion time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Unique identifier within the workspace
    pub message_id: String,

    /// Tenant boundary this message belongs to
    pub workspace_id: String,

    /// Channel the message was posted in
    pub channel_id: String,

    /// Author of the message
    pub author_id: String,

    /// Raw message text
    pub text: String,

    /// Parent thread identifier, if the message is a thread reply
    #[serde(default)]
    pub thread_id: Option<String>,

    /// Source timestamp (when the message was posted)
    pub ts: DateTime<Utc>,

    /// Topic labels assigned by the external classifier; may be empty
    #[serde(default)]
    pub topics: Vec<String>,
}

impl Message {
    /// Create a message with no thread parent and no topic labels.
    pub fn new(
        message_id: impl Into<String>,
        workspace_id: impl Into<String>,
        channel_id: impl Into<String>,
        author_id: impl Into<String>,
        text: impl Into<String>,
        ts: DateTime<Utc>,
    ) -> Self {
        Self {
            message_id: message_id.into(),
            workspace_id: workspace_id.into(),
            channel_id: channel_id.into(),
            author_id: author_id.into(),
            text: text.into(),
            thread_id: None,
            ts,
            topics: Vec::new(),
        }
    }

    /// Attach topic labels.
    pub fn with_topics(mut self, topics: Vec<String>) -> Self {
        self.topics = topics;
        self
    }

    /// Mark the message as a reply within a thread.
    pub fn with_thread_id(mut self, thread_id: impl Into<String>) -> Self {
        self.thread_id = Some(thread_id.into());
        self
    }

    /// The topic this message ranks under: its first label, or the
    /// general bucket when the classifier assigned none.
    pub fn primary_topic(&self) -> &str {
        self.topics
            .first()
            .map(|t| t.as_str())
            .unwrap_or(GENERAL_TOPIC)
    }
}
