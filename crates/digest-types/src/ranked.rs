//! Query-side output shapes: ranked items and per-topic digest groups.
//!
//! Both are transient - computed per query, never persisted by the engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timeframe::Timeframe;

/// One scored match in a ranked result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedItem {
    /// Message this score belongs to
    pub message_id: String,

    /// Topic the item ranks under
    pub topic: String,

    /// Raw cosine similarity against the query, in [-1, 1]
    pub similarity: f32,

    /// Similarity after recency decay
    pub decayed_score: f32,

    /// Final composite score after interest weighting; display order
    pub weighted_score: f32,

    /// Source timestamp, carried for deterministic tie-breaking
    pub ts: DateTime<Utc>,
}

/// Ranked items sharing one topic, in display order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicGroup {
    pub topic: String,
    pub items: Vec<RankedItem>,
}

/// A personalized digest: per-topic groups of ranked items for one user
/// over one timeframe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DigestResult {
    /// Identifier of this digest generation (ULID)
    pub digest_id: String,

    /// User the digest was ranked for
    pub user_id: String,

    /// Window the candidates were drawn from
    pub timeframe: Timeframe,

    /// When the digest was assembled
    pub generated_at: DateTime<Utc>,

    /// Topic groups ordered by their best item; empty topics are omitted
    pub topics: Vec<TopicGroup>,
}

impl DigestResult {
    /// Total items across all topic groups.
    pub fn total_items(&self) -> usize {
        self.topics.iter().map(|g| g.items.len()).sum()
    }

    /// Whether the digest carries no items at all.
    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    /// Items flattened back into display order across groups.
    pub fn all_items(&self) -> impl Iterator<Item = &RankedItem> {
        self.topics.iter().flat_map(|g| g.items.iter())
    }
}
