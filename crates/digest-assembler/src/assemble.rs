//! Grouping ranked items into a digest.

use std::collections::HashMap;

use chrono::Utc;
use tracing::warn;
use ulid::Ulid;

use digest_types::{DigestResult, RankedItem, Timeframe, TopicGroup, TuningParams};

/// Group display-ordered ranked items into per-topic sections.
///
/// Items keep their ranking order inside each group; groups appear in
/// the order their best item ranks. Topics that end up with no items
/// are omitted, never shown empty.
///
/// Per-topic quotas are re-checked here even though selection already
/// enforces them: an over-quota group coming out of ranking is a bug,
/// and truncating (with a warning) beats shipping the violation to the
/// caller.
pub fn assemble(
    user_id: &str,
    timeframe: Timeframe,
    items: Vec<RankedItem>,
    params: &TuningParams,
) -> DigestResult {
    let mut order: Vec<String> = Vec::new();
    let mut grouped: HashMap<String, Vec<RankedItem>> = HashMap::new();
    for item in items {
        if !grouped.contains_key(&item.topic) {
            order.push(item.topic.clone());
        }
        grouped.entry(item.topic.clone()).or_default().push(item);
    }

    let topics = order
        .into_iter()
        .map(|topic| {
            let mut items = grouped.remove(&topic).unwrap_or_default();
            if let Some(quota) = params.quota_for(&topic) {
                if items.len() > quota {
                    warn!(
                        topic = %topic,
                        items = items.len(),
                        quota,
                        "ranked group exceeds its topic quota; truncating"
                    );
                    items.truncate(quota);
                }
            }
            TopicGroup { topic, items }
        })
        .filter(|group| !group.items.is_empty())
        .collect();

    DigestResult {
        digest_id: Ulid::new().to_string(),
        user_id: user_id.to_string(),
        timeframe,
        generated_at: Utc::now(),
        topics,
    }
}
