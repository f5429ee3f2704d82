//! Greedy diversity selection with per-topic quotas.
//!
//! Maximal marginal relevance: each round picks the candidate that
//! maximizes `lambda * weighted - (1 - lambda) * max_sim_to_selected`,
//! skipping candidates whose topic already filled its quota. The
//! tie-break chain (higher weighted score, then earlier timestamp, then
//! smaller message id) makes selection fully deterministic.

use std::cmp::Ordering;
use std::collections::HashMap;

use digest_types::{RankedItem, TuningParams};

use crate::scoring::ScoredCandidate;

/// Select up to `top_k` candidates balancing relevance against
/// redundancy, honoring per-topic quotas. Returns items in selection
/// order; quotas that make `top_k` unreachable yield a short result,
/// never padding.
pub fn select_diverse(candidates: Vec<ScoredCandidate>, params: &TuningParams) -> Vec<RankedItem> {
    let mut remaining = candidates;
    let mut selected: Vec<ScoredCandidate> = Vec::new();
    let mut topic_counts: HashMap<String, usize> = HashMap::new();

    while selected.len() < params.top_k {
        let Some(pos) = pick_next(&remaining, &selected, &topic_counts, params) else {
            break;
        };
        let picked = remaining.remove(pos);
        *topic_counts.entry(picked.item.topic.clone()).or_insert(0) += 1;
        selected.push(picked);
    }

    selected.into_iter().map(|c| c.item).collect()
}

/// Sort items into display order: weighted score descending, ties by
/// earlier timestamp, then message id.
pub fn sort_display(items: &mut [RankedItem]) {
    items.sort_by(|a, b| {
        b.weighted_score
            .partial_cmp(&a.weighted_score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.ts.cmp(&b.ts))
            .then_with(|| a.message_id.cmp(&b.message_id))
    });
}

/// Position of the next winner among `remaining`, or `None` when every
/// remaining candidate is quota-capped.
fn pick_next(
    remaining: &[ScoredCandidate],
    selected: &[ScoredCandidate],
    topic_counts: &HashMap<String, usize>,
    params: &TuningParams,
) -> Option<usize> {
    let lambda = params.diversity_lambda;
    let mut best: Option<(usize, f32)> = None;

    for (pos, candidate) in remaining.iter().enumerate() {
        if topic_full(&candidate.item.topic, topic_counts, params) {
            continue;
        }
        let redundancy = max_similarity_to_selected(candidate, selected);
        let mmr = lambda * candidate.item.weighted_score - (1.0 - lambda) * redundancy;

        let wins = match best {
            None => true,
            Some((best_pos, best_mmr)) => {
                beats(mmr, &candidate.item, best_mmr, &remaining[best_pos].item)
            }
        };
        if wins {
            best = Some((pos, mmr));
        }
    }

    best.map(|(pos, _)| pos)
}

fn topic_full(topic: &str, topic_counts: &HashMap<String, usize>, params: &TuningParams) -> bool {
    match params.quota_for(topic) {
        Some(quota) => topic_counts.get(topic).copied().unwrap_or(0) >= quota,
        None => false,
    }
}

/// Highest cosine similarity between `candidate` and anything already
/// selected; 0 when nothing is selected yet, so the first round is pure
/// relevance.
fn max_similarity_to_selected(candidate: &ScoredCandidate, selected: &[ScoredCandidate]) -> f32 {
    selected
        .iter()
        .map(|s| candidate.embedding.cosine_similarity(&s.embedding))
        .max_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal))
        .unwrap_or(0.0)
}

/// Strict comparison under the deterministic tie-break chain.
fn beats(mmr: f32, item: &RankedItem, best_mmr: f32, best_item: &RankedItem) -> bool {
    if mmr != best_mmr {
        return mmr > best_mmr;
    }
    if item.weighted_score != best_item.weighted_score {
        return item.weighted_score > best_item.weighted_score;
    }
    if item.ts != best_item.ts {
        return item.ts < best_item.ts;
    }
    item.message_id < best_item.message_id
}
