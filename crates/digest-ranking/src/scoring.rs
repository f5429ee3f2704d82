//! Pure scoring math: recency decay and interest weighting.
//!
//! Everything here is deterministic in its inputs. The engine passes a
//! single `now` so that every candidate in one query decays against the
//! same clock.

use std::time::Duration;

use chrono::{DateTime, Utc};

use digest_types::{Embedding, RankedItem, TuningParams};
use digest_vector::ScoredPoint;

/// A candidate carried through selection: the scored item plus the
/// stored vector needed for pairwise redundancy checks.
#[derive(Debug, Clone)]
pub struct ScoredCandidate {
    pub item: RankedItem,
    pub embedding: Embedding,
}

/// Multiplier in (0, 1] applied to similarity for a message of the
/// given age. Halves once per `half_life` elapsed. Future-dated
/// timestamps clamp to age zero rather than boosting past 1.
pub fn decay_factor(now: DateTime<Utc>, ts: DateTime<Utc>, half_life: Duration) -> f32 {
    let age_secs = (now - ts).num_milliseconds().max(0) as f64 / 1000.0;
    let half_life_secs = half_life.as_secs_f64();
    0.5_f64.powf(age_secs / half_life_secs) as f32
}

/// Score raw query hits against one user's resolved params:
/// `decayed = similarity * 0.5^(age / half_life)`, then
/// `weighted = decayed * (1 + interest_weight(topic))`.
pub fn score_candidates(
    hits: Vec<ScoredPoint>,
    params: &TuningParams,
    now: DateTime<Utc>,
) -> Vec<ScoredCandidate> {
    hits.into_iter()
        .map(|hit| {
            let topic = hit.primary_topic().to_string();
            let decayed = hit.similarity * decay_factor(now, hit.ts, params.recency_half_life);
            let weighted = decayed * (1.0 + params.interest_weight(&topic));
            ScoredCandidate {
                item: RankedItem {
                    message_id: hit.message_id,
                    topic,
                    similarity: hit.similarity,
                    decayed_score: decayed,
                    weighted_score: weighted,
                    ts: hit.ts,
                },
                embedding: hit.embedding,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;
    use std::collections::HashMap;

    fn hit(id: &str, topics: Vec<&str>, similarity: f32, age_hours: i64) -> ScoredPoint {
        ScoredPoint {
            message_id: id.to_string(),
            channel_id: "ch-1".to_string(),
            topics: topics.into_iter().map(String::from).collect(),
            ts: Utc::now() - ChronoDuration::hours(age_hours),
            similarity,
            embedding: Embedding::new(vec![1.0, 0.0]),
        }
    }

    #[test]
    fn test_decay_halves_per_half_life() {
        let now = Utc::now();
        let half_life = Duration::from_secs(72 * 3600);

        let one = decay_factor(now, now - ChronoDuration::hours(72), half_life);
        assert!((one - 0.5).abs() < 1e-4, "one half-life: {one}");

        let two = decay_factor(now, now - ChronoDuration::hours(144), half_life);
        assert!((two - 0.25).abs() < 1e-4, "two half-lives: {two}");
    }

    #[test]
    fn test_decay_clamps_future_timestamps() {
        let now = Utc::now();
        let half_life = Duration::from_secs(3600);
        let factor = decay_factor(now, now + ChronoDuration::hours(5), half_life);
        assert_eq!(factor, 1.0);
    }

    #[test]
    fn test_huge_half_life_is_a_noop() {
        let now = Utc::now();
        let half_life = Duration::from_secs(u64::MAX / 1000);
        let factor = decay_factor(now, now - ChronoDuration::days(365), half_life);
        assert!(factor > 0.9999);
    }

    #[test]
    fn test_newer_message_decays_less() {
        let now = Utc::now();
        let half_life = Duration::from_secs(24 * 3600);
        let newer = decay_factor(now, now - ChronoDuration::hours(2), half_life);
        let older = decay_factor(now, now - ChronoDuration::hours(20), half_life);
        assert!(newer > older);
    }

    #[test]
    fn test_interest_weight_boosts_matching_topic() {
        let params = TuningParams {
            recency_half_life: Duration::from_secs(u64::MAX / 1000),
            user_interest_weight: HashMap::from([("power".to_string(), 1.0)]),
            ..TuningParams::default()
        };
        let now = Utc::now();

        let scored = score_candidates(
            vec![hit("m-1", vec!["power"], 0.8, 0), hit("m-2", vec!["firmware"], 0.8, 0)],
            &params,
            now,
        );

        let by_id: HashMap<&str, f32> = scored
            .iter()
            .map(|c| (c.item.message_id.as_str(), c.item.weighted_score))
            .collect();
        assert!((by_id["m-1"] - 1.6).abs() < 1e-4);
        assert!((by_id["m-2"] - 0.8).abs() < 1e-4);
    }

    #[test]
    fn test_unlabeled_hits_rank_under_general() {
        let params = TuningParams::default();
        let scored = score_candidates(vec![hit("m-1", vec![], 0.5, 0)], &params, Utc::now());
        assert_eq!(scored[0].item.topic, "general");
        // no boost unless general is explicitly configured
        assert!((scored[0].item.weighted_score - scored[0].item.decayed_score).abs() < 1e-6);
    }

    #[test]
    fn test_scores_carry_raw_similarity_through() {
        let params = TuningParams::default();
        let scored = score_candidates(vec![hit("m-1", vec!["power"], 0.73, 1)], &params, Utc::now());
        assert_eq!(scored[0].item.similarity, 0.73);
        assert!(scored[0].item.decayed_score <= 0.73);
    }
}
