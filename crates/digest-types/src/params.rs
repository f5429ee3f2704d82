//! Ranking knobs with global, per-user, and per-call scoping.
//!
//! `TuningParams` is a fully-resolved set of knob values; `TuningOverride`
//! is a sparse set used for per-user overrides and call-scoped knobs.
//! Resolution merges field-by-field: user over global, call over user.
//! Every write path validates against the field domains below and rejects
//! with a [`ValidationError`] naming the field - values are never clamped.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use crate::error::ValidationError;

/// Serialize durations as whole seconds on the wire and in config files.
mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Duration, D::Error> {
        let secs = u64::deserialize(de)?;
        Ok(Duration::from_secs(secs))
    }
}

mod duration_secs_opt {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Option<Duration>, ser: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) => ser.serialize_some(&d.as_secs()),
            None => ser.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Option<Duration>, D::Error> {
        let secs = Option::<u64>::deserialize(de)?;
        Ok(secs.map(Duration::from_secs))
    }
}

/// A fully-resolved set of ranking knobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TuningParams {
    /// Maximum number of items in one ranked result. Must be > 0.
    pub top_k: usize,

    /// Raw-similarity floor applied before decay. Must be in [-1, 1].
    pub min_relevance: f32,

    /// Half-life of the recency decay, in seconds on the wire. Must be > 0.
    #[serde(with = "duration_secs")]
    pub recency_half_life: Duration,

    /// Relevance/diversity balance for the greedy selection. Must be in
    /// [0, 1]: 1 = pure relevance, 0 = maximum diversity.
    pub diversity_lambda: f32,

    /// Per-topic cap on result membership. Absent topics are uncapped.
    #[serde(default)]
    pub topic_quota: HashMap<String, usize>,

    /// Per-topic interest boost: weighted = decayed * (1 + weight).
    /// Absent topics take weight 0. Each weight must be >= 0.
    #[serde(default)]
    pub user_interest_weight: HashMap<String, f32>,
}

impl Default for TuningParams {
    fn default() -> Self {
        Self {
            top_k: 20,
            min_relevance: 0.0,
            recency_half_life: Duration::from_secs(72 * 3600),
            diversity_lambda: 0.7,
            topic_quota: HashMap::new(),
            user_interest_weight: HashMap::new(),
        }
    }
}

impl TuningParams {
    /// Check every field against its domain.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.top_k == 0 {
            return Err(ValidationError::new("top_k", "must be greater than zero"));
        }
        if !self.min_relevance.is_finite() || !(-1.0..=1.0).contains(&self.min_relevance) {
            return Err(ValidationError::new("min_relevance", "must be in [-1, 1]"));
        }
        if self.recency_half_life.is_zero() {
            return Err(ValidationError::new(
                "recency_half_life",
                "must be a positive duration",
            ));
        }
        if !self.diversity_lambda.is_finite() || !(0.0..=1.0).contains(&self.diversity_lambda) {
            return Err(ValidationError::new("diversity_lambda", "must be in [0, 1]"));
        }
        for (topic, weight) in &self.user_interest_weight {
            if !weight.is_finite() || *weight < 0.0 {
                return Err(ValidationError::new(
                    format!("user_interest_weight.{topic}"),
                    "must be finite and >= 0",
                ));
            }
        }
        Ok(())
    }

    /// Interest boost for a topic; absent topics take no boost.
    pub fn interest_weight(&self, topic: &str) -> f32 {
        self.user_interest_weight.get(topic).copied().unwrap_or(0.0)
    }

    /// Result cap for a topic, if one is configured.
    pub fn quota_for(&self, topic: &str) -> Option<usize> {
        self.topic_quota.get(topic).copied()
    }

    /// Topics with a positive interest weight, in sorted order. These seed
    /// the query vectors for a personalized search.
    pub fn interest_topics(&self) -> Vec<String> {
        let mut topics: Vec<String> = self
            .user_interest_weight
            .iter()
            .filter(|(_, w)| **w > 0.0)
            .map(|(t, _)| t.clone())
            .collect();
        topics.sort();
        topics
    }

    /// Apply a sparse override on top of these params, field-by-field.
    pub fn merged(&self, patch: &TuningOverride) -> TuningParams {
        TuningParams {
            top_k: patch.top_k.unwrap_or(self.top_k),
            min_relevance: patch.min_relevance.unwrap_or(self.min_relevance),
            recency_half_life: patch.recency_half_life.unwrap_or(self.recency_half_life),
            diversity_lambda: patch.diversity_lambda.unwrap_or(self.diversity_lambda),
            topic_quota: patch
                .topic_quota
                .clone()
                .unwrap_or_else(|| self.topic_quota.clone()),
            user_interest_weight: patch
                .user_interest_weight
                .clone()
                .unwrap_or_else(|| self.user_interest_weight.clone()),
        }
    }
}

/// A sparse set of knob values: unset fields fall through to the next
/// scope (call -> user -> global).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TuningOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_relevance: Option<f32>,

    /// Seconds on the wire, like the resolved field.
    #[serde(default, with = "duration_secs_opt", skip_serializing_if = "Option::is_none")]
    pub recency_half_life: Option<Duration>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diversity_lambda: Option<f32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic_quota: Option<HashMap<String, usize>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_interest_weight: Option<HashMap<String, f32>>,
}

impl TuningOverride {
    /// Whether no field is set.
    pub fn is_empty(&self) -> bool {
        self.top_k.is_none()
            && self.min_relevance.is_none()
            && self.recency_half_life.is_none()
            && self.diversity_lambda.is_none()
            && self.topic_quota.is_none()
            && self.user_interest_weight.is_none()
    }

    /// Validate only the fields that are set, with the same domains as
    /// [`TuningParams::validate`].
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(top_k) = self.top_k {
            if top_k == 0 {
                return Err(ValidationError::new("top_k", "must be greater than zero"));
            }
        }
        if let Some(min_relevance) = self.min_relevance {
            if !min_relevance.is_finite() || !(-1.0..=1.0).contains(&min_relevance) {
                return Err(ValidationError::new("min_relevance", "must be in [-1, 1]"));
            }
        }
        if let Some(half_life) = self.recency_half_life {
            if half_life.is_zero() {
                return Err(ValidationError::new(
                    "recency_half_life",
                    "must be a positive duration",
                ));
            }
        }
        if let Some(lambda) = self.diversity_lambda {
            if !lambda.is_finite() || !(0.0..=1.0).contains(&lambda) {
                return Err(ValidationError::new("diversity_lambda", "must be in [0, 1]"));
            }
        }
        if let Some(weights) = &self.user_interest_weight {
            for (topic, weight) in weights {
                if !weight.is_finite() || *weight < 0.0 {
                    return Err(ValidationError::new(
                        format!("user_interest_weight.{topic}"),
                        "must be finite and >= 0",
                    ));
                }
            }
        }
        Ok(())
    }
}
