//! Query timeframe: a half-open window of wall-clock time.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Half-open time window `[start, end)` restricting a similarity query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeframe {
    /// Inclusive lower bound
    pub start: DateTime<Utc>,
    /// Exclusive upper bound
    pub end: DateTime<Utc>,
}

impl Timeframe {
    /// Build a timeframe from explicit bounds.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// The trailing window ending now, e.g. `Timeframe::last_days(60)`.
    pub fn last_days(days: i64) -> Self {
        let end = Utc::now();
        Self {
            start: end - Duration::days(days),
            end,
        }
    }

    /// The trailing window of whole hours ending now.
    pub fn last_hours(hours: i64) -> Self {
        let end = Utc::now();
        Self {
            start: end - Duration::hours(hours),
            end,
        }
    }

    /// Reject empty or inverted windows.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.end <= self.start {
            return Err(ValidationError::new(
                "timeframe",
                "end must be after start",
            ));
        }
        Ok(())
    }

    /// Whether a timestamp falls inside the window.
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.start <= ts && ts < self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_half_open() {
        let tf = Timeframe::last_days(1);
        assert!(tf.contains(tf.start));
        assert!(!tf.contains(tf.end));
        assert!(tf.contains(tf.start + Duration::hours(12)));
    }

    #[test]
    fn test_validate_rejects_inverted() {
        let now = Utc::now();
        let tf = Timeframe::new(now, now - Duration::hours(1));
        let err = tf.validate().unwrap_err();
        assert_eq!(err.field, "timeframe");
    }

    #[test]
    fn test_validate_rejects_empty() {
        let now = Utc::now();
        assert!(Timeframe::new(now, now).validate().is_err());
    }
}
