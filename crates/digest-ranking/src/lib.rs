//! # digest-ranking
//!
//! The ranking engine: turns stored vectors into a personalized,
//! quota-bounded, diversity-aware ordering for one user and timeframe.
//!
//! A search runs in stages:
//! 1. resolve tuning scopes (global, per-user, call-scoped knobs)
//! 2. embed the user's interest topics into query vectors
//! 3. fan out one nearest-neighbor query per topic, concurrently
//! 4. merge hits by best similarity, decay by age, boost by interest
//! 5. greedily select for diversity under per-topic quotas
//!
//! The whole path is read-only; any number of searches run in parallel.
//! [`scoring`] and [`selection`] are pure and separately testable,
//! [`RankingEngine`] wires them to the store and provider.

pub mod engine;
pub mod error;
pub mod scoring;
pub mod selection;

pub use engine::RankingEngine;
pub use error::RankingError;
pub use scoring::ScoredCandidate;
