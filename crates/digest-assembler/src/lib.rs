//! # digest-assembler
//!
//! Turns a display-ordered ranked list into a [`DigestResult`]: items
//! grouped by topic, groups ordered by their best item, per-topic
//! quotas re-checked as a last line of defense. Plain data out; message
//! rendering belongs to the caller.
//!
//! [`DigestResult`]: digest_types::DigestResult

pub mod assemble;

pub use assemble::assemble;
