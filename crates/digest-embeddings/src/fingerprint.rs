//! Content fingerprints for idempotent ingestion.
//!
//! A fingerprint is the SHA-256 hex digest of the normalized message
//! text. Two messages with the same fingerprint embed identically, so
//! re-ingesting unchanged content is a no-op and identical texts inside
//! one batch share a single provider call.

use sha2::{Digest, Sha256};

/// Normalize text for fingerprinting: trim, lowercase, collapse runs of
/// internal whitespace to single spaces.
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// SHA-256 hex digest of the normalized text.
pub fn fingerprint(text: &str) -> String {
    let normalized = normalize_text(text);
    let mut hasher = Sha256::new();
    hasher.update(normalized.as_bytes());
    let digest = hasher.finalize();

    let mut hex = String::with_capacity(64);
    for byte in digest {
        use std::fmt::Write;
        let _ = write!(hex, "{:02x}", byte);
    }
    hex
}
