//! Content hashing for shard updates.
//!
//! SHA-256 over the compact JSON serialization of an element lets the update
//! pass tell whether a re-exported record actually differs from what its
//! slot already holds.

use serde::Serialize;
use sha2::{Digest, Sha256};

/// Compute a SHA-256 hash of a serializable value.
///
/// # Errors
///
/// Returns an error if the value cannot be serialized to JSON.
pub fn content_hash<T: Serialize>(value: &T) -> serde_json::Result<String> {
    let json = serde_json::to_string(value)?;
    Ok(bytes_hash(json.as_bytes()))
}

/// SHA-256 of raw bytes as lowercase hex.
#[must_use]
pub fn bytes_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Check if content has changed relative to a stored hash.
///
/// Returns `true` when there is no stored hash or the hashes differ.
#[must_use]
pub fn has_changed(current_hash: &str, stored_hash: Option<&str>) -> bool {
    stored_hash.is_none_or(|h| h != current_hash)
}
