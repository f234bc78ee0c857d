//! Revision fingerprints for published documents.

use sha2::{Digest, Sha256};

/// Calculate the SHA-256 fingerprint of a fetched payload.
///
/// # Arguments
/// * `content` - Raw bytes as published
///
/// # Returns
/// Hexadecimal string representation of the SHA-256 hash.
pub fn calculate_revision(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    let result = hasher.finalize();
    hex::encode(result)
}
