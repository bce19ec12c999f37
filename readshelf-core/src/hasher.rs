//! Content fingerprinting for duplicate detection

use crate::types::ContentFingerprint;
use sha2::{Digest, Sha256};

/// Compute the SHA-256 fingerprint of a book file's bytes
pub fn fingerprint(data: &[u8]) -> ContentFingerprint {
    let mut hasher = Sha256::new();
    hasher.update(data);
    ContentFingerprint::from_digest(hex::encode(hasher.finalize()))
}
