//! Content digests recorded on snapshots

use sha2::{Digest, Sha256};

/// SHA-256 of fetched content, hex-encoded (64 chars)
pub fn content_digest(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}
