//! Checksum validation for migrations
//!
//! Computes SHA256 checksums of migration SQL to detect edits to migrations
//! that were already applied

use sha2::{Digest, Sha256};

/// Compute SHA256 checksum of a string
pub fn compute_checksum(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_deterministic() {
        let checksum1 = compute_checksum("SELECT 1");
        let checksum2 = compute_checksum("SELECT 1");
        assert_eq!(checksum1, checksum2);
        assert_eq!(checksum1.len(), 64);
    }
}
