//! Content-derived names.

use sha2::{Digest, Sha256};

/// Lowercase hex SHA-256 of the concatenation of `parts`.
pub fn sha256_hex(parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part.as_bytes());
    }
    format!("{:x}", hasher.finalize())
}
