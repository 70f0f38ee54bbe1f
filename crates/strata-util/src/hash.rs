use sha2::{Digest, Sha256};

/// Compute the SHA-256 hash of a byte slice, returning a lowercase hex string.
pub fn sha256_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

/// Format a digest the way lockfiles record it: `<algorithm>:<value>`.
pub fn prefixed_digest(algorithm: &str, value: &str) -> String {
    format!("{}:{}", algorithm.to_ascii_lowercase(), value)
}
