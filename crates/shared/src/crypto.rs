//! Content hashing for uploaded evidence.

use sha2::{Digest, Sha256};

/// Computes the SHA-256 digest of raw bytes and returns it as a lowercase hex string.
pub fn sha256_bytes_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Returns true if `data` hashes to `expected_hex` (case-insensitive).
pub fn verify_sha256(data: &[u8], expected_hex: &str) -> bool {
    sha256_bytes_hex(data).eq_ignore_ascii_case(expected_hex)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_bytes_hex_known_value() {
        let hash = sha256_bytes_hex(b"test");
        assert_eq!(hash.len(), 64);
        assert_eq!(
            hash,
            "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08"
        );
    }

    #[test]
    fn test_sha256_bytes_hex_empty() {
        assert_eq!(
            sha256_bytes_hex(&[]),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_sha256_bytes_hex_deterministic() {
        let bytes = vec![0u8, 1, 2, 3, 255, 254];
        assert_eq!(sha256_bytes_hex(&bytes), sha256_bytes_hex(&bytes.clone()));
    }

    #[test]
    fn test_sha256_bytes_hex_differs_on_content() {
        assert_ne!(sha256_bytes_hex(b"report v1"), sha256_bytes_hex(b"report v2"));
    }

    #[test]
    fn test_verify_sha256() {
        let hash = sha256_bytes_hex(b"evidence");
        assert!(verify_sha256(b"evidence", &hash));
        assert!(verify_sha256(b"evidence", &hash.to_uppercase()));
        assert!(!verify_sha256(b"tampered", &hash));
    }
}
