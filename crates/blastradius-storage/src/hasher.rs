//! Content hashing: xxh3 for change detection, sha-256 for the project
//! configuration. Security is not a requirement on the per-file side;
//! change detection is.

use sha2::{Digest, Sha256};
use xxhash_rust::xxh3::xxh3_64;

/// Fast fixed-size digest of file content, as 16 hex digits.
pub fn hash_content(content: &[u8]) -> String {
    format!("{:016x}", xxh3_64(content))
}

/// Cryptographic hash of the project-configuration text.
pub fn hash_project_config(text: &str) -> String {
    let digest = Sha256::digest(text.as_bytes());
    let mut hex = String::with_capacity(64);
    for byte in digest {
        hex.push_str(&format!("{byte:02x}"));
    }
    hex
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_hash_is_stable_and_sized() {
        let a = hash_content(b"export const x = 1;");
        assert_eq!(a, hash_content(b"export const x = 1;"));
        assert_eq!(a.len(), 16);
        assert_ne!(a, hash_content(b"export const x = 2;"));
    }

    #[test]
    fn project_hash_is_sha256_hex() {
        let h = hash_project_config("{}");
        assert_eq!(h.len(), 64);
        assert_ne!(h, hash_project_config("{ }"));
    }
}
