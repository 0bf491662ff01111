//! Content hash schemes: SHA-256, SHA-512 and BLAKE3.

use sha2::{Digest, Sha256, Sha512};

use crate::scheme::{ids, HashScheme};

/// SHA-256 (32-byte digest).
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Scheme;

impl HashScheme for Sha256Scheme {
    fn id(&self) -> &str {
        ids::SHA256
    }

    fn digest_len(&self) -> usize {
        32
    }

    fn hash(&self, data: &[u8]) -> Vec<u8> {
        Sha256::digest(data).to_vec()
    }
}

/// SHA-512 (64-byte digest).
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha512Scheme;

impl HashScheme for Sha512Scheme {
    fn id(&self) -> &str {
        ids::SHA512
    }

    fn digest_len(&self) -> usize {
        64
    }

    fn hash(&self, data: &[u8]) -> Vec<u8> {
        Sha512::digest(data).to_vec()
    }
}

/// BLAKE3 (32-byte digest).
#[derive(Debug, Clone, Copy, Default)]
pub struct Blake3Scheme;

impl HashScheme for Blake3Scheme {
    fn id(&self) -> &str {
        ids::BLAKE3
    }

    fn digest_len(&self) -> usize {
        32
    }

    fn hash(&self, data: &[u8]) -> Vec<u8> {
        blake3::hash(data).as_bytes().to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_known_vector() {
        let digest = Sha256Scheme.hash(b"abc");
        assert_eq!(
            hex::encode(digest),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_digest_lengths() {
        let data = b"module bytes";
        assert_eq!(Sha256Scheme.hash(data).len(), Sha256Scheme.digest_len());
        assert_eq!(Sha512Scheme.hash(data).len(), Sha512Scheme.digest_len());
        assert_eq!(Blake3Scheme.hash(data).len(), Blake3Scheme.digest_len());
    }

    #[test]
    fn test_hash_equals() {
        let data = b"module bytes";
        let digest = Blake3Scheme.hash(data);

        assert!(Blake3Scheme.hash_equals(data, &digest));
        assert!(!Blake3Scheme.hash_equals(b"other bytes", &digest));
        assert!(!Blake3Scheme.hash_equals(data, &digest[..16]));
    }
}
