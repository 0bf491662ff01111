//! Scheme traits and the tagged `Scheme` variant.
//!
//! Every scheme is a pure function family over byte slices. Key material is
//! passed in by the caller on each call and never retained.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;

use crate::error::Result;
use crate::keys::KeyMaterial;

/// Stable identifiers of the built-in schemes.
pub mod ids {
    pub const SHA256: &str = "SHA256";
    pub const SHA512: &str = "SHA512";
    pub const BLAKE3: &str = "BLAKE3";
    pub const HMAC_SHA256: &str = "HmacSHA256";
    pub const HMAC_SHA512: &str = "HmacSHA512";
    pub const ED25519: &str = "Ed25519";
    pub const CHACHA20_POLY1305: &str = "ChaCha20-Poly1305";
}

/// The algorithm family a scheme belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SchemeFamily {
    Hash,
    Mac,
    Signature,
    Cipher,
}

impl fmt::Display for SchemeFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SchemeFamily::Hash => "hash",
            SchemeFamily::Mac => "mac",
            SchemeFamily::Signature => "signature",
            SchemeFamily::Cipher => "cipher",
        };
        f.write_str(name)
    }
}

/// Content hash scheme.
pub trait HashScheme: Send + Sync {
    /// Registry identifier.
    fn id(&self) -> &str;

    /// Length of the produced digest in bytes.
    fn digest_len(&self) -> usize;

    /// Hash the given data.
    fn hash(&self, data: &[u8]) -> Vec<u8>;

    /// Recompute the digest of `data` and compare it with `expected` in
    /// constant time.
    fn hash_equals(&self, data: &[u8], expected: &[u8]) -> bool {
        constant_time_eq(&self.hash(data), expected)
    }
}

/// Keyed message authentication scheme.
pub trait MacScheme: Send + Sync {
    /// Registry identifier.
    fn id(&self) -> &str;

    /// Compute the tag of `data`.
    fn mac(&self, key: &KeyMaterial, data: &[u8]) -> Result<Vec<u8>>;

    /// Check `tag` against `data`. A mismatch is `Ok(false)`.
    fn verify(&self, key: &KeyMaterial, data: &[u8], tag: &[u8]) -> Result<bool>;
}

/// Asymmetric signature scheme.
pub trait SignatureScheme: Send + Sync {
    /// Registry identifier.
    fn id(&self) -> &str;

    /// Sign `data` with a private key.
    fn sign(&self, key: &KeyMaterial, data: &[u8]) -> Result<Vec<u8>>;

    /// Check `signature` against `data`. A mismatch is `Ok(false)`; bytes
    /// that cannot be a signature at all are an error.
    fn verify(&self, key: &KeyMaterial, data: &[u8], signature: &[u8]) -> Result<bool>;
}

/// Authenticated symmetric cipher.
pub trait CipherScheme: Send + Sync {
    /// Registry identifier.
    fn id(&self) -> &str;

    /// Nonce length in bytes.
    fn nonce_len(&self) -> usize;

    /// Produce a fresh random nonce.
    fn generate_nonce(&self) -> Vec<u8>;

    /// Encrypt and authenticate `plaintext`.
    fn seal(&self, key: &KeyMaterial, nonce: &[u8], plaintext: &[u8]) -> Result<Vec<u8>>;

    /// Decrypt `ciphertext`. `Ok(None)` means the authentication tag did not
    /// match.
    fn open(&self, key: &KeyMaterial, nonce: &[u8], ciphertext: &[u8]) -> Result<Option<Vec<u8>>>;
}

/// A resolved scheme of any family.
#[derive(Clone)]
pub enum Scheme {
    Hash(Arc<dyn HashScheme>),
    Mac(Arc<dyn MacScheme>),
    Signature(Arc<dyn SignatureScheme>),
    Cipher(Arc<dyn CipherScheme>),
}

impl Scheme {
    /// The scheme's registry identifier.
    pub fn id(&self) -> &str {
        match self {
            Scheme::Hash(s) => s.id(),
            Scheme::Mac(s) => s.id(),
            Scheme::Signature(s) => s.id(),
            Scheme::Cipher(s) => s.id(),
        }
    }

    /// The scheme's family.
    pub fn family(&self) -> SchemeFamily {
        match self {
            Scheme::Hash(_) => SchemeFamily::Hash,
            Scheme::Mac(_) => SchemeFamily::Mac,
            Scheme::Signature(_) => SchemeFamily::Signature,
            Scheme::Cipher(_) => SchemeFamily::Cipher,
        }
    }
}

impl fmt::Debug for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Scheme({}:{})", self.family(), self.id())
    }
}

/// Compare two byte strings without early exit.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && bool::from(a.ct_eq(b))
}
