//! Key material and key resolution.
//!
//! Operations never own keys. They hold a [`KeyReference`] and ask a
//! [`KeyResolver`] for the material on every invocation.

use std::collections::HashMap;
use std::fmt;
use std::sync::RwLock;

use ed25519_dalek::SigningKey;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::error::{CryptoError, Result};

/// Name of a key known to a [`KeyResolver`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyReference(String);

impl KeyReference {
    /// Create a reference from a key name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The key name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for KeyReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for KeyReference {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for KeyReference {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// Key material handed to a scheme.
///
/// Secret variants are zeroized on drop.
#[derive(Clone)]
pub enum KeyMaterial {
    /// Symmetric secret for MAC and cipher schemes.
    Secret(Zeroizing<Vec<u8>>),

    /// Ed25519 private seed. Can sign and verify.
    Ed25519Signing(Zeroizing<[u8; 32]>),

    /// Ed25519 public key. Can only verify.
    Ed25519Verifying([u8; 32]),
}

impl KeyMaterial {
    /// Wrap symmetric secret bytes.
    pub fn secret(bytes: impl Into<Vec<u8>>) -> Self {
        KeyMaterial::Secret(Zeroizing::new(bytes.into()))
    }

    /// Generate a random symmetric secret of `len` bytes.
    pub fn generate_secret(len: usize) -> Self {
        let mut bytes = vec![0u8; len];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self::secret(bytes)
    }

    /// Wrap an Ed25519 private seed.
    pub fn ed25519_signing(seed: [u8; 32]) -> Self {
        KeyMaterial::Ed25519Signing(Zeroizing::new(seed))
    }

    /// Wrap an Ed25519 public key.
    pub fn ed25519_verifying(public: [u8; 32]) -> Self {
        KeyMaterial::Ed25519Verifying(public)
    }

    /// Generate a fresh Ed25519 signing key.
    pub fn generate_ed25519() -> Self {
        let signing_key = SigningKey::generate(&mut rand::thread_rng());
        Self::ed25519_signing(signing_key.to_bytes())
    }

    /// The Ed25519 public key, when this material carries one.
    pub fn ed25519_public(&self) -> Option<[u8; 32]> {
        match self {
            KeyMaterial::Ed25519Signing(seed) => {
                Some(SigningKey::from_bytes(seed).verifying_key().to_bytes())
            }
            KeyMaterial::Ed25519Verifying(public) => Some(*public),
            KeyMaterial::Secret(_) => None,
        }
    }

    /// Public-only view of this material. Secrets have none.
    pub fn to_verifying(&self) -> Option<Self> {
        self.ed25519_public().map(Self::ed25519_verifying)
    }

    /// Short name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            KeyMaterial::Secret(_) => "secret",
            KeyMaterial::Ed25519Signing(_) => "ed25519-signing",
            KeyMaterial::Ed25519Verifying(_) => "ed25519-verifying",
        }
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyMaterial::Secret(bytes) => write!(f, "KeyMaterial::Secret({} bytes)", bytes.len()),
            KeyMaterial::Ed25519Signing(_) => match self.ed25519_public() {
                Some(public) => write!(f, "KeyMaterial::Ed25519Signing({})", &hex::encode(public)[..16]),
                None => f.write_str("KeyMaterial::Ed25519Signing"),
            },
            KeyMaterial::Ed25519Verifying(public) => {
                write!(f, "KeyMaterial::Ed25519Verifying({})", &hex::encode(public)[..16])
            }
        }
    }
}

/// Resolves key references to key material.
///
/// Implementations must be thread-safe; pipelines call `resolve` from any
/// thread on every invocation.
pub trait KeyResolver: Send + Sync {
    /// Look up the material for `reference`.
    fn resolve(&self, reference: &KeyReference) -> Result<KeyMaterial>;
}

/// In-memory key store.
#[derive(Default)]
pub struct KeyRing {
    keys: RwLock<HashMap<KeyReference, KeyMaterial>>,
}

impl KeyRing {
    /// Create an empty key ring.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a key. Returns the previous material, if any.
    pub fn insert(&self, reference: impl Into<KeyReference>, key: KeyMaterial) -> Option<KeyMaterial> {
        let mut keys = self.keys.write().unwrap_or_else(|e| e.into_inner());
        keys.insert(reference.into(), key)
    }

    /// Builder-style insert.
    pub fn with_key(self, reference: impl Into<KeyReference>, key: KeyMaterial) -> Self {
        self.insert(reference, key);
        self
    }

    /// Remove a key.
    pub fn remove(&self, reference: &KeyReference) -> Option<KeyMaterial> {
        let mut keys = self.keys.write().unwrap_or_else(|e| e.into_inner());
        keys.remove(reference)
    }

    /// Whether a key is present.
    pub fn contains(&self, reference: &KeyReference) -> bool {
        let keys = self.keys.read().unwrap_or_else(|e| e.into_inner());
        keys.contains_key(reference)
    }

    /// Number of keys held.
    pub fn len(&self) -> usize {
        let keys = self.keys.read().unwrap_or_else(|e| e.into_inner());
        keys.len()
    }

    /// Whether the ring is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyResolver for KeyRing {
    fn resolve(&self, reference: &KeyReference) -> Result<KeyMaterial> {
        let keys = self.keys.read().unwrap_or_else(|e| e.into_inner());
        keys.get(reference)
            .cloned()
            .ok_or_else(|| CryptoError::KeyNotFound(reference.to_string()))
    }
}

impl fmt::Debug for KeyRing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyRing({} keys)", self.len())
    }
}
