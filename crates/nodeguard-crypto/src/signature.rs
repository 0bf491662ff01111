//! Asymmetric signature schemes.
//!
//! Wraps Ed25519 signing from ed25519-dalek.

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};

use crate::error::{CryptoError, Result};
use crate::keys::KeyMaterial;
use crate::scheme::{ids, SignatureScheme};

/// Ed25519 signatures (64 bytes).
#[derive(Debug, Clone, Copy, Default)]
pub struct Ed25519Scheme;

impl Ed25519Scheme {
    /// Signature length in bytes.
    pub const SIGNATURE_LEN: usize = 64;

    fn verifying_key(&self, key: &KeyMaterial) -> Result<VerifyingKey> {
        match key {
            KeyMaterial::Ed25519Signing(seed) => Ok(SigningKey::from_bytes(seed).verifying_key()),
            KeyMaterial::Ed25519Verifying(public) => VerifyingKey::from_bytes(public)
                .map_err(|e| CryptoError::invalid_key(self.id(), e.to_string())),
            KeyMaterial::Secret(_) => Err(CryptoError::invalid_key(
                self.id(),
                "expected ed25519 key, got secret",
            )),
        }
    }
}

impl SignatureScheme for Ed25519Scheme {
    fn id(&self) -> &str {
        ids::ED25519
    }

    fn sign(&self, key: &KeyMaterial, data: &[u8]) -> Result<Vec<u8>> {
        let signing_key = match key {
            KeyMaterial::Ed25519Signing(seed) => SigningKey::from_bytes(seed),
            other => {
                return Err(CryptoError::invalid_key(
                    self.id(),
                    format!("signing requires a private key, got {}", other.kind()),
                ))
            }
        };

        Ok(signing_key.sign(data).to_bytes().to_vec())
    }

    fn verify(&self, key: &KeyMaterial, data: &[u8], signature: &[u8]) -> Result<bool> {
        let verifying_key = self.verifying_key(key)?;

        let signature =
            Signature::from_slice(signature).map_err(|e| CryptoError::MalformedSignature {
                scheme: self.id().to_string(),
                reason: e.to_string(),
            })?;

        Ok(verifying_key.verify(data, &signature).is_ok())
    }
}
