//! Authenticated symmetric encryption.
//!
//! ChaCha20-Poly1305 with a 256-bit key and 96-bit nonce.

use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Nonce,
};
use rand::RngCore;

use crate::error::{CryptoError, Result};
use crate::keys::KeyMaterial;
use crate::scheme::{ids, CipherScheme};

/// ChaCha20-Poly1305 AEAD.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChaCha20Poly1305Scheme;

impl ChaCha20Poly1305Scheme {
    /// Key length in bytes.
    pub const KEY_LEN: usize = 32;

    /// Nonce length in bytes.
    pub const NONCE_LEN: usize = 12;

    fn cipher(&self, key: &KeyMaterial) -> Result<ChaCha20Poly1305> {
        let secret = match key {
            KeyMaterial::Secret(bytes) => bytes,
            other => {
                return Err(CryptoError::invalid_key(
                    self.id(),
                    format!("expected secret key, got {}", other.kind()),
                ))
            }
        };

        ChaCha20Poly1305::new_from_slice(secret).map_err(|_| {
            CryptoError::invalid_key(
                self.id(),
                format!("expected {} byte key, got {}", Self::KEY_LEN, secret.len()),
            )
        })
    }

    fn check_nonce(&self, nonce: &[u8]) -> Result<()> {
        if nonce.len() != Self::NONCE_LEN {
            return Err(CryptoError::failed(
                self.id(),
                format!("expected {} byte nonce, got {}", Self::NONCE_LEN, nonce.len()),
            ));
        }
        Ok(())
    }
}

impl CipherScheme for ChaCha20Poly1305Scheme {
    fn id(&self) -> &str {
        ids::CHACHA20_POLY1305
    }

    fn nonce_len(&self) -> usize {
        Self::NONCE_LEN
    }

    fn generate_nonce(&self) -> Vec<u8> {
        let mut nonce = vec![0u8; Self::NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut nonce);
        nonce
    }

    fn seal(&self, key: &KeyMaterial, nonce: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
        self.check_nonce(nonce)?;
        let cipher = self.cipher(key)?;
        cipher
            .encrypt(Nonce::from_slice(nonce), plaintext)
            .map_err(|e| CryptoError::failed(self.id(), e))
    }

    fn open(&self, key: &KeyMaterial, nonce: &[u8], ciphertext: &[u8]) -> Result<Option<Vec<u8>>> {
        self.check_nonce(nonce)?;
        let cipher = self.cipher(key)?;
        // The AEAD error is opaque; with a well-sized key and nonce it only
        // signals a tag mismatch.
        Ok(cipher.decrypt(Nonce::from_slice(nonce), ciphertext).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seal_open() {
        let key = KeyMaterial::generate_secret(32);
        let nonce = ChaCha20Poly1305Scheme.generate_nonce();

        let ciphertext = ChaCha20Poly1305Scheme.seal(&key, &nonce, b"hello").unwrap();
        assert_ne!(ciphertext, b"hello");

        let plaintext = ChaCha20Poly1305Scheme.open(&key, &nonce, &ciphertext).unwrap();
        assert_eq!(plaintext.as_deref(), Some(&b"hello"[..]));
    }

    #[test]
    fn test_wrong_key_does_not_open() {
        let key = KeyMaterial::generate_secret(32);
        let other = KeyMaterial::generate_secret(32);
        let nonce = ChaCha20Poly1305Scheme.generate_nonce();

        let ciphertext = ChaCha20Poly1305Scheme.seal(&key, &nonce, b"secret").unwrap();
        assert!(ChaCha20Poly1305Scheme.open(&other, &nonce, &ciphertext).unwrap().is_none());
    }

    #[test]
    fn test_short_key_rejected() {
        let key = KeyMaterial::secret(vec![1u8; 16]);
        let nonce = ChaCha20Poly1305Scheme.generate_nonce();
        let err = ChaCha20Poly1305Scheme.seal(&key, &nonce, b"x").unwrap_err();
        assert!(matches!(err, CryptoError::InvalidKey { .. }));
    }

    #[test]
    fn test_bad_nonce_rejected() {
        let key = KeyMaterial::generate_secret(32);
        let err = ChaCha20Poly1305Scheme.seal(&key, &[0u8; 4], b"x").unwrap_err();
        assert!(matches!(err, CryptoError::OperationFailed { .. }));
    }
}
