//! HMAC schemes.

use hmac::digest::KeyInit;
use hmac::{Hmac, Mac};
use sha2::{Sha256, Sha512};

use crate::error::{CryptoError, Result};
use crate::keys::KeyMaterial;
use crate::scheme::{ids, MacScheme};

/// HMAC over SHA-256.
#[derive(Debug, Clone, Copy, Default)]
pub struct HmacSha256Scheme;

/// HMAC over SHA-512.
#[derive(Debug, Clone, Copy, Default)]
pub struct HmacSha512Scheme;

impl MacScheme for HmacSha256Scheme {
    fn id(&self) -> &str {
        ids::HMAC_SHA256
    }

    fn mac(&self, key: &KeyMaterial, data: &[u8]) -> Result<Vec<u8>> {
        let mac = keyed::<Hmac<Sha256>>(self.id(), key, data)?;
        Ok(mac.finalize().into_bytes().to_vec())
    }

    fn verify(&self, key: &KeyMaterial, data: &[u8], tag: &[u8]) -> Result<bool> {
        let mac = keyed::<Hmac<Sha256>>(self.id(), key, data)?;
        Ok(mac.verify_slice(tag).is_ok())
    }
}

impl MacScheme for HmacSha512Scheme {
    fn id(&self) -> &str {
        ids::HMAC_SHA512
    }

    fn mac(&self, key: &KeyMaterial, data: &[u8]) -> Result<Vec<u8>> {
        let mac = keyed::<Hmac<Sha512>>(self.id(), key, data)?;
        Ok(mac.finalize().into_bytes().to_vec())
    }

    fn verify(&self, key: &KeyMaterial, data: &[u8], tag: &[u8]) -> Result<bool> {
        let mac = keyed::<Hmac<Sha512>>(self.id(), key, data)?;
        Ok(mac.verify_slice(tag).is_ok())
    }
}

/// Build a MAC instance keyed with `key` and fed with `data`.
fn keyed<M: Mac + KeyInit>(scheme: &str, key: &KeyMaterial, data: &[u8]) -> Result<M> {
    let secret = match key {
        KeyMaterial::Secret(bytes) => bytes,
        other => {
            return Err(CryptoError::invalid_key(
                scheme,
                format!("expected secret key, got {}", other.kind()),
            ))
        }
    };

    let mut mac = <M as KeyInit>::new_from_slice(secret)
        .map_err(|e| CryptoError::invalid_key(scheme, e.to_string()))?;
    Mac::update(&mut mac, data);
    Ok(mac)
}
