//! The crypto primitive registry.
//!
//! Maps scheme identifiers to implementations. A registry is built once,
//! shared behind an `Arc`, and never mutated afterwards. Unknown ids are a
//! hard failure; there is no fallback algorithm.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::cipher::ChaCha20Poly1305Scheme;
use crate::error::{CryptoError, Result};
use crate::hash::{Blake3Scheme, Sha256Scheme, Sha512Scheme};
use crate::mac::{HmacSha256Scheme, HmacSha512Scheme};
use crate::scheme::{CipherScheme, HashScheme, MacScheme, Scheme, SchemeFamily, SignatureScheme};
use crate::signature::Ed25519Scheme;

/// Immutable lookup table from scheme id to scheme.
#[derive(Clone)]
pub struct CryptoRegistry {
    schemes: HashMap<String, Scheme>,
}

impl CryptoRegistry {
    /// A registry holding every built-in scheme.
    pub fn builtin() -> Self {
        let schemes = builtin_schemes()
            .into_iter()
            .map(|scheme| (scheme.id().to_string(), scheme))
            .collect();
        Self { schemes }
    }

    /// Start an empty registry.
    pub fn builder() -> CryptoRegistryBuilder {
        CryptoRegistryBuilder::default()
    }

    /// Resolve a scheme of any family.
    pub fn resolve(&self, id: &str) -> Result<Scheme> {
        self.schemes
            .get(id)
            .cloned()
            .ok_or_else(|| CryptoError::UnsupportedScheme(id.to_string()))
    }

    /// Resolve a hash scheme.
    pub fn hash_scheme(&self, id: &str) -> Result<Arc<dyn HashScheme>> {
        match self.resolve(id)? {
            Scheme::Hash(scheme) => Ok(scheme),
            other => Err(wrong_family(id, SchemeFamily::Hash, &other)),
        }
    }

    /// Resolve a MAC scheme.
    pub fn mac_scheme(&self, id: &str) -> Result<Arc<dyn MacScheme>> {
        match self.resolve(id)? {
            Scheme::Mac(scheme) => Ok(scheme),
            other => Err(wrong_family(id, SchemeFamily::Mac, &other)),
        }
    }

    /// Resolve a signature scheme.
    pub fn signature_scheme(&self, id: &str) -> Result<Arc<dyn SignatureScheme>> {
        match self.resolve(id)? {
            Scheme::Signature(scheme) => Ok(scheme),
            other => Err(wrong_family(id, SchemeFamily::Signature, &other)),
        }
    }

    /// Resolve a cipher scheme.
    pub fn cipher_scheme(&self, id: &str) -> Result<Arc<dyn CipherScheme>> {
        match self.resolve(id)? {
            Scheme::Cipher(scheme) => Ok(scheme),
            other => Err(wrong_family(id, SchemeFamily::Cipher, &other)),
        }
    }

    /// Whether `id` is registered.
    pub fn contains(&self, id: &str) -> bool {
        self.schemes.contains_key(id)
    }

    /// All registered ids, sorted.
    pub fn scheme_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.schemes.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Registered ids of one family, sorted.
    pub fn scheme_ids_of(&self, family: SchemeFamily) -> Vec<&str> {
        let mut ids: Vec<&str> = self
            .schemes
            .iter()
            .filter(|(_, scheme)| scheme.family() == family)
            .map(|(id, _)| id.as_str())
            .collect();
        ids.sort_unstable();
        ids
    }
}

impl Default for CryptoRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl fmt::Debug for CryptoRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CryptoRegistry")
            .field("schemes", &self.scheme_ids())
            .finish()
    }
}

/// Builder for a [`CryptoRegistry`] with custom schemes.
#[derive(Default)]
pub struct CryptoRegistryBuilder {
    schemes: HashMap<String, Scheme>,
    duplicates: Vec<String>,
}

impl CryptoRegistryBuilder {
    /// Add every built-in scheme.
    pub fn with_builtins(self) -> Self {
        builtin_schemes()
            .into_iter()
            .fold(self, |builder, scheme| builder.register(scheme))
    }

    /// Register a scheme. Duplicate ids are reported by [`build`](Self::build).
    pub fn register(mut self, scheme: Scheme) -> Self {
        let id = scheme.id().to_string();
        if self.schemes.contains_key(&id) {
            self.duplicates.push(id);
        } else {
            self.schemes.insert(id, scheme);
        }
        self
    }

    /// Register a hash scheme.
    pub fn hash(self, scheme: impl HashScheme + 'static) -> Self {
        self.register(Scheme::Hash(Arc::new(scheme)))
    }

    /// Register a MAC scheme.
    pub fn mac(self, scheme: impl MacScheme + 'static) -> Self {
        self.register(Scheme::Mac(Arc::new(scheme)))
    }

    /// Register a signature scheme.
    pub fn signature(self, scheme: impl SignatureScheme + 'static) -> Self {
        self.register(Scheme::Signature(Arc::new(scheme)))
    }

    /// Register a cipher scheme.
    pub fn cipher(self, scheme: impl CipherScheme + 'static) -> Self {
        self.register(Scheme::Cipher(Arc::new(scheme)))
    }

    /// Finish the registry.
    pub fn build(self) -> Result<CryptoRegistry> {
        if let Some(id) = self.duplicates.into_iter().next() {
            return Err(CryptoError::DuplicateScheme(id));
        }
        Ok(CryptoRegistry {
            schemes: self.schemes,
        })
    }
}

fn builtin_schemes() -> Vec<Scheme> {
    vec![
        Scheme::Hash(Arc::new(Sha256Scheme)),
        Scheme::Hash(Arc::new(Sha512Scheme)),
        Scheme::Hash(Arc::new(Blake3Scheme)),
        Scheme::Mac(Arc::new(HmacSha256Scheme)),
        Scheme::Mac(Arc::new(HmacSha512Scheme)),
        Scheme::Signature(Arc::new(Ed25519Scheme)),
        Scheme::Cipher(Arc::new(ChaCha20Poly1305Scheme)),
    ]
}

fn wrong_family(id: &str, expected: SchemeFamily, actual: &Scheme) -> CryptoError {
    CryptoError::WrongFamily {
        scheme: id.to_string(),
        expected,
        actual: actual.family(),
    }
}
