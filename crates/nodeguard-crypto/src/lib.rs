//! # NodeGuard Crypto
//!
//! Crypto primitive registry: resolves string identifiers to hash, MAC,
//! signature and cipher schemes.
//!
//! This crate holds no keys and does no I/O. Schemes are pure functions over
//! byte slices; key material is supplied per call, usually through a
//! [`KeyResolver`].
//!
//! ## Key Types
//!
//! - [`CryptoRegistry`] - Immutable id → scheme table
//! - [`Scheme`] - Tagged variant over the four scheme families
//! - [`KeyMaterial`] / [`KeyReference`] / [`KeyResolver`] - Key handling
//! - [`ErrorKind`] - Error taxonomy shared by every NodeGuard crate
//!
//! ## Usage
//!
//! ```rust
//! use nodeguard_crypto::{ids, CryptoRegistry, KeyMaterial};
//!
//! let registry = CryptoRegistry::builtin();
//!
//! let sha = registry.hash_scheme(ids::SHA256).unwrap();
//! let digest = sha.hash(b"module bytes");
//! assert!(sha.hash_equals(b"module bytes", &digest));
//!
//! let hmac = registry.mac_scheme(ids::HMAC_SHA512).unwrap();
//! let key = KeyMaterial::secret(b"shared".to_vec());
//! let tag = hmac.mac(&key, b"payload").unwrap();
//! assert!(hmac.verify(&key, b"payload", &tag).unwrap());
//!
//! assert!(registry.resolve("MD5").is_err());
//! ```

pub mod cipher;
pub mod error;
pub mod hash;
pub mod keys;
pub mod mac;
pub mod registry;
pub mod scheme;
pub mod signature;

pub use cipher::ChaCha20Poly1305Scheme;
pub use error::{CryptoError, ErrorKind, Result};
pub use hash::{Blake3Scheme, Sha256Scheme, Sha512Scheme};
pub use keys::{KeyMaterial, KeyReference, KeyResolver, KeyRing};
pub use mac::{HmacSha256Scheme, HmacSha512Scheme};
pub use registry::{CryptoRegistry, CryptoRegistryBuilder};
pub use scheme::{
    constant_time_eq, ids, CipherScheme, HashScheme, MacScheme, Scheme, SchemeFamily,
    SignatureScheme,
};
pub use signature::Ed25519Scheme;
