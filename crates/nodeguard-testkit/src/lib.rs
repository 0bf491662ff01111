//! # NodeGuard Testkit
//!
//! Testing utilities for NodeGuard.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Published digests, tags and signatures pinned
//!   against the built-in schemes
//! - **Generators**: Proptest strategies for manifests and node messages
//! - **Fixtures**: A registry, well-known keys and a memory provider wired
//!   together
//! - **Messages**: Node catalog messages used as formatting payloads
//!
//! ## Golden Vectors
//!
//! ```rust
//! use nodeguard_crypto::CryptoRegistry;
//! use nodeguard_testkit::vectors::check_all;
//!
//! let failures = check_all(&CryptoRegistry::builtin());
//! assert!(failures.is_empty());
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use nodeguard_testkit::generators;
//!
//! proptest! {
//!     #[test]
//!     fn manifest_roundtrips(manifest in generators::manifest()) {
//!         let json = serde_json::to_vec(&manifest).unwrap();
//!         prop_assert_eq!(serde_json::from_slice::<PermissionsManifest>(&json).unwrap(), manifest);
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use nodeguard_testkit::fixtures::GuardFixture;
//!
//! let fixture = GuardFixture::new();
//! let manifest = fixture.manifest("/com/intel/module", b"artifact", &[("publish", "ndn:/intel/*")]);
//! assert_eq!(manifest.grants.len(), 1);
//! ```

pub mod fixtures;
pub mod generators;
pub mod messages;
pub mod vectors;

pub use fixtures::GuardFixture;
pub use messages::{MeshEntry, NodeAction, NodeEvent, NodeInfoMessage};
pub use vectors::{check_all, hash_vectors, mac_vectors, signature_vectors};
