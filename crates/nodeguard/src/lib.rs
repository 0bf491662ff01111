//! # NodeGuard
//!
//! Module permissions and secure message pipelines for pub/sub nodes.
//!
//! ## Overview
//!
//! NodeGuard decides whether a loaded module may publish or subscribe on a
//! named resource, and transforms messages on their way to and from
//! channels:
//!
//! - **Manifests**: Per-module grants plus the expected artifact hash,
//!   optionally wrapped in a signature envelope
//! - **Permission manager**: Loads, verifies and caches manifests, one load
//!   per module no matter how many callers ask
//! - **Pipelines**: Reversible chains of formatting, signing, hashing and
//!   encryption stages
//! - **Crypto registry**: Schemes resolved by stable string ids
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use nodeguard::{GuardConfig, NodeGuard};
//! use nodeguard::channel::FileChannelProvider;
//! use nodeguard::crypto::KeyRing;
//!
//! async fn check_module() {
//!     let config = GuardConfig::from_json(r#"{"permissions": {"manifests": {"root": "file:", "extension": ".json"}}}"#).unwrap();
//!     let provider = Arc::new(FileChannelProvider::new("/srv/nodeguard"));
//!     let guard = NodeGuard::with_builtin_schemes(config, Arc::new(KeyRing::new()), provider).unwrap();
//!
//!     let allowed = guard
//!         .is_authorized("/com/intel/module", "publish", "ndn:/intel/node")
//!         .await
//!         .unwrap();
//!     println!("publish allowed: {allowed}");
//! }
//! ```
//!
//! ## Re-exports
//!
//! This crate re-exports the component crates for convenience:
//!
//! - `nodeguard::crypto` - Scheme registry and key material
//! - `nodeguard::pipeline` - Pipeline engine and operations
//! - `nodeguard::channel` - Channel capability and providers
//! - `nodeguard::perms` - Manifests and the permission manager

pub mod error;
pub mod guard;

// Re-export component crates
pub use nodeguard_channel as channel;
pub use nodeguard_crypto as crypto;
pub use nodeguard_perms as perms;
pub use nodeguard_pipeline as pipeline;

// Re-export main types for convenience
pub use error::{GuardError, Result};
pub use guard::{GuardConfig, NodeGuard};

// Re-export commonly used types
pub use nodeguard_crypto::{CryptoRegistry, ErrorKind, KeyMaterial, KeyReference, KeyRing};
pub use nodeguard_perms::{
    Grant, ModuleHash, ModulePermissions, ModuleState, PermissionManager, PermissionsConfig,
    PermissionsManifest,
};
pub use nodeguard_pipeline::{Pipeline, PipelineBuilder, SignedMessage};
