//! # NodeGuard Permissions
//!
//! Module permission manifests and the manager that verifies and serves
//! them.
//!
//! ## Overview
//!
//! A module ships with a manifest naming the module, the expected hash of
//! its artifact, and a list of grants. The [`PermissionManager`] reads the
//! manifest through a channel, decodes it through the manifest pipeline
//! (verifying the signature envelope when configured), re-hashes the
//! artifact, and only then exposes the grants as [`ModulePermissions`].
//!
//! ## Key Types
//!
//! - [`PermissionsManifest`] / [`Grant`] / [`ModuleHash`] - The manifest record
//! - [`ModulePermissions`] - Verified, queryable authorization view
//! - [`PermissionManager`] - Single-flight loader and authorization surface
//! - [`PermissionsConfig`] - Locators, signing mode and manifest format
//!
//! ## Authorization semantics
//!
//! `is_authorized` answers `false` for a missing grant, a denied module or
//! an unknown module. Transport, format and scheme failures are errors so
//! that "denied" and "cannot tell" are never confused.

pub mod config;
pub mod error;
pub mod locator;
pub mod manager;
pub mod manifest;
pub mod permissions;

pub use config::{ManifestFormat, ManifestSecurity, PermissionsConfig};
pub use error::{PermsError, Result};
pub use locator::ResourceLocator;
pub use manager::{ModuleState, PermissionManager};
pub use manifest::{Grant, ManifestBuilder, ModuleHash, PermissionsManifest};
pub use permissions::{ModulePermissions, TargetPattern, ANY_ACTION};
