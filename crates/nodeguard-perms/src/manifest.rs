//! The permission manifest: a module's identity, its expected artifact hash
//! and its grants.
//!
//! Manifests are plain serde records. Every field is required and unknown
//! fields are rejected, so the wire shape is exactly:
//!
//! ```json
//! {
//!   "name": "/com/intel/module",
//!   "hash": { "hashAlgorithm": "SHA256", "moduleJarHash": "<base64>" },
//!   "grants": [
//!     { "action": "subscribe,publish", "target": "ndn:/intel/node", "permission": "ChannelPermission" }
//!   ]
//! }
//! ```

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use nodeguard_crypto::{CryptoError, CryptoRegistry};
use serde::{Deserialize, Serialize};

/// Signed-off description of what a module may do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PermissionsManifest {
    /// Hierarchical module name.
    pub name: String,

    /// Expected hash of the module artifact.
    pub hash: ModuleHash,

    /// Grants in manifest order.
    pub grants: Vec<Grant>,
}

impl PermissionsManifest {
    /// Start building a manifest.
    pub fn builder(name: impl Into<String>, hash: ModuleHash) -> ManifestBuilder {
        ManifestBuilder {
            manifest: PermissionsManifest {
                name: name.into(),
                hash,
                grants: Vec::new(),
            },
        }
    }
}

/// Expected artifact digest and the scheme that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ModuleHash {
    /// Hash scheme id.
    pub hash_algorithm: String,

    /// Standard base64 of the digest.
    pub module_jar_hash: String,
}

impl ModuleHash {
    /// Hash `artifact` with the scheme `scheme_id`.
    pub fn compute(
        registry: &CryptoRegistry,
        scheme_id: &str,
        artifact: &[u8],
    ) -> Result<Self, CryptoError> {
        let scheme = registry.hash_scheme(scheme_id)?;
        Ok(Self {
            hash_algorithm: scheme.id().to_string(),
            module_jar_hash: STANDARD.encode(scheme.hash(artifact)),
        })
    }

    /// The decoded digest bytes.
    pub fn digest(&self) -> Result<Vec<u8>, base64::DecodeError> {
        STANDARD.decode(self.module_jar_hash.as_bytes())
    }
}

/// One `(actions, target, permission class)` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Grant {
    /// Comma-joined action tokens, e.g. `subscribe,publish`.
    pub action: String,

    /// Resource pattern. `*` matches any run of characters.
    pub target: String,

    /// Name of the enforced capability class.
    pub permission: String,
}

impl Grant {
    pub fn new(
        action: impl Into<String>,
        target: impl Into<String>,
        permission: impl Into<String>,
    ) -> Self {
        Self {
            action: action.into(),
            target: target.into(),
            permission: permission.into(),
        }
    }

    /// Trimmed, non-empty action tokens.
    pub fn actions(&self) -> impl Iterator<Item = &str> {
        self.action
            .split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }
}

/// Builder for authoring manifests.
#[derive(Debug, Clone)]
pub struct ManifestBuilder {
    manifest: PermissionsManifest,
}

impl ManifestBuilder {
    /// Append a grant.
    pub fn grant(
        mut self,
        action: impl Into<String>,
        target: impl Into<String>,
        permission: impl Into<String>,
    ) -> Self {
        self.manifest.grants.push(Grant::new(action, target, permission));
        self
    }

    pub fn build(self) -> PermissionsManifest {
        self.manifest
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nodeguard_crypto::{ids, ErrorKind};

    fn manifest() -> PermissionsManifest {
        let registry = CryptoRegistry::builtin();
        let hash = ModuleHash::compute(&registry, ids::SHA256, b"module bytes").unwrap();
        PermissionsManifest::builder("/com/intel/module", hash)
            .grant("subscribe,publish", "ndn:/intel/node", "ChannelPermission")
            .grant("subscribe", "ndn:/intel/*", "ChannelPermission")
            .build()
    }

    #[test]
    fn test_wire_shape() {
        let value = serde_json::to_value(manifest()).unwrap();

        assert_eq!(value["name"], "/com/intel/module");
        assert_eq!(value["hash"]["hashAlgorithm"], "SHA256");
        assert!(value["hash"]["moduleJarHash"].is_string());
        assert_eq!(value["grants"][0]["action"], "subscribe,publish");
        assert_eq!(value["grants"][1]["target"], "ndn:/intel/*");
        assert_eq!(value["grants"][0]["permission"], "ChannelPermission");
    }

    #[test]
    fn test_missing_and_unknown_fields_rejected() {
        let missing = r#"{"name":"/m","hash":{"hashAlgorithm":"SHA256","moduleJarHash":""}}"#;
        assert!(serde_json::from_str::<PermissionsManifest>(missing).is_err());

        let unknown = r#"{"name":"/m","hash":{"hashAlgorithm":"SHA256","moduleJarHash":""},"grants":[],"expires":1}"#;
        assert!(serde_json::from_str::<PermissionsManifest>(unknown).is_err());

        let empty = r#"{"name":"/m","hash":{"hashAlgorithm":"SHA256","moduleJarHash":""},"grants":[]}"#;
        let parsed: PermissionsManifest = serde_json::from_str(empty).unwrap();
        assert!(parsed.grants.is_empty());
    }

    #[test]
    fn test_module_hash_compute() {
        let registry = CryptoRegistry::builtin();
        let hash = ModuleHash::compute(&registry, ids::SHA256, b"abc").unwrap();

        assert_eq!(
            hash.digest().unwrap(),
            registry.hash_scheme(ids::SHA256).unwrap().hash(b"abc")
        );
        assert_eq!(hash.module_jar_hash, "ungWv48Bz+pBQUDeXa4iI7ADYaOWF3qctBD/YfIAFa0=");

        let err = ModuleHash::compute(&registry, "MD5", b"abc").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedScheme);
    }

    #[test]
    fn test_action_tokens() {
        let grant = Grant::new(" subscribe , publish,,", "t", "p");
        assert_eq!(grant.actions().collect::<Vec<_>>(), vec!["subscribe", "publish"]);
    }
}
