//! Test fixtures and helpers.
//!
//! Common setup for permission and pipeline tests: a registry, a key ring
//! with well-known keys, and an in-memory channel provider.

use std::sync::Arc;

use nodeguard_channel::MemoryChannelProvider;
use nodeguard_crypto::{ids, CryptoRegistry, KeyMaterial, KeyResolver, KeyRing};
use nodeguard_perms::{
    ManifestSecurity, ModuleHash, PermissionManager, PermissionsConfig, PermissionsManifest,
    ResourceLocator,
};

/// Key name of the Ed25519 manifest signer.
pub const SIGNER_KEY: &str = "manifest-signer";

/// Key name of the shared HMAC secret.
pub const MAC_KEY: &str = "node-mac";

/// Key name of the AEAD secret.
pub const CIPHER_KEY: &str = "node-cipher";

/// Seed of [`SIGNER_KEY`].
pub const SIGNER_SEED: [u8; 32] = [0x42; 32];

/// A registry, keys and a memory provider wired together.
pub struct GuardFixture {
    pub registry: Arc<CryptoRegistry>,
    pub keys: Arc<KeyRing>,
    pub provider: MemoryChannelProvider,
}

impl GuardFixture {
    /// Create a fixture with the built-in schemes and the well-known keys.
    pub fn new() -> Self {
        Self::with_provider(MemoryChannelProvider::new())
    }

    /// Same, over a given provider (e.g. one with read latency).
    pub fn with_provider(provider: MemoryChannelProvider) -> Self {
        let keys = KeyRing::new()
            .with_key(SIGNER_KEY, KeyMaterial::ed25519_signing(SIGNER_SEED))
            .with_key(MAC_KEY, KeyMaterial::secret(b"node shared mac secret".to_vec()))
            .with_key(CIPHER_KEY, KeyMaterial::secret(vec![0x24; 32]));

        Self {
            registry: Arc::new(CryptoRegistry::builtin()),
            keys: Arc::new(keys),
            provider,
        }
    }

    /// The key ring as a resolver.
    pub fn resolver(&self) -> Arc<dyn KeyResolver> {
        self.keys.clone()
    }

    /// Config with default locators and the given security mode.
    pub fn config(security: ManifestSecurity) -> PermissionsConfig {
        PermissionsConfig {
            security,
            ..PermissionsConfig::default()
        }
    }

    /// Signed mode using the Ed25519 signer key.
    pub fn signed() -> ManifestSecurity {
        ManifestSecurity::Signed {
            scheme: ids::ED25519.to_string(),
            key: SIGNER_KEY.into(),
        }
    }

    /// A manager over this fixture's provider.
    pub fn manager(&self, config: &PermissionsConfig) -> PermissionManager {
        PermissionManager::new(
            config,
            Arc::clone(&self.registry),
            self.resolver(),
            Arc::new(self.provider.clone()),
        )
        .expect("fixture config uses built-in schemes")
    }

    /// A manifest for `module` whose hash matches `artifact`.
    pub fn manifest(&self, module: &str, artifact: &[u8], grants: &[(&str, &str)]) -> PermissionsManifest {
        let hash = ModuleHash::compute(&self.registry, ids::SHA256, artifact)
            .expect("SHA256 is built in");
        grants
            .iter()
            .fold(PermissionsManifest::builder(module, hash), |b, (action, target)| {
                b.grant(*action, *target, "ChannelPermission")
            })
            .build()
    }

    /// Encode `manifest` with `manager`'s pipeline and store it with
    /// `artifact` where the manager looks for them.
    pub fn install(&self, manager: &PermissionManager, manifest: &PermissionsManifest, artifact: &[u8]) {
        let bytes = manager
            .pipeline()
            .execute(manifest.clone())
            .expect("manifest encodes");
        self.provider.put(manager.manifest_uri(&manifest.name), bytes);
        self.provider
            .put(manager.artifact_uri(&manifest.name), artifact.to_vec());
    }

    /// Default manifest locator URI of `module`.
    pub fn manifest_uri(module: &str) -> String {
        ResourceLocator::manifests().locate(module)
    }
}

impl Default for GuardFixture {
    fn default() -> Self {
        Self::new()
    }
}
