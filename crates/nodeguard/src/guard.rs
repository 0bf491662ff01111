//! The NodeGuard wiring: registry, keys, channels and the permission
//! manager behind one handle.

use std::sync::Arc;

use bytes::Bytes;
use nodeguard_channel::{ChannelMode, ChannelProvider};
use nodeguard_crypto::{CryptoRegistry, KeyReference, KeyResolver};
use nodeguard_perms::{
    ModulePermissions, ModuleState, PermissionManager, PermissionsConfig, PermissionsManifest,
};
use nodeguard_pipeline::{FormattingOperation, Pipeline, PipelineBuilder, SignatureOperation, SignedMessage};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{GuardError, Result};

/// Configuration for [`NodeGuard`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GuardConfig {
    /// Permission manager settings.
    pub permissions: PermissionsConfig,
}

impl GuardConfig {
    /// Parse configuration from JSON text. Missing sections take defaults.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| GuardError::Config(e.to_string()))
    }
}

/// The main NodeGuard handle.
///
/// Provides a unified API for:
/// - Answering authorization queries for loaded modules
/// - Publishing manifests through the configured manifest pipeline
/// - Sending and receiving typed messages through pipelines and channels
pub struct NodeGuard {
    config: GuardConfig,
    registry: Arc<CryptoRegistry>,
    keys: Arc<dyn KeyResolver>,
    provider: Arc<dyn ChannelProvider>,
    permissions: PermissionManager,
}

impl NodeGuard {
    /// Create a NodeGuard instance.
    ///
    /// Fails when the configured manifest signature scheme is unknown.
    pub fn new(
        config: GuardConfig,
        registry: Arc<CryptoRegistry>,
        keys: Arc<dyn KeyResolver>,
        provider: Arc<dyn ChannelProvider>,
    ) -> Result<Self> {
        let permissions = PermissionManager::new(
            &config.permissions,
            Arc::clone(&registry),
            Arc::clone(&keys),
            Arc::clone(&provider),
        )?;

        info!(
            security = ?config.permissions.security,
            format = ?config.permissions.manifest_format,
            schemes = registry.scheme_ids().len(),
            "node guard ready"
        );

        Ok(Self {
            config,
            registry,
            keys,
            provider,
            permissions,
        })
    }

    /// Create an instance with the built-in schemes.
    pub fn with_builtin_schemes(
        config: GuardConfig,
        keys: Arc<dyn KeyResolver>,
        provider: Arc<dyn ChannelProvider>,
    ) -> Result<Self> {
        Self::new(config, Arc::new(CryptoRegistry::builtin()), keys, provider)
    }

    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<CryptoRegistry> {
        &self.registry
    }

    pub fn provider(&self) -> &Arc<dyn ChannelProvider> {
        &self.provider
    }

    /// The permission manager.
    pub fn permissions(&self) -> &PermissionManager {
        &self.permissions
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Permissions
    // ─────────────────────────────────────────────────────────────────────────

    /// Verified permissions of `module`. See
    /// [`PermissionManager::retrieve_permissions`].
    pub async fn retrieve_permissions(&self, module: &str) -> Result<Arc<ModulePermissions>> {
        Ok(self.permissions.retrieve_permissions(module).await?)
    }

    /// Whether `module` may perform `action` on `target`.
    pub async fn is_authorized(&self, module: &str, action: &str, target: &str) -> Result<bool> {
        Ok(self.permissions.is_authorized(module, action, target).await?)
    }

    pub fn module_state(&self, module: &str) -> ModuleState {
        self.permissions.state(module)
    }

    /// Encode `manifest` with the manifest pipeline and write it where the
    /// manager will look for it. Returns the URI written.
    ///
    /// A module that is already cached keeps its old permissions until
    /// [`PermissionManager::reload`].
    pub async fn publish_manifest(&self, manifest: &PermissionsManifest) -> Result<String> {
        let uri = self.permissions.manifest_uri(&manifest.name);
        self.send(&uri, self.permissions.pipeline(), manifest.clone())
            .await?;
        info!(module = %manifest.name, %uri, grants = manifest.grants.len(), "manifest published");
        Ok(uri)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Messaging
    // ─────────────────────────────────────────────────────────────────────────

    /// A JSON pipeline that signs messages of type `T` with `scheme_id`
    /// and `key`.
    pub fn signing_pipeline<T>(&self, scheme_id: &str, key: impl Into<KeyReference>) -> Result<Pipeline<T, Bytes>>
    where
        T: Serialize + DeserializeOwned + 'static,
    {
        let signer = SignatureOperation::new(
            Arc::clone(&self.registry),
            scheme_id,
            Arc::clone(&self.keys),
            key,
        )?;

        Ok(PipelineBuilder::<T, T>::new()
            .add_operation(FormattingOperation::<T, _>::json())
            .add_operation(signer)
            .add_operation(FormattingOperation::<SignedMessage, _>::json())
            .build())
    }

    /// Run `message` forward through `pipeline` and write the bytes to `uri`.
    pub async fn send<T>(&self, uri: &str, pipeline: &Pipeline<T, Bytes>, message: T) -> Result<()> {
        let bytes = pipeline.execute(message)?;
        let channel = self.provider.open(uri, ChannelMode::Write).await?;
        let written = channel.write_all(bytes).await;
        let closed = channel.close().await;
        written?;
        closed?;
        debug!(uri, "message sent");
        Ok(())
    }

    /// Read `uri` and run the bytes backward through `pipeline`.
    pub async fn receive<T>(&self, uri: &str, pipeline: &Pipeline<T, Bytes>) -> Result<T> {
        let channel = self.provider.open(uri, ChannelMode::Read).await?;
        let bytes = channel.read_all().await;
        let closed = channel.close().await;
        let bytes = bytes?;
        closed?;
        Ok(pipeline.execute_backward(bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nodeguard_channel::MemoryChannelProvider;
    use nodeguard_crypto::{ids, ErrorKind, KeyMaterial, KeyRing};
    use nodeguard_perms::{ManifestSecurity, ModuleHash};

    fn guard(config: GuardConfig) -> (NodeGuard, MemoryChannelProvider) {
        let provider = MemoryChannelProvider::new();
        let keys = Arc::new(
            KeyRing::new()
                .with_key("signer", KeyMaterial::ed25519_signing([3u8; 32]))
                .with_key("mac", KeyMaterial::secret(b"mac key".to_vec())),
        );
        let guard = NodeGuard::with_builtin_schemes(config, keys, Arc::new(provider.clone())).unwrap();
        (guard, provider)
    }

    #[test]
    fn test_config_from_json() {
        let config = GuardConfig::from_json(
            r#"{"permissions": {"security": {"mode": "signed", "scheme": "Ed25519", "key": "signer"}}}"#,
        )
        .unwrap();
        assert_eq!(
            config.permissions.security,
            ManifestSecurity::Signed {
                scheme: ids::ED25519.into(),
                key: "signer".into(),
            }
        );

        assert_eq!(GuardConfig::from_json("{}").unwrap(), GuardConfig::default());

        let err = GuardConfig::from_json(r#"{"permission": {}}"#).unwrap_err();
        assert!(matches!(err, GuardError::Config(_)));
    }

    #[test]
    fn test_unknown_manifest_scheme_fails_construction() {
        let mut config = GuardConfig::default();
        config.permissions.security = ManifestSecurity::Signed {
            scheme: "DSA".into(),
            key: "signer".into(),
        };

        let provider = MemoryChannelProvider::new();
        let err = NodeGuard::with_builtin_schemes(config, Arc::new(KeyRing::new()), Arc::new(provider))
            .err()
            .unwrap();
        assert_eq!(err.kind(), ErrorKind::UnsupportedScheme);
    }

    #[tokio::test]
    async fn test_publish_then_authorize() {
        let mut config = GuardConfig::default();
        config.permissions.security = ManifestSecurity::Signed {
            scheme: ids::ED25519.into(),
            key: "signer".into(),
        };
        let (guard, provider) = guard(config);

        let hash = ModuleHash::compute(guard.registry(), ids::SHA512, b"jar").unwrap();
        let manifest = PermissionsManifest::builder("/com/intel/module", hash)
            .grant("publish", "ndn:/intel/*", "ChannelPermission")
            .build();

        let uri = guard.publish_manifest(&manifest).await.unwrap();
        assert_eq!(uri, "com/intel/module.json");
        provider.put("com/intel/module.jar", &b"jar"[..]);

        assert!(guard
            .is_authorized("/com/intel/module", "publish", "ndn:/intel/node")
            .await
            .unwrap());
        assert_eq!(guard.module_state("/com/intel/module"), ModuleState::Authorized);
    }

    #[tokio::test]
    async fn test_send_receive_signed() {
        let (guard, provider) = guard(GuardConfig::default());
        let pipeline = guard
            .signing_pipeline::<Vec<String>>(ids::HMAC_SHA256, "mac")
            .unwrap();

        let message = vec!["hello".to_string(), "node".to_string()];
        guard.send("mem:/inbox", &pipeline, message.clone()).await.unwrap();
        assert_eq!(guard.receive("mem:/inbox", &pipeline).await.unwrap(), message);

        // Swap the content under the envelope.
        let mut envelope: SignedMessage =
            serde_json::from_slice(&provider.get("mem:/inbox").unwrap()).unwrap();
        envelope.content = Bytes::from_static(br#"["evil"]"#);
        provider.put("mem:/inbox", serde_json::to_vec(&envelope).unwrap());

        let err = guard.receive("mem:/inbox", &pipeline).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::VerificationFailed);

        let err = guard.receive("mem:/missing", &pipeline).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
    }
}
