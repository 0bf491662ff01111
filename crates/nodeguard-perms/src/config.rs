//! Permission manager configuration and the manifest pipeline it implies.

use std::sync::Arc;

use bytes::Bytes;
use nodeguard_crypto::{ids, CryptoRegistry, KeyReference, KeyResolver};
use nodeguard_pipeline::{
    CborFormat, Format, FormattingOperation, JsonFormat, Pipeline, PipelineBuilder,
    SignatureOperation, SignedMessage,
};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::locator::ResourceLocator;
use crate::manifest::PermissionsManifest;

/// Whether manifests must carry a signature envelope.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum ManifestSecurity {
    /// Manifests are bare formatted records. Only the artifact hash is
    /// checked.
    #[default]
    Unsigned,

    /// Manifests are wrapped in a [`SignedMessage`] that must verify under
    /// `scheme` with `key` before the manifest is parsed.
    Signed {
        #[serde(default = "default_signature_scheme")]
        scheme: String,
        key: KeyReference,
    },
}

fn default_signature_scheme() -> String {
    ids::HMAC_SHA512.to_string()
}

/// Encoding of manifests (and of their envelope, when signed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ManifestFormat {
    #[default]
    Json,
    Cbor,
}

/// Configuration for the [`PermissionManager`](crate::PermissionManager).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PermissionsConfig {
    /// Where manifests live.
    pub manifests: ResourceLocator,

    /// Where module artifacts live.
    pub artifacts: ResourceLocator,

    pub security: ManifestSecurity,

    pub manifest_format: ManifestFormat,
}

impl Default for PermissionsConfig {
    fn default() -> Self {
        Self {
            manifests: ResourceLocator::manifests(),
            artifacts: ResourceLocator::artifacts(),
            security: ManifestSecurity::Unsigned,
            manifest_format: ManifestFormat::Json,
        }
    }
}

impl PermissionsConfig {
    /// Build the manifest pipeline this configuration describes.
    ///
    /// Unsigned: `format(manifest)`. Signed: `format(manifest) →
    /// signature → format(envelope)`. Fails when the signature scheme is
    /// unknown or not a signature/MAC scheme.
    pub fn manifest_pipeline(
        &self,
        registry: &Arc<CryptoRegistry>,
        keys: &Arc<dyn KeyResolver>,
    ) -> Result<Pipeline<PermissionsManifest, Bytes>> {
        let signer = match &self.security {
            ManifestSecurity::Unsigned => None,
            ManifestSecurity::Signed { scheme, key } => Some(SignatureOperation::new(
                Arc::clone(registry),
                scheme,
                Arc::clone(keys),
                key.clone(),
            )?),
        };

        Ok(match self.manifest_format {
            ManifestFormat::Json => formatted(JsonFormat::new(), signer),
            ManifestFormat::Cbor => formatted(CborFormat, signer),
        })
    }
}

fn formatted<F>(format: F, signer: Option<SignatureOperation>) -> Pipeline<PermissionsManifest, Bytes>
where
    F: Format + Copy + 'static,
{
    let builder = PipelineBuilder::<PermissionsManifest, PermissionsManifest>::new()
        .add_operation(FormattingOperation::<PermissionsManifest, F>::new(format));

    match signer {
        None => builder.build(),
        Some(signer) => builder
            .add_operation(signer)
            .add_operation(FormattingOperation::<SignedMessage, F>::new(format))
            .build(),
    }
}
