//! End-to-end permission checks through the NodeGuard handle.
//!
//! Manifests are published through the configured pipeline, stored on a
//! channel provider, and read back by the permission manager.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use bytes::Bytes;
use nodeguard::channel::{FileChannelProvider, MemoryChannelProvider};
use nodeguard::crypto::ids;
use nodeguard::perms::ManifestSecurity;
use nodeguard::{ErrorKind, GuardConfig, ModuleHash, ModuleState, NodeGuard, PermissionsManifest, SignedMessage};
use nodeguard_testkit::fixtures::{GuardFixture, SIGNER_KEY};

const MODULE: &str = "/com/intel/module";
const ARTIFACT: &[u8] = b"module artifact bytes";

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn guard_over(fx: &GuardFixture, security: ManifestSecurity) -> Result<NodeGuard> {
    let config = GuardConfig {
        permissions: GuardFixture::config(security),
    };
    Ok(NodeGuard::new(
        config,
        Arc::clone(&fx.registry),
        fx.resolver(),
        Arc::new(fx.provider.clone()),
    )?)
}

fn module_manifest(guard: &NodeGuard, artifact: &[u8]) -> Result<PermissionsManifest> {
    let hash = ModuleHash::compute(guard.registry(), ids::SHA256, artifact)?;
    Ok(PermissionsManifest::builder(MODULE, hash)
        .grant("publish,subscribe", "ndn:/intel/node/*", "ChannelPermission")
        .grant("subscribe", "ndn:/intel/events", "ChannelPermission")
        .build())
}

#[tokio::test]
async fn file_provider_end_to_end() -> Result<()> {
    init_tracing();
    let dir = tempfile::tempdir()?;

    let config = GuardConfig::from_json(
        r#"{
            "permissions": {
                "manifests": {"root": "file:", "extension": ".json"},
                "artifacts": {"root": "file:modules", "extension": ".jar"},
                "security": {"mode": "signed", "scheme": "Ed25519", "key": "manifest-signer"}
            }
        }"#,
    )?;
    let fx = GuardFixture::new();
    let guard = NodeGuard::new(
        config,
        Arc::clone(&fx.registry),
        fx.resolver(),
        Arc::new(FileChannelProvider::new(dir.path())),
    )?;

    let uri = guard.publish_manifest(&module_manifest(&guard, ARTIFACT)?).await?;
    assert_eq!(uri, "file:com/intel/module.json");
    assert!(dir.path().join("com/intel/module.json").is_file());

    let jar = dir.path().join("modules/com/intel/module.jar");
    std::fs::create_dir_all(jar.parent().unwrap())?;
    std::fs::write(&jar, ARTIFACT)?;

    assert!(guard.is_authorized(MODULE, "publish", "ndn:/intel/node/1/info").await?);
    assert!(guard.is_authorized(MODULE, "Subscribe", "ndn:/intel/events").await?);
    assert!(!guard.is_authorized(MODULE, "publish", "ndn:/intel/events").await?);
    assert!(!guard.is_authorized(MODULE, "delete", "ndn:/intel/node/1").await?);
    assert_eq!(guard.module_state(MODULE), ModuleState::Authorized);

    Ok(())
}

#[tokio::test]
async fn unsigned_and_signed_modes_authorize() -> Result<()> {
    init_tracing();
    for security in [ManifestSecurity::Unsigned, GuardFixture::signed()] {
        let fx = GuardFixture::new();
        let guard = guard_over(&fx, security.clone())?;

        guard.publish_manifest(&module_manifest(&guard, ARTIFACT)?).await?;
        fx.provider
            .put(guard.permissions().artifact_uri(MODULE), ARTIFACT.to_vec());

        let permissions = guard.retrieve_permissions(MODULE).await?;
        assert_eq!(permissions.module(), MODULE, "{security:?}");
        assert_eq!(permissions.len(), 2);
        assert_eq!(
            permissions.permission_class_for("publish", "ndn:/intel/node/a"),
            Some("ChannelPermission")
        );
    }
    Ok(())
}

#[tokio::test]
async fn tampered_manifest_is_denied() -> Result<()> {
    init_tracing();
    let fx = GuardFixture::new();
    let guard = guard_over(&fx, GuardFixture::signed())?;

    let uri = guard.publish_manifest(&module_manifest(&guard, ARTIFACT)?).await?;
    fx.provider
        .put(guard.permissions().artifact_uri(MODULE), ARTIFACT.to_vec());

    // Widen the grant inside the envelope without re-signing.
    let stored = fx.provider.get(&uri).expect("published");
    let mut envelope: SignedMessage = serde_json::from_slice(&stored)?;
    let content = String::from_utf8(envelope.content.to_vec())?
        .replace("ndn:/intel/events", "ndn:/*");
    envelope.content = Bytes::from(content);
    fx.provider.put(uri, serde_json::to_vec(&envelope)?);

    assert!(!guard.is_authorized(MODULE, "subscribe", "ndn:/secret").await?);
    assert_eq!(guard.module_state(MODULE), ModuleState::Denied);

    let err = guard.retrieve_permissions(MODULE).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::VerificationFailed);
    Ok(())
}

#[tokio::test]
async fn artifact_hash_mismatch_is_denied() -> Result<()> {
    init_tracing();
    let fx = GuardFixture::new();
    let guard = guard_over(&fx, ManifestSecurity::Unsigned)?;

    guard.publish_manifest(&module_manifest(&guard, ARTIFACT)?).await?;
    fx.provider
        .put(guard.permissions().artifact_uri(MODULE), b"a different build".to_vec());

    assert!(!guard.is_authorized(MODULE, "publish", "ndn:/intel/node/1").await?);
    assert_eq!(guard.module_state(MODULE), ModuleState::Denied);
    Ok(())
}

#[tokio::test]
async fn unknown_module_is_not_authorized_and_retried() -> Result<()> {
    init_tracing();
    let fx = GuardFixture::new();
    let guard = guard_over(&fx, ManifestSecurity::Unsigned)?;

    assert!(!guard.is_authorized(MODULE, "publish", "ndn:/intel/node/1").await?);
    let err = guard.retrieve_permissions(MODULE).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ModuleUnknown);
    assert_eq!(guard.module_state(MODULE), ModuleState::Unloaded);

    // The manifest shows up later; the next call picks it up.
    guard.publish_manifest(&module_manifest(&guard, ARTIFACT)?).await?;
    fx.provider
        .put(guard.permissions().artifact_uri(MODULE), ARTIFACT.to_vec());
    assert!(guard.is_authorized(MODULE, "publish", "ndn:/intel/node/1").await?);
    Ok(())
}

#[tokio::test]
async fn wrong_signer_is_denied() -> Result<()> {
    init_tracing();
    let fx = GuardFixture::new();
    let guard = guard_over(&fx, GuardFixture::signed())?;

    // Signed by someone else under the same scheme.
    let other = GuardFixture::new();
    other.keys.insert(
        SIGNER_KEY,
        nodeguard::KeyMaterial::ed25519_signing([0x07; 32]),
    );
    let forger = guard_over(&other, GuardFixture::signed())?;
    let bytes = forger
        .permissions()
        .pipeline()
        .execute(module_manifest(&guard, ARTIFACT)?)?;

    fx.provider.put(guard.permissions().manifest_uri(MODULE), bytes);
    fx.provider
        .put(guard.permissions().artifact_uri(MODULE), ARTIFACT.to_vec());

    let err = guard.retrieve_permissions(MODULE).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::VerificationFailed);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_callers_share_one_load() -> Result<()> {
    init_tracing();
    let fx = GuardFixture::with_provider(MemoryChannelProvider::with_latency(Duration::from_millis(25)));
    let guard = Arc::new(guard_over(&fx, GuardFixture::signed())?);

    guard.publish_manifest(&module_manifest(&guard, ARTIFACT)?).await?;
    fx.provider
        .put(guard.permissions().artifact_uri(MODULE), ARTIFACT.to_vec());

    let mut handles = Vec::new();
    for i in 0..32 {
        let guard = Arc::clone(&guard);
        handles.push(tokio::spawn(async move {
            guard
                .is_authorized(MODULE, "publish", &format!("ndn:/intel/node/{i}"))
                .await
        }));
    }
    for handle in handles {
        assert!(handle.await??);
    }

    let manifest_uri = guard.permissions().manifest_uri(MODULE);
    assert_eq!(fx.provider.read_count(&manifest_uri), 1);
    assert_eq!(
        fx.provider
            .read_count(&guard.permissions().artifact_uri(MODULE)),
        1
    );
    Ok(())
}

#[tokio::test]
async fn reload_picks_up_new_grants() -> Result<()> {
    init_tracing();
    let fx = GuardFixture::new();
    let guard = guard_over(&fx, GuardFixture::signed())?;

    guard.publish_manifest(&module_manifest(&guard, ARTIFACT)?).await?;
    fx.provider
        .put(guard.permissions().artifact_uri(MODULE), ARTIFACT.to_vec());
    assert!(!guard.is_authorized(MODULE, "delete", "ndn:/intel/node/1").await?);

    let hash = ModuleHash::compute(guard.registry(), ids::SHA256, ARTIFACT)?;
    let widened = PermissionsManifest::builder(MODULE, hash)
        .grant("*", "ndn:/intel/*", "ChannelPermission")
        .build();
    guard.publish_manifest(&widened).await?;

    // Cached until reloaded.
    assert!(!guard.is_authorized(MODULE, "delete", "ndn:/intel/node/1").await?);
    guard.permissions().reload(MODULE).await?;
    assert!(guard.is_authorized(MODULE, "delete", "ndn:/intel/node/1").await?);
    Ok(())
}
