//! The permission manager: loads, verifies and caches module permissions.
//!
//! Per module name the manager moves through
//! `Unloaded → Loading → {Authorized, Denied}`.
//!
//! Loads are single flight. Each module has its own slot holding a
//! `OnceCell` with the outcome of one load; every caller that arrives while
//! the load runs awaits that same cell and sees the same result. A reload
//! runs in a pending slot beside the settled one, and first loads and other
//! reloads arriving meanwhile join it. The slot table lock is only held to
//! look up or swap slots, never across I/O.
//!
//! `Denied` is sticky until [`PermissionManager::reload`] or
//! [`PermissionManager::evict`]. Infrastructure failures and unknown modules
//! are handed to everyone waiting on the flight, then the slot is dropped so
//! the next call loads again.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use bytes::Bytes;
use nodeguard_channel::{ChannelError, ChannelMode, ChannelProvider};
use nodeguard_crypto::{CryptoRegistry, ErrorKind, KeyResolver};
use nodeguard_pipeline::Pipeline;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::config::PermissionsConfig;
use crate::error::{PermsError, Result};
use crate::locator::ResourceLocator;
use crate::manifest::PermissionsManifest;
use crate::permissions::ModulePermissions;

type Outcome = std::result::Result<Arc<ModulePermissions>, PermsError>;

/// Where a module stands in the load state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModuleState {
    Unloaded,
    Loading,
    Authorized,
    Denied,
}

#[derive(Default)]
struct ModuleSlot {
    outcome: OnceCell<Outcome>,
}

/// The settled (or first-loading) slot of a module and an in-flight reload.
#[derive(Default)]
struct ModuleEntry {
    current: Option<Arc<ModuleSlot>>,
    pending: Option<Arc<ModuleSlot>>,
}

impl ModuleEntry {
    fn state(&self) -> ModuleState {
        match (&self.current, &self.pending) {
            (Some(current), _) => current.state(),
            (None, Some(_)) => ModuleState::Loading,
            (None, None) => ModuleState::Unloaded,
        }
    }

    fn is_empty(&self) -> bool {
        self.current.is_none() && self.pending.is_none()
    }
}

impl ModuleSlot {
    fn state(&self) -> ModuleState {
        match self.outcome.get() {
            None => ModuleState::Loading,
            Some(Ok(_)) => ModuleState::Authorized,
            Some(Err(e)) if is_sticky(e) => ModuleState::Denied,
            // Transient failure about to be cleared.
            Some(Err(_)) => ModuleState::Unloaded,
        }
    }
}

/// Only verification failures stay cached.
fn is_sticky(error: &PermsError) -> bool {
    error.kind() == ErrorKind::VerificationFailed
}

/// Loads permission manifests through a channel provider and answers
/// authorization queries.
pub struct PermissionManager {
    provider: Arc<dyn ChannelProvider>,
    registry: Arc<CryptoRegistry>,
    pipeline: Pipeline<PermissionsManifest, Bytes>,
    manifests: ResourceLocator,
    artifacts: ResourceLocator,
    slots: RwLock<HashMap<String, ModuleEntry>>,
}

impl PermissionManager {
    /// Create a manager with the manifest pipeline described by `config`.
    pub fn new(
        config: &PermissionsConfig,
        registry: Arc<CryptoRegistry>,
        keys: Arc<dyn KeyResolver>,
        provider: Arc<dyn ChannelProvider>,
    ) -> Result<Self> {
        let pipeline = config.manifest_pipeline(&registry, &keys)?;
        Ok(Self::with_pipeline(
            pipeline,
            registry,
            provider,
            config.manifests.clone(),
            config.artifacts.clone(),
        ))
    }

    /// Create a manager around an already built manifest pipeline.
    pub fn with_pipeline(
        pipeline: Pipeline<PermissionsManifest, Bytes>,
        registry: Arc<CryptoRegistry>,
        provider: Arc<dyn ChannelProvider>,
        manifests: ResourceLocator,
        artifacts: ResourceLocator,
    ) -> Self {
        Self {
            provider,
            registry,
            pipeline,
            manifests,
            artifacts,
            slots: RwLock::new(HashMap::new()),
        }
    }

    /// The manifest pipeline. Run it forward to produce manifests this
    /// manager accepts.
    pub fn pipeline(&self) -> &Pipeline<PermissionsManifest, Bytes> {
        &self.pipeline
    }

    /// URI the manifest of `module` is read from.
    pub fn manifest_uri(&self, module: &str) -> String {
        self.manifests.locate(module)
    }

    /// URI the artifact of `module` is read from.
    pub fn artifact_uri(&self, module: &str) -> String {
        self.artifacts.locate(module)
    }

    /// Verified permissions of `module`, loading them on first use.
    ///
    /// Fails with `VerificationFailed` when the artifact hash, the signature
    /// or the manifest name does not match, with `ModuleUnknown` when no
    /// manifest exists, and with the underlying kind for transport, format
    /// and scheme failures.
    pub async fn retrieve_permissions(&self, module: &str) -> Result<Arc<ModulePermissions>> {
        let module = normalize(module)?;
        let slot = self.slot(&module);
        self.fly(&module, &slot).await
    }

    /// Whether `module` may perform `action` on `target`.
    ///
    /// `Ok(false)` when no grant matches, the module is denied, or no
    /// manifest exists. Infrastructure failures are errors, never `false`.
    pub async fn is_authorized(&self, module: &str, action: &str, target: &str) -> Result<bool> {
        match self.retrieve_permissions(module).await {
            Ok(permissions) => Ok(permissions.is_authorized(action, target)),
            Err(e) if e.is_denial() => {
                debug!(module, action, target, kind = %e.kind(), "not authorized");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Current state of `module`.
    pub fn state(&self, module: &str) -> ModuleState {
        let Ok(module) = normalize(module) else {
            return ModuleState::Unloaded;
        };
        self.slots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&module)
            .map_or(ModuleState::Unloaded, ModuleEntry::state)
    }

    /// Load `module` again and replace the cached outcome when done.
    ///
    /// Readers keep seeing the previous outcome until the new load finishes.
    /// If the new load fails for a transient reason the previous outcome is
    /// kept. A reload issued while another load of `module` is in flight
    /// joins that load.
    pub async fn reload(&self, module: &str) -> Result<Arc<ModulePermissions>> {
        let module = normalize(module)?;
        let slot = self.reload_slot(&module);
        self.fly(&module, &slot).await
    }

    /// Forget `module`. Returns whether anything was cached.
    pub fn evict(&self, module: &str) -> bool {
        let Ok(module) = normalize(module) else {
            return false;
        };
        self.slots
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&module)
            .is_some()
    }

    /// Modules with a settled outcome (authorized or denied), sorted.
    pub fn loaded_modules(&self) -> Vec<String> {
        let slots = self.slots.read().unwrap_or_else(PoisonError::into_inner);
        let mut modules: Vec<String> = slots
            .iter()
            .filter(|(_, entry)| {
                matches!(entry.state(), ModuleState::Authorized | ModuleState::Denied)
            })
            .map(|(name, _)| name.clone())
            .collect();
        modules.sort();
        modules
    }

    /// The slot a query for `module` awaits: the current one, else a
    /// pending reload, else a fresh first load.
    fn slot(&self, module: &str) -> Arc<ModuleSlot> {
        if let Some(entry) = self
            .slots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(module)
        {
            if let Some(slot) = entry.current.as_ref().or(entry.pending.as_ref()) {
                return Arc::clone(slot);
            }
        }

        let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
        let entry = slots.entry(module.to_string()).or_default();
        if let Some(slot) = entry.current.as_ref().or(entry.pending.as_ref()) {
            return Arc::clone(slot);
        }
        Arc::clone(entry.current.insert(Arc::default()))
    }

    /// The slot a reload of `module` awaits: a pending reload, else a first
    /// load still in flight, else a new pending slot.
    fn reload_slot(&self, module: &str) -> Arc<ModuleSlot> {
        let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
        let entry = slots.entry(module.to_string()).or_default();
        if let Some(pending) = &entry.pending {
            return Arc::clone(pending);
        }
        if let Some(current) = entry.current.as_ref().filter(|c| !c.outcome.initialized()) {
            return Arc::clone(current);
        }
        Arc::clone(entry.pending.insert(Arc::default()))
    }

    async fn fly(&self, module: &str, slot: &Arc<ModuleSlot>) -> Outcome {
        let outcome = slot
            .outcome
            .get_or_init(|| self.load(module))
            .await
            .clone();
        self.settle(module, slot, &outcome);
        outcome
    }

    /// Record a finished flight. A pending reload replaces the current slot
    /// unless it failed transiently; a transient failure of the current
    /// slot clears it. Slots already replaced or evicted are left alone.
    fn settle(&self, module: &str, slot: &Arc<ModuleSlot>, outcome: &Outcome) {
        let keep = match outcome {
            Ok(_) => true,
            Err(e) => is_sticky(e),
        };

        let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
        let Some(entry) = slots.get_mut(module) else {
            return;
        };

        if entry.pending.as_ref().is_some_and(|p| Arc::ptr_eq(p, slot)) {
            entry.pending = None;
            if keep {
                entry.current = Some(Arc::clone(slot));
            }
        } else if !keep && entry.current.as_ref().is_some_and(|c| Arc::ptr_eq(c, slot)) {
            entry.current = None;
        }

        if entry.is_empty() {
            slots.remove(module);
        }
    }

    async fn load(&self, module: &str) -> Outcome {
        debug!(module, "loading permissions");
        let result = self.verify(module).await;

        match &result {
            Ok(permissions) => info!(
                module,
                grants = permissions.len(),
                hash_algorithm = permissions.hash_algorithm(),
                "module authorized"
            ),
            Err(e) if is_sticky(e) => warn!(module, error = %e, "module denied"),
            Err(e) => warn!(module, kind = %e.kind(), error = %e, "permission load failed"),
        }
        result.map(Arc::new)
    }

    async fn verify(&self, module: &str) -> Result<ModulePermissions> {
        let manifest_uri = self.manifests.locate(module);
        let bytes = match self.read(module, &manifest_uri).await {
            Err(PermsError::Transport { source, .. }) if source.is_not_found() => {
                return Err(PermsError::ModuleUnknown(module.to_string()))
            }
            other => other?,
        };

        let manifest = self.pipeline.execute_backward(bytes)?;

        if normalize(&manifest.name).ok().as_deref() != Some(module) {
            return Err(PermsError::verification(
                module,
                format!("manifest is for {:?}", manifest.name),
            ));
        }

        let scheme = self.registry.hash_scheme(&manifest.hash.hash_algorithm)?;
        let expected = manifest
            .hash
            .digest()
            .map_err(|e| PermsError::MalformedManifest {
                module: module.to_string(),
                reason: format!("moduleJarHash is not base64: {e}"),
            })?;

        let artifact = self.read(module, &self.artifacts.locate(module)).await?;
        if !scheme.hash_equals(&artifact, &expected) {
            return Err(PermsError::verification(
                module,
                format!("{} artifact hash mismatch", scheme.id()),
            ));
        }

        Ok(ModulePermissions::verified(&manifest))
    }

    async fn read(&self, module: &str, uri: &str) -> Result<Bytes> {
        let transport = |source: ChannelError| PermsError::Transport {
            module: module.to_string(),
            source,
        };

        let channel = self
            .provider
            .open(uri, ChannelMode::Read)
            .await
            .map_err(transport)?;
        let bytes = channel.read_all().await;
        let closed = channel.close().await;

        let bytes = bytes.map_err(transport)?;
        closed.map_err(transport)?;
        Ok(bytes)
    }
}

/// Canonical module key: exactly one leading `/`.
fn normalize(module: &str) -> Result<String> {
    let trimmed = module.trim().trim_start_matches('/');
    if trimmed.is_empty() {
        return Err(PermsError::ModuleUnknown(module.to_string()));
    }
    Ok(format!("/{trimmed}"))
}
