//! Proptest generators for property-based testing.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use proptest::prelude::*;

use nodeguard_perms::{Grant, ModuleHash, PermissionsManifest};

use crate::messages::{MeshEntry, NodeAction, NodeEvent, NodeInfoMessage};

/// Generate a hierarchical module name, e.g. `/com/intel/module`.
pub fn module_name() -> impl Strategy<Value = String> {
    prop::collection::vec("[a-z][a-z0-9]{0,7}", 1..4).prop_map(|parts| format!("/{}", parts.join("/")))
}

/// Generate a single action token.
pub fn action() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("publish".to_string()),
        Just("subscribe".to_string()),
        Just("delete".to_string()),
        "[a-z]{3,10}",
    ]
}

/// Generate a comma-joined action list.
pub fn action_list() -> impl Strategy<Value = String> {
    prop::collection::vec(action(), 1..4).prop_map(|actions| actions.join(","))
}

/// Generate a concrete target without wildcards.
pub fn target() -> impl Strategy<Value = String> {
    prop::collection::vec("[a-z0-9-]{1,8}", 1..4).prop_map(|parts| format!("ndn:/{}", parts.join("/")))
}

/// Generate a grant with a concrete target.
pub fn grant() -> impl Strategy<Value = Grant> {
    (action_list(), target(), "[A-Z][A-Za-z]{2,15}")
        .prop_map(|(action, target, permission)| Grant::new(action, target, permission))
}

/// Generate a manifest with a syntactically valid (not necessarily
/// matching) hash.
pub fn manifest() -> impl Strategy<Value = PermissionsManifest> {
    (
        module_name(),
        prop_oneof![Just("SHA256"), Just("SHA512"), Just("BLAKE3")],
        any::<[u8; 32]>(),
        prop::collection::vec(grant(), 0..6),
    )
        .prop_map(|(name, algorithm, digest, grants)| PermissionsManifest {
            name,
            hash: ModuleHash {
                hash_algorithm: algorithm.to_string(),
                module_jar_hash: STANDARD.encode(digest),
            },
            grants,
        })
}

/// Generate a node info message with a nested mesh list.
pub fn node_info() -> impl Strategy<Value = NodeInfoMessage> {
    (
        module_name(),
        prop::collection::vec("[a-z]{1,10}", 0..5),
        prop::collection::vec(target(), 0..5),
        prop::collection::vec((target(), any::<bool>()), 0..4),
        "[0-9]\\.[0-9]\\.[0-9]",
    )
        .prop_map(|(name, features, channels, mesh, version)| NodeInfoMessage {
            uri: format!("ndn:{name}"),
            name,
            features,
            channels,
            mesh: mesh
                .into_iter()
                .map(|(uri, local)| MeshEntry { uri, local })
                .collect(),
            version,
        })
}

/// Generate a node lifecycle event.
pub fn node_event() -> impl Strategy<Value = NodeEvent> {
    (module_name(), prop_oneof![Just(NodeAction::Started), Just(NodeAction::Stopped)])
        .prop_map(|(node, action)| NodeEvent { node, action })
}

/// Generate payload bytes of specified max length.
pub fn payload(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..=max_len)
}
