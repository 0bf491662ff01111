//! Node messages from the platform catalog, used as formatting fixtures.

use serde::{Deserialize, Serialize};

/// Self-description a node publishes on startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeInfoMessage {
    pub name: String,
    pub uri: String,
    pub features: Vec<String>,
    pub channels: Vec<String>,
    pub mesh: Vec<MeshEntry>,
    pub version: String,
}

/// One face of the node's mesh configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeshEntry {
    pub uri: String,
    pub local: bool,
}

impl NodeInfoMessage {
    pub fn new(
        name: impl Into<String>,
        uri: impl Into<String>,
        features: &[&str],
        channels: &[&str],
    ) -> Self {
        Self {
            name: name.into(),
            uri: uri.into(),
            features: features.iter().map(|s| s.to_string()).collect(),
            channels: channels.iter().map(|s| s.to_string()).collect(),
            mesh: Vec::new(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    pub fn with_mesh(mut self, uri: impl Into<String>, local: bool) -> Self {
        self.mesh.push(MeshEntry {
            uri: uri.into(),
            local,
        });
        self
    }
}

/// Node lifecycle event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeEvent {
    pub node: String,
    pub action: NodeAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeAction {
    Started,
    Stopped,
}

impl NodeEvent {
    pub fn started(node: impl Into<String>) -> Self {
        Self {
            node: node.into(),
            action: NodeAction::Started,
        }
    }

    pub fn stopped(node: impl Into<String>) -> Self {
        Self {
            node: node.into(),
            action: NodeAction::Stopped,
        }
    }
}
