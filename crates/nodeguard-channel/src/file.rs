//! File-backed channel provider.
//!
//! Serves `file:` URIs and bare relative paths from below a root directory.
//! A leading `/` is relative to the root, never the filesystem root, and
//! `..` components are rejected.

use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;

use crate::error::{ChannelError, Result};
use crate::traits::{Channel, ChannelMode, ChannelProvider};

const FILE_SCHEME: &str = "file:";

/// Provider over a directory tree.
#[derive(Debug, Clone)]
pub struct FileChannelProvider {
    root: PathBuf,
}

impl FileChannelProvider {
    /// Serve files below `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a URI to a path below the root.
    pub fn resolve(&self, uri: &str) -> Result<PathBuf> {
        let path = match uri.strip_prefix(FILE_SCHEME) {
            Some(rest) => rest.trim_start_matches("//"),
            None => {
                if let Some(scheme) = uri_scheme(uri) {
                    return Err(ChannelError::UnsupportedScheme(scheme.to_string()));
                }
                uri
            }
        };

        let relative = Path::new(path.trim_start_matches('/'));
        let mut resolved = self.root.clone();
        for component in relative.components() {
            match component {
                Component::Normal(part) => resolved.push(part),
                Component::CurDir => {}
                _ => {
                    return Err(ChannelError::InvalidUri {
                        uri: uri.to_string(),
                        reason: "path escapes the channel root".into(),
                    })
                }
            }
        }

        if resolved == self.root {
            return Err(ChannelError::InvalidUri {
                uri: uri.to_string(),
                reason: "empty path".into(),
            });
        }
        Ok(resolved)
    }
}

/// The scheme part of `scheme:rest`, if `uri` has one.
fn uri_scheme(uri: &str) -> Option<&str> {
    let (scheme, _) = uri.split_once(':')?;
    let valid = !scheme.is_empty()
        && scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    valid.then_some(scheme)
}

#[async_trait]
impl ChannelProvider for FileChannelProvider {
    async fn open(&self, uri: &str, mode: ChannelMode) -> Result<Box<dyn Channel>> {
        let path = self.resolve(uri)?;

        if mode == ChannelMode::Read {
            let metadata = tokio::fs::metadata(&path)
                .await
                .map_err(|e| ChannelError::io(uri, e))?;
            if !metadata.is_file() {
                return Err(ChannelError::InvalidUri {
                    uri: uri.to_string(),
                    reason: "not a regular file".into(),
                });
            }
        }

        debug!(uri, path = %path.display(), %mode, "opened file channel");
        Ok(Box::new(FileChannel {
            uri: uri.to_string(),
            path,
            mode,
            closed: AtomicBool::new(false),
        }))
    }
}

struct FileChannel {
    uri: String,
    path: PathBuf,
    mode: ChannelMode,
    closed: AtomicBool,
}

impl FileChannel {
    fn check(&self, mode: ChannelMode) -> Result<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(ChannelError::Closed(self.uri.clone()));
        }
        if self.mode != mode {
            return Err(ChannelError::ModeViolation {
                uri: self.uri.clone(),
                mode: self.mode,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl Channel for FileChannel {
    fn uri(&self) -> &str {
        &self.uri
    }

    async fn read_all(&self) -> Result<Bytes> {
        self.check(ChannelMode::Read)?;
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| ChannelError::io(&self.uri, e))?;
        Ok(Bytes::from(bytes))
    }

    async fn write_all(&self, bytes: Bytes) -> Result<()> {
        self.check(ChannelMode::Write)?;
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ChannelError::io(&self.uri, e))?;
        }
        tokio::fs::write(&self.path, &bytes)
            .await
            .map_err(|e| ChannelError::io(&self.uri, e))
    }

    async fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::Release);
        Ok(())
    }
}
