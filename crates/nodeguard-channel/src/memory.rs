//! In-memory channel provider.
//!
//! Primarily for testing. Resources are byte blobs keyed by the exact URI
//! string; all data is lost when the last provider handle is dropped.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;

use crate::error::{ChannelError, Result};
use crate::traits::{Channel, ChannelMode, ChannelProvider};

#[derive(Default)]
struct MemoryInner {
    resources: RwLock<HashMap<String, Bytes>>,
    reads: RwLock<HashMap<String, usize>>,
    latency: Option<Duration>,
}

/// Provider over a shared in-memory map. Clones share the same resources.
#[derive(Clone, Default)]
pub struct MemoryChannelProvider {
    inner: Arc<MemoryInner>,
}

impl MemoryChannelProvider {
    /// Create an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty provider whose reads take at least `latency`.
    ///
    /// Useful to make concurrent readers overlap in tests.
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            inner: Arc::new(MemoryInner {
                latency: Some(latency),
                ..MemoryInner::default()
            }),
        }
    }

    /// Store `bytes` at `uri`, replacing any previous content.
    pub fn put(&self, uri: impl Into<String>, bytes: impl Into<Bytes>) {
        self.inner
            .resources
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(uri.into(), bytes.into());
    }

    /// Current content at `uri`.
    pub fn get(&self, uri: &str) -> Option<Bytes> {
        self.inner
            .resources
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(uri)
            .cloned()
    }

    /// Delete the resource at `uri`.
    pub fn remove(&self, uri: &str) -> Option<Bytes> {
        self.inner
            .resources
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(uri)
    }

    /// How many times `uri` has been read through a channel.
    pub fn read_count(&self, uri: &str) -> usize {
        self.inner
            .reads
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(uri)
            .copied()
            .unwrap_or(0)
    }
}

#[async_trait]
impl ChannelProvider for MemoryChannelProvider {
    async fn open(&self, uri: &str, mode: ChannelMode) -> Result<Box<dyn Channel>> {
        if mode == ChannelMode::Read && self.get(uri).is_none() {
            return Err(ChannelError::NotFound(uri.to_string()));
        }

        debug!(uri, %mode, "opened memory channel");
        Ok(Box::new(MemoryChannel {
            uri: uri.to_string(),
            mode,
            inner: Arc::clone(&self.inner),
            closed: AtomicBool::new(false),
        }))
    }
}

struct MemoryChannel {
    uri: String,
    mode: ChannelMode,
    inner: Arc<MemoryInner>,
    closed: AtomicBool,
}

impl MemoryChannel {
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
impl Channel for MemoryChannel {
    fn uri(&self) -> &str {
        &self.uri
    }

    async fn read_all(&self) -> Result<Bytes> {
        self.check(ChannelMode::Read)?;

        if let Some(latency) = self.inner.latency {
            tokio::time::sleep(latency).await;
        }

        *self
            .inner
            .reads
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(self.uri.clone())
            .or_insert(0) += 1;

        self.inner
            .resources
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&self.uri)
            .cloned()
            .ok_or_else(|| ChannelError::NotFound(self.uri.clone()))
    }

    async fn write_all(&self, bytes: Bytes) -> Result<()> {
        self.check(ChannelMode::Write)?;

        self.inner
            .resources
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(self.uri.clone(), bytes);
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::Release);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_then_read() {
        let provider = MemoryChannelProvider::new();

        let writer = provider.open("mem:/a", ChannelMode::Write).await.unwrap();
        writer.write_all(Bytes::from_static(b"hello")).await.unwrap();
        writer.close().await.unwrap();

        let reader = provider.open("mem:/a", ChannelMode::Read).await.unwrap();
        assert_eq!(reader.uri(), "mem:/a");
        assert_eq!(reader.read_all().await.unwrap(), Bytes::from_static(b"hello"));
        assert_eq!(provider.read_count("mem:/a"), 1);
    }

    #[tokio::test]
    async fn test_open_missing_for_read() {
        let provider = MemoryChannelProvider::new();
        let err = provider
            .open("mem:/missing", ChannelMode::Read)
            .await
            .err()
            .unwrap();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_mode_and_close_enforced() {
        let provider = MemoryChannelProvider::new();
        provider.put("mem:/a", b"x".to_vec());

        let reader = provider.open("mem:/a", ChannelMode::Read).await.unwrap();
        assert!(matches!(
            reader.write_all(Bytes::new()).await,
            Err(ChannelError::ModeViolation { .. })
        ));

        reader.close().await.unwrap();
        reader.close().await.unwrap();
        assert!(matches!(reader.read_all().await, Err(ChannelError::Closed(_))));
    }

    #[tokio::test]
    async fn test_clones_share_resources() {
        let provider = MemoryChannelProvider::new();
        let other = provider.clone();
        other.put("mem:/shared", b"1".to_vec());

        assert_eq!(provider.get("mem:/shared"), Some(Bytes::from_static(b"1")));
        assert_eq!(provider.remove("mem:/shared"), Some(Bytes::from_static(b"1")));
        assert!(other.get("mem:/shared").is_none());
    }
}
