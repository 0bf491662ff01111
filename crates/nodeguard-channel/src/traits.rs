//! Channel traits: the abstract interface for byte endpoints.
//!
//! The permission manager and publishers only see these traits. Concrete
//! transports live outside this workspace; the in-memory and file providers
//! here cover tests and single-node deployments.

use std::fmt;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::Result;

/// Direction a channel was opened for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelMode {
    Read,
    Write,
}

impl fmt::Display for ChannelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelMode::Read => f.write_str("read"),
            ChannelMode::Write => f.write_str("write"),
        }
    }
}

/// An open endpoint.
///
/// A channel is used by one task at a time. After `close` every other call
/// fails with [`ChannelError::Closed`](crate::ChannelError::Closed).
#[async_trait]
pub trait Channel: Send + Sync {
    /// The URI this channel was opened with.
    fn uri(&self) -> &str;

    /// Read the whole resource. Only valid in [`ChannelMode::Read`].
    async fn read_all(&self) -> Result<Bytes>;

    /// Replace the whole resource. Only valid in [`ChannelMode::Write`].
    async fn write_all(&self, bytes: Bytes) -> Result<()>;

    /// Release the endpoint. Closing twice is a no-op.
    async fn close(&self) -> Result<()>;
}

/// Opens channels by URI.
#[async_trait]
pub trait ChannelProvider: Send + Sync {
    /// Open `uri` for `mode`.
    ///
    /// Opening for read fails with `NotFound` when nothing exists at `uri`.
    async fn open(&self, uri: &str, mode: ChannelMode) -> Result<Box<dyn Channel>>;
}
