//! # NodeGuard Channel
//!
//! The byte-endpoint capability consumed by the permission manager and by
//! publishers.
//!
//! A [`ChannelProvider`] opens a [`Channel`] for a URI in read or write
//! mode. Channels move whole resources; message framing and verification
//! happen in pipelines, never here.
//!
//! ## Providers
//!
//! - [`MemoryChannelProvider`] - Shared in-process map, for tests
//! - [`FileChannelProvider`] - Files below a root directory (tokio::fs)

pub mod error;
pub mod file;
pub mod memory;
pub mod traits;

pub use error::{ChannelError, Result};
pub use file::FileChannelProvider;
pub use memory::MemoryChannelProvider;
pub use traits::{Channel, ChannelMode, ChannelProvider};
