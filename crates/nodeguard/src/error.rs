//! Error types for NodeGuard.

use nodeguard_channel::ChannelError;
use nodeguard_crypto::{CryptoError, ErrorKind};
use nodeguard_perms::PermsError;
use nodeguard_pipeline::PipelineError;
use thiserror::Error;

/// Errors that can occur during NodeGuard operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GuardError {
    /// Permission loading or verification error.
    #[error("permission error: {0}")]
    Permission(#[from] PermsError),

    /// Pipeline error.
    #[error("pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Crypto registry or key error.
    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    /// Channel error.
    #[error("channel error: {0}")]
    Channel(#[from] ChannelError),

    /// Configuration could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl GuardError {
    /// The taxonomy bucket for this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            GuardError::Permission(e) => e.kind(),
            GuardError::Pipeline(e) => e.kind(),
            GuardError::Crypto(e) => e.kind(),
            GuardError::Channel(_) => ErrorKind::Transport,
            GuardError::Config(_) => ErrorKind::FormatDecoding,
        }
    }
}

/// Result type for NodeGuard operations.
pub type Result<T> = std::result::Result<T, GuardError>;
