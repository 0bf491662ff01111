//! Error types for channels.

use thiserror::Error;

use crate::traits::ChannelMode;

/// Errors that can occur while opening or using a channel.
///
/// Cloneable so a single failed read can be reported to several waiters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChannelError {
    /// Nothing exists at the URI.
    #[error("resource not found: {0}")]
    NotFound(String),

    /// Underlying I/O failure.
    #[error("I/O error on {uri}: {reason}")]
    Io { uri: String, reason: String },

    /// The URI cannot name a resource of this provider.
    #[error("invalid URI {uri}: {reason}")]
    InvalidUri { uri: String, reason: String },

    /// The channel was used after `close`.
    #[error("channel closed: {0}")]
    Closed(String),

    /// Read on a write channel or the reverse.
    #[error("channel {uri} is open for {mode}")]
    ModeViolation { uri: String, mode: ChannelMode },

    /// The provider does not handle this URI scheme.
    #[error("unsupported URI scheme: {0}")]
    UnsupportedScheme(String),
}

impl ChannelError {
    /// Whether the resource is absent, as opposed to unreachable.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ChannelError::NotFound(_))
    }

    pub(crate) fn io(uri: &str, err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            return ChannelError::NotFound(uri.to_string());
        }
        ChannelError::Io {
            uri: uri.to_string(),
            reason: err.to_string(),
        }
    }
}

/// Result type for channel operations.
pub type Result<T> = std::result::Result<T, ChannelError>;
