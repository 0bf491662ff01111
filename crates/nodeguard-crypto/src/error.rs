//! Error types for the crypto primitive registry.

use std::fmt;

use thiserror::Error;

use crate::scheme::SchemeFamily;

/// Classification shared by every NodeGuard error type.
///
/// Callers use the kind to tell "permission denied" apart from
/// "cannot determine permission".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bytes did not parse into the expected shape.
    FormatDecoding,
    /// A scheme id is not registered (or names the wrong family).
    UnsupportedScheme,
    /// A cryptographic computation could not be carried out.
    CryptoOperation,
    /// A check ran and produced a mismatch.
    VerificationFailed,
    /// Channel open/read/write failed.
    Transport,
    /// No manifest exists for the requested module.
    ModuleUnknown,
}

impl ErrorKind {
    /// Whether this kind is a legitimate "not authorized" outcome rather
    /// than an infrastructure failure.
    pub fn is_denial(&self) -> bool {
        matches!(self, ErrorKind::VerificationFailed | ErrorKind::ModuleUnknown)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::FormatDecoding => "format decoding",
            ErrorKind::UnsupportedScheme => "unsupported scheme",
            ErrorKind::CryptoOperation => "crypto operation",
            ErrorKind::VerificationFailed => "verification failed",
            ErrorKind::Transport => "transport",
            ErrorKind::ModuleUnknown => "module unknown",
        };
        f.write_str(name)
    }
}

/// Errors raised by scheme lookup, key resolution and scheme computations.
///
/// A signature or MAC mismatch is not an error at this layer: `verify`
/// returns `Ok(false)` and the caller decides what a mismatch means.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("scheme {scheme} is a {actual} scheme, expected {expected}")]
    WrongFamily {
        scheme: String,
        expected: SchemeFamily,
        actual: SchemeFamily,
    },

    #[error("duplicate scheme id: {0}")]
    DuplicateScheme(String),

    #[error("invalid key for {scheme}: {reason}")]
    InvalidKey { scheme: String, reason: String },

    #[error("key not found: {0}")]
    KeyNotFound(String),

    #[error("malformed signature for {scheme}: {reason}")]
    MalformedSignature { scheme: String, reason: String },

    #[error("{scheme} operation failed: {reason}")]
    OperationFailed { scheme: String, reason: String },
}

impl CryptoError {
    /// The taxonomy bucket for this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CryptoError::UnsupportedScheme(_)
            | CryptoError::WrongFamily { .. }
            | CryptoError::DuplicateScheme(_) => ErrorKind::UnsupportedScheme,
            CryptoError::InvalidKey { .. }
            | CryptoError::KeyNotFound(_)
            | CryptoError::MalformedSignature { .. }
            | CryptoError::OperationFailed { .. } => ErrorKind::CryptoOperation,
        }
    }

    pub(crate) fn invalid_key(scheme: &str, reason: impl Into<String>) -> Self {
        CryptoError::InvalidKey {
            scheme: scheme.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn failed(scheme: &str, reason: impl fmt::Display) -> Self {
        CryptoError::OperationFailed {
            scheme: scheme.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Result type for crypto operations.
pub type Result<T> = std::result::Result<T, CryptoError>;
