//! Error types for pipelines and their operations.

use std::fmt;

use nodeguard_crypto::{CryptoError, ErrorKind};
use thiserror::Error;

/// Which way a pipeline is being run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Typed message towards bytes (encode).
    Forward,
    /// Bytes towards typed message (decode).
    Backward,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Forward => f.write_str("forward"),
            Direction::Backward => f.write_str("backward"),
        }
    }
}

/// Serialization failures of a [`Format`](crate::format::Format).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("{format} encoding failed: {reason}")]
    Encode { format: &'static str, reason: String },

    #[error("{format} decoding failed: {reason}")]
    Decode { format: &'static str, reason: String },
}

/// Failure of a single operation, before the pipeline adds context.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OperationError {
    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// The check ran and did not match. Tampered or wrong data.
    #[error("verification failed ({scheme}): {reason}")]
    VerificationFailed { scheme: String, reason: String },
}

impl OperationError {
    /// The taxonomy bucket for this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            OperationError::Format(_) => ErrorKind::FormatDecoding,
            OperationError::Crypto(e) => e.kind(),
            OperationError::VerificationFailed { .. } => ErrorKind::VerificationFailed,
        }
    }

    pub(crate) fn verification(scheme: &str, reason: impl Into<String>) -> Self {
        OperationError::VerificationFailed {
            scheme: scheme.to_string(),
            reason: reason.into(),
        }
    }
}

/// A pipeline failure: which operation failed, in which direction, and why.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{direction} {operation} failed: {source}")]
pub struct PipelineError {
    pub operation: String,
    pub direction: Direction,
    pub source: OperationError,
}

impl PipelineError {
    pub fn new(operation: impl Into<String>, direction: Direction, source: OperationError) -> Self {
        Self {
            operation: operation.into(),
            direction,
            source,
        }
    }

    /// The taxonomy bucket for this error.
    pub fn kind(&self) -> ErrorKind {
        self.source.kind()
    }

    /// Whether the pipeline rejected the input as tampered.
    pub fn is_verification_failure(&self) -> bool {
        self.kind() == ErrorKind::VerificationFailed
    }
}

/// Result type for operations.
pub type OperationResult<T> = std::result::Result<T, OperationError>;

/// Result type for pipelines.
pub type Result<T> = std::result::Result<T, PipelineError>;
