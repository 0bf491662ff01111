//! Error types for the permissions module.

use nodeguard_channel::ChannelError;
use nodeguard_crypto::{CryptoError, ErrorKind};
use nodeguard_pipeline::PipelineError;
use thiserror::Error;

/// Errors that can occur while loading or verifying module permissions.
///
/// Cloneable: every waiter of a shared load receives the same error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PermsError {
    /// No manifest exists for the module.
    #[error("unknown module: {0}")]
    ModuleUnknown(String),

    /// The manifest or artifact could not be opened or read.
    #[error("transport error for {module}: {source}")]
    Transport {
        module: String,
        #[source]
        source: ChannelError,
    },

    /// The decode pipeline rejected the manifest bytes.
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// Scheme lookup or computation failed outside the pipeline.
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// The manifest parsed but a field is unusable.
    #[error("malformed manifest for {module}: {reason}")]
    MalformedManifest { module: String, reason: String },

    /// Hash, signature or identity check ran and did not match.
    #[error("verification failed for {module}: {reason}")]
    VerificationFailed { module: String, reason: String },
}

impl PermsError {
    /// The taxonomy bucket for this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            PermsError::ModuleUnknown(_) => ErrorKind::ModuleUnknown,
            PermsError::Transport { .. } => ErrorKind::Transport,
            PermsError::Pipeline(e) => e.kind(),
            PermsError::Crypto(e) => e.kind(),
            PermsError::MalformedManifest { .. } => ErrorKind::FormatDecoding,
            PermsError::VerificationFailed { .. } => ErrorKind::VerificationFailed,
        }
    }

    /// Whether this outcome means "not authorized" rather than "cannot tell".
    pub fn is_denial(&self) -> bool {
        self.kind().is_denial()
    }

    pub(crate) fn verification(module: &str, reason: impl Into<String>) -> Self {
        PermsError::VerificationFailed {
            module: module.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type for permission operations.
pub type Result<T> = std::result::Result<T, PermsError>;
