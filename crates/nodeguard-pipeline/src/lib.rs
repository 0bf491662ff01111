//! # NodeGuard Pipeline
//!
//! Composable, reversible message pipelines.
//!
//! A pipeline is built once from [`Operation`]s and run forward to encode a
//! typed message into bytes, or backward to decode and verify bytes into a
//! typed message. The engine does no I/O.
//!
//! ## Key Types
//!
//! - [`Pipeline`] / [`PipelineBuilder`] - Typed operation chains
//! - [`Operation`] - One reversible stage
//! - [`FormattingOperation`] - JSON or CBOR serialization of a typed message
//! - [`SignatureOperation`], [`HashOperation`], [`EncryptionOperation`] -
//!   Integrity and confidentiality stages producing envelopes
//! - [`SignedMessage`], [`EncryptedMessage`] - Envelope messages
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use nodeguard_crypto::{ids, CryptoRegistry, KeyMaterial, KeyRing};
//! use nodeguard_pipeline::{FormattingOperation, PipelineBuilder, SignatureOperation, SignedMessage};
//!
//! let registry = Arc::new(CryptoRegistry::builtin());
//! let keys = Arc::new(KeyRing::new().with_key("node", KeyMaterial::secret(b"k".to_vec())));
//!
//! let pipeline = PipelineBuilder::<Vec<String>, Vec<String>>::new()
//!     .add_operation(FormattingOperation::<Vec<String>, _>::json())
//!     .add_operation(SignatureOperation::new(registry, ids::HMAC_SHA512, keys, "node").unwrap())
//!     .add_operation(FormattingOperation::<SignedMessage, _>::json())
//!     .build();
//!
//! let message = vec!["subscribe".to_string()];
//! let wire = pipeline.execute(message.clone()).unwrap();
//! assert_eq!(pipeline.execute_backward(wire).unwrap(), message);
//! ```

pub mod envelope;
pub mod error;
pub mod format;
pub mod operation;
pub mod pipeline;
pub mod security;

pub use envelope::{EncryptedMessage, SignedMessage};
pub use error::{Direction, FormatError, OperationError, OperationResult, PipelineError, Result};
pub use format::{message_pipeline, CborFormat, Format, FormattingOperation, JsonFormat};
pub use operation::Operation;
pub use pipeline::{Pipeline, PipelineBuilder};
pub use security::{EncryptionOperation, HashOperation, SignatureOperation};
