//! Envelope messages produced by the security operations.
//!
//! Envelopes are ordinary typed messages. Binary fields are carried as
//! standard base64 strings so they survive text formats.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Output of a signature, MAC or hash stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SignedMessage {
    /// Registry id of the scheme that produced `signature`.
    pub scheme_id: String,

    /// Signature, tag or digest over `content`.
    #[serde(with = "base64_bytes")]
    pub signature: Bytes,

    /// The protected payload.
    #[serde(with = "base64_bytes")]
    pub content: Bytes,
}

impl SignedMessage {
    pub fn new(scheme_id: impl Into<String>, signature: impl Into<Bytes>, content: impl Into<Bytes>) -> Self {
        Self {
            scheme_id: scheme_id.into(),
            signature: signature.into(),
            content: content.into(),
        }
    }
}

/// Output of an encryption stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct EncryptedMessage {
    pub scheme_id: String,

    #[serde(with = "base64_bytes")]
    pub nonce: Bytes,

    /// Ciphertext with the authentication tag appended.
    #[serde(with = "base64_bytes")]
    pub ciphertext: Bytes,
}

mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use bytes::Bytes;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &Bytes, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Bytes, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map(Bytes::from)
            .map_err(serde::de::Error::custom)
    }
}
