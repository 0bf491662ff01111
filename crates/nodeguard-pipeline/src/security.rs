//! Integrity and confidentiality stages.
//!
//! Each stage wraps a payload in an envelope on the forward pass and checks
//! and strips it on the backward pass. The envelope names the scheme that
//! produced it. On the way back that id is resolved through the registry
//! (unknown ids fail as unsupported) and must be the scheme the stage was
//! configured with.

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use nodeguard_crypto::{
    CipherScheme, CryptoError, CryptoRegistry, HashScheme, KeyReference, KeyResolver, MacScheme,
    Scheme, SchemeFamily, SignatureScheme,
};

use crate::envelope::{EncryptedMessage, SignedMessage};
use crate::error::{OperationError, OperationResult};
use crate::operation::Operation;

/// A scheme that needs a key to produce an integrity tag.
#[derive(Clone)]
enum KeyedScheme {
    Mac(Arc<dyn MacScheme>),
    Signature(Arc<dyn SignatureScheme>),
}

impl KeyedScheme {
    fn from_scheme(scheme: Scheme) -> Result<Self, CryptoError> {
        match scheme {
            Scheme::Mac(s) => Ok(KeyedScheme::Mac(s)),
            Scheme::Signature(s) => Ok(KeyedScheme::Signature(s)),
            other => Err(CryptoError::WrongFamily {
                scheme: other.id().to_string(),
                expected: SchemeFamily::Signature,
                actual: other.family(),
            }),
        }
    }

    fn id(&self) -> &str {
        match self {
            KeyedScheme::Mac(s) => s.id(),
            KeyedScheme::Signature(s) => s.id(),
        }
    }
}

/// Signs (or MACs) the payload with a resolved key.
///
/// Accepts schemes of the signature and MAC families.
pub struct SignatureOperation {
    registry: Arc<CryptoRegistry>,
    scheme: KeyedScheme,
    keys: Arc<dyn KeyResolver>,
    key: KeyReference,
}

impl SignatureOperation {
    /// Fails with `UnsupportedScheme` if `scheme_id` is unknown or names a
    /// hash or cipher scheme.
    pub fn new(
        registry: Arc<CryptoRegistry>,
        scheme_id: &str,
        keys: Arc<dyn KeyResolver>,
        key: impl Into<KeyReference>,
    ) -> Result<Self, CryptoError> {
        let scheme = KeyedScheme::from_scheme(registry.resolve(scheme_id)?)?;
        Ok(Self {
            registry,
            scheme,
            keys,
            key: key.into(),
        })
    }

    /// The configured scheme id.
    pub fn scheme_id(&self) -> &str {
        self.scheme.id()
    }

    /// The key this stage signs and verifies with.
    pub fn key(&self) -> &KeyReference {
        &self.key
    }
}

impl Operation<Bytes, SignedMessage> for SignatureOperation {
    fn name(&self) -> String {
        format!("signature({})", self.scheme.id())
    }

    fn forward(&self, content: Bytes) -> OperationResult<SignedMessage> {
        let key = self.keys.resolve(&self.key)?;
        let signature = match &self.scheme {
            KeyedScheme::Mac(s) => s.mac(&key, &content)?,
            KeyedScheme::Signature(s) => s.sign(&key, &content)?,
        };
        Ok(SignedMessage::new(self.scheme.id(), signature, content))
    }

    fn backward(&self, message: SignedMessage) -> OperationResult<Bytes> {
        let embedded = KeyedScheme::from_scheme(self.registry.resolve(&message.scheme_id)?)?;
        expect_configured(embedded.id(), self.scheme.id())?;

        let key = self.keys.resolve(&self.key)?;
        let valid = match &embedded {
            KeyedScheme::Mac(s) => s.verify(&key, &message.content, &message.signature)?,
            KeyedScheme::Signature(s) => s.verify(&key, &message.content, &message.signature)?,
        };

        if !valid {
            return Err(OperationError::verification(
                embedded.id(),
                "signature does not match content",
            ));
        }
        Ok(message.content)
    }
}

impl fmt::Debug for SignatureOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignatureOperation")
            .field("scheme", &self.scheme.id())
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

/// Attaches an unkeyed digest of the payload.
///
/// Detects corruption, not forgery: anyone can recompute the digest.
pub struct HashOperation {
    registry: Arc<CryptoRegistry>,
    scheme: Arc<dyn HashScheme>,
}

impl HashOperation {
    pub fn new(registry: Arc<CryptoRegistry>, scheme_id: &str) -> Result<Self, CryptoError> {
        let scheme = registry.hash_scheme(scheme_id)?;
        Ok(Self { registry, scheme })
    }

    pub fn scheme_id(&self) -> &str {
        self.scheme.id()
    }
}

impl Operation<Bytes, SignedMessage> for HashOperation {
    fn name(&self) -> String {
        format!("hash({})", self.scheme.id())
    }

    fn forward(&self, content: Bytes) -> OperationResult<SignedMessage> {
        let digest = self.scheme.hash(&content);
        Ok(SignedMessage::new(self.scheme.id(), digest, content))
    }

    fn backward(&self, message: SignedMessage) -> OperationResult<Bytes> {
        let embedded = self.registry.hash_scheme(&message.scheme_id)?;
        expect_configured(embedded.id(), self.scheme.id())?;

        if !embedded.hash_equals(&message.content, &message.signature) {
            return Err(OperationError::verification(
                embedded.id(),
                "digest does not match content",
            ));
        }
        Ok(message.content)
    }
}

impl fmt::Debug for HashOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashOperation")
            .field("scheme", &self.scheme.id())
            .finish()
    }
}

/// Encrypts the payload with an AEAD scheme and a fresh nonce per message.
pub struct EncryptionOperation {
    registry: Arc<CryptoRegistry>,
    scheme: Arc<dyn CipherScheme>,
    keys: Arc<dyn KeyResolver>,
    key: KeyReference,
}

impl EncryptionOperation {
    pub fn new(
        registry: Arc<CryptoRegistry>,
        scheme_id: &str,
        keys: Arc<dyn KeyResolver>,
        key: impl Into<KeyReference>,
    ) -> Result<Self, CryptoError> {
        let scheme = registry.cipher_scheme(scheme_id)?;
        Ok(Self {
            registry,
            scheme,
            keys,
            key: key.into(),
        })
    }

    pub fn scheme_id(&self) -> &str {
        self.scheme.id()
    }
}

impl Operation<Bytes, EncryptedMessage> for EncryptionOperation {
    fn name(&self) -> String {
        format!("encryption({})", self.scheme.id())
    }

    fn forward(&self, plaintext: Bytes) -> OperationResult<EncryptedMessage> {
        let key = self.keys.resolve(&self.key)?;
        let nonce = self.scheme.generate_nonce();
        let ciphertext = self.scheme.seal(&key, &nonce, &plaintext)?;

        Ok(EncryptedMessage {
            scheme_id: self.scheme.id().to_string(),
            nonce: Bytes::from(nonce),
            ciphertext: Bytes::from(ciphertext),
        })
    }

    fn backward(&self, message: EncryptedMessage) -> OperationResult<Bytes> {
        let embedded = self.registry.cipher_scheme(&message.scheme_id)?;
        expect_configured(embedded.id(), self.scheme.id())?;

        if message.nonce.len() != embedded.nonce_len() {
            return Err(OperationError::verification(
                embedded.id(),
                format!("nonce has {} bytes, expected {}", message.nonce.len(), embedded.nonce_len()),
            ));
        }

        let key = self.keys.resolve(&self.key)?;
        match embedded.open(&key, &message.nonce, &message.ciphertext)? {
            Some(plaintext) => Ok(Bytes::from(plaintext)),
            None => Err(OperationError::verification(
                embedded.id(),
                "authentication tag mismatch",
            )),
        }
    }
}

impl fmt::Debug for EncryptionOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptionOperation")
            .field("scheme", &self.scheme.id())
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

/// A known scheme other than the configured one is a rejected envelope.
fn expect_configured(embedded: &str, configured: &str) -> OperationResult<()> {
    if embedded != configured {
        return Err(OperationError::verification(
            embedded,
            format!("envelope scheme differs from configured {configured}"),
        ));
    }
    Ok(())
}
