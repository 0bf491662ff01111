//! Message formats and the formatting operation.
//!
//! A [`Format`] turns any serde-serializable message into bytes and back.
//! [`FormattingOperation`] binds a format to a statically known message type
//! so it can sit in a pipeline.

use std::fmt;
use std::marker::PhantomData;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{FormatError, OperationResult};
use crate::operation::{short_type_name, Operation};
use crate::pipeline::{Pipeline, PipelineBuilder};

/// A self-describing structured encoding.
pub trait Format: Send + Sync {
    /// Short identifier (`json`, `cbor`).
    fn id(&self) -> &'static str;

    /// Serialize a message.
    fn encode<T: Serialize>(&self, message: &T) -> Result<Bytes, FormatError>;

    /// Parse a message. Fails when the bytes do not have the shape of `T`.
    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, FormatError>;
}

/// JSON via serde_json. The manifest wire format.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormat {
    pretty: bool,
}

impl JsonFormat {
    /// Compact output.
    pub fn new() -> Self {
        Self { pretty: false }
    }

    /// Indented output, for files meant to be read by people.
    pub fn pretty() -> Self {
        Self { pretty: true }
    }
}

impl Format for JsonFormat {
    fn id(&self) -> &'static str {
        "json"
    }

    fn encode<T: Serialize>(&self, message: &T) -> Result<Bytes, FormatError> {
        let encoded = if self.pretty {
            serde_json::to_vec_pretty(message)
        } else {
            serde_json::to_vec(message)
        };

        encoded.map(Bytes::from).map_err(|e| FormatError::Encode {
            format: self.id(),
            reason: e.to_string(),
        })
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, FormatError> {
        serde_json::from_slice(bytes).map_err(|e| FormatError::Decode {
            format: self.id(),
            reason: e.to_string(),
        })
    }
}

/// CBOR via ciborium.
#[derive(Debug, Clone, Copy, Default)]
pub struct CborFormat;

impl Format for CborFormat {
    fn id(&self) -> &'static str {
        "cbor"
    }

    fn encode<T: Serialize>(&self, message: &T) -> Result<Bytes, FormatError> {
        let mut buf = Vec::new();
        ciborium::into_writer(message, &mut buf).map_err(|e| FormatError::Encode {
            format: self.id(),
            reason: e.to_string(),
        })?;
        Ok(Bytes::from(buf))
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, FormatError> {
        ciborium::from_reader(bytes).map_err(|e| FormatError::Decode {
            format: self.id(),
            reason: e.to_string(),
        })
    }
}

/// Serializes `T` on the forward pass and parses it on the backward pass.
pub struct FormattingOperation<T, F = JsonFormat> {
    format: F,
    _message: PhantomData<fn() -> T>,
}

impl<T, F: Format> FormattingOperation<T, F> {
    /// Bind `format` to message type `T`.
    pub fn new(format: F) -> Self {
        Self {
            format,
            _message: PhantomData,
        }
    }

    /// The bound format.
    pub fn format(&self) -> &F {
        &self.format
    }
}

impl<T> FormattingOperation<T, JsonFormat> {
    /// Compact JSON.
    pub fn json() -> Self {
        Self::new(JsonFormat::new())
    }
}

impl<T> FormattingOperation<T, CborFormat> {
    /// CBOR.
    pub fn cbor() -> Self {
        Self::new(CborFormat)
    }
}

impl<T, F> Operation<T, Bytes> for FormattingOperation<T, F>
where
    T: Serialize + DeserializeOwned,
    F: Format,
{
    fn name(&self) -> String {
        format!("format({}:{})", self.format.id(), short_type_name::<T>())
    }

    fn forward(&self, input: T) -> OperationResult<Bytes> {
        Ok(self.format.encode(&input)?)
    }

    fn backward(&self, input: Bytes) -> OperationResult<T> {
        Ok(self.format.decode(&input)?)
    }
}

impl<T, F: fmt::Debug> fmt::Debug for FormattingOperation<T, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormattingOperation")
            .field("message", &short_type_name::<T>())
            .field("format", &self.format)
            .finish()
    }
}

/// A single-stage pipeline that formats `T` with `format`.
pub fn message_pipeline<T, F>(format: F) -> Pipeline<T, Bytes>
where
    T: Serialize + DeserializeOwned + 'static,
    F: Format + 'static,
{
    PipelineBuilder::<T, T>::new()
        .add_operation(FormattingOperation::<T, F>::new(format))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Mesh {
        uri: String,
        port: u16,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Info {
        name: String,
        features: Vec<String>,
        mesh: Vec<Mesh>,
    }

    fn sample() -> Info {
        Info {
            name: "/intel/node/1".into(),
            features: vec!["permissions".into(), "pipelines".into()],
            mesh: vec![
                Mesh {
                    uri: "tcp://10.0.0.1".into(),
                    port: 6363,
                },
                Mesh {
                    uri: "udp://10.0.0.2".into(),
                    port: 6364,
                },
            ],
        }
    }

    #[test]
    fn test_json_roundtrip_nested() {
        let op = FormattingOperation::<Info, _>::json();
        let bytes = op.forward(sample()).unwrap();
        assert_eq!(op.backward(bytes).unwrap(), sample());
    }

    #[test]
    fn test_cbor_roundtrip_nested() {
        let op = FormattingOperation::<Info, _>::cbor();
        let bytes = op.forward(sample()).unwrap();
        assert_eq!(op.backward(bytes).unwrap(), sample());
    }

    #[test]
    fn test_json_is_self_describing() {
        let bytes = JsonFormat::new().encode(&sample()).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["mesh"][1]["port"], 6364);
    }

    #[test]
    fn test_pretty_json_decodes() {
        let bytes = JsonFormat::pretty().encode(&sample()).unwrap();
        assert!(bytes.contains(&b'\n'));
        assert_eq!(JsonFormat::new().decode::<Info>(&bytes).unwrap(), sample());
    }

    #[test]
    fn test_wrong_shape_is_decode_error() {
        let op = FormattingOperation::<Info, _>::json();
        let err = op
            .backward(Bytes::from_static(br#"{"name": 7}"#))
            .unwrap_err();
        assert!(matches!(
            err,
            crate::error::OperationError::Format(FormatError::Decode { format: "json", .. })
        ));

        let cbor = FormattingOperation::<Info, _>::cbor();
        assert!(cbor.backward(Bytes::from_static(b"\xff\x00")).is_err());
    }

    #[test]
    fn test_operation_name() {
        let op = FormattingOperation::<Info, _>::json();
        assert_eq!(op.name(), "format(json:Info)");
    }

    #[test]
    fn test_message_pipeline() {
        let pipeline = message_pipeline::<Info, _>(CborFormat);
        let bytes = pipeline.execute(sample()).unwrap();
        assert_eq!(pipeline.execute_backward(bytes).unwrap(), sample());
    }
}
