//! Error types for conversion and policy construction.

use serde_json::Value;
use thiserror::Error;

/// Root cause of a failed conversion.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// A JSON string did not match the external name of any value of the enum.
    #[error("`{name}` is not a value of enum `{enum_name}`")]
    UnknownEnumName { enum_name: String, name: String },

    /// A JSON number did not match the tag of any value of the enum.
    #[error("{number} is not a value of enum `{enum_name}`")]
    UnknownEnumNumber { enum_name: String, number: i32 },

    /// The shape of a JSON value does not match what the schema expects.
    ///
    /// `target` is the fully-qualified name of the field, enum or message being read.
    #[error("malformed input for `{target}`: expected {expected}, found {found}")]
    MalformedInput {
        target: String,
        expected: &'static str,
        found: &'static str,
    },

    /// The compiled message type does not agree with its descriptor, or the
    /// descriptor could not be found.
    #[error("message type `{message}` does not match its schema: {detail}")]
    SchemaMismatch { message: String, detail: String },

    /// The target is a schema-less message representation.
    #[error("`{message}` has no fixed schema and cannot be a conversion target")]
    UnsupportedTarget { message: String },

    /// The JSON text could not be parsed.
    #[error("invalid JSON text: {0}")]
    Json(#[from] serde_json::Error),

    /// The protobuf payload could not be decoded.
    #[error("invalid protobuf payload: {0}")]
    Decode(#[from] prost::DecodeError),
}

impl ErrorKind {
    pub(crate) fn malformed(target: &str, expected: &'static str, found: &Value) -> Self {
        ErrorKind::MalformedInput {
            target: target.to_string(),
            expected,
            found: json_kind(found),
        }
    }
}

/// Error returned when a conversion fails.
///
/// The root cause is available through [`ConvertError::kind`] and as the
/// [`source`](std::error::Error::source) of this error.
#[derive(Debug, Error)]
#[error("failed to convert `{message}`")]
pub struct ConvertError {
    message: String,
    #[source]
    kind: ErrorKind,
}

impl ConvertError {
    pub(crate) fn new(message: impl Into<String>, kind: ErrorKind) -> Self {
        Self {
            message: message.into(),
            kind,
        }
    }

    /// Fully-qualified name of the message type being converted.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Root cause of the failure.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn into_kind(self) -> ErrorKind {
        self.kind
    }
}

/// Error returned when a [`ConversionPolicy`](crate::ConversionPolicy) cannot be built.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// The override extension extends the wrong options message.
    #[error("extension `{extension}` extends `{found}`, expected `{expected}`")]
    WrongExtendee {
        extension: String,
        expected: &'static str,
        found: String,
    },

    /// The override extension does not hold a single string.
    #[error("extension `{extension}` must be a singular string")]
    NotAString { extension: String },

    /// The override extension named in a configuration is not in the descriptor pool.
    #[error("extension `{name}` not found in descriptor pool")]
    UnknownExtension { name: String },
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
