//! Frame decoding errors

use thiserror::Error;

/// Reasons an inbound frame could not be turned into a telemetry message
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    /// The frame is not valid JSON
    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    /// The frame is JSON but has no string `type` field
    #[error("Frame has no `type` field")]
    MissingType,

    /// A recognized frame has no usable `value`
    #[error("Frame `{0}` has no `value` field")]
    MissingValue(String),

    /// The value cannot be interpreted for this kind
    #[error("Invalid value for `{kind}`: {value}")]
    InvalidValue { kind: String, value: String },
}

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        DecodeError::InvalidJson(err.to_string())
    }
}
