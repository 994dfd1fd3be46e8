//! Telemetry Message Types
//!
//! Defines the tagged scalar updates exchanged between the console server
//! and dashboards, and the decoder dashboards run on every inbound frame.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use super::error::DecodeError;

/// The four telemetry tags the console understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TelemetryKind {
    /// Camera position, e.g. `[12.30, 4.50, 6.70]`
    CameraPosition,
    /// Camera forward unit vector
    CameraForward,
    /// Camera horizontal/vertical angle, e.g. `[H: 1.57, V:0.10]`
    CameraAngle,
    /// Averaged frames per second
    TimerFps,
}

impl TelemetryKind {
    pub const ALL: [TelemetryKind; 4] = [
        TelemetryKind::CameraPosition,
        TelemetryKind::CameraForward,
        TelemetryKind::CameraAngle,
        TelemetryKind::TimerFps,
    ];

    /// Wire tag for this kind
    pub fn as_str(&self) -> &'static str {
        match self {
            TelemetryKind::CameraPosition => "camera_position",
            TelemetryKind::CameraForward => "camera_forward",
            TelemetryKind::CameraAngle => "camera_angle",
            TelemetryKind::TimerFps => "timer_fps",
        }
    }

    /// Look up a kind by its wire tag
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == tag)
    }
}

impl fmt::Display for TelemetryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A telemetry value: the wire allows either a string or a number
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TelemetryValue {
    Number(f64),
    Text(String),
}

impl TelemetryValue {
    /// Render the value for a text readout
    pub fn as_text(&self) -> String {
        match self {
            TelemetryValue::Number(n) => n.to_string(),
            TelemetryValue::Text(s) => s.clone(),
        }
    }

    /// Interpret the value as a number.
    ///
    /// Text values are parsed, since renderers commonly format numbers
    /// before sending them (`"59.871234"`).
    pub fn as_number(&self) -> Option<f64> {
        let number = match self {
            TelemetryValue::Number(n) => Some(*n),
            TelemetryValue::Text(s) => s.trim().parse::<f64>().ok(),
        };
        number.filter(|n| n.is_finite())
    }
}

impl From<&str> for TelemetryValue {
    fn from(value: &str) -> Self {
        TelemetryValue::Text(value.to_string())
    }
}

impl From<String> for TelemetryValue {
    fn from(value: String) -> Self {
        TelemetryValue::Text(value)
    }
}

impl From<f64> for TelemetryValue {
    fn from(value: f64) -> Self {
        TelemetryValue::Number(value)
    }
}

/// A single decoded telemetry update
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelemetryMessage {
    #[serde(rename = "type")]
    pub kind: TelemetryKind,
    pub value: TelemetryValue,
}

impl TelemetryMessage {
    pub fn new(kind: TelemetryKind, value: impl Into<TelemetryValue>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }

    /// Create a text-valued message
    pub fn text(kind: TelemetryKind, value: impl Into<String>) -> Self {
        Self::new(kind, TelemetryValue::Text(value.into()))
    }

    /// Create a number-valued message
    pub fn number(kind: TelemetryKind, value: f64) -> Self {
        Self::new(kind, TelemetryValue::Number(value))
    }

    /// Serialize to the JSON text frame sent over the wire
    pub fn to_frame(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Outcome of decoding a well-formed frame
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    /// A frame with one of the four known tags
    Message(TelemetryMessage),
    /// A well-formed frame with a tag this console does not display
    Unrecognized(String),
}

/// Decode one inbound text frame.
///
/// Unknown tags are not an error; they come back as [`Decoded::Unrecognized`]
/// so callers can ignore them without counting a failure.
pub fn decode_frame(raw: &str) -> Result<Decoded, DecodeError> {
    let json: Value = serde_json::from_str(raw)?;

    let tag = json
        .get("type")
        .and_then(Value::as_str)
        .ok_or(DecodeError::MissingType)?;

    let Some(kind) = TelemetryKind::from_tag(tag) else {
        return Ok(Decoded::Unrecognized(tag.to_string()));
    };

    let value = match json.get("value") {
        None | Some(Value::Null) => return Err(DecodeError::MissingValue(tag.to_string())),
        Some(Value::String(s)) => TelemetryValue::Text(s.clone()),
        Some(Value::Number(n)) => n
            .as_f64()
            .map(TelemetryValue::Number)
            .ok_or_else(|| invalid_value(kind, &n.to_string()))?,
        Some(other) => return Err(invalid_value(kind, &other.to_string())),
    };

    if kind == TelemetryKind::TimerFps && value.as_number().is_none() {
        return Err(invalid_value(kind, &value.as_text()));
    }

    Ok(Decoded::Message(TelemetryMessage { kind, value }))
}

fn invalid_value(kind: TelemetryKind, value: &str) -> DecodeError {
    DecodeError::InvalidValue {
        kind: kind.as_str().to_string(),
        value: value.to_string(),
    }
}
