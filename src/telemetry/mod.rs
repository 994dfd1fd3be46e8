//! Telemetry Wire Protocol
//!
//! The feed carries UTF-8 text frames holding one JSON object each:
//!
//! ```json
//! {"type": "camera_position", "value": "[12.30, 4.50, 6.70]"}
//! {"type": "timer_fps", "value": 59}
//! ```
//!
//! There is no envelope versioning, no sequence number and no acknowledgement.
//! Frames only travel from the console server to dashboards.

mod error;
mod messages;

pub use error::DecodeError;
pub use messages::{decode_frame, Decoded, TelemetryKind, TelemetryMessage, TelemetryValue};
