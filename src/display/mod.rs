//! Display Targets
//!
//! The console shows four things: a connectivity indicator, three text
//! readouts (camera position, forward vector, angle) and a scrolling
//! frame-rate series. A [`DisplaySink`] receives every write; the
//! supervisor never reads back from it.
//!
//! - [`Dashboard`]: headless sink used by the terminal watcher and tests
//! - [`FpsSeries`]: bounded, time-indexed frame-rate samples

mod dashboard;
mod series;

pub use dashboard::Dashboard;
pub use series::{FpsSample, FpsSeries, SeriesSummary, DEFAULT_SERIES_CAPACITY};

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::telemetry::TelemetryKind;

/// Connectivity indicator states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionIndicator {
    Connected,
    #[default]
    Disconnected,
}

impl fmt::Display for ConnectionIndicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionIndicator::Connected => f.write_str("connected"),
            ConnectionIndicator::Disconnected => f.write_str("disconnected"),
        }
    }
}

/// The three text readouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Readout {
    Position,
    Forward,
    Angle,
}

impl Readout {
    pub const ALL: [Readout; 3] = [Readout::Position, Readout::Forward, Readout::Angle];

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Readout::Position => "Position",
            Readout::Forward => "Forward",
            Readout::Angle => "Angle",
        }
    }
}

/// Where a telemetry kind is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayTarget {
    Readout(Readout),
    FpsSeries,
}

impl From<TelemetryKind> for DisplayTarget {
    fn from(kind: TelemetryKind) -> Self {
        match kind {
            TelemetryKind::CameraPosition => DisplayTarget::Readout(Readout::Position),
            TelemetryKind::CameraForward => DisplayTarget::Readout(Readout::Forward),
            TelemetryKind::CameraAngle => DisplayTarget::Readout(Readout::Angle),
            TelemetryKind::TimerFps => DisplayTarget::FpsSeries,
        }
    }
}

/// Receives display writes from the connection supervisor
pub trait DisplaySink {
    /// Switch the connectivity indicator
    fn set_indicator(&mut self, indicator: ConnectionIndicator);

    /// Replace the text of one readout
    fn set_readout(&mut self, readout: Readout, text: &str);

    /// Append a sample to the frame-rate series
    fn push_sample(&mut self, sample: FpsSample);
}
