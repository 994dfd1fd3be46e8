//! Headless dashboard
//!
//! Keeps the latest state of every display target in memory and renders it
//! as a single status line for terminals.

use std::fmt::Write as _;

use super::{ConnectionIndicator, DisplaySink, FpsSample, FpsSeries, Readout};

/// In-memory display state
#[derive(Debug, Clone, Default)]
pub struct Dashboard {
    indicator: ConnectionIndicator,
    position: Option<String>,
    forward: Option<String>,
    angle: Option<String>,
    series: FpsSeries,
}

impl Dashboard {
    /// Create a dashboard keeping `history` frame-rate samples
    pub fn new(history: usize) -> Self {
        Self {
            series: FpsSeries::with_capacity(history),
            ..Default::default()
        }
    }

    pub fn indicator(&self) -> ConnectionIndicator {
        self.indicator
    }

    /// Current text of a readout, if anything was received yet
    pub fn readout(&self, readout: Readout) -> Option<&str> {
        match readout {
            Readout::Position => self.position.as_deref(),
            Readout::Forward => self.forward.as_deref(),
            Readout::Angle => self.angle.as_deref(),
        }
    }

    pub fn series(&self) -> &FpsSeries {
        &self.series
    }

    /// One-line rendering, e.g.
    /// `[connected] Position [1.00, 2.00, 3.00] | Forward - | Angle - | fps 59.9`
    pub fn render_line(&self) -> String {
        let mut line = format!("[{}]", self.indicator);

        for (i, readout) in Readout::ALL.into_iter().enumerate() {
            let sep = if i == 0 { " " } else { " | " };
            let _ = write!(
                line,
                "{}{} {}",
                sep,
                readout.label(),
                self.readout(readout).unwrap_or("-")
            );
        }

        match (self.series.latest(), self.series.summary()) {
            (Some(latest), Some(summary)) => {
                let _ = write!(
                    line,
                    " | fps {:.1} (min {:.1}, avg {:.1}, max {:.1})",
                    latest.value, summary.min, summary.average, summary.max
                );
            }
            _ => line.push_str(" | fps -"),
        }

        line
    }
}

impl DisplaySink for Dashboard {
    fn set_indicator(&mut self, indicator: ConnectionIndicator) {
        self.indicator = indicator;
    }

    fn set_readout(&mut self, readout: Readout, text: &str) {
        let slot = match readout {
            Readout::Position => &mut self.position,
            Readout::Forward => &mut self.forward,
            Readout::Angle => &mut self.angle,
        };
        *slot = Some(text.to_string());
    }

    fn push_sample(&mut self, sample: FpsSample) {
        self.series.push(sample);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_readouts_start_empty() {
        let dashboard = Dashboard::new(10);
        for readout in Readout::ALL {
            assert!(dashboard.readout(readout).is_none());
        }
        assert_eq!(dashboard.indicator(), ConnectionIndicator::Disconnected);
    }

    #[test]
    fn test_render_line() {
        let mut dashboard = Dashboard::new(10);
        assert_eq!(
            dashboard.render_line(),
            "[disconnected] Position - | Forward - | Angle - | fps -"
        );

        dashboard.set_indicator(ConnectionIndicator::Connected);
        dashboard.set_readout(Readout::Position, "[1.00, 2.00, 3.00]");
        dashboard.push_sample(FpsSample::new(0, 60.0));

        let line = dashboard.render_line();
        assert!(line.starts_with("[connected] Position [1.00, 2.00, 3.00]"));
        assert!(line.contains("fps 60.0"));
    }
}
