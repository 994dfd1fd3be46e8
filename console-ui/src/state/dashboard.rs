//! Dashboard State
//!
//! Reactive state using Leptos signals. The connection supervisor writes
//! into it through [`SignalSink`]; components only read.

use leptos::*;
use telemetry_console::{
    ConnectionIndicator, DisplaySink, FpsSample, FpsSeries, Readout, SupervisorStats,
};

/// Dashboard state provided to all components
#[derive(Clone, Copy)]
pub struct DashboardState {
    /// Connectivity indicator
    pub indicator: RwSignal<ConnectionIndicator>,
    /// Camera position readout
    pub position: RwSignal<Option<String>>,
    /// Camera forward vector readout
    pub forward: RwSignal<Option<String>>,
    /// Camera angle readout
    pub angle: RwSignal<Option<String>>,
    /// Scrolling frame-rate samples
    pub series: RwSignal<FpsSeries>,
    /// Supervisor counters, refreshed on every liveness check
    pub stats: RwSignal<SupervisorStats>,
}

impl DashboardState {
    pub fn new(history: usize) -> Self {
        Self {
            indicator: create_rw_signal(ConnectionIndicator::Disconnected),
            position: create_rw_signal(None),
            forward: create_rw_signal(None),
            angle: create_rw_signal(None),
            series: create_rw_signal(FpsSeries::with_capacity(history)),
            stats: create_rw_signal(SupervisorStats::default()),
        }
    }

    /// Signal backing one readout
    pub fn readout(&self, readout: Readout) -> RwSignal<Option<String>> {
        match readout {
            Readout::Position => self.position,
            Readout::Forward => self.forward,
            Readout::Angle => self.angle,
        }
    }
}

/// Provide dashboard state to the component tree
pub fn provide_dashboard_state(history: usize) -> DashboardState {
    let state = DashboardState::new(history);
    provide_context(state);
    state
}

/// Display sink that writes into the dashboard signals
pub struct SignalSink {
    state: DashboardState,
}

impl SignalSink {
    pub fn new(state: DashboardState) -> Self {
        Self { state }
    }
}

impl DisplaySink for SignalSink {
    fn set_indicator(&mut self, indicator: ConnectionIndicator) {
        self.state.indicator.set(indicator);
    }

    fn set_readout(&mut self, readout: Readout, text: &str) {
        self.state.readout(readout).set(Some(text.to_string()));
    }

    fn push_sample(&mut self, sample: FpsSample) {
        self.state.series.update(|series| series.push(sample));
    }
}
