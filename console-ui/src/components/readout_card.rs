//! Readout Card Component
//!
//! Displays the latest text of one camera readout.

use leptos::*;
use telemetry_console::Readout;

use crate::state::DashboardState;

/// Readout card component
#[component]
pub fn ReadoutCard(
    /// Which readout to display
    readout: Readout,
) -> impl IntoView {
    let state = use_context::<DashboardState>().expect("DashboardState not found");
    let text = state.readout(readout);

    view! {
        <div class="bg-gray-800 rounded-lg p-4 border border-gray-700">
            <span class="text-gray-400 text-sm">{readout.label()}</span>
            <div class="text-2xl font-mono mt-2">
                {move || text.get().unwrap_or_else(|| "—".to_string())}
            </div>
        </div>
    }
}
