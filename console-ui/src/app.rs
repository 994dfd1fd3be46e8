//! App Root Component
//!
//! Provides the dashboard state and starts the supervised connection.

use leptos::*;
use telemetry_console::Readout;

use crate::components::{FpsChart, ReadoutCard, StatusIndicator};
use crate::state::connection::dashboard_endpoint;
use crate::state::{init_supervisor, provide_dashboard_state, DashboardState};

/// Frame-rate samples kept on the chart
const FPS_HISTORY: usize = 120;

/// Root application component
#[component]
pub fn App() -> impl IntoView {
    let state = provide_dashboard_state(FPS_HISTORY);
    let endpoint = dashboard_endpoint();

    // The liveness interval keeps the supervisor alive for the page lifetime
    let _supervisor = init_supervisor(state, endpoint.clone());

    view! {
        <div class="min-h-screen bg-gray-900 text-white flex flex-col">
            <header class="bg-gray-800 border-b border-gray-700 py-4 px-4">
                <div class="container mx-auto flex items-center justify-between">
                    <h1 class="text-xl font-bold">"Telemetry Console"</h1>
                    <StatusIndicator />
                </div>
            </header>

            <main class="flex-1 container mx-auto px-4 py-8 pb-24 space-y-8">
                <div class="grid grid-cols-1 md:grid-cols-3 gap-4">
                    {Readout::ALL
                        .into_iter()
                        .map(|readout| view! { <ReadoutCard readout=readout /> })
                        .collect::<Vec<_>>()}
                </div>

                <section class="bg-gray-800 rounded-lg p-4 border border-gray-700">
                    <h2 class="text-gray-400 text-sm mb-4">"Frames per second"</h2>
                    <FpsChart />
                </section>
            </main>

            <Footer endpoint=endpoint />
        </div>
    }
}

/// Footer with the feed URL and connection counters
#[component]
fn Footer(endpoint: String) -> impl IntoView {
    let state = use_context::<DashboardState>().expect("DashboardState not found");

    view! {
        <footer class="fixed bottom-0 left-0 right-0 bg-gray-800 border-t border-gray-700 py-3 px-4">
            <div class="container mx-auto flex items-center justify-between text-sm text-gray-400">
                <span class="font-mono">{endpoint}</span>
                <span>
                    {move || {
                        let stats = state.stats.get();
                        format!(
                            "Attempts: {} · Opened: {} · Frames: {} ({} dropped)",
                            stats.attempts, stats.opens, stats.frames_received, stats.frames_dropped
                        )
                    }}
                </span>
            </div>
        </footer>
    }
}
