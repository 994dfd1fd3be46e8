//! Connection status badge

use leptos::*;
use telemetry_console::ConnectionIndicator;

use crate::state::DashboardState;

#[component]
pub fn StatusIndicator() -> impl IntoView {
    let state = use_context::<DashboardState>().expect("DashboardState not found");

    view! {
        <div class="flex items-center space-x-2">
            {move || match state.indicator.get() {
                ConnectionIndicator::Connected => view! {
                    <span class="flex items-center space-x-1 text-green-400">
                        <span class="w-2 h-2 bg-green-400 rounded-full pulse" />
                        <span>"Connected"</span>
                    </span>
                }.into_view(),
                ConnectionIndicator::Disconnected => view! {
                    <span class="flex items-center space-x-1 text-red-400">
                        <span class="w-2 h-2 bg-red-400 rounded-full" />
                        <span>"Disconnected"</span>
                    </span>
                }.into_view(),
            }}
        </div>
    }
}
