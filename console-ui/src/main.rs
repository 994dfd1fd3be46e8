//! Telemetry Console Dashboard
//!
//! Browser dashboard built with Leptos (WASM): a connectivity indicator,
//! camera position/forward/angle readouts and a scrolling frame-rate chart.
//!
//! # Architecture
//!
//! This is a client-side rendered (CSR) Leptos application that compiles to
//! WebAssembly. It reuses the telemetry console's connection supervisor,
//! driven by `web_sys::WebSocket` callbacks and a 250 ms liveness interval.

use leptos::*;

mod app;
mod components;
mod state;

fn main() {
    // Set up panic hook for better error messages in WASM
    console_error_panic_hook::set_once();

    // Mount the app to the document body
    mount_to_body(|| view! { <app::App /> });
}
