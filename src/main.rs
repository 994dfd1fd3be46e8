//! Telemetry Console Server
//!
//! Run with: cargo run --bin telemetry-console
//!
//! Serves the `/ws` telemetry feed, health probes and, optionally, the
//! browser dashboard build. A synthetic camera/frame-rate feed publishes
//! into the hub unless `feed.enabled` is false.
//!
//! # Configuration
//!
//! Loaded from the first of `$CONFIG_DIR/telemetry-console/config.toml`,
//! `/etc/telemetry-console/config.toml`, `./config.toml`; then overridden by
//! `CONSOLE_HOST`, `CONSOLE_PORT`, `CONSOLE_STATIC_DIR`, `CONSOLE_LOG_LEVEL`,
//! `CONSOLE_LOG_FORMAT`. `RUST_LOG` replaces the log filter entirely.

use std::sync::Arc;
use tokio::sync::watch;

use telemetry_console::config::Config;
use telemetry_console::feed::run_feed;
use telemetry_console::logging;
use telemetry_console::server::{serve, shutdown_signal, ServerState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load_default();
    logging::init(&config.logging);

    tracing::info!("Starting telemetry console v{}", env!("CARGO_PKG_VERSION"));

    let state = ServerState::new(config.server.clone());

    // Feed stops once the sender is dropped
    let (stop_tx, stop_rx) = watch::channel(());
    let feed_handle = if config.feed.enabled {
        let hub = Arc::clone(&state.hub);
        let feed_config = config.feed.clone();
        let mut stop_rx = stop_rx;
        Some(tokio::spawn(async move {
            run_feed(hub, feed_config, async move {
                let _ = stop_rx.changed().await;
            })
            .await;
        }))
    } else {
        tracing::info!("Telemetry feed disabled");
        None
    };

    let result = serve(state, shutdown_signal()).await;

    drop(stop_tx);
    if let Some(handle) = feed_handle {
        if let Err(e) = handle.await {
            tracing::error!(error = %e, "Telemetry feed task failed");
        }
    }

    result?;
    tracing::info!("Telemetry console shutdown complete");
    Ok(())
}
