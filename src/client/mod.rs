//! Native Dashboard Client
//!
//! Runs the [`ConnectionSupervisor`] against a real WebSocket endpoint
//! using tokio-tungstenite.
//!
//! ```rust,no_run
//! use telemetry_console::client::{dashboard_supervisor, run_supervisor};
//! use telemetry_console::config::ClientConfig;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ClientConfig::default();
//!     let (mut supervisor, events) = dashboard_supervisor(&config);
//!
//!     run_supervisor(
//!         &mut supervisor,
//!         events,
//!         config.check_interval(),
//!         async { let _ = tokio::signal::ctrl_c().await; },
//!         |sup| println!("{}", sup.sink().render_line()),
//!     )
//!     .await;
//! }
//! ```

mod connector;
mod runner;

pub use connector::{WsConnector, WsHandle};
pub use runner::run_supervisor;

use tokio::sync::mpsc;

use crate::config::ClientConfig;
use crate::display::Dashboard;
use crate::supervisor::{ConnectionSupervisor, TransportEvent};

/// Supervisor wired to a WebSocket transport and a headless dashboard
pub type DashboardSupervisor = ConnectionSupervisor<WsConnector, Dashboard>;

/// Build a supervisor for the configured endpoint and policy
pub fn dashboard_supervisor(
    config: &ClientConfig,
) -> (DashboardSupervisor, mpsc::UnboundedReceiver<TransportEvent>) {
    let (connector, events) = WsConnector::new();
    let supervisor = ConnectionSupervisor::new(
        config.endpoint.clone(),
        connector,
        Dashboard::new(config.fps_history),
    )
    .with_policy(config.reconnect);

    (supervisor, events)
}
