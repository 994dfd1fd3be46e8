//! # Telemetry Console
//!
//! Live telemetry dashboard for a renderer: camera readouts and a frame-rate
//! chart streamed over a WebSocket, kept alive by a self-healing
//! connection supervisor.
//!
//! ## Modules
//!
//! - [`telemetry`]: Wire messages and frame decoding
//! - [`supervisor`]: Reconnect/liveness state machine, transport traits
//! - [`display`]: Display sink trait, fps series, headless dashboard
//! - [`client`]: tokio-tungstenite transport and driving loop (`native`)
//! - [`server`]: Axum console server with the `/ws` feed (`native`)
//! - [`feed`]: Synthetic camera and frame-rate publisher (`native`)
//!
//! The first three modules are platform neutral; the browser dashboard
//! uses them with default features disabled.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use telemetry_console::client::{dashboard_supervisor, run_supervisor};
//! use telemetry_console::config::Config;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = Config::load_default();
//!     let (mut supervisor, events) = dashboard_supervisor(&config.client);
//!
//!     run_supervisor(
//!         &mut supervisor,
//!         events,
//!         config.client.check_interval(),
//!         async { let _ = tokio::signal::ctrl_c().await; },
//!         |sup| println!("{}", sup.sink().render_line()),
//!     )
//!     .await;
//! }
//! ```

pub mod display;
pub mod supervisor;
pub mod telemetry;

#[cfg(feature = "native")]
pub mod client;
#[cfg(feature = "native")]
pub mod config;
#[cfg(feature = "native")]
pub mod feed;
#[cfg(feature = "native")]
pub mod logging;
#[cfg(feature = "native")]
pub mod server;

// Re-export top-level types for convenience
pub use telemetry::{
    decode_frame, DecodeError, Decoded, TelemetryKind, TelemetryMessage, TelemetryValue,
};

pub use supervisor::{
    Clock, ConnectionSupervisor, Connector, Generation, LinkEvent, LinkState, ReadyState,
    ReconnectPolicy, SupervisorStats, SystemClock, TransportEvent, TransportHandle,
};

pub use display::{
    ConnectionIndicator, Dashboard, DisplaySink, DisplayTarget, FpsSample, FpsSeries, Readout,
};

#[cfg(feature = "native")]
pub use config::{Config, ConfigError};

#[cfg(feature = "native")]
pub use server::{build_router, serve, ConnectionHub, ServerError, ServerState};
