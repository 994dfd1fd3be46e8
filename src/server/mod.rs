//! Console Server
//!
//! HTTP/WebSocket surface of the telemetry console, built with Axum.
//!
//! # Endpoints
//!
//! - `GET /ws` - Telemetry stream (JSON text frames)
//! - `GET /health/live` - Liveness probe
//! - `GET /health` - Full health status
//! - `GET /*` - Browser dashboard build, when `server.static_dir` is set
//!
//! # Example
//!
//! ```rust,no_run
//! use telemetry_console::config::ServerConfig;
//! use telemetry_console::server::{serve, shutdown_signal, ServerState};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let state = ServerState::new(ServerConfig::default());
//!     serve(state, shutdown_signal()).await?;
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod handler;
pub mod hub;
pub mod routes;
pub mod state;

pub use error::{ServerError, ServerResult};
pub use handler::websocket_handler;
pub use hub::{ConnectionHub, ConnectionId, HubConfig, HubError};
pub use state::ServerState;

use axum::{routing::get, Router};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

/// Build the router with all routes and middleware
pub fn build_router(state: ServerState) -> Router {
    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/", get(routes::health::full_health));

    let mut router = Router::new()
        .route("/ws", get(websocket_handler))
        .nest("/health", health_routes);

    if let Some(dir) = &state.config.static_dir {
        tracing::info!(dir = %dir, "Serving dashboard assets");
        router = router.fallback_service(ServeDir::new(dir));
    }

    router
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

/// Bind the configured address and serve until `shutdown` resolves
pub async fn serve<F>(state: ServerState, shutdown: F) -> ServerResult<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = state.config.addr();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|source| ServerError::Bind {
            addr: addr.clone(),
            source,
        })?;

    serve_on(listener, state, shutdown).await
}

/// Serve on an already bound listener
pub async fn serve_on<F>(listener: TcpListener, state: ServerState, shutdown: F) -> ServerResult<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let router = build_router(state);

    tracing::info!("Telemetry console listening on {}", listener.local_addr()?);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await?;

    tracing::info!("Telemetry console shut down gracefully");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
