//! Server State
//!
//! Shared state accessible by all handlers.

use std::sync::Arc;
use std::time::Instant;

use super::hub::{ConnectionHub, HubConfig};
use crate::config::ServerConfig;

/// Shared application state for all handlers
#[derive(Clone)]
pub struct ServerState {
    /// Dashboard connections fed by the telemetry publisher
    pub hub: Arc<ConnectionHub>,
    /// Server configuration
    pub config: Arc<ServerConfig>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl ServerState {
    /// Create state with a hub sized from the server configuration
    pub fn new(config: ServerConfig) -> Self {
        let hub = ConnectionHub::new(HubConfig {
            max_connections: config.max_connections,
        });
        Self::with_hub(config, Arc::new(hub))
    }

    /// Create state around an existing hub
    pub fn with_hub(config: ServerConfig, hub: Arc<ConnectionHub>) -> Self {
        Self {
            hub,
            config: Arc::new(config),
            start_time: Instant::now(),
        }
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
