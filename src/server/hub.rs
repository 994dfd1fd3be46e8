//! WebSocket Connection Hub
//!
//! Tracks every dashboard connected to `/ws` and fans published telemetry
//! out to all of them. The feed has no topics: every connection receives
//! every message.

use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

use crate::telemetry::TelemetryMessage;

/// Unique identifier for a WebSocket connection
pub type ConnectionId = String;

/// Manages all dashboard connections
pub struct ConnectionHub {
    /// Active connections: ConnectionId → outbound queue
    connections: Arc<RwLock<HashMap<ConnectionId, mpsc::UnboundedSender<TelemetryMessage>>>>,
    config: HubConfig,
}

/// Configuration for the connection hub
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// Maximum number of concurrent connections
    pub max_connections: usize,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            max_connections: 64,
        }
    }
}

impl ConnectionHub {
    /// Create a new connection hub
    pub fn new(config: HubConfig) -> Self {
        Self {
            connections: Arc::new(RwLock::new(HashMap::new())),
            config,
        }
    }

    /// Register a new WebSocket connection
    ///
    /// Returns the connection ID on success, or an error if the connection
    /// limit has been reached.
    pub async fn register(
        &self,
        sender: mpsc::UnboundedSender<TelemetryMessage>,
    ) -> Result<ConnectionId, HubError> {
        let mut connections = self.connections.write().await;
        if connections.len() >= self.config.max_connections {
            return Err(HubError::TooManyConnections(self.config.max_connections));
        }

        let id = Uuid::new_v4().to_string();
        connections.insert(id.clone(), sender);

        tracing::info!(connection_id = %id, active = connections.len(), "Dashboard connected");
        Ok(id)
    }

    /// Unregister a connection
    pub async fn unregister(&self, id: &str) {
        let removed = self.connections.write().await.remove(id);
        if removed.is_some() {
            tracing::info!(connection_id = %id, "Dashboard disconnected");
        }
    }

    /// Send a message to every registered connection
    ///
    /// Returns how many connections accepted it. Connections whose queue
    /// is closed are skipped; their handler unregisters them.
    pub async fn broadcast(&self, message: &TelemetryMessage) -> usize {
        let connections = self.connections.read().await;

        let sent = connections
            .values()
            .filter(|sender| sender.send(message.clone()).is_ok())
            .count();

        if sent > 0 {
            tracing::trace!(kind = %message.kind, connections = sent, "Broadcast telemetry");
        }
        sent
    }

    /// Get the current connection count
    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }

    pub fn config(&self) -> &HubConfig {
        &self.config
    }
}

/// Errors that can occur in the connection hub
#[derive(Debug, Error)]
pub enum HubError {
    #[error("Too many connections (limit: {0})")]
    TooManyConnections(usize),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::TelemetryKind;

    #[test]
    fn test_default_config() {
        let config = HubConfig::default();
        assert_eq!(config.max_connections, 64);
    }

    #[tokio::test]
    async fn test_register_unregister() {
        let hub = ConnectionHub::new(HubConfig::default());
        let (tx, _rx) = mpsc::unbounded_channel();

        let id = hub.register(tx).await.unwrap();
        assert!(!id.is_empty());
        assert_eq!(hub.connection_count().await, 1);

        hub.unregister(&id).await;
        assert_eq!(hub.connection_count().await, 0);

        // Unknown ids are ignored
        hub.unregister(&id).await;
        assert_eq!(hub.connection_count().await, 0);
    }

    #[tokio::test]
    async fn test_connection_limit() {
        let hub = ConnectionHub::new(HubConfig { max_connections: 2 });

        let (tx1, _) = mpsc::unbounded_channel();
        let (tx2, _) = mpsc::unbounded_channel();
        let (tx3, _) = mpsc::unbounded_channel();
        let (tx4, _) = mpsc::unbounded_channel();

        let id1 = hub.register(tx1).await.unwrap();
        let _id2 = hub.register(tx2).await.unwrap();
        let result = hub.register(tx3).await;

        assert!(matches!(result, Err(HubError::TooManyConnections(2))));

        // A slot frees up once a connection leaves
        hub.unregister(&id1).await;
        assert!(hub.register(tx4).await.is_ok());
    }

    #[tokio::test]
    async fn test_broadcast_reaches_every_connection() {
        let hub = ConnectionHub::new(HubConfig::default());

        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();
        hub.register(tx1).await.unwrap();
        hub.register(tx2).await.unwrap();

        let message = TelemetryMessage::number(TelemetryKind::TimerFps, 59.0);
        assert_eq!(hub.broadcast(&message).await, 2);

        assert_eq!(rx1.try_recv().unwrap(), message);
        assert_eq!(rx2.try_recv().unwrap(), message);
    }

    #[tokio::test]
    async fn test_broadcast_skips_closed_queues() {
        let hub = ConnectionHub::new(HubConfig::default());

        let (tx1, rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();
        hub.register(tx1).await.unwrap();
        hub.register(tx2).await.unwrap();
        drop(rx1);

        let message = TelemetryMessage::text(TelemetryKind::CameraAngle, "[H: 0.00, V:0.00]");
        assert_eq!(hub.broadcast(&message).await, 1);
        assert!(rx2.try_recv().is_ok());
    }
}
