//! WebSocket Handler
//!
//! Upgrades `/ws` requests and pumps hub traffic to the dashboard until
//! either side goes away.

use axum::{
    extract::{
        ws::{close_code, CloseFrame, Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;

use super::hub::ConnectionHub;
use super::state::ServerState;
use crate::telemetry::TelemetryMessage;

/// WebSocket upgrade handler
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<ServerState>>,
) -> Response {
    let hub = Arc::clone(&state.hub);
    ws.on_upgrade(move |socket| handle_socket(socket, hub))
}

/// Handle an established WebSocket connection
async fn handle_socket(socket: WebSocket, hub: Arc<ConnectionHub>) {
    let (mut sender, mut receiver) = socket.split();

    let (tx, mut rx) = mpsc::unbounded_channel::<TelemetryMessage>();

    let connection_id = match hub.register(tx).await {
        Ok(id) => id,
        Err(e) => {
            tracing::warn!(error = %e, "Rejecting dashboard connection");
            let _ = sender
                .send(Message::Close(Some(CloseFrame {
                    code: close_code::AGAIN,
                    reason: e.to_string().into(),
                })))
                .await;
            return;
        }
    };

    let conn_id_for_send = connection_id.clone();

    // Task to forward hub messages to the WebSocket
    let mut send_task = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            let frame = match message.to_frame() {
                Ok(frame) => frame,
                Err(e) => {
                    tracing::error!(error = %e, kind = %message.kind, "Failed to serialize telemetry");
                    continue;
                }
            };

            if sender.send(Message::Text(frame)).await.is_err() {
                tracing::debug!(
                    connection_id = %conn_id_for_send,
                    "WebSocket send failed, closing connection"
                );
                break;
            }
        }
    });

    let conn_id_for_recv = connection_id.clone();

    // Task to drain inbound frames; dashboards only listen
    let mut recv_task = tokio::spawn(async move {
        while let Some(result) = receiver.next().await {
            match result {
                Ok(message) => {
                    if !handle_ws_message(&conn_id_for_recv, message) {
                        break;
                    }
                }
                Err(e) => {
                    tracing::debug!(
                        connection_id = %conn_id_for_recv,
                        error = %e,
                        "WebSocket receive error"
                    );
                    break;
                }
            }
        }
    });

    // Wait for either task to complete
    tokio::select! {
        _ = &mut send_task => {
            recv_task.abort();
        }
        _ = &mut recv_task => {
            send_task.abort();
        }
    }

    hub.unregister(&connection_id).await;
}

/// Handle a received WebSocket message
///
/// Returns false if the connection should be closed.
fn handle_ws_message(connection_id: &str, message: Message) -> bool {
    match message {
        Message::Text(text) => {
            tracing::info!(connection_id = %connection_id, text = %text, "Dashboard message");
            true
        }
        Message::Binary(data) => {
            tracing::debug!(
                connection_id = %connection_id,
                bytes = data.len(),
                "Ignoring binary frame"
            );
            true
        }
        // Pong replies are queued by the protocol layer
        Message::Ping(_) | Message::Pong(_) => true,
        Message::Close(_) => {
            tracing::debug!(connection_id = %connection_id, "Dashboard requested close");
            false
        }
    }
}
