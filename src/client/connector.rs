//! tokio-tungstenite transport
//!
//! Every handle runs one task: connect, report `Opened`, forward text
//! frames, report `Closed`. Events go to a single channel shared by all
//! handles and carry the handle's generation.

use futures_util::StreamExt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::Message};

use crate::supervisor::{
    Connector, Generation, LinkEvent, ReadyState, TransportEvent, TransportHandle,
};

const CONNECTING: u8 = 0;
const OPEN: u8 = 1;
const CLOSED: u8 = 2;

/// Ready state shared between a handle and its task
#[derive(Debug, Clone)]
struct SharedReadyState(Arc<AtomicU8>);

impl SharedReadyState {
    fn new() -> Self {
        Self(Arc::new(AtomicU8::new(CONNECTING)))
    }

    fn set(&self, state: ReadyState) {
        let raw = match state {
            ReadyState::Connecting => CONNECTING,
            ReadyState::Open => OPEN,
            ReadyState::Closed => CLOSED,
        };
        self.0.store(raw, Ordering::Release);
    }

    fn get(&self) -> ReadyState {
        match self.0.load(Ordering::Acquire) {
            CONNECTING => ReadyState::Connecting,
            OPEN => ReadyState::Open,
            _ => ReadyState::Closed,
        }
    }
}

/// Creates WebSocket handles backed by tokio tasks
#[derive(Debug, Clone)]
pub struct WsConnector {
    events: mpsc::UnboundedSender<TransportEvent>,
}

impl WsConnector {
    /// Create a connector and the receiver its handles report to
    pub fn new() -> (Self, mpsc::UnboundedReceiver<TransportEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        (Self { events }, rx)
    }
}

/// One WebSocket connection attempt. Dropping it aborts the task.
#[derive(Debug)]
pub struct WsHandle {
    state: SharedReadyState,
    task: JoinHandle<()>,
}

impl TransportHandle for WsHandle {
    fn ready_state(&self) -> ReadyState {
        self.state.get()
    }
}

impl Drop for WsHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

impl Connector for WsConnector {
    type Handle = WsHandle;

    fn connect(&mut self, endpoint: &str, generation: Generation) -> WsHandle {
        let state = SharedReadyState::new();
        let task = tokio::spawn(run_link(
            endpoint.to_string(),
            generation,
            state.clone(),
            self.events.clone(),
        ));
        WsHandle { state, task }
    }
}

/// Drive one connection from attempt to close.
///
/// The ready state is updated before the matching event is sent, so a
/// liveness check never sees an older state than the events imply.
async fn run_link(
    endpoint: String,
    generation: Generation,
    state: SharedReadyState,
    events: mpsc::UnboundedSender<TransportEvent>,
) {
    let send = |event: LinkEvent| {
        let _ = events.send(TransportEvent::new(generation, event));
    };

    match connect_async(endpoint.as_str()).await {
        Ok((mut stream, _response)) => {
            state.set(ReadyState::Open);
            send(LinkEvent::Opened);

            while let Some(frame) = stream.next().await {
                match frame {
                    Ok(Message::Text(text)) => send(LinkEvent::MessageReceived(text)),
                    Ok(Message::Close(frame)) => {
                        tracing::debug!(generation = %generation, ?frame, "Server closed the link");
                        break;
                    }
                    // Binary frames are not part of the feed; ping/pong is handled by tungstenite
                    Ok(_) => {}
                    Err(e) => {
                        tracing::debug!(generation = %generation, error = %e, "WebSocket receive error");
                        break;
                    }
                }
            }
        }
        Err(e) => {
            tracing::debug!(
                endpoint = %endpoint,
                generation = %generation,
                error = %e,
                "WebSocket connection failed"
            );
        }
    }

    state.set(ReadyState::Closed);
    send(LinkEvent::Closed);
}
