//! Link state machine
//!
//! Transport handles report `Opened`, `MessageReceived` and `Closed`; the
//! supervisor folds those events into a [`LinkState`]. The transition
//! function is pure so it can be exercised without any transport.

use std::fmt;

/// Identifies one transport handle. Every `start()` mints a new generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(pub u64);

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle of a single transport handle: `Connecting -> Open -> Closed`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyState {
    Connecting,
    Open,
    Closed,
}

/// Events a transport handle delivers to the supervisor
#[derive(Debug, Clone, PartialEq)]
pub enum LinkEvent {
    /// The handle reached `Open`
    Opened,
    /// A raw text frame arrived
    MessageReceived(String),
    /// The handle reached `Closed`, including attempts that never opened
    Closed,
}

/// A link event tagged with the handle that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct TransportEvent {
    pub generation: Generation,
    pub event: LinkEvent,
}

impl TransportEvent {
    pub fn new(generation: Generation, event: LinkEvent) -> Self {
        Self { generation, event }
    }
}

/// Supervisor-level view of connectivity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

impl LinkState {
    /// State after a new handle has been started
    pub fn on_start(self) -> LinkState {
        LinkState::Connecting
    }

    /// State after the current handle delivered `event`
    pub fn on_event(self, event: &LinkEvent) -> LinkState {
        match event {
            LinkEvent::Opened => LinkState::Connected,
            LinkEvent::MessageReceived(_) => self,
            LinkEvent::Closed => LinkState::Disconnected,
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, LinkState::Connected)
    }
}
