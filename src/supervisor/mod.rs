//! Connection Supervision
//!
//! Keeps one telemetry link alive with automatic recovery.
//!
//! ## Architecture
//!
//! - **ConnectionSupervisor**: owns the single transport handle, routes frames
//!   to a [`DisplaySink`](crate::display::DisplaySink), restarts on close
//! - **Connector / TransportHandle**: the seam a transport implements
//! - **LinkState / LinkEvent**: the explicit state machine
//! - **ReconnectPolicy**: immediate (default) or exponential backoff
//!
//! ## Driving
//!
//! The owner calls `start()` once, `check()` on a fixed cadence (250 ms by
//! default) and forwards every transport event through `handle_event()`.
//! Recovery is level-triggered: `check()` restarts whenever the held handle
//! is missing or closed, so repeated calls are harmless.

mod clock;
mod connection;
mod policy;
mod state;
mod transport;

pub use clock::{Clock, SystemClock};
pub use connection::{ConnectionSupervisor, SupervisorStats};
pub use policy::ReconnectPolicy;
pub use state::{Generation, LinkEvent, LinkState, ReadyState, TransportEvent};
pub use transport::{Connector, TransportHandle};
