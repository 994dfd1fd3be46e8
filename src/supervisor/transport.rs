//! Transport seam
//!
//! The supervisor never touches sockets directly. A [`Connector`] creates
//! handles; the transport behind it reports lifecycle events tagged with the
//! handle's generation, which the owner of the supervisor feeds back through
//! `ConnectionSupervisor::handle_event`.

use super::state::{Generation, ReadyState};

/// Creates transport handles for the supervisor
pub trait Connector {
    type Handle: TransportHandle;

    /// Begin a connection attempt to `endpoint`.
    ///
    /// This never fails: a transport that cannot even begin the attempt
    /// returns a handle that is already `Closed`.
    fn connect(&mut self, endpoint: &str, generation: Generation) -> Self::Handle;
}

/// A single connection attempt.
///
/// Dropping the handle detaches it: the transport must stop delivering
/// events for its generation.
pub trait TransportHandle {
    fn ready_state(&self) -> ReadyState;
}
