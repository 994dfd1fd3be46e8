//! Driving loop
//!
//! Calls `start()` once, then multiplexes the liveness ticker and the
//! transport events onto the supervisor until shutdown.

use std::future::Future;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

use crate::display::DisplaySink;
use crate::supervisor::{ConnectionSupervisor, Connector, TransportEvent};

/// Run `supervisor` until `shutdown` resolves, then dispose it.
///
/// `on_tick` runs after every liveness check, which is where front-ends
/// render.
pub async fn run_supervisor<C, S, F>(
    supervisor: &mut ConnectionSupervisor<C, S>,
    mut events: mpsc::UnboundedReceiver<TransportEvent>,
    check_interval: Duration,
    shutdown: F,
    mut on_tick: impl FnMut(&ConnectionSupervisor<C, S>),
) where
    C: Connector,
    S: DisplaySink,
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    let mut ticker = tokio::time::interval(check_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tracing::info!(
        endpoint = %supervisor.endpoint(),
        interval_ms = check_interval.as_millis() as u64,
        "Starting telemetry supervisor"
    );
    supervisor.start();

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            _ = ticker.tick() => {
                check_pending(supervisor, &mut events);
                on_tick(supervisor);
            }
            Some(event) = events.recv() => {
                supervisor.handle_event(event.generation, event.event);
            }
        }
    }

    supervisor.dispose();
    let stats = supervisor.stats();
    tracing::info!(
        attempts = stats.attempts,
        opens = stats.opens,
        frames = stats.frames_received,
        dropped = stats.frames_dropped,
        "Telemetry supervisor stopped"
    );
}

/// Hand over every event already queued, then run the liveness check.
///
/// The transport marks a handle `Closed` before its last events are
/// consumed, so checking first would drop the frames it delivered before
/// closing.
fn check_pending<C, S>(
    supervisor: &mut ConnectionSupervisor<C, S>,
    events: &mut mpsc::UnboundedReceiver<TransportEvent>,
) where
    C: Connector,
    S: DisplaySink,
{
    while let Ok(event) = events.try_recv() {
        supervisor.handle_event(event.generation, event.event);
    }
    supervisor.check();
}
