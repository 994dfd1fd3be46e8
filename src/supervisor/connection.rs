//! Connection Supervisor
//!
//! Owns the single transport handle, routes decoded frames to the display
//! sink and restarts the link whenever the held handle is found closed.

use tracing::{debug, info, trace};

use super::clock::{Clock, SystemClock};
use super::policy::ReconnectPolicy;
use super::state::{Generation, LinkEvent, LinkState, ReadyState};
use super::transport::{Connector, TransportHandle};
use crate::display::{ConnectionIndicator, DisplaySink, DisplayTarget, FpsSample};
use crate::telemetry::{decode_frame, Decoded, TelemetryMessage};

/// Counters describing what the supervisor has seen so far
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SupervisorStats {
    /// Handles started
    pub attempts: u64,
    /// Handles that reached `Open`
    pub opens: u64,
    /// Closes observed (one per handle at most)
    pub closes: u64,
    /// Text frames delivered, summed over every handle
    pub frames_received: u64,
    /// Frames skipped because they could not be decoded
    pub frames_dropped: u64,
    /// Events ignored because they came from a replaced handle
    pub stale_events: u64,
}

/// The handle currently held, with what has been observed about it
struct Attempt<H> {
    generation: Generation,
    handle: H,
    opened: bool,
    close_observed: bool,
}

impl<H: TransportHandle> Attempt<H> {
    fn is_closed(&self) -> bool {
        self.close_observed || self.handle.ready_state() == ReadyState::Closed
    }
}

/// Keeps one telemetry link alive and feeds a display sink
pub struct ConnectionSupervisor<C: Connector, S: DisplaySink> {
    endpoint: String,
    connector: C,
    sink: S,
    clock: Box<dyn Clock>,
    policy: ReconnectPolicy,
    current: Option<Attempt<C::Handle>>,
    next_generation: u64,
    link: LinkState,
    consecutive_failures: u32,
    retry_at_ms: Option<i64>,
    disposed: bool,
    stats: SupervisorStats,
}

impl<C: Connector, S: DisplaySink> ConnectionSupervisor<C, S> {
    /// Create a supervisor for `endpoint`. Nothing connects until `start()`
    /// or `check()` is called.
    pub fn new(endpoint: impl Into<String>, connector: C, sink: S) -> Self {
        Self {
            endpoint: endpoint.into(),
            connector,
            sink,
            clock: Box::new(SystemClock),
            policy: ReconnectPolicy::default(),
            current: None,
            next_generation: 0,
            link: LinkState::Disconnected,
            consecutive_failures: 0,
            retry_at_ms: None,
            disposed: false,
            stats: SupervisorStats::default(),
        }
    }

    /// Use a different reconnect policy
    pub fn with_policy(mut self, policy: ReconnectPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Use a different clock for timestamps and backoff deadlines
    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Start a new connection attempt, replacing the held handle.
    ///
    /// A replaced handle is dropped without being closed; any event it still
    /// delivers is ignored.
    pub fn start(&mut self) {
        if self.disposed {
            debug!(endpoint = %self.endpoint, "Supervisor disposed, not starting");
            return;
        }

        self.next_generation += 1;
        let generation = Generation(self.next_generation);
        let handle = self.connector.connect(&self.endpoint, generation);

        let replaced = self.current.replace(Attempt {
            generation,
            handle,
            opened: false,
            close_observed: false,
        });
        if let Some(old) = replaced {
            if !old.is_closed() {
                debug!(
                    generation = %old.generation,
                    "Abandoning transport handle that has not closed"
                );
            }
        }

        self.link = self.link.on_start();
        self.stats.attempts += 1;
        debug!(endpoint = %self.endpoint, generation = %generation, "Connecting");
    }

    /// Liveness check: start a new handle if there is none or the held one
    /// is closed. Safe to call at any time and any number of times.
    pub fn check(&mut self) {
        if self.disposed {
            return;
        }

        let pending_close = match &self.current {
            None => None,
            Some(attempt) if !attempt.is_closed() => return,
            Some(attempt) if attempt.close_observed => None,
            Some(attempt) => Some(attempt.generation),
        };

        // The handle closed but its Closed event has not arrived yet.
        if let Some(generation) = pending_close {
            self.observe_close(generation);
        }

        if let Some(retry_at) = self.retry_at_ms {
            if self.clock.now_millis() < retry_at {
                trace!(retry_at_ms = retry_at, "Waiting for reconnect backoff");
                return;
            }
        }

        self.start();
    }

    /// Deliver a transport event for the handle `generation`
    pub fn handle_event(&mut self, generation: Generation, event: LinkEvent) {
        if !self.is_current(generation) {
            self.stats.stale_events += 1;
            trace!(generation = %generation, ?event, "Ignoring event from replaced handle");
            return;
        }

        match event {
            LinkEvent::Opened => self.on_open(),
            LinkEvent::MessageReceived(raw) => self.on_message(&raw),
            LinkEvent::Closed => self.on_close(generation),
        }
    }

    /// Drop the held handle and stop reconnecting
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;

        if let Some(attempt) = self.current.take() {
            debug!(generation = %attempt.generation, "Detaching transport handle");
        }
        if self.link != LinkState::Disconnected {
            self.sink.set_indicator(ConnectionIndicator::Disconnected);
        }
        self.link = LinkState::Disconnected;

        info!(endpoint = %self.endpoint, "Supervisor disposed");
    }

    fn on_open(&mut self) {
        if let Some(attempt) = self.current.as_mut() {
            attempt.opened = true;
        }
        self.link = self.link.on_event(&LinkEvent::Opened);
        self.consecutive_failures = 0;
        self.retry_at_ms = None;
        self.stats.opens += 1;

        self.sink.set_indicator(ConnectionIndicator::Connected);
        info!(endpoint = %self.endpoint, "Telemetry link connected");
    }

    fn on_message(&mut self, raw: &str) {
        self.stats.frames_received += 1;

        match decode_frame(raw) {
            Ok(Decoded::Message(message)) => self.route(message),
            Ok(Decoded::Unrecognized(tag)) => {
                trace!(tag = %tag, "Ignoring unrecognized telemetry type");
            }
            Err(e) => {
                self.stats.frames_dropped += 1;
                debug!(error = %e, frame = %raw, "Dropping malformed telemetry frame");
            }
        }
    }

    fn on_close(&mut self, generation: Generation) {
        self.observe_close(generation);
        self.check();
    }

    /// Close side effects, applied once per handle
    fn observe_close(&mut self, generation: Generation) {
        let now = self.clock.now_millis();

        let Some(attempt) = self.current.as_mut().filter(|a| a.generation == generation) else {
            return;
        };
        if attempt.close_observed {
            return;
        }
        attempt.close_observed = true;

        if attempt.opened {
            info!(endpoint = %self.endpoint, "Telemetry link closed");
            self.consecutive_failures = 0;
        } else {
            debug!(endpoint = %self.endpoint, generation = %generation, "Connection attempt failed");
            self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        }

        let delay = self.policy.delay_after(self.consecutive_failures);
        self.retry_at_ms = (delay > 0).then(|| now.saturating_add(delay as i64));

        self.link = self.link.on_event(&LinkEvent::Closed);
        self.stats.closes += 1;

        self.sink.set_indicator(ConnectionIndicator::Disconnected);
        self.sink.push_sample(FpsSample::new(now, 0.0));
    }

    fn route(&mut self, message: TelemetryMessage) {
        match DisplayTarget::from(message.kind) {
            DisplayTarget::Readout(readout) => {
                self.sink.set_readout(readout, &message.value.as_text());
            }
            DisplayTarget::FpsSeries => {
                // decode_frame only yields timer_fps frames with a numeric value
                if let Some(fps) = message.value.as_number() {
                    let sample = FpsSample::new(self.clock.now_millis(), fps);
                    self.sink.push_sample(sample);
                }
            }
        }
    }

    fn is_current(&self, generation: Generation) -> bool {
        self.current
            .as_ref()
            .is_some_and(|a| a.generation == generation && !a.close_observed)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn policy(&self) -> ReconnectPolicy {
        self.policy
    }

    pub fn link_state(&self) -> LinkState {
        self.link
    }

    /// Generation of the held handle, if any
    pub fn current_generation(&self) -> Option<Generation> {
        self.current.as_ref().map(|a| a.generation)
    }

    /// Ready state of the held handle, if any
    pub fn current_ready_state(&self) -> Option<ReadyState> {
        self.current.as_ref().map(|a| a.handle.ready_state())
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn stats(&self) -> SupervisorStats {
        self.stats
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::{Dashboard, FpsSample, Readout};
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;
    use std::sync::atomic::{AtomicI64, Ordering};
    use std::sync::Arc;

    /// Connector whose handles are driven by the test
    #[derive(Default)]
    struct FakeConnector {
        handles: Rc<RefCell<Vec<FakeState>>>,
    }

    #[derive(Clone)]
    struct FakeState {
        generation: Generation,
        state: Rc<Cell<ReadyState>>,
        dropped: Rc<Cell<bool>>,
    }

    struct FakeHandle {
        state: Rc<Cell<ReadyState>>,
        dropped: Rc<Cell<bool>>,
    }

    impl Drop for FakeHandle {
        fn drop(&mut self) {
            self.dropped.set(true);
        }
    }

    impl TransportHandle for FakeHandle {
        fn ready_state(&self) -> ReadyState {
            self.state.get()
        }
    }

    impl Connector for FakeConnector {
        type Handle = FakeHandle;

        fn connect(&mut self, endpoint: &str, generation: Generation) -> FakeHandle {
            assert_eq!(endpoint, ENDPOINT);
            let state = Rc::new(Cell::new(ReadyState::Connecting));
            let dropped = Rc::new(Cell::new(false));
            self.handles.borrow_mut().push(FakeState {
                generation,
                state: Rc::clone(&state),
                dropped: Rc::clone(&dropped),
            });
            FakeHandle { state, dropped }
        }
    }

    /// Sink that records every write in order
    #[derive(Debug, Clone, PartialEq)]
    enum Write {
        Indicator(ConnectionIndicator),
        Readout(Readout, String),
        Sample(FpsSample),
    }

    #[derive(Default)]
    struct RecordingSink {
        writes: Vec<Write>,
    }

    impl DisplaySink for RecordingSink {
        fn set_indicator(&mut self, indicator: ConnectionIndicator) {
            self.writes.push(Write::Indicator(indicator));
        }

        fn set_readout(&mut self, readout: Readout, text: &str) {
            self.writes.push(Write::Readout(readout, text.to_string()));
        }

        fn push_sample(&mut self, sample: FpsSample) {
            self.writes.push(Write::Sample(sample));
        }
    }

    #[derive(Clone)]
    struct ManualClock(Arc<AtomicI64>);

    impl ManualClock {
        fn new(start: i64) -> Self {
            Self(Arc::new(AtomicI64::new(start)))
        }

        fn advance(&self, ms: i64) {
            self.0.fetch_add(ms, Ordering::SeqCst);
        }
    }

    impl Clock for ManualClock {
        fn now_millis(&self) -> i64 {
            self.0.load(Ordering::SeqCst)
        }
    }

    const ENDPOINT: &str = "ws://localhost:8080/ws";

    type TestSupervisor = ConnectionSupervisor<FakeConnector, RecordingSink>;

    fn supervisor() -> (TestSupervisor, Rc<RefCell<Vec<FakeState>>>, ManualClock) {
        let connector = FakeConnector::default();
        let handles = Rc::clone(&connector.handles);
        let clock = ManualClock::new(1_000);
        let sup = ConnectionSupervisor::new(ENDPOINT, connector, RecordingSink::default())
            .with_clock(Box::new(clock.clone()));
        (sup, handles, clock)
    }

    fn latest(handles: &Rc<RefCell<Vec<FakeState>>>) -> FakeState {
        handles.borrow().last().cloned().expect("no handle created")
    }

    fn open(sup: &mut TestSupervisor, handle: &FakeState) {
        handle.state.set(ReadyState::Open);
        sup.handle_event(handle.generation, LinkEvent::Opened);
    }

    fn close(sup: &mut TestSupervisor, handle: &FakeState) {
        handle.state.set(ReadyState::Closed);
        sup.handle_event(handle.generation, LinkEvent::Closed);
    }

    fn message(sup: &mut TestSupervisor, handle: &FakeState, raw: &str) {
        sup.handle_event(handle.generation, LinkEvent::MessageReceived(raw.to_string()));
    }

    fn zero_samples(sink: &RecordingSink) -> usize {
        sink.writes
            .iter()
            .filter(|w| matches!(w, Write::Sample(s) if s.value == 0.0))
            .count()
    }

    #[test]
    fn test_frames_received_counts_across_handles() {
        let (mut sup, handles, _) = supervisor();
        sup.start();
        let first = latest(&handles);
        open(&mut sup, &first);
        message(&mut sup, &first, r#"{"type":"timer_fps","value":60}"#);
        message(&mut sup, &first, r#"{"type":"timer_fps","value":59}"#);
        close(&mut sup, &first);

        let second = latest(&handles);
        open(&mut sup, &second);
        message(&mut sup, &second, r#"{"type":"timer_fps","value":58}"#);

        assert_eq!(sup.stats().frames_received, 3);
        assert_eq!(sup.stats().attempts, 2);
    }

    #[test]
    fn test_check_before_start_connects() {
        let (mut sup, handles, _) = supervisor();
        assert!(sup.current_generation().is_none());

        sup.check();

        assert_eq!(handles.borrow().len(), 1);
        assert_eq!(sup.link_state(), LinkState::Connecting);
        assert_eq!(sup.current_ready_state(), Some(ReadyState::Connecting));
    }

    #[test]
    fn test_check_is_idempotent_while_open() {
        let (mut sup, handles, _) = supervisor();
        sup.start();
        let handle = latest(&handles);
        open(&mut sup, &handle);

        for _ in 0..10 {
            sup.check();
        }

        assert_eq!(handles.borrow().len(), 1);
        assert_eq!(sup.current_generation(), Some(handle.generation));
        assert!(sup.link_state().is_connected());
    }

    #[test]
    fn test_check_is_idempotent_while_connecting() {
        let (mut sup, handles, _) = supervisor();
        sup.start();
        sup.check();
        sup.check();
        assert_eq!(handles.borrow().len(), 1);
    }

    #[test]
    fn test_close_restarts_exactly_once() {
        let (mut sup, handles, _) = supervisor();
        sup.start();
        let first = latest(&handles);
        open(&mut sup, &first);

        close(&mut sup, &first);

        // The close handler already checked; the next tick must not start again
        assert_eq!(handles.borrow().len(), 2);
        sup.check();
        assert_eq!(handles.borrow().len(), 2);
        assert!(first.dropped.get());
        assert_eq!(sup.link_state(), LinkState::Connecting);
    }

    #[test]
    fn test_check_after_silent_close_restarts_once() {
        let (mut sup, handles, _) = supervisor();
        sup.start();
        let first = latest(&handles);
        open(&mut sup, &first);

        // Transport reports Closed through its ready state before the event
        first.state.set(ReadyState::Closed);
        sup.check();
        assert_eq!(handles.borrow().len(), 2);

        // The late Closed event for the old handle changes nothing
        sup.handle_event(first.generation, LinkEvent::Closed);
        assert_eq!(handles.borrow().len(), 2);
        assert_eq!(zero_samples(sup.sink()), 1);
        assert_eq!(sup.stats().closes, 1);
        assert_eq!(sup.stats().stale_events, 1);
    }

    #[test]
    fn test_message_routing() {
        let cases = [
            (
                r#"{"type":"camera_position","value":"[1.00, 2.00, 3.00]"}"#,
                Write::Readout(Readout::Position, "[1.00, 2.00, 3.00]".to_string()),
            ),
            (
                r#"{"type":"camera_forward","value":"[0.00, 0.00, 1.00]"}"#,
                Write::Readout(Readout::Forward, "[0.00, 0.00, 1.00]".to_string()),
            ),
            (
                r#"{"type":"camera_angle","value":"[H: 1.57, V:0.00]"}"#,
                Write::Readout(Readout::Angle, "[H: 1.57, V:0.00]".to_string()),
            ),
            (
                r#"{"type":"timer_fps","value":"60.000000"}"#,
                Write::Sample(FpsSample::new(1_000, 60.0)),
            ),
        ];

        for (raw, expected) in cases {
            let (mut sup, handles, _) = supervisor();
            sup.start();
            let handle = latest(&handles);
            open(&mut sup, &handle);
            let before = sup.sink().writes.len();

            message(&mut sup, &handle, raw);

            assert_eq!(&sup.sink().writes[before..], &[expected]);
        }
    }

    #[test]
    fn test_unknown_type_is_a_no_op() {
        let (mut sup, handles, _) = supervisor();
        sup.start();
        let handle = latest(&handles);
        open(&mut sup, &handle);
        let before = sup.sink().writes.len();

        message(&mut sup, &handle, r#"{"type":"light_count","value":4}"#);

        assert_eq!(sup.sink().writes.len(), before);
        assert_eq!(sup.stats().frames_received, 1);
        assert_eq!(sup.stats().frames_dropped, 0);
        assert!(sup.link_state().is_connected());
    }

    #[test]
    fn test_malformed_frame_is_skipped() {
        let (mut sup, handles, _) = supervisor();
        sup.start();
        let handle = latest(&handles);
        open(&mut sup, &handle);
        let before = sup.sink().writes.len();

        message(&mut sup, &handle, "{not json");
        message(&mut sup, &handle, r#"{"value":"no type"}"#);
        message(&mut sup, &handle, r#"{"type":"camera_angle","value":"[H: 0.00, V:0.00]"}"#);

        assert_eq!(sup.stats().frames_dropped, 2);
        assert_eq!(
            &sup.sink().writes[before..],
            &[Write::Readout(Readout::Angle, "[H: 0.00, V:0.00]".to_string())]
        );
        assert_eq!(handles.borrow().len(), 1);
    }

    #[test]
    fn test_close_appends_one_zero_sample() {
        let (mut sup, handles, clock) = supervisor();
        sup.start();
        let handle = latest(&handles);
        open(&mut sup, &handle);
        clock.advance(500);
        message(&mut sup, &handle, r#"{"type":"timer_fps","value":59}"#);
        clock.advance(250);

        close(&mut sup, &handle);

        let samples: Vec<FpsSample> = sup
            .sink()
            .writes
            .iter()
            .filter_map(|w| match w {
                Write::Sample(s) => Some(*s),
                _ => None,
            })
            .collect();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0], FpsSample::new(1_500, 59.0));
        assert_eq!(samples[1].value, 0.0);
        assert!(samples[1].timestamp_ms >= samples[0].timestamp_ms);
        assert_eq!(
            sup.sink().writes.last(),
            Some(&Write::Sample(FpsSample::new(1_750, 0.0)))
        );
    }

    #[test]
    fn test_indicator_follows_link() {
        let (mut sup, handles, _) = supervisor();
        sup.start();
        let handle = latest(&handles);
        open(&mut sup, &handle);
        close(&mut sup, &handle);

        let indicators: Vec<ConnectionIndicator> = sup
            .sink()
            .writes
            .iter()
            .filter_map(|w| match w {
                Write::Indicator(i) => Some(*i),
                _ => None,
            })
            .collect();
        assert_eq!(
            indicators,
            vec![ConnectionIndicator::Connected, ConnectionIndicator::Disconnected]
        );
    }

    #[test]
    fn test_refused_connections_keep_retrying() {
        let (mut sup, handles, _) = supervisor();
        sup.start();

        for tick in 1..=5 {
            let handle = latest(&handles);
            assert_eq!(handle.state.get(), ReadyState::Connecting);
            close(&mut sup, &handle);
            sup.check();
            assert_eq!(handles.borrow().len(), tick + 1);
        }

        assert!(sup
            .sink()
            .writes
            .iter()
            .all(|w| *w != Write::Indicator(ConnectionIndicator::Connected)));
        assert_eq!(sup.stats().attempts, 6);
        assert_eq!(sup.stats().opens, 0);
        assert_eq!(sup.stats().closes, 5);
    }

    #[test]
    fn test_events_from_replaced_handle_are_ignored() {
        let (mut sup, handles, _) = supervisor();
        sup.start();
        let old = latest(&handles);
        open(&mut sup, &old);

        // Explicit restart abandons the open handle
        sup.start();
        let new = latest(&handles);
        assert!(old.dropped.get());
        let before = sup.sink().writes.len();

        message(&mut sup, &old, r#"{"type":"camera_position","value":"stale"}"#);
        close(&mut sup, &old);

        assert_eq!(sup.sink().writes.len(), before);
        assert_eq!(sup.stats().stale_events, 2);
        assert_eq!(sup.current_generation(), Some(new.generation));
        assert_eq!(handles.borrow().len(), 2);
    }

    #[test]
    fn test_end_to_end_scenario() {
        let connector = FakeConnector::default();
        let handles = Rc::clone(&connector.handles);
        let mut sup = ConnectionSupervisor::new(ENDPOINT, connector, Dashboard::new(16));
        sup.start();
        let handle = latest(&handles);
        handle.state.set(ReadyState::Open);
        sup.handle_event(handle.generation, LinkEvent::Opened);

        sup.handle_event(
            handle.generation,
            LinkEvent::MessageReceived(
                r#"{"type":"camera_position","value":"12.3,4.5,6.7"}"#.to_string(),
            ),
        );
        assert_eq!(sup.sink().readout(Readout::Position), Some("12.3,4.5,6.7"));

        sup.handle_event(
            handle.generation,
            LinkEvent::MessageReceived(r#"{"type":"timer_fps","value":59}"#.to_string()),
        );
        assert_eq!(sup.sink().series().latest().map(|s| s.value), Some(59.0));
        assert_eq!(sup.sink().indicator(), ConnectionIndicator::Connected);
    }

    #[test]
    fn test_backoff_delays_restart_and_resets_on_open() {
        let (sup, handles, clock) = supervisor();
        let mut sup = sup.with_policy(ReconnectPolicy::Backoff {
            initial_delay_ms: 1_000,
            max_delay_ms: 4_000,
        });
        sup.start();

        // First failure: wait 1s
        close(&mut sup, &latest(&handles));
        assert_eq!(handles.borrow().len(), 1);
        clock.advance(999);
        sup.check();
        assert_eq!(handles.borrow().len(), 1);
        clock.advance(1);
        sup.check();
        assert_eq!(handles.borrow().len(), 2);

        // Second failure: wait 2s
        close(&mut sup, &latest(&handles));
        clock.advance(1_999);
        sup.check();
        assert_eq!(handles.borrow().len(), 2);
        clock.advance(1);
        sup.check();
        assert_eq!(handles.borrow().len(), 3);

        // A successful open resets the backoff: the next close restarts immediately
        let handle = latest(&handles);
        open(&mut sup, &handle);
        close(&mut sup, &handle);
        assert_eq!(handles.borrow().len(), 4);
    }

    #[test]
    fn test_dispose_stops_reconnecting() {
        let (mut sup, handles, _) = supervisor();
        sup.start();
        let handle = latest(&handles);
        open(&mut sup, &handle);

        sup.dispose();

        assert!(handle.dropped.get());
        assert!(sup.is_disposed());
        assert!(sup.current_generation().is_none());
        assert_eq!(
            sup.sink().writes.last(),
            Some(&Write::Indicator(ConnectionIndicator::Disconnected))
        );

        sup.check();
        sup.start();
        assert_eq!(handles.borrow().len(), 1);

        // Nothing from the detached handle reaches the sink
        let before = sup.sink().writes.len();
        close(&mut sup, &handle);
        assert_eq!(sup.sink().writes.len(), before);
    }
}
