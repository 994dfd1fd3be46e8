//! Browser Transport
//!
//! Runs the telemetry console's `ConnectionSupervisor` on top of
//! `web_sys::WebSocket`. Socket callbacks report back into the supervisor
//! tagged with the generation of the handle that registered them, so a
//! late callback from a replaced socket is recognised and ignored.

use gloo_timers::callback::{Interval, Timeout};
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use telemetry_console::{
    ConnectionSupervisor, Connector, Generation, LinkEvent, ReadyState, TransportHandle,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CloseEvent, MessageEvent, UrlSearchParams, WebSocket};

use super::dashboard::{DashboardState, SignalSink};

/// Feed used when the page is not served over HTTP(S)
pub const DEFAULT_ENDPOINT: &str = "ws://localhost:8080/ws";

/// Liveness check cadence in milliseconds
pub const CHECK_INTERVAL_MS: u32 = 250;

pub type BrowserSupervisor = ConnectionSupervisor<BrowserConnector, SignalSink>;

/// Opens browser WebSockets whose callbacks feed the owning supervisor
pub struct BrowserConnector {
    supervisor: Weak<RefCell<BrowserSupervisor>>,
}

impl Connector for BrowserConnector {
    type Handle = BrowserHandle;

    fn connect(&mut self, endpoint: &str, generation: Generation) -> BrowserHandle {
        match WebSocket::new(endpoint) {
            Ok(ws) => {
                let callbacks = Callbacks::attach(&ws, generation, &self.supervisor);
                BrowserHandle {
                    ws: Some(ws),
                    callbacks: Some(callbacks),
                }
            }
            Err(e) => {
                // Reported as closed; the next check retries
                web_sys::console::error_1(
                    &format!("WebSocket {} to {} failed: {:?}", generation, endpoint, e).into(),
                );
                BrowserHandle {
                    ws: None,
                    callbacks: None,
                }
            }
        }
    }
}

/// One browser WebSocket and the callbacks registered on it
pub struct BrowserHandle {
    ws: Option<WebSocket>,
    callbacks: Option<Callbacks>,
}

impl TransportHandle for BrowserHandle {
    fn ready_state(&self) -> ReadyState {
        match self.ws.as_ref().map(WebSocket::ready_state) {
            Some(WebSocket::CONNECTING) => ReadyState::Connecting,
            // A closing socket has not closed yet
            Some(WebSocket::OPEN) | Some(WebSocket::CLOSING) => ReadyState::Open,
            _ => ReadyState::Closed,
        }
    }
}

impl Drop for BrowserHandle {
    fn drop(&mut self) {
        if let Some(ws) = &self.ws {
            ws.set_onopen(None);
            ws.set_onmessage(None);
            ws.set_onclose(None);
            ws.set_onerror(None);

            // Cancel the abandoned attempt; detached, so no close reaches the supervisor
            let state = ws.ready_state();
            if state == WebSocket::CONNECTING || state == WebSocket::OPEN {
                let _ = ws.close();
            }
        }

        // The supervisor may drop a handle from inside that handle's own
        // onclose callback; free the closures once it has returned.
        if let Some(callbacks) = self.callbacks.take() {
            Timeout::new(0, move || drop(callbacks)).forget();
        }
    }
}

struct Callbacks {
    _on_open: Closure<dyn FnMut(JsValue)>,
    _on_message: Closure<dyn FnMut(MessageEvent)>,
    _on_close: Closure<dyn FnMut(CloseEvent)>,
    _on_error: Closure<dyn FnMut(JsValue)>,
}

impl Callbacks {
    fn attach(
        ws: &WebSocket,
        generation: Generation,
        supervisor: &Weak<RefCell<BrowserSupervisor>>,
    ) -> Self {
        // On open
        let sup = supervisor.clone();
        let on_open = Closure::wrap(Box::new(move |_: JsValue| {
            web_sys::console::log_1(&format!("WebSocket {} connected", generation).into());
            deliver(&sup, generation, LinkEvent::Opened);
        }) as Box<dyn FnMut(JsValue)>);
        ws.set_onopen(Some(on_open.as_ref().unchecked_ref()));

        // On message
        let sup = supervisor.clone();
        let on_message = Closure::wrap(Box::new(move |event: MessageEvent| {
            if let Ok(text) = event.data().dyn_into::<js_sys::JsString>() {
                deliver(&sup, generation, LinkEvent::MessageReceived(text.into()));
            }
        }) as Box<dyn FnMut(MessageEvent)>);
        ws.set_onmessage(Some(on_message.as_ref().unchecked_ref()));

        // On close
        let sup = supervisor.clone();
        let on_close = Closure::wrap(Box::new(move |event: CloseEvent| {
            web_sys::console::log_1(
                &format!(
                    "WebSocket {} closed: code={}, reason={}",
                    generation,
                    event.code(),
                    event.reason()
                )
                .into(),
            );
            deliver(&sup, generation, LinkEvent::Closed);
        }) as Box<dyn FnMut(CloseEvent)>);
        ws.set_onclose(Some(on_close.as_ref().unchecked_ref()));

        // On error; a close event always follows
        let on_error = Closure::wrap(Box::new(move |e: JsValue| {
            web_sys::console::error_1(&format!("WebSocket {} error: {:?}", generation, e).into());
        }) as Box<dyn FnMut(JsValue)>);
        ws.set_onerror(Some(on_error.as_ref().unchecked_ref()));

        Self {
            _on_open: on_open,
            _on_message: on_message,
            _on_close: on_close,
            _on_error: on_error,
        }
    }
}

/// Hand one transport event to the supervisor, if it still exists
fn deliver(supervisor: &Weak<RefCell<BrowserSupervisor>>, generation: Generation, event: LinkEvent) {
    let Some(supervisor) = supervisor.upgrade() else {
        return;
    };

    match supervisor.try_borrow_mut() {
        Ok(mut supervisor) => supervisor.handle_event(generation, event),
        Err(_) => web_sys::console::warn_1(
            &format!("Supervisor busy, dropped {:?} from {}", event, generation).into(),
        ),
    };
}

/// Feed URL: `?endpoint=` wins, then the page's own origin, then
/// [`DEFAULT_ENDPOINT`]
pub fn dashboard_endpoint() -> String {
    let Some(location) = web_sys::window().map(|w| w.location()) else {
        return DEFAULT_ENDPOINT.to_string();
    };

    let from_query = location
        .search()
        .ok()
        .and_then(|search| UrlSearchParams::new_with_str(&search).ok())
        .and_then(|params| params.get("endpoint"));
    if let Some(endpoint) = from_query {
        return endpoint;
    }

    match (location.protocol(), location.host()) {
        (Ok(protocol), Ok(host)) if !host.is_empty() && protocol.starts_with("http") => {
            let scheme = if protocol == "https:" { "wss:" } else { "ws:" };
            format!("{}//{}/ws", scheme, host)
        }
        _ => DEFAULT_ENDPOINT.to_string(),
    }
}

/// Start supervising `endpoint` and schedule the liveness check
/// (call from app root)
pub fn init_supervisor(state: DashboardState, endpoint: String) -> Rc<RefCell<BrowserSupervisor>> {
    let history = state.series.with_untracked(|series| series.capacity());
    web_sys::console::log_1(
        &format!("Watching {} (fps history: {})", endpoint, history).into(),
    );

    let supervisor = Rc::new_cyclic(|weak| {
        RefCell::new(ConnectionSupervisor::new(
            endpoint,
            BrowserConnector {
                supervisor: weak.clone(),
            },
            SignalSink::new(state),
        ))
    });

    {
        let mut sup = supervisor.borrow_mut();
        sup.start();
        state.stats.set(sup.stats());
    }

    let for_check = Rc::clone(&supervisor);
    Interval::new(CHECK_INTERVAL_MS, move || {
        if let Ok(mut sup) = for_check.try_borrow_mut() {
            sup.check();
            state.stats.set(sup.stats());
        }
    })
    .forget();

    supervisor
}
