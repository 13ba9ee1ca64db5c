// src/core/events.rs

//! Defines the listener interface through which the client reports its
//! lifecycle, and a few ready-made listeners.
//!
//! Callbacks run on the task that observed the event. Delivery is best-effort
//! and at-most-once; no event is queued or retried by the client itself.

use crate::core::CometError;
use crate::core::state::ConnectionState;
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

/// The sink for client events. Implementations must be cheap and must not block,
/// since they are invoked inline from the read loop.
pub trait ClientEventListener: Send + Sync {
    fn on_connection_state_changed(&self, state: ConnectionState);
    fn on_error(&self, error: &CometError);
    /// Only ever called with `true`: the comet protocol has no way to report a
    /// rejected token, the server simply closes the connection.
    fn on_auth(&self, success: bool);
    fn on_message(&self, version: u16, message: String);
}

/// An owned copy of a single listener callback.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    ConnectionStateChanged(ConnectionState),
    Error(CometError),
    Auth(bool),
    Message { version: u16, message: String },
}

/// Forwards every callback into an unbounded channel, for owners that prefer
/// consuming events as a stream.
impl ClientEventListener for UnboundedSender<ClientEvent> {
    fn on_connection_state_changed(&self, state: ConnectionState) {
        let _ = self.send(ClientEvent::ConnectionStateChanged(state));
    }

    fn on_error(&self, error: &CometError) {
        let _ = self.send(ClientEvent::Error(error.clone()));
    }

    fn on_auth(&self, success: bool) {
        let _ = self.send(ClientEvent::Auth(success));
    }

    fn on_message(&self, version: u16, message: String) {
        let _ = self.send(ClientEvent::Message { version, message });
    }
}

/// Writes every event to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingListener;

impl ClientEventListener for LoggingListener {
    fn on_connection_state_changed(&self, state: ConnectionState) {
        info!("Connection state changed to {state}");
    }

    fn on_error(&self, error: &CometError) {
        warn!("Comet client error: {error}");
    }

    fn on_auth(&self, success: bool) {
        info!("Authentication acknowledged (success={success})");
    }

    fn on_message(&self, version: u16, message: String) {
        info!(version, "Received push message: {message}");
    }
}

/// Holds the currently installed listener. Replacing it is not ordered against
/// in-flight deliveries: an event already being dispatched may still reach the
/// previous listener.
#[derive(Default)]
pub struct ListenerSlot {
    inner: RwLock<Option<Arc<dyn ClientEventListener>>>,
}

impl ListenerSlot {
    pub fn set(&self, listener: Arc<dyn ClientEventListener>) {
        *self.inner.write() = Some(listener);
    }

    pub fn clear(&self) {
        *self.inner.write() = None;
    }

    pub fn is_set(&self) -> bool {
        self.inner.read().is_some()
    }

    /// Runs `f` against the current listener, if one is installed.
    /// The lock is released before the callback runs.
    pub fn emit(&self, f: impl FnOnce(&dyn ClientEventListener)) {
        let listener = self.inner.read().clone();
        match listener {
            Some(listener) => f(listener.as_ref()),
            None => debug!("No listener installed, dropping client event."),
        }
    }
}

impl std::fmt::Debug for ListenerSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerSlot")
            .field("is_set", &self.is_set())
            .finish()
    }
}
