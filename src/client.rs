// src/client.rs

//! The public entry point: `PushClient`.
//!
//! A client is built once from a `ClientConfig`. Building resolves the comet
//! address and precomputes the auth and heartbeat frames; nothing touches the
//! network until `start()`. Each `start()` spawns a read loop task that runs a
//! single connection to completion. When that task ends the client is back in
//! `Stopped` and may be started again.

use crate::config::{ClientConfig, CometAddress};
use crate::connection::{ClientSession, ConnectionWorker};
use crate::core::CometError;
use crate::core::events::ClientEventListener;
use crate::core::protocol::{Operation, build_frame};
use crate::core::state::ConnectionState;
use bytes::Bytes;
use std::net::{SocketAddr, ToSocketAddrs};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// A long-lived client for a comet push service.
#[derive(Debug, Clone)]
pub struct PushClient {
    session: Arc<ClientSession>,
}

impl PushClient {
    /// Builds an unstarted client.
    ///
    /// Fails with a configuration error if the address is not exactly
    /// `host:port`, the host cannot be resolved, or a tunable is out of range.
    pub fn new(config: ClientConfig) -> Result<Self, CometError> {
        config.validate()?;
        let address = config.address()?;
        let server_addr = resolve(&address)?;

        let token = config.token.as_bytes();
        let auth_message = build_frame(Operation::Auth, token)?;
        // The comet expects the token on heartbeats as well.
        let heartbeat_message = build_frame(Operation::Heartbeat, token)?;

        info!(
            "Comet client for user {} targets {address} ({server_addr}).",
            config.user_id
        );
        let session = ClientSession::new(config, server_addr, auth_message, heartbeat_message);
        Ok(Self {
            session: Arc::new(session),
        })
    }

    /// Builds a client with the default buffer size, heartbeat interval and timeouts.
    pub fn with_defaults(
        server_address: &str,
        user_id: i64,
        token: &str,
    ) -> Result<Self, CometError> {
        Self::new(ClientConfig::new(server_address, user_id, token))
    }

    /// Replaces the event listener. Events already being delivered may still
    /// reach the previous listener.
    pub fn set_listener<L>(&self, listener: L)
    where
        L: ClientEventListener + 'static,
    {
        self.session.listener.set(Arc::new(listener));
    }

    /// Removes the event listener; later events are dropped.
    pub fn clear_listener(&self) {
        self.session.listener.clear();
    }

    /// Spawns a read loop task and returns immediately.
    ///
    /// Calling this while a connection is already running is harmless: the
    /// extra task connects, loses the race for the `Running` state, and exits
    /// without touching the running connection. Must be called from within a
    /// tokio runtime.
    pub fn start(&self) -> JoinHandle<()> {
        debug!("Spawning comet read loop.");
        tokio::spawn(ConnectionWorker::new(self.session.clone()).run())
    }

    /// Requests a graceful stop.
    ///
    /// Returns `true` if the client was `Running` and is now `Stopping`; the
    /// read loop then tears the connection down and reports `Stopped`. Returns
    /// `false` without side effects in any other state.
    pub fn stop(&self) -> bool {
        if !self
            .session
            .state
            .compare_and_set(ConnectionState::Running, ConnectionState::Stopping)
        {
            return false;
        }
        info!("Stopping comet client.");
        self.session.emit_state(ConnectionState::Stopping);
        if !self.session.cancel_connection() {
            debug!("Read loop has not registered its connection yet; it will observe the stop.");
        }
        true
    }

    pub fn state(&self) -> ConnectionState {
        self.session.state.get()
    }

    pub fn server_addr(&self) -> SocketAddr {
        self.session.server_addr
    }

    pub fn user_id(&self) -> i64 {
        self.session.config.user_id
    }

    pub fn config(&self) -> &ClientConfig {
        &self.session.config
    }

    /// The precomputed auth frame.
    pub fn auth_message(&self) -> &Bytes {
        &self.session.auth_message
    }

    /// The precomputed heartbeat frame.
    pub fn heartbeat_message(&self) -> &Bytes {
        &self.session.heartbeat_message
    }
}

/// Resolves the comet host, taking the first address the resolver returns.
fn resolve(address: &CometAddress) -> Result<SocketAddr, CometError> {
    (address.host.as_str(), address.port)
        .to_socket_addrs()
        .map_err(|e| CometError::HostResolution(format!("{address}: {e}")))?
        .next()
        .ok_or_else(|| CometError::HostResolution(format!("{address}: no addresses found")))
}
