// src/connection/session.rs

//! Defines the state shared by one client instance and its background tasks.

use crate::config::ClientConfig;
use crate::core::events::ListenerSlot;
use crate::core::state::{AtomicConnectionState, ConnectionState};
use crate::core::CometError;
use bytes::Bytes;
use parking_lot::Mutex as SyncMutex;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Holds everything the façade, the read loop and the heartbeat loop share.
///
/// The read half of the socket is not stored here: the read loop owns it
/// exclusively. The write half sits behind an async mutex so that a frame is
/// always written and flushed as a whole.
#[derive(Debug)]
pub struct ClientSession {
    /// The resolved comet endpoint.
    pub(crate) server_addr: SocketAddr,
    pub(crate) config: ClientConfig,
    /// The precomputed auth frame, carrying the token.
    pub(crate) auth_message: Bytes,
    /// The precomputed heartbeat frame.
    pub(crate) heartbeat_message: Bytes,
    pub(crate) state: AtomicConnectionState,
    pub(crate) listener: ListenerSlot,
    /// The write half of the current connection. `None` between connections.
    writer: Mutex<Option<OwnedWriteHalf>>,
    /// Cancels the current connection's read loop and heartbeat.
    cancel: SyncMutex<Option<CancellationToken>>,
}

impl ClientSession {
    pub(crate) fn new(
        config: ClientConfig,
        server_addr: SocketAddr,
        auth_message: Bytes,
        heartbeat_message: Bytes,
    ) -> Self {
        Self {
            server_addr,
            config,
            auth_message,
            heartbeat_message,
            state: AtomicConnectionState::default(),
            listener: ListenerSlot::default(),
            writer: Mutex::new(None),
            cancel: SyncMutex::new(None),
        }
    }

    pub(crate) fn heartbeat_interval(&self) -> Duration {
        self.config.heartbeat_interval
    }

    pub(crate) fn socket_timeout(&self) -> Duration {
        self.config.socket_timeout
    }

    /// Reports a state change to the listener.
    pub(crate) fn emit_state(&self, state: ConnectionState) {
        self.listener.emit(|l| l.on_connection_state_changed(state));
    }

    pub(crate) fn emit_error(&self, error: &CometError) {
        self.listener.emit(|l| l.on_error(error));
    }

    /// Installs the write half of a freshly established connection.
    pub(crate) async fn attach_writer(&self, writer: OwnedWriteHalf) {
        *self.writer.lock().await = Some(writer);
    }

    /// Shuts down and drops the current write half, if any.
    pub(crate) async fn close_writer(&self) {
        if let Some(mut writer) = self.writer.lock().await.take()
            && let Err(e) = writer.shutdown().await
        {
            debug!("Error while shutting down comet socket: {e}");
        }
    }

    /// Writes one complete frame and flushes it. Concurrent callers are
    /// serialized, so frames never interleave on the wire.
    pub(crate) async fn write_frame(&self, frame: &[u8]) -> Result<(), CometError> {
        let mut guard = self.writer.lock().await;
        let writer = guard.as_mut().ok_or(CometError::ConnectionClosed)?;
        writer.write_all(frame).await?;
        writer.flush().await?;
        Ok(())
    }

    pub(crate) fn attach_cancel(&self, token: CancellationToken) {
        *self.cancel.lock() = Some(token);
    }

    pub(crate) fn detach_cancel(&self) {
        self.cancel.lock().take();
    }

    /// Signals the current connection to shut down. Returns `false` if no
    /// connection has installed its token yet; the read loop then notices the
    /// state change on its next iteration instead.
    pub(crate) fn cancel_connection(&self) -> bool {
        match self.cancel.lock().as_ref() {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }
}
