// src/connection/worker.rs

//! Implements the read loop of a comet client.
//!
//! The worker owns one connection attempt from start to finish. It connects to
//! the comet, claims the `Running` state, sends the auth frame, and then
//! dispatches inbound frames until the peer closes the socket, `stop()` cancels
//! the connection, or an I/O or protocol error occurs. Every exit path ends in
//! the same teardown: the heartbeat is cancelled and joined, the socket is
//! closed, and the state is forced back to `Stopped`.
//!
//! There is no reconnection here. Once the worker returns, the owner decides
//! whether to call `start()` again.

use super::heartbeat::HeartbeatTask;
use super::session::ClientSession;
use crate::core::CometError;
use crate::core::protocol::{CometFrameCodec, Frame, Operation};
use crate::core::state::ConnectionState;
use futures::StreamExt;
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::net::tcp::OwnedReadHalf;
use tokio::task::JoinHandle;
use tokio_util::codec::FramedRead;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Why the read loop stopped consuming frames.
#[derive(Debug)]
enum LoopExit {
    /// The comet closed the connection.
    PeerClosed,
    /// `stop()` was called.
    Cancelled,
    /// Reading, writing or decoding failed.
    Failed(CometError),
}

/// The read loop task for a single connection attempt.
pub struct ConnectionWorker {
    session: Arc<ClientSession>,
    /// The heartbeat task, spawned on the first auth acknowledgment.
    heartbeat: Option<JoinHandle<()>>,
}

impl ConnectionWorker {
    pub fn new(session: Arc<ClientSession>) -> Self {
        Self {
            session,
            heartbeat: None,
        }
    }

    /// Runs one connection from connect to teardown.
    pub async fn run(mut self) {
        let addr = self.session.server_addr;

        let stream = match self.connect().await {
            Ok(stream) => stream,
            Err(e) => {
                // This attempt never owned the Running state, so the state is
                // left as is: another attempt may be the one running.
                error!("Failed to connect to comet at {addr}: {e}");
                self.session.emit_error(&e);
                return;
            }
        };

        if !self
            .session
            .state
            .compare_and_set(ConnectionState::Stopped, ConnectionState::Running)
        {
            debug!("Client is already running. Dropping redundant connection to {addr}.");
            return;
        }

        let cancel = CancellationToken::new();
        self.session.attach_cancel(cancel.clone());

        let (reader, writer) = stream.into_split();
        self.session.attach_writer(writer).await;
        info!(
            "Connected to comet at {addr} as user {}.",
            self.session.config.user_id
        );
        self.session.emit_state(ConnectionState::Running);

        let exit = self.process_stream(reader, &cancel).await;
        self.teardown(cancel, exit).await;
    }

    async fn connect(&self) -> Result<TcpStream, CometError> {
        let addr = self.session.server_addr;
        let connect_timeout = self.session.config.connect_timeout;
        info!("Attempting to connect to comet at {addr}");
        let stream = tokio::time::timeout(connect_timeout, TcpStream::connect(addr))
            .await
            .map_err(|_| CometError::ConnectTimeout(connect_timeout))??;
        if let Err(e) = stream.set_nodelay(true) {
            debug!("Could not set TCP_NODELAY on comet socket: {e}");
        }
        Ok(stream)
    }

    /// Sends the auth frame, then reads and dispatches frames while the state stays `Running`.
    async fn process_stream(&mut self, reader: OwnedReadHalf, cancel: &CancellationToken) -> LoopExit {
        if let Err(e) = self.session.write_frame(&self.session.auth_message).await {
            return LoopExit::Failed(e);
        }
        debug!("Auth frame sent, awaiting acknowledgment.");

        let codec = CometFrameCodec::new(self.session.config.max_frame_length);
        let mut framed = FramedRead::with_capacity(reader, codec, self.session.config.buffer_size);
        let socket_timeout = self.session.socket_timeout();

        while self.session.state.get() == ConnectionState::Running {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => return LoopExit::Cancelled,
                result = tokio::time::timeout(socket_timeout, framed.next()) => result,
            };

            let frame = match next {
                Ok(Some(Ok(frame))) => frame,
                Ok(Some(Err(e))) => return LoopExit::Failed(e),
                Ok(None) => return LoopExit::PeerClosed,
                Err(_) => return LoopExit::Failed(CometError::ReadTimeout(socket_timeout)),
            };
            self.handle_frame(frame, cancel);
        }

        // The state left Running without a cancellation reaching us first,
        // which only `stop()` does.
        LoopExit::Cancelled
    }

    fn handle_frame(&mut self, frame: Frame, cancel: &CancellationToken) {
        match frame.operation() {
            Operation::HeartbeatReply => {
                debug!("Heartbeat acknowledged by comet.");
            }
            Operation::AuthReply => {
                info!("Authentication acknowledged by comet.");
                self.session.listener.emit(|l| l.on_auth(true));
                if self.heartbeat.is_none() {
                    let task = HeartbeatTask::new(self.session.clone(), cancel.child_token());
                    self.heartbeat = Some(tokio::spawn(task.run()));
                }
            }
            Operation::Message => {
                let version = frame.version();
                let message = frame.text();
                debug!(version, len = message.len(), "Received push message.");
                self.session
                    .listener
                    .emit(|l| l.on_message(version, message));
            }
            other => {
                // Unknown codes are tolerated so newer servers can add operations.
                debug!("Ignoring frame with unhandled operation {other:?}.");
            }
        }
    }

    /// Closes the connection and reports the final state.
    async fn teardown(mut self, cancel: CancellationToken, exit: LoopExit) {
        cancel.cancel();
        if let Some(heartbeat) = self.heartbeat.take()
            && let Err(e) = heartbeat.await
        {
            warn!("Heartbeat task ended abnormally: {e}");
        }

        self.session.close_writer().await;
        self.session.detach_cancel();
        self.session.state.set(ConnectionState::Stopped);

        let addr = self.session.server_addr;
        match &exit {
            LoopExit::PeerClosed => info!("Connection to comet at {addr} closed by peer."),
            LoopExit::Cancelled => info!("Connection to comet at {addr} stopped."),
            LoopExit::Failed(e) => error!("Connection to comet at {addr} failed: {e}"),
        }

        self.session.emit_state(ConnectionState::Stopped);
        if let LoopExit::Failed(e) = exit {
            self.session.emit_error(&e);
        }
    }
}
