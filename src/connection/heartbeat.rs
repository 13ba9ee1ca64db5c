// src/connection/heartbeat.rs

//! The periodic heartbeat sender.

use super::session::ClientSession;
use std::sync::Arc;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Sends the precomputed heartbeat frame once per heartbeat interval until its
/// connection is cancelled.
pub struct HeartbeatTask {
    session: Arc<ClientSession>,
    cancel: CancellationToken,
}

impl HeartbeatTask {
    pub fn new(session: Arc<ClientSession>, cancel: CancellationToken) -> Self {
        Self { session, cancel }
    }

    pub async fn run(self) {
        let interval = self.session.heartbeat_interval();
        // The first heartbeat goes out one full interval after auth, not immediately.
        let mut timer = time::interval_at(Instant::now() + interval, interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!("Heartbeat task started with interval {interval:?}.");

        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                _ = timer.tick() => {}
            }

            let sent = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                result = self.session.write_frame(&self.session.heartbeat_message) => result,
            };
            match sent {
                Ok(()) => debug!("Heartbeat sent to comet."),
                Err(e) => {
                    // The read loop sees the same broken socket and reports it.
                    warn!("Failed to send heartbeat to comet: {e}");
                    break;
                }
            }
        }
        debug!("Heartbeat task stopped.");
    }
}
