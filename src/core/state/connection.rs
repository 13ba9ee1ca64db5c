// src/core/state/connection.rs

//! The connection state register.
//!
//! This is the only piece of data the caller's `stop()` and the read loop
//! coordinate through. Transitions are made with compare-and-set so that two
//! racing parties always produce exactly one winner.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

/// The lifecycle state of a client connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ConnectionState {
    /// No connection is active. Initial and terminal state.
    Stopped = 0,
    /// A connection owns the socket and the read loop is consuming frames.
    Running = 1,
    /// `stop()` was requested; the read loop has not finished tearing down yet.
    Stopping = 2,
}

impl ConnectionState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            1 => ConnectionState::Running,
            2 => ConnectionState::Stopping,
            _ => ConnectionState::Stopped,
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConnectionState::Stopped => "STOPPED",
            ConnectionState::Running => "RUNNING",
            ConnectionState::Stopping => "STOPPING",
        };
        f.write_str(name)
    }
}

/// A lock-free cell holding a `ConnectionState`.
#[derive(Debug)]
pub struct AtomicConnectionState(AtomicU8);

impl AtomicConnectionState {
    pub fn new(initial: ConnectionState) -> Self {
        Self(AtomicU8::new(initial as u8))
    }

    pub fn get(&self) -> ConnectionState {
        ConnectionState::from_u8(self.0.load(Ordering::SeqCst))
    }

    /// Moves to `next` only if the current state is `expected`.
    /// Returns `false`, leaving the state untouched, if the race was lost.
    pub fn compare_and_set(&self, expected: ConnectionState, next: ConnectionState) -> bool {
        self.0
            .compare_exchange(expected as u8, next as u8, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    /// Unconditionally stores `next`. Reserved for the read loop's teardown,
    /// which forces `Stopped` from either `Running` or `Stopping`.
    pub(crate) fn set(&self, next: ConnectionState) {
        self.0.store(next as u8, Ordering::SeqCst);
    }
}

impl Default for AtomicConnectionState {
    fn default() -> Self {
        Self::new(ConnectionState::Stopped)
    }
}
