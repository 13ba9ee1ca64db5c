// src/core/errors.rs

//! Defines the primary error type for the comet client.

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// The main error enum, representing every failure the client can report.
/// Connection failures reach the listener by reference; configuration failures
/// are returned from `PushClient::new`.
#[derive(Error, Debug)]
pub enum CometError {
    #[error("IO Error: {0}")]
    Io(Arc<std::io::Error>),

    #[error("Incomplete data in stream")]
    IncompleteData,

    #[error("Illegal comet address '{0}', expected 'host:port'")]
    InvalidAddress(String),

    #[error("Could not resolve comet host: {0}")]
    HostResolution(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Frame of {0} bytes exceeds the allowed frame size")]
    FrameTooLarge(usize),

    #[error("No data received from comet within {0:?}")]
    ReadTimeout(Duration),

    #[error("Connecting to comet timed out after {0:?}")]
    ConnectTimeout(Duration),

    #[error("Connection closed by comet")]
    ConnectionClosed,
}

impl CometError {
    /// Returns true for failures detected while building the client, before any
    /// connection was attempted.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            CometError::InvalidAddress(_)
                | CometError::HostResolution(_)
                | CometError::InvalidConfig(_)
        )
    }
}

// Manual implementation of Clone because `std::io::Error` is not cloneable.
// We wrap it in an Arc to allow for cheap, shared cloning.
impl Clone for CometError {
    fn clone(&self) -> Self {
        match self {
            CometError::Io(e) => CometError::Io(Arc::clone(e)),
            CometError::IncompleteData => CometError::IncompleteData,
            CometError::InvalidAddress(s) => CometError::InvalidAddress(s.clone()),
            CometError::HostResolution(s) => CometError::HostResolution(s.clone()),
            CometError::InvalidConfig(s) => CometError::InvalidConfig(s.clone()),
            CometError::Protocol(s) => CometError::Protocol(s.clone()),
            CometError::FrameTooLarge(n) => CometError::FrameTooLarge(*n),
            CometError::ReadTimeout(d) => CometError::ReadTimeout(*d),
            CometError::ConnectTimeout(d) => CometError::ConnectTimeout(*d),
            CometError::ConnectionClosed => CometError::ConnectionClosed,
        }
    }
}

impl PartialEq for CometError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (CometError::Io(e1), CometError::Io(e2)) => e1.kind() == e2.kind(),
            (CometError::InvalidAddress(s1), CometError::InvalidAddress(s2)) => s1 == s2,
            (CometError::HostResolution(s1), CometError::HostResolution(s2)) => s1 == s2,
            (CometError::InvalidConfig(s1), CometError::InvalidConfig(s2)) => s1 == s2,
            (CometError::Protocol(s1), CometError::Protocol(s2)) => s1 == s2,
            (CometError::FrameTooLarge(n1), CometError::FrameTooLarge(n2)) => n1 == n2,
            (CometError::ReadTimeout(d1), CometError::ReadTimeout(d2)) => d1 == d2,
            (CometError::ConnectTimeout(d1), CometError::ConnectTimeout(d2)) => d1 == d2,
            _ => core::mem::discriminant(self) == core::mem::discriminant(other),
        }
    }
}

// --- From trait implementations for easy error conversion ---

impl From<std::io::Error> for CometError {
    fn from(e: std::io::Error) -> Self {
        CometError::Io(Arc::new(e))
    }
}
