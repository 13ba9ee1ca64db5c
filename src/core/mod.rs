// src/core/mod.rs

//! The central module containing the protocol, state and event types of the comet client.

pub mod errors;
pub mod events;
pub mod protocol;
pub mod state;

pub use errors::CometError;
pub use events::{ClientEvent, ClientEventListener, ListenerSlot, LoggingListener};
pub use state::{AtomicConnectionState, ConnectionState};
