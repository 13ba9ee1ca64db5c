// src/core/state/mod.rs

//! Defines the state shared between the client façade and its background tasks.

mod connection;

pub use connection::{AtomicConnectionState, ConnectionState};
