// src/lib.rs

pub mod client;
pub mod config;
mod connection;
pub mod core;

// Re-export
pub use crate::client::PushClient;
pub use crate::config::ClientConfig;
pub use crate::core::{ClientEvent, ClientEventListener, CometError, ConnectionState};
