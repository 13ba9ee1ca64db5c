// src/connection/mod.rs

//! Manages the lifecycle of a comet connection: the shared session, the read
//! loop that owns the socket, and the heartbeat loop that keeps it alive.

mod heartbeat;
mod session;
mod worker;

pub(crate) use session::ClientSession;
pub(crate) use worker::ConnectionWorker;
