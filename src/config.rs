// src/config.rs

//! Manages client configuration: defaults, loading from TOML, and validation.

use crate::core::CometError;
use crate::core::protocol::RAW_HEADER_LEN;
use crate::core::protocol::frame::DEFAULT_MAX_FRAME_LENGTH;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::time::Duration;

/// A `host:port` pair naming the comet endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CometAddress {
    pub host: String,
    pub port: u16,
}

impl CometAddress {
    /// Parses `host:port`. The string must contain exactly one colon, a
    /// non-empty host, and a valid port number.
    pub fn parse(address: &str) -> Result<Self, CometError> {
        let invalid = || CometError::InvalidAddress(address.to_string());

        let mut parts = address.split(':');
        let (Some(host), Some(port), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(invalid());
        };
        let host = host.trim();
        if host.is_empty() {
            return Err(invalid());
        }
        let port = port.trim().parse::<u16>().map_err(|_| invalid())?;

        Ok(Self {
            host: host.to_string(),
            port,
        })
    }
}

impl fmt::Display for CometAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Everything needed to build a `PushClient`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// The comet endpoint as `host:port`.
    pub server_address: String,
    pub user_id: i64,
    /// Sent verbatim as the payload of the auth frame.
    pub token: String,
    /// Initial capacity of the receive buffer, in bytes.
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,
    /// Inbound frames announcing more than this many bytes are rejected.
    #[serde(default = "default_max_frame_length")]
    pub max_frame_length: usize,
    #[serde(with = "humantime_serde", default = "default_heartbeat_interval")]
    pub heartbeat_interval: Duration,
    /// How long a read may wait for data before the connection is considered dead.
    #[serde(with = "humantime_serde", default = "default_socket_timeout")]
    pub socket_timeout: Duration,
    #[serde(with = "humantime_serde", default = "default_connect_timeout")]
    pub connect_timeout: Duration,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_buffer_size() -> usize {
    1024
}
fn default_max_frame_length() -> usize {
    DEFAULT_MAX_FRAME_LENGTH
}
fn default_heartbeat_interval() -> Duration {
    Duration::from_secs(20)
}
fn default_socket_timeout() -> Duration {
    Duration::from_secs(3 * 60)
}
fn default_connect_timeout() -> Duration {
    Duration::from_secs(10)
}
fn default_log_level() -> String {
    "info".to_string()
}

impl ClientConfig {
    /// Creates a configuration with every tunable at its default.
    pub fn new(server_address: impl Into<String>, user_id: i64, token: impl Into<String>) -> Self {
        Self {
            server_address: server_address.into(),
            user_id,
            token: token.into(),
            buffer_size: default_buffer_size(),
            max_frame_length: default_max_frame_length(),
            heartbeat_interval: default_heartbeat_interval(),
            socket_timeout: default_socket_timeout(),
            connect_timeout: default_connect_timeout(),
            log_level: default_log_level(),
        }
    }

    /// Reads and validates a configuration from a TOML file.
    pub fn from_file(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file at '{path}'"))?;
        let config: ClientConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse TOML from '{path}'"))?;
        config
            .validate()
            .with_context(|| format!("Invalid configuration in '{path}'"))?;
        Ok(config)
    }

    /// The parsed form of `server_address`.
    pub fn address(&self) -> Result<CometAddress, CometError> {
        CometAddress::parse(&self.server_address)
    }

    /// Checks the configuration for values the client cannot run with.
    pub fn validate(&self) -> Result<(), CometError> {
        self.address()?;
        if self.buffer_size == 0 {
            return Err(CometError::InvalidConfig("buffer_size cannot be 0".into()));
        }
        if self.max_frame_length < RAW_HEADER_LEN {
            return Err(CometError::InvalidConfig(format!(
                "max_frame_length must be at least {RAW_HEADER_LEN}"
            )));
        }
        if self.heartbeat_interval.is_zero() {
            return Err(CometError::InvalidConfig(
                "heartbeat_interval cannot be 0".into(),
            ));
        }
        if self.socket_timeout.is_zero() {
            return Err(CometError::InvalidConfig("socket_timeout cannot be 0".into()));
        }
        if self.connect_timeout.is_zero() {
            return Err(CometError::InvalidConfig(
                "connect_timeout cannot be 0".into(),
            ));
        }
        Ok(())
    }
}
