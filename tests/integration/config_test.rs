// tests/integration/config_test.rs

//! Tests for configuration loading, address parsing and client construction.

use super::test_helpers::{TEST_TOKEN, TEST_USER_ID};
use comet_client::config::{ClientConfig, CometAddress};
use comet_client::core::protocol::{Operation, RAW_HEADER_LEN, decode_header};
use comet_client::{CometError, ConnectionState, PushClient};
use std::io::Write;
use std::time::Duration;

// ===== Address parsing =====

#[test]
fn test_parse_address() {
    let addr = CometAddress::parse("push.example.com:8080").unwrap();
    assert_eq!(addr.host, "push.example.com");
    assert_eq!(addr.port, 8080);
    assert_eq!(addr.to_string(), "push.example.com:8080");
}

#[test]
fn test_parse_address_rejects_malformed_input() {
    for bad in [
        "localhost",
        "a:b:c",
        "host:",
        ":8080",
        "host:port",
        "host:70000",
        "",
        "::1:8080",
    ] {
        assert_eq!(
            CometAddress::parse(bad),
            Err(CometError::InvalidAddress(bad.to_string())),
            "accepted {bad:?}"
        );
    }
}

// ===== Defaults and validation =====

#[test]
fn test_defaults() {
    let config = ClientConfig::new("127.0.0.1:8080", 7, "t");
    assert_eq!(config.buffer_size, 1024);
    assert_eq!(config.heartbeat_interval, Duration::from_secs(20));
    assert_eq!(config.socket_timeout, Duration::from_secs(180));
    assert_eq!(config.connect_timeout, Duration::from_secs(10));
    assert_eq!(config.log_level, "info");
    assert!(config.validate().is_ok());
}

#[test]
fn test_validate_rejects_zero_values() {
    let mut config = ClientConfig::new("127.0.0.1:8080", 7, "t");
    config.buffer_size = 0;
    assert!(matches!(
        config.validate(),
        Err(CometError::InvalidConfig(_))
    ));

    let mut config = ClientConfig::new("127.0.0.1:8080", 7, "t");
    config.heartbeat_interval = Duration::ZERO;
    assert!(matches!(
        config.validate(),
        Err(CometError::InvalidConfig(_))
    ));

    let mut config = ClientConfig::new("127.0.0.1:8080", 7, "t");
    config.max_frame_length = 8;
    assert!(matches!(
        config.validate(),
        Err(CometError::InvalidConfig(_))
    ));
}

#[test]
fn test_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
server_address = "127.0.0.1:3101"
user_id = 42
token = "abc"
buffer_size = 4096
heartbeat_interval = "5s"
socket_timeout = "1m"
log_level = "debug"
"#
    )
    .unwrap();

    let config = ClientConfig::from_file(file.path().to_str().unwrap()).unwrap();
    assert_eq!(config.server_address, "127.0.0.1:3101");
    assert_eq!(config.user_id, 42);
    assert_eq!(config.token, "abc");
    assert_eq!(config.buffer_size, 4096);
    assert_eq!(config.heartbeat_interval, Duration::from_secs(5));
    assert_eq!(config.socket_timeout, Duration::from_secs(60));
    // Not present in the file.
    assert_eq!(config.connect_timeout, Duration::from_secs(10));
    assert_eq!(config.log_level, "debug");
}

#[test]
fn test_from_file_rejects_bad_address() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
server_address = "127.0.0.1"
user_id = 1
token = "abc"
"#
    )
    .unwrap();

    let err = ClientConfig::from_file(file.path().to_str().unwrap()).unwrap_err();
    assert!(format!("{err:#}").contains("Illegal comet address"));
}

#[test]
fn test_from_missing_file() {
    let err = ClientConfig::from_file("/nonexistent/client.toml").unwrap_err();
    assert!(err.to_string().contains("Failed to read config file"));
}

// ===== Client construction =====

#[test]
fn test_client_precomputes_frames() {
    let client = PushClient::with_defaults("127.0.0.1:3101", TEST_USER_ID, TEST_TOKEN).unwrap();
    assert_eq!(client.state(), ConnectionState::Stopped);
    assert_eq!(client.server_addr().port(), 3101);
    assert_eq!(client.user_id(), TEST_USER_ID);

    let auth = client.auth_message();
    assert_eq!(auth.len(), RAW_HEADER_LEN + TEST_TOKEN.len());
    let header = decode_header(auth).unwrap();
    assert_eq!(header.operation(), Operation::Auth);
    assert_eq!(&auth[RAW_HEADER_LEN..], TEST_TOKEN.as_bytes());

    let heartbeat = client.heartbeat_message();
    assert_eq!(heartbeat.len(), RAW_HEADER_LEN + TEST_TOKEN.len());
    let header = decode_header(heartbeat).unwrap();
    assert_eq!(header.operation(), Operation::Heartbeat);
    assert_eq!(header.package_length as usize, heartbeat.len());
}

#[test]
fn test_client_rejects_malformed_address() {
    let err = PushClient::with_defaults("127.0.0.1", 1, "t").unwrap_err();
    assert_eq!(err, CometError::InvalidAddress("127.0.0.1".to_string()));
    assert!(err.is_configuration_error());
}

#[test]
fn test_client_rejects_unresolvable_host() {
    let err = PushClient::with_defaults("comet.invalid:3101", 1, "t").unwrap_err();
    assert!(matches!(err, CometError::HostResolution(_)));
    assert!(err.is_configuration_error());
}

#[test]
fn test_stop_on_unstarted_client_outside_runtime() {
    let client = PushClient::with_defaults("127.0.0.1:3101", 1, "t").unwrap();
    assert!(!client.stop());
}
