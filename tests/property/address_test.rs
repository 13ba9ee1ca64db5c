// tests/property/address_test.rs

//! Property-based tests for address parsing and client construction.

use comet_client::config::CometAddress;
use comet_client::core::protocol::RAW_HEADER_LEN;
use comet_client::{CometError, PushClient};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 100,
        max_shrink_iters: 1000,
        ..ProptestConfig::default()
    })]

    #[test]
    fn test_well_formed_address_parses(
        host in "[a-z][a-z0-9.-]{0,30}",
        port in any::<u16>(),
    ) {
        let parsed = CometAddress::parse(&format!("{host}:{port}")).unwrap();
        prop_assert_eq!(parsed.host, host);
        prop_assert_eq!(parsed.port, port);
    }

    #[test]
    fn test_address_without_exactly_one_colon_is_rejected(
        parts in prop::collection::vec("[a-z0-9]{1,8}", 1..6)
            .prop_filter("exactly one colon is well formed", |p| p.len() != 2),
    ) {
        let address = parts.join(":");
        prop_assert_eq!(
            CometAddress::parse(&address),
            Err(CometError::InvalidAddress(address.clone()))
        );
        let err = PushClient::with_defaults(&address, 1, "token").unwrap_err();
        prop_assert!(err.is_configuration_error());
    }

    #[test]
    fn test_client_frames_carry_token(
        a in any::<u8>(),
        b in any::<u8>(),
        port in any::<u16>(),
        token in ".{0,200}",
    ) {
        let client = PushClient::with_defaults(&format!("127.0.{a}.{b}:{port}"), 7, &token).unwrap();
        prop_assert_eq!(client.auth_message().len(), RAW_HEADER_LEN + token.len());
        prop_assert_eq!(client.heartbeat_message().len(), RAW_HEADER_LEN + token.len());
        prop_assert_eq!(&client.auth_message()[RAW_HEADER_LEN..], token.as_bytes());
    }
}
