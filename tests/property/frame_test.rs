// tests/property/frame_test.rs

//! Property-based tests for the frame header layout and codec.

use bytes::BytesMut;
use comet_client::core::protocol::{
    CometFrameCodec, Operation, RAW_HEADER_LEN, body, build_frame, decode_header, encode_header,
    message_text,
};
use proptest::prelude::*;
use tokio_util::codec::Decoder;

fn operation() -> impl Strategy<Value = Operation> {
    prop_oneof![
        Just(Operation::Heartbeat),
        Just(Operation::HeartbeatReply),
        Just(Operation::Message),
        Just(Operation::Auth),
        Just(Operation::AuthReply),
        any::<u32>().prop_map(Operation::from),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 200,
        max_shrink_iters: 1000,
        ..ProptestConfig::default()
    })]

    #[test]
    fn test_header_fields_survive_encoding(
        package_length in any::<u32>(),
        header_length in any::<u16>(),
        version in any::<u16>(),
        op in any::<u32>(),
        sequence in any::<u32>(),
    ) {
        let header = decode_header(&encode_header(package_length, header_length, version, op, sequence)).unwrap();
        prop_assert_eq!(header.package_length, package_length);
        prop_assert_eq!(header.header_length, header_length);
        prop_assert_eq!(header.version, version);
        prop_assert_eq!(header.operation, op);
        prop_assert_eq!(header.sequence, sequence);
    }

    #[test]
    fn test_built_frame_declares_its_own_length(
        op in operation(),
        payload in prop::collection::vec(any::<u8>(), 0..2048),
    ) {
        let frame = build_frame(op, &payload).unwrap();
        prop_assert_eq!(frame.len(), RAW_HEADER_LEN + payload.len());

        let header = decode_header(&frame).unwrap();
        prop_assert_eq!(header.package_length as usize, frame.len());
        prop_assert_eq!(header.header_length as usize, RAW_HEADER_LEN);
        prop_assert_eq!(header.version, 1);
        prop_assert_eq!(header.sequence, 1);
        prop_assert_eq!(header.operation(), op);
        prop_assert_eq!(body(&frame).unwrap(), &payload[..]);
    }

    #[test]
    fn test_body_ignores_receive_buffer_slack(
        payload in prop::collection::vec(any::<u8>(), 0..256),
        slack in prop::collection::vec(any::<u8>(), 0..256),
    ) {
        let mut buf = build_frame(Operation::Message, &payload).unwrap().to_vec();
        buf.extend_from_slice(&slack);
        prop_assert_eq!(body(&buf).unwrap(), &payload[..]);
    }

    #[test]
    fn test_decoder_reassembles_any_chunking(
        payloads in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..64), 1..8),
        chunk in 1usize..40,
    ) {
        let mut wire = Vec::new();
        for payload in &payloads {
            wire.extend_from_slice(&build_frame(Operation::Message, payload).unwrap());
        }

        let mut codec = CometFrameCodec::default();
        let mut buf = BytesMut::new();
        let mut decoded = Vec::new();
        for piece in wire.chunks(chunk) {
            buf.extend_from_slice(piece);
            while let Some(frame) = codec.decode(&mut buf).unwrap() {
                decoded.push(frame.body.to_vec());
            }
        }

        prop_assert!(buf.is_empty());
        prop_assert_eq!(decoded, payloads);
    }

    #[test]
    fn test_message_text_strips_padding(
        text in "[a-zA-Z0-9][a-zA-Z0-9 ,.!?]{0,60}[a-zA-Z0-9]",
        pad in 0usize..32,
    ) {
        let mut raw = format!("  {text}").into_bytes();
        raw.extend(std::iter::repeat_n(0u8, pad));
        prop_assert_eq!(message_text(&raw), text);
    }
}
