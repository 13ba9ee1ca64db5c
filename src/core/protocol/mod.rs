// src/core/protocol/mod.rs

//! The comet wire protocol: a fixed 16-byte big-endian header followed by a payload.

pub mod frame;
pub use frame::{
    CometFrameCodec, Frame, FrameHeader, Operation, PROTOCOL_VERSION, RAW_HEADER_LEN, body,
    build_frame, decode_header, encode_header, message_text,
};
