// src/core/protocol/frame.rs

//! Implements the comet frame layout and the corresponding `Encoder` and
//! `Decoder` for network communication.
//!
//! Every frame starts with the same header, all fields big-endian:
//!
//! | Offset | Size | Field          |
//! |--------|------|----------------|
//! | 0      | 4    | package length |
//! | 4      | 2    | header length  |
//! | 6      | 2    | version        |
//! | 8      | 4    | operation      |
//! | 12     | 4    | sequence id    |
//!
//! The package length counts the header itself, so the body is
//! `package_length - 16` bytes long.

use crate::core::CometError;
use bytes::{Buf, BufMut, Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

/// Size of the fixed header, and the value written into its header-length field.
pub const RAW_HEADER_LEN: usize = 16;
/// Protocol version stamped on every outgoing frame.
pub const PROTOCOL_VERSION: u16 = 1;
/// The sequence slot is a fixed jsonp callback id on outgoing frames.
const OUTGOING_SEQUENCE: u32 = 1;

const PACKAGE_LEN_OFFSET: usize = 0;
const HEADER_LEN_OFFSET: usize = 4;
const VERSION_OFFSET: usize = 6;
const OPERATION_OFFSET: usize = 8;
const SEQUENCE_OFFSET: usize = 12;

/// Upper bound for a single inbound frame unless configured otherwise.
pub const DEFAULT_MAX_FRAME_LENGTH: usize = 1024 * 1024;

/// The operation code carried at offset 8 of every frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Client heartbeat request.
    Heartbeat,
    /// Server acknowledgment of a heartbeat.
    HeartbeatReply,
    /// A message pushed by the server.
    Message,
    /// Client authentication request carrying the token.
    Auth,
    /// Server acknowledgment of the authentication request.
    AuthReply,
    /// Any code this client does not understand. Such frames are ignored.
    Unknown(u32),
}

impl From<u32> for Operation {
    fn from(code: u32) -> Self {
        match code {
            2 => Operation::Heartbeat,
            3 => Operation::HeartbeatReply,
            5 => Operation::Message,
            7 => Operation::Auth,
            8 => Operation::AuthReply,
            other => Operation::Unknown(other),
        }
    }
}

impl From<Operation> for u32 {
    fn from(op: Operation) -> Self {
        match op {
            Operation::Heartbeat => 2,
            Operation::HeartbeatReply => 3,
            Operation::Message => 5,
            Operation::Auth => 7,
            Operation::AuthReply => 8,
            Operation::Unknown(code) => code,
        }
    }
}

/// The decoded form of the 16-byte frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub package_length: u32,
    pub header_length: u16,
    pub version: u16,
    pub operation: u32,
    pub sequence: u32,
}

impl FrameHeader {
    /// The operation code interpreted as an `Operation`.
    pub fn operation(&self) -> Operation {
        Operation::from(self.operation)
    }

    /// The number of payload bytes the header announces.
    pub fn body_len(&self) -> usize {
        (self.package_length as usize).saturating_sub(RAW_HEADER_LEN)
    }

    /// Serializes the header into its fixed wire layout.
    pub fn encode(&self) -> [u8; RAW_HEADER_LEN] {
        encode_header(
            self.package_length,
            self.header_length,
            self.version,
            self.operation,
            self.sequence,
        )
    }
}

/// Writes the five header fields at their fixed offsets.
///
/// Field widths are carried by the integer types, so a value can never spill
/// into its neighbour.
pub fn encode_header(
    package_length: u32,
    header_length: u16,
    version: u16,
    operation: u32,
    sequence: u32,
) -> [u8; RAW_HEADER_LEN] {
    let mut header = [0u8; RAW_HEADER_LEN];
    let mut cursor = &mut header[..];
    cursor.put_u32(package_length);
    cursor.put_u16(header_length);
    cursor.put_u16(version);
    cursor.put_u32(operation);
    cursor.put_u32(sequence);
    header
}

/// Reads the header fields from the start of `buf`.
///
/// The package length is not checked against `buf.len()`; callers that slice
/// the body are responsible for staying inside the buffer.
pub fn decode_header(buf: &[u8]) -> Result<FrameHeader, CometError> {
    if buf.len() < RAW_HEADER_LEN {
        return Err(CometError::IncompleteData);
    }
    Ok(FrameHeader {
        package_length: (&buf[PACKAGE_LEN_OFFSET..]).get_u32(),
        header_length: (&buf[HEADER_LEN_OFFSET..]).get_u16(),
        version: (&buf[VERSION_OFFSET..]).get_u16(),
        operation: (&buf[OPERATION_OFFSET..]).get_u32(),
        sequence: (&buf[SEQUENCE_OFFSET..]).get_u32(),
    })
}

/// Builds a complete outgoing frame: version 1, sequence 1, and a package
/// length covering the header plus `payload`.
pub fn build_frame(operation: Operation, payload: &[u8]) -> Result<Bytes, CometError> {
    let total = RAW_HEADER_LEN + payload.len();
    let package_length = u32::try_from(total).map_err(|_| CometError::FrameTooLarge(total))?;

    let mut buf = BytesMut::with_capacity(total);
    buf.extend_from_slice(&encode_header(
        package_length,
        RAW_HEADER_LEN as u16,
        PROTOCOL_VERSION,
        operation.into(),
        OUTGOING_SEQUENCE,
    ));
    buf.extend_from_slice(payload);
    Ok(buf.freeze())
}

/// Returns the payload of the frame at the start of `buf`.
///
/// The slice ends at the declared package length, or at the end of `buf` if the
/// buffer is shorter. Bytes past the declared length are never returned.
pub fn body(buf: &[u8]) -> Result<&[u8], CometError> {
    let header = decode_header(buf)?;
    let end = (header.package_length as usize)
        .min(buf.len())
        .max(RAW_HEADER_LEN);
    Ok(&buf[RAW_HEADER_LEN..end])
}

/// Decodes a message payload as text, dropping leading and trailing spaces,
/// control characters and NUL padding.
pub fn message_text(body: &[u8]) -> String {
    String::from_utf8_lossy(body)
        .trim_matches(|c: char| c <= ' ')
        .to_string()
}

/// A single decoded frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub header: FrameHeader,
    pub body: Bytes,
}

impl Frame {
    /// Creates an outgoing-style frame (version 1, sequence 1) around `body`.
    pub fn new(operation: Operation, body: impl Into<Bytes>) -> Result<Self, CometError> {
        Self::with_version(operation, PROTOCOL_VERSION, body)
    }

    /// Creates a frame with an explicit version, as the server does for pushes.
    pub fn with_version(
        operation: Operation,
        version: u16,
        body: impl Into<Bytes>,
    ) -> Result<Self, CometError> {
        let body = body.into();
        let total = RAW_HEADER_LEN + body.len();
        let package_length = u32::try_from(total).map_err(|_| CometError::FrameTooLarge(total))?;
        Ok(Self {
            header: FrameHeader {
                package_length,
                header_length: RAW_HEADER_LEN as u16,
                version,
                operation: operation.into(),
                sequence: OUTGOING_SEQUENCE,
            },
            body,
        })
    }

    pub fn operation(&self) -> Operation {
        self.header.operation()
    }

    pub fn version(&self) -> u16 {
        self.header.version
    }

    /// The body as trimmed text.
    pub fn text(&self) -> String {
        message_text(&self.body)
    }
}

/// A `tokio_util::codec` implementation for encoding and decoding comet `Frame`s.
#[derive(Debug, Clone)]
pub struct CometFrameCodec {
    max_frame_length: usize,
}

impl CometFrameCodec {
    pub fn new(max_frame_length: usize) -> Self {
        Self { max_frame_length }
    }

    pub fn max_frame_length(&self) -> usize {
        self.max_frame_length
    }
}

impl Default for CometFrameCodec {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FRAME_LENGTH)
    }
}

impl Encoder<Frame> for CometFrameCodec {
    type Error = CometError;

    /// Writes the header exactly as carried by the frame, followed by the body.
    fn encode(&mut self, item: Frame, dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.reserve(RAW_HEADER_LEN + item.body.len());
        dst.extend_from_slice(&item.header.encode());
        dst.extend_from_slice(&item.body);
        Ok(())
    }
}

impl Decoder for CometFrameCodec {
    type Item = Frame;
    type Error = CometError;

    /// Yields one frame once its full package length has been buffered.
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.len() < RAW_HEADER_LEN {
            return Ok(None);
        }

        let header = decode_header(&src[..RAW_HEADER_LEN])?;
        let package_length = header.package_length as usize;
        if package_length < RAW_HEADER_LEN {
            return Err(CometError::Protocol(format!(
                "package length {package_length} is shorter than the {RAW_HEADER_LEN}-byte header"
            )));
        }
        if package_length > self.max_frame_length {
            return Err(CometError::FrameTooLarge(package_length));
        }

        if src.len() < package_length {
            // Reserve the remainder up front so the next reads fill it in one go.
            src.reserve(package_length - src.len());
            return Ok(None);
        }

        let mut raw = src.split_to(package_length);
        raw.advance(RAW_HEADER_LEN);
        Ok(Some(Frame {
            header,
            body: raw.freeze(),
        }))
    }
}
