use std::fmt;

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};

/// Frame header: sync (2) + kind (1) + id (16) + length (4) = 23 bytes.
pub const HEADER_SIZE: usize = 23;

/// Synchronization marker: SYN repeated twice.
pub const SYNC: [u8; 2] = [0x16, 0x16];

/// Default maximum payload size: 16 MiB.
pub const DEFAULT_MAX_PAYLOAD: usize = 16 * 1024 * 1024;

const KIND_COMMAND: u8 = 0x00;
const KIND_ACK: u8 = 0x01;

/// The two logical message classes of the protocol.
///
/// Both true commands and unsolicited events travel as [`FrameKind::Command`];
/// anything of that kind demands an acknowledgment from the peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    Command,
    Ack,
}

impl FrameKind {
    /// Parse the wire tag. Any value other than 0x00/0x01 is invalid.
    pub fn from_wire(byte: u8) -> Result<Self> {
        match byte {
            KIND_COMMAND => Ok(FrameKind::Command),
            KIND_ACK => Ok(FrameKind::Ack),
            _ => Err(FrameError::InvalidKind { byte }),
        }
    }

    /// The wire tag for this kind.
    pub fn to_wire(self) -> u8 {
        match self {
            FrameKind::Command => KIND_COMMAND,
            FrameKind::Ack => KIND_ACK,
        }
    }
}

impl fmt::Display for FrameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameKind::Command => write!(f, "command"),
            FrameKind::Ack => write!(f, "ack"),
        }
    }
}

/// 16-byte correlation identifier, unique per outstanding command-direction
/// frame. Acknowledgments copy the id of the frame they acknowledge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageId([u8; 16]);

impl MessageId {
    /// Generate a fresh random id (UUID v4 bytes).
    pub fn fresh() -> Self {
        Self(uuid::Uuid::new_v4().into_bytes())
    }

    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        uuid::Uuid::from_bytes(self.0).fmt(f)
    }
}

/// A single wire frame. Transient: built immediately before writing, or
/// decoded off the wire and consumed by routing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub kind: FrameKind,
    pub id: MessageId,
    pub payload: Bytes,
}

impl Frame {
    /// Create a command-direction frame with a fresh id.
    pub fn command(payload: impl Into<Bytes>) -> Self {
        Self {
            kind: FrameKind::Command,
            id: MessageId::fresh(),
            payload: payload.into(),
        }
    }

    /// Build the acknowledgment for a received frame.
    ///
    /// The id is copied verbatim; the payload is always empty.
    pub fn ack_of(frame: &Frame) -> Self {
        Self {
            kind: FrameKind::Ack,
            id: frame.id,
            payload: Bytes::new(),
        }
    }

    /// The total wire size of this frame (header + payload).
    pub fn wire_size(&self) -> usize {
        HEADER_SIZE + self.payload.len()
    }
}

/// Encode a frame into the wire format.
///
/// Wire format (big-endian):
/// ```text
/// ┌────────────┬──────────┬──────────┬───────────┬──────────────────┐
/// │ Sync (2B)  │ Kind (1B)│ Id (16B) │ Length    │ Payload          │
/// │ 0x16 0x16  │ 0x00/01  │          │ (4B BE)   │ (Length bytes)   │
/// └────────────┴──────────┴──────────┴───────────┴──────────────────┘
/// ```
pub fn encode_frame(frame: &Frame, dst: &mut BytesMut) -> Result<()> {
    if frame.payload.len() > u32::MAX as usize {
        return Err(FrameError::PayloadTooLarge {
            size: frame.payload.len(),
            max: u32::MAX as usize,
        });
    }
    dst.reserve(HEADER_SIZE + frame.payload.len());
    dst.put_slice(&SYNC);
    dst.put_u8(frame.kind.to_wire());
    dst.put_slice(frame.id.as_bytes());
    dst.put_u32(frame.payload.len() as u32);
    dst.put_slice(&frame.payload);
    Ok(())
}

/// Decode a frame from a buffer.
///
/// Returns `Ok(None)` if the buffer doesn't contain a complete frame yet.
/// On success, consumes the frame bytes from the buffer.
pub fn decode_frame(src: &mut BytesMut, max_payload: usize) -> Result<Option<Frame>> {
    if src.len() < HEADER_SIZE {
        // Bad sync is detectable before the full header arrives; fail as
        // early as possible so a desynchronized stream is abandoned fast.
        for (i, &expected) in SYNC.iter().enumerate() {
            if src.len() > i && src[i] != expected {
                return Err(FrameError::BadSync { byte: src[i] });
            }
        }
        return Ok(None); // Need more data
    }

    if src[0] != SYNC[0] {
        return Err(FrameError::BadSync { byte: src[0] });
    }
    if src[1] != SYNC[1] {
        return Err(FrameError::BadSync { byte: src[1] });
    }

    let kind = FrameKind::from_wire(src[2])?;

    let mut id = [0u8; 16];
    id.copy_from_slice(&src[3..19]);

    let mut len_bytes = [0u8; 4];
    len_bytes.copy_from_slice(&src[19..23]);
    let payload_len = u32::from_be_bytes(len_bytes) as usize;

    if payload_len > max_payload {
        return Err(FrameError::PayloadTooLarge {
            size: payload_len,
            max: max_payload,
        });
    }

    let total = HEADER_SIZE + payload_len;
    if src.len() < total {
        return Ok(None); // Need more data
    }

    src.advance(HEADER_SIZE);
    let payload = src.split_to(payload_len).freeze();

    Ok(Some(Frame {
        kind,
        id: MessageId::from_bytes(id),
        payload,
    }))
}

/// Configuration for the frame codec.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Maximum payload size in bytes. Default: 16 MiB.
    pub max_payload_size: usize,
    /// Read timeout for blocking operations.
    pub read_timeout: Option<std::time::Duration>,
    /// Write timeout for blocking operations.
    pub write_timeout: Option<std::time::Duration>,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_payload_size: DEFAULT_MAX_PAYLOAD,
            read_timeout: None,
            write_timeout: None,
        }
    }
}
