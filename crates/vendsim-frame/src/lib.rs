//! Wire codec for the vendsim controller protocol.
//!
//! Every frame on the wire carries:
//! - A 2-byte synchronization marker (`0x16 0x16`)
//! - A 1-byte kind tag (command or acknowledgment)
//! - A 16-byte correlation id
//! - A 4-byte big-endian payload length
//! - The payload bytes (opaque to this layer; JSON by convention)
//!
//! No partial reads, no buffer management in user code.

pub mod codec;
pub mod error;
pub mod reader;
pub mod writer;

pub use codec::{
    decode_frame, encode_frame, Frame, FrameConfig, FrameKind, MessageId, DEFAULT_MAX_PAYLOAD,
    HEADER_SIZE, SYNC,
};
pub use error::{FrameError, Result};
pub use reader::FrameReader;
pub use writer::FrameWriter;
