/// Errors that can occur during frame encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// A synchronization marker byte had the wrong value. The stream is
    /// desynchronized and the connection must be abandoned.
    #[error("bad sync byte 0x{byte:02x} (expected 0x16)")]
    BadSync { byte: u8 },

    /// The kind tag is neither command (0x00) nor acknowledgment (0x01).
    #[error("invalid frame kind 0x{byte:02x}")]
    InvalidKind { byte: u8 },

    /// The payload exceeds the configured maximum size.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// The stream ended mid-frame.
    #[error("stream truncated mid-frame")]
    Truncated,

    /// The peer closed the connection at a frame boundary.
    #[error("peer disconnected")]
    Disconnected,

    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FrameError>;
