use std::time::Duration;

use vendsim_frame::{FrameError, FrameKind, MessageId};

/// Errors that tear down a session.
///
/// Everything here is fatal to the connection it occurred on; none of it is
/// fatal to the process or to other connections.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Codec or stream error from the frame layer.
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),

    /// A frame of the wrong kind arrived in the acknowledgment slot.
    #[error("expected acknowledgment, got {kind} frame {id}")]
    UnexpectedKind { kind: FrameKind, id: MessageId },

    /// The peer acknowledged a different frame than the one just sent.
    /// With a single outstanding ack slot this can never be recovered.
    #[error("acknowledgment id mismatch (sent {sent}, got {got})")]
    AckMismatch { sent: MessageId, got: MessageId },

    /// No acknowledgment arrived within the configured window.
    #[error("no acknowledgment within {0:?}")]
    AckTimeout(Duration),

    /// Socket-level error outside the frame layer.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SessionError>;
