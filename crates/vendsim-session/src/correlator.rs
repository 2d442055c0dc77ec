use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Duration;

use vendsim_frame::{Frame, FrameKind, MessageId};

use crate::error::{Result, SessionError};

/// Correlates each outbound command-direction frame with its acknowledgment.
///
/// Owns the ack-in queue end and the awaited-id state; passed by ownership to
/// the writer pump. There is exactly one outstanding wait at a time — the
/// writer pump does not pull the next outbound frame until the current wait
/// resolves.
pub struct AckCorrelator {
    ack_rx: Receiver<Frame>,
    timeout: Duration,
}

/// Outcome of a successful (non-error) ack wait.
#[derive(Debug, PartialEq, Eq)]
pub enum AckOutcome {
    /// The matching acknowledgment arrived.
    Acknowledged,
    /// The ack queue disconnected: the reader pump is gone and the session
    /// is tearing down.
    Disconnected,
}

impl AckCorrelator {
    pub fn new(ack_rx: Receiver<Frame>, timeout: Duration) -> Self {
        Self { ack_rx, timeout }
    }

    /// Block until the acknowledgment for `sent` arrives.
    ///
    /// Anything other than an ack frame carrying exactly `sent` is a fatal
    /// protocol violation. A missing ack fails with
    /// [`SessionError::AckTimeout`] instead of hanging forever.
    pub fn wait_for(&self, sent: MessageId) -> Result<AckOutcome> {
        match self.ack_rx.recv_timeout(self.timeout) {
            Ok(frame) => {
                if frame.kind != FrameKind::Ack {
                    return Err(SessionError::UnexpectedKind {
                        kind: frame.kind,
                        id: frame.id,
                    });
                }
                if frame.id != sent {
                    return Err(SessionError::AckMismatch {
                        sent,
                        got: frame.id,
                    });
                }
                tracing::debug!(id = %sent, "acknowledgment matched");
                Ok(AckOutcome::Acknowledged)
            }
            Err(RecvTimeoutError::Timeout) => Err(SessionError::AckTimeout(self.timeout)),
            Err(RecvTimeoutError::Disconnected) => Ok(AckOutcome::Disconnected),
        }
    }
}
