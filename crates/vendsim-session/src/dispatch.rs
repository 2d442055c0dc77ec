use std::sync::mpsc::Sender;

use bytes::Bytes;
use serde_json::{Map, Value};
use vendsim_frame::{Frame, MessageId};

/// A decoded inbound command: the single top-level key of the payload
/// object and its field sub-object.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub name: String,
    pub fields: Map<String, Value>,
}

/// Consumes decoded command payloads and decides replies.
///
/// The only component allowed to interpret payload contents. Implementations
/// must not block the dispatch loop: long-running work (simulated device
/// latency) runs on a thread the dispatcher spawns itself and completes by
/// enqueueing its reply later through the [`OutboundSender`].
pub trait Dispatcher: Send + Sync {
    fn dispatch(&self, command: Command, outbound: &OutboundSender);
}

/// The session is tearing down and no longer accepts outbound sends.
#[derive(Debug, thiserror::Error)]
#[error("session closed")]
pub struct SessionClosed;

/// Cheap handle onto a session's outbound queue.
///
/// All outbound frames (replies, acks, unsolicited events) funnel through
/// the single writer pump; this handle is how producers enqueue them.
#[derive(Clone)]
pub struct OutboundSender {
    tx: Sender<Frame>,
}

impl OutboundSender {
    /// Wrap a raw outbound queue sender.
    ///
    /// Sessions build their own; this is for tests and custom wiring.
    pub fn new(tx: Sender<Frame>) -> Self {
        Self { tx }
    }

    /// Enqueue a pre-built frame.
    pub fn send_frame(&self, frame: Frame) -> Result<(), SessionClosed> {
        self.tx.send(frame).map_err(|_| SessionClosed)
    }

    /// Enqueue a command-direction frame carrying `payload` under a fresh
    /// id, to be separately acknowledged by the peer. Returns the id.
    pub fn send_command(&self, payload: impl Into<Bytes>) -> Result<MessageId, SessionClosed> {
        let frame = Frame::command(payload);
        let id = frame.id;
        self.send_frame(frame)?;
        Ok(id)
    }
}
