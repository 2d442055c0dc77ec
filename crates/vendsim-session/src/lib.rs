//! Per-connection framing/acknowledgment engine.
//!
//! Each accepted connection gets one [`Session`]: a reader pump routing
//! inbound frames by kind, a writer pump that serializes all outbound frames
//! and correlates acknowledgments, a dispatch loop feeding the
//! [`Dispatcher`], and an event loop draining the [`EventSource`].
//! Sessions are independent; a fatal protocol error tears down one
//! connection and nothing else.

pub mod correlator;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod listener;
pub mod message;
pub mod session;

pub use correlator::{AckCorrelator, AckOutcome};
pub use dispatch::{Command, Dispatcher, OutboundSender, SessionClosed};
pub use error::{Result, SessionError};
pub use event::{DeviceEvent, EventSource, NoEvents};
pub use listener::Listener;
pub use session::{Session, SessionConfig};
