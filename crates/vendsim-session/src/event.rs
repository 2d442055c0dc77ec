/// An unsolicited device event to be pushed to the peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceEvent {
    pub code: u32,
    pub description: String,
}

impl DeviceEvent {
    pub fn new(code: u32, description: impl Into<String>) -> Self {
        Self {
            code,
            description: description.into(),
        }
    }
}

/// Produces unsolicited event payloads for one session.
///
/// The session's event loop calls [`next_event`](EventSource::next_event)
/// repeatedly and frames each event as a command-direction frame, which the
/// peer must acknowledge exactly like a command. Returning `None` ends the
/// loop. Sources are pluggable: the CLI wires up a stdin-driven source,
/// tests use synthetic ones.
pub trait EventSource: Send {
    fn next_event(&mut self) -> Option<DeviceEvent>;
}

/// A source that never produces events. For sessions that are
/// dispatcher-only.
pub struct NoEvents;

impl EventSource for NoEvents {
    fn next_event(&mut self) -> Option<DeviceEvent> {
        None
    }
}

impl EventSource for std::vec::IntoIter<DeviceEvent> {
    fn next_event(&mut self) -> Option<DeviceEvent> {
        self.next()
    }
}
