//! JSON payload envelopes.
//!
//! Payloads are opaque to the codec; by convention they are single-key JSON
//! objects `{ "<command name>": { <fields> } }`. Unsolicited events travel
//! under the `asyncEvent` key.

use bytes::Bytes;
use serde::de::Error as _;
use serde_json::{json, Map, Value};

use crate::dispatch::Command;
use crate::event::DeviceEvent;

/// Build a `{ name: fields }` payload.
pub fn envelope(name: &str, fields: Value) -> Bytes {
    serde_json::to_vec(&json!({ name: fields }))
        .map(Bytes::from)
        .unwrap_or_else(|_| Bytes::from_static(b"{}"))
}

/// Parse an inbound command payload.
///
/// The first top-level key names the command; its sub-object carries the
/// fields. A top-level value that is not an object yields empty fields.
pub fn parse_command(payload: &[u8]) -> serde_json::Result<Command> {
    let object: Map<String, Value> = serde_json::from_slice(payload)?;

    match object.into_iter().next() {
        Some((name, value)) => {
            let fields = match value {
                Value::Object(fields) => fields,
                _ => Map::new(),
            };
            Ok(Command { name, fields })
        }
        None => Err(serde_json::Error::custom("empty command object")),
    }
}

/// Build the `asyncEvent` payload for an unsolicited event.
pub fn event_payload(event: &DeviceEvent) -> Bytes {
    let timestamp = chrono::Utc::now()
        .format("%Y-%m-%d %H:%M:%S%.3f")
        .to_string();
    envelope(
        "asyncEvent",
        json!({
            "code": event.code,
            "description": event.description,
            "level": "INFO",
            "timestamp": timestamp,
        }),
    )
}
