use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use serde_json::json;
use vendsim_session::{message, Command, Dispatcher, OutboundSender};

use crate::settings::Settings;

const DEFAULT_DISPENSE_LATENCY: Duration = Duration::from_secs(2);

/// Simulated dispenser hardware behind the protocol engine.
///
/// Two behaviors, matching the device being emulated:
/// - `dispenseRequest` runs on a worker thread for the configured latency,
///   then reports `dispenseComplete` echoing the request's `id` field.
/// - any other command is answered from a canned `<name>.json` payload in
///   the responses directory; a missing file drops the reply (the command
///   was already acked by the session).
pub struct SimulatedDevice {
    settings: Settings,
    responses: PathBuf,
    dispense_latency: Duration,
}

impl SimulatedDevice {
    pub fn new(settings: Settings, responses: PathBuf) -> Self {
        Self {
            settings,
            responses,
            dispense_latency: DEFAULT_DISPENSE_LATENCY,
        }
    }

    /// Override the simulated dispense latency.
    pub fn with_dispense_latency(mut self, latency: Duration) -> Self {
        self.dispense_latency = latency;
        self
    }

    fn complete_dispense(&self, command: Command, outbound: OutboundSender) {
        let request_id = command.fields.get("id").cloned().unwrap_or(json!(null));
        let code = self.settings.dispense_code();
        let description = if code == 0 { "Success" } else { "Failed" };
        let latency = self.dispense_latency;

        tracing::info!(id = %request_id, "dispense requested");

        thread::spawn(move || {
            thread::sleep(latency);
            tracing::info!(id = %request_id, code, "dispense finished");
            let _ = outbound.send_command(message::envelope(
                "dispenseComplete",
                json!({
                    "code": code,
                    "description": description,
                    "id": request_id,
                }),
            ));
        });
    }

    fn canned_reply(&self, name: &str, outbound: &OutboundSender) {
        let path = self.responses.join(format!("{name}.json"));
        match std::fs::read(&path) {
            Ok(payload) => {
                tracing::info!(command = name, path = %path.display(), "sending canned reply");
                let _ = outbound.send_command(payload);
            }
            Err(err) => {
                tracing::warn!(command = name, path = %path.display(), error = %err, "no canned reply");
            }
        }
    }
}

impl Dispatcher for SimulatedDevice {
    fn dispatch(&self, command: Command, outbound: &OutboundSender) {
        if command.name == "dispenseRequest" {
            self.complete_dispense(command, outbound.clone());
            return;
        }
        self.canned_reply(&command.name, outbound);
    }
}
