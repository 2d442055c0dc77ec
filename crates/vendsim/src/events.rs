use vendsim_session::{DeviceEvent, EventSource};

/// Maps operator console input to unsolicited device events.
///
/// `do` opens the door (code 103), `dc` closes it (code 104). Other lines
/// are ignored. EOF ends the source.
pub struct StdinEvents;

impl EventSource for StdinEvents {
    fn next_event(&mut self) -> Option<DeviceEvent> {
        let mut line = String::new();
        loop {
            line.clear();
            match std::io::stdin().read_line(&mut line) {
                Ok(0) => return None,
                Ok(_) => {
                    if let Some(event) = parse_trigger(line.trim()) {
                        return Some(event);
                    }
                }
                Err(err) => {
                    tracing::warn!(error = %err, "stdin read failed");
                    return None;
                }
            }
        }
    }
}

fn parse_trigger(line: &str) -> Option<DeviceEvent> {
    match line {
        "do" => Some(DeviceEvent::new(103, "door open")),
        "dc" => Some(DeviceEvent::new(104, "door closed")),
        _ => {
            if !line.is_empty() {
                tracing::debug!(line, "unknown trigger ignored");
            }
            None
        }
    }
}
