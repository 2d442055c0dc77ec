use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use vendsim_session::{Dispatcher, EventSource, Listener, NoEvents, SessionConfig};

use crate::cmd::ServeArgs;
use crate::device::SimulatedDevice;
use crate::events::StdinEvents;
use crate::exit::{session_error, CliError, CliResult, SUCCESS, USAGE};
use crate::settings::Settings;

pub fn run(args: ServeArgs) -> CliResult<i32> {
    let ack_timeout = parse_duration(&args.ack_timeout)?;
    let settings = Settings::load(&args.settings);
    let device: Arc<dyn Dispatcher> =
        Arc::new(SimulatedDevice::new(settings, args.responses.clone()));

    let listener = Listener::bind((args.bind.as_str(), args.port))
        .map_err(|err| session_error("bind failed", err))?;
    let addr = listener
        .local_addr()
        .map_err(|err| session_error("bind failed", err))?;
    tracing::info!(%addr, "waiting for connections");

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    while running.load(Ordering::SeqCst) {
        let config = SessionConfig {
            ack_timeout,
            ..SessionConfig::default()
        };
        let session = match listener.accept_session(
            Arc::clone(&device),
            event_source(args.no_stdin_events),
            config,
        ) {
            Ok(session) => session,
            Err(err) => return Err(session_error("accept failed", err)),
        };

        // Each session runs to completion on its own; a protocol failure
        // closes that connection and nothing else.
        thread::spawn(move || {
            let peer = session.peer_addr();
            match session.join() {
                Ok(()) => tracing::info!(%peer, "session closed"),
                Err(err) => tracing::warn!(%peer, error = %err, "session failed"),
            }
        });
    }

    Ok(SUCCESS)
}

fn event_source(no_stdin_events: bool) -> Box<dyn EventSource> {
    if no_stdin_events {
        Box::new(NoEvents)
    } else {
        Box::new(StdinEvents)
    }
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| {
        CliError::new(
            crate::exit::INTERNAL,
            format!("signal handler setup failed: {err}"),
        )
    })
}

fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        _ => Ok(Duration::from_secs(value)),
    }
}
