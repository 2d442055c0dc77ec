use std::net::{Shutdown, SocketAddr, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use vendsim_frame::{Frame, FrameConfig, FrameError, FrameKind, FrameReader, FrameWriter};

use crate::correlator::{AckCorrelator, AckOutcome};
use crate::dispatch::{Dispatcher, OutboundSender};
use crate::error::{Result, SessionError};
use crate::event::EventSource;
use crate::message;

/// How often the writer pump re-checks the teardown flag while the
/// outbound queue is idle.
const OUTBOUND_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Per-session tuning.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Window for each outbound command-direction frame's acknowledgment.
    /// Elapsing fails the wait and tears down the session.
    pub ack_timeout: Duration,
    /// Frame codec configuration for both stream halves.
    pub frame: FrameConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ack_timeout: Duration::from_secs(5),
            frame: FrameConfig::default(),
        }
    }
}

/// One accepted connection: reader pump, writer pump, dispatch loop and
/// event loop, all scoped to the connection's lifetime.
///
/// The socket is exclusively read by the reader pump and exclusively
/// written by the writer pump. The three mpsc queues (command-in, ack-in,
/// outbound) are the only cross-thread shared state. Teardown is driven by
/// channel disconnection: whichever pump exits first drops its channel ends
/// and sets the shared flag, and the others unwind from there.
pub struct Session {
    peer: SocketAddr,
    outbound: OutboundSender,
    reader: JoinHandle<Result<()>>,
    writer: JoinHandle<Result<()>>,
    dispatch: JoinHandle<()>,
}

impl Session {
    /// Start all four workers for an accepted connection.
    ///
    /// The event loop thread is detached: it exits when the source runs dry
    /// or its first enqueue after teardown fails. A source blocked on
    /// external input (stdin) holds its thread until the next event, same
    /// as the hardware it stands in for.
    pub fn spawn(
        stream: TcpStream,
        dispatcher: Arc<dyn Dispatcher>,
        events: Box<dyn EventSource>,
        config: SessionConfig,
    ) -> Result<Session> {
        let peer = stream.peer_addr()?;
        let read_half = stream.try_clone()?;
        let reader = FrameReader::for_tcp(read_half, config.frame.clone())?;
        let writer = FrameWriter::for_tcp(stream, config.frame)?;

        let (command_tx, command_rx) = mpsc::channel();
        let (ack_tx, ack_rx) = mpsc::channel();
        let (outbound_tx, outbound_rx) = mpsc::channel();

        let closed = Arc::new(AtomicBool::new(false));
        let outbound = OutboundSender::new(outbound_tx);
        let correlator = AckCorrelator::new(ack_rx, config.ack_timeout);

        let reader_handle = {
            let closed = Arc::clone(&closed);
            thread::Builder::new()
                .name(format!("reader-{peer}"))
                .spawn(move || reader_pump(reader, command_tx, ack_tx, closed, peer))?
        };

        let writer_handle = {
            let closed = Arc::clone(&closed);
            thread::Builder::new()
                .name(format!("writer-{peer}"))
                .spawn(move || writer_pump(writer, outbound_rx, correlator, closed, peer))?
        };

        let dispatch_handle = {
            let outbound = outbound.clone();
            thread::Builder::new()
                .name(format!("dispatch-{peer}"))
                .spawn(move || dispatch_loop(command_rx, outbound, dispatcher, peer))?
        };

        {
            let outbound = outbound.clone();
            thread::Builder::new()
                .name(format!("events-{peer}"))
                .spawn(move || event_loop(events, outbound, peer))?;
        }

        tracing::info!(%peer, "session started");

        Ok(Session {
            peer,
            outbound,
            reader: reader_handle,
            writer: writer_handle,
            dispatch: dispatch_handle,
        })
    }

    /// Remote address of this session's connection.
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    /// Handle for enqueueing outbound frames onto this session.
    pub fn outbound(&self) -> OutboundSender {
        self.outbound.clone()
    }

    /// Wait for the session to end and report the first fatal error.
    ///
    /// A clean peer disconnect is `Ok(())`. Writer-side protocol violations
    /// (ack mismatch, ack timeout) take precedence over the reader-side
    /// error they cause while unwinding.
    pub fn join(self) -> Result<()> {
        drop(self.outbound);
        let writer = join_pump(self.writer, "writer");
        let reader = join_pump(self.reader, "reader");
        let _ = self.dispatch.join();
        tracing::info!(peer = %self.peer, "session ended");
        writer.and(reader)
    }
}

fn join_pump(handle: JoinHandle<Result<()>>, name: &str) -> Result<()> {
    match handle.join() {
        Ok(result) => result,
        Err(_) => Err(SessionError::Io(std::io::Error::other(format!(
            "{name} pump panicked"
        )))),
    }
}

/// Decode frames off the socket and route them by kind.
fn reader_pump(
    mut reader: FrameReader<TcpStream>,
    command_tx: Sender<Frame>,
    ack_tx: Sender<Frame>,
    closed: Arc<AtomicBool>,
    peer: SocketAddr,
) -> Result<()> {
    let result = loop {
        match reader.read_frame() {
            Ok(frame) => {
                let routed = match frame.kind {
                    FrameKind::Command => command_tx.send(frame),
                    FrameKind::Ack => ack_tx.send(frame),
                };
                if routed.is_err() {
                    break Ok(()); // session already tearing down
                }
            }
            Err(FrameError::Disconnected) => {
                tracing::info!(%peer, "peer disconnected");
                break Ok(());
            }
            Err(err) => {
                tracing::warn!(%peer, error = %err, "inbound stream failed");
                break Err(err.into());
            }
        }
    };
    // Dropping command_tx/ack_tx here ends the dispatch loop and unblocks
    // any correlator wait.
    closed.store(true, Ordering::SeqCst);
    result
}

/// Serialize all outbound frames onto the socket and correlate acks.
fn writer_pump(
    mut writer: FrameWriter<TcpStream>,
    outbound_rx: Receiver<Frame>,
    correlator: AckCorrelator,
    closed: Arc<AtomicBool>,
    peer: SocketAddr,
) -> Result<()> {
    let result = run_writer(&mut writer, &outbound_rx, &correlator, &closed, peer);
    if let Err(err) = &result {
        tracing::error!(%peer, error = %err, "writer pump failed");
    }
    closed.store(true, Ordering::SeqCst);
    // Unblock the reader pump if it is still parked on the socket.
    let _ = writer.get_ref().shutdown(Shutdown::Both);
    result
}

fn run_writer(
    writer: &mut FrameWriter<TcpStream>,
    outbound_rx: &Receiver<Frame>,
    correlator: &AckCorrelator,
    closed: &AtomicBool,
    peer: SocketAddr,
) -> Result<()> {
    loop {
        let frame = match outbound_rx.recv_timeout(OUTBOUND_POLL_INTERVAL) {
            Ok(frame) => frame,
            Err(RecvTimeoutError::Timeout) => {
                if closed.load(Ordering::SeqCst) {
                    return Ok(());
                }
                continue;
            }
            Err(RecvTimeoutError::Disconnected) => return Ok(()),
        };

        match writer.write_frame(&frame) {
            Ok(()) => {
                tracing::debug!(%peer, kind = %frame.kind, id = %frame.id, "frame written");
            }
            Err(FrameError::Disconnected) => return Ok(()),
            Err(err) => return Err(err.into()),
        }

        // Acks expect no reply. Everything else blocks the pump until the
        // matching ack arrives: one outstanding acknowledgment at a time.
        if frame.kind == FrameKind::Command {
            match correlator.wait_for(frame.id)? {
                AckOutcome::Acknowledged => {}
                AckOutcome::Disconnected => return Ok(()),
            }
        }
    }
}

/// Acknowledge every inbound command, then hand its payload to the
/// dispatcher.
fn dispatch_loop(
    command_rx: Receiver<Frame>,
    outbound: OutboundSender,
    dispatcher: Arc<dyn Dispatcher>,
    peer: SocketAddr,
) {
    for frame in command_rx.iter() {
        tracing::info!(%peer, id = %frame.id, len = frame.payload.len(), "command received");

        // Accepting a command is decoupled from completing it: the ack goes
        // out before any payload work starts.
        if outbound.send_frame(Frame::ack_of(&frame)).is_err() {
            break;
        }

        // Sub-2-byte payloads are keepalives: ack only.
        if frame.payload.len() < 2 {
            continue;
        }

        match message::parse_command(&frame.payload) {
            Ok(command) => dispatcher.dispatch(command, &outbound),
            Err(err) => {
                // Dispatcher-level failure: local to this command, the
                // session keeps running.
                tracing::warn!(%peer, id = %frame.id, error = %err, "undecodable command payload, dropped");
            }
        }
    }
}

/// Frame unsolicited events as command-direction frames.
fn event_loop(mut source: Box<dyn EventSource>, outbound: OutboundSender, peer: SocketAddr) {
    while let Some(event) = source.next_event() {
        tracing::info!(%peer, code = event.code, description = %event.description, "pushing event");
        if outbound
            .send_command(message::event_payload(&event))
            .is_err()
        {
            break;
        }
    }
    tracing::debug!(%peer, "event source drained");
}
