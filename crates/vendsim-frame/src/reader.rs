use std::io::{ErrorKind, Read};
use std::net::TcpStream;

use bytes::BytesMut;

use crate::codec::{decode_frame, Frame, FrameConfig};
use crate::error::{FrameError, Result};

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;
const READ_CHUNK_SIZE: usize = 8 * 1024;

/// Reads complete frames from any `Read` stream.
///
/// Handles partial reads internally — callers always get complete frames.
pub struct FrameReader<T> {
    inner: T,
    buf: BytesMut,
    config: FrameConfig,
}

impl<T: Read> FrameReader<T> {
    /// Create a new frame reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame reader with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
        }
    }

    /// Read the next complete frame (blocking).
    ///
    /// Returns `Err(FrameError::Disconnected)` on EOF at a frame boundary
    /// and `Err(FrameError::Truncated)` on EOF mid-frame.
    pub fn read_frame(&mut self) -> Result<Frame> {
        loop {
            if let Some(frame) = decode_frame(&mut self.buf, self.config.max_payload_size)? {
                tracing::trace!(
                    kind = %frame.kind,
                    id = %frame.id,
                    len = frame.payload.len(),
                    "frame decoded"
                );
                return Ok(frame);
            }

            let mut chunk = [0u8; READ_CHUNK_SIZE];
            let read = match self.inner.read(&mut chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            };

            if read == 0 {
                if self.buf.is_empty() {
                    return Err(FrameError::Disconnected);
                }
                return Err(FrameError::Truncated);
            }

            self.buf.extend_from_slice(&chunk[..read]);
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current frame reader configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

impl FrameReader<TcpStream> {
    /// Create a frame reader for a TCP stream and apply the read timeout
    /// from config.
    pub fn for_tcp(inner: TcpStream, config: FrameConfig) -> Result<Self> {
        inner.set_read_timeout(config.read_timeout)?;
        Ok(Self::with_config(inner, config))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use bytes::{BufMut, BytesMut};

    use super::*;
    use crate::codec::{encode_frame, FrameKind, MessageId, SYNC};

    fn wire_for(frame: &Frame) -> Vec<u8> {
        let mut buf = BytesMut::new();
        encode_frame(frame, &mut buf).unwrap();
        buf.to_vec()
    }

    #[test]
    fn read_single_frame() {
        let frame = Frame::command(&b"hello"[..]);
        let mut reader = FrameReader::new(Cursor::new(wire_for(&frame)));

        let decoded = reader.read_frame().unwrap();
        assert_eq!(decoded, frame);
    }

    #[test]
    fn read_multiple_frames() {
        let command = Frame::command(&b"one"[..]);
        let ack = Frame::ack_of(&command);
        let event = Frame::command(&b"three"[..]);

        let mut wire = Vec::new();
        wire.extend_from_slice(&wire_for(&command));
        wire.extend_from_slice(&wire_for(&ack));
        wire.extend_from_slice(&wire_for(&event));

        let mut reader = FrameReader::new(Cursor::new(wire));

        assert_eq!(reader.read_frame().unwrap(), command);
        assert_eq!(reader.read_frame().unwrap(), ack);
        assert_eq!(reader.read_frame().unwrap(), event);
    }

    #[test]
    fn read_frame_with_large_payload() {
        let frame = Frame::command(vec![0xAB; 64 * 1024]);
        let mut reader = FrameReader::new(Cursor::new(wire_for(&frame)));

        let decoded = reader.read_frame().unwrap();
        assert_eq!(decoded, frame);
    }

    #[test]
    fn partial_read_handling() {
        let frame = Frame::command(&b"slow"[..]);
        let byte_reader = ByteByByteReader {
            bytes: wire_for(&frame),
            pos: 0,
        };
        let mut reader = FrameReader::new(byte_reader);

        let decoded = reader.read_frame().unwrap();
        assert_eq!(decoded, frame);
    }

    #[test]
    fn clean_close_at_frame_boundary() {
        let mut reader = FrameReader::new(Cursor::new(Vec::<u8>::new()));
        let err = reader.read_frame().unwrap_err();
        assert!(matches!(err, FrameError::Disconnected));
    }

    #[test]
    fn close_mid_frame_is_truncated() {
        let mut partial = BytesMut::new();
        partial.put_slice(&SYNC);
        partial.put_u8(FrameKind::Command.to_wire());
        partial.put_slice(MessageId::fresh().as_bytes());
        partial.put_u32(16);
        partial.put_slice(b"only-part");

        let mut reader = FrameReader::new(Cursor::new(partial.to_vec()));
        let err = reader.read_frame().unwrap_err();
        assert!(matches!(err, FrameError::Truncated));
    }

    #[test]
    fn bad_sync_in_stream() {
        let bytes = vec![0x00, 0x16];
        let mut reader = FrameReader::new(Cursor::new(bytes));
        let err = reader.read_frame().unwrap_err();
        assert!(matches!(err, FrameError::BadSync { byte: 0x00 }));
    }

    #[test]
    fn invalid_kind_in_stream() {
        let mut wire = BytesMut::new();
        wire.put_slice(&SYNC);
        wire.put_u8(0x42);
        wire.put_slice(&[0u8; 16]);
        wire.put_u32(0);

        let mut reader = FrameReader::new(Cursor::new(wire.to_vec()));
        let err = reader.read_frame().unwrap_err();
        assert!(matches!(err, FrameError::InvalidKind { byte: 0x42 }));
    }

    #[test]
    fn oversized_frame_in_stream() {
        let mut wire = BytesMut::new();
        wire.put_slice(&SYNC);
        wire.put_u8(FrameKind::Command.to_wire());
        wire.put_slice(&[0u8; 16]);
        wire.put_u32(1024);

        let cfg = FrameConfig {
            max_payload_size: 16,
            ..FrameConfig::default()
        };
        let mut reader = FrameReader::with_config(Cursor::new(wire.to_vec()), cfg);
        let err = reader.read_frame().unwrap_err();
        assert!(matches!(err, FrameError::PayloadTooLarge { .. }));
    }

    #[derive(Debug)]
    struct ByteByByteReader {
        bytes: Vec<u8>,
        pos: usize,
    }

    impl Read for ByteByByteReader {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.pos >= self.bytes.len() {
                return Ok(0);
            }
            if buf.is_empty() {
                return Ok(0);
            }

            buf[0] = self.bytes[self.pos];
            self.pos += 1;
            Ok(1)
        }
    }

    #[test]
    fn interrupted_read_retries() {
        let frame = Frame::command(&b"ok"[..]);
        let reader = InterruptedThenData {
            interrupted: false,
            bytes: wire_for(&frame),
            pos: 0,
        };
        let mut framed = FrameReader::new(reader);

        let decoded = framed.read_frame().unwrap();
        assert_eq!(decoded, frame);
    }

    struct InterruptedThenData {
        interrupted: bool,
        bytes: Vec<u8>,
        pos: usize,
    }

    impl Read for InterruptedThenData {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if !self.interrupted {
                self.interrupted = true;
                return Err(std::io::Error::from(ErrorKind::Interrupted));
            }
            if self.pos >= self.bytes.len() {
                return Ok(0);
            }
            let remaining = self.bytes.len() - self.pos;
            let n = remaining.min(buf.len());
            buf[..n].copy_from_slice(&self.bytes[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }
    }

    #[test]
    fn roundtrip_over_pipe() {
        let (left, right) = std::os::unix::net::UnixStream::pair().unwrap();
        let mut writer = crate::writer::FrameWriter::new(left);
        let mut reader = FrameReader::new(right);

        let frame = Frame::command(&b"ping"[..]);
        writer.write_frame(&frame).unwrap();

        let decoded = reader.read_frame().unwrap();
        assert_eq!(decoded, frame);
    }

    #[test]
    fn accessors_and_into_inner() {
        let cursor = Cursor::new(Vec::<u8>::new());
        let mut reader = FrameReader::new(cursor);

        let _ = reader.get_ref();
        let _ = reader.get_mut();
        assert!(reader.config().read_timeout.is_none());
        let _inner = reader.into_inner();
    }
}
