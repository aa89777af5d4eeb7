//! Component A: a non-blocking, read-one-byte-at-a-time abstraction over a
//! transport, plus the concrete TCP implementation.

use std::io::{self, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::thread;
use std::time::Duration;

use crate::error::{Error, ErrorKind};

/// Pause between failed polls of a [`ByteSource`] so a caller looping on
/// [`ByteSource::try_read_byte`] doesn't spin the CPU.
pub const POLL_INTERVAL: Duration = Duration::from_micros(5);

/// A non-blocking byte source. Implementations MUST NOT block in
/// [`try_read_byte`](ByteSource::try_read_byte); it either returns the next
/// byte that is already available, or `None` immediately.
pub trait ByteSource {
    /// Return the next available byte, or `None` if none is available right
    /// now. Must return immediately either way.
    fn try_read_byte(&mut self) -> Result<Option<u8>, Error>;

    /// Write the given bytes to the underlying transport, blocking until all
    /// of them are written. A short write or I/O error is a fatal connection
    /// error.
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), Error>;

    /// Release the underlying transport. The default implementation is a
    /// no-op, which is correct for sources (like a scripted test source)
    /// with nothing to release.
    fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A [`ByteSource`] backed by a non-blocking [`TcpStream`].
#[derive(Debug)]
pub struct TcpByteSource {
    stream: TcpStream,
    // Single-byte read-ahead buffer: `std::net::TcpStream::read` doesn't
    // guarantee it will only ever return one byte at a time, so a larger
    // internal buffer absorbs whatever the OS hands back and we parcel it
    // out a byte at a time to preserve the try_read_byte contract.
    pending: Vec<u8>,
    cursor: usize,
}

impl TcpByteSource {
    pub fn connect<A: ToSocketAddrs>(addr: A, connect_timeout: Option<Duration>) -> io::Result<Self> {
        let stream = match (addr.to_socket_addrs()?.next(), connect_timeout) {
            (Some(sock_addr), Some(timeout)) => TcpStream::connect_timeout(&sock_addr, timeout)?,
            _ => TcpStream::connect(addr)?,
        };
        Self::from_stream(stream)
    }

    pub fn from_stream(stream: TcpStream) -> io::Result<Self> {
        stream.set_nonblocking(true)?;
        Ok(Self {
            stream,
            pending: Vec::with_capacity(4096),
            cursor: 0,
        })
    }

    pub fn shutdown(&mut self) -> io::Result<()> {
        self.stream.shutdown(std::net::Shutdown::Both)
    }
}

impl ByteSource for TcpByteSource {
    fn try_read_byte(&mut self) -> Result<Option<u8>, Error> {
        if self.cursor < self.pending.len() {
            let b = self.pending[self.cursor];
            self.cursor += 1;
            if self.cursor == self.pending.len() {
                self.pending.clear();
                self.cursor = 0;
            }
            return Ok(Some(b));
        }

        let mut buf = [0u8; 4096];
        match self.stream.read(&mut buf) {
            Ok(0) => Err(ErrorKind::Connection(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "connection closed by peer",
            ))
            .into()),
            Ok(n) => {
                self.pending.clear();
                self.pending.extend_from_slice(&buf[..n]);
                self.cursor = 1;
                Ok(Some(self.pending[0]))
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(None),
            Err(e) => Err(ErrorKind::Connection(e).into()),
        }
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<(), Error> {
        self.stream
            .write_all(bytes)
            .map_err(|e| Error::from(ErrorKind::Connection(e)))
    }

    fn close(&mut self) -> io::Result<()> {
        self.shutdown()
    }
}

/// Park the calling thread for [`POLL_INTERVAL`]. Extracted so the line
/// assembler and NVT filter share one definition of "briefly" per spec §5.
pub(crate) fn park_between_polls() {
    thread::sleep(POLL_INTERVAL);
}
