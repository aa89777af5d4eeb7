//! Component D: the line assembler.
//!
//! Pulls NVT-filtered application bytes (component B) and delivers
//! `\n`-terminated lines, honouring a per-byte socket timeout and a
//! per-line full-line timeout. See `spec.md` §4.D.

use std::time::{Duration, Instant};

use bytes::Bytes;

use crate::error::{Error, ErrorKind};
use crate::net::ansi;
use crate::net::byte_source::{self, ByteSource};
use crate::net::telnet::nvt;

/// The line assembler (component D).
#[derive(Debug)]
pub struct LineAssembler {
    filter: nvt::Filter,
    buffer: Vec<u8>,
    /// Timestamp of the first byte of the line currently being assembled.
    line_start: Option<Instant>,
    socket_timeout: Option<Duration>,
    full_line_timeout: Option<Duration>,
    prune_control_sequences: bool,
}

impl Default for LineAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl LineAssembler {
    #[must_use]
    pub fn new() -> Self {
        Self {
            filter: nvt::Filter::new(),
            buffer: Vec::new(),
            line_start: None,
            socket_timeout: None,
            full_line_timeout: None,
            prune_control_sequences: false,
        }
    }

    /// Reset the NVT filter and any in-progress line. Called on connect.
    pub fn reset(&mut self) {
        self.filter.reset();
        self.buffer.clear();
        self.line_start = None;
    }

    pub fn set_debug(&mut self, debug: bool) {
        self.filter.set_debug(debug);
    }

    pub fn set_socket_timeout(&mut self, timeout: Option<Duration>) {
        self.socket_timeout = timeout;
    }

    #[must_use]
    pub fn socket_timeout(&self) -> Option<Duration> {
        self.socket_timeout
    }

    pub fn set_full_line_timeout(&mut self, timeout: Option<Duration>) {
        self.full_line_timeout = timeout;
    }

    #[must_use]
    pub fn full_line_timeout(&self) -> Option<Duration> {
        self.full_line_timeout
    }

    pub fn set_prune_control_sequences(&mut self, prune: bool) {
        self.prune_control_sequences = prune;
    }

    #[must_use]
    pub fn prune_control_sequences(&self) -> bool {
        self.prune_control_sequences
    }

    /// Whether any bytes of the next line are presently buffered (used by
    /// the prompt waiter to decide whether a "drain remaining" pass has
    /// anything left to flush).
    #[must_use]
    pub fn has_partial_line(&self) -> bool {
        !self.buffer.is_empty()
    }

    /// Pull bytes from `source` through the NVT filter until a `\n`
    /// terminated line is assembled, the full-line timeout elapses (in
    /// which case the partial line is returned without a trailing `\n`), or
    /// the socket timeout fires.
    ///
    /// A `full_line_timeout` of `Some(Duration::ZERO)` returns immediately
    /// after the first byte of the line arrives, without waiting for `\n`
    /// (spec.md §9).
    pub fn get_next_line(&mut self, source: &mut dyn ByteSource) -> Result<Bytes, Error> {
        let mut byte_deadline_start = Instant::now();

        loop {
            if let Some(start) = self.line_start {
                if let Some(full_line_timeout) = self.full_line_timeout {
                    if start.elapsed() >= full_line_timeout {
                        return Ok(self.take_line());
                    }
                }
            }

            match source.try_read_byte()? {
                Some(byte) => {
                    byte_deadline_start = Instant::now();
                    let emitted = self.filter.feed(byte, source)?;
                    for b in emitted {
                        if self.buffer.is_empty() && self.line_start.is_none() {
                            self.line_start = Some(Instant::now());
                        }
                        self.buffer.push(b);
                        if b == b'\n' {
                            return Ok(self.take_line());
                        }
                    }
                }
                None => {
                    if let Some(timeout) = self.socket_timeout {
                        if byte_deadline_start.elapsed() >= timeout {
                            return Err(ErrorKind::ConnectionTimeout(timeout).into());
                        }
                    }
                    byte_source::park_between_polls();
                }
            }
        }
    }

    fn take_line(&mut self) -> Bytes {
        let mut line = std::mem::take(&mut self.buffer);
        self.line_start = None;
        if self.prune_control_sequences {
            let segments = ansi::parse(&line);
            line = ansi::text_only(&segments);
        }
        Bytes::from(line)
    }
}
