//! Component B: the NVT (Network Virtual Terminal) demultiplexer.
//!
//! Consumes bytes one at a time, emits application data bytes, and answers
//! Telnet option negotiation synchronously on the same transport. See
//! `spec.md` §4.B for the state machine this implements.

use tracing::{debug, trace};

use crate::error::{Error, ErrorKind};
use crate::net::byte_source::ByteSource;
use crate::net::telnet::command::{DO, DONT, IAC, SB, SE, WILL, WONT};
use crate::net::telnet::{CR, LF};

/// NVT filter state. See `spec.md` §3 "NVT machine state".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Default,
    Command,
}

/// The Telnet NVT demultiplexer (component B).
///
/// Feed it bytes one at a time with [`Filter::feed`]; it returns the
/// (possibly empty) run of application data bytes that byte produced, after
/// consuming and replying to any in-band Telnet protocol sequence.
#[derive(Debug)]
pub struct Filter {
    state: State,
    /// Bytes accumulated toward a pending IAC sequence. Holds at most one
    /// pending byte (`IAC` or `CR`) in `Default`, or `IAC cmd [opt]` /
    /// `IAC SB ... ` in `Command`.
    buffer: Vec<u8>,
    debug: bool,
}

impl Default for Filter {
    fn default() -> Self {
        Self::new()
    }
}

impl Filter {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: State::Default,
            buffer: Vec::new(),
            debug: false,
        }
    }

    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }

    /// Reset to the initial state. Called on (re)connect.
    pub fn reset(&mut self) {
        self.state = State::Default;
        self.buffer.clear();
    }

    /// Feed one byte from the wire through the filter, writing any
    /// negotiation reply synchronously to `sink`. Returns the application
    /// data bytes (zero, one, or occasionally more, e.g. `CR` followed by a
    /// reprocessed data byte) this byte produced.
    pub fn feed(&mut self, byte: u8, sink: &mut dyn ByteSource) -> Result<Vec<u8>, Error> {
        let mut out = Vec::new();
        let mut current = Some(byte);
        while let Some(b) = current.take() {
            current = self.step(b, sink, &mut out)?;
        }
        Ok(out)
    }

    /// Process a single byte. Returns `Some(byte)` if `byte` must be
    /// reprocessed as a fresh event in `Default` (the bare-CR case).
    fn step(
        &mut self,
        byte: u8,
        sink: &mut dyn ByteSource,
        out: &mut Vec<u8>,
    ) -> Result<Option<u8>, Error> {
        match self.state {
            State::Default => self.step_default(byte, out),
            State::Command => {
                self.buffer.push(byte);
                let _ = out;
                self.advance_command(sink)?;
                Ok(None)
            }
        }
    }

    fn step_default(&mut self, byte: u8, out: &mut Vec<u8>) -> Result<Option<u8>, Error> {
        if self.buffer.is_empty() {
            match byte {
                IAC => self.buffer.push(byte),
                CR => self.buffer.push(byte),
                b => out.push(b),
            }
            return Ok(None);
        }

        // Exactly one byte pending: either IAC or CR.
        let pending = self.buffer[0];
        self.buffer.clear();
        match pending {
            IAC => {
                if byte == IAC {
                    // Double IAC in data: a single literal 0xFF data byte.
                    out.push(0xFF);
                } else {
                    self.buffer = vec![IAC, byte];
                    self.state = State::Command;
                }
                Ok(None)
            }
            CR => {
                if byte == LF {
                    out.push(b'\n');
                    Ok(None)
                } else {
                    out.push(CR);
                    // Reprocess `byte` as a brand new event in Default.
                    Ok(Some(byte))
                }
            }
            _ => Err(ErrorKind::Unimplemented("Default buffer only ever holds IAC or CR").into()),
        }
    }

    /// Advance the `Command` state machine now that `byte` has been pushed
    /// onto `self.buffer`. `self.buffer[0]` is always `IAC`.
    fn advance_command(&mut self, sink: &mut dyn ByteSource) -> Result<(), Error> {
        debug_assert_eq!(self.buffer.first(), Some(&IAC));

        if self.buffer.len() == 2 {
            let cmd = self.buffer[1];
            match cmd {
                WILL | WONT | DO | DONT | SB => {
                    // Need more bytes before we can act.
                    return Ok(());
                }
                other => {
                    if self.debug {
                        debug!(command = other, "ignoring unrecognized telnet command");
                    } else {
                        trace!(command = other, "ignoring unrecognized telnet command");
                    }
                    self.buffer.clear();
                    self.state = State::Default;
                    return Ok(());
                }
            }
        }

        let cmd = self.buffer[1];
        if cmd == SB {
            let n = self.buffer.len();
            if n >= 4 && self.buffer[n - 2] == IAC && self.buffer[n - 1] == SE {
                let body = &self.buffer[2..n - 2];
                if self.debug {
                    debug!(?body, "subnegotiation received");
                } else {
                    trace!(len = body.len(), "subnegotiation received and dropped");
                }
                self.buffer.clear();
                self.state = State::Default;
            }
            return Ok(());
        }

        // WILL/WONT/DO/DONT: buffer is now [IAC, cmd, opt].
        let opt = self.buffer[2];
        match cmd {
            DO | DONT => sink.write_all(&[IAC, WONT, opt])?,
            WILL => sink.write_all(&[IAC, DONT, opt])?,
            WONT => {}
            _ => {
                return Err(ErrorKind::Unimplemented(
                    "only WILL/WONT/DO/DONT reach the 3-byte branch",
                )
                .into())
            }
        }
        self.buffer.clear();
        self.state = State::Default;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedByteSource;

    fn feed_all(filter: &mut Filter, sink: &mut ScriptedByteSource, bytes: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        for &b in bytes {
            out.extend(filter.feed(b, sink).unwrap());
        }
        out
    }

    #[test]
    fn option_rejection_writes_wont_and_dont() {
        let mut filter = Filter::new();
        let mut sink = ScriptedByteSource::new(b"".to_vec());
        let input = [IAC, WILL, 0x01, IAC, DO, 0x03];
        let out = feed_all(&mut filter, &mut sink, &input);
        assert!(out.is_empty());
        assert_eq!(
            sink.writes(),
            &[vec![IAC, DONT, 0x01], vec![IAC, WONT, 0x03]]
        );
    }

    #[test]
    fn wont_is_not_replied_to() {
        let mut filter = Filter::new();
        let mut sink = ScriptedByteSource::new(b"".to_vec());
        let out = feed_all(&mut filter, &mut sink, &[IAC, WONT, 0x01]);
        assert!(out.is_empty());
        assert!(sink.writes().is_empty());
    }

    #[test]
    fn double_iac_is_one_data_byte() {
        let mut filter = Filter::new();
        let mut sink = ScriptedByteSource::new(b"".to_vec());
        let out = feed_all(&mut filter, &mut sink, &[b'A', IAC, IAC, b'B']);
        assert_eq!(out, vec![b'A', 0xFF, b'B']);
    }

    #[test]
    fn cr_lf_becomes_newline() {
        let mut filter = Filter::new();
        let mut sink = ScriptedByteSource::new(b"".to_vec());
        let out = feed_all(&mut filter, &mut sink, &[b'X', CR, LF, b'Y']);
        assert_eq!(out, vec![b'X', b'\n', b'Y']);
    }

    #[test]
    fn bare_cr_is_kept_and_next_byte_reprocessed() {
        let mut filter = Filter::new();
        let mut sink = ScriptedByteSource::new(b"".to_vec());
        let out = feed_all(&mut filter, &mut sink, &[b'X', CR, b'Y', LF]);
        assert_eq!(out, vec![b'X', CR, b'Y', b'\n']);
    }

    #[test]
    fn subnegotiation_is_dropped() {
        let mut filter = Filter::new();
        let mut sink = ScriptedByteSource::new(b"".to_vec());
        let mut input = vec![IAC, SB, 0x18, 0x00];
        input.extend_from_slice(b"xterm");
        input.extend_from_slice(&[IAC, SE]);
        input.extend_from_slice(b"ok\n");
        let out = feed_all(&mut filter, &mut sink, &input);
        assert_eq!(out, b"ok\n".to_vec());
        assert!(sink.writes().is_empty());
    }

    #[test]
    fn streaming_identity_across_chunk_boundaries() {
        let input: Vec<u8> = {
            let mut v = vec![b'a', IAC, IAC, b'b', CR, LF, IAC, WILL, 0x01, b'c'];
            v.extend_from_slice(b"\r\n");
            v
        };

        let mut whole_filter = Filter::new();
        let mut whole_sink = ScriptedByteSource::new(b"".to_vec());
        let whole = feed_all(&mut whole_filter, &mut whole_sink, &input);

        // Split into single-byte chunks - the extreme case of fragmentation.
        let mut chunked_filter = Filter::new();
        let mut chunked_sink = ScriptedByteSource::new(b"".to_vec());
        let mut chunked = Vec::new();
        for &b in &input {
            chunked.extend(chunked_filter.feed(b, &mut chunked_sink).unwrap());
        }

        assert_eq!(whole, chunked);
        assert_eq!(whole_sink.writes(), chunked_sink.writes());
    }
}
