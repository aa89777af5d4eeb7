//! Component H: a deterministic, in-memory [`ByteSource`] for tests.
//!
//! Exposed behind the `test-util` feature (and always available to this
//! crate's own `#[cfg(test)]` modules) so both unit tests and an external
//! integration test can drive the client without a real socket.

use std::time::{Duration, Instant};

use crate::error::Error;
use crate::net::byte_source::ByteSource;

/// A [`ByteSource`] that serves bytes from a pre-loaded script and records
/// every write it's asked to perform, for assertions.
///
/// Optionally simulates a per-byte delay (see [`ScriptedByteSource::with_byte_delay`])
/// so tests can drive the socket timeout's reset-on-every-byte behaviour
/// (spec.md §8 invariant 7) without a real, slow transport.
#[derive(Debug, Default)]
pub struct ScriptedByteSource {
    script: Vec<u8>,
    cursor: usize,
    writes: Vec<Vec<u8>>,
    byte_delay: Option<Duration>,
    last_served_at: Option<Instant>,
}

impl ScriptedByteSource {
    #[must_use]
    pub fn new(script: Vec<u8>) -> Self {
        Self {
            script,
            cursor: 0,
            writes: Vec::new(),
            byte_delay: None,
            last_served_at: None,
        }
    }

    /// Like [`ScriptedByteSource::new`], but [`ByteSource::try_read_byte`]
    /// withholds each byte (returning `None`, exactly as a real non-blocking
    /// socket with nothing to read yet would) until at least `delay` has
    /// elapsed since the previous byte was served.
    #[must_use]
    pub fn with_byte_delay(script: Vec<u8>, delay: Duration) -> Self {
        Self {
            script,
            cursor: 0,
            writes: Vec::new(),
            byte_delay: Some(delay),
            last_served_at: Some(Instant::now()),
        }
    }

    /// Append more bytes to the script, as if the remote end sent more data.
    pub fn push_bytes(&mut self, bytes: &[u8]) {
        self.script.extend_from_slice(bytes);
    }

    /// Every call to [`ByteSource::write_all`] so far, in order.
    #[must_use]
    pub fn writes(&self) -> &[Vec<u8>] {
        &self.writes
    }

    /// Whether every scripted byte has been consumed.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.script.len()
    }
}

impl ByteSource for ScriptedByteSource {
    fn try_read_byte(&mut self) -> Result<Option<u8>, Error> {
        if self.cursor >= self.script.len() {
            return Ok(None);
        }

        if let Some(delay) = self.byte_delay {
            if let Some(last) = self.last_served_at {
                if last.elapsed() < delay {
                    return Ok(None);
                }
            }
        }

        let b = self.script[self.cursor];
        self.cursor += 1;
        if self.byte_delay.is_some() {
            self.last_served_at = Some(Instant::now());
        }
        Ok(Some(b))
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<(), Error> {
        self.writes.push(bytes.to_vec());
        Ok(())
    }
}
