//! Component F: the client facade.
//!
//! Owns the connection, configuration, and the state machines (line
//! assembler, which in turn owns the NVT filter). Public operations mirror
//! `spec.md` §4.F.

use std::io;
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use bytes::Bytes;
use regex::Regex;
use tracing::{debug, instrument};

use crate::config::ClientConfig;
use crate::error::{Error, ErrorKind};
use crate::net::byte_source::{ByteSource, TcpByteSource};
use crate::net::line::LineAssembler;
use crate::net::prompt;

/// A Telnet client connection (component F, the client facade).
///
/// Not safe for concurrent use by multiple callers; distinct instances are
/// independent (spec.md §5).
pub struct TelnetClient {
    config: ClientConfig,
    assembler: LineAssembler,
    source: Option<Box<dyn ByteSource>>,
}

impl std::fmt::Debug for TelnetClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelnetClient")
            .field("config", &self.config)
            .field("connected", &self.source.is_some())
            .finish()
    }
}

impl TelnetClient {
    /// Construct a new client. Does not connect; call [`TelnetClient::connect`].
    ///
    /// `prompt` is a literal prompt string (escaped before being compiled;
    /// see [`ClientConfig::new`]).
    ///
    /// # Errors
    /// Returns [`ErrorKind::InvalidArgument`] if `port` is `0`.
    pub fn new(
        host: impl Into<String>,
        port: u16,
        connect_timeout: Duration,
        socket_timeout: Option<Duration>,
        prompt: &str,
        full_line_timeout: Option<Duration>,
    ) -> Result<Self, Error> {
        let config = ClientConfig::new(
            host,
            port,
            connect_timeout,
            socket_timeout,
            prompt,
            full_line_timeout,
        )?;
        let mut assembler = LineAssembler::new();
        assembler.set_socket_timeout(config.socket_timeout());
        assembler.set_full_line_timeout(config.full_line_timeout());
        assembler.set_prune_control_sequences(config.prune_control_sequences());
        assembler.set_debug(config.debug());

        Ok(Self {
            config,
            assembler,
            source: None,
        })
    }

    /// Build a client from an already-constructed configuration.
    #[must_use]
    pub fn from_config(config: ClientConfig) -> Self {
        let mut assembler = LineAssembler::new();
        assembler.set_socket_timeout(config.socket_timeout());
        assembler.set_full_line_timeout(config.full_line_timeout());
        assembler.set_prune_control_sequences(config.prune_control_sequences());
        assembler.set_debug(config.debug());
        Self {
            config,
            assembler,
            source: None,
        }
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.source.is_some()
    }

    /// Resolve the configured host, open a TCP connection within the
    /// configured connect timeout, and set the socket non-blocking.
    ///
    /// # Errors
    /// [`ErrorKind::NameResolution`] if the host doesn't resolve to any
    /// address; [`ErrorKind::Connection`] if the connect attempt fails.
    #[instrument(level = "debug", skip(self), fields(host = self.config.host(), port = self.config.port()))]
    pub fn connect(&mut self) -> Result<(), Error> {
        let host = self.config.host().to_string();
        let port = self.config.port();

        let addr = (host.as_str(), port)
            .to_socket_addrs()
            .map_err(|source| ErrorKind::NameResolution {
                host: host.clone(),
                source,
            })?
            .next()
            .ok_or_else(|| ErrorKind::NameResolution {
                host: host.clone(),
                source: io::Error::new(io::ErrorKind::NotFound, "no addresses returned"),
            })?;

        debug!(%addr, "connecting");
        let stream = TcpStream::connect_timeout(&addr, self.config.connect_timeout())
            .map_err(ErrorKind::Connection)?;
        let source = TcpByteSource::from_stream(stream).map_err(ErrorKind::Connection)?;

        self.source = Some(Box::new(source));
        self.assembler.reset();
        self.assembler.set_socket_timeout(self.config.socket_timeout());
        self.assembler
            .set_full_line_timeout(self.config.full_line_timeout());
        self.assembler
            .set_prune_control_sequences(self.config.prune_control_sequences());
        self.assembler.set_debug(self.config.debug());
        debug!("connected");
        Ok(())
    }

    /// Close the connection. Idempotent; safe to call more than once.
    ///
    /// # Errors
    /// [`ErrorKind::Unlikely`] only if the underlying close itself fails.
    pub fn disconnect(&mut self) -> Result<(), Error> {
        if let Some(mut source) = self.source.take() {
            source
                .close()
                .map_err(|e| ErrorKind::Unlikely(e.to_string()))?;
        }
        Ok(())
    }

    /// Set the prompt to a literal string (escaped before compiling).
    ///
    /// # Errors
    /// [`ErrorKind::InvalidArgument`] if the escaped literal somehow fails
    /// to compile.
    pub fn set_prompt(&mut self, literal: &str) -> Result<(), Error> {
        self.config.set_prompt(literal)
    }

    /// Set the prompt to a regular expression.
    ///
    /// # Errors
    /// [`ErrorKind::InvalidArgument`] if `pattern` fails to compile.
    pub fn set_regex_prompt(&mut self, pattern: &str) -> Result<(), Error> {
        self.config.set_regex_prompt(pattern)
    }

    #[must_use]
    pub fn prompt(&self) -> &Regex {
        self.config.prompt()
    }

    pub fn set_socket_timeout(&mut self, timeout: Option<Duration>) {
        self.config.set_socket_timeout(timeout);
        self.assembler.set_socket_timeout(timeout);
    }

    #[must_use]
    pub fn socket_timeout(&self) -> Option<Duration> {
        self.config.socket_timeout()
    }

    pub fn set_full_line_timeout(&mut self, timeout: Option<Duration>) {
        self.config.set_full_line_timeout(timeout);
        self.assembler.set_full_line_timeout(timeout);
    }

    #[must_use]
    pub fn full_line_timeout(&self) -> Option<Duration> {
        self.config.full_line_timeout()
    }

    pub fn set_prune_control_sequences(&mut self, prune: bool) {
        self.config.set_prune_control_sequences(prune);
        self.assembler.set_prune_control_sequences(prune);
    }

    #[must_use]
    pub fn prune_control_sequences(&self) -> bool {
        self.config.prune_control_sequences()
    }

    pub fn set_drain_remaining_after_prompt(&mut self, drain: bool) {
        self.config.set_drain_remaining_after_prompt(drain);
    }

    #[must_use]
    pub fn drain_remaining_after_prompt(&self) -> bool {
        self.config.drain_remaining_after_prompt()
    }

    pub fn set_debug(&mut self, debug: bool) {
        self.config.set_debug(debug);
        self.assembler.set_debug(debug);
    }

    #[must_use]
    pub fn debug(&self) -> bool {
        self.config.debug()
    }

    /// Write `cmd` verbatim, optionally followed by `CR LF`.
    ///
    /// Per spec.md §9, user command bytes are written verbatim: they are
    /// not IAC-escaped. Callers targeting 8-bit-clean servers should escape
    /// `0xFF` themselves before calling this.
    ///
    /// # Errors
    /// [`ErrorKind::Connection`] if not connected, or on a write failure.
    pub fn send_command(&mut self, cmd: &str, add_newline: bool) -> Result<(), Error> {
        let source = self.source_mut()?;
        source.write_all(cmd.as_bytes())?;
        if add_newline {
            source.write_all(b"\r\n")?;
        }
        Ok(())
    }

    /// Pull one line via the line assembler.
    ///
    /// When `wait_for_full_line` is `false`, the configured full-line
    /// timeout is temporarily disabled for this call (the read waits
    /// indefinitely, bounded only by the socket timeout, for `\n`).
    ///
    /// # Errors
    /// [`ErrorKind::Connection`] if not connected;
    /// [`ErrorKind::ConnectionTimeout`] per the configured timeouts.
    pub fn get_line(&mut self, wait_for_full_line: bool) -> Result<(Bytes, bool), Error> {
        let previous_full_line_timeout = self.assembler.full_line_timeout();
        if !wait_for_full_line {
            self.assembler.set_full_line_timeout(None);
        }

        let result = {
            let source = self
                .source
                .as_deref_mut()
                .ok_or_else(Self::not_connected_error)?;
            self.assembler.get_next_line(source)
        };

        if !wait_for_full_line {
            self.assembler
                .set_full_line_timeout(previous_full_line_timeout);
        }

        let line = result?;
        let matches_prompt = self
            .config
            .prompt()
            .is_match(&String::from_utf8_lossy(&line));
        Ok((line, matches_prompt))
    }

    /// Send `cmd` then wait for the prompt, returning every accumulated
    /// line (see [`TelnetClient::wait_prompt`]).
    ///
    /// # Errors
    /// See [`TelnetClient::send_command`] and [`TelnetClient::wait_prompt`].
    pub fn exec(&mut self, cmd: &str, add_newline: bool) -> Result<Vec<Bytes>, Error> {
        self.send_command(cmd, add_newline)?;
        let drain = self.config.drain_remaining_after_prompt();
        self.wait_prompt(drain)
    }

    /// Accumulate lines until the most recently received one matches the
    /// configured prompt.
    ///
    /// # Errors
    /// [`ErrorKind::Connection`] if not connected; any error surfaced by the
    /// underlying line assembler.
    pub fn wait_prompt(&mut self, drain_remaining: bool) -> Result<Vec<Bytes>, Error> {
        let TelnetClient {
            assembler,
            source,
            config,
        } = self;
        let source = source.as_deref_mut().ok_or_else(Self::not_connected_error)?;
        prompt::wait_prompt(assembler, source, config.prompt(), drain_remaining)
    }

    /// Log in: wait for `login_prompt` (if given), send `user`, wait for
    /// `pass_prompt` (if given), send `pass`, then restore the original
    /// prompt and wait once more.
    ///
    /// # Errors
    /// [`ErrorKind::Login`] wrapping whatever underlying error caused the
    /// login sequence to fail.
    #[instrument(level = "debug", skip(self, pass), fields(user))]
    pub fn login(
        &mut self,
        user: &str,
        pass: &str,
        login_prompt: Option<&str>,
        pass_prompt: Option<&str>,
    ) -> Result<(), Error> {
        self.login_inner(user, pass, login_prompt, pass_prompt)
            .map_err(|e| ErrorKind::login(e).into())
    }

    fn login_inner(
        &mut self,
        user: &str,
        pass: &str,
        login_prompt: Option<&str>,
        pass_prompt: Option<&str>,
    ) -> Result<(), Error> {
        let original_prompt = self.config.prompt().clone();

        if let Some(pattern) = login_prompt {
            self.set_regex_prompt(pattern)?;
        }
        debug!("waiting for login prompt");
        self.wait_prompt(false)?;
        self.send_command(user, true)?;

        if let Some(pattern) = pass_prompt {
            self.set_regex_prompt(pattern)?;
        }
        debug!("waiting for password prompt");
        self.wait_prompt(false)?;
        self.send_command(pass, true)?;

        self.config.set_compiled_prompt(original_prompt);
        debug!("waiting for post-login prompt");
        self.wait_prompt(false)?;
        Ok(())
    }

    fn source_mut(&mut self) -> Result<&mut dyn ByteSource, Error> {
        self.source
            .as_deref_mut()
            .ok_or_else(Self::not_connected_error)
    }

    fn not_connected_error() -> Error {
        ErrorKind::Connection(io::Error::new(
            io::ErrorKind::NotConnected,
            "not connected; call connect() first",
        ))
        .into()
    }
}

#[cfg(any(test, feature = "test-util"))]
impl TelnetClient {
    /// Attach a scripted, in-memory byte source in place of a real TCP
    /// connection, for deterministic end-to-end testing (spec.md §4.H).
    ///
    /// Resets the line assembler's state the same way [`TelnetClient::connect`]
    /// does, so a client can be reused across scripted scenarios.
    pub fn attach_scripted_source(&mut self, source: crate::test_support::ScriptedByteSource) {
        self.source = Some(Box::new(source));
        self.assembler.reset();
        self.assembler.set_socket_timeout(self.config.socket_timeout());
        self.assembler
            .set_full_line_timeout(self.config.full_line_timeout());
        self.assembler
            .set_prune_control_sequences(self.config.prune_control_sequences());
        self.assembler.set_debug(self.config.debug());
    }
}

impl Drop for TelnetClient {
    fn drop(&mut self) {
        let _ = self.disconnect();
    }
}
