//! Connection configuration (spec.md §3 "Connection configuration").

use std::time::Duration;

use regex::{escape, Regex};

use crate::error::{Error, ErrorKind};

/// Immutable-after-construction connection configuration, mutated only
/// through the setters below (mirroring `spec.md` §3).
#[derive(Clone, Debug)]
pub struct ClientConfig {
    host: String,
    port: u16,
    connect_timeout: Duration,
    socket_timeout: Option<Duration>,
    full_line_timeout: Option<Duration>,
    prompt: Regex,
    prune_control_sequences: bool,
    drain_remaining_after_prompt: bool,
    debug: bool,
}

impl ClientConfig {
    /// Build a new configuration.
    ///
    /// `prompt` is treated as a literal string (escaped before being
    /// compiled), matching [`ClientConfig::set_prompt`]. Use
    /// [`ClientConfig::set_regex_prompt`] afterwards if you need a real
    /// pattern.
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
        if port == 0 {
            return Err(ErrorKind::InvalidArgument("port must be in 1..=65535".into()).into());
        }

        let mut config = Self {
            host: host.into(),
            port,
            connect_timeout,
            socket_timeout,
            full_line_timeout,
            prompt: anchor_at_end("")?,
            prune_control_sequences: false,
            drain_remaining_after_prompt: false,
            debug: false,
        };
        config.set_prompt(prompt)?;
        Ok(config)
    }

    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    #[must_use]
    pub fn socket_timeout(&self) -> Option<Duration> {
        self.socket_timeout
    }

    pub fn set_socket_timeout(&mut self, timeout: Option<Duration>) {
        self.socket_timeout = timeout;
    }

    #[must_use]
    pub fn full_line_timeout(&self) -> Option<Duration> {
        self.full_line_timeout
    }

    pub fn set_full_line_timeout(&mut self, timeout: Option<Duration>) {
        self.full_line_timeout = timeout;
    }

    #[must_use]
    pub fn prompt(&self) -> &Regex {
        &self.prompt
    }

    /// Set the prompt to a literal string: the string is regex-escaped, then
    /// forwarded through the same end-anchoring [`ClientConfig::set_regex_prompt`]
    /// applies to a pattern.
    ///
    /// # Errors
    /// Returns [`ErrorKind::InvalidArgument`] if, somehow, the escaped
    /// literal fails to compile (this should never happen for any valid
    /// UTF-8 string, but the fallible path is kept honest rather than
    /// `unwrap`-ed).
    pub fn set_prompt(&mut self, literal: &str) -> Result<(), Error> {
        self.set_regex_prompt(&escape(literal))
    }

    /// Set the prompt to a regular expression, compiled as the equivalent of
    /// `^.*(pattern)$`: the line must end with text matching `pattern` (spec.md
    /// §4.F). This is stricter than a bare substring search — a match that
    /// doesn't reach the end of the line doesn't count.
    ///
    /// # Errors
    /// Returns [`ErrorKind::InvalidArgument`] if `pattern` fails to compile.
    pub fn set_regex_prompt(&mut self, pattern: &str) -> Result<(), Error> {
        self.prompt = anchor_at_end(pattern)?;
        Ok(())
    }

    /// Install an already-compiled prompt regex directly, bypassing
    /// escaping/anchoring. Used internally to restore the caller's prompt
    /// after a login sequence temporarily swaps it out.
    pub(crate) fn set_compiled_prompt(&mut self, prompt: Regex) {
        self.prompt = prompt;
    }

    #[must_use]
    pub fn prune_control_sequences(&self) -> bool {
        self.prune_control_sequences
    }

    pub fn set_prune_control_sequences(&mut self, prune: bool) {
        self.prune_control_sequences = prune;
    }

    #[must_use]
    pub fn drain_remaining_after_prompt(&self) -> bool {
        self.drain_remaining_after_prompt
    }

    pub fn set_drain_remaining_after_prompt(&mut self, drain: bool) {
        self.drain_remaining_after_prompt = drain;
    }

    #[must_use]
    pub fn debug(&self) -> bool {
        self.debug
    }

    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }
}

/// Compile `pattern` anchored so it must match up to the end of the
/// buffer, equivalent to `^.*(pattern)$` (spec.md §4.F).
fn anchor_at_end(pattern: &str) -> Result<Regex, Error> {
    Regex::new(&format!("(?:{pattern})$")).map_err(|e| ErrorKind::Regex(e).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_port_zero() {
        let err = ClientConfig::new("localhost", 0, Duration::from_secs(1), None, "$", None)
            .unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::InvalidArgument(_)));
    }

    #[test]
    fn literal_prompt_is_escaped() {
        let config =
            ClientConfig::new("localhost", 23, Duration::from_secs(1), None, "a.b", None).unwrap();
        assert!(config.prompt().is_match("xa.b"));
        assert!(!config.prompt().is_match("xaZb"));
    }

    #[test]
    fn regex_prompt_matches_pattern() {
        let mut config =
            ClientConfig::new("localhost", 23, Duration::from_secs(1), None, "", None).unwrap();
        config.set_regex_prompt(r"\$\s*$").unwrap();
        assert!(config.prompt().is_match("some text $ "));
    }

    #[test]
    fn invalid_regex_prompt_is_rejected() {
        let mut config =
            ClientConfig::new("localhost", 23, Duration::from_secs(1), None, "", None).unwrap();
        let err = config.set_regex_prompt("(unclosed").unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Regex(_)));
    }
}
