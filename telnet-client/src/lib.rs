//! A client-side Telnet (RFC 854/855/856/1073/1079/1091/1116) library.
//!
//! Connects to a remote NVT, negotiates every option down (this client never
//! affirmatively accepts one), normalizes line endings, and hands callers
//! text up to a caller-supplied prompt. Useful for scripting network
//! equipment CLIs that speak Telnet and emit ANSI noise rather than full
//! terminal emulation.
//!
//! This crate does not implement a Telnet *server*, TLS, or full terminal
//! emulation; see [`TelnetClient`] for the supported surface.

pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod net;

#[cfg(any(test, feature = "test-util"))]
pub mod test_support;

pub use client::TelnetClient;
pub use config::ClientConfig;
pub use error::{Error, ErrorKind, Result};
pub use net::ansi::{Segment, SegmentKind};
pub use net::byte_source::{ByteSource, TcpByteSource};
