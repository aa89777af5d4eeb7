//! Wire-level Telnet (RFC 854) constants and the NVT demultiplexer.

pub mod nvt;

/// Telnet command codes. See [RFC 854](https://tools.ietf.org/html/rfc854)
/// "TELNET COMMAND STRUCTURE".
pub mod command {
    /// Interpret the following byte as a command, rather than data. Escaped as
    /// `IAC IAC` to represent a literal `0xFF` data byte.
    pub const IAC: u8 = 0xFF;
    /// "End of subnegotiation parameters."
    pub const SE: u8 = 0xF0;
    /// No operation.
    pub const NOP: u8 = 0xF1;
    /// Go ahead.
    pub const GA: u8 = 0xF9;
    /// "Indicates that what follows is subnegotiation of the indicated option."
    pub const SB: u8 = 0xFA;
    /// Confirms performing (or desire to begin performing) the indicated option.
    pub const WILL: u8 = 0xFB;
    /// Refuses to perform, or continue performing, the indicated option.
    pub const WONT: u8 = 0xFC;
    /// Requests the other party perform the indicated option.
    pub const DO: u8 = 0xFD;
    /// Demands the other party stop performing the indicated option.
    pub const DONT: u8 = 0xFE;
}

/// Telnet option codes this client is aware of. None of these are ever
/// affirmatively accepted by the NVT filter (see [`nvt`]); they're named here
/// for completeness and for logging.
pub mod option {
    pub const ECHO: u8 = 0x01;
    pub const SUPPRESS_GO_AHEAD: u8 = 0x03;
    pub const STATUS: u8 = 0x05;
    pub const TERMINAL_TYPE: u8 = 0x18;
    pub const NAWS: u8 = 0x1F;
    pub const LINEMODE: u8 = 0x22;
    pub const NEW_ENVIRON: u8 = 0x27;
}

pub(crate) const CR: u8 = 0x0D;
pub(crate) const LF: u8 = 0x0A;
