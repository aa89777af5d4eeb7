pub mod ansi;
pub mod byte_source;
pub mod line;
pub mod prompt;
pub mod telnet;
