//! Component E: the prompt waiter.
//!
//! Accumulates lines from the line assembler (component D) until a
//! caller-supplied regular expression matches the most recently received
//! line. See `spec.md` §4.E.

use bytes::Bytes;
use regex::Regex;

use crate::error::{Error, ErrorKind};
use crate::net::byte_source::ByteSource;
use crate::net::line::LineAssembler;

/// Strip a single trailing `\n`, if present.
fn strip_newline(mut line: Vec<u8>) -> Vec<u8> {
    if line.last() == Some(&b'\n') {
        line.pop();
    }
    line
}

/// Repeatedly pull lines from `assembler` until the most recently received
/// one matches `prompt`, then return every line accumulated for this call
/// (trailing `\n` stripped from each). If `drain_remaining`, additionally
/// pull any further lines that arrive before the socket timeout fires.
pub fn wait_prompt(
    assembler: &mut LineAssembler,
    source: &mut dyn ByteSource,
    prompt: &Regex,
    drain_remaining: bool,
) -> Result<Vec<Bytes>, Error> {
    let mut lines = Vec::new();

    loop {
        let raw = assembler.get_next_line(source)?;
        let line = strip_newline(raw.to_vec());
        let matched = prompt.is_match(&String::from_utf8_lossy(&line));
        lines.push(Bytes::from(line));
        if matched {
            break;
        }
    }

    if drain_remaining {
        loop {
            match assembler.get_next_line(source) {
                Ok(raw) => lines.push(Bytes::from(strip_newline(raw.to_vec()))),
                Err(e) if matches!(e.kind(), ErrorKind::ConnectionTimeout(_)) => break,
                Err(e) => return Err(e),
            }
        }
    }

    Ok(lines)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::test_support::ScriptedByteSource;

    #[test]
    fn stops_on_first_matching_line() {
        let mut assembler = LineAssembler::new();
        assembler.set_full_line_timeout(Some(Duration::from_millis(50)));
        let mut source = ScriptedByteSource::new(b"one\r\ntwo\r\n$ ".to_vec());
        let prompt = Regex::new(r"\$").unwrap();

        let lines = wait_prompt(&mut assembler, &mut source, &prompt, false).unwrap();
        assert_eq!(lines.len(), 3);
        assert_eq!(&lines[0][..], b"one");
        assert_eq!(&lines[1][..], b"two");
        assert_eq!(&lines[2][..], b"$ ");
    }

    #[test]
    fn drain_remaining_collects_extra_lines_after_match() {
        let mut assembler = LineAssembler::new();
        assembler.set_socket_timeout(Some(Duration::from_millis(40)));
        assembler.set_full_line_timeout(Some(Duration::from_millis(40)));
        let mut source = ScriptedByteSource::new(b"$ \r\nextra1\r\nextra2\r\n".to_vec());
        let prompt = Regex::new(r"\$").unwrap();

        let lines = wait_prompt(&mut assembler, &mut source, &prompt, true).unwrap();
        assert_eq!(
            lines.iter().map(|l| l.to_vec()).collect::<Vec<_>>(),
            vec![b"$ ".to_vec(), b"extra1".to_vec(), b"extra2".to_vec()]
        );
    }
}
