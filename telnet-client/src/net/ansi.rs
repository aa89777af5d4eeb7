//! Component C: the ANSI/ASCII control-sequence parser.
//!
//! Segments a byte string into ordered `Text`, `Escape`, and `Control` (CSI)
//! runs so a caller can discard escape/control bytes and keep only text. See
//! `spec.md` §4.C.

use bytes::Bytes;

const ESC: u8 = 0x1B;
const CSI_INTRODUCER: u8 = b'[';

/// The kind of a parsed [`Segment`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    Text,
    Escape,
    Control,
}

/// One ordered run of bytes classified as [`SegmentKind`].
///
/// `complete` is `false` only for the final segment, and only when the input
/// ended mid-sequence (an `Escape` or `Control` segment that never saw its
/// terminating byte).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub kind: SegmentKind,
    pub bytes: Bytes,
    pub complete: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Text,
    Escape,
    Control,
}

/// Parse `input` into an ordered list of [`Segment`]s.
///
/// Invariant (spec.md §8, "Parser round-trip"): concatenating the `bytes` of
/// every returned segment, in order, reproduces `input` exactly.
#[must_use]
pub fn parse(input: &[u8]) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut state = State::Text;
    let mut buf: Vec<u8> = Vec::new();

    let mut i = 0;
    while i < input.len() {
        let c = input[i];

        if c == ESC {
            flush(&mut segments, state, &mut buf, true);
            if input.get(i + 1) == Some(&CSI_INTRODUCER) {
                state = State::Control;
                buf.push(c);
                buf.push(CSI_INTRODUCER);
                i += 2;
            } else {
                state = State::Escape;
                buf.push(c);
                i += 1;
            }
            continue;
        }

        buf.push(c);
        match state {
            State::Escape => {
                if (0x30..=0x7E).contains(&c) {
                    flush(&mut segments, state, &mut buf, true);
                    state = State::Text;
                }
            }
            State::Control => {
                if (0x40..=0x7E).contains(&c) {
                    flush(&mut segments, state, &mut buf, true);
                    state = State::Text;
                }
            }
            State::Text => {}
        }
        i += 1;
    }

    // End of input: flush whatever remains. A non-empty Escape/Control buffer
    // is emitted incomplete; an empty Text buffer is not emitted at all.
    flush(&mut segments, state, &mut buf, false);

    segments
}

fn flush(segments: &mut Vec<Segment>, state: State, buf: &mut Vec<u8>, complete: bool) {
    if buf.is_empty() {
        return;
    }
    let kind = match state {
        State::Text => SegmentKind::Text,
        State::Escape => SegmentKind::Escape,
        State::Control => SegmentKind::Control,
    };
    // Text segments have no terminating byte to wait for, so they're always
    // complete; only a trailing Escape/Control run can be cut off mid-sequence.
    let complete = complete || kind == SegmentKind::Text;
    segments.push(Segment {
        kind,
        bytes: Bytes::copy_from_slice(buf),
        complete,
    });
    buf.clear();
}

/// Concatenate the bytes of all `Text` segments, in order.
#[must_use]
pub fn text_only(segments: &[Segment]) -> Vec<u8> {
    let mut out = Vec::new();
    for seg in segments {
        if seg.kind == SegmentKind::Text {
            out.extend_from_slice(&seg.bytes);
        }
    }
    out
}

/// Concatenate the bytes of every segment, in order (recovers the original
/// input; spec.md §8 "Parser round-trip").
#[must_use]
pub fn full(segments: &[Segment]) -> Vec<u8> {
    let mut out = Vec::new();
    for seg in segments {
        out.extend_from_slice(&seg.bytes);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_identity() {
        let input = b"hi\x1B[31mRED\x1B[0m bye";
        let segments = parse(input);
        assert_eq!(full(&segments), input.to_vec());
    }

    #[test]
    fn strips_csi_sequences() {
        let input = b"hi\x1B[31mRED\x1B[0m bye";
        let segments = parse(input);
        assert_eq!(text_only(&segments), b"hiRED bye".to_vec());
    }

    #[test]
    fn plain_escape_sequence_is_stripped() {
        // ESC followed directly by a final byte (not a CSI sequence).
        let input = b"a\x1Bcb";
        let segments = parse(input);
        assert_eq!(text_only(&segments), b"ab".to_vec());
        assert_eq!(full(&segments), input.to_vec());
    }

    #[test]
    fn trailing_incomplete_escape_is_kept_incomplete() {
        let input = b"abc\x1B[31";
        let segments = parse(input);
        let last = segments.last().unwrap();
        assert_eq!(last.kind, SegmentKind::Control);
        assert!(!last.complete);
        assert_eq!(full(&segments), input.to_vec());
    }

    #[test]
    fn empty_input_yields_no_segments() {
        assert!(parse(b"").is_empty());
    }

    #[test]
    fn text_only_has_no_escape_or_csi_bytes() {
        let input = b"\x1B[1;31mHello\x1B[0m, \x1Bcworld";
        let segments = parse(input);
        let text = text_only(&segments);
        assert!(!text.contains(&ESC));
        assert_eq!(text, b"Hello, world".to_vec());
    }
}
