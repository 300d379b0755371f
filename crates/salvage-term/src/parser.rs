//! Escape-sequence accumulation.
//!
//! An ESC byte arms the parser; subsequent bytes from the class
//! `[ ( ) ? ;` and the digits buffer up until the first byte outside
//! that class arrives, which terminates the sequence. The buffer is
//! bounded: class bytes past the cap are dropped so a malformed stream
//! can only ever truncate its own sequence.
//!
//! Sequences survive chunk boundaries. The console feeds whatever the
//! shell pipe hands it, so half an escape in one read and the rest in
//! the next is the normal case, not the exception.

use smallvec::SmallVec;
use tracing::debug;

/// Longest sequence kept, terminator included.
pub const MAX_SEQUENCE: usize = 64;

/// Parameter slots recognized in one sequence.
pub const MAX_PARAMS: usize = 32;

fn is_class_byte(byte: u8) -> bool {
    matches!(byte, b'[' | b'(' | b')' | b'?' | b';' | b'0'..=b'9')
}

/// Accumulates one escape sequence byte by byte.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EscapeParser {
    buf: SmallVec<[u8; MAX_SEQUENCE]>,
    active: bool,
}

impl EscapeParser {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an ESC has been seen and the sequence is still open.
    #[must_use]
    pub fn active(&self) -> bool {
        self.active
    }

    /// Starts a fresh sequence, discarding any half-read one. A stray
    /// ESC in the middle of a sequence restarts it.
    pub fn begin(&mut self) {
        self.buf.clear();
        self.active = true;
    }

    /// Consumes the next byte. Returns the finished sequence when the
    /// byte terminates it, `None` while it is still accumulating.
    pub fn push(&mut self, byte: u8) -> Option<Sequence> {
        if is_class_byte(byte) {
            // Last slot stays free for the terminator.
            if self.buf.len() < MAX_SEQUENCE - 1 {
                self.buf.push(byte);
            } else {
                debug!(byte, "overlong escape sequence, byte dropped");
            }
            return None;
        }
        self.buf.push(byte);
        self.active = false;
        Some(Sequence {
            bytes: std::mem::take(&mut self.buf),
        })
    }
}

/// A completed sequence: every buffered class byte plus the terminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    pub bytes: SmallVec<[u8; MAX_SEQUENCE]>,
}

impl Sequence {
    /// Tallies the bracket bytes and decimal parameters.
    #[must_use]
    pub fn classify(&self) -> Classified {
        let mut out = Classified::default();
        let mut separators = 0usize;
        for &byte in &self.bytes {
            match byte {
                b'[' => out.square += 1,
                b'(' | b')' => out.round += 1,
                b'?' => out.question += 1,
                b';' => separators += 1,
                b'0'..=b'9' => {
                    let slot = separators.min(MAX_PARAMS - 1);
                    out.params[slot] = out.params[slot]
                        .saturating_mul(10)
                        .saturating_add(u32::from(byte - b'0'));
                }
                other => {
                    out.terminator = Some(other);
                    break;
                }
            }
        }
        out.count = (separators + 1).min(MAX_PARAMS);
        out
    }
}

/// Structural breakdown of a sequence.
///
/// A parameter slot that never saw a digit reads as zero; a sequence
/// with no semicolons still counts one parameter, so a bare `[m` resets
/// colors the same way `[0m` does.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Classified {
    pub square: u32,
    pub round: u32,
    pub question: u32,
    pub terminator: Option<u8>,
    params: [u32; MAX_PARAMS],
    count: usize,
}

impl Classified {
    /// Whether the shape matches the only form the console interprets:
    /// exactly one `[` and no other bracket bytes.
    #[must_use]
    pub fn is_csi(&self) -> bool {
        self.square == 1 && self.round == 0 && self.question == 0
    }

    /// Parameter at `index`, zero when absent.
    #[must_use]
    pub fn param(&self, index: usize) -> u32 {
        self.params.get(index).copied().unwrap_or(0)
    }

    /// All counted parameters, including implicit zeros.
    #[must_use]
    pub fn params(&self) -> &[u32] {
        &self.params[..self.count]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete(parser: &mut EscapeParser, bytes: &[u8]) -> Sequence {
        parser.begin();
        let mut done = None;
        for &b in bytes {
            assert!(done.is_none(), "sequence ended early");
            done = parser.push(b);
        }
        done.expect("sequence should have terminated")
    }

    #[test]
    fn first_non_class_byte_terminates() {
        let mut parser = EscapeParser::new();
        let seq = complete(&mut parser, b"[31m");
        assert_eq!(&seq.bytes[..], b"[31m");
        assert!(!parser.active());
    }

    #[test]
    fn parameters_split_on_semicolons() {
        let mut parser = EscapeParser::new();
        let c = complete(&mut parser, b"[1;22H").classify();
        assert!(c.is_csi());
        assert_eq!(c.terminator, Some(b'H'));
        assert_eq!(c.params(), &[1, 22]);
    }

    #[test]
    fn a_bare_terminator_counts_one_zero_parameter() {
        let mut parser = EscapeParser::new();
        let c = complete(&mut parser, b"[m").classify();
        assert_eq!(c.params(), &[0]);
    }

    #[test]
    fn question_marks_disqualify_the_csi_shape() {
        let mut parser = EscapeParser::new();
        let c = complete(&mut parser, b"[?25h").classify();
        assert!(!c.is_csi());
    }

    #[test]
    fn overlong_sequences_truncate_but_keep_the_terminator() {
        let mut parser = EscapeParser::new();
        parser.begin();
        for _ in 0..200 {
            assert!(parser.push(b'1').is_none());
        }
        let seq = parser.push(b'A').expect("terminator still closes");
        assert_eq!(seq.bytes.len(), MAX_SEQUENCE);
        assert_eq!(seq.classify().terminator, Some(b'A'));
    }

    #[test]
    fn excess_parameters_collapse_into_the_last_slot() {
        let mut parser = EscapeParser::new();
        parser.begin();
        for _ in 0..40 {
            parser.push(b'1');
            parser.push(b';');
        }
        let c = parser.push(b'm').unwrap().classify();
        assert_eq!(c.params().len(), MAX_PARAMS);
    }
}
