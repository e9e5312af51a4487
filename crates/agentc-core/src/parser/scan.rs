//! Balanced-delimiter scanning over artifact source text.

use std::ops::Range;

/// Why a balanced literal could not be isolated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    /// No opening delimiter between the start position and the end of its line.
    NoOpener,
    /// Input ended while `depth` delimiters were still open.
    Unterminated { depth: usize },
}

impl std::fmt::Display for ScanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScanError::NoOpener => write!(f, "no opening delimiter on the label's line"),
            ScanError::Unterminated { depth } => {
                write!(f, "literal is unterminated ({depth} delimiter(s) still open)")
            }
        }
    }
}

/// Locate the balanced literal opened by the first `open` after `from`.
///
/// The opener must sit on the same line as `from`. From there the scan walks
/// forward with a depth counter that starts at 1, adds one per `open`,
/// subtracts one per `close`, and stops where the count returns to 0. The
/// returned range covers both delimiters.
///
/// Delimiters inside double-quoted string literals are not structural and are
/// skipped; backslash escapes inside strings are honoured. Delimiters are
/// ASCII, so byte-wise scanning never splits a UTF-8 sequence.
pub fn balanced_span(
    text: &str,
    from: usize,
    open: u8,
    close: u8,
) -> Result<Range<usize>, ScanError> {
    let bytes = text.as_bytes();
    let line_end = bytes[from..]
        .iter()
        .position(|&b| b == b'\n')
        .map_or(bytes.len(), |p| from + p);

    let start = bytes[from..line_end]
        .iter()
        .position(|&b| b == open)
        .map(|p| from + p)
        .ok_or(ScanError::NoOpener)?;

    let mut depth = 1usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &b) in bytes[start + 1..].iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }

        if b == b'"' {
            in_string = true;
        } else if b == open {
            depth += 1;
        } else if b == close {
            depth -= 1;
            if depth == 0 {
                let end = start + 1 + offset + 1;
                return Ok(start..end);
            }
        }
    }

    Err(ScanError::Unterminated { depth })
}
