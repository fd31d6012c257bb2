//! Line ending detection and normalization.
//!
//! Buffers hold LF-only text. Files are normalized on read. On write a
//! uniform file is re-expanded to its single style, and a mixed file gets
//! each terminator back in its recorded position, so a single-line
//! replacement does not rewrite the other terminators in the file.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    #[default]
    Lf,
    Cr,
    Crlf,
}

impl LineEnding {
    pub fn as_str(self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::Cr => "\r",
            LineEnding::Crlf => "\r\n",
        }
    }

    /// Re-expand LF-only `text` into this style.
    pub fn expand(self, text: &str) -> String {
        match self {
            LineEnding::Lf => text.to_string(),
            other => text.replace('\n', other.as_str()),
        }
    }
}

/// Re-expand LF-only `text`, giving the n-th newline the n-th recorded
/// terminator. Newlines past the recorded ones use `fallback`.
pub fn expand_per_line(text: &str, endings: &[LineEnding], fallback: LineEnding) -> String {
    let mut out = String::with_capacity(text.len() + endings.len());
    let mut recorded = endings.iter();
    for piece in text.split_inclusive('\n') {
        match piece.strip_suffix('\n') {
            Some(content) => {
                out.push_str(content);
                out.push_str(recorded.next().copied().unwrap_or(fallback).as_str());
            }
            None => out.push_str(piece),
        }
    }
    out
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedText {
    pub normalized: String,       // LF-only content
    pub original: LineEnding,     // majority style
    pub mixed: bool,              // more than one style observed
    pub endings: Vec<LineEnding>, // terminator of each line, in order
}

/// Detect and normalize line endings of `input` to LF.
/// Majority wins; ties resolve by precedence CRLF > LF > CR.
pub fn normalize_line_endings(input: &str) -> NormalizedText {
    let (mut crlf, mut lf, mut cr) = (0usize, 0usize, 0usize);
    let mut out = String::with_capacity(input.len());
    let mut endings = Vec::new();
    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\r' if chars.peek() == Some(&'\n') => {
                chars.next();
                crlf += 1;
                endings.push(LineEnding::Crlf);
                out.push('\n');
            }
            '\r' => {
                cr += 1;
                endings.push(LineEnding::Cr);
                out.push('\n');
            }
            '\n' => {
                lf += 1;
                endings.push(LineEnding::Lf);
                out.push('\n');
            }
            other => out.push(other),
        }
    }

    let mut original = LineEnding::Lf;
    let mut max = 0usize;
    for (style, count) in [
        (LineEnding::Crlf, crlf),
        (LineEnding::Lf, lf),
        (LineEnding::Cr, cr),
    ] {
        if count > max {
            max = count;
            original = style;
        }
    }
    let mixed = [crlf, lf, cr].iter().filter(|c| **c > 0).count() > 1;

    NormalizedText {
        normalized: out,
        original,
        mixed,
        endings,
    }
}
