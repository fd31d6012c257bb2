//! Rope-based text buffer abstraction.
//!
//! Offsets are absolute UTF-8 byte offsets. Line extents exclude the trailing
//! newline so a replacement bounded by an extent never joins two lines.

use ropey::Rope;
use std::ops::Range;

pub mod line_ending;

pub use line_ending::{LineEnding, NormalizedText, expand_per_line, normalize_line_endings};

/// A text buffer backed by a `ropey::Rope`.
#[derive(Clone)]
pub struct Buffer {
    rope: Rope,
    pub name: String,
}

impl std::fmt::Debug for Buffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Buffer")
            .field("name", &self.name)
            .field("len_bytes", &self.rope.len_bytes())
            .field("lines", &self.rope.len_lines())
            .finish()
    }
}

impl Buffer {
    /// Construct a buffer from an in-memory string slice.
    pub fn from_text(name: impl Into<String>, content: &str) -> Self {
        Self {
            rope: Rope::from_str(content),
            name: name.into(),
        }
    }

    /// Total size in bytes.
    pub fn len_bytes(&self) -> usize {
        self.rope.len_bytes()
    }

    pub fn is_empty(&self) -> bool {
        self.rope.len_bytes() == 0
    }

    /// Total number of lines in the buffer.
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Return the requested line as an owned `String` (including trailing newline if present).
    pub fn line(&self, idx: usize) -> Option<String> {
        if idx < self.rope.len_lines() {
            Some(self.rope.line(idx).to_string())
        } else {
            None
        }
    }

    /// Line content without its newline.
    pub fn line_content(&self, idx: usize) -> Option<String> {
        let mut s = self.line(idx)?;
        if s.ends_with('\n') {
            s.pop();
        }
        Some(s)
    }

    /// Byte length of a line (excluding any newline).
    pub fn line_byte_len(&self, idx: usize) -> usize {
        if idx >= self.rope.len_lines() {
            return 0;
        }
        let line = self.rope.line(idx);
        let len = line.len_bytes();
        if len > 0 && line.byte(len - 1) == b'\n' {
            len - 1
        } else {
            len
        }
    }

    /// Byte offset of the first byte of line `idx`, or `None` past the last line.
    pub fn line_start(&self, idx: usize) -> Option<usize> {
        if idx < self.rope.len_lines() {
            Some(self.rope.line_to_byte(idx))
        } else {
            None
        }
    }

    /// Zero-based line index containing `offset` (clamped to the buffer end).
    pub fn line_of_offset(&self, offset: usize) -> usize {
        let clamped = offset.min(self.rope.len_bytes());
        self.rope.byte_to_line(clamped)
    }

    /// Extent `[start, end)` of the line containing `offset`, newline excluded.
    pub fn line_extent_at(&self, offset: usize) -> Range<usize> {
        let line = self.line_of_offset(offset);
        let start = self.rope.line_to_byte(line);
        start..start + self.line_byte_len(line)
    }

    /// Return the UTF-8 slice in the absolute byte range `[start,end)` (clamped).
    pub fn slice_bytes(&self, start: usize, end: usize) -> String {
        let total = self.rope.len_bytes();
        let s = start.min(total);
        let e = end.min(total);
        if s >= e {
            return String::new();
        }
        let start_char = self.rope.byte_to_char(s);
        let end_char = self.rope.byte_to_char(e);
        self.rope.slice(start_char..end_char).to_string()
    }

    /// Replace the byte range `[start,end)` (clamped) with `text`, returning the
    /// removed text. Both bounds must sit on character boundaries.
    pub fn replace_bytes(&mut self, start: usize, end: usize, text: &str) -> String {
        let total = self.rope.len_bytes();
        let s = start.min(total);
        let e = end.min(total).max(s);
        let start_char = self.rope.byte_to_char(s);
        let end_char = self.rope.byte_to_char(e);
        debug_assert_eq!(self.rope.char_to_byte(start_char), s);
        debug_assert_eq!(self.rope.char_to_byte(end_char), e);
        let removed = self.rope.slice(start_char..end_char).to_string();
        if start_char < end_char {
            self.rope.remove(start_char..end_char);
        }
        if !text.is_empty() {
            self.rope.insert(start_char, text);
        }
        removed
    }

    /// Full buffer contents.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }
}
