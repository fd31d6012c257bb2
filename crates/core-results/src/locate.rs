//! Cursor lookups inside a results buffer holding several blocks.
//!
//! Offsets are byte offsets. A line spans its text plus its newline, so a
//! cursor sitting right after the last character of a row still resolves to
//! that row.

use std::fmt;
use std::path::PathBuf;
use tracing::trace;

use crate::grammar::{self, FOOTER_ML, HEADER_ML, PathStyle};

/// A source position as displayed in a report (`path:line`, 1-based line).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub path: PathBuf,
    pub line: usize,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.path.display(), self.line)
    }
}

/// The block whose header precedes `cursor`, with the cursor rebased onto it.
///
/// Picks the last header starting strictly before the cursor, then the first
/// footer after that header.
pub fn block_containing(text: &str, cursor: usize) -> Option<(&str, usize)> {
    let start = HEADER_ML
        .find_iter(text)
        .take_while(|m| m.start() < cursor)
        .last()?
        .start();
    let footer = FOOTER_ML.find_at(text, start)?;
    Some((&text[start..footer.end()], cursor - start))
}

/// Resolve the file and displayed line number of the row under `cursor`.
///
/// `None` when no file section starts before the cursor or the cursor line is
/// not a result row (a path line, blank separator, footer).
pub fn locate(text: &str, cursor: usize, style: PathStyle) -> Option<Location> {
    let section = style
        .path_multiline()
        .captures_iter(text)
        .take_while(|c| c.get(0).is_some_and(|m| m.start() < cursor))
        .last()?;
    let start = section.get(0)?.start();
    let path = section.get(1)?.as_str();
    let rebased = cursor - start;

    let mut line_start = 0usize;
    for line in text[start..].split('\n') {
        let line_end = line_start + line.len();
        if line_end >= rebased {
            let (number, _) = grammar::match_row(line.trim_end_matches('\r'))?;
            trace!(target: "results.locate", path, number, "cursor_row");
            return Some(Location {
                path: PathBuf::from(path),
                line: number.parse().ok()?,
            });
        }
        line_start = line_end + 1;
    }
    None
}
