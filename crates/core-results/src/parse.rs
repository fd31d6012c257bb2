//! Block parser: results block text -> [`Snapshot`].
//!
//! Two-state machine over the block's lines:
//!
//! * `SeekingFile` waits for a path line (`/abs/path:`), opening a section.
//! * `ParsingLines` collects result rows until a blank line closes the section.
//!
//! The final section of a block is not followed by a blank line inside the
//! block text when the block is cut at the footer, so a section still open at
//! end of input is committed as well. Lines that match neither grammar are
//! skipped; a malformed row is never an error.

use std::path::PathBuf;
use tracing::{debug, trace};

use crate::grammar::{self, PathStyle};
use crate::scan::find_last_block;
use crate::{LineMap, Snapshot};

/// A finished file section.
type Section = (PathBuf, LineMap);

#[derive(Debug)]
enum ParseState {
    SeekingFile,
    ParsingLines { path: PathBuf, lines: LineMap },
}

impl ParseState {
    /// Advance by one line, returning the next state and any section it closed.
    fn step(self, line: &str, style: PathStyle) -> (ParseState, Option<Section>) {
        match self {
            ParseState::SeekingFile => match style.match_path_line(line) {
                Some(path) => {
                    trace!(target: "results.parse", path, "section_open");
                    (
                        ParseState::ParsingLines {
                            path: PathBuf::from(path),
                            lines: LineMap::new(),
                        },
                        None,
                    )
                }
                None => (ParseState::SeekingFile, None),
            },
            ParseState::ParsingLines { path, mut lines } => {
                if line.is_empty() {
                    return (ParseState::SeekingFile, Some((path, lines)));
                }
                match parse_row(line) {
                    Some((number, text)) => {
                        lines.insert(number, text.to_string());
                    }
                    None => trace!(target: "results.parse", line, "row_skipped"),
                }
                (ParseState::ParsingLines { path, lines }, None)
            }
        }
    }

    fn finish(self) -> Option<Section> {
        match self {
            ParseState::SeekingFile => None,
            ParseState::ParsingLines { path, lines } => Some((path, lines)),
        }
    }
}

/// Parse one result row into its zero-based line number and text.
///
/// A displayed number of `0` has no zero-based counterpart and is rejected
/// along with anything else outside the row grammar.
pub fn parse_row(line: &str) -> Option<(usize, &str)> {
    let (number, text) = grammar::match_row(line)?;
    let displayed: usize = number.parse().ok()?;
    Some((displayed.checked_sub(1)?, text))
}

/// Parse a single results block.
///
/// Returns an empty snapshot unless the block has at least two lines and its
/// first line is a `Searching <N> files for "<query>"` header.
pub fn parse(block: &str, style: PathStyle) -> Snapshot {
    let mut lines = block.lines();
    let Some(first) = lines.next() else {
        return Snapshot::new();
    };
    if !grammar::is_header_line(first) {
        debug!(target: "results.parse", "header_missing");
        return Snapshot::new();
    }
    let rest: Vec<&str> = lines.collect();
    if rest.is_empty() {
        return Snapshot::new();
    }

    let mut snapshot = Snapshot::new();
    let mut state = ParseState::SeekingFile;
    for line in rest {
        let (next, closed) = state.step(line, style);
        if let Some((path, map)) = closed {
            snapshot.insert_file(path, map);
        }
        state = next;
    }
    if let Some((path, map)) = state.finish() {
        snapshot.insert_file(path, map);
    }
    debug!(
        target: "results.parse",
        files = snapshot.file_count(),
        lines = snapshot.line_count(),
        "block_parsed"
    );
    snapshot
}

/// Snapshot of the last complete block in a whole results buffer.
pub fn parse_last_block(text: &str, style: PathStyle) -> Option<Snapshot> {
    find_last_block(text).map(|block| parse(block, style))
}
