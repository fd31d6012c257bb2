//! Locating the most recent report inside a results buffer.

use std::ops::Range;
use tracing::trace;

use crate::grammar::{FOOTER_ML, HEADER_ML};

/// Byte range of the last header-to-footer block in `text`.
///
/// Only the last header is considered: when it has no footer after it (a
/// search still streaming into the buffer) there is no actionable block even
/// if an earlier complete one exists.
pub fn last_block_range(text: &str) -> Option<Range<usize>> {
    let start = HEADER_ML.find_iter(text).last()?.start();
    let Some(footer) = FOOTER_ML.find_at(text, start) else {
        trace!(target: "results.scan", header_at = start, "footer_missing");
        return None;
    };
    Some(start..footer.end())
}

/// The last complete block in `text`, header line through footer match.
pub fn find_last_block(text: &str) -> Option<&str> {
    last_block_range(text).map(|r| &text[r])
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_SEARCHES: &str = "Searching 3 files for \"old\"\n\n/a.txt:\n    1: old\n\n1 match in 1 file\n\n\
Searching 5 files for \"new\"\n\n/b.txt:\n    2: new one\n    9: new two\n\n2 matches in 1 file\n";

    #[test]
    fn picks_last_block() {
        let block = find_last_block(TWO_SEARCHES).unwrap();
        assert!(block.starts_with("Searching 5 files for \"new\""));
        assert!(block.ends_with("2 matches in 1 file"));
        assert!(!block.contains("old"));
    }

    #[test]
    fn none_without_header() {
        assert_eq!(find_last_block("/a.txt:\n    1: x\n\n1 match in 1 file"), None);
        assert_eq!(find_last_block(""), None);
    }

    #[test]
    fn none_when_last_header_has_no_footer() {
        let text = format!("{TWO_SEARCHES}\nSearching 2 files for \"pending\"\n\n/c.txt:\n");
        assert_eq!(find_last_block(&text), None);
    }

    #[test]
    fn footer_before_header_is_ignored() {
        let text = "1 match in 1 file\nSearching 1 files for \"x\"\n/a:\n    1: x\n";
        assert_eq!(find_last_block(text), None);
    }

    #[test]
    fn stamped_footer_ends_at_grammar_match() {
        let text = "Searching 1 files for \"x\"\n/a:\n    1: x\n\n1 match in 1 file @ 2024-01-01";
        let block = find_last_block(text).unwrap();
        assert!(block.ends_with("1 match in 1 file"));
    }
}
