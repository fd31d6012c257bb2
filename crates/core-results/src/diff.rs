//! Snapshot differ.
//!
//! Add/modify only: rows present in the baseline but missing from the current
//! snapshot are not reported, since a results buffer cannot distinguish a
//! deleted row from a line that never matched.

use tracing::debug;

use crate::{ChangeSet, Snapshot};

/// Rows of `current` whose text differs from (or is absent in) `baseline`.
pub fn diff(baseline: &Snapshot, current: &Snapshot) -> ChangeSet {
    let mut changes = ChangeSet::new();
    for (path, lines) in current {
        let before = baseline.file(path);
        for (line, text) in lines {
            let old = before.and_then(|b| b.get(line));
            if old != Some(text) {
                changes.insert_line(path.clone(), *line, text.clone());
            }
        }
    }
    debug!(
        target: "results.diff",
        files = changes.file_count(),
        lines = changes.line_count(),
        "snapshot_diffed"
    );
    changes
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::path::Path;

    fn snap(rows: &[(&str, usize, &str)]) -> Snapshot {
        let mut s = Snapshot::new();
        for (path, line, text) in rows {
            s.insert_line(*path, *line, *text);
        }
        s
    }

    #[test]
    fn identical_snapshots_have_no_changes() {
        let a = snap(&[("/a", 0, "x"), ("/b", 3, "y")]);
        assert!(diff(&a, &a).is_empty());
    }

    #[test]
    fn modified_line_is_reported() {
        let base = snap(&[("/a/b.txt", 2, "foo bar")]);
        let cur = snap(&[("/a/b.txt", 2, "foo CHANGED")]);
        assert_eq!(diff(&base, &cur), cur);
    }

    #[test]
    fn new_file_and_new_line_count_as_changes() {
        let base = snap(&[("/a", 0, "x")]);
        let cur = snap(&[("/a", 0, "x"), ("/a", 5, "new"), ("/c", 1, "z")]);
        let changes = diff(&base, &cur);
        assert_eq!(changes, snap(&[("/a", 5, "new"), ("/c", 1, "z")]));
    }

    #[test]
    fn removed_rows_are_not_reported() {
        let base = snap(&[("/a", 0, "x"), ("/a", 1, "y"), ("/gone", 0, "z")]);
        let cur = snap(&[("/a", 0, "x")]);
        assert!(diff(&base, &cur).is_empty());
    }

    #[test]
    fn empty_file_section_yields_nothing() {
        let mut cur = Snapshot::new();
        cur.insert_file("/empty", Default::default());
        let changes = diff(&Snapshot::new(), &cur);
        assert!(!changes.contains_file(Path::new("/empty")));
    }
}
