//! Property-based tests for parsing and diffing reports.

use core_results::{
    FileHits, LineMap, PathStyle, Report, Row, Snapshot, diff, parse, render,
};
use proptest::prelude::*;
use std::collections::BTreeMap;
use std::path::PathBuf;

fn line_text() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 _.(){}=;:-]{0,24}"
}

fn file_lines() -> impl Strategy<Value = BTreeMap<usize, String>> {
    prop::collection::btree_map(0usize..400, line_text(), 1..8)
}

fn snapshot() -> impl Strategy<Value = Snapshot> {
    prop::collection::btree_map("/[a-z]{1,6}(/[a-z]{1,6}){0,2}\\.rs", file_lines(), 0..4)
        .prop_map(|files| {
            files
                .into_iter()
                .map(|(p, lines)| (PathBuf::from(p), lines))
                .collect::<Snapshot>()
        })
}

fn report_of(snap: &Snapshot) -> Report {
    Report {
        query: "q".into(),
        searched_files: snap.file_count(),
        files: snap
            .iter()
            .map(|(path, lines)| FileHits {
                path: path.clone(),
                rows: lines
                    .iter()
                    .map(|(line, text)| Row::matched(*line, text.clone()))
                    .collect(),
            })
            .collect(),
    }
}

proptest! {
    // Differ on identical inputs reports nothing.
    #[test]
    fn diff_of_self_is_empty(a in snapshot()) {
        prop_assert!(diff(&a, &a).is_empty());
    }

    // Every reported row differs from the baseline, and every differing row is reported.
    #[test]
    fn diff_is_sound_and_complete(a in snapshot(), b in snapshot()) {
        let changes = diff(&a, &b);
        for (path, lines) in &changes {
            for (line, text) in lines {
                prop_assert_eq!(b.get(path, *line), Some(text.as_str()));
                prop_assert_ne!(a.get(path, *line), Some(text.as_str()));
            }
        }
        for (path, lines) in &b {
            for (line, text) in lines {
                let differs = a.get(path, *line) != Some(text.as_str());
                prop_assert_eq!(differs, changes.get(path, *line).is_some());
            }
        }
    }

    // Rendering then parsing reproduces the snapshot; parsing twice is stable.
    #[test]
    fn render_parse_round_trip(a in snapshot()) {
        let text = render(&report_of(&a));
        let parsed = parse(&text, PathStyle::Posix);
        prop_assert_eq!(&parsed, &a);
        prop_assert_eq!(parse(&text, PathStyle::Posix), parsed);
    }

    // Editing one rendered row changes only that row after re-parsing.
    #[test]
    fn edited_row_is_the_only_change(a in snapshot(), replacement in line_text(), pick in 0usize..64) {
        prop_assume!(!a.is_empty());
        let mut edited = a.clone();
        let (path, lines): (PathBuf, LineMap) = {
            let (p, l) = a.iter().nth(pick % a.file_count()).unwrap();
            (p.clone(), l.clone())
        };
        let line = *lines.keys().nth(pick % lines.len()).unwrap();
        edited.insert_line(path.clone(), line, replacement.clone());

        let reparsed = parse(&render(&report_of(&edited)), PathStyle::Posix);
        let changes = diff(&a, &reparsed);
        if lines.get(&line) == Some(&replacement) {
            prop_assert!(changes.is_empty());
        } else {
            prop_assert_eq!(changes.line_count(), 1);
            prop_assert_eq!(changes.get(&path, line), Some(replacement.as_str()));
        }
    }
}
