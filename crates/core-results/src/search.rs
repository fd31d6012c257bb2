//! Literal text search producing a [`Report`].

use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::debug;

use crate::render::{FileHits, Report, Row};

/// Search each `(path, text)` source for the literal `query`.
///
/// `context` lines around each hit are included as context rows. Sources
/// without a hit are counted as searched but omitted from the report.
pub fn search_texts<'a, I>(query: &str, sources: I, context: usize) -> Report
where
    I: IntoIterator<Item = (PathBuf, &'a str)>,
{
    let mut report = Report {
        query: query.to_string(),
        searched_files: 0,
        files: Vec::new(),
    };
    for (path, text) in sources {
        report.searched_files += 1;
        if query.is_empty() {
            continue;
        }
        let lines: Vec<&str> = text.lines().collect();
        let mut rows: BTreeMap<usize, Row> = BTreeMap::new();
        for (idx, line) in lines.iter().enumerate() {
            if !line.contains(query) {
                continue;
            }
            // A hit replaces any context row recorded for the same line.
            rows.insert(idx, Row::matched(idx, *line));
            let first = idx.saturating_sub(context);
            let last = (idx + context).min(lines.len().saturating_sub(1));
            for ctx in first..=last {
                rows.entry(ctx)
                    .or_insert_with(|| Row::context(ctx, lines[ctx]));
            }
        }
        if rows.is_empty() {
            continue;
        }
        debug!(target: "results.search", path = %path.display(), rows = rows.len(), "file_hits");
        report.files.push(FileHits {
            path,
            rows: rows.into_values().collect(),
        });
    }
    report
}
