//! Rendering reports in the results grammar.

use std::fmt::Write as _;
use std::path::PathBuf;

/// Whether a row is a hit or surrounding context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    Match,
    Context,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    /// Zero-based line number.
    pub line: usize,
    pub text: String,
    pub kind: RowKind,
}

impl Row {
    pub fn matched(line: usize, text: impl Into<String>) -> Self {
        Self {
            line,
            text: text.into(),
            kind: RowKind::Match,
        }
    }

    pub fn context(line: usize, text: impl Into<String>) -> Self {
        Self {
            line,
            text: text.into(),
            kind: RowKind::Context,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHits {
    pub path: PathBuf,
    /// Rows in ascending line order.
    pub rows: Vec<Row>,
}

impl FileHits {
    pub fn match_count(&self) -> usize {
        self.rows.iter().filter(|r| r.kind == RowKind::Match).count()
    }
}

/// One search: its query, how many files were searched, and the hits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub query: String,
    pub searched_files: usize,
    pub files: Vec<FileHits>,
}

impl Report {
    pub fn match_count(&self) -> usize {
        self.files.iter().map(FileHits::match_count).sum()
    }

    /// Footer wording for the current totals.
    pub fn footer(&self) -> String {
        let matches = self.match_count();
        let files = self.files.iter().filter(|f| f.match_count() > 0).count();
        match (matches, files) {
            (1, 1) => "1 match in 1 file".to_string(),
            (n, 1) => format!("{n} matches in 1 file"),
            (n, m) => format!("{n} matches across {m} files"),
        }
    }
}

/// Render `report` as a results block followed by a newline.
///
/// Rows are right-aligned to a five column gutter; matches use `": "` and
/// context rows two spaces, with `..` marking a gap inside a file section.
pub fn render(report: &Report) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Searching {} files for \"{}\"",
        report.searched_files, report.query
    );
    for file in &report.files {
        out.push('\n');
        let _ = writeln!(out, "{}:", file.path.display());
        let mut previous: Option<usize> = None;
        for row in &file.rows {
            if previous.is_some_and(|p| row.line > p + 1) {
                out.push_str("   ..\n");
            }
            let sep = match row.kind {
                RowKind::Match => ": ",
                RowKind::Context => "  ",
            };
            let _ = writeln!(out, "{:>5}{sep}{}", row.line + 1, row.text);
            previous = Some(row.line);
        }
    }
    out.push('\n');
    out.push_str(&report.footer());
    out.push('\n');
    out
}
