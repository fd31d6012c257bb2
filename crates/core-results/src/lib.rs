//! Find Results report model.
//!
//! A results buffer accumulates one report per search. Each report (a
//! *block*) runs from a `Searching <N> files for "<query>"` header to a
//! `<N> matches across <M> files` style footer and lists, per file, the
//! matched source lines prefixed by their 1-based line number.
//!
//! This crate is pure text processing with no editor dependency:
//! - [`scan`] isolates the most recent block in a larger text.
//! - [`parse`] turns a block into a [`Snapshot`] (`file -> {line -> text}`).
//! - [`diff`] computes the [`ChangeSet`] between two snapshots.
//! - [`locate`] maps a cursor offset to the `path:line` it sits on.
//! - [`render`] and [`search`] produce reports in the same grammar.
//!
//! Line numbers are stored zero-based; reports display them one-based.

use serde::Serialize;
use std::collections::BTreeMap;
use std::collections::btree_map;
use std::path::{Path, PathBuf};

pub mod diff;
pub mod grammar;
pub mod locate;
pub mod parse;
pub mod render;
pub mod scan;
pub mod search;

pub use diff::diff;
pub use grammar::PathStyle;
pub use locate::{Location, block_containing, locate};
pub use parse::{parse, parse_last_block};
pub use render::{FileHits, Report, Row, RowKind, render};
pub use scan::find_last_block;
pub use search::search_texts;

/// Zero-based line number -> literal line text.
pub type LineMap = BTreeMap<usize, String>;

/// Per-file line table shared by snapshots and change sets.
///
/// Iteration is ordered by path then line number, which fixes the order in
/// which changes are applied and regions are reported.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ResultsMap {
    files: BTreeMap<PathBuf, LineMap>,
}

/// Parsed contents of one results block.
pub type Snapshot = ResultsMap;

/// Rows of a snapshot that differ from a baseline.
pub type ChangeSet = ResultsMap;

impl ResultsMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Total number of `(file, line)` entries.
    pub fn line_count(&self) -> usize {
        self.files.values().map(BTreeMap::len).sum()
    }

    /// Record a file's lines, overwriting any earlier entry for the same path.
    pub fn insert_file(&mut self, path: impl Into<PathBuf>, lines: LineMap) {
        self.files.insert(path.into(), lines);
    }

    /// Record one line, creating the file entry on demand.
    pub fn insert_line(&mut self, path: impl Into<PathBuf>, line: usize, text: impl Into<String>) {
        self.files
            .entry(path.into())
            .or_default()
            .insert(line, text.into());
    }

    pub fn file(&self, path: &Path) -> Option<&LineMap> {
        self.files.get(path)
    }

    pub fn get(&self, path: &Path, line: usize) -> Option<&str> {
        self.files
            .get(path)
            .and_then(|lines| lines.get(&line))
            .map(String::as_str)
    }

    pub fn contains_file(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.files.keys().map(PathBuf::as_path)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, PathBuf, LineMap> {
        self.files.iter()
    }
}

impl IntoIterator for ResultsMap {
    type Item = (PathBuf, LineMap);
    type IntoIter = btree_map::IntoIter<PathBuf, LineMap>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.into_iter()
    }
}

impl<'a> IntoIterator for &'a ResultsMap {
    type Item = (&'a PathBuf, &'a LineMap);
    type IntoIter = btree_map::Iter<'a, PathBuf, LineMap>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.iter()
    }
}

impl FromIterator<(PathBuf, LineMap)> for ResultsMap {
    fn from_iter<T: IntoIterator<Item = (PathBuf, LineMap)>>(iter: T) -> Self {
        Self {
            files: iter.into_iter().collect(),
        }
    }
}
