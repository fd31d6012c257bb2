//! Find Results session state.
//!
//! One [`FindResultsState`] lives for the whole editing session and is passed
//! explicitly to every handler. It holds:
//! - the baseline snapshot edits are diffed against,
//! - the footer stamp of the last captured search,
//! - the [`PendingState`] of the current replace operation: changes waiting
//!   for their files to finish loading,
//! - the [`LoadedFiles`] log used to decide when those changes can drain.
//!
//! Handlers run serially, so every mutation sequence below completes before
//! the next host callback is observed.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use core_events::ViewId;
use core_results::{LineMap, Snapshot};
use tracing::{debug, info, trace, warn};

/// Option controlling whether drained files are saved and closed.
pub const SAVE_AND_CLOSE: &str = "save_and_close";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    Bool(bool),
}

impl From<bool> for OptionValue {
    fn from(v: bool) -> Self {
        OptionValue::Bool(v)
    }
}

/// Changes for one file plus its view once the host has it loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingFile {
    pub changes: LineMap,
    pub view: Option<ViewId>,
}

/// Changes of one replace operation that are waiting on file loads.
#[derive(Debug, Default)]
pub struct PendingState {
    options: BTreeMap<String, OptionValue>,
    files: BTreeMap<PathBuf, PendingFile>,
}

impl PendingState {
    pub fn reset(&mut self) {
        self.options.clear();
        self.files.clear();
    }

    pub fn add_file(&mut self, path: impl Into<PathBuf>, changes: LineMap) {
        let path = path.into();
        debug!(target: "state.pending", file = %path.display(), lines = changes.len(), "pending_file_added");
        self.files.insert(path, PendingFile { changes, view: None });
    }

    pub fn files(&self) -> &BTreeMap<PathBuf, PendingFile> {
        &self.files
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.files.keys().map(PathBuf::as_path)
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn is_pending(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }

    pub fn option(&self, name: &str) -> Option<&OptionValue> {
        self.options.get(name)
    }

    /// Boolean option, `default` when unset.
    pub fn bool_option(&self, name: &str, default: bool) -> bool {
        match self.options.get(name) {
            Some(OptionValue::Bool(v)) => *v,
            _ => default,
        }
    }

    pub fn set_option(&mut self, name: &str, value: impl Into<OptionValue>) {
        self.options.insert(name.to_string(), value.into());
    }

    pub fn file_changes(&self, path: &Path) -> Option<&LineMap> {
        self.files.get(path).map(|f| &f.changes)
    }

    pub fn file_view(&self, path: &Path) -> Option<ViewId> {
        self.files.get(path).and_then(|f| f.view)
    }

    /// Attach the loaded view to a pending file. Returns false if `path` is not pending.
    pub fn attach_view(&mut self, path: &Path, view: ViewId) -> bool {
        match self.files.get_mut(path) {
            Some(file) => {
                file.view = Some(view);
                true
            }
            None => false,
        }
    }

    /// Drop a file from the pending set (its open request failed).
    pub fn remove_file(&mut self, path: &Path) -> Option<PendingFile> {
        self.files.remove(path)
    }

    /// Move everything out, leaving this state empty.
    pub fn take(&mut self) -> PendingState {
        std::mem::take(self)
    }
}

/// Paths the host reported loaded during the current replace operation.
#[derive(Debug, Default)]
pub struct LoadedFiles {
    log: Vec<PathBuf>,
    distinct: BTreeSet<PathBuf>,
}

impl LoadedFiles {
    pub fn reset(&mut self) {
        self.log.clear();
        self.distinct.clear();
    }

    pub fn mark_loaded(&mut self, path: &Path) {
        self.log.push(path.to_path_buf());
        self.distinct.insert(path.to_path_buf());
    }

    /// Distinct paths loaded so far.
    pub fn loaded_count(&self) -> usize {
        self.distinct.len()
    }

    /// Every load signal in arrival order, duplicates included.
    pub fn log(&self) -> &[PathBuf] {
        &self.log
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.distinct.contains(path)
    }
}

/// Result of recording a load signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadProgress {
    /// No replace operation is waiting on this path.
    Ignored,
    Waiting { loaded: usize, pending: usize },
    /// Every pending file has a loaded view.
    Ready,
}

/// Pending files taken out of the state for application.
#[derive(Debug, Default)]
pub struct PendingDrain {
    pub files: BTreeMap<PathBuf, PendingFile>,
    pub save_and_close: bool,
}

/// Session object shared by the Find Results handlers.
#[derive(Debug, Default)]
pub struct FindResultsState {
    pending: PendingState,
    loaded: LoadedFiles,
    original: Snapshot,
    last_stamp: Option<String>,
}

impl FindResultsState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> &PendingState {
        &self.pending
    }

    pub fn pending_mut(&mut self) -> &mut PendingState {
        &mut self.pending
    }

    pub fn loaded(&self) -> &LoadedFiles {
        &self.loaded
    }

    /// Start a new replace operation, discarding whatever the previous one left.
    pub fn begin_replace(&mut self, save_and_close: bool) {
        if !self.pending.is_empty() {
            warn!(
                target: "state.pending",
                abandoned = self.pending.file_count(),
                "pending_files_abandoned"
            );
        }
        self.loaded.reset();
        self.pending.reset();
        self.pending.set_option(SAVE_AND_CLOSE, save_and_close);
    }

    /// Record that the host finished loading `path` into `view`.
    pub fn record_load(&mut self, path: &Path, view: ViewId) -> LoadProgress {
        if self.pending.is_empty() {
            trace!(target: "state.pending", file = %path.display(), "load_without_pending");
            return LoadProgress::Ignored;
        }
        if !self.pending.attach_view(path, view) {
            warn!(target: "state.pending", file = %path.display(), %view, "load_not_pending");
            return LoadProgress::Ignored;
        }
        if self.loaded.contains(path) {
            debug!(target: "state.pending", file = %path.display(), "duplicate_load");
        }
        self.loaded.mark_loaded(path);
        if self.is_drain_ready() {
            info!(target: "state.pending", files = self.pending.file_count(), "drain_ready");
            LoadProgress::Ready
        } else {
            LoadProgress::Waiting {
                loaded: self.loaded.loaded_count(),
                pending: self.pending.file_count(),
            }
        }
    }

    /// True when the loaded paths are exactly the pending paths.
    pub fn is_drain_ready(&self) -> bool {
        !self.pending.is_empty()
            && self.loaded.loaded_count() == self.pending.file_count()
            && self.pending.paths().all(|p| self.loaded.contains(p))
    }

    /// Take the pending files if every one has loaded. Later calls return
    /// `None` until another replace operation fills the state again.
    pub fn take_drain(&mut self) -> Option<PendingDrain> {
        if !self.is_drain_ready() {
            return None;
        }
        let save_and_close = self.pending.bool_option(SAVE_AND_CLOSE, false);
        let taken = self.pending.take();
        self.loaded.reset();
        Some(PendingDrain {
            files: taken.files,
            save_and_close,
        })
    }

    /// A pending file whose open request failed; the rest may still drain.
    pub fn abandon_file(&mut self, path: &Path) -> LoadProgress {
        self.pending.remove_file(path);
        if self.is_drain_ready() {
            LoadProgress::Ready
        } else if self.pending.is_empty() {
            LoadProgress::Ignored
        } else {
            LoadProgress::Waiting {
                loaded: self.loaded.loaded_count(),
                pending: self.pending.file_count(),
            }
        }
    }

    pub fn original(&self) -> &Snapshot {
        &self.original
    }

    pub fn set_original(&mut self, snapshot: Snapshot) {
        debug!(
            target: "state.pending",
            files = snapshot.file_count(),
            lines = snapshot.line_count(),
            "baseline_captured"
        );
        self.original = snapshot;
    }

    pub fn last_stamp(&self) -> Option<&str> {
        self.last_stamp.as_deref()
    }

    pub fn set_last_stamp(&mut self, stamp: impl Into<String>) {
        self.last_stamp = Some(stamp.into());
    }
}
