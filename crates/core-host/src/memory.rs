//! In-memory host adapter.
//!
//! Views are `core_text::Buffer`s. File contents come from a [`Storage`]:
//! [`MemoryStorage`] for tests, [`DiskStorage`] for the real filesystem.
//! Files are normalized to LF on open and written back with their original
//! terminators on save. Mixed-ending files keep each line's own terminator.

use std::collections::{BTreeMap, VecDeque};
use std::path::{Path, PathBuf};

use core_events::Event;
use core_text::{Buffer, LineEnding, expand_per_line, normalize_line_endings};
use tracing::{debug, error, trace};

use crate::{BufferView, Extent, HostError, RegionStyle, ViewId, Workspace};

/// Where file-backed views read and write their contents.
pub trait Storage {
    fn read(&self, path: &Path) -> Result<String, HostError>;
    fn write(&mut self, path: &Path, contents: &str) -> Result<(), HostError>;
}

/// Map-backed storage.
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    files: BTreeMap<PathBuf, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, contents: impl Into<String>) {
        self.files.insert(path.into(), contents.into());
    }

    pub fn get(&self, path: &Path) -> Option<&str> {
        self.files.get(path).map(String::as_str)
    }
}

impl Storage for MemoryStorage {
    fn read(&self, path: &Path) -> Result<String, HostError> {
        self.files.get(path).cloned().ok_or_else(|| HostError::Io {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        })
    }

    fn write(&mut self, path: &Path, contents: &str) -> Result<(), HostError> {
        self.files.insert(path.to_path_buf(), contents.to_string());
        Ok(())
    }
}

/// Filesystem storage.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiskStorage;

impl Storage for DiskStorage {
    fn read(&self, path: &Path) -> Result<String, HostError> {
        std::fs::read_to_string(path).map_err(|source| {
            error!(target: "host.fs", file = %path.display(), ?source, "file_open_error");
            HostError::Io {
                path: path.to_path_buf(),
                source,
            }
        })
    }

    fn write(&mut self, path: &Path, contents: &str) -> Result<(), HostError> {
        std::fs::write(path, contents.as_bytes()).map_err(|source| {
            error!(target: "host.fs", file = %path.display(), ?source, "file_write_error");
            HostError::Io {
                path: path.to_path_buf(),
                source,
            }
        })
    }
}

#[derive(Debug, Clone)]
struct RegionSet {
    extents: Vec<Extent>,
    style: RegionStyle,
}

/// A buffer view held by [`MemoryWorkspace`].
#[derive(Debug, Clone)]
pub struct TextView {
    id: ViewId,
    name: String,
    path: Option<PathBuf>,
    buffer: Buffer,
    line_ending: LineEnding,
    // Per-line terminators, kept only for mixed-ending files.
    endings: Vec<LineEnding>,
    regions: BTreeMap<String, RegionSet>,
    scroll: Option<usize>,
    edit_depth: usize,
    completed_edits: usize,
    modified: bool,
    dirty: bool,
}

impl TextView {
    /// A view with no backing file.
    pub fn scratch(id: ViewId, name: impl Into<String>, text: &str) -> Self {
        let name = name.into();
        Self {
            id,
            buffer: Buffer::from_text(name.clone(), text),
            name,
            path: None,
            line_ending: LineEnding::Lf,
            endings: Vec::new(),
            regions: BTreeMap::new(),
            scroll: None,
            edit_depth: 0,
            completed_edits: 0,
            modified: false,
            dirty: false,
        }
    }

    fn from_file(id: ViewId, path: &Path, raw: &str) -> Self {
        let norm = normalize_line_endings(raw);
        let name = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("file")
            .to_string();
        let mut view = Self::scratch(id, name, &norm.normalized);
        view.path = Some(path.to_path_buf());
        view.line_ending = norm.original;
        if norm.mixed {
            view.endings = norm.endings;
        }
        view
    }

    /// Replace the whole buffer (user typing, paste, a new search landing).
    pub fn set_text(&mut self, text: &str) {
        let len = self.buffer.len_bytes();
        self.buffer.replace_bytes(0, len, text);
        self.modified = true;
        self.dirty = true;
    }

    pub fn edit_depth(&self) -> usize {
        self.edit_depth
    }

    /// Number of outermost edit groups closed so far.
    pub fn completed_edits(&self) -> usize {
        self.completed_edits
    }

    pub fn regions(&self, key: &str) -> Option<&[Extent]> {
        self.regions.get(key).map(|r| r.extents.as_slice())
    }

    pub fn region_style(&self, key: &str) -> Option<&RegionStyle> {
        self.regions.get(key).map(|r| &r.style)
    }

    pub fn scroll_position(&self) -> Option<usize> {
        self.scroll
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    /// Clear and return the pending modification signal.
    pub fn take_modified(&mut self) -> bool {
        std::mem::take(&mut self.modified)
    }

    /// Contents as they would be written to disk.
    pub fn serialized(&self) -> String {
        let text = self.buffer.text();
        if self.endings.is_empty() {
            self.line_ending.expand(&text)
        } else {
            expand_per_line(&text, &self.endings, self.line_ending)
        }
    }
}

impl BufferView for TextView {
    fn id(&self) -> ViewId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn text(&self) -> String {
        self.buffer.text()
    }

    fn size(&self) -> usize {
        self.buffer.len_bytes()
    }

    fn text_point(&self, line: usize) -> Option<usize> {
        self.buffer.line_start(line)
    }

    fn line_extent(&self, offset: usize) -> Extent {
        let r = self.buffer.line_extent_at(offset);
        Extent::new(r.start, r.end)
    }

    fn substr(&self, extent: Extent) -> String {
        self.buffer.slice_bytes(extent.start, extent.end)
    }

    fn begin_edit(&mut self) {
        self.edit_depth += 1;
    }

    fn end_edit(&mut self) {
        if self.edit_depth == 0 {
            return;
        }
        self.edit_depth -= 1;
        if self.edit_depth == 0 {
            self.completed_edits += 1;
        }
    }

    fn replace(&mut self, extent: Extent, text: &str) {
        trace!(target: "host.view", view = %self.id, start = extent.start, end = extent.end, "replace");
        self.buffer.replace_bytes(extent.start, extent.end, text);
        self.modified = true;
        self.dirty = true;
    }

    fn scroll_to(&mut self, offset: usize) {
        self.scroll = Some(offset);
    }

    fn add_regions(&mut self, key: &str, extents: &[Extent], style: &RegionStyle) {
        self.regions.insert(
            key.to_string(),
            RegionSet {
                extents: extents.to_vec(),
                style: style.clone(),
            },
        );
    }
}

/// Reference [`Workspace`] holding [`TextView`]s.
///
/// `open_file` reads the file immediately but only announces it through
/// [`MemoryWorkspace::drain_events`], mirroring hosts that load asynchronously.
pub struct MemoryWorkspace<S: Storage> {
    storage: S,
    views: BTreeMap<ViewId, TextView>,
    next_id: u64,
    active: Option<ViewId>,
    loads: VecDeque<ViewId>,
    saved: Vec<PathBuf>,
    closed: Vec<ViewId>,
}

impl<S: Storage> MemoryWorkspace<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            views: BTreeMap::new(),
            next_id: 1,
            active: None,
            loads: VecDeque::new(),
            saved: Vec::new(),
            closed: Vec::new(),
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    fn allocate_id(&mut self) -> ViewId {
        let id = ViewId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Create an unsaved named view and make it active.
    pub fn add_scratch(&mut self, name: &str, text: &str) -> ViewId {
        let id = self.allocate_id();
        self.views.insert(id, TextView::scratch(id, name, text));
        self.active = Some(id);
        id
    }

    /// Open `path` as already loaded (no load event will be emitted).
    pub fn open_loaded(&mut self, path: &Path) -> Result<ViewId, HostError> {
        let raw = self.storage.read(path)?;
        let id = self.allocate_id();
        self.views.insert(id, TextView::from_file(id, path, &raw));
        debug!(target: "host.fs", file = %path.display(), view = %id, "file_opened");
        Ok(id)
    }

    /// Events produced since the last call: loads in open order, then views
    /// modified since they were last drained.
    pub fn drain_events(&mut self) -> Vec<Event> {
        let mut events: Vec<Event> = self.loads.drain(..).map(Event::BufferLoaded).collect();
        for view in self.views.values_mut() {
            if view.take_modified() {
                events.push(Event::BufferModified(view.id));
            }
        }
        events
    }

    pub fn views(&self) -> impl Iterator<Item = &TextView> {
        self.views.values()
    }

    pub fn saved_paths(&self) -> &[PathBuf] {
        &self.saved
    }

    pub fn closed_views(&self) -> &[ViewId] {
        &self.closed
    }

    /// Write every dirty file-backed view, returning how many were saved.
    pub fn save_all(&mut self) -> Result<usize, HostError> {
        let dirty: Vec<ViewId> = self
            .views
            .values()
            .filter(|v| v.dirty && v.path.is_some())
            .map(|v| v.id)
            .collect();
        for id in &dirty {
            self.save(*id)?;
        }
        Ok(dirty.len())
    }
}

impl<S: Storage> Workspace for MemoryWorkspace<S> {
    type View = TextView;

    fn view(&self, id: ViewId) -> Option<&TextView> {
        self.views.get(&id)
    }

    fn view_mut(&mut self, id: ViewId) -> Option<&mut TextView> {
        self.views.get_mut(&id)
    }

    fn active_view(&self) -> Option<ViewId> {
        self.active
    }

    fn find_open(&self, path: &Path) -> Option<ViewId> {
        self.views
            .values()
            .find(|v| v.path.as_deref() == Some(path))
            .map(|v| v.id)
    }

    fn open_file(&mut self, path: &Path) -> Result<ViewId, HostError> {
        let id = self.open_loaded(path)?;
        self.loads.push_back(id);
        Ok(id)
    }

    fn focus(&mut self, id: ViewId) -> Result<(), HostError> {
        if !self.views.contains_key(&id) {
            return Err(HostError::UnknownView(id));
        }
        self.active = Some(id);
        Ok(())
    }

    fn save(&mut self, id: ViewId) -> Result<(), HostError> {
        let view = self.views.get_mut(&id).ok_or(HostError::UnknownView(id))?;
        let path = view.path.clone().ok_or(HostError::NotFileBacked(id))?;
        self.storage.write(&path, &view.serialized())?;
        view.dirty = false;
        debug!(target: "host.fs", file = %path.display(), view = %id, "file_saved");
        self.saved.push(path);
        Ok(())
    }

    fn close(&mut self, id: ViewId) -> Result<(), HostError> {
        self.views.remove(&id).ok_or(HostError::UnknownView(id))?;
        if self.active == Some(id) {
            self.active = None;
        }
        self.loads.retain(|v| *v != id);
        self.closed.push(id);
        Ok(())
    }

    fn poll_events(&mut self) -> Vec<Event> {
        self.drain_events()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn storage() -> MemoryStorage {
        let mut s = MemoryStorage::new();
        s.insert("/src/a.txt", "one\r\ntwo\r\n");
        s
    }

    #[test]
    fn open_file_defers_load_event() {
        let mut ws = MemoryWorkspace::new(storage());
        let id = ws.open_file(Path::new("/src/a.txt")).unwrap();
        assert_eq!(ws.view(id).unwrap().text(), "one\ntwo\n");
        assert_eq!(ws.find_open(Path::new("/src/a.txt")), Some(id));
        assert_eq!(ws.drain_events(), vec![Event::BufferLoaded(id)]);
        assert!(ws.drain_events().is_empty());
    }

    #[test]
    fn open_missing_file_errors() {
        let mut ws = MemoryWorkspace::new(MemoryStorage::new());
        let err = ws.open_file(Path::new("/nope")).unwrap_err();
        assert!(matches!(err, HostError::Io { .. }));
        assert!(ws.drain_events().is_empty());
    }

    #[test]
    fn save_restores_line_endings() {
        let mut ws = MemoryWorkspace::new(storage());
        let id = ws.open_loaded(Path::new("/src/a.txt")).unwrap();
        let view = ws.view_mut(id).unwrap();
        let ext = view.line_extent(0);
        view.replace(ext, "ONE");
        ws.save(id).unwrap();
        assert_eq!(ws.storage().get(Path::new("/src/a.txt")), Some("ONE\r\ntwo\r\n"));
        assert!(!ws.view(id).unwrap().is_dirty());
        assert_eq!(ws.saved_paths(), &[PathBuf::from("/src/a.txt")]);
    }

    #[test]
    fn save_keeps_mixed_terminators_of_untouched_lines() {
        let mut s = MemoryStorage::new();
        s.insert("/src/mixed.txt", "a\r\nb\r\nc\nd\n\r\ne\r\n");
        let mut ws = MemoryWorkspace::new(s);
        let id = ws.open_loaded(Path::new("/src/mixed.txt")).unwrap();
        assert_eq!(ws.view(id).unwrap().line_ending(), LineEnding::Crlf);
        let view = ws.view_mut(id).unwrap();
        let ext = view.line_extent(0);
        view.replace(ext, "A");
        ws.save(id).unwrap();
        assert_eq!(
            ws.storage().get(Path::new("/src/mixed.txt")),
            Some("A\r\nb\r\nc\nd\n\r\ne\r\n")
        );
    }

    #[test]
    fn modified_views_signal_once() {
        let mut ws = MemoryWorkspace::new(storage());
        let id = ws.add_scratch("Find Results", "x");
        ws.view_mut(id).unwrap().set_text("y");
        assert_eq!(ws.drain_events(), vec![Event::BufferModified(id)]);
        assert!(ws.drain_events().is_empty());
    }

    #[test]
    fn scratch_views_cannot_be_saved() {
        let mut ws = MemoryWorkspace::new(storage());
        let id = ws.add_scratch("Find Results", "x");
        assert!(matches!(ws.save(id), Err(HostError::NotFileBacked(_))));
    }

    #[test]
    fn close_removes_view_and_clears_active() {
        let mut ws = MemoryWorkspace::new(storage());
        let id = ws.open_file(Path::new("/src/a.txt")).unwrap();
        ws.focus(id).unwrap();
        ws.close(id).unwrap();
        assert!(ws.view(id).is_none());
        assert_eq!(ws.active_view(), None);
        assert!(ws.drain_events().is_empty());
        assert!(matches!(ws.close(id), Err(HostError::UnknownView(_))));
    }

    #[test]
    fn disk_storage_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f.txt");
        std::fs::write(&path, "a\nb").unwrap();
        let mut ws = MemoryWorkspace::new(DiskStorage);
        let id = ws.open_loaded(&path).unwrap();
        let view = ws.view_mut(id).unwrap();
        let ext = view.line_extent(2);
        view.replace(ext, "B");
        assert_eq!(ws.save_all().unwrap(), 1);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "a\nB");
    }
}
