//! Host editor capability interface.
//!
//! The Find Results core never owns editor buffers. It reaches them through
//! the narrow traits below, which any host adapter implements:
//!
//! - [`BufferView`]: read text, resolve line extents, replace a region inside
//!   an edit transaction, scroll, and attach named region annotations.
//! - [`Workspace`]: look views up by id or path, open files (their load is
//!   reported later as an event), save, focus and close.
//!
//! [`memory::MemoryWorkspace`] is the reference adapter backed by
//! `core_text::Buffer`, with pluggable [`memory::Storage`] for file contents.

use std::path::{Path, PathBuf};

pub mod memory;

pub use core_events::ViewId;

/// Half-open byte range `[start, end)` inside a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Extent {
    pub start: usize,
    pub end: usize,
}

impl Extent {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

bitflags::bitflags! {
    /// Presentation flags of an annotated region set.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct RegionFlags: u16 {
        /// Not drawn in the text area (gutter icon only).
        const HIDDEN = 1;
        /// Stored with the buffer across sessions.
        const PERSISTENT = 2;
    }
}

/// How an annotated region set is drawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionStyle {
    pub scope: String,
    pub icon: String,
    pub flags: RegionFlags,
}

impl RegionStyle {
    /// Hidden, persistent bookmark marker.
    pub fn bookmark() -> Self {
        Self {
            scope: "mark".to_string(),
            icon: "bookmark".to_string(),
            flags: RegionFlags::HIDDEN | RegionFlags::PERSISTENT,
        }
    }
}

/// Failures raised at the host boundary. The core logs these and moves on;
/// it never retries.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unknown view {0}")]
    UnknownView(ViewId),
    #[error("{0} has no file on disk")]
    NotFileBacked(ViewId),
}

/// One open buffer as seen by the core.
pub trait BufferView {
    fn id(&self) -> ViewId;
    /// Display name (`"Find Results"` for the results buffer).
    fn name(&self) -> &str;
    /// Backing file, if any.
    fn path(&self) -> Option<&Path>;
    fn text(&self) -> String;
    fn size(&self) -> usize;
    /// Offset of the first byte of zero-based `line`; `None` past the last line.
    fn text_point(&self, line: usize) -> Option<usize>;
    /// Extent of the line containing `offset`, newline excluded.
    fn line_extent(&self, offset: usize) -> Extent;
    fn substr(&self, extent: Extent) -> String;
    /// Open an undoable edit group. Groups may nest.
    fn begin_edit(&mut self);
    fn end_edit(&mut self);
    fn replace(&mut self, extent: Extent, text: &str);
    fn scroll_to(&mut self, offset: usize);
    /// Attach (replacing any previous set under `key`) an annotated region set.
    fn add_regions(&mut self, key: &str, extents: &[Extent], style: &RegionStyle);
}

/// Window-level host operations.
pub trait Workspace {
    type View: BufferView;

    fn view(&self, id: ViewId) -> Option<&Self::View>;
    fn view_mut(&mut self, id: ViewId) -> Option<&mut Self::View>;
    fn active_view(&self) -> Option<ViewId>;
    /// View already showing `path`, if open.
    fn find_open(&self, path: &Path) -> Option<ViewId>;
    /// Request `path` be opened. The view exists immediately but is reported
    /// loaded later through a `BufferLoaded` event.
    fn open_file(&mut self, path: &Path) -> Result<ViewId, HostError>;
    fn focus(&mut self, id: ViewId) -> Result<(), HostError>;
    fn save(&mut self, id: ViewId) -> Result<(), HostError>;
    fn close(&mut self, id: ViewId) -> Result<(), HostError>;
    /// Modification and load notifications raised since the last poll.
    fn poll_events(&mut self) -> Vec<core_events::Event> {
        Vec::new()
    }
}

/// Scoped edit group: `begin_edit` on creation, `end_edit` on drop, so the
/// group is closed on every exit path including early returns and panics.
pub struct EditTransaction<'a, V: BufferView + ?Sized> {
    view: &'a mut V,
}

impl<'a, V: BufferView + ?Sized> EditTransaction<'a, V> {
    pub fn begin(view: &'a mut V) -> Self {
        view.begin_edit();
        Self { view }
    }
}

impl<V: BufferView + ?Sized> std::ops::Deref for EditTransaction<'_, V> {
    type Target = V;

    fn deref(&self) -> &V {
        self.view
    }
}

impl<V: BufferView + ?Sized> std::ops::DerefMut for EditTransaction<'_, V> {
    fn deref_mut(&mut self) -> &mut V {
        self.view
    }
}

impl<V: BufferView + ?Sized> Drop for EditTransaction<'_, V> {
    fn drop(&mut self) {
        self.view.end_edit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::TextView;

    #[test]
    fn transaction_closes_on_drop() {
        let mut view = TextView::scratch(ViewId(1), "t", "abc\n");
        {
            let mut tx = EditTransaction::begin(&mut view);
            assert_eq!(tx.edit_depth(), 1);
            let ext = tx.line_extent(0);
            tx.replace(ext, "xyz");
        }
        assert_eq!(view.edit_depth(), 0);
        assert_eq!(view.completed_edits(), 1);
        assert_eq!(view.text(), "xyz\n");
    }

    #[test]
    fn transaction_closes_on_panic() {
        let mut view = TextView::scratch(ViewId(1), "t", "abc");
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _tx = EditTransaction::begin(&mut view);
            panic!("mid-edit failure");
        }));
        assert!(result.is_err());
        assert_eq!(view.edit_depth(), 0);
    }

    #[test]
    fn bookmark_style_is_hidden_and_persistent() {
        let style = RegionStyle::bookmark();
        assert!(style.flags.contains(RegionFlags::HIDDEN | RegionFlags::PERSISTENT));
        assert_eq!(style.icon, "bookmark");
    }

    #[test]
    fn extent_len() {
        assert_eq!(Extent::new(3, 7).len(), 4);
        assert!(Extent::new(5, 5).is_empty());
    }
}
