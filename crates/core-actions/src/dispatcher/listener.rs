//! Buffer listeners: baseline capture when a search lands, deferred drain on load.

use std::path::Path;

use core_events::Event;
use core_host::{BufferView, EditTransaction, Extent, Workspace};
use core_results::grammar::is_footer_line;
use core_results::parse_last_block;
use core_state::LoadProgress;
use tracing::{debug, info, trace};

use crate::{FindResultsPlugin, ViewId};

/// Extent of the last line that is not empty, skipping trailing blank lines.
fn last_nonempty_line<V: BufferView + ?Sized>(view: &V) -> Option<Extent> {
    let size = view.size();
    if size == 0 {
        return None;
    }
    let mut extent = view.line_extent(size - 1);
    while extent.is_empty() {
        if extent.start == 0 {
            return None;
        }
        extent = view.line_extent(extent.start - 1);
    }
    Some(extent)
}

impl FindResultsPlugin {
    /// React to a modification of view `id`.
    ///
    /// When the results buffer ends with a footer that does not carry the
    /// current stamp, a new search has landed: its block becomes the baseline
    /// and the footer is rewritten as `"<footer> @ <stamp>"`. Returns whether
    /// that happened. The rewrite is itself a modification; `stamping` keeps
    /// it from being handled while in progress and the stamp makes the later
    /// notification a no-op.
    pub fn on_modified<W: Workspace>(&mut self, ws: &mut W, id: ViewId) -> bool {
        if self.stamping {
            trace!(target: "actions.plugin", view = %id, "modified_while_stamping");
            return false;
        }
        let Some(view) = ws.view_mut(id) else {
            return false;
        };
        if view.name() != self.settings.buffer_name {
            return false;
        }
        let Some(extent) = last_nonempty_line(view) else {
            return false;
        };
        let footer = view.substr(extent);
        if !is_footer_line(&footer) {
            return false;
        }
        if self.state.last_stamp().is_some_and(|s| footer.contains(s)) {
            return false;
        }

        self.stamping = true;
        let snapshot = parse_last_block(&view.text(), self.settings.path_style).unwrap_or_default();
        self.state.set_original(snapshot);
        let stamp = (self.clock)();
        {
            let mut tx = EditTransaction::begin(view);
            tx.replace(extent, &format!("{footer} @ {stamp}"));
        }
        info!(target: "actions.plugin", view = %id, %stamp, "footer_stamped");
        self.state.set_last_stamp(stamp);
        self.stamping = false;
        true
    }

    /// React to view `id` finishing its load. Once every pending file has
    /// loaded the pending changes are applied; the returned events are the
    /// follow-up commands of that drain.
    pub fn on_load<W: Workspace>(&mut self, ws: &mut W, id: ViewId) -> Vec<Event> {
        if self.state.pending().is_empty() {
            return Vec::new();
        }
        let Some(path) = ws.view(id).and_then(|v| v.path()).map(Path::to_path_buf) else {
            debug!(target: "actions.plugin", view = %id, "load_without_path");
            return Vec::new();
        };
        match self.state.record_load(&path, id) {
            LoadProgress::Ready => self.execute_pending_changes(ws).follow_ups,
            LoadProgress::Waiting { loaded, pending } => {
                debug!(target: "actions.plugin", file = %path.display(), loaded, pending, "waiting_for_loads");
                Vec::new()
            }
            LoadProgress::Ignored => Vec::new(),
        }
    }
}
