//! Commands: ReplaceChanges and its SaveAndClose follow-up.

use std::path::{Path, PathBuf};

use core_events::{CommandEvent, Event};
use core_host::{BufferView, HostError, Workspace};
use core_results::{diff, parse_last_block};
use tracing::{debug, error, info, warn};

use crate::apply::apply_changes;
use crate::{FindResultsPlugin, ViewId};

/// What one ReplaceChanges invocation did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplaceOutcome {
    /// The active view is not the results buffer.
    NotEnabled,
    /// The results buffer holds no complete block.
    NoResults,
    NoChanges,
    Replaced(ReplaceSummary),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplaceSummary {
    /// Files that were already open and were changed immediately.
    pub applied: Vec<PathBuf>,
    /// Files requested to open; their changes wait for the loads.
    pub pending: Vec<PathBuf>,
    /// Files the host failed to open; their changes are dropped.
    pub failed: Vec<PathBuf>,
    pub changed_lines: usize,
    /// Regions marked in the immediately applied files.
    pub marked_regions: usize,
}

/// Result of draining pending changes.
#[derive(Debug, Default)]
pub struct DrainReport {
    pub applied: Vec<PathBuf>,
    pub marked_regions: usize,
    /// SaveAndClose commands when the operation asked for them.
    pub follow_ups: Vec<Event>,
}

impl FindResultsPlugin {
    /// Push edits made in the active results buffer back to their files.
    ///
    /// The buffer's last block is diffed against the baseline. Files already
    /// open are changed now; the rest are buffered as pending and requested
    /// from the host, to be applied once all of them report loaded. The
    /// current block becomes the new baseline.
    pub fn replace_changes<W: Workspace>(
        &mut self,
        ws: &mut W,
        save_and_close: Option<bool>,
    ) -> ReplaceOutcome {
        let save_and_close = save_and_close.unwrap_or(self.settings.save_and_close);
        let Some(text) = ws
            .active_view()
            .and_then(|id| ws.view(id))
            .filter(|v| self.is_results_view(*v))
            .map(|v| v.text())
        else {
            debug!(target: "actions.plugin", "replace_not_enabled");
            return ReplaceOutcome::NotEnabled;
        };

        self.state.begin_replace(save_and_close);

        let Some(current) = parse_last_block(&text, self.settings.path_style) else {
            info!(target: "actions.plugin", "no_results_block");
            return ReplaceOutcome::NoResults;
        };
        let changes = diff(self.state.original(), &current);
        if changes.is_empty() {
            info!(target: "actions.plugin", "no_changes_found");
            return ReplaceOutcome::NoChanges;
        }

        let mut summary = ReplaceSummary {
            changed_lines: changes.line_count(),
            ..ReplaceSummary::default()
        };
        for (path, lines) in &changes {
            if let Some(id) = ws.find_open(path)
                && let Some(view) = ws.view_mut(id)
            {
                let marked = apply_changes(
                    view,
                    lines,
                    &self.settings.annotation_key,
                    &self.settings.region_style,
                );
                summary.marked_regions += marked.len();
                summary.applied.push(path.clone());
            } else {
                self.state.pending_mut().add_file(path.clone(), lines.clone());
            }
        }

        let to_open: Vec<PathBuf> = self.state.pending().paths().map(Path::to_path_buf).collect();
        for path in to_open {
            match ws.open_file(&path) {
                Ok(id) => {
                    debug!(target: "actions.plugin", file = %path.display(), view = %id, "open_requested");
                    summary.pending.push(path);
                }
                Err(err) => {
                    error!(target: "actions.plugin", file = %path.display(), error = %err, "open_failed");
                    self.state.abandon_file(&path);
                    summary.failed.push(path);
                }
            }
        }

        self.state.set_original(current);
        info!(
            target: "actions.plugin",
            lines = summary.changed_lines,
            applied = summary.applied.len(),
            pending = summary.pending.len(),
            failed = summary.failed.len(),
            save_and_close,
            "replace_changes_done"
        );
        ReplaceOutcome::Replaced(summary)
    }

    /// Apply every pending file's changes once all of them have loaded. Runs
    /// at most once per ReplaceChanges: the pending files are taken out.
    pub fn execute_pending_changes<W: Workspace>(&mut self, ws: &mut W) -> DrainReport {
        let Some(drain) = self.state.take_drain() else {
            return DrainReport::default();
        };
        let mut report = DrainReport::default();
        for (path, file) in &drain.files {
            let Some(id) = file.view else {
                warn!(target: "actions.plugin", file = %path.display(), "pending_without_view");
                continue;
            };
            let Some(view) = ws.view_mut(id) else {
                error!(target: "actions.plugin", file = %path.display(), error = %HostError::UnknownView(id), "drain_view_missing");
                continue;
            };
            let marked = apply_changes(
                view,
                &file.changes,
                &self.settings.annotation_key,
                &self.settings.region_style,
            );
            report.marked_regions += marked.len();
            report.applied.push(path.clone());
        }
        if drain.save_and_close {
            report.follow_ups = drain
                .files
                .values()
                .filter_map(|f| f.view)
                .map(|id| Event::Command(CommandEvent::SaveAndClose(id)))
                .collect();
        }
        info!(
            target: "actions.plugin",
            files = report.applied.len(),
            regions = report.marked_regions,
            follow_ups = report.follow_ups.len(),
            "pending_changes_executed"
        );
        report
    }

    /// Save view `id`, then focus and close it.
    pub fn save_and_close<W: Workspace>(&self, ws: &mut W, id: ViewId) -> Result<(), HostError> {
        ws.save(id)?;
        ws.focus(id)?;
        ws.close(id)?;
        info!(target: "actions.plugin", view = %id, "saved_and_closed");
        Ok(())
    }
}
