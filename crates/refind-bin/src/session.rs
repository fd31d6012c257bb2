//! Simulated editor session behind `refind apply`.
//!
//! The baseline report is typed into a "Find Results" buffer (the listener
//! captures it and stamps the footer), the buffer is then rewritten with the
//! edited report and ReplaceChanges is run. Files come from disk through
//! `DiskStorage`; the loads the host reports are pumped through the event
//! queue like any other callback.

use anyhow::{Context, Result};
use core_actions::{FindResultsPlugin, PluginSettings, ReplaceOutcome, run_until_idle};
use core_config::Config;
use core_events::{CommandEvent, Event, EventQueue, TracingEventHooks};
use core_host::memory::{DiskStorage, MemoryWorkspace};
use core_host::{BufferView, Workspace};
use core_results::grammar::is_footer_line;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone, Default)]
pub struct ApplyRequest {
    pub baseline: String,
    pub edited: String,
    /// `None` defers to the configured default.
    pub save_and_close: Option<bool>,
    /// Files open before the command runs.
    pub open: Vec<PathBuf>,
    /// Write every changed buffer at the end.
    pub write: bool,
}

#[derive(Debug)]
pub struct ApplyRun {
    pub outcomes: Vec<ReplaceOutcome>,
    pub written: usize,
}

/// Replace the edited report's footer with the live (stamped) one, as an
/// editor user only touches result rows.
pub fn carry_footer(edited: &str, live: &str) -> String {
    let Some(stamped) = live.lines().rev().find(|l| !l.is_empty()) else {
        return edited.to_string();
    };
    if !is_footer_line(stamped) {
        return edited.to_string();
    }
    let body = edited.trim_end_matches('\n');
    let tail = &edited[body.len()..];
    let start = body.rfind('\n').map_or(0, |i| i + 1);
    if !is_footer_line(&body[start..]) {
        return edited.to_string();
    }
    format!("{}{}{}", &body[..start], stamped, tail)
}

pub fn run_apply(cfg: &Config, request: &ApplyRequest) -> Result<ApplyRun> {
    let mut plugin = FindResultsPlugin::new(PluginSettings::from_config(cfg));
    let mut ws = MemoryWorkspace::new(DiskStorage);
    let mut queue = EventQueue::new();
    let hooks = TracingEventHooks;

    for path in &request.open {
        ws.open_loaded(path)
            .with_context(|| format!("opening {}", path.display()))?;
    }

    let name = plugin.settings().buffer_name.clone();
    let results = ws.add_scratch(&name, "");
    ws.view_mut(results)
        .context("results view missing")?
        .set_text(&request.baseline);
    run_until_idle(&mut plugin, &mut ws, &mut queue, &hooks);

    let live = ws.view(results).context("results view missing")?.text();
    let edited = carry_footer(&request.edited, &live);
    ws.view_mut(results)
        .context("results view missing")?
        .set_text(&edited);
    run_until_idle(&mut plugin, &mut ws, &mut queue, &hooks);

    queue.push(Event::Command(CommandEvent::ReplaceChanges {
        save_and_close: request.save_and_close,
    }));
    let outcomes = run_until_idle(&mut plugin, &mut ws, &mut queue, &hooks);

    let written = if request.write { ws.save_all()? } else { 0 };
    info!(target: "runtime", outcomes = outcomes.len(), written, "apply_finished");
    Ok(ApplyRun { outcomes, written })
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_results::{render, search_texts};
    use pretty_assertions::assert_eq;
    use std::path::Path;

    fn report_for(path: &Path, text: &str, query: &str) -> String {
        render(&search_texts(query, [(path.to_path_buf(), text)], 0))
    }

    #[test]
    fn carry_footer_swaps_last_line() {
        let edited = "Searching 1 files for \"a\"\n\n/x:\n    1: b\n\n1 match in 1 file\n";
        let live = "Searching 1 files for \"a\"\n\n/x:\n    1: a\n\n1 match in 1 file @ T\n";
        assert_eq!(
            carry_footer(edited, live),
            "Searching 1 files for \"a\"\n\n/x:\n    1: b\n\n1 match in 1 file @ T\n"
        );
        assert_eq!(carry_footer("no footer\n", live), "no footer\n");
        assert_eq!(carry_footer(edited, "plain"), edited);
    }

    #[test]
    fn apply_writes_changed_lines_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("src.txt");
        std::fs::write(&path, "alpha\nbeta\ngamma\n").unwrap();
        let baseline = report_for(&path, "alpha\nbeta\ngamma\n", "beta");

        let request = ApplyRequest {
            edited: baseline.replace(": beta", ": BETA"),
            baseline,
            write: true,
            ..ApplyRequest::default()
        };
        let run = run_apply(&Config::default(), &request).unwrap();
        assert!(matches!(run.outcomes.as_slice(), [ReplaceOutcome::Replaced(_)]));
        assert_eq!(run.written, 1);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "alpha\nBETA\ngamma\n");
    }

    #[test]
    fn apply_without_write_leaves_disk_alone() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("src.txt");
        std::fs::write(&path, "one\r\ntwo\r\n").unwrap();
        let baseline = report_for(&path, "one\ntwo\n", "two");
        let request = ApplyRequest {
            edited: baseline.replace(": two", ": 2"),
            baseline,
            open: vec![path.clone()],
            ..ApplyRequest::default()
        };
        let run = run_apply(&Config::default(), &request).unwrap();
        assert_eq!(run.written, 0);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "one\r\ntwo\r\n");
    }

    #[test]
    fn save_and_close_restores_line_endings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("src.txt");
        std::fs::write(&path, "one\r\ntwo\r\n").unwrap();
        let baseline = report_for(&path, "one\ntwo\n", "two");
        let request = ApplyRequest {
            edited: baseline.replace(": two", ": 2"),
            baseline,
            save_and_close: Some(true),
            ..ApplyRequest::default()
        };
        let run = run_apply(&Config::default(), &request).unwrap();
        let ReplaceOutcome::Replaced(summary) = &run.outcomes[0] else {
            panic!("expected Replaced, got {:?}", run.outcomes);
        };
        assert_eq!(summary.pending, vec![path.clone()]);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "one\r\n2\r\n");
    }

    #[test]
    fn unchanged_report_reports_no_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("src.txt");
        std::fs::write(&path, "x\n").unwrap();
        let baseline = report_for(&path, "x\n", "x");
        let request = ApplyRequest {
            edited: baseline.clone(),
            baseline,
            ..ApplyRequest::default()
        };
        let run = run_apply(&Config::default(), &request).unwrap();
        assert_eq!(run.outcomes, vec![ReplaceOutcome::NoChanges]);
    }
}
