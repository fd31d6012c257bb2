#![allow(dead_code)] // Shared across integration tests; each test binary uses a subset of helpers.

use core_actions::{FindResultsPlugin, PluginSettings, ReplaceOutcome, ViewId, run_until_idle};
use core_events::{CommandEvent, Event, EventHooks, EventQueue, NoopEventHooks};
use core_host::Workspace;
use core_host::memory::{MemoryStorage, MemoryWorkspace, TextView};
use core_results::PathStyle;
use std::path::Path;

pub const KEY: &str = "FindResultsReplaceChanges";

pub const REPORT: &str = "Searching 12 files for \"foo\"\n\n/a/b.txt:\n    3: foo bar\n    5: foo baz\n\n/c/d.txt:\n    1: foo\n\n3 matches across 2 files\n";

pub const B_TXT: &str = "zero\none\nfoo bar\nthree\nfoo baz\n";
pub const D_TXT: &str = "foo\nbar\n";

pub fn storage() -> MemoryStorage {
    let mut s = MemoryStorage::new();
    s.insert("/a/b.txt", B_TXT);
    s.insert("/c/d.txt", D_TXT);
    s
}

/// Plugin with POSIX paths and a deterministic `stamp-N` clock.
pub fn plugin() -> FindResultsPlugin {
    let mut n = 0u32;
    FindResultsPlugin::new(PluginSettings {
        path_style: PathStyle::Posix,
        ..PluginSettings::default()
    })
    .with_clock(move || {
        n += 1;
        format!("stamp-{n}")
    })
}

/// An editor session: workspace, plugin and the serial event queue.
pub struct Session {
    pub plugin: FindResultsPlugin,
    pub ws: MemoryWorkspace<MemoryStorage>,
    pub queue: EventQueue,
    pub results: Option<ViewId>,
}

impl Session {
    pub fn new(storage: MemoryStorage) -> Self {
        Self {
            plugin: plugin(),
            ws: MemoryWorkspace::new(storage),
            queue: EventQueue::new(),
            results: None,
        }
    }

    pub fn pump(&mut self) -> Vec<ReplaceOutcome> {
        run_until_idle(&mut self.plugin, &mut self.ws, &mut self.queue, &NoopEventHooks)
    }

    pub fn pump_with(&mut self, hooks: &dyn EventHooks) -> Vec<ReplaceOutcome> {
        run_until_idle(&mut self.plugin, &mut self.ws, &mut self.queue, hooks)
    }

    /// Put `text` into the results buffer (creating it) and let listeners run.
    pub fn show_results(&mut self, text: &str) -> ViewId {
        let id = match self.results {
            Some(id) => id,
            None => {
                let id = self.ws.add_scratch("Find Results", "");
                self.results = Some(id);
                id
            }
        };
        self.results_view_mut().set_text(text);
        self.ws.focus(id).unwrap();
        self.pump();
        id
    }

    /// Rewrite the results buffer like a user typing into it.
    pub fn edit_results(&mut self, edit: impl FnOnce(&str) -> String) {
        let current = self.results_text();
        self.results_view_mut().set_text(&edit(&current));
        self.pump();
    }

    pub fn replace(&mut self, save_and_close: Option<bool>) -> ReplaceOutcome {
        self.queue
            .push(Event::Command(CommandEvent::ReplaceChanges { save_and_close }));
        let mut outcomes = self.pump();
        assert_eq!(outcomes.len(), 1);
        outcomes.remove(0)
    }

    pub fn results_text(&self) -> String {
        let id = self.results.unwrap();
        core_host::BufferView::text(self.ws.view(id).unwrap())
    }

    pub fn results_view_mut(&mut self) -> &mut TextView {
        let id = self.results.unwrap();
        self.ws.view_mut(id).unwrap()
    }

    pub fn file_view(&self, path: &str) -> Option<&TextView> {
        let id = self.ws.find_open(Path::new(path))?;
        self.ws.view(id)
    }

    pub fn file_text(&self, path: &str) -> Option<String> {
        self.file_view(path).map(core_host::BufferView::text)
    }
}
