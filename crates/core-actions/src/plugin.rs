//! The Find Results plugin object.
//!
//! `FindResultsPlugin` owns the session state and reacts to host callbacks.
//! The handlers themselves live in the dispatcher submodules; this module
//! holds configuration, the stamp clock and the read-only queries.

use core_config::Config;
use core_host::{BufferView, RegionStyle, Workspace};
use core_results::{Location, PathStyle, locate};
use core_state::FindResultsState;

use crate::ViewId;

/// Produces the footer stamp written after a search is captured.
pub type StampClock = Box<dyn FnMut() -> String>;

/// Local time with microseconds, e.g. `2024-03-01 09:12:44.120391`.
pub fn local_timestamp() -> String {
    chrono::Local::now()
        .format("%Y-%m-%d %H:%M:%S%.6f")
        .to_string()
}

#[derive(Debug, Clone)]
pub struct PluginSettings {
    /// Display name of the results buffer.
    pub buffer_name: String,
    pub path_style: PathStyle,
    /// Used when `ReplaceChanges` does not say.
    pub save_and_close: bool,
    pub annotation_key: String,
    pub region_style: RegionStyle,
}

impl Default for PluginSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl PluginSettings {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            buffer_name: cfg.buffer_name().to_string(),
            path_style: cfg.path_style(),
            save_and_close: cfg.save_and_close(),
            annotation_key: cfg.annotation_key().to_string(),
            region_style: RegionStyle::bookmark(),
        }
    }
}

pub struct FindResultsPlugin {
    pub(crate) settings: PluginSettings,
    pub(crate) state: FindResultsState,
    /// Set while the plugin rewrites the footer itself.
    pub(crate) stamping: bool,
    pub(crate) clock: StampClock,
}

impl std::fmt::Debug for FindResultsPlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FindResultsPlugin")
            .field("settings", &self.settings)
            .field("state", &self.state)
            .field("stamping", &self.stamping)
            .finish()
    }
}

impl FindResultsPlugin {
    pub fn new(settings: PluginSettings) -> Self {
        Self {
            settings,
            state: FindResultsState::new(),
            stamping: false,
            clock: Box::new(local_timestamp),
        }
    }

    /// Replace the stamp source (tests use a counter).
    pub fn with_clock(mut self, clock: impl FnMut() -> String + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn settings(&self) -> &PluginSettings {
        &self.settings
    }

    pub fn state(&self) -> &FindResultsState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut FindResultsState {
        &mut self.state
    }

    pub fn is_results_view<V: BufferView + ?Sized>(&self, view: &V) -> bool {
        view.name() == self.settings.buffer_name
    }

    /// Whether `ReplaceChanges` is enabled: the active view is the results buffer.
    pub fn is_enabled<W: Workspace>(&self, ws: &W) -> bool {
        ws.active_view()
            .and_then(|id| ws.view(id))
            .is_some_and(|v| self.is_results_view(v))
    }

    /// The `path:line` under `offset` in the results view `id`.
    pub fn location_at<W: Workspace>(&self, ws: &W, id: ViewId, offset: usize) -> Option<Location> {
        let view = ws.view(id)?;
        if !self.is_results_view(view) {
            return None;
        }
        locate(&view.text(), offset, self.settings.path_style)
    }
}
