//! Find Results edit propagation.
//!
//! Edits made to rows of a "Find Results" buffer are written back to the
//! files they came from:
//! - [`apply`] rewrites changed lines of one file buffer and marks them.
//! - [`FindResultsPlugin`] holds the session state and handles host
//!   callbacks: baseline capture when a search lands, ReplaceChanges,
//!   deferred application once pending files load, SaveAndClose.
//! - [`dispatch`] / [`run_until_idle`] route [`core_events::Event`]s to it.

pub mod apply;
mod dispatcher;
pub mod plugin;

pub use apply::apply_changes;
pub use core_host::ViewId;
pub use dispatcher::{
    DispatchResult, DrainReport, ReplaceOutcome, ReplaceSummary, dispatch, run_until_idle,
};
pub use plugin::{FindResultsPlugin, PluginSettings, StampClock, local_timestamp};
