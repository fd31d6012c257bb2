//! Dispatcher routing host events to the Find Results plugin.
//!
//! Sub-modules:
//! * `listener` - buffer-modified (baseline capture, footer stamping) and
//!   buffer-loaded (pending drain) handlers
//! * `command`  - ReplaceChanges and SaveAndClose
//!
//! Events are handled one at a time. A handler never blocks on the host:
//! work that depends on a later host callback is left in the session state,
//! and follow-up commands are returned for the caller to queue.

use core_events::{CommandEvent, Event, EventHooks, EventQueue};
use core_host::Workspace;
use tracing::{debug, error};

use crate::FindResultsPlugin;

mod command;
mod listener;

pub use command::{DrainReport, ReplaceOutcome, ReplaceSummary};

/// Result of dispatching a single `Event`.
#[derive(Debug, Default)]
pub struct DispatchResult {
    /// Events to queue behind the current one.
    pub follow_ups: Vec<Event>,
    /// Set for ReplaceChanges commands.
    pub outcome: Option<ReplaceOutcome>,
}

/// Handle one event.
pub fn dispatch<W: Workspace>(
    plugin: &mut FindResultsPlugin,
    ws: &mut W,
    event: &Event,
    hooks: &dyn EventHooks,
) -> DispatchResult {
    hooks.pre_handle(event);
    let result = match event {
        Event::BufferModified(id) => {
            plugin.on_modified(ws, *id);
            DispatchResult::default()
        }
        Event::BufferLoaded(id) => DispatchResult {
            follow_ups: plugin.on_load(ws, *id),
            outcome: None,
        },
        Event::Command(CommandEvent::ReplaceChanges { save_and_close }) => DispatchResult {
            follow_ups: Vec::new(),
            outcome: Some(plugin.replace_changes(ws, *save_and_close)),
        },
        Event::Command(CommandEvent::SaveAndClose(id)) => {
            if let Err(err) = plugin.save_and_close(ws, *id) {
                error!(target: "actions.plugin", view = %id, error = %err, "save_and_close_failed");
            }
            DispatchResult::default()
        }
    };
    hooks.post_handle(event);
    result
}

/// Deliver queued events, and events the host raises while handling them,
/// until both are exhausted. Host events are queued behind the follow-ups of
/// the event that caused them. Returns the ReplaceChanges outcomes in order.
pub fn run_until_idle<W: Workspace>(
    plugin: &mut FindResultsPlugin,
    ws: &mut W,
    queue: &mut EventQueue,
    hooks: &dyn EventHooks,
) -> Vec<ReplaceOutcome> {
    let mut outcomes = Vec::new();
    let mut handled = 0usize;
    loop {
        queue.extend(ws.poll_events());
        let Some(event) = queue.pop() else {
            break;
        };
        let result = dispatch(plugin, ws, &event, hooks);
        queue.extend(result.follow_ups);
        outcomes.extend(result.outcome);
        handled += 1;
    }
    debug!(target: "runtime.events", handled, "queue_idle");
    outcomes
}
