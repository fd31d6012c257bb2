//! Host event vocabulary for the Find Results plugin.
//!
//! The host editor delivers callbacks serially: a buffer was modified, a
//! buffer finished loading, or a command was invoked. Handlers never block;
//! follow-up work (saving and closing drained buffers) is pushed back onto
//! the same queue instead of being run inline.

use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

// -------------------------------------------------------------------------------------------------
// Telemetry
// -------------------------------------------------------------------------------------------------
// Relaxed counters, inspected by tests and logged by the binary at exit.
// -------------------------------------------------------------------------------------------------
pub static EVENTS_QUEUED: AtomicU64 = AtomicU64::new(0);
pub static EVENTS_DISPATCHED: AtomicU64 = AtomicU64::new(0);
pub static LOAD_SIGNALS: AtomicU64 = AtomicU64::new(0);
pub static MODIFIED_SIGNALS: AtomicU64 = AtomicU64::new(0);

/// Opaque handle of a host buffer view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ViewId(pub u64);

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "view#{}", self.0)
    }
}

/// Top-level event consumed by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Text of a view changed (user edit or programmatic replace).
    BufferModified(ViewId),
    /// A view requested via `open_file` finished loading its file.
    BufferLoaded(ViewId),
    Command(CommandEvent),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandEvent {
    /// Push edits made in the results buffer back to their files. `None`
    /// uses the configured default for saving and closing drained files.
    ReplaceChanges { save_and_close: Option<bool> },
    /// Save the view's buffer, then close it.
    SaveAndClose(ViewId),
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::BufferModified(_) => "buffer_modified",
            Event::BufferLoaded(_) => "buffer_loaded",
            Event::Command(CommandEvent::ReplaceChanges { .. }) => "replace_changes",
            Event::Command(CommandEvent::SaveAndClose(_)) => "save_and_close",
        }
    }
}

/// Optional hooks observing events at the dispatch boundary. Must not block.
pub trait EventHooks {
    fn pre_handle(&self, _event: &Event) {}
    fn post_handle(&self, _event: &Event) {}
}

/// Default no-op hooks implementation.
pub struct NoopEventHooks;

impl EventHooks for NoopEventHooks {}

/// Hooks that trace every event under the `runtime.events` target.
pub struct TracingEventHooks;

impl EventHooks for TracingEventHooks {
    fn pre_handle(&self, event: &Event) {
        tracing::debug!(target: "runtime.events", event = event.name(), ?event, "event_begin");
    }
    fn post_handle(&self, event: &Event) {
        tracing::trace!(target: "runtime.events", event = event.name(), "event_end");
    }
}

/// FIFO of host events delivered one at a time.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: VecDeque<Event>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: Event) {
        let signal = match &event {
            Event::BufferLoaded(_) => Some(&LOAD_SIGNALS),
            Event::BufferModified(_) => Some(&MODIFIED_SIGNALS),
            Event::Command(_) => None,
        };
        if let Some(counter) = signal {
            counter.fetch_add(1, Ordering::Relaxed);
        }
        EVENTS_QUEUED.fetch_add(1, Ordering::Relaxed);
        self.events.push_back(event);
    }

    pub fn pop(&mut self) -> Option<Event> {
        let ev = self.events.pop_front();
        if ev.is_some() {
            EVENTS_DISPATCHED.fetch_add(1, Ordering::Relaxed);
        }
        ev
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl Extend<Event> for EventQueue {
    fn extend<T: IntoIterator<Item = Event>>(&mut self, iter: T) {
        for ev in iter {
            self.push(ev);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_is_fifo() {
        let mut q = EventQueue::new();
        q.push(Event::BufferLoaded(ViewId(1)));
        q.extend([
            Event::BufferModified(ViewId(2)),
            Event::Command(CommandEvent::SaveAndClose(ViewId(1))),
        ]);
        assert_eq!(q.len(), 3);
        assert_eq!(q.pop(), Some(Event::BufferLoaded(ViewId(1))));
        assert_eq!(q.pop(), Some(Event::BufferModified(ViewId(2))));
        assert_eq!(
            q.pop().map(|e| e.name()),
            Some("save_and_close")
        );
        assert!(q.pop().is_none());
        assert!(q.is_empty());
    }

    #[test]
    fn counters_advance() {
        let before = LOAD_SIGNALS.load(Ordering::Relaxed);
        let mut q = EventQueue::new();
        q.push(Event::BufferLoaded(ViewId(9)));
        assert!(LOAD_SIGNALS.load(Ordering::Relaxed) > before);
    }

    #[test]
    fn view_id_display() {
        assert_eq!(ViewId(7).to_string(), "view#7");
    }
}
