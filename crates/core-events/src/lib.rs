//! Timeline notifications emitted by the command history.
//!
//! Commands never broadcast on their own. After every successful push,
//! merge, undo or redo the history emits a `TimelineEvent` into the
//! `EventSink` it was built with, followed by whatever notification the
//! command itself exposes (e.g. a blend mode change). UI layers subscribe by
//! supplying a sink; the crossbeam channel impl lets another thread drain
//! events without polling the model.

use std::sync::atomic::{AtomicU64, Ordering};

// -------------------------------------------------------------------------------------------------
// Telemetry
// -------------------------------------------------------------------------------------------------
// Relaxed counters, inspected by tests and periodic logging only.
pub static CHANNEL_SEND_FAILURES: AtomicU64 = AtomicU64::new(0);
pub static EVENTS_EMITTED: AtomicU64 = AtomicU64::new(0);

/// Notification describing a completed history transition.
#[derive(Debug, Clone, PartialEq)]
pub enum TimelineEvent {
    /// A new command was executed and appended.
    Pushed { text: String, index: usize },
    /// A command was executed and folded into the top entry.
    Merged { text: String, index: usize },
    Undone { text: String, index: usize },
    Redone { text: String, index: usize },
    /// Redo of a newly pushed command failed; history unchanged.
    EditFailed { text: String, reason: String },
    /// A transition's blend mode changed (after redo or undo).
    BlendModeChanged {
        track: usize,
        transition: usize,
        mode: String,
    },
    /// The track list changed shape (added, removed, moved).
    TracksChanged { count: usize },
}

/// Receiver of timeline notifications. Implementations must not block.
pub trait EventSink {
    fn emit(&mut self, event: TimelineEvent);
}

/// Default sink discarding every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopEventSink;

impl EventSink for NoopEventSink {
    fn emit(&mut self, _event: TimelineEvent) {}
}

/// In-memory sink, mostly useful for tests and scripted sessions.
#[derive(Debug, Default, Clone)]
pub struct EventLog {
    events: Vec<TimelineEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn events(&self) -> &[TimelineEvent] {
        &self.events
    }
    pub fn drain(&mut self) -> Vec<TimelineEvent> {
        std::mem::take(&mut self.events)
    }
}

impl EventSink for EventLog {
    fn emit(&mut self, event: TimelineEvent) {
        EVENTS_EMITTED.fetch_add(1, Ordering::Relaxed);
        self.events.push(event);
    }
}

impl EventSink for crossbeam_channel::Sender<TimelineEvent> {
    fn emit(&mut self, event: TimelineEvent) {
        match self.try_send(event) {
            Ok(()) => {
                EVENTS_EMITTED.fetch_add(1, Ordering::Relaxed);
            }
            Err(err) => {
                CHANNEL_SEND_FAILURES.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(target: "events", disconnected = err.is_disconnected(), "event_send_failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_collects_in_order() {
        let mut log = EventLog::new();
        log.emit(TimelineEvent::TracksChanged { count: 1 });
        log.emit(TimelineEvent::TracksChanged { count: 2 });
        assert_eq!(log.events().len(), 2);
        assert_eq!(log.drain()[1], TimelineEvent::TracksChanged { count: 2 });
        assert!(log.events().is_empty());
    }

    #[test]
    fn channel_sink_delivers_and_counts_failures() {
        let (mut tx, rx) = crossbeam_channel::bounded::<TimelineEvent>(1);
        tx.emit(TimelineEvent::TracksChanged { count: 3 });
        assert_eq!(
            rx.try_recv().unwrap(),
            TimelineEvent::TracksChanged { count: 3 }
        );
        let before = CHANNEL_SEND_FAILURES.load(Ordering::Relaxed);
        drop(rx);
        tx.emit(TimelineEvent::TracksChanged { count: 4 });
        assert!(CHANNEL_SEND_FAILURES.load(Ordering::Relaxed) > before);
    }
}
