//! Linear undo history of executed commands.
//!
//! `commands[..index]` have been applied to the timeline, `commands[index..]`
//! are undone and available for redo. Pushing a new command discards the redo
//! tail. There is no branching.

use core_config::{Config, DEFAULT_HISTORY_LIMIT};
use core_events::{EventSink, NoopEventSink, TimelineEvent};
use core_state::{EditError, TimelineState};
use std::fmt;
use tracing::{debug, trace, warn};

use crate::{Command, EditCommand};

pub struct History {
    commands: Vec<EditCommand>,
    index: usize,
    /// Maximum number of entries kept; 0 keeps everything.
    limit: usize,
    sink: Box<dyn EventSink>,
}

impl fmt::Debug for History {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("History")
            .field("len", &self.commands.len())
            .field("index", &self.index)
            .field("limit", &self.limit)
            .finish_non_exhaustive()
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_HISTORY_LIMIT)
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            commands: Vec::new(),
            index: 0,
            limit,
            sink: Box::new(NoopEventSink),
        }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self::with_limit(cfg.history().limit)
    }

    pub fn with_sink(mut self, sink: Box<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Execute `command` and record it, folding it into the top entry when
    /// the two merge. On failure the timeline and the history are unchanged.
    pub fn push(
        &mut self,
        state: &mut TimelineState,
        mut command: EditCommand,
    ) -> Result<(), EditError> {
        let text = command.text();
        if let Err(err) = command.redo(state) {
            warn!(target: "history", text, error = %err, "push_failed");
            self.sink.emit(TimelineEvent::EditFailed {
                text: text.to_string(),
                reason: err.to_string(),
            });
            return Err(err);
        }

        if self.index < self.commands.len() {
            trace!(target: "history", discarded = self.commands.len() - self.index, "redo_tail_discarded");
            self.commands.truncate(self.index);
        }

        let merged = self
            .commands
            .last()
            .and_then(|top| top.merge(&command));
        if let Some(merged) = merged {
            if let Some(top) = self.commands.last_mut() {
                *top = merged;
            }
            trace!(target: "history", text, index = self.index, "merged");
            self.sink.emit(TimelineEvent::Merged {
                text: text.to_string(),
                index: self.index,
            });
        } else {
            self.commands.push(command);
            if self.limit > 0 && self.commands.len() > self.limit {
                let evicted = self.commands.len() - self.limit;
                self.commands.drain(..evicted);
                trace!(target: "history", evicted, "history_trimmed");
            }
            self.index = self.commands.len();
            debug!(target: "history", text, depth = self.index, "pushed");
            self.sink.emit(TimelineEvent::Pushed {
                text: text.to_string(),
                index: self.index,
            });
        }
        self.notify_top();
        Ok(())
    }

    /// Undo the most recent applied command. `Ok(false)` when there is none.
    pub fn undo(&mut self, state: &mut TimelineState) -> Result<bool, EditError> {
        let Some(at) = self.index.checked_sub(1) else {
            return Ok(false);
        };
        let command = &mut self.commands[at];
        let text = command.text();
        if let Err(err) = command.undo(state) {
            warn!(target: "history", text, error = %err, "undo_failed");
            self.sink.emit(TimelineEvent::EditFailed {
                text: text.to_string(),
                reason: err.to_string(),
            });
            return Err(err);
        }
        self.index = at;
        debug!(target: "history", text, depth = self.index, "undone");
        self.sink.emit(TimelineEvent::Undone {
            text: text.to_string(),
            index: self.index,
        });
        if let Some(event) = self.commands[at].notification() {
            self.sink.emit(event);
        }
        Ok(true)
    }

    /// Re-apply the next undone command. `Ok(false)` when there is none.
    pub fn redo(&mut self, state: &mut TimelineState) -> Result<bool, EditError> {
        let at = self.index;
        let Some(command) = self.commands.get_mut(at) else {
            return Ok(false);
        };
        let text = command.text();
        if let Err(err) = command.redo(state) {
            warn!(target: "history", text, error = %err, "redo_failed");
            self.sink.emit(TimelineEvent::EditFailed {
                text: text.to_string(),
                reason: err.to_string(),
            });
            return Err(err);
        }
        self.index = at + 1;
        debug!(target: "history", text, depth = self.index, "redone");
        self.sink.emit(TimelineEvent::Redone {
            text: text.to_string(),
            index: self.index,
        });
        self.notify_top();
        Ok(true)
    }

    fn notify_top(&mut self) {
        let event = self
            .index
            .checked_sub(1)
            .and_then(|i| self.commands.get(i))
            .and_then(Command::notification);
        if let Some(event) = event {
            self.sink.emit(event);
        }
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index < self.commands.len()
    }

    pub fn undo_text(&self) -> Option<&'static str> {
        self.index
            .checked_sub(1)
            .and_then(|i| self.commands.get(i))
            .map(Command::text)
    }

    pub fn redo_text(&self) -> Option<&'static str> {
        self.commands.get(self.index).map(Command::text)
    }

    /// Number of applied commands.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Entry at `index`, oldest first.
    pub fn command(&self, index: usize) -> Option<&EditCommand> {
        self.commands.get(index)
    }

    /// Forget every entry. The timeline is left as it is.
    pub fn clear(&mut self) {
        self.commands.clear();
        self.index = 0;
        trace!(target: "history", "cleared");
    }
}
