//! Reversible edit commands and the undo history that drives them.
//!
//! Every timeline mutation is an `EditCommand`. A command is constructed
//! against the current `TimelineState` (capturing edit settings such as the
//! ripple modes), pushed into a `History`, which runs its first `redo`, and
//! afterwards flipped back and forth by `undo` / `redo` any number of times.
//!
//! Structural commands (anything that adds, removes or resizes entries) keep
//! an `UndoHelper` and reverse themselves by snapshot restore. Scalar property
//! commands (fades, gain, flags, names) store the previous value directly.
//!
//! Merging:
//! - Commands exposing a `MergeId` may fold into the history's top entry when
//!   the next command has the same id and target (continuous drags).
//! - `EditCommand::merge` is pure: it returns the combined command or `None`
//!   and never touches the timeline. The history replaces its top entry with
//!   the result only after the new command's redo has succeeded.

use core_events::TimelineEvent;
use core_state::{EditError, TimelineState};

pub mod command;
mod edit;
pub mod groups;
pub mod history;
pub mod ripple;

pub use command::EditCommand;
pub use history::History;

/// Merge family of a command. Two commands can only merge when their ids are
/// equal; the command-specific `merge` then checks target and adjacency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MergeId {
    TrimClipIn,
    TrimClipOut,
    FadeIn,
    FadeOut,
    TrimTransitionIn,
    TrimTransitionOut,
    AddTransitionByTrimIn,
    AddTransitionByTrimOut,
    MoveClip,
    ChangeGain,
}

/// Uniform capability shared by every command kind.
pub trait Command {
    /// Apply (or re-apply) the edit. On error the timeline is left as it was.
    fn redo(&mut self, state: &mut TimelineState) -> Result<(), EditError>;

    /// Reverse the most recent `redo`.
    fn undo(&mut self, state: &mut TimelineState) -> Result<(), EditError>;

    /// Human readable label for undo/redo menus.
    fn text(&self) -> &'static str;

    fn merge_id(&self) -> Option<MergeId> {
        None
    }

    /// Notification emitted after a successful redo or undo.
    fn notification(&self) -> Option<TimelineEvent> {
        None
    }
}
