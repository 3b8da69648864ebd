//! The closed catalog of edit commands.
//!
//! One struct per command kind, grouped by concern:
//! - `clip`: append, insert, overwrite, lift, remove, replace, update, split, merge
//! - `trim`: clip in/out point trims
//! - `property`: fades, gain, filters
//! - `transition`: transition creation, resizing, removal, blend mode
//! - `group`: group / ungroup
//! - `move_clip`, `detach`, `align`: multi-clip edits
//! - `track`: track list and track flag edits
//!
//! `EditCommand` wraps them all behind the `Command` capability so the history
//! stores a single type.

use core_events::TimelineEvent;
use core_state::{EditError, TimelineState};

use crate::{Command, MergeId};

mod align;
mod clip;
mod detach;
mod group;
mod move_clip;
mod property;
mod track;
mod transition;
mod trim;

pub use align::{AlignClipsCommand, Alignment};
pub use clip::{
    AppendCommand, InsertCommand, LiftCommand, MergeCommand, OverwriteCommand, RemoveCommand,
    ReplaceCommand, SplitCommand, UpdateCommand,
};
pub use detach::DetachAudioCommand;
pub use group::{GroupCommand, UngroupCommand};
pub use move_clip::MoveClipCommand;
pub use property::{ApplyFiltersCommand, ChangeGainCommand, FadeInCommand, FadeOutCommand};
pub use track::{
    AddTrackCommand, CompositeTrackCommand, HideTrackCommand, InsertTrackCommand,
    LockTrackCommand, MoveTrackCommand, MuteTrackCommand, NameTrackCommand, RemoveTrackCommand,
};
pub use transition::{
    AddTransitionByTrimInCommand, AddTransitionByTrimOutCommand, AddTransitionCommand,
    ChangeBlendModeCommand, RemoveTransitionByTrimInCommand, RemoveTransitionByTrimOutCommand,
    TrimTransitionInCommand, TrimTransitionOutCommand,
};
pub use trim::{TrimClipInCommand, TrimClipOutCommand};

#[derive(Debug, Clone)]
pub enum EditCommand {
    Append(AppendCommand),
    Insert(InsertCommand),
    Overwrite(OverwriteCommand),
    Lift(LiftCommand),
    Remove(RemoveCommand),
    Replace(ReplaceCommand),
    Update(UpdateCommand),
    Split(SplitCommand),
    Merge(MergeCommand),
    TrimClipIn(TrimClipInCommand),
    TrimClipOut(TrimClipOutCommand),
    FadeIn(FadeInCommand),
    FadeOut(FadeOutCommand),
    ChangeGain(ChangeGainCommand),
    ApplyFilters(ApplyFiltersCommand),
    AddTransition(AddTransitionCommand),
    TrimTransitionIn(TrimTransitionInCommand),
    TrimTransitionOut(TrimTransitionOutCommand),
    AddTransitionByTrimIn(AddTransitionByTrimInCommand),
    AddTransitionByTrimOut(AddTransitionByTrimOutCommand),
    RemoveTransitionByTrimIn(RemoveTransitionByTrimInCommand),
    RemoveTransitionByTrimOut(RemoveTransitionByTrimOutCommand),
    ChangeBlendMode(ChangeBlendModeCommand),
    Group(GroupCommand),
    Ungroup(UngroupCommand),
    MoveClip(MoveClipCommand),
    DetachAudio(DetachAudioCommand),
    AlignClips(AlignClipsCommand),
    AddTrack(AddTrackCommand),
    InsertTrack(InsertTrackCommand),
    RemoveTrack(RemoveTrackCommand),
    MoveTrack(MoveTrackCommand),
    NameTrack(NameTrackCommand),
    MuteTrack(MuteTrackCommand),
    HideTrack(HideTrackCommand),
    LockTrack(LockTrackCommand),
    CompositeTrack(CompositeTrackCommand),
}

impl EditCommand {
    fn inner(&self) -> &dyn Command {
        match self {
            EditCommand::Append(c) => c,
            EditCommand::Insert(c) => c,
            EditCommand::Overwrite(c) => c,
            EditCommand::Lift(c) => c,
            EditCommand::Remove(c) => c,
            EditCommand::Replace(c) => c,
            EditCommand::Update(c) => c,
            EditCommand::Split(c) => c,
            EditCommand::Merge(c) => c,
            EditCommand::TrimClipIn(c) => c,
            EditCommand::TrimClipOut(c) => c,
            EditCommand::FadeIn(c) => c,
            EditCommand::FadeOut(c) => c,
            EditCommand::ChangeGain(c) => c,
            EditCommand::ApplyFilters(c) => c,
            EditCommand::AddTransition(c) => c,
            EditCommand::TrimTransitionIn(c) => c,
            EditCommand::TrimTransitionOut(c) => c,
            EditCommand::AddTransitionByTrimIn(c) => c,
            EditCommand::AddTransitionByTrimOut(c) => c,
            EditCommand::RemoveTransitionByTrimIn(c) => c,
            EditCommand::RemoveTransitionByTrimOut(c) => c,
            EditCommand::ChangeBlendMode(c) => c,
            EditCommand::Group(c) => c,
            EditCommand::Ungroup(c) => c,
            EditCommand::MoveClip(c) => c,
            EditCommand::DetachAudio(c) => c,
            EditCommand::AlignClips(c) => c,
            EditCommand::AddTrack(c) => c,
            EditCommand::InsertTrack(c) => c,
            EditCommand::RemoveTrack(c) => c,
            EditCommand::MoveTrack(c) => c,
            EditCommand::NameTrack(c) => c,
            EditCommand::MuteTrack(c) => c,
            EditCommand::HideTrack(c) => c,
            EditCommand::LockTrack(c) => c,
            EditCommand::CompositeTrack(c) => c,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Command {
        match self {
            EditCommand::Append(c) => c,
            EditCommand::Insert(c) => c,
            EditCommand::Overwrite(c) => c,
            EditCommand::Lift(c) => c,
            EditCommand::Remove(c) => c,
            EditCommand::Replace(c) => c,
            EditCommand::Update(c) => c,
            EditCommand::Split(c) => c,
            EditCommand::Merge(c) => c,
            EditCommand::TrimClipIn(c) => c,
            EditCommand::TrimClipOut(c) => c,
            EditCommand::FadeIn(c) => c,
            EditCommand::FadeOut(c) => c,
            EditCommand::ChangeGain(c) => c,
            EditCommand::ApplyFilters(c) => c,
            EditCommand::AddTransition(c) => c,
            EditCommand::TrimTransitionIn(c) => c,
            EditCommand::TrimTransitionOut(c) => c,
            EditCommand::AddTransitionByTrimIn(c) => c,
            EditCommand::AddTransitionByTrimOut(c) => c,
            EditCommand::RemoveTransitionByTrimIn(c) => c,
            EditCommand::RemoveTransitionByTrimOut(c) => c,
            EditCommand::ChangeBlendMode(c) => c,
            EditCommand::Group(c) => c,
            EditCommand::Ungroup(c) => c,
            EditCommand::MoveClip(c) => c,
            EditCommand::DetachAudio(c) => c,
            EditCommand::AlignClips(c) => c,
            EditCommand::AddTrack(c) => c,
            EditCommand::InsertTrack(c) => c,
            EditCommand::RemoveTrack(c) => c,
            EditCommand::MoveTrack(c) => c,
            EditCommand::NameTrack(c) => c,
            EditCommand::MuteTrack(c) => c,
            EditCommand::HideTrack(c) => c,
            EditCommand::LockTrack(c) => c,
            EditCommand::CompositeTrack(c) => c,
        }
    }

    /// Fold `next` (already executed) into `self` (the entry directly below
    /// it). Pure: returns the combined command or `None` when ids, targets or
    /// recorded states do not line up.
    pub fn merge(&self, next: &EditCommand) -> Option<EditCommand> {
        if self.merge_id().is_none() || self.merge_id() != next.merge_id() {
            return None;
        }
        match (self, next) {
            (EditCommand::TrimClipIn(a), EditCommand::TrimClipIn(b)) => {
                a.merge(b).map(EditCommand::TrimClipIn)
            }
            (EditCommand::TrimClipOut(a), EditCommand::TrimClipOut(b)) => {
                a.merge(b).map(EditCommand::TrimClipOut)
            }
            (EditCommand::FadeIn(a), EditCommand::FadeIn(b)) => a.merge(b).map(EditCommand::FadeIn),
            (EditCommand::FadeOut(a), EditCommand::FadeOut(b)) => {
                a.merge(b).map(EditCommand::FadeOut)
            }
            (EditCommand::ChangeGain(a), EditCommand::ChangeGain(b)) => {
                a.merge(b).map(EditCommand::ChangeGain)
            }
            (EditCommand::TrimTransitionIn(a), EditCommand::TrimTransitionIn(b)) => {
                a.merge(b).map(EditCommand::TrimTransitionIn)
            }
            (EditCommand::TrimTransitionOut(a), EditCommand::TrimTransitionOut(b)) => {
                a.merge(b).map(EditCommand::TrimTransitionOut)
            }
            (EditCommand::AddTransitionByTrimIn(a), EditCommand::AddTransitionByTrimIn(b)) => {
                a.merge(b).map(EditCommand::AddTransitionByTrimIn)
            }
            (EditCommand::AddTransitionByTrimOut(a), EditCommand::AddTransitionByTrimOut(b)) => {
                a.merge(b).map(EditCommand::AddTransitionByTrimOut)
            }
            (EditCommand::MoveClip(a), EditCommand::MoveClip(b)) => {
                a.merge(b).map(EditCommand::MoveClip)
            }
            _ => None,
        }
    }
}

impl Command for EditCommand {
    fn redo(&mut self, state: &mut TimelineState) -> Result<(), EditError> {
        self.inner_mut().redo(state)
    }

    fn undo(&mut self, state: &mut TimelineState) -> Result<(), EditError> {
        self.inner_mut().undo(state)
    }

    fn text(&self) -> &'static str {
        self.inner().text()
    }

    fn merge_id(&self) -> Option<MergeId> {
        self.inner().merge_id()
    }

    fn notification(&self) -> Option<TimelineEvent> {
        self.inner().notification()
    }
}
