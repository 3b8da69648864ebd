//! Track list and track flag commands.
//!
//! Structural track edits keep the `Track` value they created or removed, so
//! undo and redo re-insert the identical track (uuid, name, flags, filters
//! and content) instead of a look-alike.

use core_events::TimelineEvent;
use core_state::{EditError, TimelineState};
use core_timeline::{Track, TrackKind};
use tracing::debug;

use crate::Command;

fn default_name(state: &TimelineState, kind: TrackKind) -> String {
    let count = state
        .multitrack
        .tracks()
        .iter()
        .filter(|t| t.kind == kind)
        .count();
    match kind {
        TrackKind::Video => format!("V{}", count + 1),
        TrackKind::Audio => format!("A{}", count + 1),
    }
}

fn tracks_changed(count: usize) -> Option<TimelineEvent> {
    Some(TimelineEvent::TracksChanged { count })
}

/// Append a video track after the last video track, or an audio track at the
/// bottom.
#[derive(Debug, Clone)]
pub struct AddTrackCommand {
    kind: TrackKind,
    track: Option<Track>,
    index: Option<usize>,
    count: usize,
}

impl AddTrackCommand {
    pub fn new(kind: TrackKind) -> Self {
        Self {
            kind,
            track: None,
            index: None,
            count: 0,
        }
    }

    /// Index the track was added at.
    pub fn index(&self) -> Option<usize> {
        self.index
    }
}

impl Command for AddTrackCommand {
    fn redo(&mut self, state: &mut TimelineState) -> Result<(), EditError> {
        let kind = self.kind;
        let track = self
            .track
            .get_or_insert_with(|| Track::new(kind, default_name(state, kind)))
            .clone();
        let index = state.multitrack.add_track(track);
        self.index = Some(index);
        self.count = state.multitrack.track_count();
        Ok(())
    }

    fn undo(&mut self, state: &mut TimelineState) -> Result<(), EditError> {
        if let Some(index) = self.index {
            self.track = Some(state.multitrack.remove_track(index)?);
        }
        self.count = state.multitrack.track_count();
        Ok(())
    }

    fn text(&self) -> &'static str {
        "Add track"
    }

    fn notification(&self) -> Option<TimelineEvent> {
        tracks_changed(self.count)
    }
}

#[derive(Debug, Clone)]
pub struct InsertTrackCommand {
    index: usize,
    kind: TrackKind,
    track: Option<Track>,
    count: usize,
}

impl InsertTrackCommand {
    pub fn new(index: usize, kind: TrackKind) -> Self {
        Self {
            index,
            kind,
            track: None,
            count: 0,
        }
    }
}

impl Command for InsertTrackCommand {
    fn redo(&mut self, state: &mut TimelineState) -> Result<(), EditError> {
        let kind = self.kind;
        let track = self
            .track
            .get_or_insert_with(|| Track::new(kind, default_name(state, kind)))
            .clone();
        state.multitrack.insert_track(self.index, track)?;
        self.count = state.multitrack.track_count();
        debug!(target: "commands.track", index = self.index, kind = ?kind, "track_inserted");
        Ok(())
    }

    fn undo(&mut self, state: &mut TimelineState) -> Result<(), EditError> {
        self.track = Some(state.multitrack.remove_track(self.index)?);
        self.count = state.multitrack.track_count();
        Ok(())
    }

    fn text(&self) -> &'static str {
        "Insert track"
    }

    fn notification(&self) -> Option<TimelineEvent> {
        tracks_changed(self.count)
    }
}

#[derive(Debug, Clone)]
pub struct RemoveTrackCommand {
    index: usize,
    removed: Option<Track>,
    count: usize,
}

impl RemoveTrackCommand {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            removed: None,
            count: 0,
        }
    }

    /// The track taken out by the last redo.
    pub fn removed(&self) -> Option<&Track> {
        self.removed.as_ref()
    }
}

impl Command for RemoveTrackCommand {
    fn redo(&mut self, state: &mut TimelineState) -> Result<(), EditError> {
        let removed = state.multitrack.remove_track(self.index)?;
        debug!(target: "commands.track", index = self.index, name = %removed.name, entries = removed.count(), "track_removed");
        self.removed = Some(removed);
        self.count = state.multitrack.track_count();
        Ok(())
    }

    fn undo(&mut self, state: &mut TimelineState) -> Result<(), EditError> {
        if let Some(track) = self.removed.clone() {
            state.multitrack.insert_track(self.index, track)?;
        }
        self.count = state.multitrack.track_count();
        Ok(())
    }

    fn text(&self) -> &'static str {
        "Remove track"
    }

    fn notification(&self) -> Option<TimelineEvent> {
        tracks_changed(self.count)
    }
}

#[derive(Debug, Clone)]
pub struct MoveTrackCommand {
    from: usize,
    to: usize,
    count: usize,
}

impl MoveTrackCommand {
    pub fn new(from: usize, to: usize) -> Self {
        Self { from, to, count: 0 }
    }
}

impl Command for MoveTrackCommand {
    fn redo(&mut self, state: &mut TimelineState) -> Result<(), EditError> {
        state.multitrack.move_track(self.from, self.to)?;
        self.count = state.multitrack.track_count();
        debug!(target: "commands.track", from = self.from, to = self.to, "track_moved");
        Ok(())
    }

    fn undo(&mut self, state: &mut TimelineState) -> Result<(), EditError> {
        state.multitrack.move_track(self.to, self.from)?;
        Ok(())
    }

    fn text(&self) -> &'static str {
        "Move track"
    }

    fn notification(&self) -> Option<TimelineEvent> {
        tracks_changed(self.count)
    }
}

#[derive(Debug, Clone)]
pub struct NameTrackCommand {
    index: usize,
    name: String,
    previous: Option<String>,
}

impl NameTrackCommand {
    pub fn new(index: usize, name: impl Into<String>) -> Self {
        Self {
            index,
            name: name.into(),
            previous: None,
        }
    }
}

impl Command for NameTrackCommand {
    fn redo(&mut self, state: &mut TimelineState) -> Result<(), EditError> {
        let track = state.track_mut(self.index)?;
        let old = std::mem::replace(&mut track.name, self.name.clone());
        self.previous.get_or_insert(old);
        Ok(())
    }

    fn undo(&mut self, state: &mut TimelineState) -> Result<(), EditError> {
        if let Some(previous) = &self.previous {
            state.track_mut(self.index)?.name = previous.clone();
        }
        Ok(())
    }

    fn text(&self) -> &'static str {
        "Change track name"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flag {
    Mute,
    Hide,
    Lock,
    Composite,
}

impl Flag {
    fn slot(self, track: &mut Track) -> &mut bool {
        match self {
            Flag::Mute => &mut track.mute,
            Flag::Hide => &mut track.hide,
            Flag::Lock => &mut track.lock,
            Flag::Composite => &mut track.composite,
        }
    }
}

/// Set one boolean track flag, remembering the value it replaced.
#[derive(Debug, Clone)]
struct FlagChange {
    index: usize,
    flag: Flag,
    /// `None` toggles.
    value: Option<bool>,
    previous: Option<bool>,
}

impl FlagChange {
    fn redo(&mut self, state: &mut TimelineState) -> Result<(), EditError> {
        let slot = self.flag.slot(state.track_mut(self.index)?);
        let old = *slot;
        let new = self.value.unwrap_or(!old);
        *slot = new;
        self.previous = Some(old);
        debug!(target: "commands.track", index = self.index, flag = ?self.flag, value = new, "track_flag");
        Ok(())
    }

    fn undo(&mut self, state: &mut TimelineState) -> Result<(), EditError> {
        if let Some(previous) = self.previous {
            *self.flag.slot(state.track_mut(self.index)?) = previous;
        }
        Ok(())
    }
}

macro_rules! flag_command {
    ($(#[$doc:meta])* $name:ident, $flag:expr, $text:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone)]
        pub struct $name(FlagChange);

        impl Command for $name {
            fn redo(&mut self, state: &mut TimelineState) -> Result<(), EditError> {
                self.0.redo(state)
            }

            fn undo(&mut self, state: &mut TimelineState) -> Result<(), EditError> {
                self.0.undo(state)
            }

            fn text(&self) -> &'static str {
                $text
            }
        }

        impl $name {
            fn with_value(index: usize, value: Option<bool>) -> Self {
                Self(FlagChange {
                    index,
                    flag: $flag,
                    value,
                    previous: None,
                })
            }
        }
    };
}

flag_command!(
    /// Toggle a track's mute flag.
    MuteTrackCommand,
    Flag::Mute,
    "Toggle track mute"
);
flag_command!(
    /// Toggle a track's hidden flag.
    HideTrackCommand,
    Flag::Hide,
    "Toggle track hidden"
);
flag_command!(LockTrackCommand, Flag::Lock, "Lock track");
flag_command!(CompositeTrackCommand, Flag::Composite, "Change track compositing");

impl MuteTrackCommand {
    pub fn new(index: usize) -> Self {
        Self::with_value(index, None)
    }
}

impl HideTrackCommand {
    pub fn new(index: usize) -> Self {
        Self::with_value(index, None)
    }
}

impl LockTrackCommand {
    pub fn new(index: usize, lock: bool) -> Self {
        Self::with_value(index, Some(lock))
    }
}

impl CompositeTrackCommand {
    pub fn new(index: usize, composite: bool) -> Self {
        Self::with_value(index, Some(composite))
    }
}
