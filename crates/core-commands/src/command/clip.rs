//! Clip placement commands.
//!
//! All of these are structural: they snapshot the affected tracks (plus the
//! marker list when they ripple markers) and reverse by restore.

use core_state::{EditError, SnapshotScope, TimelineState, UndoHelper};
use core_timeline::{Clip, Entry, Frame, ModelError, payload};
use tracing::{debug, trace};

use crate::Command;
use crate::edit;
use crate::ripple::{self, RippleEdit};

/// Append payload clips to the end of a track.
#[derive(Debug, Clone)]
pub struct AppendCommand {
    track: usize,
    payload: String,
    undo_helper: UndoHelper,
    clip_index: Option<usize>,
}

impl AppendCommand {
    pub fn new(track: usize, payload: impl Into<String>) -> Self {
        Self {
            track,
            payload: payload.into(),
            undo_helper: UndoHelper::new(SnapshotScope::Track(track)),
            clip_index: None,
        }
    }

    /// Index of the first appended clip after redo.
    pub fn clip_index(&self) -> Option<usize> {
        self.clip_index
    }

    fn apply(&mut self, state: &mut TimelineState) -> Result<(), EditError> {
        let clips = payload::decode_new_clips(&self.payload)?;
        let t = state.editable_track(self.track)?;
        let end = t.duration();
        let index = edit::insert_clips(t, end, clips)?;
        trace!(target: "commands.clip", track = self.track, index, "append");
        self.clip_index = Some(index);
        Ok(())
    }
}

impl Command for AppendCommand {
    fn redo(&mut self, state: &mut TimelineState) -> Result<(), EditError> {
        if self.undo_helper.replay_or_begin(state)? {
            return Ok(());
        }
        let outcome = self.apply(state);
        self.undo_helper.finish(state, outcome)
    }

    fn undo(&mut self, state: &mut TimelineState) -> Result<(), EditError> {
        self.undo_helper.undo_changes(state)
    }

    fn text(&self) -> &'static str {
        "Append to track"
    }
}

/// Insert payload clips at a position, pushing later content right.
#[derive(Debug, Clone)]
pub struct InsertCommand {
    track: usize,
    position: Frame,
    payload: String,
    ripple_all_tracks: bool,
    ripple_markers: bool,
    undo_helper: UndoHelper,
    clip_index: Option<usize>,
    markers_shift: Frame,
}

impl InsertCommand {
    pub fn new(
        state: &TimelineState,
        track: usize,
        position: Frame,
        payload: impl Into<String>,
    ) -> Self {
        let settings = state.settings;
        Self {
            track,
            position,
            payload: payload.into(),
            ripple_all_tracks: settings.ripple_all_tracks,
            ripple_markers: settings.ripple_markers,
            undo_helper: UndoHelper::new(ripple::scope_for(track, &settings, true))
                .with_markers(settings.ripple_markers),
            clip_index: None,
            markers_shift: 0,
        }
    }

    pub fn clip_index(&self) -> Option<usize> {
        self.clip_index
    }

    /// Frames the markers were shifted by (0 when marker ripple is off).
    pub fn markers_shift(&self) -> Frame {
        self.markers_shift
    }

    fn apply(&mut self, state: &mut TimelineState) -> Result<(), EditError> {
        let clips = payload::decode_new_clips(&self.payload)?;
        let length = edit::clips_length(&clips);
        let t = state.editable_track(self.track)?;
        let index = edit::insert_clips(t, self.position, clips)?;
        let change = RippleEdit::Insert {
            at: self.position,
            length,
        };
        if self.ripple_all_tracks {
            ripple::ripple_other_tracks(state, self.track, change)?;
        }
        if self.ripple_markers {
            ripple::ripple_markers(&mut state.markers, change);
            self.markers_shift = length;
        }
        debug!(target: "commands.clip", track = self.track, position = self.position, length, index, "insert");
        self.clip_index = Some(index);
        Ok(())
    }
}

impl Command for InsertCommand {
    fn redo(&mut self, state: &mut TimelineState) -> Result<(), EditError> {
        if self.undo_helper.replay_or_begin(state)? {
            return Ok(());
        }
        let outcome = self.apply(state);
        self.undo_helper.finish(state, outcome)
    }

    fn undo(&mut self, state: &mut TimelineState) -> Result<(), EditError> {
        self.undo_helper.undo_changes(state)
    }

    fn text(&self) -> &'static str {
        "Insert into track"
    }
}

/// Replace the frames under the payload with the payload clips.
#[derive(Debug, Clone)]
pub struct OverwriteCommand {
    track: usize,
    position: Frame,
    payload: String,
    undo_helper: UndoHelper,
    clip_index: Option<usize>,
}

impl OverwriteCommand {
    pub fn new(track: usize, position: Frame, payload: impl Into<String>) -> Self {
        Self {
            track,
            position,
            payload: payload.into(),
            undo_helper: UndoHelper::new(SnapshotScope::Track(track)),
            clip_index: None,
        }
    }

    pub fn clip_index(&self) -> Option<usize> {
        self.clip_index
    }

    fn apply(&mut self, state: &mut TimelineState) -> Result<(), EditError> {
        let clips = payload::decode_new_clips(&self.payload)?;
        let t = state.editable_track(self.track)?;
        let index = edit::overwrite_clips(t, self.position, clips)?;
        trace!(target: "commands.clip", track = self.track, position = self.position, index, "overwrite");
        self.clip_index = Some(index);
        Ok(())
    }
}

impl Command for OverwriteCommand {
    fn redo(&mut self, state: &mut TimelineState) -> Result<(), EditError> {
        if self.undo_helper.replay_or_begin(state)? {
            return Ok(());
        }
        let outcome = self.apply(state);
        self.undo_helper.finish(state, outcome)
    }

    fn undo(&mut self, state: &mut TimelineState) -> Result<(), EditError> {
        self.undo_helper.undo_changes(state)
    }

    fn text(&self) -> &'static str {
        "Overwrite onto track"
    }
}

/// Replace a clip with blank space of the same length.
#[derive(Debug, Clone)]
pub struct LiftCommand {
    track: usize,
    clip: usize,
    undo_helper: UndoHelper,
}

impl LiftCommand {
    pub fn new(track: usize, clip: usize) -> Self {
        Self {
            track,
            clip,
            undo_helper: UndoHelper::new(SnapshotScope::Track(track)),
        }
    }
}

impl Command for LiftCommand {
    fn redo(&mut self, state: &mut TimelineState) -> Result<(), EditError> {
        if self.undo_helper.replay_or_begin(state)? {
            return Ok(());
        }
        let outcome = edit::lift_clip(state, self.track, self.clip).map(|(lifted, start)| {
            trace!(target: "commands.clip", track = self.track, clip = self.clip, start, length = lifted.length(), "lift");
        });
        self.undo_helper.finish(state, outcome)
    }

    fn undo(&mut self, state: &mut TimelineState) -> Result<(), EditError> {
        self.undo_helper.undo_changes(state)
    }

    fn text(&self) -> &'static str {
        "Lift from track"
    }
}

/// Ripple-delete a clip.
#[derive(Debug, Clone)]
pub struct RemoveCommand {
    track: usize,
    clip: usize,
    ripple_all_tracks: bool,
    ripple_markers: bool,
    undo_helper: UndoHelper,
    removed_range: Option<(Frame, Frame)>,
}

impl RemoveCommand {
    pub fn new(state: &TimelineState, track: usize, clip: usize) -> Self {
        let settings = state.settings;
        Self {
            track,
            clip,
            ripple_all_tracks: settings.ripple_all_tracks,
            ripple_markers: settings.ripple_markers,
            undo_helper: UndoHelper::new(ripple::scope_for(track, &settings, true))
                .with_markers(settings.ripple_markers),
            removed_range: None,
        }
    }

    /// Half-open timeline range `[start, end)` the removal closed.
    pub fn removed_range(&self) -> Option<(Frame, Frame)> {
        self.removed_range
    }

    fn apply(&mut self, state: &mut TimelineState) -> Result<(), EditError> {
        let (clip, start) = edit::remove_clip(state, self.track, self.clip)?;
        let end = start + clip.length();
        let change = RippleEdit::Remove { start, end };
        if self.ripple_all_tracks {
            ripple::ripple_other_tracks(state, self.track, change)?;
        }
        if self.ripple_markers {
            ripple::ripple_markers(&mut state.markers, change);
        }
        debug!(target: "commands.clip", track = self.track, clip = self.clip, start, end, "remove");
        self.removed_range = Some((start, end));
        Ok(())
    }
}

impl Command for RemoveCommand {
    fn redo(&mut self, state: &mut TimelineState) -> Result<(), EditError> {
        if self.undo_helper.replay_or_begin(state)? {
            return Ok(());
        }
        let outcome = self.apply(state);
        self.undo_helper.finish(state, outcome)
    }

    fn undo(&mut self, state: &mut TimelineState) -> Result<(), EditError> {
        self.undo_helper.undo_changes(state)
    }

    fn text(&self) -> &'static str {
        "Remove from track"
    }
}

/// Swap a clip's media for the payload's first clip, keeping the slot.
#[derive(Debug, Clone)]
pub struct ReplaceCommand {
    track: usize,
    clip: usize,
    payload: String,
    undo_helper: UndoHelper,
}

impl ReplaceCommand {
    pub fn new(track: usize, clip: usize, payload: impl Into<String>) -> Self {
        Self {
            track,
            clip,
            payload: payload.into(),
            undo_helper: UndoHelper::new(SnapshotScope::Track(track)),
        }
    }

    fn apply(&mut self, state: &mut TimelineState) -> Result<(), EditError> {
        let old = edit::editable_clip(state, self.track, self.clip)?.clone();
        let mut new = first_clip(&self.payload)?;
        new.group = old.group;
        new.frame_out = (new.frame_in + old.length() - 1).min(new.max_out());
        let shortfall = old.length() - new.length();
        let t = state.editable_track(self.track)?;
        t.replace_entry(self.clip, Entry::Clip(new));
        if shortfall > 0 {
            t.insert_entries(self.clip + 1, [Entry::blank(shortfall)]);
        }
        t.normalize();
        debug!(target: "commands.clip", track = self.track, clip = self.clip, shortfall, "replace");
        Ok(())
    }
}

impl Command for ReplaceCommand {
    fn redo(&mut self, state: &mut TimelineState) -> Result<(), EditError> {
        if self.undo_helper.replay_or_begin(state)? {
            return Ok(());
        }
        let outcome = self.apply(state);
        self.undo_helper.finish(state, outcome)
    }

    fn undo(&mut self, state: &mut TimelineState) -> Result<(), EditError> {
        self.undo_helper.undo_changes(state)
    }

    fn text(&self) -> &'static str {
        "Replace timeline clip"
    }
}

/// Apply an edited version of a clip (properties dialog, speed change).
///
/// Built in two steps: construct, then `set_payload_after` (and optionally
/// `set_position` / `set_ripple_all_tracks`) before pushing.
#[derive(Debug, Clone)]
pub struct UpdateCommand {
    track: usize,
    clip: usize,
    position: Frame,
    payload_after: Option<String>,
    ripple: bool,
    ripple_all_tracks: bool,
    ripple_markers: bool,
    undo_helper: UndoHelper,
}

impl UpdateCommand {
    pub fn new(state: &TimelineState, track: usize, clip: usize, position: Frame) -> Self {
        let settings = state.settings;
        let mut cmd = Self {
            track,
            clip,
            position,
            payload_after: None,
            ripple: settings.ripple,
            ripple_all_tracks: settings.ripple_all_tracks,
            ripple_markers: settings.ripple_markers,
            undo_helper: UndoHelper::new(SnapshotScope::Track(track)),
        };
        cmd.rebuild_helper();
        cmd
    }

    pub fn set_payload_after(&mut self, payload: impl Into<String>) {
        self.payload_after = Some(payload.into());
    }

    /// Retarget the updated clip to a new timeline position.
    pub fn set_position(&mut self, track: usize, clip: usize, position: Frame) {
        self.track = track;
        self.clip = clip;
        self.position = position;
        self.rebuild_helper();
    }

    pub fn set_ripple_all_tracks(&mut self, enabled: bool) {
        self.ripple_all_tracks = enabled;
        self.rebuild_helper();
    }

    pub fn track(&self) -> usize {
        self.track
    }

    pub fn clip(&self) -> usize {
        self.clip
    }

    pub fn position(&self) -> Frame {
        self.position
    }

    fn rebuild_helper(&mut self) {
        let scope = if self.ripple && self.ripple_all_tracks {
            SnapshotScope::AllTracks
        } else {
            SnapshotScope::Track(self.track)
        };
        self.undo_helper =
            UndoHelper::new(scope).with_markers(self.ripple && self.ripple_markers);
    }

    fn apply(&mut self, state: &mut TimelineState) -> Result<(), EditError> {
        let Some(payload) = self.payload_after.as_deref() else {
            return Err(ModelError::EmptyPayload.into());
        };
        let old = edit::editable_clip(state, self.track, self.clip)?.clone();
        let start = state.start_of(self.track, self.clip)?;
        let mut new = first_clip(payload)?;
        new.uuid = old.uuid;
        new.group = old.group;

        if self.position != start {
            edit::check_position(self.position)?;
            edit::lift_clip(state, self.track, self.clip)?;
            let t = state.editable_track(self.track)?;
            self.clip = edit::overwrite_clips(t, self.position, vec![new])?;
            debug!(target: "commands.clip", track = self.track, from = start, to = self.position, "update_moved");
            return Ok(());
        }

        let t = state.editable_track(self.track)?;
        if !self.ripple
            && let Some(room) = edit::blank_after(t, self.clip)
        {
            let allowed = old.length() + room;
            if new.length() > allowed {
                debug!(target: "commands.clip", wanted = new.length(), allowed, "update_clamped");
                new.frame_out = new.frame_in + allowed - 1;
            }
        }
        let delta = new.length() - old.length();
        t.replace_entry(self.clip, Entry::Clip(new));
        if self.ripple {
            t.normalize();
            if let Some(change) = RippleEdit::from_delta(start + old.length(), delta) {
                if self.ripple_all_tracks {
                    ripple::ripple_other_tracks(state, self.track, change)?;
                }
                if self.ripple_markers {
                    ripple::ripple_markers(&mut state.markers, change);
                }
            }
        } else {
            edit::resize_blank_after(t, self.clip, -delta);
        }
        debug!(target: "commands.clip", track = self.track, clip = self.clip, delta, ripple = self.ripple, "update");
        Ok(())
    }
}

impl Command for UpdateCommand {
    fn redo(&mut self, state: &mut TimelineState) -> Result<(), EditError> {
        if self.undo_helper.replay_or_begin(state)? {
            return Ok(());
        }
        let outcome = self.apply(state);
        self.undo_helper.finish(state, outcome)
    }

    fn undo(&mut self, state: &mut TimelineState) -> Result<(), EditError> {
        self.undo_helper.undo_changes(state)
    }

    fn text(&self) -> &'static str {
        "Change clip properties"
    }
}

/// Cut one or more clips at a timeline position.
///
/// The left half keeps the clip's identity and fade-in, the right half gets a
/// fresh uuid and the fade-out. Both halves stay in the clip's group.
#[derive(Debug, Clone)]
pub struct SplitCommand {
    targets: Vec<(usize, usize)>,
    position: Frame,
    undo_helper: UndoHelper,
}

impl SplitCommand {
    /// `targets` holds `(track, clip)` pairs.
    pub fn new(targets: &[(usize, usize)], position: Frame) -> Self {
        let targets = targets.to_vec();
        let mut scope: Vec<usize> = targets.iter().map(|(t, _)| *t).collect();
        scope.sort_unstable();
        scope.dedup();
        Self {
            targets,
            position,
            undo_helper: UndoHelper::new(SnapshotScope::Tracks(scope)),
        }
    }

    fn apply(&mut self, state: &mut TimelineState) -> Result<(), EditError> {
        if self.targets.is_empty() {
            return Err(EditError::NoTargets);
        }
        for &(track, clip) in &self.targets {
            let length = state.clip(track, clip)?.length();
            let start = state.start_of(track, clip)?;
            if self.position <= start || self.position >= start + length {
                return Err(EditError::InvalidPosition(self.position));
            }
            state.editable_track(track)?;
        }
        for &(track, clip) in &self.targets {
            let index = state.track_mut(track)?.split_at(self.position)?;
            trace!(target: "commands.clip", track, clip, right = index, position = self.position, "split");
        }
        Ok(())
    }
}

impl Command for SplitCommand {
    fn redo(&mut self, state: &mut TimelineState) -> Result<(), EditError> {
        if self.undo_helper.replay_or_begin(state)? {
            return Ok(());
        }
        let outcome = self.apply(state);
        self.undo_helper.finish(state, outcome)
    }

    fn undo(&mut self, state: &mut TimelineState) -> Result<(), EditError> {
        self.undo_helper.undo_changes(state)
    }

    fn text(&self) -> &'static str {
        "Split clip"
    }
}

/// Join a clip with the following clip when they continue the same source.
#[derive(Debug, Clone)]
pub struct MergeCommand {
    track: usize,
    clip: usize,
    undo_helper: UndoHelper,
}

impl MergeCommand {
    pub fn new(track: usize, clip: usize) -> Self {
        Self {
            track,
            clip,
            undo_helper: UndoHelper::new(SnapshotScope::Track(track)),
        }
    }

    fn apply(&mut self, state: &mut TimelineState) -> Result<(), EditError> {
        let (track, clip) = (self.track, self.clip);
        let first = state.clip(track, clip)?;
        let second = state
            .track(track)?
            .clip(clip + 1)
            .ok_or(EditError::NotMergeable { track, clip })?;
        if !first.continues_into(second) {
            return Err(EditError::NotMergeable { track, clip });
        }
        let (frame_out, fade_out) = (second.frame_out, second.producer.fade_out);
        let t = state.editable_track(track)?;
        t.remove_entries(clip + 1..clip + 2);
        if let Some(merged) = t.clip_mut(clip) {
            merged.frame_out = frame_out;
            merged.producer.fade_out = fade_out;
        }
        trace!(target: "commands.clip", track, clip, "merge");
        Ok(())
    }
}

impl Command for MergeCommand {
    fn redo(&mut self, state: &mut TimelineState) -> Result<(), EditError> {
        if self.undo_helper.replay_or_begin(state)? {
            return Ok(());
        }
        let outcome = self.apply(state);
        self.undo_helper.finish(state, outcome)
    }

    fn undo(&mut self, state: &mut TimelineState) -> Result<(), EditError> {
        self.undo_helper.undo_changes(state)
    }

    fn text(&self) -> &'static str {
        "Merge adjacent clips"
    }
}

fn first_clip(payload: &str) -> Result<Clip, EditError> {
    payload::decode_clips(payload)?
        .into_iter()
        .next()
        .ok_or(EditError::Model(ModelError::EmptyPayload))
}
