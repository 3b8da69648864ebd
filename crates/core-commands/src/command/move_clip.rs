//! Drag-move of one or more clips across time and tracks.
//!
//! Clips are tracked by identity: indices captured when the drag started go
//! stale as soon as the first clip leaves its track, so every redo resolves
//! positions through `Multitrack::find_clip`.

use core_state::{EditError, SnapshotScope, TimelineState, UndoHelper};
use core_timeline::{Clip, Frame};
use tracing::{debug, trace};
use uuid::Uuid;

use crate::ripple;
use crate::{Command, MergeId, edit};

#[derive(Debug, Clone, PartialEq, Eq)]
struct MovedClip {
    uuid: Uuid,
    track: usize,
    start: Frame,
    length: Frame,
}

#[derive(Debug, Clone)]
pub struct MoveClipCommand {
    clips: Vec<MovedClip>,
    track_delta: isize,
    position_delta: Frame,
    ripple: bool,
    ripple_markers: bool,
    applied: Frame,
    undo_helper: UndoHelper,
}

impl MoveClipCommand {
    pub fn new(
        state: &TimelineState,
        track_delta: isize,
        position_delta: Frame,
        ripple: bool,
    ) -> Self {
        let ripple_markers = ripple::affects_markers(&state.settings, ripple);
        Self {
            clips: Vec::new(),
            track_delta,
            position_delta,
            ripple,
            ripple_markers,
            applied: 0,
            undo_helper: UndoHelper::new(SnapshotScope::AllTracks).with_markers(ripple_markers),
        }
    }

    pub fn add_clip(
        &mut self,
        state: &TimelineState,
        track: usize,
        clip: usize,
    ) -> Result<(), EditError> {
        let c = state.clip(track, clip)?;
        if self.clips.iter().any(|m| m.uuid == c.uuid) {
            return Ok(());
        }
        self.clips.push(MovedClip {
            uuid: c.uuid,
            track,
            start: state.start_of(track, clip)?,
            length: c.length(),
        });
        Ok(())
    }

    /// Position delta actually applied after clamping at frame 0.
    pub fn applied(&self) -> Frame {
        self.applied
    }

    pub fn track_delta(&self) -> isize {
        self.track_delta
    }

    pub fn merge(&self, next: &Self) -> Option<Self> {
        let ids = |c: &Self| c.clips.iter().map(|m| m.uuid).collect::<Vec<_>>();
        if self.clips.is_empty() || self.ripple != next.ripple || ids(self) != ids(next) {
            return None;
        }
        let undo_helper = self.undo_helper.merge(&next.undo_helper)?;
        let applied = self.applied + next.applied;
        Some(Self {
            clips: self.clips.clone(),
            track_delta: self.track_delta + next.track_delta,
            position_delta: applied,
            applied,
            undo_helper,
            ..next.clone()
        })
    }

    fn destination(&self, state: &TimelineState, track: usize) -> Result<usize, EditError> {
        track
            .checked_add_signed(self.track_delta)
            .filter(|&t| t < state.multitrack.track_count())
            .ok_or(EditError::InvalidTrack(
                track.saturating_add_signed(self.track_delta),
            ))
    }

    fn apply(&mut self, state: &mut TimelineState) -> Result<(), EditError> {
        if self.clips.is_empty() {
            return Err(EditError::NoTargets);
        }
        let mut sources = Vec::with_capacity(self.clips.len());
        for moved in &self.clips {
            let at = state
                .multitrack
                .find_clip(moved.uuid)
                .ok_or(EditError::UnknownClip(moved.uuid))?;
            let destination = self.destination(state, at.track)?;
            state.editable_track(at.track)?;
            state.editable_track(destination)?;
            sources.push((at, destination));
        }
        let earliest = self.clips.iter().map(|m| m.start).min().unwrap_or_default();
        let delta = self.position_delta.max(-earliest);
        if delta != self.position_delta {
            debug!(target: "commands.move", wanted = self.position_delta, applied = delta, "move_clamped");
        }

        sources.sort_by(|a, b| b.0.cmp(&a.0));
        let mut taken: Vec<(usize, Frame, Clip)> = Vec::with_capacity(sources.len());
        for (at, destination) in sources {
            let (clip, start) = if self.ripple {
                edit::remove_clip(state, at.track, at.clip)?
            } else {
                edit::lift_clip(state, at.track, at.clip)?
            };
            trace!(target: "commands.move", track = at.track, clip = at.clip, start, destination, "clip_taken");
            taken.push((destination, start, clip));
        }

        taken.sort_by_key(|(track, start, _)| (*track, *start));
        for (destination, start, clip) in taken {
            let t = state.editable_track(destination)?;
            let position = start.saturating_add(delta);
            if self.ripple {
                edit::insert_clips(t, position, vec![clip])?;
            } else {
                edit::overwrite_clips(t, position, vec![clip])?;
            }
        }

        if self.ripple_markers {
            ripple::shift_markers(&mut state.markers, earliest, delta);
        }
        debug!(target: "commands.move", clips = self.clips.len(), track_delta = self.track_delta, delta, ripple = self.ripple, "clips_moved");
        self.applied = delta;
        Ok(())
    }
}

impl Command for MoveClipCommand {
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
        "Move clip"
    }

    fn merge_id(&self) -> Option<MergeId> {
        Some(MergeId::MoveClip)
    }
}
