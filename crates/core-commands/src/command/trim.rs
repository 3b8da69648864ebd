//! Clip in/out point trims.
//!
//! Deltas are clamped, never rejected: interactive drags routinely overshoot.
//! A positive delta shrinks the clip on the trimmed side, a negative one
//! extends it. Without ripple the clip's other side stays put and blank space
//! absorbs the change; with ripple downstream content follows.
//!
//! Consecutive trims of the same clip with the same ripple mode merge into a
//! single history entry.

use core_state::{EditError, TimelineState, UndoHelper};
use core_timeline::{Clip, Entry, Frame};
use tracing::debug;
use uuid::Uuid;

use crate::ripple::{self, RippleEdit};
use crate::{Command, MergeId, edit};

#[derive(Debug, Clone)]
struct TrimTarget {
    track: usize,
    clip: usize,
    uuid: Option<Uuid>,
    ripple: bool,
    ripple_all_tracks: bool,
    ripple_markers: bool,
}

impl TrimTarget {
    fn new(state: &TimelineState, track: usize, clip: usize, ripple: bool) -> Self {
        let settings = state.settings;
        Self {
            track,
            clip,
            uuid: state.clip(track, clip).ok().map(|c| c.uuid),
            ripple,
            ripple_all_tracks: ripple && settings.ripple_all_tracks,
            ripple_markers: ripple::affects_markers(&settings, ripple),
        }
    }

    fn helper(&self, state: &TimelineState) -> UndoHelper {
        UndoHelper::new(ripple::scope_for(self.track, &state.settings, self.ripple))
            .with_markers(self.ripple_markers)
    }

    fn same_target(&self, other: &TrimTarget) -> bool {
        self.uuid.is_some()
            && self.uuid == other.uuid
            && self.track == other.track
            && self.ripple == other.ripple
    }

    fn propagate(&self, state: &mut TimelineState, change: RippleEdit) -> Result<(), EditError> {
        if self.ripple_all_tracks {
            ripple::ripple_other_tracks(state, self.track, change)?;
        }
        if self.ripple_markers {
            ripple::ripple_markers(&mut state.markers, change);
        }
        Ok(())
    }
}

/// Move a clip's in point by `delta` frames.
#[derive(Debug, Clone)]
pub struct TrimClipInCommand {
    target: TrimTarget,
    delta: Frame,
    applied: Frame,
    undo_helper: UndoHelper,
}

impl TrimClipInCommand {
    pub fn new(
        state: &TimelineState,
        track: usize,
        clip: usize,
        delta: Frame,
        ripple: bool,
    ) -> Self {
        let target = TrimTarget::new(state, track, clip, ripple);
        Self {
            undo_helper: target.helper(state),
            target,
            delta,
            applied: 0,
        }
    }

    /// Delta actually applied after clamping.
    pub fn applied(&self) -> Frame {
        self.applied
    }

    pub fn clip(&self) -> usize {
        self.target.clip
    }

    pub fn merge(&self, next: &Self) -> Option<Self> {
        if !self.target.same_target(&next.target) {
            return None;
        }
        let undo_helper = self.undo_helper.merge(&next.undo_helper)?;
        let applied = self.applied + next.applied;
        Some(Self {
            target: next.target.clone(),
            delta: applied,
            applied,
            undo_helper,
        })
    }

    fn apply(&mut self, state: &mut TimelineState) -> Result<(), EditError> {
        let TrimTarget { track, clip, .. } = self.target;
        let c = state.clip(track, clip)?.clone();
        let t = state.track(track)?;
        if clip > 0 && t.transition(clip - 1).is_some() {
            return Err(EditError::TransitionAdjacent { track, clip });
        }
        let start = state.start_of(track, clip)?;
        let mut delta = self.delta.min(c.length() - 1).max(-c.frame_in);
        if !self.target.ripple {
            delta = delta.max(-edit::blank_before(t, clip));
        }
        if delta != self.delta {
            debug!(target: "commands.trim", track, clip, wanted = self.delta, applied = delta, "trim_in_clamped");
        }

        let t = state.editable_track(track)?;
        if let Some(trimmed) = t.clip_mut(clip) {
            trimmed.frame_in += delta;
            clamp_fades(trimmed);
        }
        if self.target.ripple {
            t.normalize();
            let change = if delta > 0 {
                Some(RippleEdit::Remove {
                    start,
                    end: start + delta,
                })
            } else {
                RippleEdit::from_delta(start, -delta)
            };
            if let Some(change) = change {
                self.target.propagate(state, change)?;
            }
        } else {
            self.target.clip = edit::resize_blank_before(t, clip, delta, c.uuid)?;
        }
        debug!(target: "commands.trim", track, clip, delta, ripple = self.target.ripple, "trim_in");
        self.applied = delta;
        Ok(())
    }
}

impl Command for TrimClipInCommand {
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
        "Trim clip in point"
    }

    fn merge_id(&self) -> Option<MergeId> {
        Some(MergeId::TrimClipIn)
    }
}

/// Move a clip's out point by `-delta` frames.
#[derive(Debug, Clone)]
pub struct TrimClipOutCommand {
    target: TrimTarget,
    delta: Frame,
    applied: Frame,
    undo_helper: UndoHelper,
}

impl TrimClipOutCommand {
    pub fn new(
        state: &TimelineState,
        track: usize,
        clip: usize,
        delta: Frame,
        ripple: bool,
    ) -> Self {
        let target = TrimTarget::new(state, track, clip, ripple);
        Self {
            undo_helper: target.helper(state),
            target,
            delta,
            applied: 0,
        }
    }

    pub fn applied(&self) -> Frame {
        self.applied
    }

    pub fn clip(&self) -> usize {
        self.target.clip
    }

    pub fn merge(&self, next: &Self) -> Option<Self> {
        if !self.target.same_target(&next.target) {
            return None;
        }
        let undo_helper = self.undo_helper.merge(&next.undo_helper)?;
        let applied = self.applied + next.applied;
        Some(Self {
            target: next.target.clone(),
            delta: applied,
            applied,
            undo_helper,
        })
    }

    fn apply(&mut self, state: &mut TimelineState) -> Result<(), EditError> {
        let TrimTarget { track, clip, .. } = self.target;
        let c = state.clip(track, clip)?.clone();
        let t = state.track(track)?;
        if matches!(t.entry(clip + 1), Some(Entry::Transition(_))) {
            return Err(EditError::TransitionAdjacent { track, clip });
        }
        let end = state.start_of(track, clip)? + c.length();
        let mut delta = self
            .delta
            .min(c.length() - 1)
            .max(-(c.max_out() - c.frame_out));
        if !self.target.ripple
            && let Some(room) = edit::blank_after(t, clip)
        {
            delta = delta.max(-room);
        }
        if delta != self.delta {
            debug!(target: "commands.trim", track, clip, wanted = self.delta, applied = delta, "trim_out_clamped");
        }

        let t = state.editable_track(track)?;
        if let Some(trimmed) = t.clip_mut(clip) {
            trimmed.frame_out -= delta;
            clamp_fades(trimmed);
        }
        if self.target.ripple {
            t.normalize();
            if let Some(change) = RippleEdit::from_delta(end, -delta) {
                self.target.propagate(state, change)?;
            }
        } else {
            edit::resize_blank_after(t, clip, delta);
        }
        debug!(target: "commands.trim", track, clip, delta, ripple = self.target.ripple, "trim_out");
        self.applied = delta;
        Ok(())
    }
}

impl Command for TrimClipOutCommand {
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
        "Trim clip out point"
    }

    fn merge_id(&self) -> Option<MergeId> {
        Some(MergeId::TrimClipOut)
    }
}

fn clamp_fades(clip: &mut Clip) {
    let length = clip.length();
    clip.producer.fade_in = clip.producer.fade_in.min(length);
    clip.producer.fade_out = clip.producer.fade_out.min(length);
}
