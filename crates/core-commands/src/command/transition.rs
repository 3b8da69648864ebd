//! Transition commands.
//!
//! A transition between clip `A` and clip `B` borrows frames from both: its
//! `a` part continues A's source past `A.frame_out`, its `b` part precedes
//! `B.frame_in`. Growing or shrinking a transition therefore moves exactly one
//! clip boundary (A's out point on the in side, B's in point on the out side)
//! while every other position on the track stays where it was.
//!
//! Overlap arithmetic lives in `resize_in_side` / `resize_out_side`. An
//! overlap of zero means no transition; shrinking to zero removes the entry
//! and hands its frames back to the clip on the resized side.

use core_events::TimelineEvent;
use core_state::{EditError, SnapshotScope, TimelineState, UndoHelper};
use core_timeline::{
    Clip, DEFAULT_BLEND_MODE, Entry, Frame, TRANSITION_BLEND_PROPERTY, Track, Transition,
    TransitionPart, payload,
};
use tracing::{debug, trace};
use uuid::Uuid;

use crate::ripple::{self, RippleEdit};
use crate::{Command, MergeId, edit};

/// Outcome of an overlap resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Resized {
    /// Signed overlap change actually applied.
    change: Frame,
    /// Index of the transition afterwards, `None` when it was removed.
    transition: Option<usize>,
}

/// Overlap length for the out side of clip `a`: either `A, T, B` or `A, B`.
fn out_side(t: &Track, track: usize, a: usize) -> Result<Frame, EditError> {
    t.clip(a).ok_or(EditError::NotAClip { track, clip: a })?;
    match t.entry(a + 1) {
        Some(Entry::Transition(tr)) if t.clip(a + 2).is_some() => Ok(tr.length()),
        Some(Entry::Clip(_)) => Ok(0),
        _ => Err(EditError::NotAClip { track, clip: a + 1 }),
    }
}

/// Overlap length for the in side of clip `b`: either `A, T, B` or `A, B`.
fn in_side(t: &Track, track: usize, b: usize) -> Result<Frame, EditError> {
    t.clip(b).ok_or(EditError::NotAClip { track, clip: b })?;
    let Some(before) = b.checked_sub(1) else {
        return Err(EditError::InvalidPosition(0));
    };
    match t.entry(before) {
        Some(Entry::Transition(tr)) if before > 0 && t.clip(before - 1).is_some() => {
            Ok(tr.length())
        }
        Some(Entry::Clip(_)) => Ok(0),
        Some(_) => Err(EditError::NotAClip {
            track,
            clip: before,
        }),
        None => Err(EditError::InvalidClip {
            track,
            clip: before,
        }),
    }
}

/// Change the overlap between clip `a` and the clip after it by `change`
/// frames, moving B's in point. The overlap is clamped to `[min, max]` where
/// `max` keeps one frame of B and stays inside A's media.
fn resize_out_side(
    state: &mut TimelineState,
    track: usize,
    a: usize,
    change: Frame,
    min: Frame,
) -> Result<Resized, EditError> {
    let t = state.editable_track(track)?;
    let current = out_side(t, track, a)?;
    let b = if current > 0 { a + 2 } else { a + 1 };
    let (Some(clip_a), Some(clip_b)) = (t.clip(a).cloned(), t.clip(b).cloned()) else {
        return Err(EditError::NotAClip { track, clip: b });
    };
    let max = (current + clip_b.length() - 1).min(clip_a.max_out() - clip_a.frame_out);
    let wanted = current.saturating_add(change);
    let target = wanted.min(max).max(min.min(current));
    let applied = target - current;
    if target != wanted {
        debug!(target: "commands.transition", track, clip = a, wanted, overlap = target, "overlap_clamped");
    }

    let transition = if target == 0 {
        if current > 0 {
            let removed = t.remove_entries(a + 1..a + 2);
            if let (Some(Entry::Transition(tr)), Some(next)) = (removed.first(), t.clip_mut(a + 1)) {
                next.frame_in = tr.b.frame_in;
            }
        }
        None
    } else if current == 0 {
        let created = Transition::new(
            TransitionPart {
                producer: clip_a.producer.clone(),
                frame_in: clip_a.frame_out + 1,
                frame_out: clip_a.frame_out + target,
            },
            TransitionPart {
                producer: clip_b.producer.clone(),
                frame_in: clip_b.frame_in,
                frame_out: clip_b.frame_in + target - 1,
            },
        );
        if let Some(next) = t.clip_mut(b) {
            next.frame_in += target;
        }
        t.insert_entries(a + 1, [Entry::Transition(created)]);
        Some(a + 1)
    } else {
        if let Some(tr) = t.transition_mut(a + 1) {
            tr.a.frame_out += applied;
            tr.b.frame_out += applied;
        }
        if let Some(next) = t.clip_mut(b) {
            next.frame_in += applied;
        }
        Some(a + 1)
    };
    t.normalize();
    trace!(target: "commands.transition", track, clip = a, from = current, to = target, "out_side_resized");
    Ok(Resized {
        change: applied,
        transition,
    })
}

/// Change the overlap between clip `b` and the clip before it by `change`
/// frames, moving A's out point.
fn resize_in_side(
    state: &mut TimelineState,
    track: usize,
    b: usize,
    change: Frame,
    min: Frame,
) -> Result<Resized, EditError> {
    let t = state.editable_track(track)?;
    let current = in_side(t, track, b)?;
    let a = if current > 0 { b - 2 } else { b - 1 };
    let (Some(clip_a), Some(clip_b)) = (t.clip(a).cloned(), t.clip(b).cloned()) else {
        return Err(EditError::NotAClip { track, clip: a });
    };
    let existing = t.transition(b - 1).cloned();
    let source_room = existing
        .as_ref()
        .map_or(clip_b.frame_in, |tr| tr.b.frame_in + current);
    let max = (current + clip_a.length() - 1).min(source_room);
    let wanted = current.saturating_add(change);
    let target = wanted.min(max).max(min.min(current));
    let applied = target - current;
    if target != wanted {
        debug!(target: "commands.transition", track, clip = b, wanted, overlap = target, "overlap_clamped");
    }

    let transition = match existing {
        Some(tr) if target == 0 => {
            t.remove_entries(b - 1..b);
            if let Some(prev) = t.clip_mut(a) {
                prev.frame_out = tr.a.frame_out;
            }
            None
        }
        None if target == 0 => None,
        None => {
            let created = Transition::new(
                TransitionPart {
                    producer: clip_a.producer.clone(),
                    frame_in: clip_a.frame_out - target + 1,
                    frame_out: clip_a.frame_out,
                },
                TransitionPart {
                    producer: clip_b.producer.clone(),
                    frame_in: clip_b.frame_in - target,
                    frame_out: clip_b.frame_in - 1,
                },
            );
            if let Some(prev) = t.clip_mut(a) {
                prev.frame_out -= target;
            }
            t.insert_entries(b, [Entry::Transition(created)]);
            Some(b)
        }
        Some(_) => {
            if let Some(tr) = t.transition_mut(b - 1) {
                tr.a.frame_in -= applied;
                tr.b.frame_in -= applied;
            }
            if let Some(prev) = t.clip_mut(a) {
                prev.frame_out -= applied;
            }
            Some(b - 1)
        }
    };
    t.normalize();
    trace!(target: "commands.transition", track, clip = b, from = current, to = target, "in_side_resized");
    Ok(Resized {
        change: applied,
        transition,
    })
}

fn clip_uuid(state: &TimelineState, track: usize, clip: usize) -> Option<Uuid> {
    state.clip(track, clip).ok().map(|c| c.uuid)
}

fn transition_uuid(state: &TimelineState, track: usize, index: usize) -> Option<Uuid> {
    state.transition(track, index).ok().map(|t| t.uuid)
}

/// Move a clip so that it overlaps its neighbour, creating a transition.
///
/// `position` is the clip's new start. Moving left overlaps the previous clip
/// and pulls everything after the clip left; without ripple a blank keeps
/// downstream content in place. Moving right overlaps the next clip; the
/// frames consumed are exactly the gap plus the overlap, so downstream
/// content never moves.
#[derive(Debug, Clone)]
pub struct AddTransitionCommand {
    track: usize,
    clip: usize,
    position: Frame,
    ripple: bool,
    ripple_all_tracks: bool,
    ripple_markers: bool,
    undo_helper: UndoHelper,
    transition_index: Option<usize>,
}

impl AddTransitionCommand {
    pub fn new(
        state: &TimelineState,
        track: usize,
        clip: usize,
        position: Frame,
        ripple: bool,
    ) -> Self {
        let settings = state.settings;
        Self {
            track,
            clip,
            position,
            ripple,
            ripple_all_tracks: ripple && settings.ripple_all_tracks,
            ripple_markers: ripple::affects_markers(&settings, ripple),
            undo_helper: UndoHelper::new(ripple::scope_for(track, &settings, ripple))
                .with_markers(ripple::affects_markers(&settings, ripple)),
            transition_index: None,
        }
    }

    /// Index of the created transition after redo.
    pub fn transition_index(&self) -> Option<usize> {
        self.transition_index
    }

    fn apply(&mut self, state: &mut TimelineState) -> Result<(), EditError> {
        let (track, clip) = (self.track, self.clip);
        let moving = state.clip(track, clip)?.clone();
        let start = state.start_of(track, clip)?;
        edit::check_position(self.position)?;
        if self.position == start {
            return Err(EditError::InvalidPosition(self.position));
        }
        if self.position < start {
            self.overlap_left(state, &moving, start)
        } else {
            self.overlap_right(state, &moving, start)
        }
    }

    fn overlap_left(
        &mut self,
        state: &mut TimelineState,
        moving: &Clip,
        start: Frame,
    ) -> Result<(), EditError> {
        let (track, clip) = (self.track, self.clip);
        let distance = start - self.position;
        let t = state.editable_track(track)?;
        let gap = edit::blank_before(t, clip);
        let previous = if gap > 0 { clip.checked_sub(2) } else { clip.checked_sub(1) };
        let Some(neighbour) = previous.and_then(|i| t.clip(i)).cloned() else {
            return Err(EditError::InvalidPosition(self.position));
        };
        let overlap = (distance - gap)
            .min(neighbour.length() - 1)
            .min(moving.length() - 1);
        if overlap < 1 {
            return Err(EditError::InvalidPosition(self.position));
        }
        if gap > 0 {
            t.remove_entries(clip - 1..clip);
        }
        let index = edit::index_of(t, moving.uuid)?;
        let created = Transition::new(
            TransitionPart {
                producer: neighbour.producer.clone(),
                frame_in: neighbour.frame_out - overlap + 1,
                frame_out: neighbour.frame_out,
            },
            TransitionPart {
                producer: moving.producer.clone(),
                frame_in: moving.frame_in,
                frame_out: moving.frame_in + overlap - 1,
            },
        );
        if let Some(prev) = t.clip_mut(index - 1) {
            prev.frame_out -= overlap;
        }
        if let Some(shortened) = t.clip_mut(index) {
            shortened.frame_in += overlap;
        }
        t.insert_entries(index, [Entry::Transition(created)]);
        let moved_by = gap + overlap;
        if !self.ripple {
            t.insert_entries(index + 2, [Entry::blank(moved_by)]);
        }
        t.normalize();
        self.transition_index = Some(edit::index_of(t, moving.uuid)? - 1);

        if self.ripple {
            let old_end = start + moving.length();
            let change = RippleEdit::Remove {
                start: old_end - moved_by,
                end: old_end,
            };
            if self.ripple_all_tracks {
                ripple::ripple_other_tracks(state, track, change)?;
            }
            if self.ripple_markers {
                ripple::ripple_markers(&mut state.markers, change);
            }
        }
        debug!(target: "commands.transition", track, clip, overlap, moved_by, ripple = self.ripple, "transition_added_left");
        Ok(())
    }

    fn overlap_right(
        &mut self,
        state: &mut TimelineState,
        moving: &Clip,
        start: Frame,
    ) -> Result<(), EditError> {
        let (track, clip) = (self.track, self.clip);
        let distance = self.position - start;
        let t = state.editable_track(track)?;
        let gap = edit::blank_after(t, clip).unwrap_or(0);
        let next = if gap > 0 { clip + 2 } else { clip + 1 };
        let Some(neighbour) = t.clip(next).cloned() else {
            return Err(EditError::InvalidPosition(self.position));
        };
        let overlap = (distance - gap)
            .min(neighbour.length() - 1)
            .min(moving.length() - 1);
        if overlap < 1 {
            return Err(EditError::InvalidPosition(self.position));
        }
        if gap > 0 {
            t.remove_entries(clip + 1..clip + 2);
        }
        let created = Transition::new(
            TransitionPart {
                producer: moving.producer.clone(),
                frame_in: moving.frame_out - overlap + 1,
                frame_out: moving.frame_out,
            },
            TransitionPart {
                producer: neighbour.producer.clone(),
                frame_in: neighbour.frame_in,
                frame_out: neighbour.frame_in + overlap - 1,
            },
        );
        if let Some(shortened) = t.clip_mut(clip) {
            shortened.frame_out -= overlap;
        }
        if let Some(following) = t.clip_mut(clip + 1) {
            following.frame_in += overlap;
        }
        t.insert_entries(clip + 1, [Entry::Transition(created)]);
        t.insert_entries(clip, [Entry::blank(gap + overlap)]);
        t.normalize();
        self.transition_index = Some(edit::index_of(t, moving.uuid)? + 1);
        debug!(target: "commands.transition", track, clip, overlap, gap, "transition_added_right");
        Ok(())
    }
}

impl Command for AddTransitionCommand {
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
        "Add transition"
    }
}

/// Shrink (positive delta) or grow a transition on its in side, moving the
/// preceding clip's out point. The transition keeps at least one frame.
#[derive(Debug, Clone)]
pub struct TrimTransitionInCommand {
    track: usize,
    transition: usize,
    uuid: Option<Uuid>,
    delta: Frame,
    applied: Frame,
    undo_helper: UndoHelper,
}

impl TrimTransitionInCommand {
    pub fn new(state: &TimelineState, track: usize, transition: usize, delta: Frame) -> Self {
        Self {
            track,
            transition,
            uuid: transition_uuid(state, track, transition),
            delta,
            applied: 0,
            undo_helper: UndoHelper::new(SnapshotScope::Track(track)),
        }
    }

    pub fn merge(&self, next: &Self) -> Option<Self> {
        if self.uuid.is_none() || self.uuid != next.uuid || self.track != next.track {
            return None;
        }
        let undo_helper = self.undo_helper.merge(&next.undo_helper)?;
        let applied = self.applied + next.applied;
        Some(Self {
            delta: applied,
            applied,
            undo_helper,
            ..next.clone()
        })
    }
}

impl Command for TrimTransitionInCommand {
    fn redo(&mut self, state: &mut TimelineState) -> Result<(), EditError> {
        if self.undo_helper.replay_or_begin(state)? {
            return Ok(());
        }
        let outcome = state
            .transition(self.track, self.transition)
            .map(|_| ())
            .and_then(|()| {
                let change = self.delta.saturating_neg();
                resize_in_side(state, self.track, self.transition + 1, change, 1)
            });
        let outcome = outcome.map(|resized| self.applied = -resized.change);
        self.undo_helper.finish(state, outcome)
    }

    fn undo(&mut self, state: &mut TimelineState) -> Result<(), EditError> {
        self.undo_helper.undo_changes(state)
    }

    fn text(&self) -> &'static str {
        "Trim transition in point"
    }

    fn merge_id(&self) -> Option<MergeId> {
        Some(MergeId::TrimTransitionIn)
    }
}

/// Shrink (positive delta) or grow a transition on its out side, moving the
/// following clip's in point. The transition keeps at least one frame.
#[derive(Debug, Clone)]
pub struct TrimTransitionOutCommand {
    track: usize,
    transition: usize,
    uuid: Option<Uuid>,
    delta: Frame,
    applied: Frame,
    undo_helper: UndoHelper,
}

impl TrimTransitionOutCommand {
    pub fn new(state: &TimelineState, track: usize, transition: usize, delta: Frame) -> Self {
        Self {
            track,
            transition,
            uuid: transition_uuid(state, track, transition),
            delta,
            applied: 0,
            undo_helper: UndoHelper::new(SnapshotScope::Track(track)),
        }
    }

    pub fn merge(&self, next: &Self) -> Option<Self> {
        if self.uuid.is_none() || self.uuid != next.uuid || self.track != next.track {
            return None;
        }
        let undo_helper = self.undo_helper.merge(&next.undo_helper)?;
        let applied = self.applied + next.applied;
        Some(Self {
            delta: applied,
            applied,
            undo_helper,
            ..next.clone()
        })
    }
}

impl Command for TrimTransitionOutCommand {
    fn redo(&mut self, state: &mut TimelineState) -> Result<(), EditError> {
        if self.undo_helper.replay_or_begin(state)? {
            return Ok(());
        }
        let found = state.transition(self.track, self.transition).map(|_| ());
        let outcome = match (found, self.transition.checked_sub(1)) {
            (Ok(()), Some(a)) => resize_out_side(state, self.track, a, self.delta.saturating_neg(), 1),
            (Ok(()), None) => Err(EditError::InvalidClip {
                track: self.track,
                clip: 0,
            }),
            (Err(err), _) => Err(err),
        };
        let outcome = outcome.map(|resized| self.applied = -resized.change);
        self.undo_helper.finish(state, outcome)
    }

    fn undo(&mut self, state: &mut TimelineState) -> Result<(), EditError> {
        self.undo_helper.undo_changes(state)
    }

    fn text(&self) -> &'static str {
        "Trim transition out point"
    }

    fn merge_id(&self) -> Option<MergeId> {
        Some(MergeId::TrimTransitionOut)
    }
}

/// Drag a clip's in point into the preceding clip by `duration` frames,
/// creating (or growing) the transition between them. Negative durations
/// shrink it; reaching zero removes it.
#[derive(Debug, Clone)]
pub struct AddTransitionByTrimInCommand {
    track: usize,
    clip: usize,
    uuid: Option<Uuid>,
    duration: Frame,
    applied: Frame,
    undo_helper: UndoHelper,
}

impl AddTransitionByTrimInCommand {
    pub fn new(state: &TimelineState, track: usize, clip: usize, duration: Frame) -> Self {
        Self {
            track,
            clip,
            uuid: clip_uuid(state, track, clip),
            duration,
            applied: 0,
            undo_helper: UndoHelper::new(SnapshotScope::Track(track)),
        }
    }

    pub fn merge(&self, next: &Self) -> Option<Self> {
        if self.uuid.is_none() || self.uuid != next.uuid || self.track != next.track {
            return None;
        }
        let undo_helper = self.undo_helper.merge(&next.undo_helper)?;
        let applied = self.applied + next.applied;
        Some(Self {
            duration: applied,
            applied,
            undo_helper,
            ..next.clone()
        })
    }
}

impl Command for AddTransitionByTrimInCommand {
    fn redo(&mut self, state: &mut TimelineState) -> Result<(), EditError> {
        if self.undo_helper.replay_or_begin(state)? {
            return Ok(());
        }
        let outcome = resize_in_side(state, self.track, self.clip, self.duration, 0)
            .map(|resized| self.applied = resized.change);
        self.undo_helper.finish(state, outcome)
    }

    fn undo(&mut self, state: &mut TimelineState) -> Result<(), EditError> {
        self.undo_helper.undo_changes(state)
    }

    fn text(&self) -> &'static str {
        "Add transition"
    }

    fn merge_id(&self) -> Option<MergeId> {
        Some(MergeId::AddTransitionByTrimIn)
    }
}

/// Drag a clip's out point into the following clip by `duration` frames,
/// creating (or growing) the transition between them. Negative durations
/// shrink it; reaching zero removes it and restores the single boundary.
#[derive(Debug, Clone)]
pub struct AddTransitionByTrimOutCommand {
    track: usize,
    clip: usize,
    uuid: Option<Uuid>,
    duration: Frame,
    applied: Frame,
    undo_helper: UndoHelper,
}

impl AddTransitionByTrimOutCommand {
    pub fn new(state: &TimelineState, track: usize, clip: usize, duration: Frame) -> Self {
        Self {
            track,
            clip,
            uuid: clip_uuid(state, track, clip),
            duration,
            applied: 0,
            undo_helper: UndoHelper::new(SnapshotScope::Track(track)),
        }
    }

    pub fn merge(&self, next: &Self) -> Option<Self> {
        if self.uuid.is_none() || self.uuid != next.uuid || self.track != next.track {
            return None;
        }
        let undo_helper = self.undo_helper.merge(&next.undo_helper)?;
        let applied = self.applied + next.applied;
        Some(Self {
            duration: applied,
            applied,
            undo_helper,
            ..next.clone()
        })
    }
}

impl Command for AddTransitionByTrimOutCommand {
    fn redo(&mut self, state: &mut TimelineState) -> Result<(), EditError> {
        if self.undo_helper.replay_or_begin(state)? {
            return Ok(());
        }
        let outcome = resize_out_side(state, self.track, self.clip, self.duration, 0)
            .map(|resized| self.applied = resized.change);
        self.undo_helper.finish(state, outcome)
    }

    fn undo(&mut self, state: &mut TimelineState) -> Result<(), EditError> {
        self.undo_helper.undo_changes(state)
    }

    fn text(&self) -> &'static str {
        "Add transition"
    }

    fn merge_id(&self) -> Option<MergeId> {
        Some(MergeId::AddTransitionByTrimOut)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReturnFramesTo {
    Previous,
    Next,
}

#[derive(Debug, Clone)]
struct TransitionRemoval {
    track: usize,
    transition: usize,
    to: ReturnFramesTo,
    removed_payload: Option<String>,
    undo_helper: UndoHelper,
}

impl TransitionRemoval {
    fn new(track: usize, transition: usize, to: ReturnFramesTo) -> Self {
        Self {
            track,
            transition,
            to,
            removed_payload: None,
            undo_helper: UndoHelper::new(SnapshotScope::Track(track)),
        }
    }

    fn apply(&mut self, state: &mut TimelineState) -> Result<(), EditError> {
        let (track, index) = (self.track, self.transition);
        let tr = state.transition(track, index)?;
        let length = tr.length();
        let encoded = payload::encode_transition(tr)?;
        let resized = match self.to {
            ReturnFramesTo::Previous => resize_in_side(state, track, index + 1, -length, 0)?,
            ReturnFramesTo::Next => {
                let a = index
                    .checked_sub(1)
                    .ok_or(EditError::InvalidClip { track, clip: 0 })?;
                resize_out_side(state, track, a, -length, 0)?
            }
        };
        if resized.transition.is_some() {
            return Err(EditError::NotATransition { track, clip: index });
        }
        debug!(target: "commands.transition", track, transition = index, length, to = ?self.to, "transition_removed");
        self.removed_payload = Some(encoded);
        Ok(())
    }

    fn redo(&mut self, state: &mut TimelineState) -> Result<(), EditError> {
        if self.undo_helper.replay_or_begin(state)? {
            return Ok(());
        }
        let outcome = self.apply(state);
        self.undo_helper.finish(state, outcome)
    }
}

/// Remove a transition, giving its frames back to the preceding clip.
#[derive(Debug, Clone)]
pub struct RemoveTransitionByTrimInCommand(TransitionRemoval);

impl RemoveTransitionByTrimInCommand {
    pub fn new(track: usize, transition: usize) -> Self {
        Self(TransitionRemoval::new(track, transition, ReturnFramesTo::Previous))
    }

    /// Serialized transition captured when it was removed.
    pub fn removed_payload(&self) -> Option<&str> {
        self.0.removed_payload.as_deref()
    }
}

impl Command for RemoveTransitionByTrimInCommand {
    fn redo(&mut self, state: &mut TimelineState) -> Result<(), EditError> {
        self.0.redo(state)
    }

    fn undo(&mut self, state: &mut TimelineState) -> Result<(), EditError> {
        self.0.undo_helper.undo_changes(state)
    }

    fn text(&self) -> &'static str {
        "Remove transition"
    }
}

/// Remove a transition, giving its frames back to the following clip.
#[derive(Debug, Clone)]
pub struct RemoveTransitionByTrimOutCommand(TransitionRemoval);

impl RemoveTransitionByTrimOutCommand {
    pub fn new(track: usize, transition: usize) -> Self {
        Self(TransitionRemoval::new(track, transition, ReturnFramesTo::Next))
    }

    pub fn removed_payload(&self) -> Option<&str> {
        self.0.removed_payload.as_deref()
    }
}

impl Command for RemoveTransitionByTrimOutCommand {
    fn redo(&mut self, state: &mut TimelineState) -> Result<(), EditError> {
        self.0.redo(state)
    }

    fn undo(&mut self, state: &mut TimelineState) -> Result<(), EditError> {
        self.0.undo_helper.undo_changes(state)
    }

    fn text(&self) -> &'static str {
        "Remove transition"
    }
}

/// Set a transition property (the blend mode by default).
#[derive(Debug, Clone)]
pub struct ChangeBlendModeCommand {
    track: usize,
    transition: usize,
    property: String,
    mode: String,
    previous: Option<String>,
    current: String,
}

impl ChangeBlendModeCommand {
    pub fn new(track: usize, transition: usize, mode: impl Into<String>) -> Self {
        Self::with_property(track, transition, TRANSITION_BLEND_PROPERTY, mode)
    }

    pub fn with_property(
        track: usize,
        transition: usize,
        property: impl Into<String>,
        mode: impl Into<String>,
    ) -> Self {
        let mode = mode.into();
        Self {
            track,
            transition,
            property: property.into(),
            current: mode.clone(),
            mode,
            previous: None,
        }
    }

    fn set(
        &mut self,
        state: &mut TimelineState,
        value: Option<String>,
    ) -> Result<Option<String>, EditError> {
        state.editable_track(self.track)?;
        let tr = state.transition_mut(self.track, self.transition)?;
        let old = match &value {
            Some(v) => tr.properties.insert(self.property.clone(), v.clone()),
            None => tr.properties.remove(&self.property),
        };
        self.current = value.unwrap_or_else(|| DEFAULT_BLEND_MODE.to_string());
        Ok(old)
    }
}

impl Command for ChangeBlendModeCommand {
    fn redo(&mut self, state: &mut TimelineState) -> Result<(), EditError> {
        let old = self.set(state, Some(self.mode.clone()))?;
        self.previous = old;
        trace!(target: "commands.transition", track = self.track, transition = self.transition, mode = %self.mode, "blend_mode_changed");
        Ok(())
    }

    fn undo(&mut self, state: &mut TimelineState) -> Result<(), EditError> {
        let previous = self.previous.clone();
        self.set(state, previous)?;
        Ok(())
    }

    fn text(&self) -> &'static str {
        "Change blend mode"
    }

    fn notification(&self) -> Option<TimelineEvent> {
        Some(TimelineEvent::BlendModeChanged {
            track: self.track,
            transition: self.transition,
            mode: self.current.clone(),
        })
    }
}
