//! Scalar clip property commands. These store the previous value and need
//! no snapshot.

use core_state::{EditError, TimelineState};
use core_timeline::{ClipPosition, Frame};
use std::collections::BTreeMap;
use tracing::trace;
use uuid::Uuid;

use crate::{Command, MergeId, edit};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FadeSide {
    In,
    Out,
}

#[derive(Debug, Clone)]
struct FadeChange {
    side: FadeSide,
    track: usize,
    clip: usize,
    uuid: Option<Uuid>,
    duration: Frame,
    previous: Option<Frame>,
}

impl FadeChange {
    fn new(
        state: &TimelineState,
        side: FadeSide,
        track: usize,
        clip: usize,
        duration: Frame,
    ) -> Self {
        Self {
            side,
            track,
            clip,
            uuid: state.clip(track, clip).ok().map(|c| c.uuid),
            duration,
            previous: None,
        }
    }

    fn set(&self, state: &mut TimelineState, value: Frame) -> Result<Frame, EditError> {
        let clip = edit::editable_clip(state, self.track, self.clip)?;
        let value = value.clamp(0, clip.length().max(0));
        let slot = match self.side {
            FadeSide::In => &mut clip.producer.fade_in,
            FadeSide::Out => &mut clip.producer.fade_out,
        };
        Ok(std::mem::replace(slot, value))
    }

    fn redo(&mut self, state: &mut TimelineState) -> Result<(), EditError> {
        let old = self.set(state, self.duration)?;
        self.previous.get_or_insert(old);
        trace!(target: "commands.property", side = ?self.side, track = self.track, clip = self.clip, duration = self.duration, previous = old, "fade");
        Ok(())
    }

    fn undo(&mut self, state: &mut TimelineState) -> Result<(), EditError> {
        let previous = self.previous.unwrap_or_default();
        self.set(state, previous)?;
        Ok(())
    }

    /// Later value wins, the oldest previous value is kept.
    fn merge(&self, next: &Self) -> Option<Self> {
        if self.uuid.is_none()
            || self.uuid != next.uuid
            || self.side != next.side
            || (self.track, self.clip) != (next.track, next.clip)
        {
            return None;
        }
        Some(Self {
            duration: next.duration,
            previous: self.previous,
            ..self.clone()
        })
    }
}

/// Set a clip's fade-in duration, clamped to `[0, clip length]`.
#[derive(Debug, Clone)]
pub struct FadeInCommand(FadeChange);

impl FadeInCommand {
    pub fn new(state: &TimelineState, track: usize, clip: usize, duration: Frame) -> Self {
        Self(FadeChange::new(state, FadeSide::In, track, clip, duration))
    }

    pub fn merge(&self, next: &Self) -> Option<Self> {
        self.0.merge(&next.0).map(Self)
    }
}

impl Command for FadeInCommand {
    fn redo(&mut self, state: &mut TimelineState) -> Result<(), EditError> {
        self.0.redo(state)
    }

    fn undo(&mut self, state: &mut TimelineState) -> Result<(), EditError> {
        self.0.undo(state)
    }

    fn text(&self) -> &'static str {
        "Adjust fade in"
    }

    fn merge_id(&self) -> Option<MergeId> {
        Some(MergeId::FadeIn)
    }
}

/// Set a clip's fade-out duration, clamped to `[0, clip length]`.
#[derive(Debug, Clone)]
pub struct FadeOutCommand(FadeChange);

impl FadeOutCommand {
    pub fn new(state: &TimelineState, track: usize, clip: usize, duration: Frame) -> Self {
        Self(FadeChange::new(state, FadeSide::Out, track, clip, duration))
    }

    pub fn merge(&self, next: &Self) -> Option<Self> {
        self.0.merge(&next.0).map(Self)
    }
}

impl Command for FadeOutCommand {
    fn redo(&mut self, state: &mut TimelineState) -> Result<(), EditError> {
        self.0.redo(state)
    }

    fn undo(&mut self, state: &mut TimelineState) -> Result<(), EditError> {
        self.0.undo(state)
    }

    fn text(&self) -> &'static str {
        "Adjust fade out"
    }

    fn merge_id(&self) -> Option<MergeId> {
        Some(MergeId::FadeOut)
    }
}

/// Set a clip's audio gain (linear, never negative).
#[derive(Debug, Clone)]
pub struct ChangeGainCommand {
    track: usize,
    clip: usize,
    uuid: Option<Uuid>,
    gain: f64,
    previous: Option<f64>,
}

impl ChangeGainCommand {
    pub fn new(state: &TimelineState, track: usize, clip: usize, gain: f64) -> Self {
        Self {
            track,
            clip,
            uuid: state.clip(track, clip).ok().map(|c| c.uuid),
            gain: gain.max(0.0),
            previous: None,
        }
    }

    pub fn merge(&self, next: &Self) -> Option<Self> {
        if self.uuid.is_none()
            || self.uuid != next.uuid
            || (self.track, self.clip) != (next.track, next.clip)
        {
            return None;
        }
        Some(Self {
            gain: next.gain,
            previous: self.previous,
            ..self.clone()
        })
    }
}

impl Command for ChangeGainCommand {
    fn redo(&mut self, state: &mut TimelineState) -> Result<(), EditError> {
        let clip = edit::editable_clip(state, self.track, self.clip)?;
        let old = std::mem::replace(&mut clip.producer.gain, self.gain);
        self.previous.get_or_insert(old);
        trace!(target: "commands.property", track = self.track, clip = self.clip, gain = self.gain, previous = old, "gain");
        Ok(())
    }

    fn undo(&mut self, state: &mut TimelineState) -> Result<(), EditError> {
        let clip = edit::editable_clip(state, self.track, self.clip)?;
        clip.producer.gain = self.previous.unwrap_or(1.0);
        Ok(())
    }

    fn text(&self) -> &'static str {
        "Change gain"
    }

    fn merge_id(&self) -> Option<MergeId> {
        Some(MergeId::ChangeGain)
    }
}

/// Paste a filter chain onto a set of clips.
#[derive(Debug, Clone)]
pub struct ApplyFiltersCommand {
    payload: String,
    targets: Vec<ClipPosition>,
    previous: BTreeMap<ClipPosition, String>,
}

impl ApplyFiltersCommand {
    pub fn new(payload: impl Into<String>) -> Self {
        Self {
            payload: payload.into(),
            targets: Vec::new(),
            previous: BTreeMap::new(),
        }
    }

    pub fn add_clip(&mut self, track: usize, clip: usize) {
        let at = ClipPosition::new(track, clip);
        if !self.targets.contains(&at) {
            self.targets.push(at);
        }
    }
}

impl Command for ApplyFiltersCommand {
    fn redo(&mut self, state: &mut TimelineState) -> Result<(), EditError> {
        if self.targets.is_empty() {
            return Err(EditError::NoTargets);
        }
        let mut previous = BTreeMap::new();
        for &at in &self.targets {
            let clip = state.clip(at.track, at.clip)?;
            previous.insert(at, clip.producer.filters.clone());
            if state.track(at.track)?.lock {
                return Err(EditError::Locked(at.track));
            }
        }
        for &at in &self.targets {
            state.clip_mut(at.track, at.clip)?.producer.filters = self.payload.clone();
        }
        trace!(target: "commands.property", targets = self.targets.len(), "filters_applied");
        self.previous = previous;
        Ok(())
    }

    fn undo(&mut self, state: &mut TimelineState) -> Result<(), EditError> {
        for (&at, filters) in &self.previous {
            state.clip_mut(at.track, at.clip)?.producer.filters = filters.clone();
        }
        Ok(())
    }

    fn text(&self) -> &'static str {
        "Apply copied filters"
    }
}
