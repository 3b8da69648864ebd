use core_state::{EditError, SnapshotScope, TimelineState, UndoHelper};
use core_timeline::{Clip, Frame};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{Command, edit};

/// Per-clip result of an audio alignment pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Alignment {
    pub uuid: Uuid,
    /// Frames to move the clip by; the result is clamped at frame 0.
    pub offset: Frame,
    /// Speed multiplier applied on top of the clip's current speed.
    pub speed: f64,
}

/// Move and re-time several clips as one undo step.
#[derive(Debug, Clone)]
pub struct AlignClipsCommand {
    alignments: Vec<Alignment>,
    undo_helper: UndoHelper,
}

impl Default for AlignClipsCommand {
    fn default() -> Self {
        Self::new()
    }
}

impl AlignClipsCommand {
    pub fn new() -> Self {
        Self {
            alignments: Vec::new(),
            undo_helper: UndoHelper::new(SnapshotScope::AllTracks),
        }
    }

    pub fn add_alignment(&mut self, uuid: Uuid, offset: Frame, speed: f64) {
        self.alignments.push(Alignment {
            uuid,
            offset,
            speed,
        });
    }

    fn apply(&self, state: &mut TimelineState) -> Result<(), EditError> {
        if self.alignments.is_empty() {
            return Err(EditError::NoTargets);
        }
        for alignment in &self.alignments {
            let at = state
                .multitrack
                .find_clip(alignment.uuid)
                .ok_or(EditError::UnknownClip(alignment.uuid))?;
            let (mut clip, start) = edit::lift_clip(state, at.track, at.clip)?;
            if alignment.speed > 0.0 {
                rescale(&mut clip, alignment.speed);
            } else {
                warn!(target: "commands.align", uuid = %alignment.uuid, speed = alignment.speed, "speed_ignored");
            }
            let position = start.saturating_add(alignment.offset).max(0);
            let t = state.editable_track(at.track)?;
            edit::overwrite_clips(t, position, vec![clip])?;
            debug!(target: "commands.align", track = at.track, from = start, to = position, speed = alignment.speed, "clip_aligned");
        }
        Ok(())
    }
}

/// Play `clip` `factor` times faster, scaling its frame range so the same
/// source material is covered.
fn rescale(clip: &mut Clip, factor: f64) {
    if (factor - 1.0).abs() < f64::EPSILON {
        return;
    }
    let scale = |frames: Frame| (frames as f64 / factor).round() as Frame;
    clip.producer.speed *= factor;
    clip.producer.length = scale(clip.producer.length).max(1);
    let last = clip.producer.length - 1;
    clip.frame_in = scale(clip.frame_in).min(last);
    clip.frame_out = (scale(clip.frame_out + 1) - 1).min(last).max(clip.frame_in);
    clip.producer.fade_in = clip.producer.fade_in.min(clip.length());
    clip.producer.fade_out = clip.producer.fade_out.min(clip.length());
}

impl Command for AlignClipsCommand {
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
        "Align clips"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_timeline::Producer;

    #[test]
    fn doubling_speed_halves_the_range() {
        let mut clip = Clip::new(Producer::new("a.mp4", 200), 20, 119);
        rescale(&mut clip, 2.0);
        assert_eq!(clip.producer.length, 100);
        assert_eq!((clip.frame_in, clip.frame_out), (10, 59));
        assert_eq!(clip.producer.speed, 2.0);
    }
}
