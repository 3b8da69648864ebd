use core_state::{EditError, SnapshotScope, TimelineState, UndoHelper};
use core_timeline::{Frame, ModelError, Track, TrackKind, payload};
use tracing::debug;

use crate::{Command, edit};

/// Split a clip's audio onto an audio track.
///
/// The audio clip described by `payload` lands at `position` on the first
/// unlocked audio track with room for it; a new audio track is created when
/// none has. The source clip keeps playing video only.
#[derive(Debug, Clone)]
pub struct DetachAudioCommand {
    track: usize,
    clip: usize,
    position: Frame,
    payload: String,
    target_track: Option<usize>,
    track_added: bool,
    undo_helper: UndoHelper,
}

impl DetachAudioCommand {
    pub fn new(track: usize, clip: usize, position: Frame, payload: impl Into<String>) -> Self {
        Self {
            track,
            clip,
            position,
            payload: payload.into(),
            target_track: None,
            track_added: false,
            undo_helper: UndoHelper::new(SnapshotScope::AllTracks),
        }
    }

    /// Audio track that received the clip.
    pub fn target_track(&self) -> Option<usize> {
        self.target_track
    }

    pub fn track_added(&self) -> bool {
        self.track_added
    }

    fn apply(&mut self, state: &mut TimelineState) -> Result<(), EditError> {
        edit::check_position(self.position)?;
        let source = state.clip(self.track, self.clip)?.uuid;
        state.editable_track(self.track)?;
        let audio = payload::decode_new_clips(&self.payload)?
            .into_iter()
            .next()
            .ok_or(EditError::Model(ModelError::EmptyPayload))?;
        let length = audio.length();

        let free = state.multitrack.tracks().iter().position(|t| {
            t.kind == TrackKind::Audio && !t.lock && t.is_free(self.position, length)
        });
        let (target, added) = match free {
            Some(index) => (index, false),
            None => {
                let audio_tracks = state
                    .multitrack
                    .tracks()
                    .iter()
                    .filter(|t| t.kind == TrackKind::Audio)
                    .count();
                let name = format!("A{}", audio_tracks + 1);
                (state.multitrack.add_track(Track::new(TrackKind::Audio, name)), true)
            }
        };
        edit::overwrite_clips(state.editable_track(target)?, self.position, vec![audio])?;

        let at = state
            .multitrack
            .find_clip(source)
            .ok_or(EditError::UnknownClip(source))?;
        state.clip_mut(at.track, at.clip)?.producer.has_audio = false;

        debug!(target: "commands.clip", track = self.track, clip = self.clip, target, added, position = self.position, "audio_detached");
        self.target_track = Some(target);
        self.track_added = added;
        Ok(())
    }
}

impl Command for DetachAudioCommand {
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
        "Detach audio"
    }
}
