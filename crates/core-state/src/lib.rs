//! Timeline state: the multitrack, the marker list and the edit settings
//! every command reads at construction time.
//!
//! The state is owned by the caller and lent mutably to the history for the
//! duration of one push / undo / redo, which is what serializes all mutation.
//! Nothing in here is global.
//!
//! Undo Snapshots:
//! - `undo::UndoHelper` captures an `UndoRecord` of one, several or all tracks
//!   (optionally plus markers) before a structural edit and another after it.
//! - Undo restores the before record wholesale, redo restores the after
//!   record, so commands with cascading effects (ripple, transition creation)
//!   never hand-write inverse logic.
//! - Both directions first check that the live state still equals the record
//!   they expect to replace; see `EditSettings::strict_snapshots`.

use core_timeline::{Clip, Frame, Markers, ModelError, Multitrack, Track, Transition};
use uuid::Uuid;

pub mod undo;
pub use undo::{SnapshotScope, UndoHelper, UndoRecord};

/// Failure of a command's redo or undo. The command boundary guarantees no
/// partial mutation survives an error.
#[derive(Debug, thiserror::Error)]
pub enum EditError {
    #[error("track {0} does not exist")]
    InvalidTrack(usize),
    #[error("no entry {clip} on track {track}")]
    InvalidClip { track: usize, clip: usize },
    #[error("entry {clip} on track {track} is not a clip")]
    NotAClip { track: usize, clip: usize },
    #[error("entry {clip} on track {track} is not a transition")]
    NotATransition { track: usize, clip: usize },
    #[error("position {0} is not valid for this edit")]
    InvalidPosition(Frame),
    #[error("entry {clip} on track {track} cannot be merged with its neighbour")]
    NotMergeable { track: usize, clip: usize },
    #[error("trimmed side of entry {clip} on track {track} borders a transition")]
    TransitionAdjacent { track: usize, clip: usize },
    #[error("track {0} is locked")]
    Locked(usize),
    #[error("no clip with identity {0}")]
    UnknownClip(Uuid),
    #[error("command has no targets")]
    NoTargets,
    #[error("timeline does not match the {0} snapshot")]
    SnapshotMismatch(&'static str),
    #[error(transparent)]
    Model(ModelError),
}

impl From<ModelError> for EditError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::TrackOutOfRange { track } => EditError::InvalidTrack(track),
            ModelError::NegativePosition(p) => EditError::InvalidPosition(p),
            other => EditError::Model(other),
        }
    }
}

/// Edit modes captured by commands when they are constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditSettings {
    /// Timeline ripple used by commands that do not take an explicit flag.
    pub ripple: bool,
    /// Ripple edits into every unlocked track, not just the edited one.
    pub ripple_all_tracks: bool,
    /// Ripple edits shift and trim markers.
    pub ripple_markers: bool,
    /// Abort undo/redo when the live timeline drifted from the recorded snapshot.
    pub strict_snapshots: bool,
}

impl Default for EditSettings {
    fn default() -> Self {
        Self {
            ripple: true,
            ripple_all_tracks: false,
            ripple_markers: false,
            strict_snapshots: true,
        }
    }
}

impl From<&core_config::Config> for EditSettings {
    fn from(cfg: &core_config::Config) -> Self {
        Self {
            ripple: cfg.ripple().enabled,
            ripple_all_tracks: cfg.ripple().all_tracks,
            ripple_markers: cfg.ripple().markers,
            strict_snapshots: cfg.history().strict_snapshots,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimelineState {
    pub multitrack: Multitrack,
    pub markers: Markers,
    pub settings: EditSettings,
}

impl TimelineState {
    pub fn new(multitrack: Multitrack) -> Self {
        Self {
            multitrack,
            ..Self::default()
        }
    }

    pub fn with_settings(mut self, settings: EditSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn track(&self, index: usize) -> Result<&Track, EditError> {
        Ok(self.multitrack.track(index)?)
    }

    pub fn track_mut(&mut self, index: usize) -> Result<&mut Track, EditError> {
        Ok(self.multitrack.track_mut(index)?)
    }

    /// Mutable track access for content edits; locked tracks are refused.
    pub fn editable_track(&mut self, index: usize) -> Result<&mut Track, EditError> {
        let track = self.multitrack.track_mut(index)?;
        if track.lock {
            return Err(EditError::Locked(index));
        }
        Ok(track)
    }

    pub fn clip(&self, track: usize, clip: usize) -> Result<&Clip, EditError> {
        let t = self.track(track)?;
        let entry = t.entry(clip).ok_or(EditError::InvalidClip { track, clip })?;
        entry.as_clip().ok_or(EditError::NotAClip { track, clip })
    }

    pub fn clip_mut(&mut self, track: usize, clip: usize) -> Result<&mut Clip, EditError> {
        let t = self.track_mut(track)?;
        if clip >= t.count() {
            return Err(EditError::InvalidClip { track, clip });
        }
        t.clip_mut(clip).ok_or(EditError::NotAClip { track, clip })
    }

    pub fn transition(&self, track: usize, clip: usize) -> Result<&Transition, EditError> {
        let t = self.track(track)?;
        let entry = t.entry(clip).ok_or(EditError::InvalidClip { track, clip })?;
        entry
            .as_transition()
            .ok_or(EditError::NotATransition { track, clip })
    }

    pub fn transition_mut(
        &mut self,
        track: usize,
        clip: usize,
    ) -> Result<&mut Transition, EditError> {
        let t = self.track_mut(track)?;
        if clip >= t.count() {
            return Err(EditError::InvalidClip { track, clip });
        }
        t.transition_mut(clip)
            .ok_or(EditError::NotATransition { track, clip })
    }

    /// Timeline start of entry `clip` on `track`.
    pub fn start_of(&self, track: usize, clip: usize) -> Result<Frame, EditError> {
        self.track(track)?
            .start_of(clip)
            .ok_or(EditError::InvalidClip { track, clip })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_timeline::{Entry, Producer, TrackKind};

    fn state() -> TimelineState {
        let mut mt = Multitrack::new();
        let mut track = Track::new(TrackKind::Video, "V1");
        track.push_entry(Entry::blank(5));
        track.push_entry(Entry::Clip(Clip::whole(Producer::new("a", 10))));
        mt.add_track(track);
        TimelineState::new(mt)
    }

    #[test]
    fn clip_lookup_distinguishes_failures() {
        let s = state();
        assert!(s.clip(0, 1).is_ok());
        assert!(matches!(s.clip(0, 0), Err(EditError::NotAClip { .. })));
        assert!(matches!(s.clip(0, 9), Err(EditError::InvalidClip { .. })));
        assert!(matches!(s.clip(3, 0), Err(EditError::InvalidTrack(3))));
        assert_eq!(s.start_of(0, 1).unwrap(), 5);
    }

    #[test]
    fn locked_tracks_refuse_content_edits() {
        let mut s = state();
        s.track_mut(0).unwrap().lock = true;
        assert!(matches!(s.editable_track(0), Err(EditError::Locked(0))));
        assert!(s.track_mut(0).is_ok());
    }

    #[test]
    fn settings_follow_config() {
        let mut cfg = core_config::Config::default();
        cfg.file.ripple.markers = true;
        cfg.file.history.strict_snapshots = false;
        let settings = EditSettings::from(&cfg);
        assert!(settings.ripple);
        assert!(settings.ripple_markers);
        assert!(!settings.strict_snapshots);
    }
}
