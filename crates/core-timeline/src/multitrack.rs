use tracing::debug;
use uuid::Uuid;

use crate::{Clip, ClipPosition, GroupId, ModelError, Track, TrackKind};

/// Ordered collection of tracks.
///
/// Track 0 is the first lane. Video and audio tracks may interleave; the
/// convention enforced by `add_track` is videos first, then audio.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Multitrack {
    tracks: Vec<Track>,
}

impl Multitrack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    pub fn track(&self, index: usize) -> Result<&Track, ModelError> {
        self.tracks
            .get(index)
            .ok_or(ModelError::TrackOutOfRange { track: index })
    }

    pub fn track_mut(&mut self, index: usize) -> Result<&mut Track, ModelError> {
        self.tracks
            .get_mut(index)
            .ok_or(ModelError::TrackOutOfRange { track: index })
    }

    pub fn clip(&self, track: usize, clip: usize) -> Option<&Clip> {
        self.tracks.get(track).and_then(|t| t.clip(clip))
    }

    pub fn clip_mut(&mut self, track: usize, clip: usize) -> Option<&mut Clip> {
        self.tracks.get_mut(track).and_then(|t| t.clip_mut(clip))
    }

    /// Replace every track wholesale (snapshot restore).
    pub fn set_tracks(&mut self, tracks: Vec<Track>) {
        self.tracks = tracks;
    }

    pub fn replace_track(&mut self, index: usize, track: Track) -> Result<Track, ModelError> {
        let slot = self.track_mut(index)?;
        Ok(std::mem::replace(slot, track))
    }

    /// Insert a video track after the last video track or an audio track at
    /// the end. Returns the new track's index.
    pub fn add_track(&mut self, track: Track) -> usize {
        let index = match track.kind {
            TrackKind::Video => self
                .tracks
                .iter()
                .rposition(|t| t.kind == TrackKind::Video)
                .map_or(0, |i| i + 1),
            TrackKind::Audio => self.tracks.len(),
        };
        self.tracks.insert(index, track);
        debug!(target: "timeline.multitrack", index, tracks = self.tracks.len(), "track_added");
        index
    }

    pub fn insert_track(&mut self, index: usize, track: Track) -> Result<(), ModelError> {
        if index > self.tracks.len() {
            return Err(ModelError::TrackOutOfRange { track: index });
        }
        self.tracks.insert(index, track);
        Ok(())
    }

    pub fn remove_track(&mut self, index: usize) -> Result<Track, ModelError> {
        self.track(index)?;
        Ok(self.tracks.remove(index))
    }

    pub fn move_track(&mut self, from: usize, to: usize) -> Result<(), ModelError> {
        self.track(from)?;
        self.track(to)?;
        let track = self.tracks.remove(from);
        self.tracks.insert(to, track);
        Ok(())
    }

    pub fn find_clip(&self, uuid: Uuid) -> Option<ClipPosition> {
        self.tracks.iter().enumerate().find_map(|(t, track)| {
            track
                .clips()
                .find(|(_, c)| c.uuid == uuid)
                .map(|(i, _)| ClipPosition::new(t, i))
        })
    }

    /// One past the largest group id in use, 0 on an ungrouped timeline.
    pub fn next_group_id(&self) -> GroupId {
        self.tracks
            .iter()
            .flat_map(|t| t.clips().filter_map(|(_, c)| c.group))
            .max()
            .map_or(0, |g| g + 1)
    }
}
