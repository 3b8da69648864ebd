//! Timeline data model: tracks of clips, blanks and transitions plus markers.
//!
//! This crate is the in-memory multitrack the edit engine mutates. It only
//! offers low-level primitives (split, insert, remove, blank fill, track
//! bookkeeping, payload codec); every policy decision (ripple, clamping,
//! grouping, transition shape) lives in `core-commands`.
//!
//! Layout model:
//! - A `Track` is an ordered list of `Entry` values. The start frame of an
//!   entry is the sum of the lengths of the entries before it, so clips are
//!   always ordered and can never overlap. Overlaps are represented by an
//!   explicit `Transition` entry sitting between the two clips.
//! - Clip indices handed around by commands are *entry* indices: blanks and
//!   transitions occupy an index just like clips do.
//! - Tracks are normalized after every primitive that can fragment blank
//!   space (adjacent blanks merged, empty and trailing blanks dropped) so two
//!   timelines with the same content always compare equal.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

mod error;
pub mod markers;
mod multitrack;
pub mod payload;
mod track;

pub use error::ModelError;
pub use markers::{Marker, Markers};
pub use multitrack::Multitrack;
pub use track::{Track, TrackKind};

/// Frame count or frame position. Signed so deltas share the type.
pub type Frame = i32;

/// Group tag shared by clips that move and trim together.
pub type GroupId = u32;

/// Property key holding a transition's blend mode.
pub const TRANSITION_BLEND_PROPERTY: &str = "blend_mode";

/// Blend mode assigned to freshly created transitions.
pub const DEFAULT_BLEND_MODE: &str = "normal";

/// Address of an entry: `(track index, entry index)`, ordered track-major.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ClipPosition {
    pub track: usize,
    pub clip: usize,
}

impl ClipPosition {
    pub const fn new(track: usize, clip: usize) -> Self {
        Self { track, clip }
    }
}

/// Opaque handle to renderable media plus the per-clip scalar properties
/// the edit engine manipulates (fades, gain, filter chain, speed).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Producer {
    pub resource: String,
    /// Natural length of the media in frames at `speed`.
    pub length: Frame,
    #[serde(default = "Producer::default_speed")]
    pub speed: f64,
    #[serde(default = "Producer::default_true")]
    pub has_audio: bool,
    #[serde(default = "Producer::default_true")]
    pub has_video: bool,
    #[serde(default)]
    pub fade_in: Frame,
    #[serde(default)]
    pub fade_out: Frame,
    #[serde(default = "Producer::default_gain")]
    pub gain: f64,
    /// Serialized filter chain; empty when no filters are attached.
    #[serde(default)]
    pub filters: String,
}

impl Producer {
    pub fn new(resource: impl Into<String>, length: Frame) -> Self {
        Self {
            resource: resource.into(),
            length,
            speed: Self::default_speed(),
            has_audio: true,
            has_video: true,
            fade_in: 0,
            fade_out: 0,
            gain: Self::default_gain(),
            filters: String::new(),
        }
    }

    /// Audio-only media (no video stream).
    pub fn audio(resource: impl Into<String>, length: Frame) -> Self {
        Self {
            has_video: false,
            ..Self::new(resource, length)
        }
    }

    const fn default_speed() -> f64 {
        1.0
    }
    const fn default_gain() -> f64 {
        1.0
    }
    const fn default_true() -> bool {
        true
    }
}

/// A clip occupying `[frame_in, frame_out]` of its producer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clip {
    pub uuid: Uuid,
    pub producer: Producer,
    pub frame_in: Frame,
    pub frame_out: Frame,
    #[serde(default)]
    pub group: Option<GroupId>,
}

impl Clip {
    pub fn new(producer: Producer, frame_in: Frame, frame_out: Frame) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            producer,
            frame_in,
            frame_out,
            group: None,
        }
    }

    /// Clip covering the whole producer.
    pub fn whole(producer: Producer) -> Self {
        let out = producer.length - 1;
        Self::new(producer, 0, out)
    }

    pub fn length(&self) -> Frame {
        self.frame_out - self.frame_in + 1
    }

    /// Last valid source frame of the producer.
    pub fn max_out(&self) -> Frame {
        self.producer.length - 1
    }

    /// True when `next` continues this clip's source range seamlessly.
    pub fn continues_into(&self, next: &Clip) -> bool {
        self.producer.resource == next.producer.resource
            && self.producer.speed == next.producer.speed
            && next.frame_in == self.frame_out + 1
    }
}

/// One side of a transition: the overlapping source frames of a neighbouring clip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionPart {
    pub producer: Producer,
    pub frame_in: Frame,
    pub frame_out: Frame,
}

/// Overlap region between two adjacent clips.
///
/// Placed between clip `A` (before) and clip `B` (after) it satisfies
/// `a.frame_in == A.frame_out + 1` and `b.frame_out == B.frame_in - 1`, so
/// removing it and handing the frames back to either neighbour restores a
/// seamless single boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub uuid: Uuid,
    pub a: TransitionPart,
    pub b: TransitionPart,
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

impl Transition {
    pub fn new(a: TransitionPart, b: TransitionPart) -> Self {
        let mut properties = BTreeMap::new();
        properties.insert(
            TRANSITION_BLEND_PROPERTY.to_string(),
            DEFAULT_BLEND_MODE.to_string(),
        );
        Self {
            uuid: Uuid::new_v4(),
            a,
            b,
            properties,
        }
    }

    pub fn length(&self) -> Frame {
        self.a.frame_out - self.a.frame_in + 1
    }

    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(String::as_str)
    }
}

/// A single slot in a track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Entry {
    Blank { length: Frame },
    Clip(Clip),
    Transition(Transition),
}

impl Entry {
    pub fn blank(length: Frame) -> Self {
        Entry::Blank { length }
    }

    pub fn length(&self) -> Frame {
        match self {
            Entry::Blank { length } => *length,
            Entry::Clip(clip) => clip.length(),
            Entry::Transition(transition) => transition.length(),
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, Entry::Blank { .. })
    }

    pub fn as_clip(&self) -> Option<&Clip> {
        match self {
            Entry::Clip(clip) => Some(clip),
            _ => None,
        }
    }

    pub fn as_clip_mut(&mut self) -> Option<&mut Clip> {
        match self {
            Entry::Clip(clip) => Some(clip),
            _ => None,
        }
    }

    pub fn as_transition(&self) -> Option<&Transition> {
        match self {
            Entry::Transition(transition) => Some(transition),
            _ => None,
        }
    }

    pub fn as_transition_mut(&mut self) -> Option<&mut Transition> {
        match self {
            Entry::Transition(transition) => Some(transition),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clip_length_is_inclusive() {
        let clip = Clip::new(Producer::new("a.mp4", 100), 10, 19);
        assert_eq!(clip.length(), 10);
        assert_eq!(Entry::Clip(clip).length(), 10);
    }

    #[test]
    fn continues_into_requires_same_media_and_contiguity() {
        let left = Clip::new(Producer::new("a.mp4", 100), 0, 39);
        let right = Clip::new(Producer::new("a.mp4", 100), 40, 99);
        let other = Clip::new(Producer::new("b.mp4", 100), 40, 99);
        assert!(left.continues_into(&right));
        assert!(!left.continues_into(&other));
        assert!(!right.continues_into(&left));
    }

    #[test]
    fn new_transition_carries_default_blend_mode() {
        let part = |p: &str| TransitionPart {
            producer: Producer::new(p, 50),
            frame_in: 0,
            frame_out: 4,
        };
        let t = Transition::new(part("a"), part("b"));
        assert_eq!(t.length(), 5);
        assert_eq!(t.property(TRANSITION_BLEND_PROPERTY), Some(DEFAULT_BLEND_MODE));
    }

    #[test]
    fn clip_positions_order_track_major() {
        let mut v = vec![
            ClipPosition::new(1, 0),
            ClipPosition::new(0, 3),
            ClipPosition::new(0, 1),
        ];
        v.sort();
        assert_eq!(
            v,
            vec![
                ClipPosition::new(0, 1),
                ClipPosition::new(0, 3),
                ClipPosition::new(1, 0)
            ]
        );
    }
}
