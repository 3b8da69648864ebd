#![allow(dead_code)] // Shared across many integration tests; each test binary uses a subset of helpers.

use core_state::{EditSettings, TimelineState};
use core_timeline::{Clip, Entry, Frame, Multitrack, Producer, Track, TrackKind, payload};

/// Clip using `[frame_in, frame_out]` of a 300 frame video source.
pub fn clip(name: &str, frame_in: Frame, frame_out: Frame) -> Clip {
    Clip::new(Producer::new(format!("{name}.mp4"), 300), frame_in, frame_out)
}

pub fn audio_clip(name: &str, length: Frame) -> Clip {
    Clip::whole(Producer::audio(format!("{name}.wav"), length))
}

pub fn track(kind: TrackKind, name: &str, entries: Vec<Entry>) -> Track {
    let mut t = Track::new(kind, name);
    for entry in entries {
        t.push_entry(entry);
    }
    t.normalize();
    t
}

pub fn state_with(tracks: Vec<Track>, settings: EditSettings) -> TimelineState {
    let mut multitrack = Multitrack::new();
    multitrack.set_tracks(tracks);
    TimelineState::new(multitrack).with_settings(settings)
}

/// Three tracks:
/// - `V1`: `a` [0,100), blank [100,120), `b` [120,220), `c` [220,270)
/// - `V2`: `d` [0,80)
/// - `A1`: `e` [0,200)
pub fn fixture() -> TimelineState {
    fixture_with(EditSettings::default())
}

pub fn fixture_with(settings: EditSettings) -> TimelineState {
    state_with(
        vec![
            track(
                TrackKind::Video,
                "V1",
                vec![
                    Entry::Clip(clip("a", 50, 149)),
                    Entry::blank(20),
                    Entry::Clip(clip("b", 50, 149)),
                    Entry::Clip(clip("c", 20, 69)),
                ],
            ),
            track(TrackKind::Video, "V2", vec![Entry::Clip(clip("d", 0, 79))]),
            track(
                TrackKind::Audio,
                "A1",
                vec![Entry::Clip(audio_clip("e", 200))],
            ),
        ],
        settings,
    )
}

pub fn settings(ripple_all_tracks: bool, ripple_markers: bool) -> EditSettings {
    EditSettings {
        ripple_all_tracks,
        ripple_markers,
        ..EditSettings::default()
    }
}

pub fn payload_of(clips: &[Clip]) -> String {
    payload::encode_clips(clips).unwrap()
}

/// Compact description of a track: `name[in..out]`, `_len` for blanks and
/// `T<len>` for transitions.
pub fn layout(state: &TimelineState, track: usize) -> Vec<String> {
    state
        .track(track)
        .unwrap()
        .entries()
        .iter()
        .map(|entry| match entry {
            Entry::Blank { length } => format!("_{length}"),
            Entry::Clip(c) => {
                let name = c.producer.resource.split('.').next().unwrap_or_default();
                format!("{name}[{}..{}]", c.frame_in, c.frame_out)
            }
            Entry::Transition(t) => format!("T{}", t.length()),
        })
        .collect()
}

/// `(start, uuid)` of every clip on a track.
pub fn clip_starts(state: &TimelineState, track: usize) -> Vec<(Frame, uuid::Uuid)> {
    let t = state.track(track).unwrap();
    t.clips()
        .map(|(i, c)| (t.start_of(i).unwrap(), c.uuid))
        .collect()
}
