//! Track-level building blocks shared by the structural commands.
//!
//! Every helper leaves the track normalized. Index results are looked up by
//! clip identity after normalization, so callers never have to reason about
//! blanks that were merged or dropped along the way.

use core_state::{EditError, TimelineState};
use core_timeline::{Clip, Entry, Frame, Track};
use uuid::Uuid;

pub(crate) fn clips_length(clips: &[Clip]) -> Frame {
    clips.iter().map(Clip::length).sum()
}

pub(crate) fn index_of(track: &Track, uuid: Uuid) -> Result<usize, EditError> {
    track
        .clips()
        .find(|(_, c)| c.uuid == uuid)
        .map(|(i, _)| i)
        .ok_or(EditError::UnknownClip(uuid))
}

pub(crate) fn check_position(position: Frame) -> Result<(), EditError> {
    if position < 0 {
        return Err(EditError::InvalidPosition(position));
    }
    Ok(())
}

/// Lock-checked mutable access to one clip.
pub(crate) fn editable_clip(
    state: &mut TimelineState,
    track: usize,
    clip: usize,
) -> Result<&mut Clip, EditError> {
    state.clip(track, clip)?;
    state.editable_track(track)?;
    state.clip_mut(track, clip)
}

/// Insert `clips` at `position`, pushing everything at or after it to the
/// right. Returns the index of the first inserted clip.
pub(crate) fn insert_clips(
    track: &mut Track,
    position: Frame,
    clips: Vec<Clip>,
) -> Result<usize, EditError> {
    check_position(position)?;
    let Some(first) = clips.first().map(|c| c.uuid) else {
        return Err(EditError::NoTargets);
    };
    let index = track.split_at(position)?;
    track.insert_entries(index, clips.into_iter().map(Entry::Clip));
    track.normalize();
    index_of(track, first)
}

/// Replace frames `[position, position + length)` with `clips`.
pub(crate) fn overwrite_clips(
    track: &mut Track,
    position: Frame,
    clips: Vec<Clip>,
) -> Result<usize, EditError> {
    check_position(position)?;
    let Some(first) = clips.first().map(|c| c.uuid) else {
        return Err(EditError::NoTargets);
    };
    let length = clips_length(&clips);
    let start = track.split_at(position)?;
    let end = track.split_at(position + length)?;
    track.remove_entries(start..end);
    track.insert_entries(start, clips.into_iter().map(Entry::Clip));
    track.normalize();
    index_of(track, first)
}

/// Remove the transitions on either side of the clip at `index`, handing
/// their frames back to the clip's neighbours so those neighbours keep their
/// timeline positions. Returns the clip's new index. The track is not
/// normalized.
pub(crate) fn dissolve_transitions(track: &mut Track, index: usize) -> usize {
    let mut index = index;
    if let Some(transition) = track.transition(index + 1).cloned() {
        track.remove_entries(index + 1..index + 2);
        match track.clip_mut(index + 1) {
            Some(next) => next.frame_in = transition.b.frame_in,
            None => track.insert_entries(index + 1, [Entry::blank(transition.length())]),
        }
    }
    if index > 0
        && let Some(transition) = track.transition(index - 1).cloned()
    {
        track.remove_entries(index - 1..index);
        index -= 1;
        match index.checked_sub(1).and_then(|i| track.clip_mut(i)) {
            Some(previous) => previous.frame_out = transition.a.frame_out,
            None => {
                track.insert_entries(index, [Entry::blank(transition.length())]);
                index += 1;
            }
        }
    }
    index
}

/// Replace a clip with blank space of the same length. Returns the clip and
/// its former start.
pub(crate) fn lift_clip(
    state: &mut TimelineState,
    track: usize,
    clip: usize,
) -> Result<(Clip, Frame), EditError> {
    state.clip(track, clip)?;
    let t = state.editable_track(track)?;
    let index = dissolve_transitions(t, clip);
    let start = t.start_of(index).unwrap_or_default();
    let length = t.entry(index).map_or(0, Entry::length);
    let removed = t.replace_entry(index, Entry::blank(length));
    t.normalize();
    match removed {
        Some(Entry::Clip(c)) => Ok((c, start)),
        _ => Err(EditError::NotAClip { track, clip }),
    }
}

/// Delete a clip, closing the gap on its own track. Returns the clip and
/// its former start.
pub(crate) fn remove_clip(
    state: &mut TimelineState,
    track: usize,
    clip: usize,
) -> Result<(Clip, Frame), EditError> {
    state.clip(track, clip)?;
    let t = state.editable_track(track)?;
    let index = dissolve_transitions(t, clip);
    let start = t.start_of(index).unwrap_or_default();
    let mut removed = t.remove_entries(index..index + 1);
    t.normalize();
    match removed.pop() {
        Some(Entry::Clip(c)) => Ok((c, start)),
        _ => Err(EditError::NotAClip { track, clip }),
    }
}

/// Length of the blank directly before entry `index` (0 when there is none).
pub(crate) fn blank_before(track: &Track, index: usize) -> Frame {
    match index.checked_sub(1).and_then(|i| track.entry(i)) {
        Some(Entry::Blank { length }) => *length,
        _ => 0,
    }
}

/// Length of the blank directly after entry `index`; `None` when the entry is
/// the last one, so the space after it is unbounded.
pub(crate) fn blank_after(track: &Track, index: usize) -> Option<Frame> {
    match track.entry(index + 1) {
        Some(Entry::Blank { length }) => Some(*length),
        Some(_) => Some(0),
        None => None,
    }
}

/// Grow (`change > 0`) or shrink the blank directly before entry `index`.
/// Returns the index the entry has afterwards; the track is normalized.
pub(crate) fn resize_blank_before(
    track: &mut Track,
    index: usize,
    change: Frame,
    uuid: Uuid,
) -> Result<usize, EditError> {
    let existing = blank_before(track, index);
    if existing > 0 {
        track.replace_entry(index - 1, Entry::blank(existing + change));
    } else if change > 0 {
        track.insert_entries(index, [Entry::blank(change)]);
    }
    track.normalize();
    index_of(track, uuid)
}

/// Grow (`change > 0`) or shrink the blank directly after entry `index`.
pub(crate) fn resize_blank_after(track: &mut Track, index: usize, change: Frame) {
    match track.entry(index + 1) {
        Some(Entry::Blank { length }) => {
            let length = *length;
            track.replace_entry(index + 1, Entry::blank(length + change));
        }
        _ if change > 0 => track.insert_entries(index + 1, [Entry::blank(change)]),
        _ => {}
    }
    track.normalize();
}
