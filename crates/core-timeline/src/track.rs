use serde::{Deserialize, Serialize};
use std::ops::Range;
use tracing::trace;
use uuid::Uuid;

use crate::{Clip, Entry, Frame, ModelError, Transition};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrackKind {
    Video,
    Audio,
}

/// One lane of the multitrack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub uuid: Uuid,
    pub kind: TrackKind,
    pub name: String,
    pub mute: bool,
    pub hide: bool,
    pub lock: bool,
    pub composite: bool,
    /// Serialized filter chain attached to the whole track.
    pub filters: String,
    entries: Vec<Entry>,
}

impl Track {
    pub fn new(kind: TrackKind, name: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            kind,
            name: name.into(),
            mute: false,
            hide: false,
            lock: false,
            composite: kind == TrackKind::Video,
            filters: String::new(),
            entries: Vec::new(),
        }
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn entry(&self, index: usize) -> Option<&Entry> {
        self.entries.get(index)
    }

    pub fn clip(&self, index: usize) -> Option<&Clip> {
        self.entries.get(index).and_then(Entry::as_clip)
    }

    pub fn clip_mut(&mut self, index: usize) -> Option<&mut Clip> {
        self.entries.get_mut(index).and_then(Entry::as_clip_mut)
    }

    pub fn transition(&self, index: usize) -> Option<&Transition> {
        self.entries.get(index).and_then(Entry::as_transition)
    }

    pub fn transition_mut(&mut self, index: usize) -> Option<&mut Transition> {
        self.entries.get_mut(index).and_then(Entry::as_transition_mut)
    }

    /// Iterator over `(entry index, clip)` for clip entries only.
    pub fn clips(&self) -> impl Iterator<Item = (usize, &Clip)> {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(i, e)| e.as_clip().map(|c| (i, c)))
    }

    /// Timeline start of entry `index`; `index == count()` yields the track end.
    pub fn start_of(&self, index: usize) -> Option<Frame> {
        if index > self.entries.len() {
            return None;
        }
        Some(self.entries[..index].iter().map(Entry::length).sum())
    }

    /// Total frames covered by the track (blank space included).
    pub fn duration(&self) -> Frame {
        self.entries.iter().map(Entry::length).sum()
    }

    /// Index of the entry covering `position`, if any.
    pub fn index_at(&self, position: Frame) -> Option<usize> {
        if position < 0 {
            return None;
        }
        let mut start = 0;
        for (i, entry) in self.entries.iter().enumerate() {
            let end = start + entry.length();
            if position < end {
                return Some(i);
            }
            start = end;
        }
        None
    }

    /// Index of the first entry starting at or after `position`.
    pub fn first_index_from(&self, position: Frame) -> Option<usize> {
        let mut start = 0;
        for (i, entry) in self.entries.iter().enumerate() {
            if start >= position {
                return Some(i);
            }
            start += entry.length();
        }
        None
    }

    /// True when `[start, start + length)` holds no clip or transition.
    pub fn is_free(&self, start: Frame, length: Frame) -> bool {
        let end = start + length;
        let mut at = 0;
        for entry in &self.entries {
            let entry_end = at + entry.length();
            if !entry.is_blank() && at < end && entry_end > start {
                return false;
            }
            at = entry_end;
        }
        true
    }

    /// Ensure an entry boundary exists at `position` and return the index of
    /// the entry starting there. Positions past the end are padded with blank
    /// and yield `count()`. A clip cut in two keeps its identity on the left
    /// half; the right half gets a fresh uuid.
    pub fn split_at(&mut self, position: Frame) -> Result<usize, ModelError> {
        if position < 0 {
            return Err(ModelError::NegativePosition(position));
        }
        let duration = self.duration();
        if position >= duration {
            if position > duration {
                self.entries.push(Entry::blank(position - duration));
            }
            return Ok(self.entries.len());
        }
        let index = self.index_at(position).unwrap_or(self.entries.len());
        let start = self.start_of(index).unwrap_or(duration);
        if start == position {
            return Ok(index);
        }
        let offset = position - start;
        let right = match &mut self.entries[index] {
            Entry::Blank { length } => {
                let rest = *length - offset;
                *length = offset;
                Entry::blank(rest)
            }
            Entry::Clip(clip) => {
                let mut right = clip.clone();
                right.uuid = Uuid::new_v4();
                right.frame_in = clip.frame_in + offset;
                right.producer.fade_in = 0;
                clip.frame_out = clip.frame_in + offset - 1;
                clip.producer.fade_out = 0;
                Entry::Clip(right)
            }
            Entry::Transition(_) => return Err(ModelError::SplitTransition { position }),
        };
        self.entries.insert(index + 1, right);
        trace!(target: "timeline.track", position, index, "split_entry");
        Ok(index + 1)
    }

    pub fn insert_entries(&mut self, index: usize, entries: impl IntoIterator<Item = Entry>) {
        let index = index.min(self.entries.len());
        self.entries.splice(index..index, entries);
    }

    pub fn push_entry(&mut self, entry: Entry) {
        self.entries.push(entry);
    }

    pub fn remove_entries(&mut self, range: Range<usize>) -> Vec<Entry> {
        let end = range.end.min(self.entries.len());
        let start = range.start.min(end);
        self.entries.drain(start..end).collect()
    }

    pub fn replace_entry(&mut self, index: usize, entry: Entry) -> Option<Entry> {
        let slot = self.entries.get_mut(index)?;
        Some(std::mem::replace(slot, entry))
    }

    /// Shift everything at or after `point` by `delta` frames without touching
    /// content that starts before it. Positive deltas insert blank in front of
    /// the first entry starting at/after `point`; negative deltas consume blank
    /// directly before that entry and are clamped to the blank available.
    /// Clips joined by transitions move as one unit, so a point landing inside
    /// such a chain shifts from the chain's first clip. Returns the shift
    /// actually applied.
    pub fn shift_from(&mut self, point: Frame, delta: Frame) -> Frame {
        let Some(index) = self.first_index_from(point.max(0)) else {
            return 0;
        };
        let index = self.chain_start(index);
        let applied = if delta > 0 {
            self.entries.insert(index, Entry::blank(delta));
            delta
        } else if delta < 0 && index > 0 {
            match &mut self.entries[index - 1] {
                Entry::Blank { length } => {
                    let removed = (-delta).min(*length);
                    *length -= removed;
                    -removed
                }
                _ => 0,
            }
        } else {
            0
        };
        self.normalize();
        trace!(target: "timeline.track", point, delta, applied, "shift_from");
        applied
    }

    /// Walk back from `index` to the first clip of the transition chain it
    /// belongs to.
    fn chain_start(&self, mut index: usize) -> usize {
        while index > 0
            && (matches!(self.entries[index], Entry::Transition(_))
                || matches!(self.entries[index - 1], Entry::Transition(_)))
        {
            index -= 1;
        }
        index
    }

    /// Merge adjacent blanks, drop empty blanks and trailing blank space.
    pub fn normalize(&mut self) {
        let mut out: Vec<Entry> = Vec::with_capacity(self.entries.len());
        for entry in self.entries.drain(..) {
            match entry {
                Entry::Blank { length } if length <= 0 => {}
                Entry::Blank { length } => {
                    if let Some(Entry::Blank { length: prev }) = out.last_mut() {
                        *prev += length;
                    } else {
                        out.push(Entry::Blank { length });
                    }
                }
                other => out.push(other),
            }
        }
        while matches!(out.last(), Some(Entry::Blank { .. })) {
            out.pop();
        }
        self.entries = out;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Producer;
    use pretty_assertions::assert_eq;

    fn clip(name: &str, len: Frame) -> Entry {
        Entry::Clip(Clip::whole(Producer::new(name, len)))
    }

    fn lengths(track: &Track) -> Vec<Frame> {
        track.entries().iter().map(Entry::length).collect()
    }

    #[test]
    fn start_of_accumulates_lengths() {
        let mut t = Track::new(TrackKind::Video, "V1");
        t.insert_entries(0, [clip("a", 10), Entry::blank(5), clip("b", 20)]);
        assert_eq!(t.start_of(0), Some(0));
        assert_eq!(t.start_of(2), Some(15));
        assert_eq!(t.start_of(3), Some(35));
        assert_eq!(t.start_of(4), None);
        assert_eq!(t.index_at(14), Some(1));
        assert_eq!(t.index_at(35), None);
    }

    #[test]
    fn split_clip_keeps_identity_on_left_half() {
        let mut t = Track::new(TrackKind::Video, "V1");
        t.insert_entries(0, [clip("a", 100)]);
        let uuid = t.clip(0).unwrap().uuid;
        let idx = t.split_at(40).unwrap();
        assert_eq!(idx, 1);
        let (left, right) = (t.clip(0).unwrap(), t.clip(1).unwrap());
        assert_eq!((left.frame_in, left.frame_out), (0, 39));
        assert_eq!((right.frame_in, right.frame_out), (40, 99));
        assert_eq!(left.uuid, uuid);
        assert_ne!(right.uuid, uuid);
    }

    #[test]
    fn split_past_end_pads_blank() {
        let mut t = Track::new(TrackKind::Video, "V1");
        t.insert_entries(0, [clip("a", 10)]);
        assert_eq!(t.split_at(25).unwrap(), 2);
        assert_eq!(lengths(&t), vec![10, 15]);
    }

    #[test]
    fn shift_from_inserts_and_consumes_blank() {
        let mut t = Track::new(TrackKind::Audio, "A1");
        t.insert_entries(0, [clip("a", 10), Entry::blank(5), clip("b", 10)]);
        assert_eq!(t.shift_from(12, 7), 7);
        assert_eq!(lengths(&t), vec![10, 12, 10]);
        assert_eq!(t.shift_from(12, -20), -12);
        assert_eq!(lengths(&t), vec![10, 10]);
        // Nothing starts after the end: no-op.
        assert_eq!(t.shift_from(100, 5), 0);
    }

    #[test]
    fn shift_from_moves_transition_chain_as_one_unit() {
        let part = |name: &str| crate::TransitionPart {
            producer: Producer::new(name, 100),
            frame_in: 0,
            frame_out: 9,
        };
        let mut t = Track::new(TrackKind::Video, "V2");
        t.insert_entries(
            0,
            [
                clip("p", 50),
                Entry::Transition(Transition::new(part("p"), part("q"))),
                clip("q", 40),
            ],
        );
        // Frame 50 is where the transition starts; the chain moves from `p`.
        assert_eq!(t.shift_from(50, 5), 5);
        assert_eq!(lengths(&t), vec![5, 50, 10, 40]);
        assert!(t.transition(2).is_some());
        // Point at the clip after the transition: same chain start.
        assert_eq!(t.shift_from(65, -3), -3);
        assert_eq!(lengths(&t), vec![2, 50, 10, 40]);
    }

    #[test]
    fn normalize_merges_and_trims_blanks() {
        let mut t = Track::new(TrackKind::Video, "V1");
        t.insert_entries(
            0,
            [
                Entry::blank(3),
                Entry::blank(0),
                Entry::blank(2),
                clip("a", 4),
                Entry::blank(9),
            ],
        );
        t.normalize();
        assert_eq!(lengths(&t), vec![5, 4]);
    }

    #[test]
    fn is_free_ignores_blank_space() {
        let mut t = Track::new(TrackKind::Audio, "A1");
        t.insert_entries(0, [Entry::blank(10), clip("a", 10)]);
        assert!(t.is_free(0, 10));
        assert!(!t.is_free(5, 10));
        assert!(t.is_free(20, 50));
    }
}
