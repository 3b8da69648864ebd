//! Ripple policy: how a length change at one edit point propagates to other
//! tracks and to markers.
//!
//! Boundary rule: content whose start is at or after the edit point moves
//! (inclusive to the right). Markers follow the same rule for inserts. For
//! removals over the half-open range `[start, end)`:
//! - a marker starting inside the range is deleted, unless it extends past
//!   `end`, in which case its head is cut off at `start`;
//! - a marker starting exactly at `end` survives and lands on `start`;
//! - a range marker spanning the cut shrinks by the cut length;
//! - a range marker whose tail falls inside the cut ends at `start - 1`;
//! - markers after the range shift left by `end - start`.
//!
//! Marker ripple is gated separately from clip ripple (`ripple_markers`), so
//! annotations can stay put while clips move.

use core_state::{EditError, EditSettings, SnapshotScope, TimelineState};
use core_timeline::{Frame, Marker, Markers};
use tracing::debug;

/// A length change at one point of the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RippleEdit {
    /// `length` frames were inserted at `at`.
    Insert { at: Frame, length: Frame },
    /// Frames `[start, end)` were removed.
    Remove { start: Frame, end: Frame },
}

impl RippleEdit {
    /// Edit for a signed length change of a region ending at `point`:
    /// positive inserts at `point`, negative removes `[point + delta, point)`.
    /// Zero yields `None`.
    pub fn from_delta(point: Frame, delta: Frame) -> Option<Self> {
        match delta {
            0 => None,
            d if d > 0 => Some(RippleEdit::Insert { at: point, length: d }),
            d => Some(RippleEdit::Remove {
                start: point + d,
                end: point,
            }),
        }
    }

    /// Signed shift applied to content after the edit.
    pub fn delta(&self) -> Frame {
        match *self {
            RippleEdit::Insert { length, .. } => length,
            RippleEdit::Remove { start, end } => start - end,
        }
    }

    /// First position whose content moves.
    pub fn point(&self) -> Frame {
        match *self {
            RippleEdit::Insert { at, .. } => at,
            RippleEdit::Remove { end, .. } => end,
        }
    }
}

/// Per-track shift for a ripple of `delta` on `edit_track`. `locked` holds
/// one flag per track; locked tracks never move unless they are the edited
/// track.
pub fn track_shifts(
    locked: &[bool],
    edit_track: usize,
    delta: Frame,
    ripple: bool,
    ripple_all_tracks: bool,
) -> Vec<Frame> {
    locked
        .iter()
        .enumerate()
        .map(|(i, &lock)| {
            if !ripple {
                0
            } else if i == edit_track {
                delta
            } else if ripple_all_tracks && !lock {
                delta
            } else {
                0
            }
        })
        .collect()
}

/// Snapshot scope a rippling edit on `edit_track` needs.
pub fn scope_for(edit_track: usize, settings: &EditSettings, ripple: bool) -> SnapshotScope {
    if ripple && settings.ripple_all_tracks {
        SnapshotScope::AllTracks
    } else {
        SnapshotScope::Track(edit_track)
    }
}

/// Whether a rippling edit should also capture and move markers.
pub fn affects_markers(settings: &EditSettings, ripple: bool) -> bool {
    ripple && settings.ripple_markers
}

/// Propagate `edit` to every unlocked track other than `edit_track`. Callers
/// decide whether ripple-all-tracks is on. Returns the shifts actually
/// applied; removals are clamped to the blank space available on each track.
pub fn ripple_other_tracks(
    state: &mut TimelineState,
    edit_track: usize,
    edit: RippleEdit,
) -> Result<Vec<Frame>, EditError> {
    let locked: Vec<bool> = state.multitrack.tracks().iter().map(|t| t.lock).collect();
    let shifts = track_shifts(&locked, edit_track, edit.delta(), true, true);
    let mut applied = vec![0; shifts.len()];
    for (i, shift) in shifts.into_iter().enumerate() {
        if i == edit_track || shift == 0 {
            continue;
        }
        applied[i] = state.track_mut(i)?.shift_from(edit.point(), shift);
        if applied[i] != shift {
            debug!(target: "commands.ripple", track = i, wanted = shift, applied = applied[i], "ripple_clamped");
        }
    }
    Ok(applied)
}

/// Apply `edit` to the marker list.
pub fn ripple_markers(markers: &mut Markers, edit: RippleEdit) {
    let before = markers.len();
    match edit {
        RippleEdit::Insert { at, length } => {
            markers.retain_map(|m| Some(marker_after_insert(m, at, length)));
        }
        RippleEdit::Remove { start, end } => {
            markers.retain_map(|m| marker_after_remove(m, start, end));
        }
    }
    debug!(target: "commands.ripple", edit = ?edit, removed = before - markers.len(), "markers_rippled");
}

/// Move every marker starting at or after `from` by `delta` frames.
pub fn shift_markers(markers: &mut Markers, from: Frame, delta: Frame) {
    if delta == 0 {
        return;
    }
    markers.retain_map(|mut m| {
        if m.start >= from {
            m.start += delta;
            m.end += delta;
        }
        Some(m)
    });
    debug!(target: "commands.ripple", from, delta, "markers_shifted");
}

/// Marker position after `length` frames were inserted at `at`.
pub fn marker_after_insert(mut marker: Marker, at: Frame, length: Frame) -> Marker {
    if marker.start >= at {
        marker.start += length;
        marker.end += length;
    } else if marker.end >= at {
        marker.end += length;
    }
    marker
}

/// Marker position after `[start, end)` was removed; `None` deletes it.
pub fn marker_after_remove(mut marker: Marker, start: Frame, end: Frame) -> Option<Marker> {
    let cut = end - start;
    if cut <= 0 {
        return Some(marker);
    }
    if marker.start >= end {
        marker.start -= cut;
        marker.end -= cut;
    } else if marker.start >= start {
        if marker.end < end {
            return None;
        }
        marker.start = start;
        marker.end -= cut;
    } else if marker.end >= end {
        marker.end -= cut;
    } else if marker.end >= start {
        marker.end = start - 1;
    }
    Some(marker)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn shifts_respect_modes_and_locks() {
        let locked = [false, true, false];
        assert_eq!(track_shifts(&locked, 0, 5, false, true), vec![0, 0, 0]);
        assert_eq!(track_shifts(&locked, 0, 5, true, false), vec![5, 0, 0]);
        assert_eq!(track_shifts(&locked, 0, -5, true, true), vec![-5, 0, -5]);
        // Edited track moves even when locked (lock is checked before editing).
        assert_eq!(track_shifts(&locked, 1, 3, true, true), vec![3, 3, 3]);
    }

    #[test]
    fn from_delta_maps_sign_to_edit() {
        assert_eq!(
            RippleEdit::from_delta(10, 4),
            Some(RippleEdit::Insert { at: 10, length: 4 })
        );
        let remove = RippleEdit::from_delta(10, -4).unwrap();
        assert_eq!(remove, RippleEdit::Remove { start: 6, end: 10 });
        assert_eq!((remove.point(), remove.delta()), (10, -4));
        assert_eq!(RippleEdit::from_delta(10, 0), None);
    }

    #[test]
    fn insert_boundary_is_inclusive() {
        let at = marker_after_insert(Marker::point("at", 10), 10, 5);
        assert_eq!((at.start, at.end), (15, 15));
        let before = marker_after_insert(Marker::point("before", 9), 10, 5);
        assert_eq!((before.start, before.end), (9, 9));
        let straddle = marker_after_insert(Marker::range("r", 5, 12), 10, 5);
        assert_eq!((straddle.start, straddle.end), (5, 17));
    }

    #[test]
    fn remove_policy_cases() {
        let cut = |m: Marker| marker_after_remove(m, 40, 60).map(|m| (m.start, m.end));
        assert_eq!(cut(Marker::point("inside", 50)), None);
        assert_eq!(cut(Marker::point("start", 40)), None);
        assert_eq!(cut(Marker::point("end", 60)), Some((40, 40)));
        assert_eq!(cut(Marker::point("after", 75)), Some((55, 55)));
        assert_eq!(cut(Marker::point("before", 39)), Some((39, 39)));
        assert_eq!(cut(Marker::range("span", 30, 70)), Some((30, 50)));
        assert_eq!(cut(Marker::range("head", 45, 80)), Some((40, 60)));
        assert_eq!(cut(Marker::range("tail", 30, 45)), Some((30, 39)));
        assert_eq!(cut(Marker::range("within", 41, 58)), None);
    }
}
