use core_timeline::{Marker, Track};
use tracing::{error, trace, warn};

use crate::{EditError, TimelineState};

/// Which tracks an `UndoRecord` covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotScope {
    Track(usize),
    Tracks(Vec<usize>),
    /// The whole track list; also covers edits that add or remove tracks.
    AllTracks,
}

#[derive(Debug, Clone, PartialEq)]
enum TrackSnapshot {
    Indexed(Vec<(usize, Track)>),
    All(Vec<Track>),
}

/// Immutable capture of part of the timeline at one point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct UndoRecord {
    tracks: TrackSnapshot,
    markers: Option<Vec<Marker>>,
}

impl UndoRecord {
    pub fn capture(
        state: &TimelineState,
        scope: &SnapshotScope,
        with_markers: bool,
    ) -> Result<Self, EditError> {
        let tracks = match scope {
            SnapshotScope::Track(i) => TrackSnapshot::Indexed(vec![(*i, state.track(*i)?.clone())]),
            SnapshotScope::Tracks(list) => TrackSnapshot::Indexed(
                list.iter()
                    .map(|i| Ok((*i, state.track(*i)?.clone())))
                    .collect::<Result<_, EditError>>()?,
            ),
            SnapshotScope::AllTracks => TrackSnapshot::All(state.multitrack.tracks().to_vec()),
        };
        let markers = with_markers.then(|| state.markers.markers().to_vec());
        Ok(Self { tracks, markers })
    }

    /// True when the live state equals this record over the captured scope.
    pub fn matches(&self, state: &TimelineState) -> bool {
        let tracks_match = match &self.tracks {
            TrackSnapshot::Indexed(list) => list
                .iter()
                .all(|(i, t)| state.multitrack.track(*i).is_ok_and(|live| live == t)),
            TrackSnapshot::All(all) => state.multitrack.tracks() == all.as_slice(),
        };
        let markers_match = self
            .markers
            .as_ref()
            .is_none_or(|m| state.markers.markers() == m.as_slice());
        tracks_match && markers_match
    }

    pub fn restore(&self, state: &mut TimelineState) -> Result<(), EditError> {
        match &self.tracks {
            TrackSnapshot::Indexed(list) => {
                for (i, track) in list {
                    state.multitrack.replace_track(*i, track.clone())?;
                }
            }
            TrackSnapshot::All(all) => state.multitrack.set_tracks(all.clone()),
        }
        if let Some(markers) = &self.markers {
            state.markers.set_markers(markers.clone());
        }
        Ok(())
    }

    pub fn tracks(&self) -> Vec<&Track> {
        match &self.tracks {
            TrackSnapshot::Indexed(list) => list.iter().map(|(_, t)| t).collect(),
            TrackSnapshot::All(all) => all.iter().collect(),
        }
    }

    pub fn markers(&self) -> Option<&[Marker]> {
        self.markers.as_deref()
    }
}

/// Before/after snapshot pair making a structural edit reversible.
///
/// Usage from a command's redo:
///
/// ```ignore
/// if self.undo_helper.replay_or_begin(state)? {
///     return Ok(());
/// }
/// let outcome = self.apply(state);
/// self.undo_helper.finish(state, outcome)
/// ```
///
/// The first redo records the before state, runs the mutation and records the
/// after state. Later redos replay the after record so every identity created
/// by the first run (split halves, inserted clips, added tracks) is stable.
#[derive(Debug, Clone, PartialEq)]
pub struct UndoHelper {
    scope: SnapshotScope,
    with_markers: bool,
    before: Option<UndoRecord>,
    after: Option<UndoRecord>,
}

impl UndoHelper {
    pub fn new(scope: SnapshotScope) -> Self {
        Self {
            scope,
            with_markers: false,
            before: None,
            after: None,
        }
    }

    pub fn with_markers(mut self, enabled: bool) -> Self {
        self.with_markers = enabled;
        self
    }

    pub fn scope(&self) -> &SnapshotScope {
        &self.scope
    }

    /// True once a mutation has run and both records exist.
    pub fn is_recorded(&self) -> bool {
        self.after.is_some()
    }

    pub fn before(&self) -> Option<&UndoRecord> {
        self.before.as_ref()
    }

    pub fn after(&self) -> Option<&UndoRecord> {
        self.after.as_ref()
    }

    pub fn record_before(&mut self, state: &TimelineState) -> Result<(), EditError> {
        let record = UndoRecord::capture(state, &self.scope, self.with_markers)?;
        trace!(target: "state.undo", scope = ?self.scope, markers = self.with_markers, "record_before");
        self.before = Some(record);
        self.after = None;
        Ok(())
    }

    pub fn record_after(&mut self, state: &TimelineState) -> Result<(), EditError> {
        let record = UndoRecord::capture(state, &self.scope, self.with_markers)?;
        trace!(target: "state.undo", scope = ?self.scope, "record_after");
        self.after = Some(record);
        Ok(())
    }

    /// Replays the after record when one exists (returns `true`), otherwise
    /// records the before state so the caller can run its mutation.
    pub fn replay_or_begin(&mut self, state: &mut TimelineState) -> Result<bool, EditError> {
        if self.is_recorded() {
            self.redo_changes(state)?;
            return Ok(true);
        }
        self.record_before(state)?;
        Ok(false)
    }

    /// Completes a first-time mutation. On failure the before record is
    /// restored so no partial edit survives, and the helper is reset.
    pub fn finish(
        &mut self,
        state: &mut TimelineState,
        outcome: Result<(), EditError>,
    ) -> Result<(), EditError> {
        match outcome {
            Ok(()) => self.record_after(state),
            Err(err) => {
                if let Some(before) = self.before.take() {
                    before.restore(state)?;
                }
                trace!(target: "state.undo", error = %err, "mutation_rolled_back");
                Err(err)
            }
        }
    }

    pub fn undo_changes(&self, state: &mut TimelineState) -> Result<(), EditError> {
        let (Some(before), Some(after)) = (&self.before, &self.after) else {
            return Err(EditError::SnapshotMismatch("missing"));
        };
        Self::swap(state, after, before, "after")
    }

    pub fn redo_changes(&self, state: &mut TimelineState) -> Result<(), EditError> {
        let (Some(before), Some(after)) = (&self.before, &self.after) else {
            return Err(EditError::SnapshotMismatch("missing"));
        };
        Self::swap(state, before, after, "before")
    }

    fn swap(
        state: &mut TimelineState,
        expected: &UndoRecord,
        target: &UndoRecord,
        label: &'static str,
    ) -> Result<(), EditError> {
        if !expected.matches(state) {
            if state.settings.strict_snapshots {
                error!(target: "state.undo", expected = label, "snapshot_mismatch_aborted");
                return Err(EditError::SnapshotMismatch(label));
            }
            warn!(target: "state.undo", expected = label, "snapshot_mismatch_restoring_anyway");
        }
        target.restore(state)?;
        trace!(target: "state.undo", from = label, "snapshot_restored");
        Ok(())
    }

    /// Combine with a helper recorded immediately after this one: the result
    /// undoes straight to this helper's before state and redoes to `later`'s
    /// after state. Rejected when scopes differ or the records do not chain.
    pub fn merge(&self, later: &UndoHelper) -> Option<UndoHelper> {
        if self.scope != later.scope || self.with_markers != later.with_markers {
            return None;
        }
        let (Some(before), Some(middle)) = (&self.before, &self.after) else {
            return None;
        };
        let (Some(later_before), Some(after)) = (&later.before, &later.after) else {
            return None;
        };
        if middle != later_before {
            return None;
        }
        Some(UndoHelper {
            scope: self.scope.clone(),
            with_markers: self.with_markers,
            before: Some(before.clone()),
            after: Some(after.clone()),
        })
    }
}
