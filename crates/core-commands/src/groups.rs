//! Group membership reads and writes keyed by `ClipPosition`.
//!
//! Groups have no object of their own: a group is the set of clips carrying
//! the same `GroupId` tag.

use core_state::{EditError, TimelineState};
use core_timeline::{ClipPosition, GroupId};
use std::collections::BTreeMap;

pub fn group_of(state: &TimelineState, at: ClipPosition) -> Result<Option<GroupId>, EditError> {
    Ok(state.clip(at.track, at.clip)?.group)
}

pub fn set_group(
    state: &mut TimelineState,
    at: ClipPosition,
    group: Option<GroupId>,
) -> Result<(), EditError> {
    state.clip_mut(at.track, at.clip)?.group = group;
    Ok(())
}

/// Fresh group id, above every id already on the timeline.
pub fn allocate(state: &TimelineState) -> GroupId {
    state.multitrack.next_group_id()
}

/// Current group of every position, for later restore with `restore`.
pub fn capture(
    state: &TimelineState,
    positions: &[ClipPosition],
) -> Result<BTreeMap<ClipPosition, Option<GroupId>>, EditError> {
    positions
        .iter()
        .map(|&at| Ok((at, group_of(state, at)?)))
        .collect()
}

pub fn restore(
    state: &mut TimelineState,
    prior: &BTreeMap<ClipPosition, Option<GroupId>>,
) -> Result<(), EditError> {
    for (&at, &group) in prior {
        set_group(state, at, group)?;
    }
    Ok(())
}
