use core_state::{EditError, TimelineState};
use core_timeline::{ClipPosition, GroupId};
use std::collections::BTreeMap;
use tracing::debug;

use crate::{Command, groups};

/// Tag a set of clips with one fresh group id.
///
/// The id is allocated on the first redo and reused afterwards, so undo/redo
/// cycles keep handing out the same group.
#[derive(Debug, Clone, Default)]
pub struct GroupCommand {
    targets: Vec<ClipPosition>,
    group: Option<GroupId>,
    prior: BTreeMap<ClipPosition, Option<GroupId>>,
}

impl GroupCommand {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_to_group(&mut self, track: usize, clip: usize) {
        let at = ClipPosition::new(track, clip);
        if !self.targets.contains(&at) {
            self.targets.push(at);
        }
    }

    /// Group id assigned by the last redo.
    pub fn group(&self) -> Option<GroupId> {
        self.group
    }
}

impl Command for GroupCommand {
    fn redo(&mut self, state: &mut TimelineState) -> Result<(), EditError> {
        if self.targets.is_empty() {
            return Err(EditError::NoTargets);
        }
        let prior = groups::capture(state, &self.targets)?;
        let group = *self.group.get_or_insert_with(|| groups::allocate(state));
        for &at in &self.targets {
            groups::set_group(state, at, Some(group))?;
        }
        debug!(target: "commands.group", group, clips = self.targets.len(), "grouped");
        self.prior = prior;
        Ok(())
    }

    fn undo(&mut self, state: &mut TimelineState) -> Result<(), EditError> {
        groups::restore(state, &self.prior)
    }

    fn text(&self) -> &'static str {
        "Group"
    }
}

/// Clear the group tag of a set of clips.
#[derive(Debug, Clone, Default)]
pub struct UngroupCommand {
    targets: Vec<ClipPosition>,
    prior: BTreeMap<ClipPosition, Option<GroupId>>,
}

impl UngroupCommand {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn remove_from_group(&mut self, track: usize, clip: usize) {
        let at = ClipPosition::new(track, clip);
        if !self.targets.contains(&at) {
            self.targets.push(at);
        }
    }
}

impl Command for UngroupCommand {
    fn redo(&mut self, state: &mut TimelineState) -> Result<(), EditError> {
        if self.targets.is_empty() {
            return Err(EditError::NoTargets);
        }
        let prior = groups::capture(state, &self.targets)?;
        for &at in &self.targets {
            groups::set_group(state, at, None)?;
        }
        debug!(target: "commands.group", clips = self.targets.len(), "ungrouped");
        self.prior = prior;
        Ok(())
    }

    fn undo(&mut self, state: &mut TimelineState) -> Result<(), EditError> {
        groups::restore(state, &self.prior)
    }

    fn text(&self) -> &'static str {
        "Ungroup"
    }
}
