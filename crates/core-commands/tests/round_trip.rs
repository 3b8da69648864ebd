mod common;

use common::*;
use core_commands::command::*;
use core_commands::{Command, EditCommand};
use core_state::TimelineState;
use core_timeline::{Entry, Marker, TrackKind};
use pretty_assertions::assert_eq;

/// redo changes the timeline, undo restores it exactly, and a second redo
/// reproduces the first result.
fn round_trip(state: &mut TimelineState, mut cmd: EditCommand) {
    let before = state.clone();
    cmd.redo(state).unwrap();
    let after = state.clone();
    assert_ne!(before, after, "{} did not change the timeline", cmd.text());
    cmd.undo(state).unwrap();
    assert_eq!(*state, before, "{} undo", cmd.text());
    cmd.redo(state).unwrap();
    assert_eq!(*state, after, "{} redo", cmd.text());
}

/// Fixture with a 10 frame transition between `b` and `c` at entry 3.
fn with_transition() -> TimelineState {
    let mut state = fixture();
    let mut add = AddTransitionByTrimOutCommand::new(&state, 0, 2, 10);
    add.redo(&mut state).unwrap();
    assert_eq!(layout(&state, 0)[3], "T10");
    state
}

/// Fixture rippling into every track and the marker list, with markers on
/// both sides of every edit used below.
fn rippling_fixture() -> TimelineState {
    let mut state = fixture_with(settings(true, true));
    state.markers.push(Marker::point("intro", 5));
    state.markers.push(Marker::range("middle", 90, 230));
    state.markers.push(Marker::point("inside b", 125));
    state.markers.push(Marker::point("tail", 260));
    state.markers.push(Marker::point("end", 320));
    state
}

#[test]
fn clip_placement_commands() {
    let x = clip("x", 0, 29);
    let mut state = fixture();
    round_trip(&mut state, EditCommand::Append(AppendCommand::new(0, payload_of(&[x.clone()]))));
    let mut state = fixture();
    let insert = InsertCommand::new(&state, 0, 10, payload_of(&[x.clone()]));
    round_trip(&mut state, EditCommand::Insert(insert));
    let mut state = fixture();
    round_trip(&mut state, EditCommand::Overwrite(OverwriteCommand::new(0, 10, payload_of(&[x.clone()]))));
    let mut state = fixture();
    round_trip(&mut state, EditCommand::Lift(LiftCommand::new(0, 0)));
    let mut state = fixture();
    let remove = RemoveCommand::new(&state, 0, 0);
    round_trip(&mut state, EditCommand::Remove(remove));
    let mut state = fixture();
    round_trip(&mut state, EditCommand::Replace(ReplaceCommand::new(0, 0, payload_of(&[x]))));
}

#[test]
fn update_split_and_merge() {
    let mut state = fixture();
    let mut edited = state.clip(0, 0).unwrap().clone();
    edited.frame_out = 129;
    let mut update = UpdateCommand::new(&state, 0, 0, 0);
    update.set_payload_after(payload_of(&[edited]));
    round_trip(&mut state, EditCommand::Update(update));

    let mut state = fixture();
    round_trip(&mut state, EditCommand::Split(SplitCommand::new(&[(0, 0)], 40)));

    let mut state = fixture();
    SplitCommand::new(&[(0, 0)], 40).redo(&mut state).unwrap();
    round_trip(&mut state, EditCommand::Merge(MergeCommand::new(0, 0)));
}

#[test]
fn trims_and_properties() {
    let mut state = fixture();
    let trim_in = TrimClipInCommand::new(&state, 0, 2, 10, true);
    round_trip(&mut state, EditCommand::TrimClipIn(trim_in));
    let mut state = fixture();
    let trim_out = TrimClipOutCommand::new(&state, 0, 0, -10, false);
    round_trip(&mut state, EditCommand::TrimClipOut(trim_out));
    let mut state = fixture();
    let fade_in = FadeInCommand::new(&state, 0, 0, 10);
    round_trip(&mut state, EditCommand::FadeIn(fade_in));
    let mut state = fixture();
    let fade_out = FadeOutCommand::new(&state, 0, 0, 10);
    round_trip(&mut state, EditCommand::FadeOut(fade_out));
    let mut state = fixture();
    let gain = ChangeGainCommand::new(&state, 0, 0, 0.5);
    round_trip(&mut state, EditCommand::ChangeGain(gain));
    let mut state = fixture();
    let mut filters = ApplyFiltersCommand::new("[\"blur\"]");
    filters.add_clip(0, 0);
    filters.add_clip(0, 2);
    round_trip(&mut state, EditCommand::ApplyFilters(filters));
}

#[test]
fn transition_commands() {
    let mut state = fixture();
    let add = AddTransitionCommand::new(&state, 0, 3, 200, false);
    round_trip(&mut state, EditCommand::AddTransition(add));
    let mut state = fixture();
    let by_out = AddTransitionByTrimOutCommand::new(&state, 0, 2, 10);
    round_trip(&mut state, EditCommand::AddTransitionByTrimOut(by_out));
    let mut state = fixture();
    let by_in = AddTransitionByTrimInCommand::new(&state, 0, 3, 10);
    round_trip(&mut state, EditCommand::AddTransitionByTrimIn(by_in));

    let mut state = with_transition();
    let trim_in = TrimTransitionInCommand::new(&state, 0, 3, 2);
    round_trip(&mut state, EditCommand::TrimTransitionIn(trim_in));
    let mut state = with_transition();
    let trim_out = TrimTransitionOutCommand::new(&state, 0, 3, 2);
    round_trip(&mut state, EditCommand::TrimTransitionOut(trim_out));
    let mut state = with_transition();
    round_trip(
        &mut state,
        EditCommand::RemoveTransitionByTrimIn(RemoveTransitionByTrimInCommand::new(0, 3)),
    );
    let mut state = with_transition();
    round_trip(
        &mut state,
        EditCommand::RemoveTransitionByTrimOut(RemoveTransitionByTrimOutCommand::new(0, 3)),
    );
    let mut state = with_transition();
    round_trip(
        &mut state,
        EditCommand::ChangeBlendMode(ChangeBlendModeCommand::new(0, 3, "add")),
    );
}

#[test]
fn group_commands() {
    let mut state = fixture();
    let mut group = GroupCommand::new();
    group.add_to_group(0, 0);
    group.add_to_group(0, 2);
    round_trip(&mut state, EditCommand::Group(group));

    let mut state = fixture();
    state.clip_mut(0, 0).unwrap().group = Some(4);
    state.clip_mut(1, 0).unwrap().group = Some(4);
    let mut ungroup = UngroupCommand::new();
    ungroup.remove_from_group(0, 0);
    ungroup.remove_from_group(1, 0);
    round_trip(&mut state, EditCommand::Ungroup(ungroup));
}

#[test]
fn multi_clip_commands() {
    let mut state = fixture();
    let mut mv = MoveClipCommand::new(&state, 1, 0, false);
    mv.add_clip(&state, 0, 0).unwrap();
    round_trip(&mut state, EditCommand::MoveClip(mv));

    let mut state = fixture();
    let mut mv = MoveClipCommand::new(&state, 0, 30, true);
    mv.add_clip(&state, 0, 2).unwrap();
    round_trip(&mut state, EditCommand::MoveClip(mv));

    let mut state = fixture();
    let detach = DetachAudioCommand::new(0, 0, 0, payload_of(&[audio_clip("a", 100)]));
    round_trip(&mut state, EditCommand::DetachAudio(detach));

    let mut state = fixture();
    let mut align = AlignClipsCommand::new();
    align.add_alignment(state.clip(0, 0).unwrap().uuid, 5, 1.0);
    align.add_alignment(state.clip(1, 0).unwrap().uuid, 12, 2.0);
    round_trip(&mut state, EditCommand::AlignClips(align));
}

#[test]
fn track_commands() {
    let cases = vec![
        EditCommand::AddTrack(AddTrackCommand::new(TrackKind::Video)),
        EditCommand::AddTrack(AddTrackCommand::new(TrackKind::Audio)),
        EditCommand::InsertTrack(InsertTrackCommand::new(1, TrackKind::Audio)),
        EditCommand::RemoveTrack(RemoveTrackCommand::new(1)),
        EditCommand::MoveTrack(MoveTrackCommand::new(0, 2)),
        EditCommand::NameTrack(NameTrackCommand::new(0, "Main")),
        EditCommand::MuteTrack(MuteTrackCommand::new(0)),
        EditCommand::HideTrack(HideTrackCommand::new(2)),
        EditCommand::LockTrack(LockTrackCommand::new(0, true)),
        EditCommand::CompositeTrack(CompositeTrackCommand::new(0, false)),
    ];
    for cmd in cases {
        let mut state = fixture();
        round_trip(&mut state, cmd);
    }
}

#[test]
fn remove_track_restores_identical_track() {
    let mut state = fixture();
    state.track_mut(1).unwrap().filters = "[\"sepia\"]".into();
    state.track_mut(1).unwrap().hide = true;
    let original = state.track(1).unwrap().clone();
    let mut cmd = RemoveTrackCommand::new(1);
    cmd.redo(&mut state).unwrap();
    assert_eq!(state.multitrack.track_count(), 2);
    cmd.undo(&mut state).unwrap();
    assert_eq!(state.track(1).unwrap(), &original);
}

#[test]
fn add_track_places_video_above_audio() {
    let mut state = fixture();
    let mut cmd = AddTrackCommand::new(TrackKind::Video);
    cmd.redo(&mut state).unwrap();
    assert_eq!(cmd.index(), Some(2));
    assert_eq!(state.track(2).unwrap().name, "V3");
    assert_eq!(state.track(3).unwrap().kind, TrackKind::Audio);
}

#[test]
fn locked_track_refuses_content_edits() {
    let mut state = fixture();
    state.track_mut(0).unwrap().lock = true;
    let before = state.clone();
    let err = LiftCommand::new(0, 0).redo(&mut state).unwrap_err();
    assert!(matches!(err, core_state::EditError::Locked(0)));
    assert_eq!(state, before);
}

#[test]
fn lift_of_blank_is_rejected() {
    let mut state = fixture();
    assert!(matches!(state.track(0).unwrap().entry(1), Some(Entry::Blank { .. })));
    let err = LiftCommand::new(0, 1).redo(&mut state).unwrap_err();
    assert!(matches!(err, core_state::EditError::NotAClip { track: 0, clip: 1 }));
}

#[test]
fn rippling_commands_restore_every_track_and_marker() {
    let x = clip("x", 0, 29);
    let mut state = rippling_fixture();
    let insert = InsertCommand::new(&state, 0, 110, payload_of(&[x]));
    round_trip(&mut state, EditCommand::Insert(insert));

    let mut state = rippling_fixture();
    let remove = RemoveCommand::new(&state, 0, 2);
    round_trip(&mut state, EditCommand::Remove(remove));

    let mut state = rippling_fixture();
    let trim_in = TrimClipInCommand::new(&state, 0, 2, 10, true);
    round_trip(&mut state, EditCommand::TrimClipIn(trim_in));

    let mut state = rippling_fixture();
    let trim_out = TrimClipOutCommand::new(&state, 0, 0, 10, true);
    round_trip(&mut state, EditCommand::TrimClipOut(trim_out));

    let mut state = rippling_fixture();
    let add = AddTransitionCommand::new(&state, 0, 3, 200, true);
    round_trip(&mut state, EditCommand::AddTransition(add));
}
