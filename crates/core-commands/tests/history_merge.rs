mod common;

use common::*;
use core_commands::command::*;
use core_commands::{EditCommand, History};
use core_config::{Config, ConfigFile, HistoryConfig};
use core_events::TimelineEvent;
use core_state::EditError;
use pretty_assertions::assert_eq;

fn rename(index: usize, name: &str) -> EditCommand {
    EditCommand::NameTrack(NameTrackCommand::new(index, name))
}

#[test]
fn consecutive_trims_collapse_into_one_entry() {
    let mut state = fixture();
    let original = state.clone();
    let mut history = History::new();
    for _ in 0..5 {
        let trim = TrimClipInCommand::new(&state, 0, 2, 1, false);
        history.push(&mut state, EditCommand::TrimClipIn(trim)).unwrap();
    }
    assert_eq!(history.len(), 1);
    assert_eq!(history.index(), 1);
    assert_eq!(state.clip(0, 2).unwrap().frame_in, 55);
    assert_eq!(layout(&state, 0)[1], "_25");
    match history.command(0) {
        Some(EditCommand::TrimClipIn(trim)) => assert_eq!(trim.applied(), 5),
        other => panic!("unexpected top entry {other:?}"),
    }

    assert!(history.undo(&mut state).unwrap());
    assert_eq!(state, original);
    assert!(history.redo(&mut state).unwrap());
    assert_eq!(state.clip(0, 2).unwrap().frame_in, 55);
}

#[test]
fn trims_of_different_clips_or_modes_stay_separate() {
    let mut state = fixture();
    let mut history = History::new();
    let first = TrimClipInCommand::new(&state, 0, 2, 2, false);
    history.push(&mut state, EditCommand::TrimClipIn(first)).unwrap();
    let other_clip = TrimClipInCommand::new(&state, 0, 0, 2, false);
    history.push(&mut state, EditCommand::TrimClipIn(other_clip)).unwrap();
    let other_mode = TrimClipInCommand::new(&state, 0, 0, 2, true);
    history.push(&mut state, EditCommand::TrimClipIn(other_mode)).unwrap();
    assert_eq!(history.len(), 3);
}

#[test]
fn push_after_undo_discards_redo_tail() {
    let mut state = fixture();
    let mut history = History::new();
    for name in ["one", "two", "three"] {
        history.push(&mut state, rename(0, name)).unwrap();
    }
    history.undo(&mut state).unwrap();
    history.undo(&mut state).unwrap();
    assert_eq!(state.track(0).unwrap().name, "one");
    assert!(history.can_redo());

    history.push(&mut state, rename(0, "four")).unwrap();
    assert_eq!(history.len(), 2);
    assert!(!history.can_redo());
    assert_eq!(history.redo(&mut state).unwrap(), false);
    assert_eq!(history.undo_text(), Some("Change track name"));
}

#[test]
fn limit_evicts_oldest_entries() {
    let mut state = fixture();
    let mut history = History::with_limit(2);
    for name in ["one", "two", "three"] {
        history.push(&mut state, rename(0, name)).unwrap();
    }
    assert_eq!(history.len(), 2);
    assert_eq!(history.index(), 2);
    assert!(history.undo(&mut state).unwrap());
    assert!(history.undo(&mut state).unwrap());
    assert!(!history.undo(&mut state).unwrap());
    assert_eq!(state.track(0).unwrap().name, "one");
}

#[test]
fn limit_comes_from_config() {
    let cfg = Config {
        file: ConfigFile {
            history: HistoryConfig {
                limit: 3,
                strict_snapshots: true,
            },
            ..ConfigFile::default()
        },
        ..Config::default()
    };
    assert_eq!(History::from_config(&cfg).limit(), 3);
    assert_eq!(History::new().limit(), 200);
}

#[test]
fn failed_push_leaves_history_and_timeline_unchanged() {
    let (tx, rx) = crossbeam_channel::unbounded::<TimelineEvent>();
    let mut state = fixture();
    let mut history = History::new().with_sink(Box::new(tx));
    history.push(&mut state, rename(0, "kept")).unwrap();
    let before = state.clone();
    rx.try_iter().for_each(drop);

    let err = history
        .push(&mut state, EditCommand::Lift(LiftCommand::new(0, 1)))
        .unwrap_err();
    assert!(matches!(err, EditError::NotAClip { track: 0, clip: 1 }));
    assert_eq!(state, before);
    assert_eq!(history.len(), 1);
    assert_eq!(history.index(), 1);
    let events: Vec<TimelineEvent> = rx.try_iter().collect();
    assert!(matches!(
        events.as_slice(),
        [TimelineEvent::EditFailed { text, .. }] if text == "Lift from track"
    ));
}

#[test]
fn split_outside_any_target_is_rejected_whole() {
    let mut state = fixture();
    let before = state.clone();
    let mut history = History::new();
    // Frame 40 is outside clip 2 (b spans [120, 220)).
    let split = SplitCommand::new(&[(0, 0), (0, 2)], 40);
    assert!(history.push(&mut state, EditCommand::Split(split)).is_err());
    assert_eq!(state, before);
    assert!(history.is_empty());
}

#[test]
fn events_follow_history_transitions() {
    let (tx, rx) = crossbeam_channel::unbounded::<TimelineEvent>();
    let mut state = fixture();
    let mut history = History::new().with_sink(Box::new(tx));

    let trim = TrimClipOutCommand::new(&state, 0, 0, 3, false);
    history.push(&mut state, EditCommand::TrimClipOut(trim)).unwrap();
    let trim = TrimClipOutCommand::new(&state, 0, 0, 3, false);
    history.push(&mut state, EditCommand::TrimClipOut(trim)).unwrap();
    history.undo(&mut state).unwrap();
    history.redo(&mut state).unwrap();

    let events: Vec<TimelineEvent> = rx.try_iter().collect();
    let text = "Trim clip out point".to_string();
    assert_eq!(
        events,
        vec![
            TimelineEvent::Pushed { text: text.clone(), index: 1 },
            TimelineEvent::Merged { text: text.clone(), index: 1 },
            TimelineEvent::Undone { text: text.clone(), index: 0 },
            TimelineEvent::Redone { text, index: 1 },
        ]
    );
}

#[test]
fn blend_mode_notification_follows_undo_and_redo() {
    let (tx, rx) = crossbeam_channel::unbounded::<TimelineEvent>();
    let mut state = fixture();
    let mut history = History::new().with_sink(Box::new(tx));
    let add = AddTransitionByTrimOutCommand::new(&state, 0, 2, 10);
    history.push(&mut state, EditCommand::AddTransitionByTrimOut(add)).unwrap();
    let blend = ChangeBlendModeCommand::new(0, 3, "screen");
    history.push(&mut state, EditCommand::ChangeBlendMode(blend)).unwrap();
    history.undo(&mut state).unwrap();

    let modes: Vec<String> = rx
        .try_iter()
        .filter_map(|e| match e {
            TimelineEvent::BlendModeChanged { mode, .. } => Some(mode),
            _ => None,
        })
        .collect();
    assert_eq!(modes, vec!["screen".to_string(), "normal".to_string()]);
    assert_eq!(
        state.transition(0, 3).unwrap().property("blend_mode"),
        Some("normal")
    );
}

#[test]
fn track_commands_notify_track_count() {
    let (tx, rx) = crossbeam_channel::unbounded::<TimelineEvent>();
    let mut state = fixture();
    let mut history = History::new().with_sink(Box::new(tx));
    history
        .push(
            &mut state,
            EditCommand::AddTrack(AddTrackCommand::new(core_timeline::TrackKind::Audio)),
        )
        .unwrap();
    history.undo(&mut state).unwrap();
    let counts: Vec<usize> = rx
        .try_iter()
        .filter_map(|e| match e {
            TimelineEvent::TracksChanged { count } => Some(count),
            _ => None,
        })
        .collect();
    assert_eq!(counts, vec![4, 3]);
}

#[test]
fn strict_snapshots_refuse_drifted_timeline() {
    let mut state = fixture();
    let mut history = History::new();
    let trim = TrimClipInCommand::new(&state, 0, 2, 10, true);
    history.push(&mut state, EditCommand::TrimClipIn(trim)).unwrap();

    state.clip_mut(0, 0).unwrap().frame_in += 1;
    let drifted = state.clone();
    let err = history.undo(&mut state).unwrap_err();
    assert!(matches!(err, EditError::SnapshotMismatch("after")));
    assert_eq!(state, drifted);
    assert_eq!(history.index(), 1);
}

#[test]
fn lenient_snapshots_restore_anyway() {
    let mut lenient = settings(false, false);
    lenient.strict_snapshots = false;
    let mut state = fixture_with(lenient);
    let original = state.clone();
    let mut history = History::new();
    let trim = TrimClipInCommand::new(&state, 0, 2, 10, true);
    history.push(&mut state, EditCommand::TrimClipIn(trim)).unwrap();

    state.clip_mut(0, 0).unwrap().frame_in += 1;
    assert!(history.undo(&mut state).unwrap());
    assert_eq!(state, original);
}

#[test]
fn move_drag_merges_into_one_entry() {
    let mut state = fixture();
    let original = state.clone();
    let mut history = History::new();
    for _ in 0..3 {
        let b = state.multitrack.find_clip(original.clip(0, 2).unwrap().uuid).unwrap();
        let mut mv = MoveClipCommand::new(&state, 0, 10, false);
        mv.add_clip(&state, b.track, b.clip).unwrap();
        history.push(&mut state, EditCommand::MoveClip(mv)).unwrap();
    }
    assert_eq!(history.len(), 1);
    match history.command(0) {
        Some(EditCommand::MoveClip(mv)) => assert_eq!(mv.applied(), 30),
        other => panic!("unexpected top entry {other:?}"),
    }
    history.undo(&mut state).unwrap();
    assert_eq!(state, original);
}
