use std::cell::Cell;
use std::collections::HashSet;
use std::ops::ControlFlow;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

use approx::assert_abs_diff_eq;

use super::testing::{SetResolver, harness, track};
use super::thread::apply_command;
use super::{AudioEvent, EngineCmd, EventKind, PlayState, effective_volume};

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn state(h: &super::testing::Harness, id: &str) -> PlayState {
    h.manager.track(id).map(|t| t.play_state).unwrap_or_default()
}

#[test]
fn effective_volume_multiplies_and_clamps() {
    assert_abs_diff_eq!(effective_volume(0.5, 0.5, Some(0.5)), 0.125);
    assert_abs_diff_eq!(effective_volume(0.8, 1.0, None), 0.8);
    assert_abs_diff_eq!(effective_volume(2.0, 1.0, None), 1.0);
    assert_abs_diff_eq!(effective_volume(-1.0, 1.0, Some(1.0)), 0.0);
    assert_abs_diff_eq!(effective_volume(1.0, 1.0, Some(3.0)), 1.0);
}

#[test]
fn reregistering_keeps_runtime_state() {
    let mut h = harness(&["a.mp3"], 0);
    h.manager.register(track("a", "music", &["a.mp3"]));
    h.manager.set_track_volume("a", 0.4);
    h.manager.play("a");
    h.take_events();

    let mut renamed = track("a", "music", &["a.mp3"]);
    renamed.name = "Tavern".into();
    h.manager.register(renamed);

    let t = h.manager.track("a").unwrap();
    assert_eq!(t.def.name, "Tavern");
    assert_eq!(t.play_state, PlayState::Playing);
    assert_abs_diff_eq!(t.volume, 0.4);
    assert_eq!(h.take_events(), vec![AudioEvent::TracksUpdated]);
}

#[test]
fn invalid_definitions_are_ignored() {
    let mut h = harness(&[], 0);
    h.manager.register(track("a", "music", &[]));
    h.manager.register(track("  ", "music", &["a.mp3"]));
    assert!(h.manager.all_tracks().is_empty());
    assert!(h.take_events().is_empty());
}

#[test]
fn missing_file_is_recorded_on_the_track() {
    let mut h = harness(&[], 0);
    h.manager.register(track("a", "music", &["lost.mp3"]));
    h.take_events();

    h.manager.play("a");

    let t = h.manager.track("a").unwrap();
    assert_eq!(t.play_state, PlayState::Stopped);
    assert_eq!(t.error.as_deref(), Some("File not found: lost.mp3"));
    assert_eq!(h.take_events(), vec![AudioEvent::TrackChanged("a".into())]);
}

#[test]
fn files_resolve_under_the_audio_folder() {
    let mut h = harness(&["sounds/a.mp3"], 0);
    h.manager.set_audio_folder("sounds");
    h.manager.register(track("a", "music", &["a.mp3"]));
    h.manager.play("a");

    assert_eq!(state(&h, "a"), PlayState::Playing);
    assert_eq!(
        h.backend.log("a").source,
        Some(PathBuf::from("sounds/a.mp3"))
    );
}

#[test]
fn rejected_playback_is_recorded_on_the_track() {
    let mut h = harness(&["a.mp3"], 0);
    h.manager.register(track("a", "music", &["a.mp3"]));
    h.backend.fail_play("a");

    h.manager.play("a");

    let t = h.manager.track("a").unwrap();
    assert_eq!(t.play_state, PlayState::Stopped);
    assert_eq!(t.error.as_deref(), Some("Playback failed: a.mp3"));
}

#[test]
fn pause_then_play_resumes_the_same_source() {
    let mut h = harness(&["a.mp3"], 0);
    h.manager.register(track("a", "music", &["a.mp3"]));
    h.manager.play("a");
    h.manager.pause("a");

    assert_eq!(state(&h, "a"), PlayState::Paused);
    assert!(!h.backend.log("a").playing);

    h.manager.play("a");
    assert_eq!(state(&h, "a"), PlayState::Playing);
    assert_eq!(h.backend.log("a").sources_set, 1);
}

#[test]
fn stop_is_idempotent() {
    let mut h = harness(&["a.mp3"], 0);
    h.manager.register(track("a", "music", &["a.mp3"]));
    h.manager.play("a");
    h.take_events();

    h.manager.stop("a");
    assert_eq!(h.take_events(), vec![AudioEvent::TrackChanged("a".into())]);
    assert_eq!(state(&h, "a"), PlayState::Stopped);

    h.manager.stop("a");
    assert!(h.take_events().is_empty());
}

#[test]
fn exclusive_tracks_crossfade_within_a_kind() {
    let mut h = harness(&["a.mp3", "b.mp3"], 1000);
    let mut a = track("a", "music", &["a.mp3"]);
    a.exclusive = true;
    let mut b = track("b", "music", &["b.mp3"]);
    b.exclusive = true;
    h.manager.register(a);
    h.manager.register(b);

    h.manager.play("a");
    assert_eq!(h.manager.fade_multiplier("a"), None);

    h.manager.play("b");
    assert!(h.manager.is_fading("a"));
    assert_eq!(h.manager.fade_multiplier("b"), Some(0.0));
    assert_eq!(state(&h, "a"), PlayState::Playing);
    assert_eq!(state(&h, "b"), PlayState::Playing);

    h.run_for(ms(500));
    assert_abs_diff_eq!(h.manager.fade_multiplier("a").unwrap(), 0.5, epsilon = 0.05);
    assert_abs_diff_eq!(h.manager.fade_multiplier("b").unwrap(), 0.5, epsilon = 0.05);

    h.run_for(ms(600));
    assert_eq!(state(&h, "a"), PlayState::Stopped);
    assert_eq!(state(&h, "b"), PlayState::Playing);
    assert_eq!(h.manager.fade_multiplier("a"), None);
    assert_eq!(h.manager.fade_multiplier("b"), None);
    assert_abs_diff_eq!(h.backend.log("b").gain, 1.0);
    assert_eq!(h.manager.next_wakeup(), None);
}

#[test]
fn exclusive_without_crossfade_cuts_immediately() {
    let mut h = harness(&["a.mp3", "b.mp3"], 0);
    let mut a = track("a", "music", &["a.mp3"]);
    a.exclusive = true;
    let mut b = track("b", "music", &["b.mp3"]);
    b.exclusive = true;
    h.manager.register(a);
    h.manager.register(b);

    h.manager.play("a");
    h.manager.play("b");

    assert_eq!(state(&h, "a"), PlayState::Stopped);
    assert_eq!(state(&h, "b"), PlayState::Playing);
    assert_eq!(h.manager.fade_multiplier("b"), None);
    assert!(!h.manager.is_fading("a"));
}

#[test]
fn exclusivity_only_applies_to_the_same_kind() {
    let mut h = harness(&["a.mp3", "b.mp3", "c.mp3"], 0);
    h.manager.register(track("a", "ambience", &["a.mp3"]));
    h.manager.register(track("b", "music", &["b.mp3"]));
    let mut c = track("c", "music", &["c.mp3"]);
    c.exclusive = true;
    h.manager.register(c);

    h.manager.play("a");
    h.manager.play("b");
    h.manager.play("c");

    assert_eq!(state(&h, "a"), PlayState::Playing);
    assert_eq!(state(&h, "b"), PlayState::Stopped);
    assert_eq!(state(&h, "c"), PlayState::Playing);
}

#[test]
fn non_exclusive_tracks_play_together() {
    let mut h = harness(&["a.mp3", "b.mp3"], 1000);
    h.manager.register(track("a", "music", &["a.mp3"]));
    h.manager.register(track("b", "music", &["b.mp3"]));
    h.manager.play("a");
    h.manager.play("b");

    assert_eq!(state(&h, "a"), PlayState::Playing);
    assert_eq!(state(&h, "b"), PlayState::Playing);
    assert!(!h.manager.is_fading("a"));
}

#[test]
fn playlist_advances_and_stops_at_the_end() {
    let mut h = harness(&["p1.mp3", "p2.mp3"], 0);
    h.manager.register(track("p", "music", &["p1.mp3", "p2.mp3"]));
    h.manager.play("p");
    assert!(!h.backend.log("p").looping);

    h.finish("p");
    let t = h.manager.track("p").unwrap();
    assert_eq!(t.current_index, 1);
    assert_eq!(t.play_state, PlayState::Playing);
    assert_eq!(h.backend.log("p").source, Some(PathBuf::from("p2.mp3")));

    h.take_events();
    h.finish("p");
    let t = h.manager.track("p").unwrap();
    assert_eq!(t.play_state, PlayState::Stopped);
    assert_eq!(t.current_index, 0);
    assert_eq!(h.take_events(), vec![AudioEvent::TrackChanged("p".into())]);
}

#[test]
fn looping_playlist_wraps_to_the_first_file() {
    let mut h = harness(&["p1.mp3", "p2.mp3"], 0);
    let mut p = track("p", "music", &["p1.mp3", "p2.mp3"]);
    p.looping = true;
    h.manager.register(p);
    h.manager.play("p");

    h.finish("p");
    h.finish("p");

    let t = h.manager.track("p").unwrap();
    assert_eq!(t.play_state, PlayState::Playing);
    assert_eq!(t.current_index, 0);
    assert_eq!(h.backend.log("p").source, Some(PathBuf::from("p1.mp3")));
}

#[test]
fn single_file_loop_uses_native_looping() {
    let mut h = harness(&["a.mp3"], 0);
    let mut a = track("a", "ambience", &["a.mp3"]);
    a.looping = true;
    h.manager.register(a);
    h.manager.play("a");

    assert!(h.backend.log("a").looping);
}

#[test]
fn single_file_settles_when_it_ends() {
    let mut h = harness(&["a.mp3"], 0);
    h.manager.register(track("a", "sfx", &["a.mp3"]));
    h.manager.play("a");
    h.finish("a");

    assert_eq!(state(&h, "a"), PlayState::Stopped);
}

#[test]
fn playlist_failure_rewinds_to_the_first_file() {
    let mut h = harness(&["p1.mp3", "p3.mp3"], 0);
    h.manager
        .register(track("p", "music", &["p1.mp3", "gone.mp3", "p3.mp3"]));
    h.manager.play("p");
    h.finish("p");

    let t = h.manager.track("p").unwrap();
    assert_eq!(t.play_state, PlayState::Stopped);
    assert_eq!(t.current_index, 0);
    assert_eq!(t.error.as_deref(), Some("File not found: gone.mp3"));

    h.manager.play("p");
    let t = h.manager.track("p").unwrap();
    assert_eq!(t.play_state, PlayState::Playing);
    assert_eq!(t.current_index, 0);
    assert_eq!(t.error, None);
    assert_eq!(h.backend.log("p").source, Some(PathBuf::from("p1.mp3")));
}

#[test]
fn three_file_playlist_runs_through_once() {
    let mut h = harness(&["p1.mp3", "p2.mp3", "p3.mp3"], 0);
    h.manager
        .register(track("p", "music", &["p1.mp3", "p2.mp3", "p3.mp3"]));
    h.manager.play("p");

    for (index, file) in [(1, "p2.mp3"), (2, "p3.mp3")] {
        h.finish("p");
        let t = h.manager.track("p").unwrap();
        assert_eq!(t.current_index, index);
        assert_eq!(t.play_state, PlayState::Playing);
        assert_eq!(h.backend.log("p").source, Some(PathBuf::from(file)));
    }

    h.finish("p");
    let t = h.manager.track("p").unwrap();
    assert_eq!(t.play_state, PlayState::Stopped);
    assert_eq!(t.current_index, 0);
}

#[test]
fn unresolvable_file_leaves_the_handle_alone() {
    let mut h = harness(&["a.mp3"], 0);
    h.manager.register(track("a", "music", &["a.mp3"]));
    h.manager.play("a");
    h.manager.stop("a");
    let before = h.backend.log("a");

    h.manager.set_resolver(Box::new(SetResolver::with(&[])));
    h.manager.play("a");

    let after = h.backend.log("a");
    assert_eq!(after.source, before.source);
    assert_eq!(after.source, Some(PathBuf::from("a.mp3")));
    assert_eq!(after.sources_set, 1);
    assert!(!after.playing);
    assert_eq!(state(&h, "a"), PlayState::Stopped);
    assert_eq!(
        h.manager.track("a").unwrap().error.as_deref(),
        Some("File not found: a.mp3")
    );
}

#[test]
fn idle_orphans_are_evicted_after_the_grace_period() {
    let mut h = harness(&["a.mp3"], 0);
    h.manager.register(track("a", "music", &["a.mp3"]));
    h.manager.schedule_orphan_check("a");
    assert!(h.manager.has_orphan_check("a"));

    h.run_for(ms(1000));
    assert!(h.manager.track("a").is_some());

    h.take_events();
    h.run_for(ms(1100));
    assert!(h.manager.track("a").is_none());
    assert!(h.take_events().contains(&AudioEvent::TracksUpdated));
}

#[test]
fn playing_orphans_survive() {
    let mut h = harness(&["a.mp3"], 0);
    h.manager.register(track("a", "music", &["a.mp3"]));
    h.manager.play("a");
    h.manager.schedule_orphan_check("a");

    h.run_for(ms(2100));
    assert_eq!(state(&h, "a"), PlayState::Playing);
    assert!(!h.manager.has_orphan_check("a"));
}

#[test]
fn reregistering_cancels_an_orphan_check() {
    let mut h = harness(&["a.mp3"], 0);
    h.manager.register(track("a", "music", &["a.mp3"]));
    h.manager.schedule_orphan_check("a");
    h.manager.register(track("a", "music", &["a.mp3"]));

    assert!(!h.manager.has_orphan_check("a"));
    h.run_for(ms(2100));
    assert!(h.manager.track("a").is_some());
}

#[test]
fn orphan_check_for_unknown_track_is_ignored() {
    let mut h = harness(&[], 0);
    h.manager.schedule_orphan_check("nobody");
    assert!(!h.manager.has_orphan_check("nobody"));
    assert_eq!(h.manager.next_wakeup(), None);
}

#[test]
fn stop_all_cancels_fades_and_follow_ups() {
    let mut h = harness(&["a.mp3", "b.mp3"], 0);
    h.manager.register(track("a", "music", &["a.mp3"]));
    h.manager.register(track("b", "ambience", &["b.mp3"]));
    h.manager.play("a");
    h.manager.play("b");
    h.manager.fade_out_all(ms(1000));
    h.run_for(ms(200));

    h.manager.stop_all();
    assert!(!h.manager.is_fading("a"));
    assert_eq!(h.manager.fade_multiplier("a"), None);

    h.run_for(ms(1100));
    assert_eq!(state(&h, "a"), PlayState::Stopped);
    assert_eq!(state(&h, "b"), PlayState::Stopped);
}

#[test]
fn stopping_mid_fade_drops_the_pause() {
    let mut h = harness(&["a.mp3"], 0);
    h.manager.register(track("a", "music", &["a.mp3"]));
    h.manager.play("a");
    h.manager.fade_out_type("music", ms(500));
    h.run_for(ms(100));

    h.manager.stop("a");
    h.run_for(ms(600));

    assert_eq!(state(&h, "a"), PlayState::Stopped);
    assert_eq!(h.manager.fade_multiplier("a"), None);
}

#[test]
fn replaying_mid_fade_out_keeps_the_track_playing() {
    let mut h = harness(&["a.mp3"], 0);
    h.manager.register(track("a", "music", &["a.mp3"]));
    h.manager.play("a");
    h.manager.fade_out_type("music", ms(1000));
    h.run_for(ms(300));

    h.manager.pause("a");
    h.manager.play("a");
    assert!(!h.manager.is_fading("a"));
    assert_eq!(h.manager.fade_multiplier("a"), None);

    h.run_for(ms(1000));
    assert_eq!(state(&h, "a"), PlayState::Playing);
    assert!(h.backend.log("a").playing);
    assert_abs_diff_eq!(h.backend.log("a").gain, 1.0);
}

#[test]
fn fade_out_type_pauses_only_that_kind() {
    let mut h = harness(&["a.mp3", "b.mp3", "c.mp3"], 0);
    h.manager.register(track("a", "music", &["a.mp3"]));
    h.manager.register(track("b", "music", &["b.mp3"]));
    h.manager.register(track("c", "ambience", &["c.mp3"]));
    for id in ["a", "b", "c"] {
        h.manager.play(id);
    }

    h.manager.fade_out_type("music", ms(1000));
    h.run_for(ms(1100));

    assert_eq!(state(&h, "a"), PlayState::Paused);
    assert_eq!(state(&h, "b"), PlayState::Paused);
    assert_eq!(state(&h, "c"), PlayState::Playing);
    assert_eq!(h.manager.fade_multiplier("a"), None);
    assert!(!h.backend.log("a").playing);
}

#[test]
fn fade_in_type_resumes_paused_tracks_from_silence() {
    let mut h = harness(&["a.mp3"], 0);
    h.manager.register(track("a", "music", &["a.mp3"]));
    h.manager.play("a");
    h.manager.pause("a");

    h.manager.fade_in_type("music", ms(500));
    assert_eq!(state(&h, "a"), PlayState::Playing);
    assert_eq!(h.manager.fade_multiplier("a"), Some(0.0));
    assert_abs_diff_eq!(h.backend.log("a").gain, 0.0);

    h.run_for(ms(600));
    assert_eq!(h.manager.fade_multiplier("a"), None);
    assert_abs_diff_eq!(h.backend.log("a").gain, 1.0);
    assert_eq!(h.backend.log("a").sources_set, 1);
}

#[test]
fn fade_in_failure_does_not_block_other_tracks() {
    let mut h = harness(&["a.mp3", "b.mp3"], 0);
    h.manager.register(track("a", "music", &["a.mp3"]));
    h.manager.register(track("b", "music", &["b.mp3"]));
    h.manager.play("a");
    h.manager.play("b");
    h.manager.pause("a");
    h.manager.pause("b");
    h.manager.set_resolver(Box::new(SetResolver::with(&["a.mp3"])));

    h.manager.fade_in_type("music", ms(500));

    let b = h.manager.track("b").unwrap();
    assert_eq!(b.play_state, PlayState::Stopped);
    assert_eq!(b.error.as_deref(), Some("File not found: b.mp3"));
    assert_eq!(h.manager.fade_multiplier("b"), None);

    h.run_for(ms(600));
    assert_eq!(state(&h, "a"), PlayState::Playing);
    assert_eq!(h.manager.fade_multiplier("a"), None);
}

#[test]
fn master_volume_scales_every_handle() {
    let mut h = harness(&["a.mp3"], 0);
    h.manager.register(track("a", "music", &["a.mp3"]));
    h.manager.play("a");
    h.take_events();

    h.manager.set_master_volume(0.5);
    assert_abs_diff_eq!(h.backend.log("a").gain, 0.5);
    assert_eq!(h.take_events(), vec![AudioEvent::MasterVolume(0.5)]);

    h.manager.set_track_volume("a", 0.5);
    assert_abs_diff_eq!(h.backend.log("a").gain, 0.25);
    assert_abs_diff_eq!(h.manager.effective_volume("a").unwrap(), 0.25);

    h.manager.set_master_volume(3.0);
    assert_abs_diff_eq!(h.manager.master_volume(), 1.0);
}

#[test]
fn unregister_releases_the_handle() {
    let mut h = harness(&["a.mp3"], 0);
    h.manager.register(track("a", "music", &["a.mp3"]));
    h.manager.play("a");
    h.take_events();

    h.manager.unregister("a");

    assert!(h.manager.track("a").is_none());
    assert_eq!(h.backend.log("a").releases, 1);
    let events = h.take_events();
    assert!(events.contains(&AudioEvent::TrackChanged("a".into())));
    assert_eq!(events.last(), Some(&AudioEvent::TracksUpdated));

    h.manager.unregister("a");
    assert!(h.take_events().is_empty());
}

#[test]
fn destroy_all_is_safe_to_repeat() {
    let mut h = harness(&["a.mp3", "b.mp3"], 1000);
    h.manager.register(track("a", "music", &["a.mp3"]));
    h.manager.register(track("b", "music", &["b.mp3"]));
    h.manager.play("a");
    h.manager.play("b");
    h.manager.fade_out_all(ms(1000));
    h.manager.schedule_orphan_check("a");

    h.manager.destroy_all();
    h.manager.destroy_all();

    assert!(h.manager.all_tracks().is_empty());
    assert_eq!(h.backend.log("a").releases, 1);
    assert_eq!(h.backend.log("b").releases, 1);
    assert_eq!(h.manager.next_wakeup(), None);
}

#[test]
fn random_playlist_plays_each_file_once_per_pass() {
    let files = ["r1.mp3", "r2.mp3", "r3.mp3", "r4.mp3"];
    let mut h = harness(&files, 0);
    let mut r = track("r", "music", &files);
    r.random = true;
    r.looping = true;
    h.manager.register(r);
    h.manager.play("r");

    let mut seen = HashSet::new();
    seen.insert(h.manager.track("r").unwrap().current_index);
    for _ in 0..3 {
        h.finish("r");
        seen.insert(h.manager.track("r").unwrap().current_index);
    }
    assert_eq!(seen.len(), 4);

    let last = h.manager.track("r").unwrap().current_index;
    h.finish("r");
    let t = h.manager.track("r").unwrap();
    assert_eq!(t.play_state, PlayState::Playing);
    assert_ne!(t.current_index, last);
}

#[test]
fn triggers_start_and_stop_other_tracks_without_cycling() {
    let mut h = harness(&["a.mp3", "b.mp3", "c.mp3"], 0);
    let mut a = track("a", "scene", &["a.mp3"]);
    a.starts = vec!["b".into()];
    a.stops = vec!["c".into()];
    let mut b = track("b", "scene", &["b.mp3"]);
    b.starts = vec!["a".into()];
    h.manager.register(a);
    h.manager.register(b);
    h.manager.register(track("c", "music", &["c.mp3"]));
    h.manager.play("c");

    h.manager.play("a");

    assert_eq!(state(&h, "a"), PlayState::Playing);
    assert_eq!(state(&h, "b"), PlayState::Playing);
    assert_eq!(state(&h, "c"), PlayState::Stopped);
    assert_eq!(h.backend.log("a").sources_set, 1);
}

#[test]
fn shrinking_a_playlist_resets_the_index() {
    let mut h = harness(&["x1.mp3", "x2.mp3", "x3.mp3"], 0);
    h.manager.register(track("p", "music", &["x1.mp3", "x2.mp3", "x3.mp3"]));
    h.manager.play("p");
    h.finish("p");
    h.finish("p");
    assert_eq!(h.manager.track("p").unwrap().current_index, 2);

    h.manager.register(track("p", "music", &["x1.mp3", "x2.mp3"]));
    let t = h.manager.track("p").unwrap();
    assert_eq!(t.current_index, 0);
    assert_eq!(t.play_state, PlayState::Playing);
}

#[test]
fn end_of_media_is_ignored_when_not_playing() {
    let mut h = harness(&["a.mp3"], 0);
    h.manager.on_media_ended("gone");

    h.manager.register(track("a", "music", &["a.mp3"]));
    h.manager.play("a");
    h.manager.pause("a");
    h.take_events();

    h.manager.on_media_ended("a");
    assert_eq!(state(&h, "a"), PlayState::Paused);
    assert!(h.take_events().is_empty());
}

#[test]
fn unsubscribed_handlers_stop_receiving() {
    let mut h = harness(&["a.mp3"], 0);
    let hits = Rc::new(Cell::new(0));
    let counter = hits.clone();
    let sub = h
        .manager
        .subscribe(EventKind::TracksUpdated, move |_| counter.set(counter.get() + 1));

    h.manager.register(track("a", "music", &["a.mp3"]));
    assert_eq!(hits.get(), 1);

    assert!(h.manager.unsubscribe(sub));
    h.manager.register(track("b", "music", &["a.mp3"]));
    assert_eq!(hits.get(), 1);
    assert!(!h.manager.unsubscribe(sub));
}

#[test]
fn commands_drive_the_manager() {
    let mut h = harness(&["a.mp3"], 0);
    let def = track("a", "music", &["a.mp3"]);

    assert_eq!(
        apply_command(&mut h.manager, EngineCmd::Register(def)),
        ControlFlow::Continue(())
    );
    let _ = apply_command(&mut h.manager, EngineCmd::Toggle("a".into()));
    assert_eq!(state(&h, "a"), PlayState::Playing);
    let _ = apply_command(&mut h.manager, EngineCmd::Toggle("a".into()));
    assert_eq!(state(&h, "a"), PlayState::Paused);

    let _ = apply_command(&mut h.manager, EngineCmd::SetCrossfade { crossfade_ms: 750 });
    assert_eq!(h.manager.crossfade(), ms(750));

    let _ = apply_command(&mut h.manager, EngineCmd::Detach("a".into()));
    assert!(h.manager.has_orphan_check("a"));

    assert_eq!(
        apply_command(&mut h.manager, EngineCmd::Quit { fade_out_ms: 500 }),
        ControlFlow::Break(ms(500))
    );
}
