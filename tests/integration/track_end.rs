use assert_matches::assert_matches;
use pretty_assertions::assert_eq;
use riffle::commands::music::audio_sources::track_metadata::TrackMetadata;
use riffle::commands::music::utils::autoplay_manager::{
    DisconnectReason, Notice, QueueEndOutcome, TrackEndOutcome, continue_after_track_end,
};
use riffle::commands::music::utils::music_manager::{LoopMode, MusicManager};

use crate::common::fixtures::{GUILD, tracks, youtube_track};
use crate::common::mocks::{FakePlayer, RecordingNotifier};
use crate::test_utils;

fn ended() -> TrackMetadata {
    youtube_track("ended", "Ended")
}

async fn track_finished(
    player: &FakePlayer,
    notifier: &RecordingNotifier,
    music: &MusicManager,
) -> TrackEndOutcome {
    continue_after_track_end(player, notifier, music, GUILD, ended(), true, "ytmsearch")
        .await
        .unwrap()
}

#[tokio::test]
async fn user_stop_never_triggers_autoplay() {
    test_utils::init();
    let player = FakePlayer::new().with_search_results(tracks(3));
    let notifier = RecordingNotifier::default();
    let music = MusicManager::new();
    music.set_autoplay(GUILD, true);
    music.set_previous(GUILD, youtube_track("seed", "Seed"));
    music.set_manual_stop(GUILD);

    let outcome = continue_after_track_end(&player, &notifier, &music, GUILD, ended(), false, "ytmsearch")
        .await
        .unwrap();

    assert_eq!(outcome, TrackEndOutcome::StoppedByUser);
    assert!(player.searches().is_empty());
    assert!(player.started().is_empty());
    assert_eq!(player.destroy_calls(), 0);
    assert!(notifier.notices().is_empty());
    // Consumed: the next session's queue end is handled normally
    assert!(!music.take_manual_stop(GUILD));
}

#[tokio::test]
async fn idle_with_empty_queue_resolves_queue_end() {
    test_utils::init();
    let player = FakePlayer::new();
    let notifier = RecordingNotifier::default();
    let music = MusicManager::new();

    let outcome = track_finished(&player, &notifier, &music).await;

    assert_eq!(
        outcome,
        TrackEndOutcome::QueueEnded(QueueEndOutcome::Disconnected(DisconnectReason::AutoplayOff))
    );
    assert_eq!(player.destroy_calls(), 1);
    assert_eq!(notifier.notices(), vec![Notice::QueueEnded]);
    // Disconnecting clears the guild's playback state
    assert_eq!(music.previous(GUILD), None);
}

#[tokio::test]
async fn queue_end_autoplay_seeds_from_the_ended_track() {
    test_utils::init();
    let player = FakePlayer::new().with_search_results(tracks(2));
    let notifier = RecordingNotifier::default();
    let music = MusicManager::new();
    music.set_autoplay(GUILD, true);

    let outcome = track_finished(&player, &notifier, &music).await;

    assert_matches!(
        outcome,
        TrackEndOutcome::QueueEnded(QueueEndOutcome::Continued(ref track)) if track.identifier == "id0"
    );
    assert_eq!(
        player.searches(),
        vec!["https://www.youtube.com/watch?v=ended&list=RDended".to_string()]
    );
    assert_eq!(player.destroy_calls(), 0);
    assert_eq!(music.previous(GUILD), Some(ended()));
}

#[tokio::test]
async fn node_already_playing_next_track_is_left_alone() {
    test_utils::init();
    let next = youtube_track("next", "Next");
    let player = FakePlayer::new().playing(next.clone());
    let notifier = RecordingNotifier::default();
    let music = MusicManager::new();
    music.set_autoplay(GUILD, true);

    let outcome = track_finished(&player, &notifier, &music).await;

    assert_eq!(outcome, TrackEndOutcome::StillPlaying);
    assert_eq!(player.current(), Some(next));
    assert!(player.searches().is_empty());
    assert_eq!(player.skips(), 0);
    assert_eq!(music.previous(GUILD), Some(ended()));
}

#[tokio::test]
async fn idle_player_with_leftover_queue_is_advanced() {
    test_utils::init();
    let player = FakePlayer::new().with_queue(tracks(2));
    let notifier = RecordingNotifier::default();
    let music = MusicManager::new();

    let outcome = track_finished(&player, &notifier, &music).await;

    assert_eq!(outcome, TrackEndOutcome::Advanced);
    assert_eq!(player.skips(), 1);
    assert_eq!(player.current().map(|t| t.identifier), Some("id0".to_string()));
    assert_eq!(player.destroy_calls(), 0);
    assert!(notifier.notices().is_empty());
}

#[tokio::test]
async fn track_loop_replays_before_the_track_the_node_moved_on_to() {
    test_utils::init();
    let queued = tracks(2);
    // The node already popped id0 and started it before the loop was applied
    let player = FakePlayer::new()
        .playing(queued[0].clone())
        .with_queue(vec![queued[1].clone()]);
    let notifier = RecordingNotifier::default();
    let music = MusicManager::new();
    music.set_loop_mode(GUILD, LoopMode::Track);

    let outcome = track_finished(&player, &notifier, &music).await;

    assert_eq!(outcome, TrackEndOutcome::Repeated);
    assert_eq!(player.current(), Some(ended()));
    assert_eq!(player.queued(), queued);
}

#[tokio::test]
async fn track_loop_on_idle_player_replays_without_touching_the_queue() {
    test_utils::init();
    let player = FakePlayer::new().with_queue(tracks(1));
    let notifier = RecordingNotifier::default();
    let music = MusicManager::new();
    music.set_loop_mode(GUILD, LoopMode::Track);

    let outcome = track_finished(&player, &notifier, &music).await;

    assert_eq!(outcome, TrackEndOutcome::Repeated);
    assert_eq!(player.started(), vec![ended()]);
    assert_eq!(player.queued(), tracks(1));
    assert_eq!(player.skips(), 0);
}

#[tokio::test]
async fn track_loop_ignores_tracks_that_failed_to_load() {
    test_utils::init();
    let player = FakePlayer::new();
    let notifier = RecordingNotifier::default();
    let music = MusicManager::new();
    music.set_loop_mode(GUILD, LoopMode::Track);

    let outcome = continue_after_track_end(&player, &notifier, &music, GUILD, ended(), false, "ytmsearch")
        .await
        .unwrap();

    assert_matches!(outcome, TrackEndOutcome::QueueEnded(QueueEndOutcome::Disconnected(_)));
    assert!(player.started().is_empty());
    assert_eq!(player.destroy_calls(), 1);
}

#[tokio::test]
async fn queue_loop_sends_the_track_to_the_back() {
    test_utils::init();
    let next = youtube_track("next", "Next");
    let player = FakePlayer::new().playing(next.clone()).with_queue(tracks(1));
    let notifier = RecordingNotifier::default();
    let music = MusicManager::new();
    music.set_loop_mode(GUILD, LoopMode::Queue);

    let outcome = track_finished(&player, &notifier, &music).await;

    assert_eq!(outcome, TrackEndOutcome::StillPlaying);
    assert_eq!(player.current(), Some(next));
    let mut expected = tracks(1);
    expected.push(ended());
    assert_eq!(player.queued(), expected);
}

#[tokio::test]
async fn queue_loop_of_a_single_track_keeps_playing_it() {
    test_utils::init();
    let player = FakePlayer::new();
    let notifier = RecordingNotifier::default();
    let music = MusicManager::new();
    music.set_loop_mode(GUILD, LoopMode::Queue);

    let outcome = track_finished(&player, &notifier, &music).await;

    assert_eq!(outcome, TrackEndOutcome::Advanced);
    assert_eq!(player.current(), Some(ended()));
    assert_eq!(player.destroy_calls(), 0);
}
