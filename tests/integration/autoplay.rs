use assert_matches::assert_matches;
use pretty_assertions::assert_eq;
use riffle::commands::music::utils::autoplay_manager::{
    DisconnectReason, Notice, QueueEndOutcome, resolve_queue_end,
};

use crate::common::fixtures::{tracks, youtube_track};
use crate::common::mocks::{FakePlayer, RecordingNotifier};
use crate::test_utils;

#[tokio::test]
async fn queue_end_with_autoplay_off_destroys_exactly_once() {
    test_utils::init();
    let player = FakePlayer::new().with_search_results(tracks(3));
    let notifier = RecordingNotifier::default();
    let previous = youtube_track("abc", "Previous");

    let outcome = resolve_queue_end(&player, &notifier, false, Some(&previous), "ytmsearch").await;

    assert_eq!(outcome, QueueEndOutcome::Disconnected(DisconnectReason::AutoplayOff));
    assert_eq!(player.destroy_calls(), 1);
    assert!(player.searches().is_empty());
    assert_eq!(notifier.notices(), vec![Notice::QueueEnded]);
}

#[tokio::test]
async fn queue_end_with_autoplay_plays_exactly_one_related_track() {
    test_utils::init();
    let previous = youtube_track("abc", "Previous");
    let mut results = vec![previous.clone()];
    results.extend(tracks(3));
    let player = FakePlayer::new().with_search_results(results);
    let notifier = RecordingNotifier::default();

    let outcome = resolve_queue_end(&player, &notifier, true, Some(&previous), "ytmsearch").await;

    // The seed track itself is skipped, the first other result plays
    assert_matches!(outcome, QueueEndOutcome::Continued(ref track) if track.identifier == "id0");
    assert_eq!(player.started().len() + player.enqueued().len(), 1);
    assert_eq!(player.current().map(|t| t.identifier), Some("id0".to_string()));
    assert_eq!(player.destroy_calls(), 0);
    assert_eq!(
        player.searches(),
        vec!["https://www.youtube.com/watch?v=abc&list=RDabc".to_string()]
    );
    assert_matches!(notifier.notices().as_slice(), [Notice::AutoplayPlaying(track)] if track.identifier == "id0");
}

#[tokio::test]
async fn autoplay_search_error_disconnects_with_one_notice() {
    test_utils::init();
    let player = FakePlayer::new().with_failing_search();
    let notifier = RecordingNotifier::default();
    let previous = youtube_track("abc", "Previous");

    let outcome = resolve_queue_end(&player, &notifier, true, Some(&previous), "ytmsearch").await;

    assert_eq!(outcome, QueueEndOutcome::Disconnected(DisconnectReason::NoRelatedTrack));
    assert_eq!(player.destroy_calls(), 1);
    assert!(player.started().is_empty());
    assert_eq!(notifier.notices(), vec![Notice::AutoplayNoResult]);
}

#[tokio::test]
async fn autoplay_with_only_the_seed_track_disconnects() {
    let previous = youtube_track("abc", "Previous");
    let player = FakePlayer::new().with_search_results(vec![previous.clone()]);
    let notifier = RecordingNotifier::default();

    let outcome = resolve_queue_end(&player, &notifier, true, Some(&previous), "ytmsearch").await;

    assert_eq!(outcome, QueueEndOutcome::Disconnected(DisconnectReason::NoRelatedTrack));
    assert_eq!(player.destroy_calls(), 1);
    assert_eq!(notifier.notices(), vec![Notice::AutoplayNoResult]);
}

#[tokio::test]
async fn autoplay_without_previous_track_only_notifies() {
    let player = FakePlayer::new().with_search_results(tracks(2));
    let notifier = RecordingNotifier::default();

    let outcome = resolve_queue_end(&player, &notifier, true, None, "ytmsearch").await;

    assert_eq!(outcome, QueueEndOutcome::NothingToContinue);
    assert_eq!(player.destroy_calls(), 0);
    assert!(player.searches().is_empty());
    assert_eq!(notifier.notices(), vec![Notice::QueueEmpty]);
}

#[tokio::test]
async fn autoplay_falls_back_to_platform_search() {
    let mut previous = youtube_track("xyz", "Get Lucky");
    previous.source = "bandcamp".to_string();
    let player = FakePlayer::new().with_search_results(tracks(1));
    let notifier = RecordingNotifier::default();

    resolve_queue_end(&player, &notifier, true, Some(&previous), "scsearch").await;

    assert_eq!(player.searches(), vec!["scsearch:Daft Punk Get Lucky".to_string()]);
}
