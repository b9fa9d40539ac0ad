//! Decides what happens when a guild's queue runs dry.

use poise::serenity_prelude::GuildId;
use serenity::async_trait;
use tracing::{debug, error, info, warn};

use super::music_manager::{LoopMode, MusicManager, MusicResult};
use super::player::{MusicPlayer, Playable};
use crate::commands::music::audio_sources::related_songs::{is_same_track, related_query};
use crate::commands::music::audio_sources::track_metadata::TrackMetadata;

/// Channel notices emitted while resolving the end of a queue.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    /// The queue ended with autoplay off and the bot left the channel.
    QueueEnded,
    /// Autoplay picked a related track and started it.
    AutoplayPlaying(TrackMetadata),
    /// Autoplay found nothing to play and the bot left the channel.
    AutoplayNoResult,
    /// Autoplay is on but there is no previous track to seed it.
    QueueEmpty,
}

/// Sends notices to the channel a player is bound to.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notice: Notice);
}

/// Why the player was torn down at the end of a queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisconnectReason {
    AutoplayOff,
    NoRelatedTrack,
}

/// What the resolver ended up doing.
#[derive(Debug, Clone, PartialEq)]
pub enum QueueEndOutcome {
    Disconnected(DisconnectReason),
    Continued(TrackMetadata),
    /// Autoplay is enabled but had nothing to start from; the player is left as is.
    NothingToContinue,
}

/// How playback carried on after a track ended.
#[derive(Debug, Clone, PartialEq)]
pub enum TrackEndOutcome {
    /// The end was caused by a user stop; nothing else happens.
    StoppedByUser,
    /// The finished track was started again for the track loop.
    Repeated,
    /// The node already moved on to the next queued track.
    StillPlaying,
    /// The player sat idle with tracks left and was advanced to them.
    Advanced,
    QueueEnded(QueueEndOutcome),
}

/// Continues a guild's playback once `ended` has stopped and the node had time to
/// advance its own queue.
///
/// `finished` is true when the track played to its end; only then does the loop mode
/// apply. A pending manual stop is consumed and suppresses everything else, so a user
/// stop never leads to autoplay.
pub async fn continue_after_track_end<P, N>(
    player: &P,
    notifier: &N,
    music: &MusicManager,
    guild_id: GuildId,
    ended: P::Track,
    finished: bool,
    platform: &str,
) -> MusicResult<TrackEndOutcome>
where
    P: MusicPlayer + ?Sized,
    N: Notifier + ?Sized,
{
    if music.take_manual_stop(guild_id) {
        debug!("Playback in guild {} was stopped by a user", guild_id);
        return Ok(TrackEndOutcome::StoppedByUser);
    }

    music.set_previous(guild_id, ended.metadata());

    if finished {
        match music.loop_mode(guild_id) {
            LoopMode::Track => {
                // The node may have started the next queued track already; put it back
                if let Some(next) = player.current().await? {
                    player.enqueue_front(next).await?;
                }
                player.play(ended).await?;
                return Ok(TrackEndOutcome::Repeated);
            }
            LoopMode::Queue => player.enqueue(ended).await?,
            LoopMode::None => {}
        }
    }

    if !player.is_idle().await? {
        return Ok(TrackEndOutcome::StillPlaying);
    }

    if !player.upcoming().await?.is_empty() {
        player.skip().await?;
        return Ok(TrackEndOutcome::Advanced);
    }

    info!("Queue ended in guild {}", guild_id);
    let outcome = resolve_queue_end(
        player,
        notifier,
        music.is_autoplay_enabled(guild_id),
        music.previous(guild_id).as_ref(),
        platform,
    )
    .await;

    if let QueueEndOutcome::Disconnected(reason) = &outcome {
        debug!("Disconnected from guild {}: {:?}", guild_id, reason);
        music.reset_playback(guild_id);
    }

    Ok(TrackEndOutcome::QueueEnded(outcome))
}

/// Resolves the end of a guild's queue.
///
/// * Autoplay off: destroy the player and announce the end of the queue.
/// * Autoplay on with a previous track: search for a related track and play the first
///   result that is not the previous track. No result, or a failing search, destroys
///   the player and announces the disconnect.
/// * Autoplay on without a previous track: announce the empty queue, nothing else.
pub async fn resolve_queue_end<P, N>(
    player: &P,
    notifier: &N,
    autoplay: bool,
    previous: Option<&TrackMetadata>,
    platform: &str,
) -> QueueEndOutcome
where
    P: MusicPlayer + ?Sized,
    N: Notifier + ?Sized,
{
    if !autoplay {
        info!("Queue ended with autoplay off, disconnecting");
        disconnect(player).await;
        notifier.notify(Notice::QueueEnded).await;
        return QueueEndOutcome::Disconnected(DisconnectReason::AutoplayOff);
    }

    let Some(previous) = previous else {
        info!("Autoplay is on but there is no previous track to continue from");
        notifier.notify(Notice::QueueEmpty).await;
        return QueueEndOutcome::NothingToContinue;
    };

    match find_related(player, previous, platform).await {
        Some(track) => {
            let metadata = track.metadata().requested_by("Autoplay");
            match player.enqueue_and_play(track).await {
                Ok(()) => {
                    info!("Autoplay continued with '{}'", metadata.title);
                    notifier
                        .notify(Notice::AutoplayPlaying(metadata.clone()))
                        .await;
                    QueueEndOutcome::Continued(metadata)
                }
                Err(e) => {
                    error!("Autoplay failed to start '{}': {}", metadata.title, e);
                    disconnect_without_result(player, notifier).await
                }
            }
        }
        None => disconnect_without_result(player, notifier).await,
    }
}

/// Searches for a track related to `previous`. Search errors count as "nothing found".
async fn find_related<P>(player: &P, previous: &TrackMetadata, platform: &str) -> Option<P::Track>
where
    P: MusicPlayer + ?Sized,
{
    let query = related_query(previous, platform);
    info!("Searching related tracks for '{}' with '{}'", previous.title, query);

    match player.search(&query).await {
        Ok(tracks) => tracks
            .into_iter()
            .find(|candidate| !is_same_track(previous, &candidate.metadata())),
        Err(e) => {
            warn!("Related track search failed for '{}': {}", query, e);
            None
        }
    }
}

async fn disconnect_without_result<P, N>(player: &P, notifier: &N) -> QueueEndOutcome
where
    P: MusicPlayer + ?Sized,
    N: Notifier + ?Sized,
{
    disconnect(player).await;
    notifier.notify(Notice::AutoplayNoResult).await;
    QueueEndOutcome::Disconnected(DisconnectReason::NoRelatedTrack)
}

async fn disconnect<P: MusicPlayer + ?Sized>(player: &P) {
    if let Err(e) = player.destroy().await {
        warn!("Failed to destroy player at queue end: {}", e);
    }
}
