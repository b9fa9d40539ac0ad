use super::*;
use crate::commands::music::audio_sources::AudioSource;
use lavalink_rs::model::track::TrackLoadData;
use tracing::{error, info};
use utils::{
    lavalink_player::with_requester,
    music_manager::MusicManager,
    player::{MusicPlayer, Playable},
};

/// Play a song from a URL or a search query
#[poise::command(slash_command, guild_only, category = "Music")]
pub async fn play(
    ctx: Context<'_>,
    #[description = "URL or search query"] query: String,
) -> CommandResult {
    info!("Received play command with query: {}", query);
    let guild_id = ctx.guild_id().ok_or(MusicError::NotInGuild)?;

    // Get the user's voice channel
    let voice_channel =
        match MusicManager::get_user_voice_channel(ctx.serenity_context(), guild_id, ctx.author().id) {
            Ok(channel_id) => channel_id,
            Err(err) => {
                ctx.send(embedded_messages::user_not_in_voice_channel(err))
                    .await?;
                return Ok(());
            }
        };

    // Defer the response since loading tracks might take time
    ctx.defer().await?;

    let data = ctx.data();
    let services = &data.services;

    let player = match LavalinkPlayer::connect(
        &data.lavalink,
        services,
        guild_id,
        voice_channel,
        ctx.channel_id(),
    )
    .await
    {
        Ok(player) => player,
        Err(err) => {
            error!("Failed to connect player in guild {}: {}", guild_id, err);
            ctx.send(embedded_messages::failed_to_join_voice_channel(err))
                .await?;
            return Ok(());
        }
    };

    // A fresh request starts a new session; a stale stop flag must not swallow its queue end
    services.music.clear_manual_stop(guild_id);

    let identifier = AudioSource::to_identifier(&query, &services.config.default_search_platform);
    let loaded = data
        .lavalink
        .load_tracks(guild_id, &identifier)
        .await
        .map_err(MusicError::node)?;

    let requester = ctx.author().name.clone();
    let (tracks, playlist) = match loaded.data {
        Some(TrackLoadData::Track(track)) => (vec![track], None),
        Some(TrackLoadData::Search(results)) => (results.into_iter().take(1).collect(), None),
        Some(TrackLoadData::Playlist(playlist)) => (playlist.tracks, Some(playlist.info.name)),
        Some(TrackLoadData::Error(e)) => {
            ctx.send(CreateReply::default().embed(embedded_messages::generic_error(&format!(
                "Failed to load `{}`: {}",
                query, e.message
            ))))
            .await?;
            return Ok(());
        }
        None => (Vec::new(), None),
    };

    let mut tracks = tracks
        .into_iter()
        .map(|track| with_requester(track, &requester));
    let Some(first) = tracks.next() else {
        ctx.send(embedded_messages::no_results(&query)).await?;
        return Ok(());
    };

    let first_metadata = first.metadata();
    let was_idle = player.is_idle().await?;
    player.enqueue_and_play(first).await?;

    let mut queued = 1;
    for track in tracks {
        player.enqueue(track).await?;
        queued += 1;
    }
    info!("Queued {} tracks for guild {}", queued, guild_id);

    let embed = match playlist {
        Some(name) => embedded_messages::playlist_added(&name, queued),
        None if was_idle => embedded_messages::starting_playback(&first_metadata),
        None => embedded_messages::added_to_queue(&first_metadata, player.upcoming().await?.len()),
    };
    ctx.send(CreateReply::default().embed(embed)).await?;

    Ok(())
}
