//! [`MusicPlayer`] backed by a Lavalink player context.

use lavalink_rs::client::LavalinkClient;
use lavalink_rs::model::player::ConnectionInfo;
use lavalink_rs::model::track::{TrackData, TrackLoadData};
use lavalink_rs::player_context::PlayerContext;
use ::serenity::async_trait;
use poise::serenity_prelude::{ChannelId, GuildId};
use songbird::Songbird;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::event_handlers::MusicServices;
use super::music_manager::{MusicError, MusicResult};
use super::player::{MusicPlayer, Playable};
use crate::commands::music::audio_sources::track_metadata::TrackMetadata;

/// Key under which the requester's name is stored in a track's `user_data`.
const REQUESTER_KEY: &str = "requester";

impl Playable for TrackData {
    fn metadata(&self) -> TrackMetadata {
        let metadata = TrackMetadata::from(&self.info);
        match requester(self) {
            Some(name) => metadata.requested_by(name),
            None => metadata,
        }
    }
}

fn requester(track: &TrackData) -> Option<String> {
    track
        .user_data
        .as_ref()?
        .get(REQUESTER_KEY)?
        .as_str()
        .map(str::to_string)
}

/// Tags `track` with the name of the user who asked for it.
pub fn with_requester(mut track: TrackData, name: &str) -> TrackData {
    track.user_data = Some(serde_json::json!({ REQUESTER_KEY: name }));
    track
}

fn connection_info(info: songbird::ConnectionInfo) -> ConnectionInfo {
    ConnectionInfo {
        endpoint: info.endpoint,
        token: info.token,
        session_id: info.session_id,
    }
}

/// Flattens a load result into playable tracks; errors and empty results yield nothing.
pub fn loaded_tracks(data: Option<TrackLoadData>) -> Vec<TrackData> {
    match data {
        Some(TrackLoadData::Track(track)) => vec![track],
        Some(TrackLoadData::Playlist(playlist)) => playlist.tracks,
        Some(TrackLoadData::Search(tracks)) => tracks,
        Some(TrackLoadData::Error(e)) => {
            warn!("Track load failed: {}", e.message);
            Vec::new()
        }
        None => Vec::new(),
    }
}

/// A guild's Lavalink player plus the voice connection it plays into.
#[derive(Clone)]
pub struct LavalinkPlayer {
    lavalink: LavalinkClient,
    context: PlayerContext,
    songbird: Arc<Songbird>,
    guild_id: GuildId,
}

impl LavalinkPlayer {
    pub fn new(
        lavalink: LavalinkClient,
        context: PlayerContext,
        songbird: Arc<Songbird>,
        guild_id: GuildId,
    ) -> Self {
        Self {
            lavalink,
            context,
            songbird,
            guild_id,
        }
    }

    /// The guild's player, if one exists on the node.
    pub fn for_guild(
        lavalink: &LavalinkClient,
        services: &MusicServices,
        guild_id: GuildId,
    ) -> Option<Self> {
        let context = lavalink.get_player_context(guild_id)?;
        Some(Self::new(
            lavalink.clone(),
            context,
            services.songbird.clone(),
            guild_id,
        ))
    }

    /// Returns the guild's player, joining `voice_channel` and creating the node-side
    /// player (bound to `text_channel` for notices) when there is none yet.
    pub async fn connect(
        lavalink: &LavalinkClient,
        services: &MusicServices,
        guild_id: GuildId,
        voice_channel: ChannelId,
        text_channel: ChannelId,
    ) -> MusicResult<Self> {
        if let Some(player) = Self::for_guild(lavalink, services, guild_id) {
            return Ok(player);
        }

        let (info, _call) = services
            .songbird
            .join_gateway(guild_id, voice_channel)
            .await
            .map_err(|e| MusicError::JoinError(e.to_string()))?;

        let context = lavalink
            .create_player_context_with_data::<ChannelId>(
                guild_id,
                connection_info(info),
                Arc::new(text_channel),
            )
            .await
            .map_err(MusicError::node)?;

        info!("Joined voice channel {} in guild {}", voice_channel, guild_id);
        Ok(Self::new(
            lavalink.clone(),
            context,
            services.songbird.clone(),
            guild_id,
        ))
    }
}

#[async_trait]
impl MusicPlayer for LavalinkPlayer {
    type Track = TrackData;

    async fn search(&self, query: &str) -> MusicResult<Vec<TrackData>> {
        let loaded = self
            .lavalink
            .load_tracks(self.guild_id, query)
            .await
            .map_err(MusicError::node)?;

        if let Some(TrackLoadData::Error(e)) = &loaded.data {
            return Err(MusicError::AudioSourceError(e.message.clone()));
        }

        let tracks = loaded_tracks(loaded.data);
        debug!("Query '{}' resolved to {} tracks", query, tracks.len());
        Ok(tracks)
    }

    async fn enqueue(&self, track: TrackData) -> MusicResult<()> {
        self.context
            .get_queue()
            .push_to_back(track)
            .map_err(MusicError::node)
    }

    async fn enqueue_front(&self, track: TrackData) -> MusicResult<()> {
        self.context
            .get_queue()
            .push_to_front(track)
            .map_err(MusicError::node)
    }

    async fn play(&self, track: TrackData) -> MusicResult<()> {
        self.context
            .play_now(&track)
            .await
            .map(|_| ())
            .map_err(MusicError::node)
    }

    async fn current(&self) -> MusicResult<Option<TrackData>> {
        let player = self.context.get_player().await.map_err(MusicError::node)?;
        Ok(player.track)
    }

    async fn is_idle(&self) -> MusicResult<bool> {
        Ok(self.current().await?.is_none())
    }

    async fn upcoming(&self) -> MusicResult<Vec<TrackMetadata>> {
        let queue = self
            .context
            .get_queue()
            .get_queue()
            .await
            .map_err(MusicError::node)?;

        Ok(queue.iter().map(|queued| queued.track.metadata()).collect())
    }

    async fn clear_queue(&self) -> MusicResult<()> {
        self.context.get_queue().clear().map_err(MusicError::node)
    }

    async fn skip(&self) -> MusicResult<()> {
        self.context.skip().map_err(MusicError::node)
    }

    async fn is_paused(&self) -> MusicResult<bool> {
        let player = self.context.get_player().await.map_err(MusicError::node)?;
        Ok(player.paused)
    }

    async fn set_paused(&self, paused: bool) -> MusicResult<()> {
        self.context
            .set_pause(paused)
            .await
            .map(|_| ())
            .map_err(MusicError::node)
    }

    async fn volume(&self) -> MusicResult<u16> {
        let player = self.context.get_player().await.map_err(MusicError::node)?;
        Ok(player.volume)
    }

    async fn set_volume(&self, volume: u16) -> MusicResult<()> {
        self.context
            .set_volume(volume)
            .await
            .map(|_| ())
            .map_err(MusicError::node)
    }

    async fn destroy(&self) -> MusicResult<()> {
        let deleted = self
            .lavalink
            .delete_player(self.guild_id)
            .await
            .map_err(MusicError::node);

        // Leave the voice channel even if the node already forgot the player
        if let Err(e) = self.songbird.remove(self.guild_id).await {
            warn!("Failed to leave voice channel in guild {}: {}", self.guild_id, e);
        }

        deleted
    }
}
