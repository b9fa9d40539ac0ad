use dashmap::{DashMap, DashSet};
use poise::serenity_prelude::{self as serenity, ChannelId, GuildId, MessageId, UserId};
use std::fmt::Display;
use thiserror::Error;
use tokio::sync::oneshot;
use tracing::{debug, info};

use crate::commands::music::audio_sources::track_metadata::TrackMetadata;

/// Errors that can occur during music operations
#[derive(Error, Debug)]
pub enum MusicError {
    #[error("Not in a guild")]
    NotInGuild,

    #[error("Failed to join voice channel: {0}")]
    JoinError(String),

    #[error("Failed to get voice manager")]
    NoVoiceManager,

    #[error("User is not in a voice channel")]
    UserNotInVoiceChannel,

    #[error("Audio node error: {0}")]
    Node(String),

    #[error("Audio source error: {0}")]
    AudioSourceError(String),
}

impl MusicError {
    /// Wraps an error reported by the audio node client.
    pub fn node(err: impl Display) -> Self {
        Self::Node(err.to_string())
    }
}

/// Result type for music operations
pub type MusicResult<T> = Result<T, MusicError>;

/// Per-guild repeat behaviour applied when a track finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopMode {
    #[default]
    None,
    Track,
    Queue,
}

impl LoopMode {
    /// The mode the loop button switches to.
    pub fn next(self) -> Self {
        match self {
            LoopMode::None => LoopMode::Track,
            LoopMode::Track => LoopMode::Queue,
            LoopMode::Queue => LoopMode::None,
        }
    }
}

/// The message currently showing the player controls for a guild.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NowPlayingMessage {
    pub channel_id: ChannelId,
    pub message_id: MessageId,
    /// Encoded track the message was posted for.
    pub track: String,
}

/// Keeps a collector alive; dropping it tells the collector task to stop.
struct CollectorGuard {
    message_id: MessageId,
    _cancel: oneshot::Sender<()>,
}

/// Per-guild playback state owned by the bot session.
///
/// Everything here lives in memory only: it is lost on restart and a guild's
/// entries are dropped when the bot leaves that guild.
#[derive(Default)]
pub struct MusicManager {
    // Map of guild ID to autoplay enabled status
    autoplay: DashMap<GuildId, bool>,
    loop_modes: DashMap<GuildId, LoopMode>,
    // Last track that finished playing, used to seed autoplay
    previous: DashMap<GuildId, TrackMetadata>,
    now_playing: DashMap<GuildId, NowPlayingMessage>,
    collectors: DashMap<GuildId, CollectorGuard>,
    // Guilds whose playback was stopped by a user; the next queue end is not an autoplay trigger
    manual_stops: DashSet<GuildId>,
}

impl MusicManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_autoplay_enabled(&self, guild_id: GuildId) -> bool {
        self.autoplay.get(&guild_id).is_some_and(|enabled| *enabled)
    }

    pub fn set_autoplay(&self, guild_id: GuildId, enabled: bool) {
        self.autoplay.insert(guild_id, enabled);
        info!("Autoplay for guild {} set to {}", guild_id, enabled);
    }

    /// Flips the autoplay flag and returns the new value.
    pub fn toggle_autoplay(&self, guild_id: GuildId) -> bool {
        let mut entry = self.autoplay.entry(guild_id).or_insert(false);
        *entry = !*entry;
        let enabled = *entry;
        drop(entry);

        info!("Toggled autoplay for guild {}: {}", guild_id, enabled);
        enabled
    }

    pub fn loop_mode(&self, guild_id: GuildId) -> LoopMode {
        self.loop_modes
            .get(&guild_id)
            .map(|mode| *mode)
            .unwrap_or_default()
    }

    pub fn set_loop_mode(&self, guild_id: GuildId, mode: LoopMode) {
        self.loop_modes.insert(guild_id, mode);
    }

    /// Advances the loop mode (`None -> Track -> Queue -> None`) and returns it.
    pub fn cycle_loop_mode(&self, guild_id: GuildId) -> LoopMode {
        let mut entry = self.loop_modes.entry(guild_id).or_default();
        *entry = entry.next();
        let mode = *entry;
        drop(entry);

        info!("Cycled loop mode for guild {}: {:?}", guild_id, mode);
        mode
    }

    pub fn set_previous(&self, guild_id: GuildId, track: TrackMetadata) {
        self.previous.insert(guild_id, track);
    }

    pub fn previous(&self, guild_id: GuildId) -> Option<TrackMetadata> {
        self.previous.get(&guild_id).map(|track| track.clone())
    }

    /// Records the new now-playing message and hands back the one it replaces.
    pub fn replace_now_playing(
        &self,
        guild_id: GuildId,
        message: NowPlayingMessage,
    ) -> Option<NowPlayingMessage> {
        self.now_playing.insert(guild_id, message)
    }

    pub fn now_playing(&self, guild_id: GuildId) -> Option<NowPlayingMessage> {
        self.now_playing.get(&guild_id).map(|message| message.clone())
    }

    /// Removes the now-playing message only if it was posted for `track`.
    pub fn take_now_playing_for(&self, guild_id: GuildId, track: &str) -> Option<NowPlayingMessage> {
        self.now_playing
            .remove_if(&guild_id, |_, message| message.track == track)
            .map(|(_, message)| message)
    }

    /// Registers the collector for `message_id`, cancelling the guild's previous one.
    ///
    /// The returned receiver resolves once the collector has been replaced or released.
    pub fn install_collector(&self, guild_id: GuildId, message_id: MessageId) -> oneshot::Receiver<()> {
        let (cancel, cancelled) = oneshot::channel();
        let guard = CollectorGuard {
            message_id,
            _cancel: cancel,
        };

        if let Some(previous) = self.collectors.insert(guild_id, guard) {
            debug!(
                "Replaced collector for message {} in guild {}",
                previous.message_id, guild_id
            );
        }

        cancelled
    }

    /// Releases the collector bound to `message_id`. Returns `false` if it was already replaced.
    pub fn release_collector(&self, guild_id: GuildId, message_id: MessageId) -> bool {
        self.collectors
            .remove_if(&guild_id, |_, guard| guard.message_id == message_id)
            .is_some()
    }

    pub fn cancel_collector(&self, guild_id: GuildId) {
        self.collectors.remove(&guild_id);
    }

    pub fn collector_message(&self, guild_id: GuildId) -> Option<MessageId> {
        self.collectors.get(&guild_id).map(|guard| guard.message_id)
    }

    /// Number of guilds with a live collector.
    pub fn active_collectors(&self) -> usize {
        self.collectors.len()
    }

    pub fn set_manual_stop(&self, guild_id: GuildId) {
        self.manual_stops.insert(guild_id);
    }

    pub fn clear_manual_stop(&self, guild_id: GuildId) {
        self.manual_stops.remove(&guild_id);
    }

    /// Consumes the manual stop flag, returning whether it was set.
    pub fn take_manual_stop(&self, guild_id: GuildId) -> bool {
        self.manual_stops.remove(&guild_id).is_some()
    }

    /// Drops everything tied to the current playback session. The autoplay flag survives.
    pub fn reset_playback(&self, guild_id: GuildId) {
        self.loop_modes.remove(&guild_id);
        self.previous.remove(&guild_id);
        self.now_playing.remove(&guild_id);
        self.collectors.remove(&guild_id);
    }

    /// Forgets a guild entirely, e.g. after the bot was removed from it.
    pub fn forget_guild(&self, guild_id: GuildId) {
        self.reset_playback(guild_id);
        self.autoplay.remove(&guild_id);
        self.manual_stops.remove(&guild_id);
        info!("Dropped music state for guild {}", guild_id);
    }

    /// Get the voice channel ID that the user is currently in
    pub fn get_user_voice_channel(
        ctx: &serenity::Context,
        guild_id: GuildId,
        user_id: UserId,
    ) -> MusicResult<ChannelId> {
        let guild = ctx.cache.guild(guild_id).ok_or(MusicError::NotInGuild)?;

        let voice_state = guild
            .voice_states
            .get(&user_id)
            .ok_or(MusicError::UserNotInVoiceChannel)?;

        voice_state
            .channel_id
            .ok_or(MusicError::UserNotInVoiceChannel)
    }
}
