use lavalink_rs::client::LavalinkClient;
use poise::serenity_prelude::{
    self as serenity, ComponentInteraction, CreateInteractionResponseFollowup, GuildId,
};
use tracing::{debug, error, info, warn};

use super::embedded_messages;
use super::event_handlers::MusicServices;
use super::lavalink_player::LavalinkPlayer;
use super::music_manager::{LoopMode, MusicManager, MusicResult};
use super::player::MusicPlayer;
use crate::commands::music::audio_sources::track_metadata::TrackMetadata;

type ButtonInteractionResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

pub const MIN_VOLUME: u16 = 10;
pub const MAX_VOLUME: u16 = 100;
pub const VOLUME_STEP: u16 = 10;
/// Upcoming tracks listed by the queue control.
pub const QUEUE_PREVIEW_LEN: usize = 10;

/// Player controls reachable from the now-playing buttons and the slash commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    LoopToggle,
    LoopDisable,
    Skip,
    ShowQueue,
    ClearQueue,
    Stop,
    Pause,
    Resume,
    VolumeUp,
    VolumeDown,
    AutoplayToggle,
}

impl Control {
    pub const ALL: [Control; 11] = [
        Control::LoopToggle,
        Control::LoopDisable,
        Control::Skip,
        Control::ShowQueue,
        Control::ClearQueue,
        Control::Stop,
        Control::Pause,
        Control::Resume,
        Control::VolumeUp,
        Control::VolumeDown,
        Control::AutoplayToggle,
    ];

    pub fn custom_id(self) -> &'static str {
        match self {
            Control::LoopToggle => "music_loop",
            Control::LoopDisable => "music_loop_disable",
            Control::Skip => "music_skip",
            Control::ShowQueue => "music_queue",
            Control::ClearQueue => "music_clear",
            Control::Stop => "music_stop",
            Control::Pause => "music_pause",
            Control::Resume => "music_resume",
            Control::VolumeUp => "music_volume_up",
            Control::VolumeDown => "music_volume_down",
            Control::AutoplayToggle => "music_autoplay",
        }
    }

    pub fn from_custom_id(custom_id: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|control| control.custom_id() == custom_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeStep {
    Up,
    Down,
}

/// Result of applying a [`VolumeStep`] to the current volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeChange {
    Changed(u16),
    /// The volume already sits at the boundary in the requested direction.
    AtBoundary(u16),
}

/// Moves `current` one step, clamped to `[MIN_VOLUME, MAX_VOLUME]`.
pub fn adjust_volume(current: u16, step: VolumeStep) -> VolumeChange {
    let target = match step {
        VolumeStep::Up => current.saturating_add(VOLUME_STEP),
        VolumeStep::Down => current.saturating_sub(VOLUME_STEP),
    }
    .clamp(MIN_VOLUME, MAX_VOLUME);

    if target == current {
        VolumeChange::AtBoundary(current)
    } else {
        VolumeChange::Changed(target)
    }
}

/// What a control did, rendered into the ephemeral confirmation.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlReply {
    LoopMode(LoopMode),
    Skipped,
    Queue {
        upcoming: Vec<TrackMetadata>,
        total: usize,
    },
    QueueCleared,
    Stopped,
    Paused,
    Resumed,
    Volume(u16),
    VolumeAtBoundary { volume: u16, step: VolumeStep },
    Autoplay(bool),
}

/// Applies `control` to the guild's player and state. The mutation has completed
/// by the time the reply is returned.
pub async fn dispatch<P>(
    control: Control,
    player: &P,
    music: &MusicManager,
    guild_id: GuildId,
) -> MusicResult<ControlReply>
where
    P: MusicPlayer + ?Sized,
{
    debug!("Dispatching {:?} for guild {}", control, guild_id);

    let reply = match control {
        Control::LoopToggle => ControlReply::LoopMode(music.cycle_loop_mode(guild_id)),
        Control::LoopDisable => {
            music.set_loop_mode(guild_id, LoopMode::None);
            ControlReply::LoopMode(LoopMode::None)
        }
        Control::Skip => {
            player.skip().await?;
            ControlReply::Skipped
        }
        Control::ShowQueue => {
            let upcoming = player.upcoming().await?;
            let total = upcoming.len();
            ControlReply::Queue {
                upcoming: upcoming.into_iter().take(QUEUE_PREVIEW_LEN).collect(),
                total,
            }
        }
        Control::ClearQueue => {
            player.clear_queue().await?;
            ControlReply::QueueCleared
        }
        Control::Stop => {
            // Flag first: the track end caused by the stop must not look like a queue end
            music.set_manual_stop(guild_id);
            if let Err(e) = player.clear_queue().await {
                warn!("Failed to clear queue on stop in guild {}: {}", guild_id, e);
            }
            // The voice connection is left even when the node no longer knows the player
            if let Err(e) = player.destroy().await {
                warn!("Failed to destroy player on stop in guild {}: {}", guild_id, e);
            }
            music.reset_playback(guild_id);
            info!("Playback stopped by user in guild {}", guild_id);
            ControlReply::Stopped
        }
        Control::Pause => {
            player.set_paused(true).await?;
            ControlReply::Paused
        }
        Control::Resume => {
            player.set_paused(false).await?;
            ControlReply::Resumed
        }
        Control::VolumeUp => change_volume(player, VolumeStep::Up).await?,
        Control::VolumeDown => change_volume(player, VolumeStep::Down).await?,
        Control::AutoplayToggle => ControlReply::Autoplay(music.toggle_autoplay(guild_id)),
    };

    Ok(reply)
}

async fn change_volume<P>(player: &P, step: VolumeStep) -> MusicResult<ControlReply>
where
    P: MusicPlayer + ?Sized,
{
    match adjust_volume(player.volume().await?, step) {
        VolumeChange::Changed(volume) => {
            player.set_volume(volume).await?;
            Ok(ControlReply::Volume(volume))
        }
        VolumeChange::AtBoundary(volume) => Ok(ControlReply::VolumeAtBoundary { volume, step }),
    }
}

/// Like [`dispatch`], keyed by component custom id. Unknown ids do nothing and yield `None`.
pub async fn dispatch_custom_id<P>(
    custom_id: &str,
    player: &P,
    music: &MusicManager,
    guild_id: GuildId,
) -> MusicResult<Option<ControlReply>>
where
    P: MusicPlayer + ?Sized,
{
    let Some(control) = Control::from_custom_id(custom_id) else {
        debug!("Ignoring unknown component id '{}'", custom_id);
        return Ok(None);
    };

    dispatch(control, player, music, guild_id).await.map(Some)
}

/// Handle a button interaction on a now-playing message
pub async fn handle_interaction(
    lavalink: &LavalinkClient,
    services: &MusicServices,
    interaction: &ComponentInteraction,
) -> ButtonInteractionResult {
    let custom_id = interaction.data.custom_id.as_str();
    if Control::from_custom_id(custom_id).is_none() {
        debug!("Ignoring unknown button ID: {}", custom_id);
        return Ok(());
    }

    let guild_id = interaction.guild_id.ok_or("Not in a guild")?;

    // Acknowledge before touching the node so the interaction does not time out
    interaction.defer_ephemeral(&services.http).await?;

    let Some(player) = LavalinkPlayer::for_guild(lavalink, services, guild_id) else {
        return followup(services, interaction, embedded_messages::bot_not_in_voice_channel()).await;
    };

    let embed = match dispatch_custom_id(custom_id, &player, &services.music, guild_id).await {
        Ok(Some(reply)) => embedded_messages::control_reply(&reply),
        Ok(None) => return Ok(()),
        Err(e) => {
            error!("Control '{}' failed in guild {}: {}", custom_id, guild_id, e);
            embedded_messages::generic_error(&e.to_string())
        }
    };

    followup(services, interaction, embed).await
}

async fn followup(
    services: &MusicServices,
    interaction: &ComponentInteraction,
    embed: serenity::CreateEmbed,
) -> ButtonInteractionResult {
    interaction
        .create_followup(
            &services.http,
            CreateInteractionResponseFollowup::new()
                .embed(embed)
                .ephemeral(true),
        )
        .await?;
    Ok(())
}
