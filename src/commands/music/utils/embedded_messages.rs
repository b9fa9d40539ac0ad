use poise::CreateReply;
use poise::serenity_prelude::{CreateAttachment, CreateEmbed, CreateEmbedFooter, CreateMessage};
use std::time::Duration;

use super::autoplay_manager::Notice;
use super::button_controls::{self, CONTROL_LAYOUT};
use super::component_handlers::{ControlReply, VolumeStep};
use super::music_manager::{LoopMode, MusicError};
use super::format_duration;
use crate::commands::music::audio_sources::track_metadata::TrackMetadata;
use crate::config::EMBED_COLOR;

/// File name of the rendered card attached to now-playing messages.
pub const CARD_FILE_NAME: &str = "musicard.png";
const ERROR_COLOR: u32 = 0xff0000;

fn duration_text(metadata: &TrackMetadata) -> String {
    metadata
        .duration
        .map(format_duration)
        .unwrap_or_else(|| "Live".to_string())
}

/// One line per button row, e.g. `🔁 Loop · ➡️ Disable loop · ...`.
fn control_legend() -> String {
    CONTROL_LAYOUT
        .iter()
        .map(|row| {
            row.iter()
                .map(|&control| {
                    format!(
                        "{} {}",
                        button_controls::emoji(control),
                        button_controls::label(control)
                    )
                })
                .collect::<Vec<_>>()
                .join(" · ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Builds the now-playing message: embed, control legend, card attachment and buttons.
///
/// Without a card the embed carries a plain-text notice and the track thumbnail instead.
pub fn now_playing(
    metadata: &TrackMetadata,
    card: Option<Vec<u8>>,
    default_thumbnail: &str,
) -> CreateMessage {
    let mut embed = CreateEmbed::new()
        .title("🎵 Now Playing")
        .description(metadata.markdown_link())
        .field("Duration", format!("`{}`", duration_text(metadata)), true)
        .field("Controls", control_legend(), false)
        .color(EMBED_COLOR);

    if let Some(author) = &metadata.author {
        embed = embed.field("Artist", author, true);
    }
    if let Some(requested_by) = &metadata.requested_by {
        embed = embed.footer(CreateEmbedFooter::new(format!("Requested by {}", requested_by)));
    }

    let message = CreateMessage::new().components(button_controls::music_controls(false));

    match card {
        Some(bytes) => message
            .embed(embed.attachment(CARD_FILE_NAME))
            .add_file(CreateAttachment::bytes(bytes, CARD_FILE_NAME)),
        None => {
            let thumbnail = metadata.thumbnail.as_deref().unwrap_or(default_thumbnail);
            message.embed(
                embed
                    .thumbnail(thumbnail)
                    .field("Card", "Music card unavailable, showing track details instead.", false),
            )
        }
    }
}

/// Create an embed for a queue-end notice
pub fn notice(notice: &Notice) -> CreateEmbed {
    match notice {
        Notice::QueueEnded => CreateEmbed::new()
            .title("📭 Queue Ended")
            .description("The queue has ended and autoplay is off, so I left the voice channel.")
            .color(EMBED_COLOR),
        Notice::AutoplayPlaying(metadata) => CreateEmbed::new()
            .title("🎲 Autoplay")
            .description(format!("Queue ended, now playing {}", metadata.markdown_link()))
            .color(EMBED_COLOR),
        Notice::AutoplayNoResult => CreateEmbed::new()
            .title("🎲 Autoplay")
            .description("Couldn't find a related track to play, so I left the voice channel.")
            .color(ERROR_COLOR),
        Notice::QueueEmpty => CreateEmbed::new()
            .title("📭 Queue Empty")
            .description("Autoplay is on but there is no previous track to continue from.")
            .color(EMBED_COLOR),
    }
}

fn loop_mode_text(mode: LoopMode) -> &'static str {
    match mode {
        LoopMode::None => "Looping disabled",
        LoopMode::Track => "Looping the current track",
        LoopMode::Queue => "Looping the queue",
    }
}

/// Text of the ephemeral confirmation sent after a control ran.
pub fn control_reply_text(reply: &ControlReply) -> String {
    match reply {
        ControlReply::LoopMode(mode) => format!("🔁 {}", loop_mode_text(*mode)),
        ControlReply::Skipped => "⏭️ Skipped the current track".to_string(),
        ControlReply::Queue { upcoming, total } => queue_listing(upcoming, *total),
        ControlReply::QueueCleared => "🗑️ Cleared the queue".to_string(),
        ControlReply::Stopped => "⏹️ Stopped playback and left the voice channel".to_string(),
        ControlReply::Paused => "⏸️ Paused".to_string(),
        ControlReply::Resumed => "▶️ Resumed".to_string(),
        ControlReply::Volume(volume) => format!("🔊 Volume set to {}%", volume),
        ControlReply::VolumeAtBoundary { volume, step } => match step {
            VolumeStep::Up => format!("🔊 Volume is already at the maximum ({}%)", volume),
            VolumeStep::Down => format!("🔉 Volume is already at the minimum ({}%)", volume),
        },
        ControlReply::Autoplay(true) => "🎲 Autoplay enabled".to_string(),
        ControlReply::Autoplay(false) => "🎲 Autoplay disabled".to_string(),
    }
}

fn queue_listing(upcoming: &[TrackMetadata], total: usize) -> String {
    if upcoming.is_empty() {
        return "📭 The queue is empty".to_string();
    }

    let mut description = format!("**📋 Queue - {} tracks**\n", total);
    for (index, track) in upcoming.iter().enumerate() {
        description.push_str(&format!(
            "{}\u{FE0F}\u{20E3} {} `{}`\n",
            index + 1,
            track.markdown_link(),
            duration_text(track)
        ));
    }
    if total > upcoming.len() {
        description.push_str(&format!("…and {} more", total - upcoming.len()));
    }

    let total_duration: Duration = upcoming.iter().filter_map(|track| track.duration).sum();
    if total_duration.as_secs() > 0 && total == upcoming.len() {
        description.push_str(&format!(
            "\n**⏱️ Total Duration:** `{}`",
            format_duration(total_duration)
        ));
    }

    description
}

pub fn control_reply(reply: &ControlReply) -> CreateEmbed {
    CreateEmbed::new()
        .description(control_reply_text(reply))
        .color(EMBED_COLOR)
}

/// Create an embed for when a song is added to the queue
pub fn added_to_queue(metadata: &TrackMetadata, position: usize) -> CreateEmbed {
    CreateEmbed::new()
        .title("🎵 Added to Queue")
        .description(metadata.markdown_link())
        .field("Duration", format!("`{}`", duration_text(metadata)), true)
        .field("Position", format!("`#{}`", position), true)
        .color(EMBED_COLOR)
}

/// Create an embed for a track that starts right away
pub fn starting_playback(metadata: &TrackMetadata) -> CreateEmbed {
    CreateEmbed::new()
        .title("🎵 Starting Playback")
        .description(metadata.markdown_link())
        .field("Duration", format!("`{}`", duration_text(metadata)), true)
        .color(EMBED_COLOR)
}

/// Create an embed for when a playlist is added to the queue
pub fn playlist_added(name: &str, count: usize) -> CreateEmbed {
    CreateEmbed::new()
        .title("🎵 Playlist Added")
        .description(format!("Queued **{}** tracks from **{}**", count, name))
        .color(EMBED_COLOR)
}

/// Create an embed for when a track fails mid-playback
pub fn playback_failed(metadata: &TrackMetadata, reason: &str) -> CreateEmbed {
    CreateEmbed::new()
        .title("⚠️ Playback Error")
        .description(format!("Couldn't play {}: {}", metadata.markdown_link(), reason))
        .color(ERROR_COLOR)
}

pub fn no_results(query: &str) -> CreateReply {
    CreateReply::default().embed(
        CreateEmbed::new()
            .title("❌ No Results")
            .description(format!("Nothing found for `{}`", query))
            .color(ERROR_COLOR),
    )
}

/// Create an embed for when the bot is not connected to a voice channel
pub fn bot_not_in_voice_channel() -> CreateEmbed {
    CreateEmbed::new()
        .title("❌ Error")
        .description("I'm not in a voice channel.")
        .color(ERROR_COLOR)
}

/// Create an embed for when a user is not connected to a voice channel
pub fn user_not_in_voice_channel(err: MusicError) -> CreateReply {
    CreateReply::default()
        .embed(
            CreateEmbed::new()
                .title("❌ Error")
                .description(format!("You need to be in a voice channel: {}", err))
                .color(ERROR_COLOR),
        )
        .ephemeral(true)
}

/// Create an embed for when the bot fails to join a voice channel
pub fn failed_to_join_voice_channel(err: MusicError) -> CreateReply {
    CreateReply::default().embed(
        CreateEmbed::new()
            .title("❌ Error")
            .description(format!("Failed to join voice channel: {}", err))
            .color(ERROR_COLOR),
    )
}

pub fn generic_error(message: &str) -> CreateEmbed {
    CreateEmbed::new()
        .title("❌ Error")
        .description(message)
        .color(ERROR_COLOR)
}

/// Create an embed for when autoplay is enabled or disabled
pub fn autoplay_status(enabled: bool) -> CreateEmbed {
    CreateEmbed::new()
        .title(if enabled {
            "🔄 Autoplay Enabled"
        } else {
            "⏹️ Autoplay Disabled"
        })
        .description(if enabled {
            "I will automatically play related songs when the queue is empty"
        } else {
            "I will stop playing when the queue is empty"
        })
        .color(if enabled { EMBED_COLOR } else { ERROR_COLOR })
}
