//! Defines the `/autoplay` command for managing the music autoplay feature.

use super::*;

/// Enables, disables, or toggles the music autoplay feature for the guild.
///
/// When autoplay is enabled, the bot will automatically play a related song
/// when the queue runs out. If the `enabled` argument is omitted, the command
/// toggles the current autoplay state.
#[poise::command(slash_command, prefix_command, guild_only, category = "Music")]
pub async fn autoplay(
    ctx: Context<'_>,
    #[description = "Enable or disable autoplay"] enabled: Option<bool>,
) -> CommandResult {
    let guild_id = ctx.guild_id().ok_or(MusicError::NotInGuild)?;
    let music = &ctx.data().services.music;

    let new_state = match enabled {
        Some(state) => {
            music.set_autoplay(guild_id, state);
            state
        }
        None => music.toggle_autoplay(guild_id),
    };

    ctx.send(CreateReply::default().embed(embedded_messages::autoplay_status(new_state)))
        .await?;

    Ok(())
}
