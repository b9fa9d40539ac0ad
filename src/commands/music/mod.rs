pub(crate) mod autoplay;
pub(crate) mod loop_mode;
pub(crate) mod pause;
pub(crate) mod play;
pub(crate) mod queue;
pub(crate) mod skip;
pub(crate) mod stop;
pub(crate) mod volume;

pub mod audio_sources;
pub mod utils;

use crate::{CommandResult, Context};
use poise::CreateReply;
use utils::{
    component_handlers::{self, Control},
    embedded_messages,
    lavalink_player::LavalinkPlayer,
    music_manager::MusicError,
};

/// Looks up the guild's player, telling the user when the bot isn't connected.
async fn guild_player(ctx: Context<'_>) -> Result<Option<LavalinkPlayer>, crate::Error> {
    let guild_id = ctx.guild_id().ok_or(MusicError::NotInGuild)?;
    let data = ctx.data();

    let player = LavalinkPlayer::for_guild(&data.lavalink, &data.services, guild_id);
    if player.is_none() {
        ctx.send(
            CreateReply::default()
                .embed(embedded_messages::bot_not_in_voice_channel())
                .ephemeral(true),
        )
        .await?;
    }
    Ok(player)
}

/// Runs a player control the same way the now-playing buttons do.
async fn run_control(ctx: Context<'_>, control: Control) -> CommandResult {
    let Some(player) = guild_player(ctx).await? else {
        return Ok(());
    };

    apply_control(ctx, &player, control).await
}

/// Dispatches `control` on an already resolved player and replies with the outcome.
async fn apply_control(ctx: Context<'_>, player: &LavalinkPlayer, control: Control) -> CommandResult {
    let guild_id = ctx.guild_id().ok_or(MusicError::NotInGuild)?;
    let reply =
        component_handlers::dispatch(control, player, &ctx.data().services.music, guild_id).await?;
    ctx.send(CreateReply::default().embed(embedded_messages::control_reply(&reply)))
        .await?;

    Ok(())
}
