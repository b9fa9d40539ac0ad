use super::*;
use utils::player::MusicPlayer;

/// Pause or resume the current track
#[poise::command(slash_command, guild_only, category = "Music")]
pub async fn pause(ctx: Context<'_>) -> CommandResult {
    let Some(player) = guild_player(ctx).await? else {
        return Ok(());
    };

    let control = if player.is_paused().await? {
        Control::Resume
    } else {
        Control::Pause
    };

    apply_control(ctx, &player, control).await
}
