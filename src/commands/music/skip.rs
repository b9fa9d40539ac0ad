use super::*;

/// Skip the current track
#[poise::command(slash_command, guild_only, category = "Music")]
pub async fn skip(ctx: Context<'_>) -> CommandResult {
    run_control(ctx, Control::Skip).await
}
