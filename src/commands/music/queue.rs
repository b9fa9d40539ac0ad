use super::*;

/// Show the upcoming tracks
#[poise::command(slash_command, guild_only, category = "Music")]
pub async fn queue(ctx: Context<'_>) -> CommandResult {
    run_control(ctx, Control::ShowQueue).await
}
