use super::*;

/// Cycle the loop mode: off, current track, whole queue
#[poise::command(slash_command, guild_only, rename = "loop", category = "Music")]
pub async fn loop_mode(ctx: Context<'_>) -> CommandResult {
    run_control(ctx, Control::LoopToggle).await
}
