use super::*;

#[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
pub enum VolumeDirection {
    #[name = "up"]
    Up,
    #[name = "down"]
    Down,
}

/// Turn the volume up or down by 10%
#[poise::command(slash_command, guild_only, category = "Music")]
pub async fn volume(
    ctx: Context<'_>,
    #[description = "Direction to move the volume"] direction: VolumeDirection,
) -> CommandResult {
    let control = match direction {
        VolumeDirection::Up => Control::VolumeUp,
        VolumeDirection::Down => Control::VolumeDown,
    };

    run_control(ctx, control).await
}
