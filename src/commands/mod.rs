//! This module aggregates all the command modules for the bot.

/// Commands related to music playback.
pub mod music;

use crate::{CommandResult, Context, Data, Error};

#[poise::command(slash_command, prefix_command, category = "General")]
pub async fn help(
    ctx: Context<'_>,
    #[description = "Specific command to show help about"]
    #[autocomplete = "poise::builtins::autocomplete_command"]
    command: Option<String>,
) -> CommandResult {
    poise::builtins::help(
        ctx,
        command.as_deref(),
        poise::builtins::HelpConfiguration {
            show_context_menu_commands: true,
            ..Default::default()
        },
    )
    .await
    .map_err(|e| e.into())
}

#[poise::command(prefix_command, hide_in_help)]
pub async fn register(ctx: Context<'_>) -> Result<(), Error> {
    poise::builtins::register_application_commands_buttons(ctx)
        .await
        .map_err(|e| e.into())
}

/// Every command the bot registers.
pub fn all() -> Vec<poise::Command<Data, Error>> {
    use music::{
        autoplay::*, loop_mode::*, pause::*, play::*, queue::*, skip::*, stop::*, volume::*,
    };

    vec![
        // Default commands
        register(),
        help(),
        // Music commands
        play(),
        autoplay(),
        skip(),
        pause(),
        stop(),
        queue(),
        volume(),
        loop_mode(),
    ]
}
