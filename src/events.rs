use poise::serenity_prelude::{self as serenity, FullEvent, GuildId};
use tracing::{info, warn};

use crate::{Data, Error};

/// Gateway events the framework forwards to us.
pub async fn event_handler(
    ctx: &serenity::Context,
    event: &FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    match event {
        FullEvent::Ready { data_about_bot } => {
            info!("{} is connected", data_about_bot.user.name);
        }
        FullEvent::GuildDelete { incomplete, .. } if !incomplete.unavailable => {
            info!("Removed from guild {}", incomplete.id);
            data.services.music.forget_guild(incomplete.id);
            drop_player(data, incomplete.id).await;
        }
        FullEvent::VoiceStateUpdate { new, .. } => {
            let Some(guild_id) = new.guild_id else {
                return Ok(());
            };

            // The bot itself left (or was kicked from) the voice channel
            if new.user_id == ctx.cache.current_user().id && new.channel_id.is_none() {
                if data.lavalink.get_player_context(guild_id).is_some() {
                    info!("Disconnected from voice in guild {}", guild_id);
                    data.services.music.set_manual_stop(guild_id);
                }
                data.services.music.reset_playback(guild_id);
                drop_player(data, guild_id).await;
            }
        }
        _ => {}
    }

    Ok(())
}

async fn drop_player(data: &Data, guild_id: GuildId) {
    if data.lavalink.get_player_context(guild_id).is_none() {
        return;
    }
    if let Err(e) = data.lavalink.delete_player(guild_id).await {
        warn!("Failed to delete player for guild {}: {}", guild_id, e);
    }
}
