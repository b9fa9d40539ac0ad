//! Lavalink node event hooks: now-playing messages, their button collectors and
//! queue-end detection.

use futures::StreamExt;
use lavalink_rs::client::LavalinkClient;
use lavalink_rs::hook;
use lavalink_rs::model::events::{self, TrackEndReason};
use lavalink_rs::model::track::TrackData;
use ::serenity::async_trait;
use poise::serenity_prelude::{
    self as serenity, ChannelId, ComponentInteractionCollector, CreateMessage, EditMessage, GuildId,
    Http, MessageId, ShardMessenger,
};
use songbird::Songbird;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use super::autoplay_manager::{self, Notice, Notifier};
use super::button_controls;
use super::component_handlers;
use super::embedded_messages;
use super::lavalink_player::LavalinkPlayer;
use super::music_card::{self, CardRenderer};
use super::music_manager::{MusicManager, NowPlayingMessage};
use super::player::Playable;
use crate::config::BotConfig;

type HookResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Time given to the node to start the next queued track before a queue end is assumed.
const QUEUE_END_SETTLE: Duration = Duration::from_millis(250);

/// Voice websocket close code sent when the bot was disconnected from the channel.
const VOICE_DISCONNECTED: u16 = 4014;

/// Shared services the event hooks need, stored as the Lavalink client's user data.
pub struct MusicServices {
    pub http: Arc<Http>,
    pub shard: ShardMessenger,
    pub songbird: Arc<Songbird>,
    pub music: Arc<MusicManager>,
    pub renderer: Option<Arc<dyn CardRenderer>>,
    pub config: Arc<BotConfig>,
}

/// The hooks registered on the Lavalink client.
pub fn lavalink_events() -> events::Events {
    events::Events {
        ready: Some(ready_event),
        track_start: Some(track_start_event),
        track_end: Some(track_end_event),
        track_exception: Some(track_exception_event),
        track_stuck: Some(track_stuck_event),
        websocket_closed: Some(websocket_closed_event),
        ..Default::default()
    }
}

#[hook]
async fn ready_event(_client: LavalinkClient, session_id: String, event: &events::Ready) {
    info!(
        "Lavalink node ready (session {}, resumed: {})",
        session_id, event.resumed
    );
}

#[hook]
async fn track_start_event(client: LavalinkClient, _session_id: String, event: &events::TrackStart) {
    let guild_id = GuildId::new(event.guild_id.0);
    let track = event.track.clone();

    // Card rendering and message sends must not hold up the node's event loop
    tokio::spawn(async move {
        if let Err(e) = present_now_playing(client, guild_id, track).await {
            error!("Failed to present now playing for guild {}: {}", guild_id, e);
        }
    });
}

#[hook]
async fn track_end_event(client: LavalinkClient, _session_id: String, event: &events::TrackEnd) {
    let guild_id = GuildId::new(event.guild_id.0);
    let track = event.track.clone();
    let reason = event.reason.clone();

    tokio::spawn(async move {
        if let Err(e) = handle_track_end(client, guild_id, track, reason).await {
            error!("Failed to handle track end for guild {}: {}", guild_id, e);
        }
    });
}

#[hook]
async fn track_exception_event(
    client: LavalinkClient,
    _session_id: String,
    event: &events::TrackException,
) {
    let guild_id = GuildId::new(event.guild_id.0);
    let metadata = event.track.metadata();
    error!(
        "Track '{}' failed in guild {}: {} ({:?})",
        metadata.title, guild_id, event.exception.message, event.exception.severity
    );

    let reason = event.exception.message.clone();
    tokio::spawn(async move {
        if let Some(notifier) = ChannelNotifier::for_guild(&client, guild_id) {
            notifier
                .send(embedded_messages::playback_failed(&metadata, &reason))
                .await;
        }
    });
}

#[hook]
async fn track_stuck_event(client: LavalinkClient, _session_id: String, event: &events::TrackStuck) {
    let guild_id = GuildId::new(event.guild_id.0);
    let metadata = event.track.metadata();
    warn!(
        "Track '{}' stuck for {}ms in guild {}",
        metadata.title, event.threshold_ms, guild_id
    );

    tokio::spawn(async move {
        if let Some(notifier) = ChannelNotifier::for_guild(&client, guild_id) {
            notifier
                .send(embedded_messages::playback_failed(&metadata, "the track got stuck"))
                .await;
        }
    });
}

#[hook]
async fn websocket_closed_event(
    client: LavalinkClient,
    _session_id: String,
    event: &events::WebSocketClosed,
) {
    let guild_id = GuildId::new(event.guild_id.0);
    error!(
        "Voice websocket closed for guild {}: {} {} (by remote: {})",
        guild_id, event.code, event.reason, event.by_remote
    );

    if event.code != VOICE_DISCONNECTED {
        return;
    }

    tokio::spawn(async move {
        let Ok(services) = client.data::<MusicServices>() else {
            return;
        };
        services.music.set_manual_stop(guild_id);
        services.music.reset_playback(guild_id);
        if let Err(e) = client.delete_player(guild_id).await {
            warn!("Failed to delete player for guild {}: {}", guild_id, e);
        }
    });
}

/// Posts the now-playing message for `track` and starts its button collector.
async fn present_now_playing(client: LavalinkClient, guild_id: GuildId, track: TrackData) -> HookResult {
    let services = client.data::<MusicServices>()?;
    let context = client
        .get_player_context(guild_id)
        .ok_or("No player context for guild")?;
    let channel_id = *context.data::<ChannelId>()?;

    // Retire the previous message's controls before the new ones go live
    services.music.cancel_collector(guild_id);

    let metadata = track.metadata();
    info!("Now playing '{}' in guild {}", metadata.title, guild_id);

    let card = music_card::render_card(
        services.renderer.as_deref(),
        &metadata,
        &services.config.theme,
        &services.config.default_thumbnail,
    )
    .await;

    let message = channel_id
        .send_message(
            &services.http,
            embedded_messages::now_playing(&metadata, card, &services.config.default_thumbnail),
        )
        .await?;

    services.music.replace_now_playing(
        guild_id,
        NowPlayingMessage {
            channel_id,
            message_id: message.id,
            track: track.encoded.clone(),
        },
    );

    let cancelled = services.music.install_collector(guild_id, message.id);
    tokio::spawn(run_collector(
        client.clone(),
        services,
        guild_id,
        channel_id,
        message.id,
        cancelled,
    ));

    Ok(())
}

/// Feeds button presses on `message_id` to the control dispatcher until the window
/// expires or the collector is replaced, then disables the buttons.
async fn run_collector(
    client: LavalinkClient,
    services: Arc<MusicServices>,
    guild_id: GuildId,
    channel_id: ChannelId,
    message_id: MessageId,
    mut cancelled: oneshot::Receiver<()>,
) {
    let mut interactions = Box::pin(
        ComponentInteractionCollector::new(&services.shard)
            .message_id(message_id)
            .timeout(services.config.collector_timeout)
            .stream(),
    );

    loop {
        tokio::select! {
            _ = &mut cancelled => {
                debug!("Collector for message {} cancelled", message_id);
                break;
            }
            next = interactions.next() => match next {
                Some(interaction) => {
                    if let Err(e) =
                        component_handlers::handle_interaction(&client, &services, &interaction).await
                    {
                        error!("Error handling component interaction: {}", e);
                    }
                }
                None => {
                    debug!("Collector for message {} expired", message_id);
                    break;
                }
            },
        }
    }

    services.music.release_collector(guild_id, message_id);
    disable_controls(&services.http, channel_id, message_id).await;
}

/// Greys out the buttons of a now-playing message. Failures are only logged.
async fn disable_controls(http: &Http, channel_id: ChannelId, message_id: MessageId) {
    let edit = EditMessage::new().components(button_controls::music_controls(true));
    if let Err(e) = channel_id.edit_message(http, message_id, edit).await {
        warn!("Failed to disable controls on message {}: {}", message_id, e);
    }
}

async fn handle_track_end(
    client: LavalinkClient,
    guild_id: GuildId,
    track: TrackData,
    reason: TrackEndReason,
) -> HookResult {
    let services = client.data::<MusicServices>()?;
    let music = &services.music;

    // Only the message posted for this track; a newer one may already be up
    if let Some(message) = music.take_now_playing_for(guild_id, &track.encoded) {
        music.release_collector(guild_id, message.message_id);
    }

    if !matches!(
        reason,
        TrackEndReason::Finished | TrackEndReason::LoadFailed | TrackEndReason::Stopped
    ) {
        debug!("Track ended with {:?} in guild {}, nothing to do", reason, guild_id);
        return Ok(());
    }

    let Some(context) = client.get_player_context(guild_id) else {
        music.take_manual_stop(guild_id);
        return Ok(());
    };
    let channel_id = *context.data::<ChannelId>()?;
    let player = LavalinkPlayer::new(client.clone(), context, services.songbird.clone(), guild_id);
    let notifier = ChannelNotifier {
        http: services.http.clone(),
        channel_id,
    };

    sleep(QUEUE_END_SETTLE).await;

    let outcome = autoplay_manager::continue_after_track_end(
        &player,
        &notifier,
        music,
        guild_id,
        track,
        matches!(reason, TrackEndReason::Finished),
        &services.config.default_search_platform,
    )
    .await?;
    debug!("Track end in guild {} resolved to {:?}", guild_id, outcome);

    Ok(())
}

/// Sends notices to the text channel a player is bound to.
pub struct ChannelNotifier {
    http: Arc<Http>,
    channel_id: ChannelId,
}

impl ChannelNotifier {
    fn for_guild(client: &LavalinkClient, guild_id: GuildId) -> Option<Self> {
        let services = client.data::<MusicServices>().ok()?;
        let context = client.get_player_context(guild_id)?;
        let channel_id = *context.data::<ChannelId>().ok()?;
        Some(Self {
            http: services.http.clone(),
            channel_id,
        })
    }

    async fn send(&self, embed: serenity::CreateEmbed) {
        if let Err(e) = self
            .channel_id
            .send_message(&self.http, CreateMessage::new().embed(embed))
            .await
        {
            warn!("Failed to send notice to channel {}: {}", self.channel_id, e);
        }
    }
}

#[async_trait]
impl Notifier for ChannelNotifier {
    async fn notify(&self, notice: Notice) {
        self.send(embedded_messages::notice(&notice)).await;
    }
}
