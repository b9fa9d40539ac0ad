//! Riffle: a Discord music bot playing through a Lavalink node, with autoplay
//! and button controls on its now-playing messages.

use lavalink_rs::client::LavalinkClient;
use lavalink_rs::model::events::Events;
use lavalink_rs::node::NodeBuilder;
use lavalink_rs::prelude::NodeDistributionStrategy;
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use tracing::info;

pub mod commands;
pub mod config;
pub mod events;

use commands::music::utils::{
    event_handlers::{self, MusicServices},
    music_card::{CardRenderer, HttpCardRenderer},
    music_manager::{MusicError, MusicManager},
};
use config::BotConfig;

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;
pub type CommandResult = Result<(), Error>;

/// User data, which is stored and accessible in all command invocations
pub struct Data {
    pub lavalink: LavalinkClient,
    pub services: Arc<MusicServices>,
}

impl Data {
    /// Wires up the music services and connects to the configured Lavalink nodes.
    pub async fn connect(
        ctx: &serenity::Context,
        ready: &serenity::Ready,
        config: Arc<BotConfig>,
    ) -> Result<Self, Error> {
        let songbird = songbird::get(ctx).await.ok_or(MusicError::NoVoiceManager)?;

        let renderer = config
            .card_endpoint
            .as_deref()
            .map(|endpoint| Arc::new(HttpCardRenderer::new(endpoint)) as Arc<dyn CardRenderer>);

        let services = Arc::new(MusicServices {
            http: ctx.http.clone(),
            shard: ctx.shard.clone(),
            songbird,
            music: Arc::new(MusicManager::new()),
            renderer,
            config: config.clone(),
        });

        let nodes = config
            .nodes
            .iter()
            .map(|node| NodeBuilder {
                hostname: node.address(),
                is_ssl: node.secure,
                events: Events::default(),
                password: node.password.clone(),
                user_id: ready.user.id.into(),
                session_id: None,
            })
            .collect();

        let lavalink = LavalinkClient::new_with_data(
            event_handlers::lavalink_events(),
            nodes,
            NodeDistributionStrategy::round_robin(),
            services.clone(),
        )
        .await;

        info!("Connected to {} Lavalink node(s)", config.nodes.len());
        Ok(Self { lavalink, services })
    }
}
