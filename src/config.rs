//! Runtime configuration, read from the environment (optionally seeded from a `.env` file).

use serde::Deserialize;
use std::env;
use std::time::Duration;
use thiserror::Error;

use crate::commands::music::utils::music_card::CardTheme;

const DEFAULT_PREFIX: &str = "!";
const DEFAULT_SEARCH_PLATFORM: &str = "ytmsearch";
const DEFAULT_COLLECTOR_TIMEOUT: Duration = Duration::from_secs(600);
const DEFAULT_THUMBNAIL: &str = "https://i.imgur.com/3ZqCeUm.png";
/// Accent colour used by every embed the bot sends.
pub const EMBED_COLOR: u32 = 0xFF7A00;

/// Errors raised while assembling the bot configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },

    #[error("No Lavalink nodes configured")]
    NoNodes,
}

/// Connection details for a single Lavalink node.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct NodeConfig {
    #[serde(default = "NodeConfig::default_name")]
    pub name: String,
    pub host: String,
    pub port: u16,
    pub password: String,
    #[serde(default)]
    pub secure: bool,
}

impl NodeConfig {
    fn default_name() -> String {
        "main".to_string()
    }

    /// `host:port`, the form the Lavalink client expects.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Everything the bot needs to start.
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub discord_token: String,
    pub prefix: String,
    pub nodes: Vec<NodeConfig>,
    /// Prefix applied to free-text queries and autoplay fallbacks (e.g. `ytmsearch`).
    pub default_search_platform: String,
    /// How long the buttons on a now-playing message stay live.
    pub collector_timeout: Duration,
    /// Endpoint of the HTTP music-card renderer. `None` disables the card.
    pub card_endpoint: Option<String>,
    pub default_thumbnail: String,
    pub theme: CardTheme,
}

impl BotConfig {
    /// Reads the configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let discord_token = lookup("DISCORD_TOKEN")
            .filter(|token| !token.trim().is_empty())
            .ok_or(ConfigError::Missing("DISCORD_TOKEN"))?;

        let nodes = match lookup("LAVALINK_NODES") {
            Some(raw) => parse_nodes(&raw)?,
            None => vec![single_node(&lookup)?],
        };
        if nodes.is_empty() {
            return Err(ConfigError::NoNodes);
        }

        let collector_timeout = match lookup("COLLECTOR_TIMEOUT") {
            Some(raw) => parse_duration("COLLECTOR_TIMEOUT", &raw)?,
            None => DEFAULT_COLLECTOR_TIMEOUT,
        };

        Ok(Self {
            discord_token,
            prefix: lookup("BOT_PREFIX").unwrap_or_else(|| DEFAULT_PREFIX.to_string()),
            nodes,
            default_search_platform: lookup("DEFAULT_SEARCH_PLATFORM")
                .unwrap_or_else(|| DEFAULT_SEARCH_PLATFORM.to_string()),
            collector_timeout,
            card_endpoint: lookup("MUSICARD_URL").filter(|url| !url.trim().is_empty()),
            default_thumbnail: lookup("DEFAULT_THUMBNAIL")
                .unwrap_or_else(|| DEFAULT_THUMBNAIL.to_string()),
            theme: CardTheme::default(),
        })
    }
}

/// Parses `LAVALINK_NODES`, a JSON array of node objects.
fn parse_nodes(raw: &str) -> Result<Vec<NodeConfig>, ConfigError> {
    serde_json::from_str(raw).map_err(|e| ConfigError::Invalid {
        key: "LAVALINK_NODES",
        reason: e.to_string(),
    })
}

fn single_node<F>(lookup: &F) -> Result<NodeConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let port = match lookup("LAVALINK_PORT") {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
            key: "LAVALINK_PORT",
            reason: format!("'{}' is not a port number", raw),
        })?,
        None => 2333,
    };

    let secure = match lookup("LAVALINK_SECURE") {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
            key: "LAVALINK_SECURE",
            reason: format!("'{}' is not true/false", raw),
        })?,
        None => false,
    };

    Ok(NodeConfig {
        name: NodeConfig::default_name(),
        host: lookup("LAVALINK_HOST").unwrap_or_else(|| "localhost".to_string()),
        port,
        password: lookup("LAVALINK_PASSWORD").unwrap_or_else(|| "youshallnotpass".to_string()),
        secure,
    })
}

/// Parses a human readable duration such as `90s` or `10m`.
fn parse_duration(key: &'static str, raw: &str) -> Result<Duration, ConfigError> {
    #[derive(Deserialize)]
    struct Humantime(#[serde(with = "humantime_serde")] Duration);

    serde_json::from_value::<Humantime>(serde_json::Value::String(raw.trim().to_string()))
        .map(|Humantime(duration)| duration)
        .map_err(|e| ConfigError::Invalid {
            key,
            reason: e.to_string(),
        })
}
