//! Music card rendering for now-playing messages.
//!
//! The card itself is drawn by an external HTTP renderer: the bot POSTs a JSON
//! [`CardRequest`] and attaches the PNG it gets back. Rendering is best effort;
//! callers fall back to a plain embed when it fails.

use reqwest::Client;
use serde::Serialize;
use serenity::async_trait;
use thiserror::Error;
use tracing::{debug, warn};

use super::format_duration;
use crate::commands::music::audio_sources::track_metadata::TrackMetadata;

/// Errors that can occur while rendering a card.
#[derive(Error, Debug)]
pub enum CardError {
    /// Error during HTTP request communication, including non-2xx responses.
    #[error("Card renderer request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The renderer answered successfully but with an empty body.
    #[error("Card renderer returned an empty image")]
    EmptyImage,
}

/// Colour scheme of the card, as hex strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardTheme {
    pub background: String,
    pub progress: String,
    pub progress_bar: String,
    pub name: String,
    pub author: String,
}

impl Default for CardTheme {
    fn default() -> Self {
        Self {
            background: "#070707".to_string(),
            progress: "#FF7A00".to_string(),
            progress_bar: "#5F2D00".to_string(),
            name: "#FF7A00".to_string(),
            author: "#696969".to_string(),
        }
    }
}

/// Body sent to the renderer.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CardRequest {
    pub thumbnail_image: String,
    pub background_color: String,
    /// Progress in percent; cards are rendered at track start.
    pub progress: u8,
    pub progress_color: String,
    pub progress_bar_color: String,
    pub name: String,
    pub name_color: String,
    pub author: String,
    pub author_color: String,
    pub start_time: String,
    pub end_time: String,
}

/// Builds the renderer request for `metadata`.
pub fn card_request(metadata: &TrackMetadata, theme: &CardTheme, default_thumbnail: &str) -> CardRequest {
    CardRequest {
        thumbnail_image: metadata
            .thumbnail
            .clone()
            .unwrap_or_else(|| default_thumbnail.to_string()),
        background_color: theme.background.clone(),
        progress: 0,
        progress_color: theme.progress.clone(),
        progress_bar_color: theme.progress_bar.clone(),
        name: metadata.title.clone(),
        name_color: theme.name.clone(),
        author: metadata.author.clone().unwrap_or_default(),
        author_color: theme.author.clone(),
        start_time: "0:00".to_string(),
        end_time: metadata
            .duration
            .map(format_duration)
            .unwrap_or_else(|| "Live".to_string()),
    }
}

#[async_trait]
pub trait CardRenderer: Send + Sync {
    /// Renders the card and returns the PNG bytes.
    async fn render(&self, request: &CardRequest) -> Result<Vec<u8>, CardError>;
}

/// Renders cards by POSTing them to an HTTP endpoint.
#[derive(Debug, Clone)]
pub struct HttpCardRenderer {
    client: Client,
    endpoint: String,
}

impl HttpCardRenderer {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl CardRenderer for HttpCardRenderer {
    async fn render(&self, request: &CardRequest) -> Result<Vec<u8>, CardError> {
        let bytes = self
            .client
            .post(&self.endpoint)
            .header("Accept", "image/png")
            .json(request)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        if bytes.is_empty() {
            return Err(CardError::EmptyImage);
        }

        Ok(bytes.to_vec())
    }
}

/// Renders the card for `metadata`, or `None` when no renderer is configured or it fails.
pub async fn render_card(
    renderer: Option<&dyn CardRenderer>,
    metadata: &TrackMetadata,
    theme: &CardTheme,
    default_thumbnail: &str,
) -> Option<Vec<u8>> {
    let Some(renderer) = renderer else {
        debug!("No card renderer configured, skipping card for '{}'", metadata.title);
        return None;
    };

    match renderer
        .render(&card_request(metadata, theme, default_thumbnail))
        .await
    {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            warn!("Failed to render music card for '{}': {}", metadata.title, e);
            None
        }
    }
}
