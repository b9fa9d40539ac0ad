//! Defines the `TrackMetadata` struct, the crate-owned view of a track handed out by the
//! audio node, and the conversion from Lavalink track info.

use lavalink_rs::model::track::TrackInfo;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Unified representation of metadata for a playable track.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrackMetadata {
    /// The title of the track.
    pub title: String,
    /// The uploader or artist, if the source reports one.
    pub author: Option<String>,
    /// The canonical URL of the track, if available.
    pub url: Option<String>,
    /// Platform identifier (video id, track id, ...). Empty when unknown.
    pub identifier: String,
    /// Source platform as reported by the node (`youtube`, `spotify`, `soundcloud`, ...).
    pub source: String,
    /// The duration of the track. `None` for live streams.
    #[serde(with = "humantime_serde")]
    pub duration: Option<Duration>,
    /// URL to a thumbnail image for the track, if available.
    pub thumbnail: Option<String>,
    /// The name of the user who requested the track.
    pub requested_by: Option<String>,
}

impl Default for TrackMetadata {
    fn default() -> Self {
        Self {
            title: "Unknown Track".to_string(),
            author: None,
            url: None,
            identifier: String::new(),
            source: String::new(),
            duration: None,
            thumbnail: None,
            requested_by: None,
        }
    }
}

impl TrackMetadata {
    /// Sets the requestor's name.
    pub fn requested_by(mut self, name: impl Into<String>) -> Self {
        self.requested_by = Some(name.into());
        self
    }

    /// Markdown link to the track, falling back to the bare title.
    pub fn markdown_link(&self) -> String {
        match &self.url {
            Some(url) => format!("[{}]({})", self.title, url),
            None => self.title.clone(),
        }
    }
}

impl From<&TrackInfo> for TrackMetadata {
    fn from(info: &TrackInfo) -> Self {
        let author = Some(info.author.trim())
            .filter(|author| !author.is_empty())
            .map(str::to_string);

        Self {
            title: info.title.clone(),
            author,
            url: info.uri.clone(),
            identifier: info.identifier.clone(),
            source: info.source_name.to_lowercase(),
            duration: (!info.is_stream).then(|| Duration::from_millis(info.length)),
            thumbnail: info.artwork_url.clone(),
            requested_by: None,
        }
    }
}
