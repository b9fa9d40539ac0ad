//! This module turns user input and previously played tracks into identifiers the
//! audio node can resolve.

/// Derives autoplay queries from a previously played track.
pub mod related_songs;
/// Defines the `TrackMetadata` struct used across the music commands.
pub mod track_metadata;

use regex::Regex;
use std::sync::LazyLock;
use url::Url;

/// Matches identifiers that already carry a node search prefix (`ytsearch:`, `sprec:`, ...).
static SEARCH_PREFIX_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z]{2,}(?:search|rec):").expect("valid search prefix regex"));

/// A utility struct providing helpers related to audio sources.
pub struct AudioSource;

impl AudioSource {
    /// Performs a basic check if the input string can be parsed as a URL.
    pub fn is_url(input: &str) -> bool {
        Url::parse(input).is_ok_and(|url| matches!(url.scheme(), "http" | "https"))
    }

    /// Checks if the input already names a node search source.
    pub fn has_search_prefix(input: &str) -> bool {
        SEARCH_PREFIX_REGEX.is_match(input)
    }

    /// Turns a user query into a node identifier: URLs and prefixed searches pass through,
    /// anything else is searched on `platform`.
    pub fn to_identifier(input: &str, platform: &str) -> String {
        let input = input.trim();
        if Self::is_url(input) || Self::has_search_prefix(input) {
            input.to_string()
        } else {
            format!("{}:{}", platform, input)
        }
    }
}
