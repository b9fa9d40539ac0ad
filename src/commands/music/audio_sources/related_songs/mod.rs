//! Derives the query used to find a track related to the one that just finished,
//! primarily used for the autoplay feature.

use crate::commands::music::audio_sources::track_metadata::TrackMetadata;

/// Source names as reported by the audio node.
const YOUTUBE: &str = "youtube";
const SPOTIFY: &str = "spotify";
const SOUNDCLOUD: &str = "soundcloud";

/// Builds the node identifier that yields tracks related to `previous`.
///
/// * YouTube tracks resolve to the video's "mix" playlist.
/// * Spotify tracks resolve to a recommendation seeded by the track (LavaSrc `sprec:`).
/// * SoundCloud tracks search the same author.
/// * Anything else (or a track without an identifier) searches `platform` for the
///   author and title.
pub fn related_query(previous: &TrackMetadata, platform: &str) -> String {
    let id = previous.identifier.trim();

    match previous.source.as_str() {
        YOUTUBE if !id.is_empty() => {
            format!("https://www.youtube.com/watch?v={id}&list=RD{id}")
        }
        SPOTIFY if !id.is_empty() => format!("sprec:seed_tracks={id}"),
        SOUNDCLOUD if previous.author.is_some() => {
            format!("scsearch:{}", previous.author.as_deref().unwrap_or_default())
        }
        _ => fallback_search(previous, platform),
    }
}

fn fallback_search(previous: &TrackMetadata, platform: &str) -> String {
    let terms = match &previous.author {
        Some(author) => format!("{} {}", author, previous.title),
        None => previous.title.clone(),
    };
    format!("{}:{}", platform, terms)
}

/// Whether `candidate` is the same track as `previous` (autoplay must not replay it).
pub fn is_same_track(previous: &TrackMetadata, candidate: &TrackMetadata) -> bool {
    if !previous.identifier.is_empty() && previous.identifier == candidate.identifier {
        return true;
    }
    previous.url.is_some() && previous.url == candidate.url
}
