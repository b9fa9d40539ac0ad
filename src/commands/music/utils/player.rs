//! The seam between the music logic and the audio node: everything the autoplay
//! resolver and the control dispatcher are allowed to do to a guild's player.

use serenity::async_trait;

use super::music_manager::MusicResult;
use crate::commands::music::audio_sources::track_metadata::TrackMetadata;

/// A node-side track handle that can be described with [`TrackMetadata`].
pub trait Playable: Clone + Send + Sync + 'static {
    fn metadata(&self) -> TrackMetadata;
}

impl Playable for TrackMetadata {
    fn metadata(&self) -> TrackMetadata {
        self.clone()
    }
}

/// A guild's player on the audio node.
#[async_trait]
pub trait MusicPlayer: Send + Sync {
    type Track: Playable;

    /// Resolves an identifier (URL or `prefix:terms`) to tracks, in node order.
    async fn search(&self, query: &str) -> MusicResult<Vec<Self::Track>>;

    /// Appends a track to the queue.
    async fn enqueue(&self, track: Self::Track) -> MusicResult<()>;

    /// Puts a track at the head of the queue.
    async fn enqueue_front(&self, track: Self::Track) -> MusicResult<()>;

    /// Starts a track immediately, replacing whatever is playing.
    async fn play(&self, track: Self::Track) -> MusicResult<()>;

    /// The track loaded on the player, if any.
    async fn current(&self) -> MusicResult<Option<Self::Track>>;

    /// `true` when no track is loaded on the player.
    async fn is_idle(&self) -> MusicResult<bool>;

    async fn upcoming(&self) -> MusicResult<Vec<TrackMetadata>>;

    async fn clear_queue(&self) -> MusicResult<()>;

    /// Ends the current track and moves on to the next queued one.
    async fn skip(&self) -> MusicResult<()>;

    async fn is_paused(&self) -> MusicResult<bool>;

    async fn set_paused(&self, paused: bool) -> MusicResult<()>;

    async fn volume(&self) -> MusicResult<u16>;

    async fn set_volume(&self, volume: u16) -> MusicResult<()>;

    /// Stops playback, removes the player from the node and leaves the voice channel.
    async fn destroy(&self) -> MusicResult<()>;

    /// Plays `track` right away when idle, otherwise queues it.
    async fn enqueue_and_play(&self, track: Self::Track) -> MusicResult<()> {
        if self.is_idle().await? {
            self.play(track).await
        } else {
            self.enqueue(track).await
        }
    }
}
