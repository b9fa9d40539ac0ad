//! Fake implementations of the player and notifier seams
//! They record every call so tests can assert on the exact mutations performed.

use async_trait::async_trait;
use riffle::commands::music::audio_sources::track_metadata::TrackMetadata;
use riffle::commands::music::utils::autoplay_manager::{Notice, Notifier};
use riffle::commands::music::utils::music_manager::{MusicError, MusicResult};
use riffle::commands::music::utils::player::MusicPlayer;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU16, AtomicUsize, Ordering};

/// In-memory player. Search results are configurable; `None` makes every search fail.
pub struct FakePlayer {
    search_results: Mutex<Option<Vec<TrackMetadata>>>,
    searches: Mutex<Vec<String>>,
    current: Mutex<Option<TrackMetadata>>,
    queue: Mutex<VecDeque<TrackMetadata>>,
    started: Mutex<Vec<TrackMetadata>>,
    enqueued: Mutex<Vec<TrackMetadata>>,
    destroy_calls: AtomicUsize,
    fail_destroy: AtomicBool,
    skips: AtomicUsize,
    paused: AtomicBool,
    volume: AtomicU16,
}

impl FakePlayer {
    pub fn new() -> Self {
        Self {
            search_results: Mutex::new(Some(Vec::new())),
            searches: Mutex::new(Vec::new()),
            current: Mutex::new(None),
            queue: Mutex::new(VecDeque::new()),
            started: Mutex::new(Vec::new()),
            enqueued: Mutex::new(Vec::new()),
            destroy_calls: AtomicUsize::new(0),
            fail_destroy: AtomicBool::new(false),
            skips: AtomicUsize::new(0),
            paused: AtomicBool::new(false),
            volume: AtomicU16::new(100),
        }
    }

    pub fn with_search_results(self, results: Vec<TrackMetadata>) -> Self {
        *self.search_results.lock().unwrap() = Some(results);
        self
    }

    pub fn with_failing_search(self) -> Self {
        *self.search_results.lock().unwrap() = None;
        self
    }

    /// `destroy` still tears everything down but reports a node error, as after a node restart.
    pub fn with_failing_destroy(self) -> Self {
        self.fail_destroy.store(true, Ordering::SeqCst);
        self
    }

    pub fn with_volume(self, volume: u16) -> Self {
        self.volume.store(volume, Ordering::SeqCst);
        self
    }

    pub fn playing(self, track: TrackMetadata) -> Self {
        *self.current.lock().unwrap() = Some(track);
        self
    }

    pub fn with_queue(self, tracks: Vec<TrackMetadata>) -> Self {
        *self.queue.lock().unwrap() = tracks.into();
        self
    }

    pub fn searches(&self) -> Vec<String> {
        self.searches.lock().unwrap().clone()
    }

    pub fn current(&self) -> Option<TrackMetadata> {
        self.current.lock().unwrap().clone()
    }

    pub fn queued(&self) -> Vec<TrackMetadata> {
        self.queue.lock().unwrap().iter().cloned().collect()
    }

    /// Tracks handed to `play`.
    pub fn started(&self) -> Vec<TrackMetadata> {
        self.started.lock().unwrap().clone()
    }

    /// Tracks handed to `enqueue`/`enqueue_front`.
    pub fn enqueued(&self) -> Vec<TrackMetadata> {
        self.enqueued.lock().unwrap().clone()
    }

    pub fn destroy_calls(&self) -> usize {
        self.destroy_calls.load(Ordering::SeqCst)
    }

    pub fn skips(&self) -> usize {
        self.skips.load(Ordering::SeqCst)
    }

    pub fn current_volume(&self) -> u16 {
        self.volume.load(Ordering::SeqCst)
    }

    pub fn paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MusicPlayer for FakePlayer {
    type Track = TrackMetadata;

    async fn search(&self, query: &str) -> MusicResult<Vec<TrackMetadata>> {
        self.searches.lock().unwrap().push(query.to_string());
        self.search_results
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| MusicError::node("node unreachable"))
    }

    async fn enqueue(&self, track: TrackMetadata) -> MusicResult<()> {
        self.enqueued.lock().unwrap().push(track.clone());
        self.queue.lock().unwrap().push_back(track);
        Ok(())
    }

    async fn enqueue_front(&self, track: TrackMetadata) -> MusicResult<()> {
        self.enqueued.lock().unwrap().push(track.clone());
        self.queue.lock().unwrap().push_front(track);
        Ok(())
    }

    async fn play(&self, track: TrackMetadata) -> MusicResult<()> {
        self.started.lock().unwrap().push(track.clone());
        *self.current.lock().unwrap() = Some(track);
        Ok(())
    }

    async fn current(&self) -> MusicResult<Option<TrackMetadata>> {
        Ok(self.current.lock().unwrap().clone())
    }

    async fn is_idle(&self) -> MusicResult<bool> {
        Ok(self.current.lock().unwrap().is_none())
    }

    async fn upcoming(&self) -> MusicResult<Vec<TrackMetadata>> {
        Ok(self.queued())
    }

    async fn clear_queue(&self) -> MusicResult<()> {
        self.queue.lock().unwrap().clear();
        Ok(())
    }

    async fn skip(&self) -> MusicResult<()> {
        self.skips.fetch_add(1, Ordering::SeqCst);
        let next = self.queue.lock().unwrap().pop_front();
        *self.current.lock().unwrap() = next;
        Ok(())
    }

    async fn is_paused(&self) -> MusicResult<bool> {
        Ok(self.paused())
    }

    async fn set_paused(&self, paused: bool) -> MusicResult<()> {
        self.paused.store(paused, Ordering::SeqCst);
        Ok(())
    }

    async fn volume(&self) -> MusicResult<u16> {
        Ok(self.current_volume())
    }

    async fn set_volume(&self, volume: u16) -> MusicResult<()> {
        self.volume.store(volume, Ordering::SeqCst);
        Ok(())
    }

    async fn destroy(&self) -> MusicResult<()> {
        self.destroy_calls.fetch_add(1, Ordering::SeqCst);
        *self.current.lock().unwrap() = None;
        self.queue.lock().unwrap().clear();
        if self.fail_destroy.load(Ordering::SeqCst) {
            return Err(MusicError::node("player not found"));
        }
        Ok(())
    }
}

/// Notifier that keeps every notice it was asked to send.
#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }
}
