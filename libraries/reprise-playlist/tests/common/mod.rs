//! Shared fakes for integration tests
//!
//! Every collaborator records what the sequencer asked of it.

#![allow(dead_code)]

use reprise_playlist::{
    Announcer, Clock, MediaItem, MediaPlayer, MetadataResolver, Notifier,
    PartyMode, PlayerContext, PlaylistConfig, PlaylistId, PlaylistLoader, PlaylistMessenger,
    PlaylistPlayer, VideoInfo,
};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::time::{Duration, Instant};

static INIT: Once = Once::new();

/// Install a test-writer tracing subscriber once per test binary
pub fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("reprise_playlist=debug")
            .with_test_writer()
            .try_init();
    });
}

// ===== Player =====

/// Records every play attempt; paths in `failing` report failure
#[derive(Default)]
pub struct FakePlayer {
    failing: Mutex<HashSet<String>>,
    attempts: Mutex<Vec<(String, String)>>,
    pub audio: AtomicBool,
    pub video: AtomicBool,
}

impl FakePlayer {
    pub fn fail(&self, path: &str) {
        self.failing.lock().unwrap().insert(path.to_string());
    }

    /// Paths in attempt order
    pub fn attempts(&self) -> Vec<String> {
        self.attempts
            .lock()
            .unwrap()
            .iter()
            .map(|(path, _)| path.clone())
            .collect()
    }

    /// Player hint passed with each attempt
    pub fn player_hints(&self) -> Vec<String> {
        self.attempts
            .lock()
            .unwrap()
            .iter()
            .map(|(_, player)| player.clone())
            .collect()
    }
}

impl MediaPlayer for FakePlayer {
    fn play_file(&self, item: &MediaItem, player: &str, _auto_play: bool) -> bool {
        self.attempts
            .lock()
            .unwrap()
            .push((item.path.clone(), player.to_string()));

        if self.failing.lock().unwrap().contains(&item.path) {
            return false;
        }

        self.audio.store(item.is_audio(), Ordering::SeqCst);
        self.video.store(item.is_video(), Ordering::SeqCst);
        true
    }

    fn is_playing_audio(&self) -> bool {
        self.audio.load(Ordering::SeqCst)
    }

    fn is_playing_video(&self) -> bool {
        self.video.load(Ordering::SeqCst)
    }
}

// ===== Feedback =====

#[derive(Default)]
pub struct RecordingNotifier {
    pub toasts: Mutex<Vec<(String, String)>>,
    pub dialogs: Mutex<Vec<(String, String)>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<String> {
        self.toasts
            .lock()
            .unwrap()
            .iter()
            .map(|(_, message)| message.clone())
            .collect()
    }

    pub fn dialog_count(&self) -> usize {
        self.dialogs.lock().unwrap().len()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, title: &str, message: &str) {
        self.toasts
            .lock()
            .unwrap()
            .push((title.to_string(), message.to_string()));
    }

    fn show_error_dialog(&self, title: &str, message: &str) {
        self.dialogs
            .lock()
            .unwrap()
            .push((title.to_string(), message.to_string()));
    }
}

#[derive(Default)]
pub struct RecordingAnnouncer {
    pub announcements: Mutex<Vec<(String, serde_json::Value)>>,
}

impl RecordingAnnouncer {
    pub fn all(&self) -> Vec<(String, serde_json::Value)> {
        self.announcements.lock().unwrap().clone()
    }

    /// Payloads announced under `method`, in order
    pub fn of(&self, method: &str) -> Vec<serde_json::Value> {
        self.announcements
            .lock()
            .unwrap()
            .iter()
            .filter(|(m, _)| m == method)
            .map(|(_, data)| data.clone())
            .collect()
    }
}

impl Announcer for RecordingAnnouncer {
    fn announce(&self, method: &str, data: serde_json::Value) {
        self.announcements
            .lock()
            .unwrap()
            .push((method.to_string(), data));
    }
}

#[derive(Default)]
pub struct RecordingMessenger {
    pub changed: AtomicUsize,
    pub cleared_files: AtomicUsize,
    pub stopped: Mutex<Vec<(PlaylistId, Option<usize>)>>,
}

impl RecordingMessenger {
    pub fn changed_count(&self) -> usize {
        self.changed.load(Ordering::SeqCst)
    }

    pub fn stopped(&self) -> Vec<(PlaylistId, Option<usize>)> {
        self.stopped.lock().unwrap().clone()
    }
}

impl PlaylistMessenger for RecordingMessenger {
    fn playlist_changed(&self) {
        self.changed.fetch_add(1, Ordering::SeqCst);
    }

    fn playlist_stopped(&self, playlist: PlaylistId, index: Option<usize>) {
        self.stopped.lock().unwrap().push((playlist, index));
    }

    fn clear_playlist_file(&self) {
        self.cleared_files.fetch_add(1, Ordering::SeqCst);
    }
}

// ===== Optional services =====

#[derive(Default)]
pub struct FakePartyMode {
    pub enabled: AtomicBool,
    pub disabled_calls: AtomicUsize,
}

impl FakePartyMode {
    pub fn enable(&self) {
        self.enabled.store(true, Ordering::SeqCst);
    }
}

impl PartyMode for FakePartyMode {
    fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    fn disable(&self) {
        self.enabled.store(false, Ordering::SeqCst);
        self.disabled_calls.fetch_add(1, Ordering::SeqCst);
    }
}

/// Resolves every `videodb://` item to a fixed title
pub struct FakeMetadata;

impl MetadataResolver for FakeMetadata {
    fn resolve_video_info(&self, item: &MediaItem) -> Option<VideoInfo> {
        Some(VideoInfo {
            db_id: 7,
            title: format!("Resolved {}", item.label),
            runtime: Some(Duration::from_secs(5400)),
        })
    }
}

/// Loader backed by an in-memory map of playlist path to entries
#[derive(Default)]
pub struct MapLoader {
    pub lists: Mutex<HashMap<String, Vec<MediaItem>>>,
}

impl MapLoader {
    pub fn insert(&self, path: &str, entries: &[&str]) {
        self.lists.lock().unwrap().insert(
            path.to_string(),
            entries.iter().map(|p| MediaItem::new(*p)).collect(),
        );
    }
}

impl PlaylistLoader for MapLoader {
    fn load(&self, item: &MediaItem) -> reprise_playlist::Result<Vec<MediaItem>> {
        self.lists
            .lock()
            .unwrap()
            .get(&item.path)
            .cloned()
            .ok_or_else(|| reprise_playlist::PlaylistError::load_failed(&item.path, "not found"))
    }
}

/// Clock advancing by `step` on every reading
pub struct SteppingClock {
    now: Mutex<Instant>,
    step: Duration,
}

impl SteppingClock {
    pub fn new(step: Duration) -> Self {
        Self {
            now: Mutex::new(Instant::now()),
            step,
        }
    }
}

impl Clock for SteppingClock {
    fn now(&self) -> Instant {
        let mut now = self.now.lock().unwrap();
        let reading = *now;
        *now += self.step;
        reading
    }
}

// ===== Harness =====

/// Sequencer wired to recording fakes
pub struct Harness {
    pub player: Arc<FakePlayer>,
    pub notifier: Arc<RecordingNotifier>,
    pub announcer: Arc<RecordingAnnouncer>,
    pub messenger: Arc<RecordingMessenger>,
    pub party_mode: Arc<FakePartyMode>,
    pub loader: Arc<MapLoader>,
}

impl Harness {
    pub fn new() -> Self {
        init_tracing();
        Self {
            player: Arc::new(FakePlayer::default()),
            notifier: Arc::new(RecordingNotifier::default()),
            announcer: Arc::new(RecordingAnnouncer::default()),
            messenger: Arc::new(RecordingMessenger::default()),
            party_mode: Arc::new(FakePartyMode::default()),
            loader: Arc::new(MapLoader::default()),
        }
    }

    pub fn context(&self) -> PlayerContext {
        PlayerContext::new(self.player.clone())
            .with_notifier(self.notifier.clone())
            .with_announcer(self.announcer.clone())
            .with_messenger(self.messenger.clone())
            .with_party_mode(self.party_mode.clone())
            .with_metadata(Arc::new(FakeMetadata))
            .with_loader(self.loader.clone())
    }

    pub fn sequencer(&self) -> PlaylistPlayer {
        self.sequencer_with(PlaylistConfig::default())
    }

    pub fn sequencer_with(&self, config: PlaylistConfig) -> PlaylistPlayer {
        PlaylistPlayer::new(self.context(), config)
    }
}

/// Music list selected and filled with `paths`
pub fn music_list(harness: &Harness, paths: &[&str]) -> PlaylistPlayer {
    let mut player = harness.sequencer();
    player.set_current_playlist(PlaylistId::Music);
    for path in paths {
        player.add(PlaylistId::Music, MediaItem::new(*path));
    }
    player
}

/// Paths of a list in physical order
pub fn paths(player: &PlaylistPlayer, id: PlaylistId) -> Vec<String> {
    player
        .peek_playlist(id)
        .iter()
        .map(|entry| entry.item().path.clone())
        .collect()
}
