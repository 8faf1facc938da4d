//! Collaborator ports
//!
//! The sequencer never reaches for global state. Everything it needs from
//! the host (the actual player, user feedback, the announcement bus, party
//! mode, metadata lookups, playlist file parsing) is injected through the
//! traits below and bundled into a [`PlayerContext`].

use crate::error::Result;
use crate::types::{MediaItem, PlaylistId, VideoInfo};
use std::sync::Arc;
use std::time::Instant;

/// The external playback pipeline
///
/// `play_file` may block for as long as opening the media takes; its
/// boolean result is the only signal the sequencer consumes.
pub trait MediaPlayer: Send + Sync {
    /// Start playing `item`; `player` names a preferred backend ("" for default)
    fn play_file(&self, item: &MediaItem, player: &str, auto_play: bool) -> bool;

    /// Audio is currently audible
    fn is_playing_audio(&self) -> bool;

    /// Video is currently on screen
    fn is_playing_video(&self) -> bool;
}

/// User-facing feedback
pub trait Notifier: Send + Sync {
    /// Non-blocking informational toast
    fn notify(&self, title: &str, message: &str);

    /// Modal error dialog
    fn show_error_dialog(&self, title: &str, message: &str);
}

/// Structured pub/sub announcements (remote-control clients listen here)
pub trait Announcer: Send + Sync {
    fn announce(&self, method: &str, data: serde_json::Value);
}

/// Window/message-bus notifications
pub trait PlaylistMessenger: Send + Sync {
    /// Contents or cursor of a playlist probably changed
    fn playlist_changed(&self);

    /// The sequencer gave up on `playlist`; `index` is the last cursor
    fn playlist_stopped(&self, playlist: PlaylistId, index: Option<usize>);

    /// Forget the host's "current playlist file" path
    fn clear_playlist_file(&self);
}

/// Party mode (auto-generated music queue)
pub trait PartyMode: Send + Sync {
    fn is_enabled(&self) -> bool;

    fn disable(&self);
}

/// Media database lookups
pub trait MetadataResolver: Send + Sync {
    /// Hydrate a `videodb://` reference; `None` when the database has no entry
    fn resolve_video_info(&self, item: &MediaItem) -> Option<VideoInfo>;
}

/// Parses playlist files referenced by items (`.m3u`, `.pls`, `.strm`, ...)
pub trait PlaylistLoader: Send + Sync {
    fn load(&self, item: &MediaItem) -> Result<Vec<MediaItem>>;
}

/// Monotonic time source for the consecutive-failure window
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Party mode that is never enabled
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPartyMode;

impl PartyMode for NoPartyMode {
    fn is_enabled(&self) -> bool {
        false
    }

    fn disable(&self) {}
}

/// Resolver without a database
#[derive(Debug, Default, Clone, Copy)]
pub struct NoMetadata;

impl MetadataResolver for NoMetadata {
    fn resolve_video_info(&self, _item: &MediaItem) -> Option<VideoInfo> {
        None
    }
}

/// Loader that refuses every playlist
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPlaylistLoader;

impl PlaylistLoader for NoPlaylistLoader {
    fn load(&self, item: &MediaItem) -> Result<Vec<MediaItem>> {
        Err(crate::error::PlaylistError::load_failed(
            item.redacted_path(),
            "no playlist loader configured",
        ))
    }
}

/// Sink that drops all announcements and messages
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl Announcer for Silent {
    fn announce(&self, _method: &str, _data: serde_json::Value) {}
}

impl PlaylistMessenger for Silent {
    fn playlist_changed(&self) {}

    fn playlist_stopped(&self, _playlist: PlaylistId, _index: Option<usize>) {}

    fn clear_playlist_file(&self) {}
}

impl Notifier for Silent {
    fn notify(&self, _title: &str, _message: &str) {}

    fn show_error_dialog(&self, _title: &str, _message: &str) {}
}

/// Handles to every collaborator the sequencer talks to
#[derive(Clone)]
pub struct PlayerContext {
    pub player: Arc<dyn MediaPlayer>,
    pub notifier: Arc<dyn Notifier>,
    pub announcer: Arc<dyn Announcer>,
    pub messenger: Arc<dyn PlaylistMessenger>,
    pub party_mode: Arc<dyn PartyMode>,
    pub metadata: Arc<dyn MetadataResolver>,
    pub loader: Arc<dyn PlaylistLoader>,
    pub clock: Arc<dyn Clock>,
}

impl PlayerContext {
    /// Context around `player` with silent feedback and no optional services
    pub fn new(player: Arc<dyn MediaPlayer>) -> Self {
        Self {
            player,
            notifier: Arc::new(Silent),
            announcer: Arc::new(Silent),
            messenger: Arc::new(Silent),
            party_mode: Arc::new(NoPartyMode),
            metadata: Arc::new(NoMetadata),
            loader: Arc::new(NoPlaylistLoader),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_announcer(mut self, announcer: Arc<dyn Announcer>) -> Self {
        self.announcer = announcer;
        self
    }

    pub fn with_messenger(mut self, messenger: Arc<dyn PlaylistMessenger>) -> Self {
        self.messenger = messenger;
        self
    }

    pub fn with_party_mode(mut self, party_mode: Arc<dyn PartyMode>) -> Self {
        self.party_mode = party_mode;
        self
    }

    pub fn with_metadata(mut self, metadata: Arc<dyn MetadataResolver>) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_loader(mut self, loader: Arc<dyn PlaylistLoader>) -> Self {
        self.loader = loader;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}

impl std::fmt::Debug for PlayerContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayerContext").finish_non_exhaustive()
    }
}
