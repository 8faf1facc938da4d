//! Reprise - Playlist Sequencing
//!
//! Host-agnostic playlist engine: ordered playable lists plus the
//! sequencer that decides what plays next.
//!
//! This crate provides:
//! - Music and video playlists with stable order tags (shuffle/unshuffle round-trip)
//! - Repeat modes (Off, One, All) per list
//! - Cursor tracking across insert, remove, swap and shuffle
//! - Skip-on-failure with a consecutive-failure budget (count and time window)
//! - Nested playlist expansion through a pluggable loader
//! - Tagged remote-control commands and a background command worker
//!
//! # Architecture
//!
//! `reprise-playlist` never plays media itself and keeps no global state.
//! The actual player, user notifications, announcements, party mode,
//! metadata lookups and playlist-file parsing are collaborators injected
//! through the traits in [`ports`], bundled in a [`PlayerContext`].
//!
//! # Example: Basic Playback
//!
//! ```rust
//! use reprise_playlist::{
//!     MediaItem, MediaPlayer, PlayerContext, PlaylistConfig, PlaylistId, PlaylistPlayer,
//! };
//! use std::sync::Arc;
//!
//! struct Speaker;
//!
//! impl MediaPlayer for Speaker {
//!     fn play_file(&self, item: &MediaItem, _player: &str, _auto_play: bool) -> bool {
//!         println!("playing {}", item.label);
//!         true
//!     }
//!     fn is_playing_audio(&self) -> bool { true }
//!     fn is_playing_video(&self) -> bool { false }
//! }
//!
//! let mut player = PlaylistPlayer::new(
//!     PlayerContext::new(Arc::new(Speaker)),
//!     PlaylistConfig::default(),
//! );
//!
//! player.set_current_playlist(PlaylistId::Music);
//! player.add(PlaylistId::Music, MediaItem::new("/music/a.flac"));
//! player.add(PlaylistId::Music, MediaItem::new("/music/b.flac"));
//!
//! assert!(player.play());
//! assert_eq!(player.current_song(), Some(0));
//! assert!(player.has_played_first_file());
//! ```
//!
//! # Example: Sharing Between Threads
//!
//! ```rust,no_run
//! use reprise_playlist::{PlaylistCommand, SharedPlaylistPlayer};
//!
//! # fn run(shared: SharedPlaylistPlayer) -> reprise_playlist::Result<()> {
//! let worker = shared.spawn_worker()?;
//! worker.send(PlaylistCommand::Next)?;
//! worker.shutdown()?;
//! # Ok(())
//! # }
//! ```

pub mod command;
pub mod config;
pub mod error;
pub mod events;
pub mod player;
pub mod playlist;
pub mod ports;
pub mod shared;
pub mod shuffle;
pub mod types;

pub use command::{PlayMediaRequest, PlaylistCommand};
pub use config::PlaylistConfig;
pub use error::{PlaylistError, Result};
pub use events::{
    NavigationAction, PlayerEvent, ITEM_ADDED, ITEM_REMOVED, PLAYLIST_CLEARED, PROPERTY_CHANGED,
};
pub use player::PlaylistPlayer;
pub use playlist::{Playlist, PlaylistEntry};
pub use ports::{
    Announcer, Clock, MediaPlayer, MetadataResolver, Notifier, PartyMode, PlayerContext,
    PlaylistLoader, PlaylistMessenger, SystemClock,
};
pub use shared::{CommandSender, CommandWorker, SharedPlaylistPlayer};
pub use types::{MediaItem, PlaylistId, RepeatMode, StartOffset, VideoInfo};
