//! Playback session driver
//!
//! Feeds the items to the engine through the command worker, then plays
//! the host's part: confirm each started item and auto-advance when it
//! "ends", until the engine deselects the list or the play limit is hit.

use crate::config::CliConfig;
use crate::console::{ConsoleNotifier, ConsolePlayer, JsonAnnouncer, LogMessenger};
use crate::error::Result;
use crate::m3u::M3uLoader;
use reprise_playlist::{
    CommandSender, MediaItem, PlayMediaRequest, PlayerContext, PlayerEvent, Playlist,
    PlaylistCommand, PlaylistId, PlaylistLoader, PlaylistPlayer, SharedPlaylistPlayer,
};
use std::sync::Arc;
use tracing::{debug, info};

/// Nested playlist levels followed when listing
const MAX_EXPAND_DEPTH: usize = 5;

/// Outcome of a session
#[derive(Debug, Clone)]
pub struct Summary {
    /// List the session ran on
    pub playlist: PlaylistId,

    /// Items that started playing
    pub played: usize,

    /// Play attempts that failed
    pub failed: usize,

    /// Entries left in the list afterwards
    pub remaining: Vec<MediaItem>,
}

/// Play `items` to completion
pub fn run(config: &CliConfig, items: Vec<MediaItem>, announce: bool) -> Result<Summary> {
    let console = Arc::new(ConsolePlayer::default());
    let mut ctx = PlayerContext::new(console.clone())
        .with_notifier(Arc::new(ConsoleNotifier))
        .with_messenger(Arc::new(LogMessenger))
        .with_loader(Arc::new(M3uLoader));
    if announce {
        ctx = ctx.with_announcer(Arc::new(JsonAnnouncer));
    }

    let shared = SharedPlaylistPlayer::new(PlaylistPlayer::new(ctx, config.playlist.clone()));
    let worker = shared.spawn_worker()?;
    let sender = worker.sender();

    info!("Starting session with {} items", items.len());
    sender.send(PlaylistCommand::PlayMedia(PlayMediaRequest {
        items,
        playlist: None,
        start: 0,
        player: config.playback.player.clone(),
        shuffle: Some(config.playback.shuffle),
        repeat: Some(config.playback.repeat),
    }))?;
    drain(&sender)?;

    let playlist = shared.lock().current_playlist();
    let limit = config.playback.limit;

    while shared.lock().current_playlist() != PlaylistId::None {
        shared.on_event(PlayerEvent::PlaybackStarted);

        if console.played() >= limit {
            debug!("Play limit of {} reached", limit);
            shared.on_event(PlayerEvent::PlaybackStopped);
            break;
        }

        // current item finished
        if !shared.with(|p| p.play_next(1, true)) {
            break;
        }
    }

    let remaining = sender.get_items(playlist)?;
    worker.shutdown()?;

    Ok(Summary {
        playlist,
        played: console.played(),
        failed: console.failed(),
        remaining,
    })
}

/// Block until every command queued so far has been applied
fn drain(sender: &CommandSender) -> Result<()> {
    sender.get_items(PlaylistId::None)?;
    Ok(())
}

/// Resolve nested playlists in `items` without playing anything
pub fn expand(items: Vec<MediaItem>, loader: &dyn PlaylistLoader) -> Playlist {
    let mut list = Playlist::new(PlaylistId::Music);
    list.add_items(items);

    let mut index = 0;
    while index < list.len() {
        for _ in 0..MAX_EXPAND_DEPTH {
            if !list.expand(index, loader) {
                break;
            }
        }
        index += 1;
    }

    list
}
