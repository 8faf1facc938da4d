//! Remote-control commands
//!
//! Tagged commands for hosts that drive the sequencer through a queue
//! (remote clients, scripting, the CLI). Each variant carries typed
//! parameters; replies go back over a channel carried in the command.

use crate::{
    player::PlaylistPlayer,
    types::{MediaItem, PlaylistId, RepeatMode},
};
use crossbeam_channel::Sender;
use tracing::debug;

/// Request to start playing a set of items, or a list already filled
#[derive(Debug, Clone, Default)]
pub struct PlayMediaRequest {
    /// Items to play; any video item selects the video list
    pub items: Vec<MediaItem>,

    /// List to select and play when `items` is empty
    pub playlist: Option<PlaylistId>,

    /// Index to start from, unless a single item is played ad hoc
    pub start: usize,

    /// Preferred player backend ("" for default)
    pub player: String,

    /// Shuffle option for multi-item requests
    pub shuffle: Option<bool>,

    /// Repeat option for multi-item requests
    pub repeat: Option<RepeatMode>,
}

/// Commands applied to the sequencer in arrival order
#[derive(Debug, Clone)]
pub enum PlaylistCommand {
    /// Play the current list at `index`, or from the top
    Play { index: Option<usize> },

    /// Play by music database id; result sent on `reply`
    PlaySongId {
        song_id: i64,
        reply: Option<Sender<bool>>,
    },

    /// Skip to next item
    Next,

    /// Go to previous item
    Previous,

    /// Append items
    Add {
        playlist: PlaylistId,
        items: Vec<MediaItem>,
    },

    /// Insert items at `index` (`None` appends)
    Insert {
        playlist: PlaylistId,
        items: Vec<MediaItem>,
        index: Option<usize>,
    },

    /// Remove entry at `position`
    Remove {
        playlist: PlaylistId,
        position: usize,
    },

    /// Empty a list
    Clear { playlist: PlaylistId },

    /// Turn shuffle on or off
    Shuffle { playlist: PlaylistId, enabled: bool },

    /// Set repeat mode
    Repeat {
        playlist: PlaylistId,
        mode: RepeatMode,
    },

    /// Exchange two entries
    Swap {
        playlist: PlaylistId,
        first: usize,
        second: usize,
    },

    /// Snapshot of a list's items, sent on `reply`
    GetItems {
        playlist: PlaylistId,
        reply: Sender<Vec<MediaItem>>,
    },

    /// Replace the music or video list and start playing, or play a named list
    PlayMedia(PlayMediaRequest),
}

impl PlaylistCommand {
    /// Short name for logging
    pub fn name(&self) -> &'static str {
        match self {
            Self::Play { .. } => "play",
            Self::PlaySongId { .. } => "play_song_id",
            Self::Next => "next",
            Self::Previous => "previous",
            Self::Add { .. } => "add",
            Self::Insert { .. } => "insert",
            Self::Remove { .. } => "remove",
            Self::Clear { .. } => "clear",
            Self::Shuffle { .. } => "shuffle",
            Self::Repeat { .. } => "repeat",
            Self::Swap { .. } => "swap",
            Self::GetItems { .. } => "get_items",
            Self::PlayMedia(_) => "play_media",
        }
    }
}

impl PlaylistPlayer {
    /// Apply one command
    pub fn handle_command(&mut self, command: PlaylistCommand) {
        debug!("Playlist command: {}", command.name());

        match command {
            PlaylistCommand::Play { index: Some(index) } => {
                self.play_at(index, "", false, false);
            }
            PlaylistCommand::Play { index: None } => {
                self.play();
            }
            PlaylistCommand::PlaySongId { song_id, reply } => {
                let played = self.play_song_id(song_id);
                if let Some(reply) = reply {
                    // caller may have stopped waiting
                    reply.send(played).ok();
                }
            }
            PlaylistCommand::Next => {
                self.play_next(1, false);
            }
            PlaylistCommand::Previous => {
                self.play_previous();
            }
            PlaylistCommand::Add { playlist, items } => {
                self.add_items(playlist, items);
            }
            PlaylistCommand::Insert {
                playlist,
                items,
                index,
            } => {
                self.insert_items(playlist, items, index);
            }
            PlaylistCommand::Remove { playlist, position } => {
                self.remove(playlist, position);
            }
            PlaylistCommand::Clear { playlist } => {
                self.clear_playlist(playlist);
            }
            PlaylistCommand::Shuffle { playlist, enabled } => {
                self.set_shuffle(playlist, enabled, false);
            }
            PlaylistCommand::Repeat { playlist, mode } => {
                self.set_repeat(playlist, mode, false);
            }
            PlaylistCommand::Swap {
                playlist,
                first,
                second,
            } => {
                self.swap(playlist, first, second);
            }
            PlaylistCommand::GetItems { playlist, reply } => {
                reply.send(self.peek_playlist(playlist).items()).ok();
            }
            PlaylistCommand::PlayMedia(request) => {
                self.play_media(request);
            }
        }
    }

    /// Replace the music or video list with `request.items` and play
    ///
    /// A single item that is not itself a playlist is played ad hoc.
    /// Otherwise the shuffle/repeat options are applied, the items added
    /// and playback started at `request.start`. Without items, the list
    /// named by `request.playlist` is selected as it is and played from
    /// `request.start`.
    pub fn play_media(&mut self, request: PlayMediaRequest) -> bool {
        let PlayMediaRequest {
            mut items,
            playlist,
            start,
            player,
            shuffle,
            repeat,
        } = request;

        if items.is_empty() {
            return match playlist {
                Some(id) if id.is_sequenced() => {
                    self.set_current_playlist(id);
                    self.play_at(start, &player, false, false)
                }
                _ => false,
            };
        }

        let playlist = if items.iter().any(MediaItem::is_video) {
            PlaylistId::Video
        } else {
            PlaylistId::Music
        };

        self.clear_playlist(playlist);
        self.set_current_playlist(playlist);

        if items.len() == 1 && !items[0].is_playlist() {
            let item = items.remove(0);
            return self.play_item(item, &player);
        }

        if let Some(shuffle) = shuffle {
            self.set_shuffle(playlist, shuffle, false);
        }
        if let Some(mode) = repeat {
            self.set_repeat(playlist, mode, false);
        }

        self.add_items(playlist, items);
        self.play_at(start, &player, false, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::PlaylistConfig, ports::MediaPlayer, ports::PlayerContext};
    use crossbeam_channel::bounded;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct Recorder {
        played: Mutex<Vec<String>>,
    }

    impl MediaPlayer for Recorder {
        fn play_file(&self, item: &MediaItem, _player: &str, _auto_play: bool) -> bool {
            self.played.lock().unwrap().push(item.path.clone());
            true
        }

        fn is_playing_audio(&self) -> bool {
            false
        }

        fn is_playing_video(&self) -> bool {
            false
        }
    }

    fn sequencer() -> (PlaylistPlayer, Arc<Recorder>) {
        let recorder = Arc::new(Recorder::default());
        let player = PlaylistPlayer::new(
            PlayerContext::new(recorder.clone()),
            PlaylistConfig::default(),
        );
        (player, recorder)
    }

    fn items(paths: &[&str]) -> Vec<MediaItem> {
        paths.iter().map(|p| MediaItem::new(*p)).collect()
    }

    #[test]
    fn add_then_play_by_index() {
        let (mut p, recorder) = sequencer();
        p.set_current_playlist(PlaylistId::Music);
        p.handle_command(PlaylistCommand::Add {
            playlist: PlaylistId::Music,
            items: items(&["/m/a.mp3", "/m/b.mp3"]),
        });
        p.handle_command(PlaylistCommand::Play { index: Some(1) });

        assert_eq!(p.current_song(), Some(1));
        assert_eq!(*recorder.played.lock().unwrap(), vec!["/m/b.mp3"]);
    }

    #[test]
    fn get_items_replies_with_snapshot() {
        let (mut p, _) = sequencer();
        p.add_items(PlaylistId::Video, items(&["/v/a.mkv", "/v/b.mkv"]));

        let (tx, rx) = bounded(1);
        p.handle_command(PlaylistCommand::GetItems {
            playlist: PlaylistId::Video,
            reply: tx,
        });

        let snapshot = rx.recv().unwrap();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[1].path, "/v/b.mkv");
    }

    #[test]
    fn play_song_id_replies() {
        let (mut p, recorder) = sequencer();
        p.set_current_playlist(PlaylistId::Music);
        p.add(PlaylistId::Music, MediaItem::new("/m/a.mp3"));
        p.add(
            PlaylistId::Music,
            MediaItem::new("/m/b.mp3").with_music_db_id(42),
        );

        let (tx, rx) = bounded(1);
        p.handle_command(PlaylistCommand::PlaySongId {
            song_id: 42,
            reply: Some(tx),
        });

        assert!(rx.recv().unwrap());
        assert_eq!(p.current_song(), Some(1));
        assert_eq!(*recorder.played.lock().unwrap(), vec!["/m/b.mp3"]);
    }

    #[test]
    fn play_media_prefers_video_list() {
        let (mut p, _) = sequencer();
        let played = p.play_media(PlayMediaRequest {
            items: items(&["/m/a.mp3", "/v/b.mkv", "/m/c.mp3"]),
            start: 2,
            repeat: Some(RepeatMode::All),
            ..Default::default()
        });

        assert!(played);
        assert_eq!(p.current_playlist(), PlaylistId::Video);
        assert_eq!(p.current_song(), Some(2));
        assert_eq!(p.peek_playlist(PlaylistId::Video).len(), 3);
        assert!(p.repeated(PlaylistId::Video));
    }

    #[test]
    fn play_media_single_item_plays_ad_hoc() {
        let (mut p, recorder) = sequencer();
        p.add_items(PlaylistId::Music, items(&["/m/old1.mp3", "/m/old2.mp3"]));

        assert!(p.play_media(PlayMediaRequest {
            items: items(&["/m/a.mp3"]),
            ..Default::default()
        }));

        assert_eq!(p.peek_playlist(PlaylistId::Music).len(), 1);
        assert_eq!(*recorder.played.lock().unwrap(), vec!["/m/a.mp3"]);
    }

    #[test]
    fn play_media_without_items_or_list_does_nothing() {
        let (mut p, _) = sequencer();
        assert!(!p.play_media(PlayMediaRequest::default()));
        assert!(!p.play_media(PlayMediaRequest {
            playlist: Some(PlaylistId::Picture),
            ..Default::default()
        }));
        assert_eq!(p.current_playlist(), PlaylistId::None);
    }

    #[test]
    fn play_media_without_items_plays_named_list() {
        let (mut p, recorder) = sequencer();
        p.add_items(PlaylistId::Video, items(&["/v/a.mkv", "/v/b.mkv", "/v/c.mkv"]));

        assert!(p.play_media(PlayMediaRequest {
            playlist: Some(PlaylistId::Video),
            start: 1,
            ..Default::default()
        }));

        assert_eq!(p.current_playlist(), PlaylistId::Video);
        assert_eq!(p.current_song(), Some(1));
        // the list is played as it is, not replaced
        assert_eq!(p.peek_playlist(PlaylistId::Video).len(), 3);
        assert_eq!(*recorder.played.lock().unwrap(), vec!["/v/b.mkv"]);
    }

    #[test]
    fn play_media_named_list_that_is_empty_fails() {
        let (mut p, recorder) = sequencer();

        assert!(!p.play_media(PlayMediaRequest {
            playlist: Some(PlaylistId::Music),
            ..Default::default()
        }));
        assert_eq!(p.current_playlist(), PlaylistId::Music);
        assert!(recorder.played.lock().unwrap().is_empty());
    }

    #[test]
    fn command_names() {
        assert_eq!(PlaylistCommand::Next.name(), "next");
        assert_eq!(
            PlaylistCommand::Clear {
                playlist: PlaylistId::Music
            }
            .name(),
            "clear"
        );
    }
}
