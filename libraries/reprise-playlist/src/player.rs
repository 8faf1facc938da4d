//! Playlist player - playback sequencing
//!
//! Owns the music and video playlists, the cursor into the active one,
//! per-list repeat state, and the policy deciding what plays next when
//! the external player fails to open an item.
//!
//! State is a handful of loosely coupled fields rather than one enum:
//!
//! ```text
//! idle               current_playlist == None
//! list selected      current_playlist set, current_song None or stale
//! play attempted     current_song set, play_file in flight
//! playback confirmed playback_started == true
//! ```

use crate::{
    config::PlaylistConfig,
    error::{PlaylistError, Result},
    events::{property_changed, text, NavigationAction, PlayerEvent, PROPERTY_CHANGED},
    playlist::Playlist,
    ports::PlayerContext,
    types::{MediaItem, PlaylistId, RepeatMode, StartOffset},
};
use serde_json::json;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// How many nested playlist levels `play_at` expands before giving up
const MAX_EXPAND_DEPTH: usize = 5;

/// Outcome of one `play_file` call
enum Attempt {
    Played,
    Failed {
        id: PlaylistId,
        index: usize,
        item: MediaItem,
        at: Instant,
    },
    // no list selected or nothing in it
    Unavailable,
}

/// Playback sequencer over the music and video playlists
///
/// Every method is synchronous. `play_file` on the external player is
/// called from the caller's thread and may block. Wrap the sequencer in
/// [`crate::SharedPlaylistPlayer`] to share it between threads.
pub struct PlaylistPlayer {
    music: Playlist,
    video: Playlist,
    // Returned for every id other than music/video
    empty: Playlist,

    current_playlist: PlaylistId,
    current_song: Option<usize>,
    repeat_music: RepeatMode,
    repeat_video: RepeatMode,

    played_first_file: bool,
    playback_started: bool,

    // Consecutive-failure accounting, reset on any successful play
    failed_songs: u32,
    failed_songs_start: Option<Instant>,

    config: PlaylistConfig,
    ctx: PlayerContext,
}

impl PlaylistPlayer {
    /// Create a sequencer with two empty playlists and nothing selected
    pub fn new(ctx: PlayerContext, config: PlaylistConfig) -> Self {
        Self {
            music: Playlist::with_announcer(PlaylistId::Music, ctx.announcer.clone()),
            video: Playlist::with_announcer(PlaylistId::Video, ctx.announcer.clone()),
            empty: Playlist::new(PlaylistId::None),
            current_playlist: PlaylistId::None,
            current_song: None,
            repeat_music: RepeatMode::Off,
            repeat_video: RepeatMode::Off,
            played_first_file: false,
            playback_started: false,
            failed_songs: 0,
            failed_songs_start: None,
            config,
            ctx,
        }
    }

    pub fn config(&self) -> &PlaylistConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: PlaylistConfig) {
        self.config = config;
    }

    // ===== Playlist access =====

    /// Read-only view of a playlist
    ///
    /// Ids other than music/video get the placeholder list, which is NOT
    /// cleared here: it may still hold whatever a caller of
    /// [`PlaylistPlayer::playlist_mut_or_empty`] put into it.
    pub fn peek_playlist(&self, id: PlaylistId) -> &Playlist {
        match id {
            PlaylistId::Music => &self.music,
            PlaylistId::Video => &self.video,
            _ => &self.empty,
        }
    }

    /// Mutable access to a playlist
    ///
    /// Ids other than music/video get the placeholder list, cleared on
    /// every call so it always starts out empty.
    pub fn playlist_mut_or_empty(&mut self, id: PlaylistId) -> &mut Playlist {
        match id {
            PlaylistId::Music => &mut self.music,
            PlaylistId::Video => &mut self.video,
            _ => {
                self.empty.clear();
                &mut self.empty
            }
        }
    }

    fn sequenced_mut(&mut self, id: PlaylistId) -> Option<&mut Playlist> {
        match id {
            PlaylistId::Music => Some(&mut self.music),
            PlaylistId::Video => Some(&mut self.video),
            _ => None,
        }
    }

    // ===== Cursor and selection =====

    pub fn current_playlist(&self) -> PlaylistId {
        self.current_playlist
    }

    /// Select the active playlist
    ///
    /// Changing the selection turns party mode off and forgets that the
    /// first file was played. The cursor is left alone.
    pub fn set_current_playlist(&mut self, id: PlaylistId) {
        if id == self.current_playlist {
            return;
        }

        if self.ctx.party_mode.is_enabled() {
            self.ctx.party_mode.disable();
        }

        self.current_playlist = id;
        self.played_first_file = false;
    }

    pub fn current_song(&self) -> Option<usize> {
        self.current_song
    }

    /// Move the cursor; ignored unless `None` or inside the current list
    pub fn set_current_song(&mut self, index: Option<usize>) {
        match index {
            None => self.current_song = None,
            Some(i) if i < self.peek_playlist(self.current_playlist).len() => {
                self.current_song = Some(i);
            }
            Some(_) => {}
        }
    }

    pub fn has_played_first_file(&self) -> bool {
        self.played_first_file
    }

    /// The external player confirmed the current attempt
    pub fn playback_started(&self) -> bool {
        self.playback_started
    }

    /// Failures since the last successful play
    pub fn consecutive_failures(&self) -> u32 {
        self.failed_songs
    }

    /// Drop the cursor and playback flags; contents and selection stay
    pub fn reset(&mut self) {
        self.current_song = None;
        self.played_first_file = false;
        self.playback_started = false;

        self.ctx.messenger.playlist_changed();
    }

    /// Empty one playlist
    pub fn clear_playlist(&mut self, id: PlaylistId) {
        self.ctx.messenger.clear_playlist_file();
        self.playlist_mut_or_empty(id).clear();
        self.ctx.messenger.playlist_changed();
    }

    /// Empty all playlists; cursor and selection are untouched
    pub fn clear(&mut self) {
        self.music.clear();
        self.video.clear();
        self.empty.clear();
    }

    /// Remove disc-backed items from both playlists
    ///
    /// Besides disc URLs, anything below the configured disc mount goes.
    /// Returns number of entries removed
    pub fn remove_dvd_items(&mut self) -> usize {
        let mount = self.config.disc_mount();
        self.music.remove_optical_items(mount) + self.video.remove_optical_items(mount)
    }

    // ===== Repeat =====

    /// Repeat-all is on for `id`
    pub fn repeated(&self, id: PlaylistId) -> bool {
        self.repeat(id) == RepeatMode::All
    }

    /// Repeat-one is on for `id`
    pub fn repeated_one(&self, id: PlaylistId) -> bool {
        self.repeat(id) == RepeatMode::One
    }

    pub fn repeat(&self, id: PlaylistId) -> RepeatMode {
        match id {
            PlaylistId::Music => self.repeat_music,
            PlaylistId::Video => self.repeat_video,
            _ => RepeatMode::Off,
        }
    }

    /// Set repeat mode for music or video
    ///
    /// Party mode forces music repeat off. With `notify`, a toast describes
    /// an actual change.
    pub fn set_repeat(&mut self, id: PlaylistId, mode: RepeatMode, notify: bool) {
        if !id.is_sequenced() {
            return;
        }

        let mode = if self.ctx.party_mode.is_enabled() && id == PlaylistId::Music {
            RepeatMode::Off
        } else {
            mode
        };

        if notify && self.repeat(id) != mode {
            let message = match mode {
                RepeatMode::Off => text::REPEAT_OFF,
                RepeatMode::One => text::REPEAT_ONE,
                RepeatMode::All => text::REPEAT_ALL,
            };
            self.ctx.notifier.notify(text::PLAYLIST, message);
        }

        match id {
            PlaylistId::Music => self.repeat_music = mode,
            _ => self.repeat_video = mode,
        }

        self.ctx.messenger.playlist_changed();
        self.announce_property_changed(id, "repeat", json!(mode.as_str()));
    }

    // ===== Shuffle =====

    /// Party mode always reports music as unshuffled
    pub fn is_shuffled(&self, id: PlaylistId) -> bool {
        if self.ctx.party_mode.is_enabled() && id == PlaylistId::Music {
            return false;
        }

        id.is_sequenced() && self.peek_playlist(id).is_shuffled()
    }

    /// Shuffle or unshuffle music or video, keeping the cursor on the same entry
    pub fn set_shuffle(&mut self, id: PlaylistId, shuffle: bool, notify: bool) {
        if !id.is_sequenced() {
            return;
        }
        if self.ctx.party_mode.is_enabled() && id == PlaylistId::Music {
            return;
        }

        if shuffle != self.is_shuffled(id) {
            let current_song = self.current_song;
            let Some(list) = self.sequenced_mut(id) else {
                return;
            };

            // tag of the current entry, to find it again after reordering
            let order = current_song
                .and_then(|index| list.get(index))
                .map(|entry| entry.order());

            if shuffle {
                list.shuffle(0);
            } else {
                list.unshuffle();
            }

            let relocated = order.and_then(|order| list.find_order(order));

            if notify {
                let message = format!(
                    "{}: {}",
                    text::SHUFFLE,
                    if shuffle {
                        text::SHUFFLE_ALL
                    } else {
                        text::SHUFFLE_OFF
                    }
                );
                self.ctx.notifier.notify(text::PLAYLIST, &message);
            }

            match (order, relocated) {
                (Some(_), Some(index)) => self.current_song = Some(index),
                (Some(order), None) => {
                    warn!("Current entry (order {}) lost after shuffle", order);
                }
                _ => {}
            }
        }

        self.ctx.messenger.playlist_changed();
        self.announce_property_changed(id, "shuffled", json!(self.is_shuffled(id)));
    }

    /// Re-randomize a shuffled list after items were added
    ///
    /// A list that never played is shuffled whole. New items in the list
    /// that is audible right now are mixed in from two past the cursor,
    /// so the playing item and the one after it stay put. Otherwise only
    /// the newly added tail starting at `position` is shuffled.
    pub fn reshuffle(&mut self, id: PlaylistId, position: usize) {
        let playing_this_list = id == self.current_playlist
            && ((id == PlaylistId::Music && self.ctx.player.is_playing_audio())
                || (id == PlaylistId::Video && self.ctx.player.is_playing_video()));
        let from_cursor = self.current_song.map_or(1, |song| song + 2);

        let list = self.playlist_mut_or_empty(id);
        if !list.was_played() {
            list.shuffle(0);
        } else if playing_this_list {
            list.shuffle(from_cursor);
        } else {
            list.shuffle(position);
        }
    }

    // ===== Structural mutation =====

    /// Append an item to music or video
    pub fn add(&mut self, id: PlaylistId, item: MediaItem) {
        let Some(list) = self.sequenced_mut(id) else {
            return;
        };
        let size = list.len();
        list.add(item);
        if list.is_shuffled() {
            self.reshuffle(id, size);
        }
    }

    /// Append the entries of another playlist
    pub fn add_playlist(&mut self, id: PlaylistId, playlist: &Playlist) {
        let Some(list) = self.sequenced_mut(id) else {
            return;
        };
        let size = list.len();
        list.add_playlist(playlist);
        if list.is_shuffled() {
            self.reshuffle(id, size);
        }
    }

    /// Append a collection of items; emits a playlist-changed message
    pub fn add_items(&mut self, id: PlaylistId, items: Vec<MediaItem>) {
        let Some(list) = self.sequenced_mut(id) else {
            return;
        };
        let size = list.len();
        list.add_items(items);
        if list.is_shuffled() {
            self.reshuffle(id, size);
        }

        self.ctx.messenger.playlist_changed();
    }

    /// Insert an item at `index` (`None` or out of range appends)
    pub fn insert(&mut self, id: PlaylistId, item: MediaItem, index: Option<usize>) {
        let Some(list) = self.sequenced_mut(id) else {
            return;
        };
        let size = list.len();
        list.insert(item, index);
        self.after_insert(id, size, index);
    }

    /// Insert the entries of another playlist at `index`
    pub fn insert_playlist(&mut self, id: PlaylistId, playlist: &Playlist, index: Option<usize>) {
        let Some(list) = self.sequenced_mut(id) else {
            return;
        };
        let size = list.len();
        list.insert_playlist(playlist, index);
        self.after_insert(id, size, index);
    }

    /// Insert a collection of items at `index`; emits a playlist-changed message
    pub fn insert_items(&mut self, id: PlaylistId, items: Vec<MediaItem>, index: Option<usize>) {
        let Some(list) = self.sequenced_mut(id) else {
            return;
        };
        let size = list.len();
        list.insert_items(items, index);
        self.after_insert(id, size, index);

        self.ctx.messenger.playlist_changed();
    }

    fn after_insert(&mut self, id: PlaylistId, previous_size: usize, index: Option<usize>) {
        if self.peek_playlist(id).is_shuffled() {
            self.reshuffle(id, previous_size);
        } else if id == self.current_playlist {
            if let (Some(song), Some(index)) = (self.current_song, index) {
                if song >= index {
                    self.current_song = Some(song + 1);
                }
            }
        }
    }

    /// Remove the entry at `position`, keeping the cursor on the same entry
    pub fn remove(&mut self, id: PlaylistId, position: usize) {
        let Some(list) = self.sequenced_mut(id) else {
            return;
        };
        let removed = list.remove(position).is_some();

        if removed && id == self.current_playlist {
            if let Some(song) = self.current_song {
                if song >= position {
                    self.current_song = song.checked_sub(1);
                }
            }
        }

        self.ctx.messenger.playlist_changed();
    }

    /// Exchange two entries, keeping the cursor on the same entry
    ///
    /// A playlist-changed message is sent even when nothing was swapped.
    pub fn swap(&mut self, id: PlaylistId, first: usize, second: usize) {
        let Some(list) = self.sequenced_mut(id) else {
            return;
        };

        if list.swap(first, second) && id == self.current_playlist {
            if self.current_song == Some(first) {
                self.current_song = Some(second);
            } else if self.current_song == Some(second) {
                self.current_song = Some(first);
            }
        }

        self.ctx.messenger.playlist_changed();
    }

    // ===== Navigation =====

    fn party_mode_music(&self) -> bool {
        self.ctx.party_mode.is_enabled() && self.current_playlist == PlaylistId::Music
    }

    /// Index `offset` steps from the cursor, without side effects
    ///
    /// Repeat-one ignores the offset; repeat-all wraps past the end. The
    /// result may be past the end of the list (no next item). `None` when
    /// nothing is selected, the list is empty or the result is negative.
    pub fn peek_next_song(&self, offset: i32) -> Option<usize> {
        if self.current_playlist == PlaylistId::None {
            return None;
        }
        let size = self.peek_playlist(self.current_playlist).len();
        if size == 0 {
            return None;
        }

        let song = cursor_value(self.current_song);

        // party mode queues on its own, no wrapping
        if self.party_mode_music() {
            return to_index(song + i64::from(offset));
        }

        if self.repeated_one(self.current_playlist) {
            return to_index(song);
        }

        let mut next = song + i64::from(offset);
        if next >= size as i64 && self.repeated(self.current_playlist) {
            next %= size as i64;
        }
        to_index(next)
    }

    /// Index the auto-advance should play next
    ///
    /// Repeat-one on an entry flagged unplayable would loop forever, so
    /// the session is stopped and `None` returned instead.
    pub fn next_song(&mut self) -> Option<usize> {
        if self.current_playlist == PlaylistId::None {
            return None;
        }
        let size = self.peek_playlist(self.current_playlist).len();
        if size == 0 {
            return None;
        }

        let song = cursor_value(self.current_song);

        if self.party_mode_music() {
            return to_index(song + 1);
        }

        if self.repeated_one(self.current_playlist) {
            let stuck = self.current_song.and_then(|index| {
                self.peek_playlist(self.current_playlist)
                    .get(index)
                    .filter(|entry| entry.is_unplayable())
                    .map(|entry| (index, entry.item().redacted_path()))
            });

            if let Some((index, path)) = stuck {
                error!(
                    "Playlist player: repeat one stuck on unplayable item: {}, path [{}]",
                    index, path
                );
                self.stop_session();
                return None;
            }
            return self.current_song;
        }

        let mut next = song + 1;
        if next >= size as i64 && self.repeated(self.current_playlist) {
            next = 0;
        }
        to_index(next)
    }

    /// Play the item `offset` steps ahead
    ///
    /// With nothing left to play the session ends; unless `auto_play`, the
    /// user is told there is no next item.
    pub fn play_next(&mut self, offset: i32, auto_play: bool) -> bool {
        match self.next_target(offset, auto_play) {
            Some(index) => self.play_at(index, "", false, false),
            None => false,
        }
    }

    /// Entry `play_next` would play; ends the session when there is none
    fn next_target(&mut self, offset: i32, auto_play: bool) -> Option<usize> {
        let list = self.peek_playlist(self.current_playlist);
        let (size, playable) = (list.len(), list.playable_count());

        match self.peek_next_song(offset) {
            Some(index) if index < size && playable > 0 => Some(index),
            _ => {
                if !auto_play {
                    self.ctx.notifier.notify(text::PLAYLIST, text::NO_NEXT_ITEM);
                }
                self.stop_session();
                None
            }
        }
    }

    /// Play the item before the cursor (or the current one under repeat-one)
    pub fn play_previous(&mut self) -> bool {
        match self.previous_target() {
            Some(index) => self.play_at(index, "", false, true),
            None => false,
        }
    }

    /// Entry `play_previous` would play; tells the user when there is none
    fn previous_target(&self) -> Option<usize> {
        if self.current_playlist == PlaylistId::None {
            return None;
        }

        let size = self.peek_playlist(self.current_playlist).len() as i64;
        let mut song = cursor_value(self.current_song);

        if !self.repeated_one(self.current_playlist) {
            song -= 1;
        }

        if song < 0 && self.repeated(self.current_playlist) {
            song = size - 1;
        }

        match to_index(song) {
            Some(index) if size > 0 => Some(index),
            _ => {
                self.ctx.notifier.notify(text::PLAYLIST, text::NO_PREVIOUS_ITEM);
                None
            }
        }
    }

    /// Play the current list from the top
    pub fn play(&mut self) -> bool {
        if self.current_playlist == PlaylistId::None
            || self.peek_playlist(self.current_playlist).is_empty()
        {
            return false;
        }

        self.play_at(0, "", false, false)
    }

    /// Play the first entry carrying music database id `song_id`
    ///
    /// Falls back to playing from the top when no entry matches.
    pub fn play_song_id(&mut self, song_id: i64) -> bool {
        if self.current_playlist == PlaylistId::None {
            return false;
        }

        let found = self
            .peek_playlist(self.current_playlist)
            .iter()
            .position(|entry| entry.item().music_db_id == Some(song_id));

        match found {
            Some(index) => self.play_at(index, "", false, false),
            None => self.play(),
        }
    }

    /// Play a single item outside any prepared list
    ///
    /// The item replaces the contents of the music or video list,
    /// depending on its type.
    pub fn play_item(&mut self, item: MediaItem, player: &str) -> bool {
        let id = match playlist_for_item(&item) {
            Ok(id) => id,
            Err(e) => {
                warn!("Playlist player: {}", e);
                return false;
            }
        };

        self.clear_playlist(id);
        self.reset();
        self.set_current_playlist(id);
        self.add(id, item);

        self.play_at(0, player, false, false)
    }

    /// Play entry `index` of the current list
    ///
    /// Out-of-range indices are clamped. On failure the entry is flagged
    /// unplayable and playback moves on (backwards when `is_previous`),
    /// until the retry budget in [`PlaylistConfig`] runs out or no
    /// playable entry is left.
    pub fn play_at(&mut self, index: usize, player: &str, auto_play: bool, is_previous: bool) -> bool {
        let mut attempt = self.attempt(index, player, auto_play);

        // skipped entries are retried without the caller's player hint
        loop {
            match attempt {
                Attempt::Played => return true,
                Attempt::Unavailable => return false,
                Attempt::Failed { id, index, item, at } => {
                    match self.recover(id, index, &item, at, is_previous) {
                        Some(next) => attempt = self.attempt(next, "", false),
                        None => return false,
                    }
                }
            }
        }
    }

    /// Try entry `index` once
    fn attempt(&mut self, index: usize, player: &str, auto_play: bool) -> Attempt {
        let id = self.current_playlist;
        if id == PlaylistId::None {
            return Attempt::Unavailable;
        }
        let loader = self.ctx.loader.clone();
        let Some(list) = self.sequenced_mut(id) else {
            return Attempt::Unavailable;
        };
        if list.is_empty() {
            return Attempt::Unavailable;
        }

        let mut index = index.min(list.len() - 1);

        // nested playlists may reference each other, so only expand a few levels
        for _ in 0..MAX_EXPAND_DEPTH {
            if !list.expand(index, loader.as_ref()) {
                break;
            }
            index = index.min(list.len() - 1);
        }

        self.current_song = Some(index);
        self.hydrate_video_info(id, index);

        let Some(list) = self.sequenced_mut(id) else {
            return Attempt::Unavailable;
        };
        list.set_played(true);
        let Some(item) = list.get(index).map(|entry| entry.item().clone()) else {
            return Attempt::Unavailable;
        };

        self.playback_started = false;

        let at = self.ctx.clock.now();
        if !self.ctx.player.play_file(&item, player, auto_play) {
            return Attempt::Failed {
                id,
                index,
                item,
                at,
            };
        }

        // resume bookmarks are one-shot
        if let Some(entry) = self.sequenced_mut(id).and_then(|list| list.get_mut(index)) {
            if entry.item().start_offset == StartOffset::Resume {
                entry.item_mut().start_offset = StartOffset::default();
            }
        }

        self.failed_songs = 0;
        self.failed_songs_start = None;
        self.played_first_file = true;
        Attempt::Played
    }

    fn hydrate_video_info(&mut self, id: PlaylistId, index: usize) {
        let Some(item) = self.peek_playlist(id).get(index).map(|entry| entry.item()) else {
            return;
        };
        if !item.is_video_db() || item.video_info.is_some() {
            return;
        }

        let info = self.ctx.metadata.resolve_video_info(item);
        if let Some(entry) = self.sequenced_mut(id).and_then(|list| list.get_mut(index)) {
            entry.item_mut().video_info = info;
        }
    }

    /// Account for a failed attempt and pick the entry to try next
    ///
    /// `None` once the session is over: the failure budget ran out, no
    /// playable entry is left, there is nowhere to move, or repeat-one
    /// would retry the entry that just failed.
    fn recover(
        &mut self,
        id: PlaylistId,
        index: usize,
        item: &MediaItem,
        attempt: Instant,
        is_previous: bool,
    ) -> Option<usize> {
        error!(
            "Playlist player: skipping unplayable item: {}, path [{}]",
            index,
            item.redacted_path()
        );
        if let Some(list) = self.sequenced_mut(id) {
            list.set_unplayable(index);
        }

        let window_start = *self.failed_songs_start.get_or_insert(attempt);
        self.failed_songs += 1;

        let elapsed = attempt.saturating_duration_since(window_start);
        if self.config.should_abort(self.failed_songs, elapsed) {
            info!(
                "Playlist player: {} consecutive items failed to play, aborting playback",
                self.failed_songs
            );

            self.ctx
                .notifier
                .show_error_dialog(text::PLAYBACK_FAILED, text::ITEMS_FAILED);

            self.ctx
                .messenger
                .playlist_stopped(self.current_playlist, self.current_song);
            self.reset();
            self.playlist_mut_or_empty(id).clear();
            self.current_playlist = PlaylistId::None;
            self.failed_songs = 0;
            self.failed_songs_start = None;
            return None;
        }

        if self.peek_playlist(id).playable_count() == 0 {
            debug!("Playlist player: no more playable items, aborting playback");
            self.stop_session();
            return None;
        }

        let next = if is_previous {
            self.previous_target()?
        } else {
            self.next_target(1, false)?
        };

        if next == index && self.repeated_one(id) {
            error!(
                "Playlist player: repeat one stuck on unplayable item: {}, path [{}]",
                index,
                item.redacted_path()
            );
            self.stop_session();
            return None;
        }

        Some(next)
    }

    /// Tell the host the list stopped, reset, and deselect
    fn stop_session(&mut self) {
        self.ctx
            .messenger
            .playlist_stopped(self.current_playlist, self.current_song);
        self.reset();
        self.current_playlist = PlaylistId::None;
    }

    /// At most one entry and no repeat: next/previous would do nothing
    pub fn is_single_item_non_repeat_playlist(&self) -> bool {
        self.peek_playlist(self.current_playlist).len() <= 1
            && !self.repeated_one(self.current_playlist)
            && !self.repeated(self.current_playlist)
    }

    // ===== Host integration =====

    /// Handle a navigation action; returns whether it was consumed
    pub fn on_action(&mut self, action: NavigationAction) -> bool {
        match action {
            NavigationAction::PreviousItem if !self.is_single_item_non_repeat_playlist() => {
                self.play_previous();
                true
            }
            NavigationAction::NextItem if !self.is_single_item_non_repeat_playlist() => {
                self.play_next(1, false);
                true
            }
            _ => false,
        }
    }

    /// Handle an event from the host player; returns whether it was consumed
    ///
    /// A stop is only consumed when it ends a confirmed playlist playback.
    pub fn on_event(&mut self, event: PlayerEvent) -> bool {
        match event {
            PlayerEvent::ItemUpdated(item) => {
                self.music.update_item(&item);
                self.video.update_item(&item);
                false
            }
            PlayerEvent::PlaybackStopped => {
                if self.current_playlist != PlaylistId::None && self.playback_started {
                    self.stop_session();
                    return true;
                }
                false
            }
            PlayerEvent::PlaybackStarted => {
                self.playback_started = true;
                false
            }
        }
    }

    fn announce_property_changed(
        &self,
        id: PlaylistId,
        property: &str,
        value: serde_json::Value,
    ) {
        let player = &self.ctx.player;
        if (id == PlaylistId::Video && !player.is_playing_video())
            || (id == PlaylistId::Music && !player.is_playing_audio())
        {
            return;
        }

        self.ctx
            .announcer
            .announce(PROPERTY_CHANGED, property_changed(id, property, value));
    }
}

impl std::fmt::Debug for PlaylistPlayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaylistPlayer")
            .field("current_playlist", &self.current_playlist)
            .field("current_song", &self.current_song)
            .field("music", &self.music.len())
            .field("video", &self.video.len())
            .field("played_first_file", &self.played_first_file)
            .field("playback_started", &self.playback_started)
            .field("failed_songs", &self.failed_songs)
            .finish_non_exhaustive()
    }
}

/// Pick the list an ad-hoc item belongs to
fn playlist_for_item(item: &MediaItem) -> Result<PlaylistId> {
    match (item.is_audio(), item.is_video(), item.playlist_type_hint) {
        // extensions listed as both audio and video (e.g. .strm) rely on the hint
        (true, true, Some(hint)) if hint.is_sequenced() => Ok(hint),
        (true, true, Some(hint)) => Err(PlaylistError::InvalidPlaylist(hint)),
        (true, _, _) => Ok(PlaylistId::Music),
        (false, true, _) => Ok(PlaylistId::Video),
        (false, false, _) => Err(PlaylistError::UnsupportedItemType(item.redacted_path())),
    }
}

fn cursor_value(cursor: Option<usize>) -> i64 {
    cursor.map_or(-1, |index| index as i64)
}

fn to_index(value: i64) -> Option<usize> {
    usize::try_from(value).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::MediaPlayer;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    struct AlwaysPlays {
        audio: AtomicBool,
    }

    impl MediaPlayer for AlwaysPlays {
        fn play_file(&self, item: &MediaItem, _player: &str, _auto_play: bool) -> bool {
            self.audio.store(item.is_audio(), Ordering::SeqCst);
            true
        }

        fn is_playing_audio(&self) -> bool {
            self.audio.load(Ordering::SeqCst)
        }

        fn is_playing_video(&self) -> bool {
            false
        }
    }

    fn sequencer() -> PlaylistPlayer {
        let player = Arc::new(AlwaysPlays {
            audio: AtomicBool::new(false),
        });
        PlaylistPlayer::new(PlayerContext::new(player), PlaylistConfig::default())
    }

    fn song(name: &str) -> MediaItem {
        MediaItem::new(format!("/music/{}.mp3", name))
    }

    fn with_music(names: &[&str]) -> PlaylistPlayer {
        let mut p = sequencer();
        p.set_current_playlist(PlaylistId::Music);
        for name in names {
            p.add(PlaylistId::Music, song(name));
        }
        p
    }

    #[test]
    fn starts_idle() {
        let p = sequencer();
        assert_eq!(p.current_playlist(), PlaylistId::None);
        assert_eq!(p.current_song(), None);
        assert!(!p.has_played_first_file());
        assert_eq!(p.repeat(PlaylistId::Music), RepeatMode::Off);
    }

    #[test]
    fn placeholder_list_clears_on_mutable_access() {
        let mut p = sequencer();
        p.playlist_mut_or_empty(PlaylistId::Picture).add(song("a"));
        assert_eq!(p.peek_playlist(PlaylistId::Picture).len(), 1);

        assert!(p.playlist_mut_or_empty(PlaylistId::Picture).is_empty());
        assert!(p.playlist_mut_or_empty(PlaylistId::None).is_empty());
    }

    #[test]
    fn add_ignores_unsequenced_ids() {
        let mut p = sequencer();
        p.add(PlaylistId::Picture, song("a"));
        p.add(PlaylistId::None, song("b"));
        assert!(p.peek_playlist(PlaylistId::Picture).is_empty());
        assert!(p.peek_playlist(PlaylistId::Music).is_empty());
    }

    #[test]
    fn peek_next_song_wraps_with_repeat_all() {
        let mut p = with_music(&["a", "b", "c"]);
        p.set_current_song(Some(2));

        assert_eq!(p.peek_next_song(1), Some(3));
        p.set_repeat(PlaylistId::Music, RepeatMode::All, false);
        assert_eq!(p.peek_next_song(1), Some(0));
        assert_eq!(p.peek_next_song(2), Some(1));
    }

    #[test]
    fn peek_next_song_repeat_one_ignores_offset() {
        let mut p = with_music(&["a", "b", "c"]);
        p.set_current_song(Some(1));
        p.set_repeat(PlaylistId::Music, RepeatMode::One, false);

        assert_eq!(p.peek_next_song(1), Some(1));
        assert_eq!(p.peek_next_song(5), Some(1));
    }

    #[test]
    fn peek_next_song_from_no_cursor() {
        let p = with_music(&["a", "b"]);
        assert_eq!(p.peek_next_song(1), Some(0));
        assert_eq!(p.peek_next_song(-1), None);
    }

    #[test]
    fn next_song_advances() {
        let mut p = with_music(&["a", "b"]);
        p.set_current_song(Some(0));
        assert_eq!(p.next_song(), Some(1));

        p.set_current_song(Some(1));
        assert_eq!(p.next_song(), Some(2));

        p.set_repeat(PlaylistId::Music, RepeatMode::All, false);
        assert_eq!(p.next_song(), Some(0));
    }

    #[test]
    fn set_current_song_validates_range() {
        let mut p = with_music(&["a", "b"]);
        p.set_current_song(Some(1));
        assert_eq!(p.current_song(), Some(1));

        p.set_current_song(Some(2));
        assert_eq!(p.current_song(), Some(1));

        p.set_current_song(None);
        assert_eq!(p.current_song(), None);
    }

    #[test]
    fn play_clamps_index() {
        let mut p = with_music(&["a", "b", "c"]);
        assert!(p.play_at(99, "", false, false));
        assert_eq!(p.current_song(), Some(2));
    }

    #[test]
    fn play_consumes_resume_marker() {
        let mut p = sequencer();
        p.set_current_playlist(PlaylistId::Music);
        p.add(
            PlaylistId::Music,
            song("a").with_start_offset(StartOffset::Resume),
        );

        assert!(p.play());
        let entry = p.peek_playlist(PlaylistId::Music).get(0).unwrap();
        assert_eq!(entry.item().start_offset, StartOffset::default());
        assert!(p.peek_playlist(PlaylistId::Music).was_played());
    }

    #[test]
    fn remove_before_cursor_shifts_cursor() {
        let mut p = with_music(&["a", "b", "c"]);
        p.set_current_song(Some(2));

        p.remove(PlaylistId::Music, 0);
        assert_eq!(p.current_song(), Some(1));

        p.remove(PlaylistId::Music, 1);
        assert_eq!(p.current_song(), Some(0));

        p.remove(PlaylistId::Music, 0);
        assert_eq!(p.current_song(), None);
    }

    #[test]
    fn remove_after_cursor_keeps_cursor() {
        let mut p = with_music(&["a", "b", "c"]);
        p.set_current_song(Some(0));
        p.remove(PlaylistId::Music, 2);
        assert_eq!(p.current_song(), Some(0));
    }

    #[test]
    fn insert_append_keeps_cursor() {
        let mut p = with_music(&["a", "b"]);
        p.set_current_song(Some(1));
        p.insert(PlaylistId::Music, song("x"), None);
        assert_eq!(p.current_song(), Some(1));
    }

    #[test]
    fn insert_into_other_list_keeps_cursor() {
        let mut p = with_music(&["a", "b"]);
        p.set_current_song(Some(1));
        p.add(PlaylistId::Video, MediaItem::new("/v/a.mkv"));
        p.insert(PlaylistId::Video, MediaItem::new("/v/b.mkv"), Some(0));
        assert_eq!(p.current_song(), Some(1));
    }

    #[test]
    fn shuffle_keeps_cursor_on_entry() {
        let names: Vec<String> = (0..30).map(|i| format!("t{}", i)).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let mut p = with_music(&refs);
        p.set_current_song(Some(17));

        p.set_shuffle(PlaylistId::Music, true, false);
        assert!(p.is_shuffled(PlaylistId::Music));
        let index = p.current_song().unwrap();
        assert_eq!(
            p.peek_playlist(PlaylistId::Music).get(index).unwrap().item().label,
            "t17.mp3"
        );

        p.set_shuffle(PlaylistId::Music, false, false);
        assert_eq!(p.current_song(), Some(17));
    }

    #[test]
    fn item_type_classification() {
        assert_eq!(playlist_for_item(&song("a")).unwrap(), PlaylistId::Music);
        assert_eq!(
            playlist_for_item(&MediaItem::new("/v/a.mkv")).unwrap(),
            PlaylistId::Video
        );
        let strm = MediaItem::new("/v/a.strm").with_playlist_type_hint(PlaylistId::Video);
        assert_eq!(playlist_for_item(&strm).unwrap(), PlaylistId::Video);
        // ambiguous without a hint prefers audio
        assert_eq!(
            playlist_for_item(&MediaItem::new("/v/a.strm")).unwrap(),
            PlaylistId::Music
        );
        assert!(matches!(
            playlist_for_item(&MediaItem::new("/x/readme.txt")),
            Err(PlaylistError::UnsupportedItemType(_))
        ));
    }
}
