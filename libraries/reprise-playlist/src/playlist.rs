//! Ordered playable list
//!
//! Holds playback order and playability bookkeeping for one playlist.
//!
//! Every entry carries an `order` tag recording its position in the
//! unshuffled sequence. Shuffling moves entries physically but never
//! touches the tags, which is what lets [`Playlist::unshuffle`] restore the
//! original order and [`Playlist::find_order`] relocate a specific entry
//! after a shuffle. Order tags always form a permutation of `0..len`.
//!
//! The music and video lists announce their own additions, removals and
//! clears to remote clients; the placeholder and standalone lists stay
//! silent.

use crate::events::{
    item_added, item_removed, playlist_cleared, ITEM_ADDED, ITEM_REMOVED, PLAYLIST_CLEARED,
};
use crate::ports::{Announcer, PlaylistLoader, Silent};
use crate::shuffle::{shuffle_tail, shuffle_tail_with};
use crate::types::{MediaItem, PlaylistId};
use rand::Rng;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// One slot in a playlist
#[derive(Debug, Clone, PartialEq)]
pub struct PlaylistEntry {
    item: MediaItem,
    order: usize,
    unplayable: bool,
}

impl PlaylistEntry {
    pub fn item(&self) -> &MediaItem {
        &self.item
    }

    pub fn item_mut(&mut self) -> &mut MediaItem {
        &mut self.item
    }

    /// Position of this entry in unshuffled order
    pub fn order(&self) -> usize {
        self.order
    }

    /// Playback of this entry failed
    pub fn is_unplayable(&self) -> bool {
        self.unplayable
    }
}

/// Ordered, mutable list of playable entries
#[derive(Clone)]
pub struct Playlist {
    id: PlaylistId,
    entries: Vec<PlaylistEntry>,
    playable: usize,
    shuffled: bool,
    was_played: bool,
    announcer: Arc<dyn Announcer>,
}

impl Playlist {
    /// Create new empty playlist that announces nothing
    pub fn new(id: PlaylistId) -> Self {
        Self::with_announcer(id, Arc::new(Silent))
    }

    /// Create new empty playlist reporting content changes to `announcer`
    ///
    /// Only music and video lists announce.
    pub fn with_announcer(id: PlaylistId, announcer: Arc<dyn Announcer>) -> Self {
        Self {
            id,
            entries: Vec::new(),
            playable: 0,
            shuffled: false,
            was_played: false,
            announcer,
        }
    }

    pub fn id(&self) -> PlaylistId {
        self.id
    }

    // ===== Adding =====

    /// Append an item
    pub fn add(&mut self, item: MediaItem) {
        self.add_entry(item, false, None, None);
    }

    /// Append every entry of another playlist, numbered after the current entries
    ///
    /// Entries already flagged unplayable in `other` keep the flag.
    pub fn add_playlist(&mut self, other: &Playlist) {
        for entry in &other.entries {
            self.add_entry(entry.item.clone(), entry.unplayable, None, None);
        }
    }

    /// Append a collection of items
    pub fn add_items<I>(&mut self, items: I)
    where
        I: IntoIterator<Item = MediaItem>,
    {
        for item in items {
            self.add(item);
        }
    }

    /// Insert an item at `position`; `None` or out of range appends
    pub fn insert(&mut self, item: MediaItem, position: Option<usize>) {
        match self.insert_position(position) {
            Some(pos) => self.add_entry(item, false, Some(pos), Some(pos)),
            None => self.add(item),
        }
    }

    /// Insert every entry of another playlist starting at `position`
    pub fn insert_playlist(&mut self, other: &Playlist, position: Option<usize>) {
        let Some(start) = self.insert_position(position) else {
            self.add_playlist(other);
            return;
        };

        for (i, entry) in other.entries.iter().enumerate() {
            let pos = start + i;
            self.add_entry(entry.item.clone(), entry.unplayable, Some(pos), Some(pos));
        }
    }

    /// Insert a collection of items starting at `position`
    pub fn insert_items<I>(&mut self, items: I, position: Option<usize>)
    where
        I: IntoIterator<Item = MediaItem>,
    {
        let Some(start) = self.insert_position(position) else {
            self.add_items(items);
            return;
        };

        for (i, item) in items.into_iter().enumerate() {
            let pos = start + i;
            self.add_entry(item, false, Some(pos), Some(pos));
        }
    }

    fn insert_position(&self, position: Option<usize>) -> Option<usize> {
        position.filter(|&p| p < self.entries.len())
    }

    /// Place an entry physically at `position` with order tag `order`
    ///
    /// Appends when `position` is `None`/past the end; a missing or
    /// out-of-range `order` becomes the current size.
    fn add_entry(
        &mut self,
        item: MediaItem,
        unplayable: bool,
        position: Option<usize>,
        order: Option<usize>,
    ) {
        let old_size = self.entries.len();
        let position = position.filter(|&p| p < old_size).unwrap_or(old_size);
        let order = order.filter(|&o| o < old_size).unwrap_or(old_size);

        if !unplayable {
            self.playable += 1;
        }

        let entry = PlaylistEntry {
            item,
            order,
            unplayable,
        };

        if position == old_size {
            self.entries.push(entry);
        } else {
            self.entries.insert(position, entry);
        }

        // open a slot in the order sequence for the new tag
        if order < old_size {
            self.increment_order(position, order);
        }

        if self.id.is_sequenced() {
            let data = item_added(self.id, position, &self.entries[position].item);
            self.announcer.announce(ITEM_ADDED, data);
        }
    }

    fn increment_order(&mut self, inserted_at: usize, order: usize) {
        for (i, entry) in self.entries.iter_mut().enumerate() {
            if i != inserted_at && entry.order >= order {
                entry.order += 1;
            }
        }
    }

    fn decrement_order(&mut self, order: usize) {
        for entry in &mut self.entries {
            if entry.order > order {
                entry.order -= 1;
            }
        }
    }

    // ===== Removing =====

    /// Remove the entry at `position`
    ///
    /// Returns the removed item if successful
    pub fn remove(&mut self, position: usize) -> Option<MediaItem> {
        if position >= self.entries.len() {
            return None;
        }

        let entry = self.entries.remove(position);
        if !entry.unplayable {
            self.playable -= 1;
        }
        self.decrement_order(entry.order);

        if self.id.is_sequenced() {
            self.announcer.announce(ITEM_REMOVED, item_removed(self.id, position));
        }

        Some(entry.item)
    }

    /// Remove every entry whose path equals `path`
    ///
    /// Returns number of entries removed
    pub fn remove_path(&mut self, path: &str) -> usize {
        let mut removed = 0;
        while let Some(position) = self.entries.iter().position(|e| e.item.path == path) {
            self.remove(position);
            removed += 1;
        }
        removed
    }

    /// Remove entries that live on optical media or below `disc_mount`
    ///
    /// Returns number of entries removed
    pub fn remove_optical_items(&mut self, disc_mount: Option<&Path>) -> usize {
        let paths: Vec<String> = self
            .entries
            .iter()
            .filter(|e| e.item.is_on_disc(disc_mount))
            .map(|e| e.item.path.clone())
            .collect();

        paths.iter().map(|path| self.remove_path(path)).sum()
    }

    /// Empty the list and reset all bookkeeping
    ///
    /// Clearing an already empty list is not announced.
    pub fn clear(&mut self) {
        let announce = !self.entries.is_empty() && self.id.is_sequenced();

        self.entries.clear();
        self.playable = 0;
        self.shuffled = false;
        self.was_played = false;

        if announce {
            self.announcer.announce(PLAYLIST_CLEARED, playlist_cleared(self.id));
        }
    }

    // ===== Reordering =====

    /// Exchange two entries
    ///
    /// Returns false if either position is out of range. On an unshuffled
    /// list the order tags travel with the swap, so a later unshuffle keeps
    /// the manual reordering.
    pub fn swap(&mut self, first: usize, second: usize) -> bool {
        let len = self.entries.len();
        if first >= len || second >= len {
            return false;
        }

        if !self.shuffled {
            let first_order = self.entries[first].order;
            self.entries[first].order = self.entries[second].order;
            self.entries[second].order = first_order;
        }

        self.entries.swap(first, second);
        true
    }

    /// Physical position of the entry tagged with `order`
    pub fn find_order(&self, order: usize) -> Option<usize> {
        self.entries.iter().position(|e| e.order == order)
    }

    /// Randomly permute entries at or after `from`
    pub fn shuffle(&mut self, from: usize) {
        if self.entries.is_empty() {
            // nothing to shuffle, remember the flag for later additions
            self.shuffled = true;
            return;
        }

        debug!("Shuffling playlist {} from position {}", self.id, from);
        if shuffle_tail(&mut self.entries, from) {
            self.shuffled = true;
        }
    }

    /// [`Playlist::shuffle`] with a caller-provided RNG
    pub fn shuffle_with<R: Rng + ?Sized>(&mut self, from: usize, rng: &mut R) {
        if self.entries.is_empty() {
            self.shuffled = true;
            return;
        }

        if shuffle_tail_with(&mut self.entries, from, rng) {
            self.shuffled = true;
        }
    }

    /// Restore ascending order-tag order
    pub fn unshuffle(&mut self) {
        self.entries.sort_by_key(|e| e.order);
        self.shuffled = false;
    }

    pub fn is_shuffled(&self) -> bool {
        self.shuffled
    }

    // ===== Playability =====

    /// Flag the entry at `index` as unplayable
    ///
    /// The playable count drops only on the playable -> unplayable transition.
    pub fn set_unplayable(&mut self, index: usize) {
        let Some(entry) = self.entries.get_mut(index) else {
            warn!("Attempt to set unplayable index {}", index);
            return;
        };

        if !entry.unplayable {
            entry.unplayable = true;
            self.playable -= 1;
        }
    }

    /// Mark the list as played
    // NOTE: argument intentionally ignored, matches historical behavior (see DESIGN.md, "set_played")
    pub fn set_played(&mut self, _played: bool) {
        self.was_played = true;
    }

    /// Any entry of this list has been started since the last clear
    pub fn was_played(&self) -> bool {
        self.was_played
    }

    /// Number of entries not flagged unplayable
    pub fn playable_count(&self) -> usize {
        self.playable
    }

    // ===== Nested playlists =====

    /// Replace a playlist-file entry with the entries it references
    ///
    /// Entries pointing back at the expanded file are dropped. Returns
    /// whether an expansion happened; callers bound repeated calls since
    /// playlists may reference each other in a cycle.
    pub fn expand(&mut self, position: usize, loader: &dyn PlaylistLoader) -> bool {
        let Some(entry) = self.entries.get(position) else {
            return false;
        };
        if !entry.item.is_playlist() {
            return false;
        }

        let path = entry.item.path.clone();
        let loaded = match loader.load(&entry.item) {
            Ok(items) => items,
            Err(e) => {
                warn!("Unable to expand playlist at {}: {}", position, e);
                return false;
            }
        };

        let items: Vec<MediaItem> = loaded
            .into_iter()
            .filter(|item| !item.path.eq_ignore_ascii_case(&path))
            .collect();
        if items.is_empty() {
            return false;
        }

        debug!(
            "Expanding playlist at {} into {} entries",
            position,
            items.len()
        );
        self.remove(position);
        self.insert_items(items, Some(position));
        true
    }

    // ===== Access =====

    /// Refresh the metadata of the first entry with the same path
    ///
    /// The stored path is kept as-is.
    pub fn update_item(&mut self, item: &MediaItem) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.item.is_same_path(item)) {
            let path = std::mem::take(&mut entry.item.path);
            entry.item = item.clone();
            entry.item.path = path;
        }
    }

    pub fn get(&self, index: usize) -> Option<&PlaylistEntry> {
        self.entries.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut PlaylistEntry> {
        self.entries.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlaylistEntry> {
        self.entries.iter()
    }

    /// Snapshot of all items in physical order
    pub fn items(&self) -> Vec<MediaItem> {
        self.entries.iter().map(|e| e.item.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for Playlist {
    fn default() -> Self {
        Self::new(PlaylistId::None)
    }
}

impl fmt::Debug for Playlist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Playlist")
            .field("id", &self.id)
            .field("entries", &self.entries)
            .field("playable", &self.playable)
            .field("shuffled", &self.shuffled)
            .field("was_played", &self.was_played)
            .finish_non_exhaustive()
    }
}
