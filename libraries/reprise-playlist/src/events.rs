//! Playback events
//!
//! Events flowing into the sequencer from the host (playback started or
//! stopped, item metadata refreshed, navigation keys) and the structured
//! announcements flowing out of it.

use crate::types::{MediaItem, PlaylistId};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Announcement method for property changes
pub const PROPERTY_CHANGED: &str = "OnPropertyChanged";

/// Announcement methods for a playlist's own contents
pub const ITEM_ADDED: &str = "OnAdd";
pub const ITEM_REMOVED: &str = "OnRemove";
pub const PLAYLIST_CLEARED: &str = "OnClear";

/// Events reported by the host player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlayerEvent {
    /// The external player confirmed playback of the last attempted item
    PlaybackStarted,

    /// The external player stopped
    PlaybackStopped,

    /// Metadata of an item changed somewhere in the host
    ItemUpdated(MediaItem),
}

/// Navigation actions from the input layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NavigationAction {
    /// Skip to previous item
    PreviousItem,

    /// Skip to next item
    NextItem,

    /// Anything the sequencer does not handle
    Other,
}

/// Payload for a property-changed announcement
///
/// ```text
/// {"player": {"playerid": 0}, "property": {"repeat": "all"}}
/// ```
pub fn property_changed(
    playlist: PlaylistId,
    property: &str,
    value: serde_json::Value,
) -> serde_json::Value {
    let mut properties = serde_json::Map::new();
    properties.insert(property.to_string(), value);
    json!({
        "player": { "playerid": playlist.as_i32() },
        "property": properties,
    })
}

/// Payload announcing `item` landed at `position`
///
/// ```text
/// {"playlistid": 0, "position": 3, "item": {"file": "/m/a.mp3", "label": "a.mp3"}}
/// ```
pub fn item_added(playlist: PlaylistId, position: usize, item: &MediaItem) -> serde_json::Value {
    json!({
        "playlistid": playlist.as_i32(),
        "position": position,
        "item": {
            "file": item.redacted_path(),
            "label": item.label,
        },
    })
}

/// Payload announcing the entry at `position` is gone
pub fn item_removed(playlist: PlaylistId, position: usize) -> serde_json::Value {
    json!({ "playlistid": playlist.as_i32(), "position": position })
}

/// Payload announcing the list was emptied
pub fn playlist_cleared(playlist: PlaylistId) -> serde_json::Value {
    json!({ "playlistid": playlist.as_i32() })
}

/// User-facing strings
pub(crate) mod text {
    pub const PLAYLIST: &str = "Playlist";
    pub const NO_NEXT_ITEM: &str = "No next item to play";
    pub const NO_PREVIOUS_ITEM: &str = "No previous item to play";
    pub const PLAYBACK_FAILED: &str = "Playback failed";
    pub const ITEMS_FAILED: &str =
        "One or more items failed to play. Check the log for more information.";
    pub const SHUFFLE: &str = "Shuffle";
    pub const SHUFFLE_ALL: &str = "All";
    pub const SHUFFLE_OFF: &str = "Off";
    pub const REPEAT_OFF: &str = "Repeat: Off";
    pub const REPEAT_ONE: &str = "Repeat: One";
    pub const REPEAT_ALL: &str = "Repeat: All";
}
