//! Core types for playlist sequencing

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Extensions treated as audio
const AUDIO_EXTENSIONS: &[&str] = &[
    "mp3", "flac", "ogg", "oga", "opus", "m4a", "aac", "wav", "wma", "ape", "aiff", "aif", "wv",
    "mka", "dsf", "cue",
];

/// Extensions treated as video
const VIDEO_EXTENSIONS: &[&str] = &[
    "mkv", "mp4", "m4v", "avi", "mov", "webm", "ts", "m2ts", "wmv", "mpg", "mpeg", "ogv", "vob",
    "iso",
];

/// Playlist file extensions (listed under both audio and video, so they are ambiguous)
const PLAYLIST_EXTENSIONS: &[&str] = &["m3u", "m3u8", "pls", "strm", "xspf", "wpl", "asx"];

/// URL schemes that live on optical media
const OPTICAL_SCHEMES: &[&str] = &["cdda", "dvd", "iso9660", "udf", "bluray"];

/// Playlist identifier
///
/// Only `Music` and `Video` are backed by real lists; every other id
/// resolves to an always-empty placeholder list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PlaylistId {
    /// No playlist selected
    #[default]
    None,

    /// Music playlist
    Music,

    /// Video playlist
    Video,

    /// Picture slideshow (not sequenced by this engine)
    Picture,
}

impl PlaylistId {
    /// Numeric id used in announcements and remote commands
    pub fn as_i32(self) -> i32 {
        match self {
            PlaylistId::None => -1,
            PlaylistId::Music => 0,
            PlaylistId::Video => 1,
            PlaylistId::Picture => 2,
        }
    }

    /// Parse a numeric id; unknown values map to `None`
    pub fn from_i32(value: i32) -> Self {
        match value {
            0 => PlaylistId::Music,
            1 => PlaylistId::Video,
            2 => PlaylistId::Picture,
            _ => PlaylistId::None,
        }
    }

    /// Whether this id names one of the two real lists
    pub fn is_sequenced(self) -> bool {
        matches!(self, PlaylistId::Music | PlaylistId::Video)
    }
}

impl fmt::Display for PlaylistId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlaylistId::None => "none",
            PlaylistId::Music => "music",
            PlaylistId::Video => "video",
            PlaylistId::Picture => "picture",
        };
        f.write_str(name)
    }
}

/// Repeat mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RepeatMode {
    /// Stop when the list ends
    #[default]
    Off,

    /// Loop current item only
    One,

    /// Loop entire list
    All,
}

impl RepeatMode {
    /// Value used in property-changed announcements
    pub fn as_str(self) -> &'static str {
        match self {
            RepeatMode::Off => "off",
            RepeatMode::One => "one",
            RepeatMode::All => "all",
        }
    }

    /// Parse the numeric form used by remote commands (0 = off, 1 = one, 2 = all)
    pub fn from_i32(value: i32) -> Self {
        match value {
            1 => RepeatMode::One,
            2 => RepeatMode::All,
            _ => RepeatMode::Off,
        }
    }
}

/// Where playback of an item should begin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StartOffset {
    /// Explicit position from start of item
    Position(Duration),

    /// Resume from the last stored bookmark (consumed on first successful play)
    Resume,
}

impl Default for StartOffset {
    fn default() -> Self {
        StartOffset::Position(Duration::ZERO)
    }
}

/// Video metadata hydrated from the media database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct VideoInfo {
    /// Database id of the video
    pub db_id: i64,

    /// Title
    pub title: String,

    /// Runtime (if known)
    pub runtime: Option<Duration>,
}

/// A playable media item
///
/// The engine only reads the classification flags, database ids, start
/// offset and path; everything else is carried for the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaItem {
    /// File path or URL
    pub path: String,

    /// Display label
    pub label: String,

    /// Item holds audio
    pub audio: bool,

    /// Item holds video
    pub video: bool,

    /// Preferred list when the item is both audio and video
    pub playlist_type_hint: Option<PlaylistId>,

    /// Music database id (for play-by-song-id)
    pub music_db_id: Option<i64>,

    /// Video metadata, `None` until hydrated for database-backed items
    pub video_info: Option<VideoInfo>,

    /// Where playback should begin
    pub start_offset: StartOffset,
}

impl MediaItem {
    /// Create an item classified by its file extension
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        let ext = extension_of(&path);
        let is_playlist = ext
            .as_deref()
            .is_some_and(|e| PLAYLIST_EXTENSIONS.contains(&e));
        let audio = is_playlist || ext.as_deref().is_some_and(|e| AUDIO_EXTENSIONS.contains(&e));
        let video = is_playlist
            || path.starts_with("videodb://")
            || ext.as_deref().is_some_and(|e| VIDEO_EXTENSIONS.contains(&e));
        let label = Path::new(strip_query(&path))
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.clone());

        Self {
            path,
            label,
            audio,
            video,
            playlist_type_hint: None,
            music_db_id: None,
            video_info: None,
            start_offset: StartOffset::default(),
        }
    }

    /// Override the audio/video classification
    pub fn with_kind(mut self, audio: bool, video: bool) -> Self {
        self.audio = audio;
        self.video = video;
        self
    }

    /// Set the display label
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Set the music database id
    pub fn with_music_db_id(mut self, id: i64) -> Self {
        self.music_db_id = Some(id);
        self
    }

    /// Set the list hint for ambiguous items
    pub fn with_playlist_type_hint(mut self, hint: PlaylistId) -> Self {
        self.playlist_type_hint = Some(hint);
        self
    }

    /// Set the start offset
    pub fn with_start_offset(mut self, offset: StartOffset) -> Self {
        self.start_offset = offset;
        self
    }

    pub fn is_audio(&self) -> bool {
        self.audio
    }

    pub fn is_video(&self) -> bool {
        self.video
    }

    /// Item refers to another playlist that can be expanded in place
    pub fn is_playlist(&self) -> bool {
        extension_of(&self.path).is_some_and(|e| PLAYLIST_EXTENSIONS.contains(&e.as_str()))
    }

    /// Item is a reference into the video database
    pub fn is_video_db(&self) -> bool {
        self.path.starts_with("videodb://")
    }

    /// Item lives on an audio CD, DVD or Blu-ray
    pub fn is_optical_disc(&self) -> bool {
        scheme_of(&self.path).is_some_and(|s| OPTICAL_SCHEMES.contains(&s.as_str()))
    }

    /// Disc item by scheme, or a plain path below the host's disc mount
    pub fn is_on_disc(&self, disc_mount: Option<&Path>) -> bool {
        if self.is_optical_disc() {
            return true;
        }

        disc_mount
            .filter(|mount| !mount.as_os_str().is_empty())
            .is_some_and(|mount| Path::new(&self.path).starts_with(mount))
    }

    /// Whether `other` refers to the same file
    pub fn is_same_path(&self, other: &MediaItem) -> bool {
        self.path == other.path
    }

    /// Path with any embedded credentials masked, for logging
    pub fn redacted_path(&self) -> String {
        redact(&self.path)
    }
}

/// Mask `user:password@` in URLs
pub fn redact(path: &str) -> String {
    match Url::parse(path) {
        Ok(mut url) if !url.username().is_empty() || url.password().is_some() => {
            if url.set_username("USERNAME").is_err() || url.set_password(Some("PASSWORD")).is_err()
            {
                return path.to_string();
            }
            url.to_string()
        }
        _ => path.to_string(),
    }
}

fn strip_query(path: &str) -> &str {
    path.split(['?', '|']).next().unwrap_or(path)
}

fn extension_of(path: &str) -> Option<String> {
    Path::new(strip_query(path))
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
}

fn scheme_of(path: &str) -> Option<String> {
    let (scheme, _) = path.split_once("://")?;
    Some(scheme.to_ascii_lowercase())
}
