//! Error types for playlist sequencing

use crate::types::PlaylistId;
use thiserror::Error;

/// Playlist errors
///
/// The sequencer's public operations report success as `bool`; these
/// errors cover the typed seams underneath (item classification, playlist
/// loading, the command worker).
#[derive(Debug, Error)]
pub enum PlaylistError {
    /// Item is neither audio nor video and carries no usable type hint
    #[error("Item type must be audio or video: {0}")]
    UnsupportedItemType(String),

    /// Operation needs the music or video list
    #[error("Invalid playlist: {0:?}")]
    InvalidPlaylist(PlaylistId),

    /// A nested playlist could not be loaded
    #[error("Failed to load playlist {path}: {reason}")]
    LoadFailed { path: String, reason: String },

    /// Command worker is gone
    #[error("Command channel disconnected")]
    Disconnected,

    /// Command worker thread panicked
    #[error("Command worker panicked")]
    WorkerPanicked,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PlaylistError {
    /// Create a load failure for `path`
    pub fn load_failed(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::LoadFailed {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for playlist operations
pub type Result<T> = std::result::Result<T, PlaylistError>;
