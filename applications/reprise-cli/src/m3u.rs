//! M3U playlist loader
//!
//! Plain and extended M3U: one path or URL per line, `#EXTINF:<secs>,<title>`
//! labels the following entry, other `#` lines are ignored. Relative paths
//! resolve against the playlist's directory.

use reprise_playlist::{MediaItem, PlaylistError, PlaylistLoader, Result};
use std::fs;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Default, Clone, Copy)]
pub struct M3uLoader;

impl M3uLoader {
    /// Parse M3U `contents` read from `origin`
    pub fn parse(contents: &str, origin: &Path) -> Vec<MediaItem> {
        let base = origin.parent().unwrap_or_else(|| Path::new(""));
        let mut items = Vec::new();
        let mut label: Option<String> = None;

        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            if let Some(info) = line.strip_prefix("#EXTINF:") {
                label = info
                    .split_once(',')
                    .map(|(_, title)| title.trim().to_string())
                    .filter(|title| !title.is_empty());
                continue;
            }
            if line.starts_with('#') {
                continue;
            }

            let path = if line.contains("://") || Path::new(line).is_absolute() {
                line.to_string()
            } else {
                base.join(line).to_string_lossy().into_owned()
            };

            let mut item = MediaItem::new(path);
            if let Some(label) = label.take() {
                item = item.with_label(label);
            }
            items.push(item);
        }

        items
    }
}

impl PlaylistLoader for M3uLoader {
    fn load(&self, item: &MediaItem) -> Result<Vec<MediaItem>> {
        let path = Path::new(&item.path);
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase());
        if !matches!(ext.as_deref(), Some("m3u" | "m3u8")) {
            return Err(PlaylistError::load_failed(
                item.redacted_path(),
                "unsupported playlist format",
            ));
        }

        let contents = fs::read_to_string(path)?;
        let items = Self::parse(&contents, path);
        debug!("Loaded {} entries from {}", items.len(), item.redacted_path());
        Ok(items)
    }
}
