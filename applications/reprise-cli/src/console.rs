//! Console collaborators
//!
//! The CLI has no audio pipeline: "playing" a local file means it exists
//! and is readable, remote URLs are accepted as-is. Feedback goes to the
//! terminal and the log.

use reprise_playlist::{Announcer, MediaItem, MediaPlayer, Notifier, PlaylistId, PlaylistMessenger};
use std::fs::File;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tracing::{debug, info, warn};

/// Player that checks items can be opened and prints them
#[derive(Debug, Default)]
pub struct ConsolePlayer {
    audio: AtomicBool,
    video: AtomicBool,
    played: AtomicUsize,
    failed: AtomicUsize,
}

impl ConsolePlayer {
    pub fn played(&self) -> usize {
        self.played.load(Ordering::SeqCst)
    }

    pub fn failed(&self) -> usize {
        self.failed.load(Ordering::SeqCst)
    }

    fn can_open(path: &str) -> bool {
        if let Some((scheme, _)) = path.split_once("://") {
            return matches!(scheme, "http" | "https");
        }
        File::open(path).is_ok()
    }
}

impl MediaPlayer for ConsolePlayer {
    fn play_file(&self, item: &MediaItem, player: &str, _auto_play: bool) -> bool {
        if !Self::can_open(&item.path) {
            self.failed.fetch_add(1, Ordering::SeqCst);
            return false;
        }

        let n = self.played.fetch_add(1, Ordering::SeqCst) + 1;
        if player.is_empty() {
            println!("{:>4}  {}", n, item.label);
        } else {
            println!("{:>4}  {}  [{}]", n, item.label, player);
        }
        info!("Playing {}", item.redacted_path());

        self.audio.store(item.is_audio(), Ordering::SeqCst);
        self.video.store(item.is_video(), Ordering::SeqCst);
        true
    }

    fn is_playing_audio(&self) -> bool {
        self.audio.load(Ordering::SeqCst)
    }

    fn is_playing_video(&self) -> bool {
        self.video.load(Ordering::SeqCst)
    }
}

/// Toasts and dialogs on stderr
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, title: &str, message: &str) {
        eprintln!("{}: {}", title, message);
    }

    fn show_error_dialog(&self, title: &str, message: &str) {
        warn!("{}: {}", title, message);
        eprintln!("error: {}: {}", title, message);
    }
}

/// Playlist messages go to the debug log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogMessenger;

impl PlaylistMessenger for LogMessenger {
    fn playlist_changed(&self) {
        debug!("Playlist changed");
    }

    fn playlist_stopped(&self, playlist: PlaylistId, index: Option<usize>) {
        info!("Playlist {} stopped at {:?}", playlist, index);
    }

    fn clear_playlist_file(&self) {}
}

/// Announcements printed as JSON lines on stdout
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonAnnouncer;

impl Announcer for JsonAnnouncer {
    fn announce(&self, method: &str, data: serde_json::Value) {
        println!(
            "{}",
            serde_json::json!({ "method": method, "params": { "data": data } })
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn plays_existing_files_only() {
        let dir = tempfile::tempdir().unwrap();
        let present = dir.path().join("a.mp3");
        fs::write(&present, b"ID3").unwrap();

        let player = ConsolePlayer::default();
        let ok = MediaItem::new(present.to_string_lossy().into_owned());
        let missing = MediaItem::new(dir.path().join("b.mp3").to_string_lossy().into_owned());

        assert!(player.play_file(&ok, "", false));
        assert!(!player.play_file(&missing, "", false));
        assert_eq!(player.played(), 1);
        assert_eq!(player.failed(), 1);
        assert!(player.is_playing_audio());
        assert!(!player.is_playing_video());
    }

    #[test]
    fn accepts_http_rejects_other_schemes() {
        assert!(ConsolePlayer::can_open("https://radio.example/live.mp3"));
        assert!(!ConsolePlayer::can_open("smb://nas/music/a.mp3"));
    }
}
