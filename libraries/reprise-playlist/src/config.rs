//! Failure policy configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// How many consecutive failures the sequencer tolerates before giving up,
/// and where the host mounts optical discs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaylistConfig {
    /// Abort after this many consecutive failed items (default: 100, negative disables)
    pub retries: i32,

    /// Abort once failures have kept going for this long (default: 20, 0 disables)
    pub timeout_secs: u32,

    /// Mount point of the disc drive; entries below it count as disc items
    pub disc_mount: Option<PathBuf>,
}

impl PlaylistConfig {
    /// Count-based abort is active
    pub fn retry_limit(&self) -> Option<u32> {
        u32::try_from(self.retries).ok()
    }

    /// Time-based abort is active
    pub fn failure_window(&self) -> Option<Duration> {
        (self.timeout_secs != 0).then(|| Duration::from_secs(u64::from(self.timeout_secs)))
    }

    /// Whether `failures` consecutive failures spread over `elapsed` should end the session
    pub fn should_abort(&self, failures: u32, elapsed: Duration) -> bool {
        let by_count = self.retry_limit().is_some_and(|limit| failures >= limit);
        let by_time = self.failure_window().is_some_and(|window| elapsed >= window);
        by_count || by_time
    }

    /// Configured disc mount, if any
    pub fn disc_mount(&self) -> Option<&Path> {
        self.disc_mount.as_deref()
    }
}

impl Default for PlaylistConfig {
    fn default() -> Self {
        Self {
            retries: 100,
            timeout_secs: 20,
            disc_mount: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = PlaylistConfig::default();
        assert_eq!(config.retries, 100);
        assert_eq!(config.timeout_secs, 20);
        assert_eq!(config.retry_limit(), Some(100));
        assert_eq!(config.failure_window(), Some(Duration::from_secs(20)));
    }

    #[test]
    fn abort_by_count() {
        let config = PlaylistConfig {
            retries: 2,
            timeout_secs: 0,
            ..Default::default()
        };
        assert!(!config.should_abort(1, Duration::from_secs(3600)));
        assert!(config.should_abort(2, Duration::ZERO));
    }

    #[test]
    fn negative_retries_disable_count() {
        let config = PlaylistConfig {
            retries: -1,
            timeout_secs: 5,
            ..Default::default()
        };
        assert_eq!(config.retry_limit(), None);
        assert!(!config.should_abort(10_000, Duration::from_secs(4)));
        assert!(config.should_abort(1, Duration::from_secs(5)));
    }

    #[test]
    fn zero_timeout_disables_time() {
        let config = PlaylistConfig {
            retries: -1,
            timeout_secs: 0,
            ..Default::default()
        };
        assert!(!config.should_abort(u32::MAX, Duration::from_secs(u64::MAX / 2)));
    }

    #[test]
    fn zero_retries_aborts_on_first_failure() {
        let config = PlaylistConfig {
            retries: 0,
            timeout_secs: 0,
            ..Default::default()
        };
        assert!(config.should_abort(1, Duration::ZERO));
    }

    #[test]
    fn deserializes_with_defaults() {
        let config: PlaylistConfig = serde_json::from_str(r#"{"retries": 3}"#).unwrap();
        assert_eq!(config.retries, 3);
        assert_eq!(config.timeout_secs, 20);
        assert_eq!(config.disc_mount(), None);
    }

    #[test]
    fn deserializes_disc_mount() {
        let config: PlaylistConfig =
            serde_json::from_str(r#"{"disc_mount": "/media/cdrom"}"#).unwrap();
        assert_eq!(config.disc_mount(), Some(Path::new("/media/cdrom")));
        assert_eq!(config.retries, 100);
    }
}
