/// CLI configuration
use crate::error::{CliError, Result};
use reprise_playlist::{PlaylistConfig, RepeatMode};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG_FILE: &str = "reprise.toml";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CliConfig {
    /// Failure policy (`retries`, `timeout_secs`)
    #[serde(default)]
    pub playlist: PlaylistConfig,

    #[serde(default = "default_playback")]
    pub playback: PlaybackSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlaybackSettings {
    #[serde(default)]
    pub shuffle: bool,

    #[serde(default)]
    pub repeat: RepeatMode,

    /// Preferred player backend ("" for default)
    #[serde(default)]
    pub player: String,

    /// Stop after this many items have played
    #[serde(default = "default_limit")]
    pub limit: usize,
}

impl CliConfig {
    /// Load configuration from file and environment
    ///
    /// `path` must exist when given; otherwise `reprise.toml` in the working
    /// directory is used if present. Environment variables override both,
    /// e.g. `REPRISE_PLAYLIST__RETRIES=5` or `REPRISE_PLAYBACK__REPEAT=all`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path.to_path_buf()));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        // Sections split on `__`, keys contain `_`
        settings = settings.add_source(
            config::Environment::with_prefix("REPRISE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = settings.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.playlist.retries < -1 {
            return Err(CliError::Config(format!(
                "playlist.retries must be -1 (unlimited) or at least 0, got {}",
                self.playlist.retries
            )));
        }

        if self.playback.limit == 0 {
            return Err(CliError::Config(
                "playback.limit must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

// Default values
fn default_playback() -> PlaybackSettings {
    PlaybackSettings {
        shuffle: false,
        repeat: RepeatMode::Off,
        player: String::new(),
        limit: default_limit(),
    }
}

fn default_limit() -> usize {
    1000
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        default_playback()
    }
}
