//! Reprise CLI - command-line host for the playlist engine
//!
//! Wires the engine to console collaborators: a player that accepts files
//! it can open, an M3U loader for nested playlists, and terminal feedback.

pub mod config;
pub mod console;
pub mod error;
pub mod m3u;
pub mod session;

pub use config::CliConfig;
pub use error::{CliError, Result};
