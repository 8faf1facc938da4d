//! Thread-safe sequencer handle and command worker
//!
//! All sequencer state sits behind one mutex, so a shuffle and the cursor
//! fix-up that follows it can never interleave with another thread's
//! mutation. The worker applies queued [`PlaylistCommand`]s one at a time.

use crate::{
    command::PlaylistCommand,
    error::{PlaylistError, Result},
    events::{NavigationAction, PlayerEvent},
    player::PlaylistPlayer,
    types::{MediaItem, PlaylistId},
};
use crossbeam_channel::{bounded, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use tracing::{debug, info, warn};

const COMMAND_QUEUE_CAPACITY: usize = 32;

/// Shared handle to a [`PlaylistPlayer`]
#[derive(Clone)]
pub struct SharedPlaylistPlayer {
    inner: Arc<Mutex<PlaylistPlayer>>,
}

impl SharedPlaylistPlayer {
    pub fn new(player: PlaylistPlayer) -> Self {
        Self {
            inner: Arc::new(Mutex::new(player)),
        }
    }

    /// Lock the sequencer
    ///
    /// A panic on another thread does not make the state unusable; the
    /// lock is recovered rather than propagated.
    pub fn lock(&self) -> MutexGuard<'_, PlaylistPlayer> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` with the lock held
    pub fn with<R>(&self, f: impl FnOnce(&mut PlaylistPlayer) -> R) -> R {
        f(&mut self.lock())
    }

    pub fn on_event(&self, event: PlayerEvent) -> bool {
        self.lock().on_event(event)
    }

    pub fn on_action(&self, action: NavigationAction) -> bool {
        self.lock().on_action(action)
    }

    /// Start a worker thread applying commands to this sequencer
    pub fn spawn_worker(&self) -> Result<CommandWorker> {
        CommandWorker::spawn(self.clone())
    }
}

impl std::fmt::Debug for SharedPlaylistPlayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedPlaylistPlayer").finish_non_exhaustive()
    }
}

enum WorkerMessage {
    Command(PlaylistCommand),
    Shutdown,
}

/// Queues commands for a [`CommandWorker`]
#[derive(Clone)]
pub struct CommandSender {
    tx: Sender<WorkerMessage>,
}

impl CommandSender {
    /// Queue a command; blocks while the queue is full
    pub fn send(&self, command: PlaylistCommand) -> Result<()> {
        self.tx
            .send(WorkerMessage::Command(command))
            .map_err(|_| PlaylistError::Disconnected)
    }

    /// Play by music database id and wait for the result
    pub fn play_song_id(&self, song_id: i64) -> Result<bool> {
        let (reply, rx) = bounded(1);
        self.send(PlaylistCommand::PlaySongId {
            song_id,
            reply: Some(reply),
        })?;
        rx.recv().map_err(|_| PlaylistError::Disconnected)
    }

    /// Snapshot of a playlist's items, taken in queue order
    pub fn get_items(&self, playlist: PlaylistId) -> Result<Vec<MediaItem>> {
        let (reply, rx) = bounded(1);
        self.send(PlaylistCommand::GetItems { playlist, reply })?;
        rx.recv().map_err(|_| PlaylistError::Disconnected)
    }
}

impl std::fmt::Debug for CommandSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandSender")
            .field("queued", &self.tx.len())
            .finish()
    }
}

/// Background thread applying queued commands in arrival order
///
/// Stops on [`CommandWorker::shutdown`], on drop, or once every
/// [`CommandSender`] (including the worker's own) is gone.
pub struct CommandWorker {
    sender: CommandSender,
    handle: Option<JoinHandle<()>>,
}

impl CommandWorker {
    fn spawn(player: SharedPlaylistPlayer) -> Result<Self> {
        let (tx, rx) = bounded(COMMAND_QUEUE_CAPACITY);

        let handle = thread::Builder::new()
            .name("playlist-commands".into())
            .spawn(move || Self::run(&player, &rx))?;

        Ok(Self {
            sender: CommandSender { tx },
            handle: Some(handle),
        })
    }

    fn run(player: &SharedPlaylistPlayer, rx: &Receiver<WorkerMessage>) {
        info!("Playlist command worker started");

        for message in rx {
            match message {
                WorkerMessage::Command(command) => {
                    player.with(|p| p.handle_command(command));
                }
                WorkerMessage::Shutdown => {
                    debug!("Playlist command worker shutting down");
                    break;
                }
            }
        }

        info!("Playlist command worker stopped");
    }

    /// A new handle for queueing commands
    pub fn sender(&self) -> CommandSender {
        self.sender.clone()
    }

    /// Queue a command
    pub fn send(&self, command: PlaylistCommand) -> Result<()> {
        self.sender.send(command)
    }

    /// Stop after the commands already queued and wait for the thread
    pub fn shutdown(mut self) -> Result<()> {
        self.stop()
    }

    fn stop(&mut self) -> Result<()> {
        let Some(handle) = self.handle.take() else {
            return Ok(());
        };

        // already gone if every receiver dropped
        self.sender.tx.send(WorkerMessage::Shutdown).ok();
        handle.join().map_err(|_| PlaylistError::WorkerPanicked)
    }
}

impl Drop for CommandWorker {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            warn!("Playlist command worker: {}", e);
        }
    }
}

impl std::fmt::Debug for CommandWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandWorker")
            .field("sender", &self.sender)
            .field("running", &self.handle.is_some())
            .finish()
    }
}
