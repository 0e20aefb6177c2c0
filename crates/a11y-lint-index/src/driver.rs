//! Background task driving a [`PageRegistry`].

use crate::error::{IndexError, Result};
use crate::events::{FileChange, RegistryEvent};
use crate::registry::PageRegistry;
use crate::snapshot::SnapshotReader;
use crate::watcher::FsWatcher;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info};

const COMMAND_CAPACITY: usize = 64;
const CHANGE_CAPACITY: usize = 1024;

/// Requests accepted by the background task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Rebuild the page of a markup file, or the pages linking a file.
    Rebuild(PathBuf),
    /// Scan the whole workspace again.
    Rediscover,
    /// Stop after the current page.
    Shutdown,
}

/// Shared flag checked between page builds.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    /// A flag that is not set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the flag.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Returns true once the flag is set.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Handle on a registry running as a tokio task.
///
/// The task scans the workspace once, then builds one page at a time,
/// yielding between pages and applying queued changes and commands before
/// each build. Dropping the handle stops the task.
#[derive(Debug)]
pub struct BackgroundIndexer {
    commands: mpsc::Sender<Command>,
    changes: mpsc::Sender<FileChange>,
    events: broadcast::Sender<RegistryEvent>,
    snapshots: SnapshotReader,
    cancel: CancellationFlag,
    task: Option<JoinHandle<PageRegistry>>,
    _watcher: Option<FsWatcher>,
}

impl BackgroundIndexer {
    /// Spawns the task without a filesystem watcher; changes arrive
    /// through [`notify_change`](Self::notify_change).
    ///
    /// Must be called inside a tokio runtime.
    #[must_use]
    pub fn spawn(registry: PageRegistry) -> Self {
        let (changes, change_rx) = mpsc::channel(CHANGE_CAPACITY);
        Self::start(registry, changes, change_rx, None)
    }

    /// Spawns the task with a recursive watcher on the workspace root.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::Watch`] if the watcher cannot be set up.
    pub fn watch(registry: PageRegistry) -> Result<Self> {
        let (changes, change_rx) = mpsc::channel(CHANGE_CAPACITY);
        let watcher = FsWatcher::start(registry.filter().clone(), changes.clone())?;
        Ok(Self::start(registry, changes, change_rx, Some(watcher)))
    }

    fn start(
        registry: PageRegistry,
        changes: mpsc::Sender<FileChange>,
        change_rx: mpsc::Receiver<FileChange>,
        watcher: Option<FsWatcher>,
    ) -> Self {
        let (commands, command_rx) = mpsc::channel(COMMAND_CAPACITY);
        let cancel = CancellationFlag::new();
        let events = registry.event_sender();
        let snapshots = registry.snapshots();
        let task = tokio::spawn(run(registry, command_rx, change_rx, cancel.clone()));
        Self {
            commands,
            changes,
            events,
            snapshots,
            cancel,
            task: Some(task),
            _watcher: watcher,
        }
    }

    /// Subscribes to registry notifications.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<RegistryEvent> {
        self.events.subscribe()
    }

    /// A read handle on the snapshot cache.
    #[must_use]
    pub fn snapshots(&self) -> SnapshotReader {
        self.snapshots.clone()
    }

    /// The flag the task checks between pages.
    #[must_use]
    pub fn cancellation(&self) -> CancellationFlag {
        self.cancel.clone()
    }

    /// Stops the task after the page being built, if any.
    pub fn cancel(&self) {
        self.cancel.cancel();
        // Wakes an idle task.
        let _ = self.commands.try_send(Command::Shutdown);
    }

    /// Queues a rebuild of the page of `path`, or the pages linking it.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::Closed`] if the task has stopped.
    pub async fn request_rebuild(&self, path: impl Into<PathBuf>) -> Result<()> {
        self.send(Command::Rebuild(path.into())).await
    }

    /// Queues a full workspace scan.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::Closed`] if the task has stopped.
    pub async fn rediscover(&self) -> Result<()> {
        self.send(Command::Rediscover).await
    }

    /// Reports a file change, e.g. from an editor's save hook.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::Closed`] if the task has stopped.
    pub async fn notify_change(&self, change: FileChange) -> Result<()> {
        self.changes.send(change).await.map_err(|_| IndexError::Closed)
    }

    async fn send(&self, command: Command) -> Result<()> {
        self.commands.send(command).await.map_err(|_| IndexError::Closed)
    }

    /// Stops the task and returns the registry.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::Closed`] if the task panicked or was aborted.
    pub async fn shutdown(mut self) -> Result<PageRegistry> {
        let _ = self.commands.send(Command::Shutdown).await;
        let task = self.task.take().ok_or(IndexError::Closed)?;
        task.await.map_err(|_| IndexError::Closed)
    }
}

impl Drop for BackgroundIndexer {
    fn drop(&mut self) {
        if self.task.is_some() {
            let _ = self.commands.try_send(Command::Shutdown);
        }
    }
}

async fn run(
    mut registry: PageRegistry,
    mut commands: mpsc::Receiver<Command>,
    mut changes: mpsc::Receiver<FileChange>,
    cancel: CancellationFlag,
) -> PageRegistry {
    info!("Background indexer started for {}", registry.root().display());
    registry.discover();
    loop {
        while let Ok(command) = commands.try_recv() {
            if !handle_command(&mut registry, command) {
                return stopped(registry);
            }
        }
        while let Ok(change) = changes.try_recv() {
            registry.apply_change(&change);
        }
        if cancel.is_cancelled() {
            return stopped(registry);
        }
        if registry.rebuild_next().is_some() {
            tokio::task::yield_now().await;
            continue;
        }

        tokio::select! {
            command = commands.recv() => {
                if !command.is_some_and(|c| handle_command(&mut registry, c)) {
                    return stopped(registry);
                }
            }
            Some(change) = changes.recv() => {
                registry.apply_change(&change);
            }
        }
    }
}

/// Applies a command. Returns false on shutdown.
fn handle_command(registry: &mut PageRegistry, command: Command) -> bool {
    debug!("Indexer command: {:?}", command);
    match command {
        Command::Rebuild(path) => {
            registry.request_rebuild(&path);
        }
        Command::Rediscover => {
            registry.discover();
        }
        Command::Shutdown => return false,
    }
    true
}

fn stopped(registry: PageRegistry) -> PageRegistry {
    let stats = registry.stats();
    info!(
        "Background indexer stopped: {} builds, {} failures, {} pending",
        stats.builds, stats.failures, stats.pending
    );
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancellation_flag_is_shared() {
        let flag = CancellationFlag::new();
        let other = flag.clone();
        assert!(!other.is_cancelled());
        flag.cancel();
        assert!(other.is_cancelled());
    }
}
