//! Filesystem watcher feeding the background indexer.

use crate::discovery::FileFilter;
use crate::error::{IndexError, Result};
use crate::events::FileChange;
use notify::event::{ModifyKind, RenameMode};
use notify::{Config as NotifyConfig, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Watches the workspace root recursively and forwards indexed file changes.
///
/// Dropping the watcher stops it.
pub struct FsWatcher {
    _watcher: RecommendedWatcher,
    root: PathBuf,
}

impl std::fmt::Debug for FsWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FsWatcher").field("root", &self.root).finish_non_exhaustive()
    }
}

impl FsWatcher {
    /// Starts watching the filter's root. Changes to paths the filter
    /// rejects are dropped before they reach `sender`.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::Watch`] if the platform watcher cannot be set up.
    pub fn start(filter: FileFilter, sender: mpsc::Sender<FileChange>) -> Result<Self> {
        let root = filter.root().to_path_buf();
        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    for change in changes_from_event(&event) {
                        if filter.accepts(change.path()) && sender.blocking_send(change).is_err() {
                            return;
                        }
                    }
                }
                Err(e) => warn!("Watch error: {}", e),
            },
            NotifyConfig::default(),
        )
        .map_err(|source| IndexError::Watch {
            path: root.clone(),
            source,
        })?;
        watcher
            .watch(&root, RecursiveMode::Recursive)
            .map_err(|source| IndexError::Watch {
                path: root.clone(),
                source,
            })?;
        info!("Watching {}", root.display());
        Ok(Self {
            _watcher: watcher,
            root,
        })
    }

    /// The watched root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Translates a notify event into file changes.
///
/// A rename with both ends known is a removal plus a creation. Renames
/// reported one end at a time are resolved by checking whether the path
/// still exists.
pub(crate) fn changes_from_event(event: &Event) -> Vec<FileChange> {
    let by_existence = |path: &PathBuf| {
        if path.exists() {
            FileChange::Created(path.clone())
        } else {
            FileChange::Removed(path.clone())
        }
    };
    match event.kind {
        EventKind::Create(_) => event.paths.iter().cloned().map(FileChange::Created).collect(),
        EventKind::Remove(_) => event.paths.iter().cloned().map(FileChange::Removed).collect(),
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => match event.paths.as_slice() {
            [from, to] => vec![
                FileChange::Removed(from.clone()),
                FileChange::Created(to.clone()),
            ],
            paths => paths.iter().map(by_existence).collect(),
        },
        EventKind::Modify(ModifyKind::Name(_)) => event.paths.iter().map(by_existence).collect(),
        EventKind::Modify(_) => event.paths.iter().cloned().map(FileChange::Modified).collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{AccessKind, CreateKind, DataChange, RemoveKind};

    fn event(kind: EventKind, paths: &[&Path]) -> Event {
        paths
            .iter()
            .fold(Event::new(kind), |e, p| e.add_path(p.to_path_buf()))
    }

    #[test]
    fn test_basic_kinds() {
        let path = Path::new("/w/index.html");
        assert_eq!(
            changes_from_event(&event(EventKind::Create(CreateKind::File), &[path])),
            vec![FileChange::Created(path.into())]
        );
        assert_eq!(
            changes_from_event(&event(EventKind::Remove(RemoveKind::File), &[path])),
            vec![FileChange::Removed(path.into())]
        );
        assert_eq!(
            changes_from_event(&event(
                EventKind::Modify(ModifyKind::Data(DataChange::Content)),
                &[path]
            )),
            vec![FileChange::Modified(path.into())]
        );
        assert!(changes_from_event(&event(EventKind::Access(AccessKind::Any), &[path])).is_empty());
    }

    #[test]
    fn test_rename_pairs() {
        let from = Path::new("/w/old.js");
        let to = Path::new("/w/new.js");
        assert_eq!(
            changes_from_event(&event(
                EventKind::Modify(ModifyKind::Name(RenameMode::Both)),
                &[from, to]
            )),
            vec![FileChange::Removed(from.into()), FileChange::Created(to.into())]
        );
    }

    #[test]
    fn test_half_rename_checks_existence() {
        let dir = tempfile::tempdir().unwrap();
        let present = dir.path().join("here.css");
        std::fs::write(&present, "").unwrap();
        let gone = dir.path().join("gone.css");
        let changes = changes_from_event(&event(
            EventKind::Modify(ModifyKind::Name(RenameMode::Any)),
            &[&present, &gone],
        ));
        assert_eq!(
            changes,
            vec![FileChange::Created(present), FileChange::Removed(gone)]
        );
    }
}
