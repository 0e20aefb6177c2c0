//! Change inputs and notifications of the page registry.

use a11y_lint_core::AnalysisScope;
use std::path::{Path, PathBuf};

/// A filesystem change reported to the registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FileChange {
    /// A file appeared.
    Created(PathBuf),
    /// A file's content changed.
    Modified(PathBuf),
    /// A file was deleted.
    Removed(PathBuf),
}

impl FileChange {
    /// The changed path.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Created(path) | Self::Modified(path) | Self::Removed(path) => path,
        }
    }
}

/// Notification broadcast to registry subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryEvent {
    /// A page model was built or rebuilt and is in the snapshot cache.
    PageBuilt {
        /// Markup file of the page.
        page: PathBuf,
        /// Every file that contributed to the model.
        files: Vec<PathBuf>,
        /// Context the model was built with.
        scope: AnalysisScope,
    },
    /// A page failed to build; its previous model, if any, is still cached.
    PageFailed {
        /// Markup file of the page.
        page: PathBuf,
        /// Failure message.
        error: String,
    },
    /// A page's markup file was deleted.
    PageRemoved {
        /// Markup file of the page.
        page: PathBuf,
        /// Files the page's last model covered.
        files: Vec<PathBuf>,
    },
    /// A behavior or style file linked by no page changed.
    FileChanged {
        /// The file.
        path: PathBuf,
    },
}

impl RegistryEvent {
    /// Markup file of the page the event is about, if any.
    #[must_use]
    pub fn page(&self) -> Option<&Path> {
        match self {
            Self::PageBuilt { page, .. }
            | Self::PageFailed { page, .. }
            | Self::PageRemoved { page, .. } => Some(page),
            Self::FileChanged { .. } => None,
        }
    }
}
