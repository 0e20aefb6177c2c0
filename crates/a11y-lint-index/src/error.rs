//! Error types for the page indexer.

use a11y_lint_core::BuildError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while indexing a workspace.
#[derive(Debug, Error)]
pub enum IndexError {
    /// IO error reading a file or directory.
    #[error("IO error on {}: {source}", path.display())]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Include or exclude pattern that does not compile.
    #[error("Invalid glob pattern `{pattern}`: {source}")]
    Glob {
        /// Pattern as configured.
        pattern: String,
        /// Underlying pattern error.
        source: glob::PatternError,
    },

    /// Filesystem watcher could not be set up.
    #[error("Failed to watch {}: {source}", path.display())]
    Watch {
        /// Watched root.
        path: PathBuf,
        /// Underlying watcher error.
        source: notify::Error,
    },

    /// A page model could not be built.
    #[error("Failed to build page {}: {source}", path.display())]
    Build {
        /// Markup file of the page.
        path: PathBuf,
        /// Underlying build error.
        source: BuildError,
    },

    /// The background indexer has stopped.
    #[error("Background indexer is closed")]
    Closed,
}

/// Result alias for indexer operations.
pub type Result<T> = std::result::Result<T, IndexError>;
