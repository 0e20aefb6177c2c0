//! # a11y-lint
//!
//! Cross-file accessibility linter for web projects.
//!
//! This is the facade crate: it re-exports the core model and analyzer
//! framework, the built-in rules, and the background page indexer, and
//! adds the [`Session`] that joins them.
//!
//! ## Foreground and background
//!
//! An editor asks for issues as soon as a file changes. The foreground
//! path answers at once with the context it has: a cached page snapshot
//! if the indexer already built one, otherwise the file alone, with lower
//! confidence. The background indexer then rebuilds the affected pages
//! and their issues replace the foreground ones.
//!
//! ```rust,ignore
//! use a11y_lint::index::{BackgroundIndexer, PageRegistry};
//! use a11y_lint::{Config, DocumentModelBuilder, Session};
//!
//! let config = Config::load_from_root(root)?;
//! let builder = DocumentModelBuilder::new(producer);
//! let indexer = BackgroundIndexer::watch(PageRegistry::new(&config.index, builder.clone())?)?;
//! let mut session = Session::new(a11y_lint::rules::registry(config), builder, indexer.snapshots());
//!
//! session.analyze_foreground(path, &text)?;
//! let mut events = indexer.subscribe();
//! while let Ok(event) = events.recv().await {
//!     for file in session.apply_event(&event) {
//!         // redraw file
//!     }
//! }
//! ```

#![forbid(unsafe_code)]

pub use a11y_lint_core::*;

/// Built-in analyzers and presets.
pub mod rules {
    pub use a11y_lint_rules::*;
}

/// Background page indexer.
pub mod index {
    pub use a11y_lint_index::*;
}

mod session;

pub use session::{Analysis, FileIssues, IssueBook, Session};
