//! Background page indexer for a11y-lint.
//!
//! A workspace is a set of pages: each markup file plus the scripts and
//! stylesheets it links. [`PageRegistry`] discovers pages once, builds
//! their models progressively, and rebuilds only the pages a file change
//! touches. Built models are published to a [`SnapshotReader`] that any
//! number of readers may hold without blocking the builder.
//!
//! # Example
//!
//! ```ignore
//! use a11y_lint_index::{BackgroundIndexer, PageRegistry, RegistryEvent};
//!
//! let registry = PageRegistry::new(&config.index, builder)?;
//! let indexer = BackgroundIndexer::watch(registry)?;
//! let mut events = indexer.subscribe();
//! while let Ok(event) = events.recv().await {
//!     if let RegistryEvent::PageBuilt { page, .. } = event {
//!         let model = indexer.snapshots().model(&page);
//!         // analyze the model...
//!     }
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod discovery;
mod driver;
mod error;
mod events;
mod links;
mod queue;
mod registry;
mod snapshot;
mod store;
mod watcher;

pub use discovery::{Discovered, FileDiscovery, FileFilter, FileKind};
pub use driver::{BackgroundIndexer, CancellationFlag, Command};
pub use error::{IndexError, Result};
pub use events::{FileChange, RegistryEvent};
pub use links::{extract_links, resolve_reference, PageLinks};
pub use queue::RebuildQueue;
pub use registry::{PageRegistry, RegistryStats};
pub use snapshot::{CacheEntry, SnapshotReader};
pub use store::{CacheMeta, PageContext, PageId, PageState, PageStore};
pub use watcher::FsWatcher;
