//! Read-only snapshots of built page models.

use a11y_lint_core::{AnalysisScope, DocumentModel};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::SystemTime;

/// A cached page model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    /// The model. Shared, never mutated.
    pub model: Arc<DocumentModel>,
    /// When the model was built.
    pub built_at: SystemTime,
    /// Context available when it was built.
    pub scope: AnalysisScope,
}

#[derive(Debug, Default)]
struct Snapshots {
    entries: HashMap<PathBuf, CacheEntry>,
    pages_by_file: HashMap<PathBuf, BTreeSet<PathBuf>>,
}

impl Snapshots {
    fn forget_files(&mut self, markup: &Path) {
        let Some(entry) = self.entries.get(markup) else {
            return;
        };
        for file in entry.model.files() {
            if let Some(pages) = self.pages_by_file.get_mut(&file) {
                pages.remove(markup);
                if pages.is_empty() {
                    self.pages_by_file.remove(&file);
                }
            }
        }
    }
}

/// Cloneable read handle over the cache.
///
/// Entries are swapped whole, so a reader sees either the previous model
/// of a page or the new one.
#[derive(Debug, Clone, Default)]
pub struct SnapshotReader {
    inner: Arc<RwLock<Snapshots>>,
}

impl SnapshotReader {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read<T>(&self, f: impl FnOnce(&Snapshots) -> T) -> T {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    fn write<T>(&self, f: impl FnOnce(&mut Snapshots) -> T) -> T {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    /// The cache entry of the page whose markup file is `markup`.
    #[must_use]
    pub fn get(&self, markup: &Path) -> Option<CacheEntry> {
        self.read(|s| s.entries.get(markup).cloned())
    }

    /// The model of the page whose markup file is `markup`.
    #[must_use]
    pub fn model(&self, markup: &Path) -> Option<Arc<DocumentModel>> {
        self.read(|s| s.entries.get(markup).map(|e| Arc::clone(&e.model)))
    }

    /// Markup files of the cached pages that include `file`.
    #[must_use]
    pub fn pages_containing(&self, file: &Path) -> Vec<PathBuf> {
        self.read(|s| {
            s.pages_by_file
                .get(file)
                .map(|pages| pages.iter().cloned().collect())
                .unwrap_or_default()
        })
    }

    /// A cached page that includes `file`: its own page for markup,
    /// otherwise the first page linking it.
    #[must_use]
    pub fn entry_for_file(&self, file: &Path) -> Option<CacheEntry> {
        self.read(|s| {
            s.entries.get(file).cloned().or_else(|| {
                s.pages_by_file
                    .get(file)
                    .and_then(|pages| pages.iter().next())
                    .and_then(|markup| s.entries.get(markup).cloned())
            })
        })
    }

    /// Markup files of every cached page.
    #[must_use]
    pub fn markup_files(&self) -> Vec<PathBuf> {
        self.read(|s| {
            let mut files: Vec<PathBuf> = s.entries.keys().cloned().collect();
            files.sort();
            files
        })
    }

    /// Number of cached pages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read(|s| s.entries.len())
    }

    /// Returns true if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn publish(&self, entry: CacheEntry) {
        let markup = entry.model.source_files.markup.clone();
        self.write(|s| {
            s.forget_files(&markup);
            for file in entry.model.files() {
                s.pages_by_file
                    .entry(file)
                    .or_default()
                    .insert(markup.clone());
            }
            s.entries.insert(markup, entry);
        });
    }

    pub(crate) fn retract(&self, markup: &Path) -> Option<CacheEntry> {
        self.write(|s| {
            s.forget_files(markup);
            s.entries.remove(markup)
        })
    }
}
