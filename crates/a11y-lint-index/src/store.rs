//! Owned arena of page contexts.

use crate::links::PageLinks;
use a11y_lint_core::DocumentModel;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

/// Stable handle of a page. A slot reused after removal gets a new generation,
/// so handles to removed pages never alias new ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PageId {
    index: u32,
    generation: u32,
}

impl std::fmt::Display for PageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "page#{}.{}", self.index, self.generation)
    }
}

/// Build state of a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageState {
    /// Not built yet, or invalidated and waiting in the queue.
    Pending,
    /// The current model reflects the files on disk.
    Ready,
    /// The last build failed; the previous model, if any, is kept.
    Failed,
}

/// Bookkeeping for a page's cached model.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheMeta {
    /// When the model was last rebuilt.
    pub rebuilt_at: Option<SystemTime>,
    /// Successful builds so far.
    pub builds: u64,
}

/// One markup file with everything it links.
#[derive(Debug, Clone)]
pub struct PageContext {
    /// The page's markup file.
    pub markup_file: PathBuf,
    /// Linked scripts, in link order.
    pub linked_behavior_files: Vec<PathBuf>,
    /// Linked stylesheets, in link order.
    pub linked_style_files: Vec<PathBuf>,
    /// Last good model.
    pub model: Option<Arc<DocumentModel>>,
    /// Cache bookkeeping.
    pub cache_meta: CacheMeta,
    /// Build state.
    pub state: PageState,
    /// Message of the last failed build.
    pub last_error: Option<String>,
}

impl PageContext {
    /// A page that has not been built.
    #[must_use]
    pub fn new(markup_file: impl Into<PathBuf>) -> Self {
        Self {
            markup_file: markup_file.into(),
            linked_behavior_files: Vec::new(),
            linked_style_files: Vec::new(),
            model: None,
            cache_meta: CacheMeta::default(),
            state: PageState::Pending,
            last_error: None,
        }
    }

    /// Markup file followed by every linked file.
    #[must_use]
    pub fn files(&self) -> Vec<PathBuf> {
        std::iter::once(self.markup_file.clone())
            .chain(self.linked_behavior_files.iter().cloned())
            .chain(self.linked_style_files.iter().cloned())
            .collect()
    }
}

#[derive(Debug, Default)]
struct Slot {
    generation: u32,
    page: Option<PageContext>,
}

/// Arena of pages with a path index and a reverse dependency index.
#[derive(Debug, Default)]
pub struct PageStore {
    slots: Vec<Slot>,
    free: Vec<usize>,
    by_markup: HashMap<PathBuf, PageId>,
    dependents: HashMap<PathBuf, BTreeSet<PageId>>,
}

impl PageStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of pages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_markup.len()
    }

    /// Returns true if there are no pages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_markup.is_empty()
    }

    /// Adds a page, or returns the existing page for the same markup file.
    pub fn insert(&mut self, page: PageContext) -> PageId {
        if let Some(id) = self.by_markup.get(&page.markup_file) {
            return *id;
        }
        let markup = page.markup_file.clone();
        let index = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index];
                slot.generation = slot.generation.wrapping_add(1);
                slot.page = Some(page);
                index
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    page: Some(page),
                });
                self.slots.len() - 1
            }
        };
        let id = PageId {
            index: u32::try_from(index).unwrap_or(u32::MAX),
            generation: self.slots[index].generation,
        };
        self.by_markup.insert(markup, id);
        id
    }

    /// Removes a page and its dependency entries.
    pub fn remove(&mut self, id: PageId) -> Option<PageContext> {
        let slot = self.slot_mut(id)?;
        let page = slot.page.take()?;
        self.free.push(id.index as usize);
        self.by_markup.remove(&page.markup_file);
        self.unlink(id, &page);
        Some(page)
    }

    /// Looks up a page.
    #[must_use]
    pub fn get(&self, id: PageId) -> Option<&PageContext> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.page.as_ref())
    }

    /// Looks up a page for mutation.
    pub fn get_mut(&mut self, id: PageId) -> Option<&mut PageContext> {
        self.slot_mut(id).and_then(|slot| slot.page.as_mut())
    }

    fn slot_mut(&mut self, id: PageId) -> Option<&mut Slot> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
    }

    /// The page whose markup file is `path`.
    #[must_use]
    pub fn id_of(&self, path: &Path) -> Option<PageId> {
        self.by_markup.get(path).copied()
    }

    /// All page ids, in markup path order.
    #[must_use]
    pub fn ids(&self) -> Vec<PageId> {
        let mut entries: Vec<(&PathBuf, PageId)> =
            self.by_markup.iter().map(|(path, id)| (path, *id)).collect();
        entries.sort();
        entries.into_iter().map(|(_, id)| id).collect()
    }

    /// Iterates over pages in arena order.
    pub fn iter(&self) -> impl Iterator<Item = &PageContext> {
        self.slots.iter().filter_map(|slot| slot.page.as_ref())
    }

    /// Replaces a page's links and updates the dependency index.
    pub fn set_links(&mut self, id: PageId, links: PageLinks) {
        let Some(page) = self.get(id).cloned() else {
            return;
        };
        self.unlink(id, &page);
        for file in links.iter() {
            self.dependents.entry(file.clone()).or_default().insert(id);
        }
        if let Some(page) = self.get_mut(id) {
            page.linked_behavior_files = links.behavior;
            page.linked_style_files = links.style;
        }
    }

    fn unlink(&mut self, id: PageId, page: &PageContext) {
        for file in page
            .linked_behavior_files
            .iter()
            .chain(page.linked_style_files.iter())
        {
            if let Some(pages) = self.dependents.get_mut(file) {
                pages.remove(&id);
                if pages.is_empty() {
                    self.dependents.remove(file);
                }
            }
        }
    }

    /// Pages that must be rebuilt when `path` changes: the page whose
    /// markup it is and every page linking it, even if it does not exist yet.
    #[must_use]
    pub fn dependents_of(&self, path: &Path) -> Vec<PageId> {
        let mut ids: BTreeSet<PageId> = self.dependents.get(path).cloned().unwrap_or_default();
        if let Some(id) = self.id_of(path) {
            ids.insert(id);
        }
        ids.into_iter().collect()
    }

    /// Returns true if some page links `path`.
    #[must_use]
    pub fn is_linked(&self, path: &Path) -> bool {
        self.dependents.contains_key(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn links(behavior: &[&str], style: &[&str]) -> PageLinks {
        PageLinks {
            behavior: behavior.iter().map(PathBuf::from).collect(),
            style: style.iter().map(PathBuf::from).collect(),
        }
    }

    #[test]
    fn test_insert_is_idempotent_per_markup() {
        let mut store = PageStore::new();
        let a = store.insert(PageContext::new("a.html"));
        assert_eq!(store.insert(PageContext::new("a.html")), a);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_reused_slot_gets_new_generation() {
        let mut store = PageStore::new();
        let a = store.insert(PageContext::new("a.html"));
        store.remove(a);
        let b = store.insert(PageContext::new("b.html"));
        assert_ne!(a, b);
        assert!(store.get(a).is_none());
        assert_eq!(store.get(b).map(|p| p.markup_file.clone()), Some(PathBuf::from("b.html")));
    }

    #[test]
    fn test_dependency_index_follows_links() {
        let mut store = PageStore::new();
        let a = store.insert(PageContext::new("a.html"));
        let b = store.insert(PageContext::new("b.html"));
        store.set_links(a, links(&["shared.js", "a.js"], &["site.css"]));
        store.set_links(b, links(&["shared.js"], &[]));

        assert_eq!(store.dependents_of(Path::new("shared.js")), vec![a, b]);
        assert_eq!(store.dependents_of(Path::new("a.html")), vec![a]);

        store.set_links(a, links(&["a.js"], &[]));
        assert_eq!(store.dependents_of(Path::new("shared.js")), vec![b]);
        assert!(!store.is_linked(Path::new("site.css")));

        store.remove(b);
        assert!(store.dependents_of(Path::new("shared.js")).is_empty());
    }
}
