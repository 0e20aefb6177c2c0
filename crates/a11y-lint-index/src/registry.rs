//! The page registry: discovery, progressive builds and incremental rebuilds.

use crate::discovery::{FileDiscovery, FileFilter, FileKind};
use crate::error::{IndexError, Result};
use crate::events::{FileChange, RegistryEvent};
use crate::links::{self, extract_links};
use crate::queue::RebuildQueue;
use crate::snapshot::{CacheEntry, SnapshotReader};
use crate::store::{PageContext, PageId, PageState, PageStore};
use a11y_lint_core::{
    AnalysisScope, BuildError, DocumentModel, DocumentModelBuilder, IndexConfig, PageSources,
    SourceText,
};
use serde::Serialize;
use std::collections::BTreeSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;
use tokio::sync::broadcast;
use tracing::{debug, info, trace, warn};

/// Capacity of the notification channel.
const EVENT_CAPACITY: usize = 256;

/// Counters describing registry activity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RegistryStats {
    /// Pages known.
    pub pages: usize,
    /// Behavior and style files linked by no page.
    pub standalone_files: usize,
    /// Pages waiting to be built.
    pub pending: usize,
    /// Successful page builds.
    pub builds: u64,
    /// Failed page builds.
    pub failures: u64,
    /// Full workspace scans.
    pub full_discoveries: u64,
    /// Single-path discoveries triggered by created or removed files.
    pub targeted_discoveries: u64,
    /// Rebuild requests received.
    pub rebuild_requests: u64,
    /// Rebuild requests absorbed by an already pending rebuild.
    pub coalesced_requests: u64,
}

/// Owns every page of a workspace and keeps their models current.
///
/// Nothing here blocks on anything but file reads: pages are built one at
/// a time by [`rebuild_next`](Self::rebuild_next), and readers only ever
/// see immutable snapshots through [`SnapshotReader`].
pub struct PageRegistry {
    discovery: FileDiscovery,
    builder: DocumentModelBuilder,
    store: PageStore,
    queue: RebuildQueue,
    assets: BTreeSet<PathBuf>,
    scope: AnalysisScope,
    snapshots: SnapshotReader,
    events: broadcast::Sender<RegistryEvent>,
    builds: u64,
    failures: u64,
    full_discoveries: u64,
    targeted_discoveries: u64,
}

impl std::fmt::Debug for PageRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageRegistry")
            .field("root", &self.root())
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

impl PageRegistry {
    /// Creates an empty registry for the configured root.
    ///
    /// Nothing is scanned until [`discover`](Self::discover) is called.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::Io`] if the root does not exist and
    /// [`IndexError::Glob`] for invalid include or exclude patterns.
    pub fn new(config: &IndexConfig, builder: DocumentModelBuilder) -> Result<Self> {
        let root = std::fs::canonicalize(&config.root).map_err(|source| IndexError::Io {
            path: config.root.clone(),
            source,
        })?;
        let discovery = FileDiscovery::new(root, config)?;
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Ok(Self {
            discovery,
            builder,
            store: PageStore::new(),
            queue: RebuildQueue::new(),
            assets: BTreeSet::new(),
            scope: AnalysisScope::Project,
            snapshots: SnapshotReader::new(),
            events,
            builds: 0,
            failures: 0,
            full_discoveries: 0,
            targeted_discoveries: 0,
        })
    }

    /// The canonical workspace root.
    #[must_use]
    pub fn root(&self) -> &Path {
        self.discovery.root()
    }

    /// Include and exclude filter of the workspace.
    #[must_use]
    pub fn filter(&self) -> &FileFilter {
        self.discovery.filter()
    }

    /// Subscribes to notifications.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<RegistryEvent> {
        self.events.subscribe()
    }

    pub(crate) fn event_sender(&self) -> broadcast::Sender<RegistryEvent> {
        self.events.clone()
    }

    /// A read handle on the snapshot cache.
    #[must_use]
    pub fn snapshots(&self) -> SnapshotReader {
        self.snapshots.clone()
    }

    /// Scope of the models being built.
    #[must_use]
    pub fn scope(&self) -> AnalysisScope {
        self.scope
    }

    /// The page whose markup file is `markup`.
    #[must_use]
    pub fn page(&self, markup: &Path) -> Option<&PageContext> {
        self.store.id_of(markup).and_then(|id| self.store.get(id))
    }

    /// Every page.
    pub fn pages(&self) -> impl Iterator<Item = &PageContext> {
        self.store.iter()
    }

    /// Behavior and style files that no page links.
    #[must_use]
    pub fn standalone_files(&self) -> Vec<PathBuf> {
        self.assets
            .iter()
            .filter(|path| !self.store.is_linked(path))
            .cloned()
            .collect()
    }

    /// Number of pages waiting to be built.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Activity counters.
    #[must_use]
    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            pages: self.store.len(),
            standalone_files: self.standalone_files().len(),
            pending: self.queue.len(),
            builds: self.builds,
            failures: self.failures,
            full_discoveries: self.full_discoveries,
            targeted_discoveries: self.targeted_discoveries,
            rebuild_requests: self.queue.requested(),
            coalesced_requests: self.queue.coalesced(),
        }
    }

    /// Scans the whole workspace and queues every page.
    ///
    /// Runs at startup and on explicit request only; file changes go
    /// through [`apply_change`](Self::apply_change). Pages whose markup
    /// disappeared are removed. Returns the number of pages found.
    pub fn discover(&mut self) -> usize {
        self.full_discoveries += 1;
        let found = self.discovery.discover();
        self.scope = found.scope();

        for id in self.store.ids() {
            let gone = self
                .store
                .get(id)
                .is_some_and(|page| !found.markup.contains(&page.markup_file));
            if gone {
                self.remove_page(id);
            }
        }
        for markup in &found.markup {
            let id = self.store.insert(PageContext::new(markup.clone()));
            self.invalidate(&[id]);
        }
        self.assets = found.behavior.union(&found.style).cloned().collect();
        found.markup.len()
    }

    /// Builds the next queued page. Returns its markup file, or `None` if
    /// the queue is empty.
    pub fn rebuild_next(&mut self) -> Option<PathBuf> {
        while let Some(id) = self.queue.start_next() {
            let Some(markup) = self.store.get(id).map(|p| p.markup_file.clone()) else {
                self.queue.finish(id);
                continue;
            };
            self.build_page(id, &markup);
            self.queue.finish(id);
            return Some(markup);
        }
        None
    }

    /// Builds every queued page. Returns the number built.
    pub fn rebuild_all(&mut self) -> usize {
        let mut built = 0;
        while self.rebuild_next().is_some() {
            built += 1;
        }
        built
    }

    /// Queues the page of a markup file, or every page that links `path`.
    /// Returns the number of pages newly queued.
    pub fn request_rebuild(&mut self, path: &Path) -> usize {
        let Some(path) = self.workspace_path(path) else {
            return 0;
        };
        let dependents = self.store.dependents_of(&path);
        self.invalidate(&dependents)
    }

    /// Applies one filesystem change incrementally.
    ///
    /// Modified files invalidate the pages that depend on them. Created and
    /// removed files are discovered individually: a new markup file becomes
    /// a page, a deleted one takes its page with it, and other files update
    /// their dependents. Returns the number of pages newly queued.
    pub fn apply_change(&mut self, change: &FileChange) -> usize {
        let Some(path) = self.workspace_path(change.path()) else {
            debug!("Ignoring change outside the workspace: {}", change.path().display());
            return 0;
        };
        match change {
            FileChange::Modified(_) => self.on_modified(&path),
            FileChange::Created(_) => self.on_created(&path),
            FileChange::Removed(_) => self.on_removed(&path),
        }
    }

    fn on_modified(&mut self, path: &Path) -> usize {
        let dependents = self.store.dependents_of(path);
        if !dependents.is_empty() {
            return self.invalidate(&dependents);
        }
        if !self.assets.contains(path) {
            // A file we have not seen: its creation was missed.
            return self.on_created(path);
        }
        self.emit(RegistryEvent::FileChanged {
            path: path.to_path_buf(),
        });
        0
    }

    fn on_created(&mut self, path: &Path) -> usize {
        self.targeted_discoveries += 1;
        let Some(kind) = self.discovery.classify(path) else {
            return 0;
        };
        match kind {
            FileKind::Markup => {
                debug!("New page: {}", path.display());
                let id = self.store.insert(PageContext::new(path));
                self.invalidate(&[id])
            }
            FileKind::Behavior | FileKind::Style => {
                self.assets.insert(path.to_path_buf());
                let dependents = self.store.dependents_of(path);
                if dependents.is_empty() {
                    self.emit(RegistryEvent::FileChanged {
                        path: path.to_path_buf(),
                    });
                    return 0;
                }
                self.invalidate(&dependents)
            }
        }
    }

    fn on_removed(&mut self, path: &Path) -> usize {
        self.targeted_discoveries += 1;
        if let Some(id) = self.store.id_of(path) {
            self.remove_page(id);
            return 0;
        }
        let was_standalone = self.assets.remove(path) && !self.store.is_linked(path);
        let dependents = self.store.dependents_of(path);
        if was_standalone {
            self.emit(RegistryEvent::FileChanged {
                path: path.to_path_buf(),
            });
        }
        self.invalidate(&dependents)
    }

    fn invalidate(&mut self, ids: &[PageId]) -> usize {
        let mut queued = 0;
        for id in ids {
            if let Some(page) = self.store.get_mut(*id) {
                page.state = PageState::Pending;
            }
            if self.queue.request(*id) {
                queued += 1;
            }
        }
        queued
    }

    fn remove_page(&mut self, id: PageId) {
        self.queue.remove(id);
        let Some(page) = self.store.remove(id) else {
            return;
        };
        let files = self
            .snapshots
            .retract(&page.markup_file)
            .map_or_else(|| page.files(), |entry| entry.model.files());
        info!("Removed page {}", page.markup_file.display());
        self.emit(RegistryEvent::PageRemoved {
            page: page.markup_file,
            files,
        });
    }

    fn build_page(&mut self, id: PageId, markup: &Path) {
        match self.try_build(id, markup) {
            Ok(model) => {
                let model = Arc::new(model);
                let built_at = SystemTime::now();
                let files = model.files();
                let scope = model.scope;
                if let Some(page) = self.store.get_mut(id) {
                    page.model = Some(Arc::clone(&model));
                    page.cache_meta.rebuilt_at = Some(built_at);
                    page.cache_meta.builds += 1;
                    page.state = PageState::Ready;
                    page.last_error = None;
                }
                self.snapshots.publish(CacheEntry {
                    model,
                    built_at,
                    scope,
                });
                self.builds += 1;
                self.emit(RegistryEvent::PageBuilt {
                    page: markup.to_path_buf(),
                    files,
                    scope,
                });
            }
            Err(e) => {
                match &e {
                    IndexError::Io { .. } => warn!("{}", e),
                    _ => info!("{}", e),
                }
                self.failures += 1;
                let error = e.to_string();
                if let Some(page) = self.store.get_mut(id) {
                    page.state = PageState::Failed;
                    page.last_error = Some(error.clone());
                }
                self.emit(RegistryEvent::PageFailed {
                    page: markup.to_path_buf(),
                    error,
                });
            }
        }
    }

    fn try_build(&mut self, id: PageId, markup: &Path) -> Result<DocumentModel> {
        let build_error = |source: BuildError| IndexError::Build {
            path: markup.to_path_buf(),
            source,
        };
        let source = read_source(markup)?;
        let tree = match source.text.as_deref() {
            Some(text) => self.builder.parse_markup(markup, text).map_err(build_error)?,
            None => {
                return Err(build_error(BuildError::SourceUnavailable {
                    path: markup.to_path_buf(),
                }))
            }
        };

        let links = extract_links(&tree, markup, self.root());
        let mut sources = PageSources::new(source);
        for path in &links.behavior {
            sources = sources.behavior(read_source(path)?);
        }
        for path in &links.style {
            sources = sources.style(read_source(path)?);
        }
        self.store.set_links(id, links);

        self.builder
            .build_with_tree(tree, &sources, self.scope)
            .map_err(build_error)
    }

    /// Maps a reported path onto the canonical root, or `None` if it lies outside.
    fn workspace_path(&self, path: &Path) -> Option<PathBuf> {
        let absolute = if path.is_relative() {
            self.root().join(path)
        } else {
            path.to_path_buf()
        };
        let absolute = links::normalize(&absolute)?;
        if absolute.starts_with(self.root()) {
            return Some(absolute);
        }
        // The root may have been reached through a symlink.
        let parent = std::fs::canonicalize(absolute.parent()?).ok()?;
        let candidate = parent.join(absolute.file_name()?);
        candidate.starts_with(self.root()).then_some(candidate)
    }

    fn emit(&self, event: RegistryEvent) {
        if self.events.send(event).is_err() {
            trace!("No registry subscribers");
        }
    }
}

/// Reads a page file. A missing file is not an error.
fn read_source(path: &Path) -> Result<SourceText> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(SourceText::present(path, text)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(SourceText::missing(path)),
        Err(source) => Err(IndexError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use a11y_lint_core::fixture::FixtureProducer;
    use std::fs;

    fn registry(root: &Path) -> PageRegistry {
        let config = IndexConfig {
            root: root.to_path_buf(),
            ..IndexConfig::default()
        };
        PageRegistry::new(&config, DocumentModelBuilder::new(Arc::new(FixtureProducer))).unwrap()
    }

    #[test]
    fn test_missing_root() {
        let config = IndexConfig {
            root: PathBuf::from("/definitely/not/here"),
            ..IndexConfig::default()
        };
        let result = PageRegistry::new(&config, DocumentModelBuilder::new(Arc::new(FixtureProducer)));
        assert!(matches!(result, Err(IndexError::Io { .. })));
    }

    #[test]
    fn test_discover_and_build() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("index.html"), "main\n  script src=app.js\n  span id=go\n").unwrap();
        fs::write(dir.path().join("app.js"), "on click #go\n").unwrap();
        fs::write(dir.path().join("orphan.css"), ".x { color: red }\n").unwrap();

        let mut registry = registry(dir.path());
        assert_eq!(registry.discover(), 1);
        assert_eq!(registry.rebuild_all(), 1);

        let index = registry.root().join("index.html");
        let page = registry.page(&index).unwrap();
        assert_eq!(page.state, PageState::Ready);
        assert_eq!(page.linked_behavior_files, vec![registry.root().join("app.js")]);
        let model = registry.snapshots().model(&index).unwrap();
        assert_eq!(model.behavior.len(), 1);
        assert!(model.bindings_are_valid());
        assert!(model.behavior[0].binding.resolved.is_some());
        assert_eq!(model.scope, AnalysisScope::Project);
        assert_eq!(registry.standalone_files(), vec![registry.root().join("orphan.css")]);
    }

    #[test]
    fn test_failed_build_keeps_previous_model() {
        let dir = tempfile::tempdir().unwrap();
        let index = dir.path().join("index.html");
        fs::write(&index, "main\n").unwrap();
        let mut registry = registry(dir.path());
        registry.discover();
        registry.rebuild_all();

        fs::write(&index, "<main>\n").unwrap();
        let mut events = registry.subscribe();
        assert_eq!(registry.apply_change(&FileChange::Modified(index.clone())), 1);
        registry.rebuild_next();

        let index = registry.root().join("index.html");
        let page = registry.page(&index).unwrap();
        assert_eq!(page.state, PageState::Failed);
        assert!(page.last_error.is_some());
        assert!(registry.snapshots().model(&index).is_some());
        assert!(matches!(events.try_recv(), Ok(RegistryEvent::PageFailed { .. })));
        assert_eq!(registry.stats().failures, 1);
    }

    #[test]
    fn test_new_and_deleted_markup() {
        let dir = tempfile::tempdir().unwrap();
        let mut registry = registry(dir.path());
        registry.discover();
        let page = dir.path().join("about.html");
        fs::write(&page, "main\n").unwrap();
        assert_eq!(registry.apply_change(&FileChange::Created(page.clone())), 1);
        registry.rebuild_all();
        assert_eq!(registry.snapshots().len(), 1);

        let mut events = registry.subscribe();
        fs::remove_file(&page).unwrap();
        registry.apply_change(&FileChange::Removed(page));
        assert!(registry.snapshots().is_empty());
        assert!(matches!(events.try_recv(), Ok(RegistryEvent::PageRemoved { .. })));
        let stats = registry.stats();
        assert_eq!((stats.pages, stats.full_discoveries, stats.targeted_discoveries), (0, 1, 2));
    }

    #[test]
    fn test_standalone_script_change_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("tool.js");
        fs::write(&script, "on click #x\n").unwrap();
        let mut registry = registry(dir.path());
        registry.discover();
        let mut events = registry.subscribe();
        assert_eq!(registry.apply_change(&FileChange::Modified(script)), 0);
        assert!(matches!(events.try_recv(), Ok(RegistryEvent::FileChanged { .. })));
    }

    #[test]
    fn test_unindexed_files_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let mut registry = registry(dir.path());
        registry.discover();
        let notes = dir.path().join("notes.txt");
        fs::write(&notes, "hi").unwrap();
        assert_eq!(registry.apply_change(&FileChange::Created(notes)), 0);
        assert_eq!(registry.apply_change(&FileChange::Created("/elsewhere/a.html".into())), 0);
        assert_eq!(registry.stats().pages, 0);
    }
}
