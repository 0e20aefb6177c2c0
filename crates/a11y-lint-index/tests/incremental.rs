//! Incremental rebuild behavior of the page registry.

use a11y_lint_core::fixture::FixtureProducer;
use a11y_lint_core::{DocumentModelBuilder, IndexConfig};
use a11y_lint_index::{BackgroundIndexer, FileChange, PageRegistry, PageState, RegistryEvent};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

struct Workspace {
    dir: tempfile::TempDir,
}

impl Workspace {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    fn write(&self, rel: &str, text: &str) -> PathBuf {
        let path = self.dir.path().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, text).unwrap();
        path
    }

    fn registry(&self) -> PageRegistry {
        let config = IndexConfig {
            root: self.dir.path().to_path_buf(),
            ..IndexConfig::default()
        };
        PageRegistry::new(&config, DocumentModelBuilder::new(Arc::new(FixtureProducer))).unwrap()
    }
}

fn canonical(registry: &PageRegistry, rel: &str) -> PathBuf {
    registry.root().join(rel)
}

#[test]
fn deleted_script_then_resaved_markup_rebuilds_once() {
    let ws = Workspace::new();
    let index = ws.write(
        "index.html",
        "main\n  script src=app.js\n  link rel=stylesheet href=site.css\n  span id=go\n",
    );
    let app = ws.write("app.js", "on click #go\n");
    ws.write("site.css", "#go { cursor: pointer }\n");

    let mut registry = ws.registry();
    registry.discover();
    registry.rebuild_all();
    let before = registry.stats();
    assert_eq!(before.builds, 1);

    fs::remove_file(&app).unwrap();
    registry.apply_change(&FileChange::Removed(app));
    registry.apply_change(&FileChange::Modified(index));
    assert_eq!(registry.pending(), 1);
    assert_eq!(registry.rebuild_all(), 1);

    let after = registry.stats();
    assert_eq!(after.builds, before.builds + 1);
    assert_eq!(after.full_discoveries, 1);
    assert_eq!(after.coalesced_requests, before.coalesced_requests + 1);

    let page = canonical(&registry, "index.html");
    let model = registry.snapshots().model(&page).unwrap();
    assert!(model.behavior.is_empty());
    assert_eq!(model.style.len(), 1);
    assert_eq!(model.missing_files, vec![canonical(&registry, "app.js")]);
}

#[test]
fn recreated_script_is_picked_up_again() {
    let ws = Workspace::new();
    ws.write("index.html", "main\n  script src=app.js\n  span id=go\n");
    let mut registry = ws.registry();
    registry.discover();
    registry.rebuild_all();
    let page = canonical(&registry, "index.html");
    assert!(registry.snapshots().model(&page).unwrap().behavior.is_empty());

    let app = ws.write("app.js", "on click #go\n");
    assert_eq!(registry.apply_change(&FileChange::Created(app)), 1);
    registry.rebuild_all();
    assert_eq!(registry.snapshots().model(&page).unwrap().behavior.len(), 1);
}

#[test]
fn shared_script_change_rebuilds_every_linking_page() {
    let ws = Workspace::new();
    ws.write("a.html", "main\n  script src=shared.js\n");
    ws.write("b.html", "main\n  script src=/shared.js\n");
    ws.write("c.html", "main\n");
    let shared = ws.write("shared.js", "on click #x\n");

    let mut registry = ws.registry();
    registry.discover();
    registry.rebuild_all();

    assert_eq!(registry.apply_change(&FileChange::Modified(shared.clone())), 2);
    assert_eq!(registry.rebuild_all(), 2);
    let mut pages = registry.snapshots().pages_containing(&canonical(&registry, "shared.js"));
    pages.sort();
    assert_eq!(
        pages,
        vec![canonical(&registry, "a.html"), canonical(&registry, "b.html")]
    );
}

#[test]
fn changed_links_move_dependencies() {
    let ws = Workspace::new();
    let index = ws.write("index.html", "main\n  script src=old.js\n");
    let old = ws.write("old.js", "");
    ws.write("new.js", "");
    let mut registry = ws.registry();
    registry.discover();
    registry.rebuild_all();

    ws.write("index.html", "main\n  script src=new.js\n");
    registry.apply_change(&FileChange::Modified(index));
    registry.rebuild_all();

    assert_eq!(registry.apply_change(&FileChange::Modified(old)), 0);
    assert_eq!(registry.standalone_files(), vec![canonical(&registry, "old.js")]);
    let page = registry.page(&canonical(&registry, "index.html")).unwrap();
    assert_eq!(page.linked_behavior_files, vec![canonical(&registry, "new.js")]);
    assert_eq!(page.state, PageState::Ready);
}

#[test]
fn rediscovery_drops_vanished_pages() {
    let ws = Workspace::new();
    ws.write("keep.html", "main\n");
    let gone = ws.write("gone.html", "main\n");
    let mut registry = ws.registry();
    assert_eq!(registry.discover(), 2);
    registry.rebuild_all();

    fs::remove_file(gone).unwrap();
    let mut events = registry.subscribe();
    assert_eq!(registry.discover(), 1);
    assert!(matches!(events.try_recv(), Ok(RegistryEvent::PageRemoved { .. })));
    assert_eq!(registry.snapshots().markup_files(), vec![canonical(&registry, "keep.html")]);
}

async fn next_built(events: &mut broadcast::Receiver<RegistryEvent>, page: &Path) -> RegistryEvent {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            match events.recv().await {
                Ok(event @ RegistryEvent::PageBuilt { .. }) if event.page() == Some(page) => {
                    return event;
                }
                Ok(_) => {}
                Err(e) => panic!("event stream ended: {e}"),
            }
        }
    })
    .await
    .unwrap()
}

#[tokio::test]
async fn background_indexer_builds_and_rebuilds() {
    let ws = Workspace::new();
    let index = ws.write("index.html", "main\n  span id=go\n");
    let registry = ws.registry();
    let page = canonical(&registry, "index.html");
    let mut events = registry.subscribe();

    let indexer = BackgroundIndexer::spawn(registry);
    next_built(&mut events, &page).await;
    assert!(indexer.snapshots().model(&page).is_some());

    ws.write("index.html", "main\n  button id=go\n");
    indexer.notify_change(FileChange::Modified(index)).await.unwrap();
    next_built(&mut events, &page).await;

    let model = indexer.snapshots().model(&page).unwrap();
    assert!(model.markup.iter().any(|e| e.tag == "button"));

    let registry = indexer.shutdown().await.unwrap();
    assert_eq!(registry.stats().builds, 2);
}

#[tokio::test]
async fn cancelled_indexer_stops() {
    let ws = Workspace::new();
    ws.write("index.html", "main\n");
    let indexer = BackgroundIndexer::spawn(ws.registry());
    indexer.cancel();
    let registry = indexer.shutdown().await.unwrap();
    assert!(registry.stats().full_discoveries >= 1);
}
