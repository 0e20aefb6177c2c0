//! Foreground results are superseded by background page builds.

use a11y_lint::index::{BackgroundIndexer, FileChange, PageRegistry, RegistryEvent};
use a11y_lint::{AnalysisScope, Config, DocumentModelBuilder, IndexConfig, Session};
use a11y_lint_core::fixture::FixtureProducer;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

const MARKUP: &str = "main\n  div id=save tabindex=0\n  script src=a.js\n  script src=b.js\n";
const CLICK: &str = "on click #save\n";
const KEYS: &str = "on keydown #save keys=Enter,Space\n";

fn workspace() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("index.html"), MARKUP).unwrap();
    fs::write(dir.path().join("a.js"), CLICK).unwrap();
    fs::write(dir.path().join("b.js"), KEYS).unwrap();
    dir
}

fn builder() -> DocumentModelBuilder {
    DocumentModelBuilder::new(Arc::new(FixtureProducer))
}

fn registry(root: &Path) -> PageRegistry {
    let config = IndexConfig {
        root: root.to_path_buf(),
        ..IndexConfig::default()
    };
    PageRegistry::new(&config, builder()).unwrap()
}

fn session(registry: &PageRegistry) -> Session {
    Session::new(
        a11y_lint::rules::registry(Config::default()),
        builder(),
        registry.snapshots(),
    )
}

fn count(session: &Session, file: &Path, issue_type: &str) -> usize {
    session
        .book()
        .get(file)
        .map_or(0, |entry| entry.issues.iter().filter(|i| i.issue_type == issue_type).count())
}

#[test]
fn page_build_supersedes_file_scope_guess() {
    let dir = workspace();
    let mut registry = registry(dir.path());
    let mut session = session(&registry);
    let script: PathBuf = registry.root().join("a.js");

    let analysis = session.analyze_foreground(&script, CLICK).unwrap();
    assert_eq!(analysis.scope, AnalysisScope::File);
    assert_eq!(count(&session, &script, "mouse-only-click"), 1);

    let mut events = registry.subscribe();
    registry.discover();
    registry.rebuild_all();
    while let Ok(event) = events.try_recv() {
        session.apply_event(&event);
    }

    let entry = session.book().get(&script).unwrap();
    assert_eq!(entry.scope, AnalysisScope::Project);
    assert_eq!(count(&session, &script, "mouse-only-click"), 0);

    let again = session.analyze_foreground(&script, CLICK).unwrap();
    assert_eq!(again.scope, AnalysisScope::Project);
    assert_eq!(again.files.len(), 3);
}

#[test]
fn removed_page_clears_its_files() {
    let dir = workspace();
    let mut registry = registry(dir.path());
    let mut session = session(&registry);
    let mut events = registry.subscribe();
    registry.discover();
    registry.rebuild_all();
    while let Ok(event) = events.try_recv() {
        session.apply_event(&event);
    }
    assert_eq!(session.book().len(), 3);

    let index = registry.root().join("index.html");
    fs::remove_file(&index).unwrap();
    registry.apply_change(&FileChange::Removed(index));
    let event = events.try_recv().unwrap();
    assert!(matches!(event, RegistryEvent::PageRemoved { .. }));
    assert_eq!(session.apply_event(&event).len(), 3);
    assert!(session.book().is_empty());
}

#[test]
fn lone_markup_is_analyzed_at_file_scope() {
    let dir = tempfile::tempdir().unwrap();
    let registry = registry(dir.path());
    let mut session = session(&registry);
    let page = registry.root().join("draft.html");

    let analysis = session.analyze_foreground(&page, "div id=b role=button\n").unwrap();
    assert_eq!(analysis.scope, AnalysisScope::File);
    assert_eq!(count(&session, &page, "interactive-role-static"), 1);

    let style = registry.root().join("site.css");
    assert!(session.analyze_foreground(&style, ".x { color: red }\n").unwrap().outcome.issues.is_empty());
}

#[tokio::test]
async fn background_indexer_feeds_session() {
    let dir = workspace();
    let registry = registry(dir.path());
    let script = registry.root().join("a.js");
    let mut session = session(&registry);
    let mut events = registry.subscribe();
    let indexer = BackgroundIndexer::spawn(registry);

    tokio::time::timeout(Duration::from_secs(5), async {
        while let Ok(event) = events.recv().await {
            let built = matches!(event, RegistryEvent::PageBuilt { .. });
            session.apply_event(&event);
            if built {
                break;
            }
        }
    })
    .await
    .unwrap();

    assert_eq!(session.book().get(&script).map(|e| e.scope), Some(AnalysisScope::Project));
    indexer.shutdown().await.unwrap();
}
