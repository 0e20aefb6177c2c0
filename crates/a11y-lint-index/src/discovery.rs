//! Workspace file discovery and classification.

use crate::error::{IndexError, Result};
use a11y_lint_core::{AnalysisScope, IndexConfig};
use ignore::WalkBuilder;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const MARKUP_EXTENSIONS: &[&str] = &["html", "htm", "xhtml"];
const BEHAVIOR_EXTENSIONS: &[&str] = &["js", "mjs", "cjs", "jsx", "ts", "tsx"];
const STYLE_EXTENSIONS: &[&str] = &["css", "scss", "sass", "less"];

/// What part of a page a file contributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    /// Markup; every markup file is a page.
    Markup,
    /// Script.
    Behavior,
    /// Stylesheet.
    Style,
}

impl FileKind {
    /// Classifies a path by extension.
    #[must_use]
    pub fn of(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        if MARKUP_EXTENSIONS.contains(&ext.as_str()) {
            Some(Self::Markup)
        } else if BEHAVIOR_EXTENSIONS.contains(&ext.as_str()) {
            Some(Self::Behavior)
        } else if STYLE_EXTENSIONS.contains(&ext.as_str()) {
            Some(Self::Style)
        } else {
            None
        }
    }
}

/// Compiled include and exclude patterns, matched against root-relative paths.
#[derive(Debug, Clone)]
pub struct FileFilter {
    root: PathBuf,
    include: Vec<glob::Pattern>,
    exclude: Vec<glob::Pattern>,
}

fn compile(patterns: &[String]) -> Result<Vec<glob::Pattern>> {
    patterns
        .iter()
        .map(|p| {
            glob::Pattern::new(p).map_err(|source| IndexError::Glob {
                pattern: p.clone(),
                source,
            })
        })
        .collect()
}

/// Matches `pattern`, also trying `**/`-prefixed patterns against top-level paths.
fn matches(pattern: &glob::Pattern, relative: &str) -> bool {
    if pattern.matches(relative) {
        return true;
    }
    pattern
        .as_str()
        .strip_prefix("**/")
        .and_then(|rest| glob::Pattern::new(rest).ok())
        .is_some_and(|p| p.matches(relative))
}

impl FileFilter {
    /// Compiles the patterns of an index configuration.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::Glob`] for a pattern that does not compile.
    pub fn new(root: impl Into<PathBuf>, config: &IndexConfig) -> Result<Self> {
        Ok(Self {
            root: root.into(),
            include: compile(&config.include)?,
            exclude: compile(&config.exclude)?,
        })
    }

    /// The root paths are made relative to.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns true if the path is inside the root, has a known kind,
    /// matches an include pattern and no exclude pattern.
    #[must_use]
    pub fn accepts(&self, path: &Path) -> bool {
        if FileKind::of(path).is_none() {
            return false;
        }
        let Ok(relative) = path.strip_prefix(&self.root) else {
            return false;
        };
        let relative = relative.to_string_lossy().replace('\\', "/");
        self.include.iter().any(|p| matches(p, &relative))
            && !self.exclude.iter().any(|p| matches(p, &relative))
    }
}

/// Result of a full workspace scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Discovered {
    /// Markup files.
    pub markup: BTreeSet<PathBuf>,
    /// Behavior files.
    pub behavior: BTreeSet<PathBuf>,
    /// Style files.
    pub style: BTreeSet<PathBuf>,
    /// The scan stopped at the file limit.
    pub truncated: bool,
}

impl Discovered {
    /// Total number of files found.
    #[must_use]
    pub fn len(&self) -> usize {
        self.markup.len() + self.behavior.len() + self.style.len()
    }

    /// Returns true if nothing was found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Scope of models built from this scan: a complete scan gives
    /// project-wide context, a truncated one only page context.
    #[must_use]
    pub fn scope(&self) -> AnalysisScope {
        if self.truncated {
            AnalysisScope::Page
        } else {
            AnalysisScope::Project
        }
    }

    fn insert(&mut self, kind: FileKind, path: PathBuf) {
        match kind {
            FileKind::Markup => self.markup.insert(path),
            FileKind::Behavior => self.behavior.insert(path),
            FileKind::Style => self.style.insert(path),
        };
    }
}

/// Walks a workspace for markup, behavior and style files.
#[derive(Debug, Clone)]
pub struct FileDiscovery {
    filter: FileFilter,
    respect_gitignore: bool,
    max_files: usize,
}

impl FileDiscovery {
    /// Creates a discovery over `root` with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::Glob`] for invalid include or exclude patterns.
    pub fn new(root: impl Into<PathBuf>, config: &IndexConfig) -> Result<Self> {
        Ok(Self {
            filter: FileFilter::new(root, config)?,
            respect_gitignore: config.respect_gitignore,
            max_files: config.max_project_files,
        })
    }

    /// The workspace root.
    #[must_use]
    pub fn root(&self) -> &Path {
        self.filter.root()
    }

    /// The compiled filter.
    #[must_use]
    pub fn filter(&self) -> &FileFilter {
        &self.filter
    }

    /// Scans the whole workspace.
    ///
    /// Unreadable entries are logged and skipped. The scan stops once
    /// `max_project_files` files are found.
    #[must_use]
    pub fn discover(&self) -> Discovered {
        let mut found = Discovered::default();
        let mut builder = WalkBuilder::new(self.root());
        builder
            .hidden(false)
            .git_ignore(self.respect_gitignore)
            .git_global(self.respect_gitignore)
            .git_exclude(self.respect_gitignore)
            .require_git(false)
            .sort_by_file_path(Ord::cmp);

        for entry in builder.build() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Failed to read entry: {e}");
                    continue;
                }
            };
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }
            let path = entry.path();
            let Some(kind) = self.classify(path) else {
                continue;
            };
            if found.len() >= self.max_files {
                found.truncated = true;
                warn!(
                    "Stopped discovery at {} files; models will have page scope only",
                    self.max_files
                );
                break;
            }
            found.insert(kind, path.to_path_buf());
        }

        info!(
            "Discovered {} markup, {} behavior and {} style files",
            found.markup.len(),
            found.behavior.len(),
            found.style.len()
        );
        found
    }

    /// Classifies one path for targeted discovery, or `None` if it is not indexed.
    #[must_use]
    pub fn classify(&self, path: &Path) -> Option<FileKind> {
        if !self.filter.accepts(path) {
            debug!("Not indexed: {}", path.display());
            return None;
        }
        FileKind::of(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(root: &Path, rel: &str) -> PathBuf {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, "").unwrap();
        path
    }

    #[test]
    fn test_kinds_by_extension() {
        assert_eq!(FileKind::of(Path::new("a/index.HTML")), Some(FileKind::Markup));
        assert_eq!(FileKind::of(Path::new("app.mjs")), Some(FileKind::Behavior));
        assert_eq!(FileKind::of(Path::new("site.scss")), Some(FileKind::Style));
        assert_eq!(FileKind::of(Path::new("README.md")), None);
        assert_eq!(FileKind::of(Path::new("Makefile")), None);
    }

    #[test]
    fn test_filter_excludes_dependencies() {
        let filter = FileFilter::new("/ws", &IndexConfig::default()).unwrap();
        assert!(filter.accepts(Path::new("/ws/index.html")));
        assert!(filter.accepts(Path::new("/ws/src/app.js")));
        assert!(!filter.accepts(Path::new("/ws/node_modules/lib/index.js")));
        assert!(!filter.accepts(Path::new("/ws/src/node_modules/x.css")));
        assert!(!filter.accepts(Path::new("/elsewhere/index.html")));
    }

    #[test]
    fn test_invalid_pattern() {
        let config = IndexConfig {
            include: vec!["[".into()],
            ..IndexConfig::default()
        };
        assert!(matches!(
            FileFilter::new("/ws", &config),
            Err(IndexError::Glob { .. })
        ));
    }

    #[test]
    fn test_discover_classifies_and_caps() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "index.html");
        write(root, "js/app.js");
        write(root, "css/site.css");
        write(root, "node_modules/pkg/index.js");
        write(root, "notes.txt");

        let discovery = FileDiscovery::new(root, &IndexConfig::default()).unwrap();
        let found = discovery.discover();
        assert_eq!(found.len(), 3);
        assert!(!found.truncated);
        assert_eq!(found.scope(), AnalysisScope::Project);
        assert!(found.markup.contains(&root.join("index.html")));

        let capped = IndexConfig {
            max_project_files: 2,
            ..IndexConfig::default()
        };
        let found = FileDiscovery::new(root, &capped).unwrap().discover();
        assert_eq!(found.len(), 2);
        assert!(found.truncated);
        assert_eq!(found.scope(), AnalysisScope::Page);
    }
}
