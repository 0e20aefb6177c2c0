//! Joins foreground analysis of an open file with background page builds.
//!
//! The foreground path answers immediately with whatever context exists:
//! a cached page snapshot if one covers the file, otherwise the file alone.
//! When the background indexer finishes a page, its issues supersede the
//! earlier ones for every file of that page.

use a11y_lint_core::{
    AnalysisContext, AnalysisOutcome, AnalysisScope, AnalyzerRegistry, BuildError,
    DocumentModelBuilder, Issue, PageSources, SourceText,
};
use a11y_lint_index::{FileKind, RegistryEvent, SnapshotReader};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Issues published for one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileIssues {
    /// Context the issues were found with.
    pub scope: AnalysisScope,
    /// The issues, in report order.
    pub issues: Vec<Issue>,
}

/// Latest issues per file. Publishing replaces, never merges.
#[derive(Debug, Clone, Default)]
pub struct IssueBook {
    files: BTreeMap<PathBuf, FileIssues>,
}

impl IssueBook {
    /// Creates an empty book.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the entries of `files` with `issues`.
    ///
    /// Each issue goes to the file of its primary location; location-less
    /// issues go to the first file. Files without issues get an empty entry,
    /// which clears what an earlier publish left there.
    pub fn publish(&mut self, files: &[PathBuf], scope: AnalysisScope, issues: &[Issue]) {
        let mut grouped: BTreeMap<PathBuf, Vec<Issue>> =
            files.iter().map(|f| (f.clone(), Vec::new())).collect();
        for issue in issues {
            let file = issue
                .primary_location()
                .map(|loc| loc.file.clone())
                .or_else(|| files.first().cloned());
            if let Some(file) = file {
                grouped.entry(file).or_default().push(issue.clone());
            }
        }
        for (file, issues) in grouped {
            self.files.insert(file, FileIssues { scope, issues });
        }
    }

    /// Removes the entries of `files`.
    pub fn clear(&mut self, files: &[PathBuf]) {
        for file in files {
            self.files.remove(file);
        }
    }

    /// The entry of a file.
    #[must_use]
    pub fn get(&self, file: &Path) -> Option<&FileIssues> {
        self.files.get(file)
    }

    /// Iterates over entries in path order.
    pub fn iter(&self) -> impl Iterator<Item = (&PathBuf, &FileIssues)> {
        self.files.iter()
    }

    /// Every issue in the book.
    #[must_use]
    pub fn issues(&self) -> Vec<&Issue> {
        self.files.values().flat_map(|f| f.issues.iter()).collect()
    }

    /// Number of files with an entry.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns true if no file has an entry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Result of one analysis pass.
#[derive(Debug)]
pub struct Analysis {
    /// Context the pass had.
    pub scope: AnalysisScope,
    /// Files the pass covered.
    pub files: Vec<PathBuf>,
    /// Issues and analyzer failures.
    pub outcome: AnalysisOutcome,
}

/// An editing session over one workspace.
#[derive(Debug)]
pub struct Session {
    analyzers: AnalyzerRegistry,
    builder: DocumentModelBuilder,
    snapshots: SnapshotReader,
    book: IssueBook,
}

impl Session {
    /// Creates a session reading page snapshots from `snapshots`.
    #[must_use]
    pub fn new(
        analyzers: AnalyzerRegistry,
        builder: DocumentModelBuilder,
        snapshots: SnapshotReader,
    ) -> Self {
        Self {
            analyzers,
            builder,
            snapshots,
            book: IssueBook::new(),
        }
    }

    /// The current issues.
    #[must_use]
    pub fn book(&self) -> &IssueBook {
        &self.book
    }

    /// Analyzes an open file right away and publishes the result.
    ///
    /// A cached page covering `path` is analyzed at its page or project
    /// scope. Otherwise markup text becomes a file-scope model and
    /// behavior text a nodes-only context. Style files on their own
    /// produce no issues. Never waits for the background indexer.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::Parse`] if the text cannot be parsed.
    pub fn analyze_foreground(&mut self, path: &Path, text: &str) -> Result<Analysis, BuildError> {
        let analysis = self.foreground(path, text)?;
        debug!(
            "Foreground analysis of {} at {} scope: {} issue(s)",
            path.display(),
            analysis.scope,
            analysis.outcome.issues.len()
        );
        self.book
            .publish(&analysis.files, analysis.scope, &analysis.outcome.issues);
        Ok(analysis)
    }

    fn foreground(&self, path: &Path, text: &str) -> Result<Analysis, BuildError> {
        if let Some(entry) = self.snapshots.entry_for_file(path) {
            let outcome = self.analyzers.analyze(&AnalysisContext::for_model(&entry.model));
            return Ok(Analysis {
                scope: entry.scope,
                files: entry.model.files(),
                outcome,
            });
        }

        let scope = AnalysisScope::File;
        let files = vec![path.to_path_buf()];
        let outcome = match FileKind::of(path) {
            Some(FileKind::Markup) => {
                let sources = PageSources::new(SourceText::present(path, text));
                let model = self.builder.build(&sources, scope)?;
                self.analyzers.analyze(&AnalysisContext::for_model(&model))
            }
            Some(FileKind::Behavior) => {
                let nodes = self.builder.producer().parse_behavior(path, text)?;
                self.analyzers
                    .analyze(&AnalysisContext::nodes_only(&nodes, scope))
            }
            Some(FileKind::Style) | None => AnalysisOutcome::default(),
        };
        Ok(Analysis {
            scope,
            files,
            outcome,
        })
    }

    /// Applies a registry notification. Returns the files whose entries changed.
    ///
    /// A built page is analyzed from its snapshot and replaces the entries
    /// of all its files. A removed page clears them. A changed standalone
    /// behavior file is read and analyzed on its own.
    pub fn apply_event(&mut self, event: &RegistryEvent) -> Vec<PathBuf> {
        match event {
            RegistryEvent::PageBuilt { page, files, scope } => {
                let Some(model) = self.snapshots.model(page) else {
                    debug!("No snapshot for {}", page.display());
                    return Vec::new();
                };
                let outcome = self.analyzers.analyze(&AnalysisContext::for_model(&model));
                self.book.publish(files, *scope, &outcome.issues);
                files.clone()
            }
            RegistryEvent::PageRemoved { files, .. } => {
                self.book.clear(files);
                files.clone()
            }
            RegistryEvent::PageFailed { .. } => Vec::new(),
            RegistryEvent::FileChanged { path } => match std::fs::read_to_string(path) {
                Ok(text) => match self.analyze_foreground(path, &text) {
                    Ok(analysis) => analysis.files,
                    Err(e) => {
                        warn!("{}", e);
                        Vec::new()
                    }
                },
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    let files = vec![path.clone()];
                    self.book.clear(&files);
                    files
                }
                Err(e) => {
                    warn!("Failed to read {}: {}", path.display(), e);
                    Vec::new()
                }
            },
        }
    }
}
