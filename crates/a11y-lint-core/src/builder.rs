//! Builds a [`DocumentModel`] from one page's source texts.

use crate::dom::ElementTree;
use crate::model::{DocumentModel, SourceFiles};
use crate::producer::{LeafProducer, ParseError};
use crate::scope::AnalysisScope;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Errors that prevent a page model from being built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// The page's own markup text could not be read.
    #[error("markup source unavailable: {}", path.display())]
    SourceUnavailable {
        /// Markup file.
        path: PathBuf,
    },

    /// A leaf producer rejected one of the page's files.
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// One file of a page with its text, if it could be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceText {
    /// File path.
    pub path: PathBuf,
    /// Content, `None` when the file does not exist.
    pub text: Option<String>,
}

impl SourceText {
    /// A file with content.
    #[must_use]
    pub fn present(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            text: Some(text.into()),
        }
    }

    /// A file that could not be found.
    #[must_use]
    pub fn missing(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            text: None,
        }
    }
}

/// All texts of one page, linked files in link order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSources {
    /// Markup file.
    pub markup: SourceText,
    /// Linked behavior files.
    pub behavior: Vec<SourceText>,
    /// Linked style files.
    pub style: Vec<SourceText>,
}

impl PageSources {
    /// Sources for a markup file with no links yet.
    #[must_use]
    pub fn new(markup: SourceText) -> Self {
        Self {
            markup,
            behavior: Vec::new(),
            style: Vec::new(),
        }
    }

    /// Adds a behavior file.
    #[must_use]
    pub fn behavior(mut self, source: SourceText) -> Self {
        self.behavior.push(source);
        self
    }

    /// Adds a style file.
    #[must_use]
    pub fn style(mut self, source: SourceText) -> Self {
        self.style.push(source);
        self
    }
}

/// Fuses per-file leaf models into one [`DocumentModel`].
#[derive(Clone)]
pub struct DocumentModelBuilder {
    producer: Arc<dyn LeafProducer>,
}

impl std::fmt::Debug for DocumentModelBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentModelBuilder").finish_non_exhaustive()
    }
}

impl DocumentModelBuilder {
    /// Creates a builder over the given leaf producer.
    #[must_use]
    pub fn new(producer: Arc<dyn LeafProducer>) -> Self {
        Self { producer }
    }

    /// The underlying leaf producer.
    #[must_use]
    pub fn producer(&self) -> &Arc<dyn LeafProducer> {
        &self.producer
    }

    /// Parses a markup text on its own.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::Parse`] if the markup is rejected.
    pub fn parse_markup(&self, path: &Path, text: &str) -> Result<ElementTree, BuildError> {
        Ok(self.producer.parse_markup(path, text)?)
    }

    /// Builds a page model.
    ///
    /// Linked files without text are left out of the model and listed in
    /// [`DocumentModel::missing_files`].
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::SourceUnavailable`] if the markup text is
    /// missing and [`BuildError::Parse`] if any leaf producer fails.
    pub fn build(
        &self,
        sources: &PageSources,
        scope: AnalysisScope,
    ) -> Result<DocumentModel, BuildError> {
        let text = sources
            .markup
            .text
            .as_deref()
            .ok_or_else(|| BuildError::SourceUnavailable {
                path: sources.markup.path.clone(),
            })?;
        let tree = self.parse_markup(&sources.markup.path, text)?;
        self.build_with_tree(tree, sources, scope)
    }

    /// Builds a page model from an already parsed markup tree.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::Parse`] if a linked file fails to parse.
    pub fn build_with_tree(
        &self,
        tree: ElementTree,
        sources: &PageSources,
        scope: AnalysisScope,
    ) -> Result<DocumentModel, BuildError> {
        let mut missing = Vec::new();
        let mut files = SourceFiles::markup_only(sources.markup.path.clone());

        let mut behavior = Vec::with_capacity(sources.behavior.len());
        for source in &sources.behavior {
            let Some(text) = source.text.as_deref() else {
                debug!("Linked behavior file missing: {}", source.path.display());
                missing.push(source.path.clone());
                continue;
            };
            behavior.push(self.producer.parse_behavior(&source.path, text)?);
            files.behavior.push(source.path.clone());
        }

        let mut style = Vec::with_capacity(sources.style.len());
        for source in &sources.style {
            let Some(text) = source.text.as_deref() else {
                debug!("Linked style file missing: {}", source.path.display());
                missing.push(source.path.clone());
                continue;
            };
            style.push(self.producer.parse_style(&source.path, text)?);
            files.style.push(source.path.clone());
        }

        let model = DocumentModel::assemble(tree, behavior, style, files, scope)
            .with_missing_files(missing);
        debug!(
            "Built model for {}: {} elements, {} actions, {} rules ({})",
            sources.markup.path.display(),
            model.markup.len(),
            model.behavior.len(),
            model.style.len(),
            scope
        );
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::FixtureProducer;

    fn builder() -> DocumentModelBuilder {
        DocumentModelBuilder::new(Arc::new(FixtureProducer))
    }

    #[test]
    fn missing_markup_is_source_unavailable() {
        let sources = PageSources::new(SourceText::missing("index.html"));
        let err = builder()
            .build(&sources, AnalysisScope::Page)
            .expect_err("must fail");
        assert!(matches!(err, BuildError::SourceUnavailable { .. }));
    }

    #[test]
    fn missing_linked_files_are_recorded() {
        let sources = PageSources::new(SourceText::present("index.html", "button id=go"))
            .behavior(SourceText::missing("gone.js"))
            .behavior(SourceText::present("app.js", "on click #go"))
            .style(SourceText::missing("gone.css"));
        let model = builder()
            .build(&sources, AnalysisScope::Page)
            .expect("builds");
        assert_eq!(model.behavior.len(), 1);
        assert_eq!(model.source_files.behavior, vec![PathBuf::from("app.js")]);
        assert_eq!(
            model.missing_files,
            vec![PathBuf::from("gone.js"), PathBuf::from("gone.css")]
        );
    }

    #[test]
    fn leaf_failure_is_parse_error() {
        let sources = PageSources::new(SourceText::present("index.html", "div"))
            .behavior(SourceText::present("app.js", "teleport #go"));
        let err = builder()
            .build(&sources, AnalysisScope::Page)
            .expect_err("must fail");
        assert!(matches!(err, BuildError::Parse(_)));
    }
}
