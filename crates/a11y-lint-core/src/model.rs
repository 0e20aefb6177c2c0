//! The unified per-page document model.

use crate::behavior::{ActionId, ActionNode};
use crate::dom::{Element, ElementId, ElementTree};
use crate::resolver;
use crate::scope::AnalysisScope;
use crate::style::StyleRule;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::path::{Path, PathBuf};

/// Files that contributed to a model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFiles {
    /// The page's markup file.
    pub markup: PathBuf,
    /// Behavior files in link order.
    #[serde(default)]
    pub behavior: Vec<PathBuf>,
    /// Style files in link order.
    #[serde(default)]
    pub style: Vec<PathBuf>,
}

impl SourceFiles {
    /// Source set for a lone markup file.
    #[must_use]
    pub fn markup_only(markup: impl Into<PathBuf>) -> Self {
        Self {
            markup: markup.into(),
            ..Self::default()
        }
    }

    /// All files, markup first.
    #[must_use]
    pub fn all(&self) -> Vec<PathBuf> {
        std::iter::once(self.markup.clone())
            .chain(self.behavior.iter().cloned())
            .chain(self.style.iter().cloned())
            .collect()
    }

    /// Returns true if `path` is one of the files.
    #[must_use]
    pub fn contains(&self, path: &Path) -> bool {
        self.markup == path
            || self.behavior.iter().any(|p| p == path)
            || self.style.iter().any(|p| p == path)
    }
}

/// Cross-referenced model of one page.
///
/// Built in one step by [`DocumentModel::assemble`] and never mutated
/// afterwards; a change to any constituent file produces a new model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentModel {
    /// Element tree of the markup file.
    pub markup: ElementTree,
    /// Actions from every behavior file, in file order.
    #[serde(default)]
    pub behavior: Vec<ActionNode>,
    /// Rules from every style file, in source order.
    #[serde(default)]
    pub style: Vec<StyleRule>,
    /// Contributing files.
    pub source_files: SourceFiles,
    /// Linked files that could not be found.
    #[serde(default)]
    pub missing_files: Vec<PathBuf>,
    /// How much context went into the model.
    pub scope: AnalysisScope,
}

impl DocumentModel {
    /// Assembles a model from leaf outputs.
    ///
    /// Action ids are renumbered across files in order, style source order
    /// runs across style files, and every binding is resolved against
    /// `markup`. `behavior` and `style` hold one list per linked file.
    #[must_use]
    pub fn assemble(
        markup: ElementTree,
        behavior: Vec<Vec<ActionNode>>,
        style: Vec<Vec<StyleRule>>,
        source_files: SourceFiles,
        scope: AnalysisScope,
    ) -> Self {
        let behavior: Vec<ActionNode> = behavior
            .into_iter()
            .flatten()
            .enumerate()
            .map(|(index, mut node)| {
                node.id = ActionId(index);
                node.binding.resolved = resolver::resolve(&node.binding, &markup);
                node
            })
            .collect();
        let style: Vec<StyleRule> = style
            .into_iter()
            .flatten()
            .enumerate()
            .map(|(index, rule)| rule.with_source_order(index))
            .collect();
        Self {
            markup,
            behavior,
            style,
            source_files,
            missing_files: Vec::new(),
            scope,
        }
    }

    /// A markup-only model.
    #[must_use]
    pub fn markup_only(path: impl Into<PathBuf>, markup: ElementTree, scope: AnalysisScope) -> Self {
        Self::assemble(markup, Vec::new(), Vec::new(), SourceFiles::markup_only(path), scope)
    }

    /// Records linked files that were not available.
    #[must_use]
    pub fn with_missing_files(mut self, missing: Vec<PathBuf>) -> Self {
        self.missing_files = missing;
        self
    }

    /// Looks up an element.
    #[must_use]
    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.markup.get(id)
    }

    /// Element targeted by an action, if resolved.
    #[must_use]
    pub fn target_of(&self, action: &ActionNode) -> Option<&Element> {
        action.binding.resolved.and_then(|id| self.markup.get(id))
    }

    /// Actions whose binding resolved to `id`.
    pub fn actions_on(&self, id: ElementId) -> impl Iterator<Item = &ActionNode> {
        self.behavior
            .iter()
            .filter(move |a| a.binding.resolved == Some(id))
    }

    /// Event handlers bound to `id`.
    pub fn handlers_on(&self, id: ElementId) -> impl Iterator<Item = &ActionNode> {
        self.actions_on(id).filter(|a| a.event().is_some())
    }

    /// Every contributing file, markup first.
    #[must_use]
    pub fn files(&self) -> Vec<PathBuf> {
        self.source_files.all()
    }

    /// Style rules that apply to `id`, most specific first.
    #[must_use]
    pub fn matching_rules(&self, id: ElementId) -> Vec<Cow<'_, StyleRule>> {
        resolver::matching_style_rules(&self.markup, id, &self.style)
    }

    /// Returns true if the element or an ancestor is hidden by style or by
    /// the `hidden` attribute.
    #[must_use]
    pub fn is_hidden(&self, id: ElementId) -> bool {
        self.markup.self_and_ancestors(id).any(|e| {
            e.has_attr("hidden") || resolver::is_hidden_by_style(&self.markup, e.id, &self.style)
        })
    }

    /// Returns true if a focus-state rule gives the element a visible indicator.
    #[must_use]
    pub fn has_focus_style(&self, id: ElementId) -> bool {
        resolver::has_focus_style(&self.markup, id, &self.style)
    }

    /// Returns true if every resolved binding points into this model's tree.
    #[must_use]
    pub fn bindings_are_valid(&self) -> bool {
        self.behavior
            .iter()
            .all(|a| a.binding.resolved.map_or(true, |id| self.markup.contains(id)))
    }
}
