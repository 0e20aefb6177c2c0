//! How much context contributed to a model or an issue.

use serde::{Deserialize, Serialize};

/// Amount of cross-file context behind a [`DocumentModel`](crate::DocumentModel).
///
/// Ordered: `File < Page < Project`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisScope {
    /// A single file with no cross-file resolution.
    File,
    /// A markup file plus every behavior/style file it links to.
    Page,
    /// A page built with the whole workspace discovered.
    Project,
}

impl AnalysisScope {
    /// Returns true if selectors in behavior code were resolved against markup.
    #[must_use]
    pub fn has_cross_file_context(self) -> bool {
        self >= Self::Page
    }
}

impl std::fmt::Display for AnalysisScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File => write!(f, "file"),
            Self::Page => write!(f, "page"),
            Self::Project => write!(f, "project"),
        }
    }
}
