//! Seam to the external leaf parsers.

use crate::behavior::ActionNode;
use crate::dom::ElementTree;
use crate::style::StyleRule;
use crate::types::Location;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// A leaf parser rejected its input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to parse {}: {message}", path.display())]
pub struct ParseError {
    /// File being parsed.
    pub path: PathBuf,
    /// Parser message.
    pub message: String,
    /// Where parsing stopped, if known.
    pub location: Option<Location>,
}

impl ParseError {
    /// Creates an error without a location.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            location: None,
        }
    }

    /// Attaches the failing location.
    #[must_use]
    pub fn at(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }
}

/// Produces per-file structural models from source text.
///
/// Implementations wrap real markup, style and script parsers. The engine
/// depends only on the output shapes.
pub trait LeafProducer: Send + Sync {
    /// Parses a markup file into an element tree.
    ///
    /// # Errors
    ///
    /// Returns an error if the text cannot be parsed.
    fn parse_markup(&self, path: &Path, text: &str) -> Result<ElementTree, ParseError>;

    /// Parses a style file into rules in source order.
    ///
    /// # Errors
    ///
    /// Returns an error if the text cannot be parsed.
    fn parse_style(&self, path: &Path, text: &str) -> Result<Vec<StyleRule>, ParseError>;

    /// Extracts runtime actions from a behavior script.
    ///
    /// # Errors
    ///
    /// Returns an error if the text cannot be parsed.
    fn parse_behavior(&self, path: &Path, text: &str) -> Result<Vec<ActionNode>, ParseError>;
}
