//! # a11y-lint-core
//!
//! Core framework for accessibility analysis of multi-file web pages.
//!
//! This crate fuses per-file leaf models (element tree, style rules,
//! behavior actions) into one cross-referenced [`DocumentModel`] per page
//! and runs independent analyzers over it. It includes:
//!
//! - [`LeafProducer`], the seam to external markup, style and script parsers
//! - [`DocumentModelBuilder`] for building page models
//! - [`resolver`] for binding and cascade questions
//! - [`Analyzer`] trait and [`AnalyzerRegistry`] for running rules
//! - [`IssueAggregator`] for ordering and deduplicating results
//! - [`Issue`] for representing findings
//!
//! ## Example
//!
//! ```ignore
//! use a11y_lint_core::{AnalysisContext, AnalyzerRegistry, AnalysisScope,
//!     DocumentModelBuilder, PageSources, SourceText};
//!
//! let builder = DocumentModelBuilder::new(producer);
//! let sources = PageSources::new(SourceText::present("index.html", html))
//!     .behavior(SourceText::present("app.js", js));
//! let model = builder.build(&sources, AnalysisScope::Page)?;
//!
//! let registry = AnalyzerRegistry::new().with(MyAnalyzer);
//! let outcome = registry.analyze(&AnalysisContext::for_model(&model));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod aggregate;
mod analyzer;
mod builder;
mod config;
mod model;
mod producer;
mod registry;
mod scope;
mod types;

pub mod behavior;
pub mod dom;
pub mod resolver;
pub mod selector;
pub mod standards;
pub mod style;
pub mod suppression;

#[cfg(any(test, feature = "fixtures"))]
pub mod fixture;

pub use aggregate::IssueAggregator;
pub use analyzer::{AnalysisContext, Analyzer, AnalyzerBox, AnalyzerFn, FnAnalyzer};
pub use behavior::{ActionId, ActionKind, ActionNode, ElementBinding, KeyBinding, Timing};
pub use builder::{BuildError, DocumentModelBuilder, PageSources, SourceText};
pub use config::{Config, ConfigError, IndexConfig, RuleConfig, CONFIG_CANDIDATES};
pub use dom::{Element, ElementId, ElementTree, ElementTreeBuilder};
pub use model::{DocumentModel, SourceFiles};
pub use producer::{LeafProducer, ParseError};
pub use registry::{AnalysisOutcome, AnalyzerFailure, AnalyzerRegistry, RunOutput};
pub use scope::AnalysisScope;
pub use selector::{SelectorError, Specificity};
pub use style::StyleRule;
pub use types::{
    AnalysisReport, Confidence, ConfidenceLevel, Fix, Issue, IssueDiagnostic, Location, Severity,
};
