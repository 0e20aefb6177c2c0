//! # a11y-lint-rules
//!
//! Built-in accessibility analyzers for a11y-lint.
//!
//! Each analyzer inspects one page at a time: the markup tree, the actions
//! extracted from every linked script, and the style rules of every linked
//! stylesheet. Analyzers that need markup return nothing when only a lone
//! behavior file is available; the others grade their confidence by how
//! much of the page they saw.
//!
//! ## Available Analyzers
//!
//! | Code | Name | Description |
//! |------|------|-------------|
//! | A11Y001 | `interactive-role` | Interactive roles need keyboard handlers and required states |
//! | A11Y002 | `mouse-only-click` | Click handlers need a keyboard equivalent |
//! | A11Y003 | `static-aria-state` | ARIA states set once and never updated |
//! | A11Y004 | `live-region` | Assertive live regions interrupt the user |
//! | A11Y005 | `focus-management` | Removing or hiding content must manage focus |
//! | A11Y006 | `keyboard-handlers` | Keyboard traps, single-key shortcuts, numeric key codes |
//! | A11Y007 | `widget-patterns` | Composite widgets missing parts of their authoring pattern |
//! | A11Y008 | `focus-visible` | Focus outlines removed without a replacement |
//! | A11Y009 | `hidden-focusable` | Focusable elements hidden from sight or assistive technology |
//! | A11Y010 | `positive-tabindex` | Positive tabindex overrides the natural focus order |
//!
//! ## Usage
//!
//! ```ignore
//! use a11y_lint_core::{AnalysisContext, AnalyzerRegistry};
//! use a11y_lint_rules::{FocusManagement, KeyboardHandlers};
//!
//! let registry = AnalyzerRegistry::new()
//!     .with(KeyboardHandlers::new())
//!     .with(FocusManagement::new().line_window(8));
//! let outcome = registry.analyze(&AnalysisContext::for_model(&model));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod focus_management;
pub mod focus_visible;
pub mod hidden_focusable;
pub mod interactive_role;
pub mod keyboard_handlers;
pub mod live_region;
pub mod mouse_only_click;
pub mod positive_tabindex;
mod presets;
pub mod static_aria_state;
mod support;
pub mod widget_patterns;

#[cfg(test)]
mod testing;

pub use focus_management::FocusManagement;
pub use focus_visible::FocusVisible;
pub use hidden_focusable::HiddenFocusable;
pub use interactive_role::InteractiveRole;
pub use keyboard_handlers::KeyboardHandlers;
pub use live_region::LiveRegion;
pub use mouse_only_click::MouseOnlyClick;
pub use positive_tabindex::PositiveTabindex;
pub use presets::{
    all_analyzers, analyzers_for, configure, minimal_analyzers, recommended_analyzers, registry,
    strict_analyzers, Preset, STRICT_LINE_WINDOW,
};
pub use static_aria_state::StaticAriaState;
pub use widget_patterns::WidgetPatterns;

/// Re-export core types for convenience.
pub use a11y_lint_core::{Analyzer, Issue, Severity};
