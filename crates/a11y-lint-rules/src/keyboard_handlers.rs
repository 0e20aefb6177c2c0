//! Analyzer for keyboard handlers that trap focus or clash with assistive technology.
//!
//! # Rationale
//!
//! Keyboard handlers can take control away from the user. Intercepting Tab
//! with no Escape route can trap focus inside a component. Single-character
//! shortcuts fire while screen reader users navigate with letter keys.
//! Numeric `keyCode` values are deprecated and unreliable across layouts.
//!
//! # Detected Patterns
//!
//! - `potential-keyboard-trap`: a `keydown`/`keyup` handler testing for Tab
//!   while no handler on the same target tests for Escape
//! - `screen-reader-conflict`: a printable-character key without a Ctrl,
//!   Alt or Meta modifier, bound at document level or to an element that
//!   cannot hold focus
//! - `deprecated-keycode`: comparisons against legacy numeric key codes

use crate::support::is_document_binding;
use a11y_lint_core::behavior::{ActionKind, KeyBinding};
use a11y_lint_core::{
    standards, ActionNode, AnalysisContext, Analyzer, Confidence, Fix, Issue, Severity,
};

/// Analyzer code for keyboard-handlers.
pub const CODE: &str = "A11Y006";

/// Analyzer name for keyboard-handlers.
pub const NAME: &str = "keyboard-handlers";

/// Issue type for Tab interception without an exit.
pub const TRAP: &str = "potential-keyboard-trap";

/// Issue type for single-character shortcuts.
pub const SCREEN_READER_CONFLICT: &str = "screen-reader-conflict";

/// Issue type for numeric key codes.
pub const DEPRECATED_KEYCODE: &str = "deprecated-keycode";

/// Reports risky keyboard handling.
#[derive(Debug, Clone)]
pub struct KeyboardHandlers {
    allowed_shortcuts: Vec<String>,
}

impl Default for KeyboardHandlers {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyboardHandlers {
    /// Creates a new analyzer with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            allowed_shortcuts: Vec::new(),
        }
    }

    /// Allows single-character shortcuts that the page lets users remap or disable.
    #[must_use]
    pub fn allow_shortcuts<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_shortcuts.extend(keys.into_iter().map(Into::into));
        self
    }

    fn is_allowed(&self, key: &KeyBinding) -> bool {
        self.allowed_shortcuts.iter().any(|k| key.is(k))
    }

    fn check_trap(ctx: &AnalysisContext<'_>, node: &ActionNode) -> Option<Issue> {
        if !matches!(node.event(), Some("keydown" | "keyup")) || !node.handles_key("Tab") {
            return None;
        }
        let escapes = ctx
            .nodes_on_same_target(node)
            .any(|n| n.is_keyboard_handler() && n.handles_key("Escape"));
        if escapes {
            return None;
        }
        Some(
            Issue::new(
                TRAP,
                Severity::Warning,
                format!(
                    "Handler on `{}` intercepts Tab but nothing handles Escape",
                    node.binding.selector
                ),
            )
            .with_standard(standards::NO_KEYBOARD_TRAP)
            .with_fix(Fix::new(
                "Let Escape release focus from the component",
                "if (event.key === 'Escape') {\n  close();\n  opener.focus();\n}",
            ))
            .with_confidence(ctx.confidence("an Escape handler may exist outside the analyzed files"))
            .at(node.location.clone()),
        )
    }

    fn check_shortcuts(&self, ctx: &AnalysisContext<'_>, node: &ActionNode, keys: &[KeyBinding]) -> Vec<Issue> {
        let target = node
            .binding
            .resolved
            .and_then(|id| ctx.tree().and_then(|t| t.get(id)));
        // Shortcuts scoped to a focused widget are only active on focus.
        let scoped = !is_document_binding(ctx, node)
            && target.is_some_and(|e| e.is_focusable() || e.has_interactive_role());
        if scoped {
            return Vec::new();
        }
        keys.iter()
            .filter(|k| k.is_printable_character() && !k.modifiers.has_command_modifier())
            .filter(|k| !self.is_allowed(k))
            .map(|k| {
                Issue::new(
                    SCREEN_READER_CONFLICT,
                    Severity::Warning,
                    format!(
                        "Single-key shortcut \"{}\" on `{}` collides with screen reader navigation keys",
                        k.key, node.binding.selector
                    ),
                )
                .with_standard(standards::CHARACTER_KEY_SHORTCUTS)
                .with_fix(Fix::new(
                    "Require a modifier, or let users turn the shortcut off or remap it",
                    format!(
                        "if (event.ctrlKey && event.key === '{}') {{\n  run();\n}}",
                        k.key
                    ),
                ))
                .with_confidence(ctx.confidence("shortcut scope depends on where the handler is bound"))
                .with_detail(k.key.clone())
                .at(node.location.clone())
            })
            .collect()
    }
}

impl Analyzer for KeyboardHandlers {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Keyboard handlers must not trap focus or hijack single keys"
    }

    fn issue_types(&self) -> &'static [&'static str] {
        &[TRAP, SCREEN_READER_CONFLICT, DEPRECATED_KEYCODE]
    }

    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Vec<Issue> {
        let mut issues = Vec::new();
        for node in ctx.nodes().iter().filter(|n| n.is_keyboard_handler()) {
            let ActionKind::EventHandler {
                keys,
                legacy_key_codes,
                ..
            } = &node.kind
            else {
                continue;
            };
            issues.extend(Self::check_trap(ctx, node));
            issues.extend(self.check_shortcuts(ctx, node, keys));
            if !legacy_key_codes.is_empty() {
                let codes: Vec<String> = legacy_key_codes.iter().map(u32::to_string).collect();
                issues.push(
                    Issue::new(
                        DEPRECATED_KEYCODE,
                        Severity::Info,
                        format!(
                            "Handler on `{}` compares numeric key codes ({})",
                            node.binding.selector,
                            codes.join(", ")
                        ),
                    )
                    .with_standard(standards::KEYBOARD)
                    .with_fix(Fix::new(
                        "Compare event.key against key names",
                        "if (event.key === 'Enter') { ... }",
                    ))
                    .with_confidence(Confidence::certain("key code comparison found in source"))
                    .at(node.location.clone()),
                );
            }
        }
        issues
    }
}
