//! Analyzer presets for common configurations.

use crate::{
    FocusManagement, FocusVisible, HiddenFocusable, InteractiveRole, KeyboardHandlers, LiveRegion,
    MouseOnlyClick, PositiveTabindex, StaticAriaState, WidgetPatterns,
};
use a11y_lint_core::{AnalyzerBox, AnalyzerRegistry, Config};
use tracing::warn;

/// Line window used by the strict preset's focus-management analyzer.
pub const STRICT_LINE_WINDOW: usize = 10;

/// Preset configurations for a11y-lint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Preset {
    /// Recommended analyzers with sensible defaults.
    #[default]
    Recommended,
    /// Every analyzer, with wider search windows.
    Strict,
    /// Keyboard essentials only, for gradual adoption.
    Minimal,
}

impl Preset {
    /// Parses a preset name as written in the config file.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "recommended" => Some(Self::Recommended),
            "strict" => Some(Self::Strict),
            "minimal" => Some(Self::Minimal),
            _ => None,
        }
    }

    /// Returns the analyzers for this preset.
    #[must_use]
    pub fn analyzers(self) -> Vec<AnalyzerBox> {
        match self {
            Self::Recommended => recommended_analyzers(),
            Self::Strict => strict_analyzers(),
            Self::Minimal => minimal_analyzers(),
        }
    }
}

/// Returns the recommended set of analyzers.
///
/// Everything except `hidden-focusable` (A11Y009), whose visual checks
/// depend on styles that script may change at runtime.
#[must_use]
pub fn recommended_analyzers() -> Vec<AnalyzerBox> {
    vec![
        Box::new(InteractiveRole::new()),
        Box::new(MouseOnlyClick::new()),
        Box::new(StaticAriaState::new()),
        Box::new(LiveRegion::new()),
        Box::new(FocusManagement::new()),
        Box::new(KeyboardHandlers::new()),
        Box::new(WidgetPatterns::new()),
        Box::new(FocusVisible::new()),
        Box::new(PositiveTabindex::new()),
    ]
}

/// Returns the strict set of analyzers.
///
/// Includes all recommended analyzers plus:
/// - `hidden-focusable` (A11Y009)
/// - A wider `focus-management` line window
#[must_use]
pub fn strict_analyzers() -> Vec<AnalyzerBox> {
    vec![
        Box::new(InteractiveRole::new()),
        Box::new(MouseOnlyClick::new()),
        Box::new(StaticAriaState::new()),
        Box::new(LiveRegion::new()),
        Box::new(FocusManagement::new().line_window(STRICT_LINE_WINDOW)),
        Box::new(KeyboardHandlers::new()),
        Box::new(WidgetPatterns::new()),
        Box::new(FocusVisible::new()),
        Box::new(HiddenFocusable::new()),
        Box::new(PositiveTabindex::new()),
    ]
}

/// Returns the minimal set of analyzers.
///
/// For gradual adoption, only includes:
/// - `interactive-role` (A11Y001)
/// - `keyboard-handlers` (A11Y006)
#[must_use]
pub fn minimal_analyzers() -> Vec<AnalyzerBox> {
    vec![
        Box::new(InteractiveRole::new()),
        Box::new(KeyboardHandlers::new()),
    ]
}

/// Returns all available analyzers with default settings.
#[must_use]
pub fn all_analyzers() -> Vec<AnalyzerBox> {
    vec![
        Box::new(InteractiveRole::new()),
        Box::new(MouseOnlyClick::new()),
        Box::new(StaticAriaState::new()),
        Box::new(LiveRegion::new()),
        Box::new(FocusManagement::new()),
        Box::new(KeyboardHandlers::new()),
        Box::new(WidgetPatterns::new()),
        Box::new(FocusVisible::new()),
        Box::new(HiddenFocusable::new()),
        Box::new(PositiveTabindex::new()),
    ]
}

/// Returns the analyzers a configuration asks for.
///
/// The preset picks the set; analyzer sections with options replace the
/// preset's instance with a configured one. Unknown preset names fall
/// back to `recommended`.
#[must_use]
pub fn analyzers_for(config: &Config) -> Vec<AnalyzerBox> {
    let preset = match config.preset.as_deref() {
        None => Preset::default(),
        Some(name) => Preset::from_name(name).unwrap_or_else(|| {
            warn!("Unknown preset {:?}, using recommended", name);
            Preset::default()
        }),
    };
    preset
        .analyzers()
        .into_iter()
        .map(|analyzer| configure(config, analyzer))
        .collect()
}

/// Applies the options of the analyzer's config section, if any.
#[must_use]
pub fn configure(config: &Config, analyzer: AnalyzerBox) -> AnalyzerBox {
    let Some(rule) = config.rule_config(analyzer.name()) else {
        return analyzer;
    };
    match analyzer.name() {
        crate::focus_management::NAME if rule.options.contains_key("line_window") => {
            let window = usize::try_from(rule.get_int("line_window", 0)).unwrap_or_else(|_| {
                warn!("Ignoring negative focus-management line_window");
                crate::focus_management::DEFAULT_LINE_WINDOW
            });
            Box::new(FocusManagement::new().line_window(window))
        }
        crate::interactive_role::NAME if rule.options.contains_key("check_required_states") => {
            Box::new(
                InteractiveRole::new()
                    .check_required_states(rule.get_bool("check_required_states", true)),
            )
        }
        crate::keyboard_handlers::NAME if rule.options.contains_key("allowed_shortcuts") => {
            Box::new(KeyboardHandlers::new().allow_shortcuts(rule.get_str_array("allowed_shortcuts")))
        }
        crate::widget_patterns::NAME if rule.options.contains_key("patterns") => {
            let names = rule.get_str_array("patterns");
            Box::new(WidgetPatterns::new().only(names.iter().map(String::as_str)))
        }
        _ => analyzer,
    }
}

/// Builds a registry from a configuration: its preset, analyzer options,
/// enable flags, severity overrides and minimum severity.
#[must_use]
pub fn registry(config: Config) -> AnalyzerRegistry {
    let analyzers = analyzers_for(&config);
    AnalyzerRegistry::new()
        .with_all(analyzers)
        .with_config(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(analyzers: &[AnalyzerBox]) -> Vec<&'static str> {
        analyzers.iter().map(|a| a.name()).collect()
    }

    #[test]
    fn test_preset_analyzers() {
        assert_eq!(
            names(&Preset::Minimal.analyzers()),
            vec!["interactive-role", "keyboard-handlers"]
        );
        assert!(!names(&Preset::Recommended.analyzers()).contains(&"hidden-focusable"));
        assert_eq!(Preset::Strict.analyzers().len(), all_analyzers().len());
    }

    #[test]
    fn test_codes_are_unique() {
        let mut codes: Vec<&str> = all_analyzers().iter().map(|a| a.code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), 10);
    }

    #[test]
    fn test_preset_names() {
        assert_eq!(Preset::from_name("Strict"), Some(Preset::Strict));
        assert_eq!(Preset::from_name("lenient"), None);
    }

    #[test]
    fn test_unknown_preset_falls_back() {
        let config = Config::parse("preset = \"lenient\"").unwrap();
        assert_eq!(analyzers_for(&config).len(), recommended_analyzers().len());
    }

    #[test]
    fn test_registry_honors_config() {
        let config = Config::parse(
            r#"
preset = "minimal"

[rules.keyboard-handlers]
enabled = false
"#,
        )
        .unwrap();
        let registry = registry(config);
        assert_eq!(registry.len(), 2);
        assert!(!registry.config().is_rule_enabled("keyboard-handlers"));
    }
}
