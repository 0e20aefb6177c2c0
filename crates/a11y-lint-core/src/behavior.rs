//! Runtime actions extracted from behavior scripts.
//!
//! Each [`ActionNode`] records one thing a script does to the page: bind an
//! event handler, mutate an element, move focus, or change an ARIA state.
//! The action-specific data lives in a typed [`ActionKind`] variant.

use crate::dom::ElementId;
use crate::types::Location;
use serde::{Deserialize, Serialize};

/// Position of an action in its page's behavior list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ActionId(pub usize);

/// When the action runs relative to page load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timing {
    /// Runs unconditionally at load.
    #[default]
    Immediate,
    /// Runs inside a branch.
    Conditional,
    /// Runs later, from a callback or timer.
    Deferred,
}

/// The element an action targets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementBinding {
    /// Selector used to look the element up, e.g. `#menu-toggle`.
    pub selector: String,
    /// Script variable holding the element, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binding_name: Option<String>,
    /// Element the selector resolved to in the page's markup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved: Option<ElementId>,
}

impl ElementBinding {
    /// Creates an unresolved binding.
    #[must_use]
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            binding_name: None,
            resolved: None,
        }
    }

    /// Sets the script variable name.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.binding_name = Some(name.into());
        self
    }

    /// Identity used to group actions that target the same element.
    ///
    /// Resolved bindings compare by element; unresolved ones by selector text.
    #[must_use]
    pub fn key(&self) -> BindingKey {
        match self.resolved {
            Some(id) => BindingKey::Element(id),
            None => BindingKey::Selector(self.selector.trim().to_string()),
        }
    }
}

/// Grouping key for actions on the same target.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BindingKey {
    /// A resolved element.
    Element(ElementId),
    /// An unresolved selector.
    Selector(String),
}

/// Modifier keys required by a key binding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Modifiers {
    /// Control.
    #[serde(default)]
    pub ctrl: bool,
    /// Alt / Option.
    #[serde(default)]
    pub alt: bool,
    /// Meta / Command.
    #[serde(default)]
    pub meta: bool,
    /// Shift.
    #[serde(default)]
    pub shift: bool,
}

impl Modifiers {
    /// Returns true if a non-Shift modifier is required.
    #[must_use]
    pub fn has_command_modifier(self) -> bool {
        self.ctrl || self.alt || self.meta
    }
}

/// A key handled by a keyboard handler.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyBinding {
    /// Key name as in `KeyboardEvent.key`, e.g. `Escape`, `ArrowLeft`, `s`.
    pub key: String,
    /// Required modifiers.
    #[serde(default)]
    pub modifiers: Modifiers,
}

impl KeyBinding {
    /// Creates a binding with no modifiers.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            modifiers: Modifiers::default(),
        }
    }

    /// Parses `Ctrl+Shift+k` style notation.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut modifiers = Modifiers::default();
        let mut parts: Vec<&str> = text.split('+').collect();
        // A trailing empty part means the key itself is `+`.
        let key = match parts.pop() {
            Some("") if text.ends_with('+') => "+",
            Some(key) => key,
            None => "",
        };
        for part in parts {
            match part.trim().to_ascii_lowercase().as_str() {
                "ctrl" | "control" => modifiers.ctrl = true,
                "alt" | "option" => modifiers.alt = true,
                "meta" | "cmd" | "command" => modifiers.meta = true,
                "shift" => modifiers.shift = true,
                _ => {}
            }
        }
        Self {
            key: key.trim().to_string(),
            modifiers,
        }
    }

    /// Returns true for a single visible character such as `s` or `?`.
    #[must_use]
    pub fn is_printable_character(&self) -> bool {
        let mut chars = self.key.chars();
        matches!((chars.next(), chars.next()), (Some(c), None) if !c.is_whitespace() && !c.is_control())
    }

    /// Returns true if this binding is the named key.
    #[must_use]
    pub fn is(&self, key: &str) -> bool {
        normalize_key(&self.key) == normalize_key(key)
    }
}

/// Canonical lowercase key name; folds common aliases.
#[must_use]
pub fn normalize_key(key: &str) -> String {
    if key == " " {
        return String::from("space");
    }
    let lower = key.trim().to_ascii_lowercase();
    match lower.as_str() {
        "esc" => String::from("escape"),
        "spacebar" | "space" => String::from("space"),
        "left" => String::from("arrowleft"),
        "right" => String::from("arrowright"),
        "up" => String::from("arrowup"),
        "down" => String::from("arrowdown"),
        "return" => String::from("enter"),
        _ => lower,
    }
}

/// Key name for a legacy `keyCode`/`which` value.
#[must_use]
pub fn key_for_code(code: u32) -> Option<&'static str> {
    Some(match code {
        9 => "Tab",
        13 => "Enter",
        27 => "Escape",
        32 => "Space",
        35 => "End",
        36 => "Home",
        37 => "ArrowLeft",
        38 => "ArrowUp",
        39 => "ArrowRight",
        40 => "ArrowDown",
        _ => return None,
    })
}

/// Element mutation performed by script.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum DomOperation {
    /// Element removed from the document.
    Remove,
    /// Element hidden through `display` or `visibility`.
    Hide {
        /// Property used, e.g. `display`.
        property: String,
    },
    /// Element shown again.
    Show,
    /// A class toggled, added or removed.
    ToggleClass {
        /// Class name.
        class: String,
    },
    /// New content inserted.
    Insert,
    /// An inline style property set.
    SetStyle {
        /// Property.
        property: String,
        /// Value.
        value: String,
    },
}

/// Focus-related operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum FocusOperation {
    /// `element.focus()`.
    Focus,
    /// `element.blur()`.
    Blur,
    /// Reads `document.activeElement`.
    ReadActiveElement,
    /// Stores the active element for later restoration.
    SavePrevious {
        /// Variable receiving the element.
        variable: String,
    },
    /// Focuses a previously stored element.
    RestorePrevious {
        /// Variable holding the element.
        variable: String,
    },
}

/// Action-specific data.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "actionType", rename_all = "camelCase")]
pub enum ActionKind {
    /// An event listener.
    #[serde(rename_all = "camelCase")]
    EventHandler {
        /// Event name without `on`, e.g. `click`.
        event: String,
        /// Keys the handler tests for.
        #[serde(default)]
        keys: Vec<KeyBinding>,
        /// The handler calls `preventDefault()`.
        #[serde(default)]
        prevents_default: bool,
        /// Numeric `keyCode`/`which` values compared against.
        #[serde(default)]
        legacy_key_codes: Vec<u32>,
    },
    /// An element mutation.
    DomManipulation {
        /// What was done.
        operation: DomOperation,
    },
    /// A focus transition.
    FocusChange {
        /// What was done.
        operation: FocusOperation,
    },
    /// An ARIA attribute assignment.
    AriaStateChange {
        /// Attribute name, e.g. `aria-expanded`.
        attribute: String,
        /// Assigned value (may be an expression).
        value: String,
    },
}

/// Discriminant of [`ActionKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionType {
    /// [`ActionKind::EventHandler`].
    EventHandler,
    /// [`ActionKind::DomManipulation`].
    DomManipulation,
    /// [`ActionKind::FocusChange`].
    FocusChange,
    /// [`ActionKind::AriaStateChange`].
    AriaStateChange,
}

/// Events that activate a control.
pub const ACTIVATION_EVENTS: &[&str] = &["click", "keydown", "keyup", "keypress"];

/// Keyboard events.
pub const KEYBOARD_EVENTS: &[&str] = &["keydown", "keyup", "keypress"];

/// One recorded runtime action.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActionNode {
    /// Position in the page's behavior list.
    pub id: ActionId,
    /// Target element.
    pub binding: ElementBinding,
    /// Source location in the behavior file.
    pub location: Location,
    /// When it runs.
    #[serde(default)]
    pub timing: Timing,
    /// What it does.
    #[serde(flatten)]
    pub kind: ActionKind,
}

impl ActionNode {
    /// Creates an action; the id is reassigned when the page model is assembled.
    #[must_use]
    pub fn new(binding: ElementBinding, location: Location, kind: ActionKind) -> Self {
        Self {
            id: ActionId(0),
            binding,
            location,
            timing: Timing::Immediate,
            kind,
        }
    }

    /// Shorthand for an event handler with keys.
    #[must_use]
    pub fn handler(selector: &str, event: &str, keys: &[&str], location: Location) -> Self {
        Self::new(
            ElementBinding::new(selector),
            location,
            ActionKind::EventHandler {
                event: event.to_string(),
                keys: keys.iter().map(|k| KeyBinding::parse(k)).collect(),
                prevents_default: false,
                legacy_key_codes: Vec::new(),
            },
        )
    }

    /// Shorthand for an ARIA state assignment.
    #[must_use]
    pub fn aria(selector: &str, attribute: &str, value: &str, location: Location) -> Self {
        Self::new(
            ElementBinding::new(selector),
            location,
            ActionKind::AriaStateChange {
                attribute: attribute.to_string(),
                value: value.to_string(),
            },
        )
    }

    /// Sets the timing.
    #[must_use]
    pub fn with_timing(mut self, timing: Timing) -> Self {
        self.timing = timing;
        self
    }

    /// Discriminant of the kind.
    #[must_use]
    pub fn action_type(&self) -> ActionType {
        match self.kind {
            ActionKind::EventHandler { .. } => ActionType::EventHandler,
            ActionKind::DomManipulation { .. } => ActionType::DomManipulation,
            ActionKind::FocusChange { .. } => ActionType::FocusChange,
            ActionKind::AriaStateChange { .. } => ActionType::AriaStateChange,
        }
    }

    /// Event name, for event handlers.
    #[must_use]
    pub fn event(&self) -> Option<&str> {
        match &self.kind {
            ActionKind::EventHandler { event, .. } => Some(event),
            _ => None,
        }
    }

    /// Returns true for handlers of an event that can activate a control.
    #[must_use]
    pub fn is_activation_handler(&self) -> bool {
        self.event()
            .is_some_and(|e| ACTIVATION_EVENTS.contains(&e.to_ascii_lowercase().as_str()))
    }

    /// Returns true for keyboard event handlers.
    #[must_use]
    pub fn is_keyboard_handler(&self) -> bool {
        self.event()
            .is_some_and(|e| KEYBOARD_EVENTS.contains(&e.to_ascii_lowercase().as_str()))
    }

    /// Returns true if a keyboard handler tests for `key`, by name or legacy code.
    #[must_use]
    pub fn handles_key(&self, key: &str) -> bool {
        match &self.kind {
            ActionKind::EventHandler {
                keys,
                legacy_key_codes,
                ..
            } => {
                keys.iter().any(|k| k.is(key))
                    || legacy_key_codes
                        .iter()
                        .filter_map(|c| key_for_code(*c))
                        .any(|k| normalize_key(k) == normalize_key(key))
            }
            _ => false,
        }
    }

    /// Keys handled, for event handlers.
    #[must_use]
    pub fn keys(&self) -> &[KeyBinding] {
        match &self.kind {
            ActionKind::EventHandler { keys, .. } => keys,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc() -> Location {
        Location::new("app.js", 1, 1)
    }

    #[test]
    fn parses_key_notation() {
        let k = KeyBinding::parse("Ctrl+Shift+k");
        assert_eq!(k.key, "k");
        assert!(k.modifiers.ctrl && k.modifiers.shift);
        assert!(k.modifiers.has_command_modifier());
        assert_eq!(KeyBinding::parse("Ctrl++").key, "+");
        assert!(!KeyBinding::parse("Shift+?").modifiers.has_command_modifier());
    }

    #[test]
    fn printable_characters() {
        assert!(KeyBinding::new("s").is_printable_character());
        assert!(KeyBinding::new("?").is_printable_character());
        assert!(!KeyBinding::new("Escape").is_printable_character());
        assert!(!KeyBinding::new(" ").is_printable_character());
    }

    #[test]
    fn key_aliases() {
        assert!(KeyBinding::new("Esc").is("Escape"));
        assert!(KeyBinding::new(" ").is("Space"));
        assert!(KeyBinding::new("Left").is("ArrowLeft"));
    }

    #[test]
    fn handles_key_by_legacy_code() {
        let node = ActionNode::new(
            ElementBinding::new("#dlg"),
            loc(),
            ActionKind::EventHandler {
                event: "keydown".into(),
                keys: vec![],
                prevents_default: false,
                legacy_key_codes: vec![27],
            },
        );
        assert!(node.handles_key("Escape"));
        assert!(!node.handles_key("Tab"));
        assert!(node.is_keyboard_handler());
    }

    #[test]
    fn binding_key_prefers_resolution() {
        let mut binding = ElementBinding::new(" #x ");
        assert_eq!(binding.key(), BindingKey::Selector("#x".into()));
        binding.resolved = Some(ElementId(3));
        assert_eq!(binding.key(), BindingKey::Element(ElementId(3)));
    }

    #[test]
    fn serializes_with_action_type_tag() {
        let node = ActionNode::aria("#menu", "aria-expanded", "true", loc());
        let json = serde_json::to_value(&node).expect("serialize");
        assert_eq!(json["actionType"], "ariaStateChange");
        assert_eq!(json["attribute"], "aria-expanded");
        let back: ActionNode = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back, node);
    }

    #[test]
    fn activation_handlers() {
        assert!(ActionNode::handler("#b", "click", &[], loc()).is_activation_handler());
        assert!(!ActionNode::handler("#b", "mouseover", &[], loc()).is_activation_handler());
    }
}
