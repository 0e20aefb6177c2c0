//! Static lookup table for accessibility standard references.
//!
//! Issues carry short codes in [`Issue::standard_refs`](crate::Issue); hosts
//! resolve them to a title and documentation URL with [`lookup`].

/// A guideline criterion or authoring-practice pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StandardRef {
    /// Short code, e.g. `WCAG-2.1.1`.
    pub code: &'static str,
    /// Criterion title.
    pub title: &'static str,
    /// Documentation URL.
    pub url: &'static str,
}

/// WCAG 1.3.1 Info and Relationships.
pub const INFO_AND_RELATIONSHIPS: &str = "WCAG-1.3.1";
/// WCAG 2.1.1 Keyboard.
pub const KEYBOARD: &str = "WCAG-2.1.1";
/// WCAG 2.1.2 No Keyboard Trap.
pub const NO_KEYBOARD_TRAP: &str = "WCAG-2.1.2";
/// WCAG 2.1.4 Character Key Shortcuts.
pub const CHARACTER_KEY_SHORTCUTS: &str = "WCAG-2.1.4";
/// WCAG 2.4.3 Focus Order.
pub const FOCUS_ORDER: &str = "WCAG-2.4.3";
/// WCAG 2.4.7 Focus Visible.
pub const FOCUS_VISIBLE: &str = "WCAG-2.4.7";
/// WCAG 4.1.2 Name, Role, Value.
pub const NAME_ROLE_VALUE: &str = "WCAG-4.1.2";
/// WCAG 4.1.3 Status Messages.
pub const STATUS_MESSAGES: &str = "WCAG-4.1.3";

const TABLE: &[StandardRef] = &[
    StandardRef {
        code: INFO_AND_RELATIONSHIPS,
        title: "Info and Relationships",
        url: "https://www.w3.org/WAI/WCAG22/Understanding/info-and-relationships",
    },
    StandardRef {
        code: KEYBOARD,
        title: "Keyboard",
        url: "https://www.w3.org/WAI/WCAG22/Understanding/keyboard",
    },
    StandardRef {
        code: NO_KEYBOARD_TRAP,
        title: "No Keyboard Trap",
        url: "https://www.w3.org/WAI/WCAG22/Understanding/no-keyboard-trap",
    },
    StandardRef {
        code: CHARACTER_KEY_SHORTCUTS,
        title: "Character Key Shortcuts",
        url: "https://www.w3.org/WAI/WCAG22/Understanding/character-key-shortcuts",
    },
    StandardRef {
        code: FOCUS_ORDER,
        title: "Focus Order",
        url: "https://www.w3.org/WAI/WCAG22/Understanding/focus-order",
    },
    StandardRef {
        code: FOCUS_VISIBLE,
        title: "Focus Visible",
        url: "https://www.w3.org/WAI/WCAG22/Understanding/focus-visible",
    },
    StandardRef {
        code: NAME_ROLE_VALUE,
        title: "Name, Role, Value",
        url: "https://www.w3.org/WAI/WCAG22/Understanding/name-role-value",
    },
    StandardRef {
        code: STATUS_MESSAGES,
        title: "Status Messages",
        url: "https://www.w3.org/WAI/WCAG22/Understanding/status-messages",
    },
    StandardRef {
        code: "APG-tabs",
        title: "Tabs Pattern",
        url: "https://www.w3.org/WAI/ARIA/apg/patterns/tabs/",
    },
    StandardRef {
        code: "APG-dialog",
        title: "Dialog (Modal) Pattern",
        url: "https://www.w3.org/WAI/ARIA/apg/patterns/dialog-modal/",
    },
    StandardRef {
        code: "APG-accordion",
        title: "Accordion Pattern",
        url: "https://www.w3.org/WAI/ARIA/apg/patterns/accordion/",
    },
    StandardRef {
        code: "APG-combobox",
        title: "Combobox Pattern",
        url: "https://www.w3.org/WAI/ARIA/apg/patterns/combobox/",
    },
    StandardRef {
        code: "APG-menu",
        title: "Menu and Menubar Pattern",
        url: "https://www.w3.org/WAI/ARIA/apg/patterns/menubar/",
    },
    StandardRef {
        code: "APG-slider",
        title: "Slider Pattern",
        url: "https://www.w3.org/WAI/ARIA/apg/patterns/slider/",
    },
    StandardRef {
        code: "APG-switch",
        title: "Switch Pattern",
        url: "https://www.w3.org/WAI/ARIA/apg/patterns/switch/",
    },
    StandardRef {
        code: "APG-carousel",
        title: "Carousel Pattern",
        url: "https://www.w3.org/WAI/ARIA/apg/patterns/carousel/",
    },
    StandardRef {
        code: "APG-tooltip",
        title: "Tooltip Pattern",
        url: "https://www.w3.org/WAI/ARIA/apg/patterns/tooltip/",
    },
];

/// Resolves a short code to its reference entry.
#[must_use]
pub fn lookup(code: &str) -> Option<&'static StandardRef> {
    TABLE.iter().find(|r| r.code == code)
}

/// Returns every known reference.
#[must_use]
pub fn all() -> &'static [StandardRef] {
    TABLE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_known_code() {
        let reference = lookup(KEYBOARD).expect("keyboard reference");
        assert_eq!(reference.title, "Keyboard");
        assert!(reference.url.starts_with("https://www.w3.org/"));
    }

    #[test]
    fn lookup_unknown_code() {
        assert!(lookup("WCAG-9.9.9").is_none());
    }

    #[test]
    fn codes_are_unique() {
        let mut codes: Vec<&str> = all().iter().map(|r| r.code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), all().len());
    }
}
