//! Line-oriented fixture notation for pages.
//!
//! [`FixtureProducer`] is a [`LeafProducer`] for tests and demos. Each
//! non-empty line is one item; `//` starts a comment line.
//!
//! Markup nests by indentation:
//!
//! ```text
//! main id=app
//!   div id=tabs role=tablist
//!     button role=tab aria-selected=true
//! ```
//!
//! Style has one rule per line:
//!
//! ```text
//! .sr-only { position: absolute; left: -9999px }
//! ```
//!
//! Behavior has one action per line, `verb selector args...`:
//!
//! ```text
//! on keydown #tabs keys=ArrowLeft,ArrowRight prevent
//! on keyup #legacy keycode=13
//! aria #menu aria-expanded=true
//! hide #dialog display timing=deferred
//! save-focus lastFocus
//! restore-focus lastFocus #opener
//! ```
//!
//! Selectors containing spaces are written in double quotes.

use crate::behavior::{
    ActionKind, ActionNode, DomOperation, ElementBinding, FocusOperation, KeyBinding, Timing,
};
use crate::dom::{ElementTree, ElementTreeBuilder};
use crate::producer::{LeafProducer, ParseError};
use crate::style::{parse_declarations, StyleRule};
use crate::types::Location;
use std::path::Path;

/// Leaf producer over the fixture notation.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureProducer;

impl LeafProducer for FixtureProducer {
    fn parse_markup(&self, path: &Path, text: &str) -> Result<ElementTree, ParseError> {
        let mut builder = ElementTreeBuilder::new();
        let mut indents: Vec<usize> = Vec::new();
        for line in lines(text) {
            while indents.last().is_some_and(|i| *i >= line.indent) {
                indents.pop();
                builder.close();
            }
            let tokens = tokenize(line.body).map_err(|m| line.error(path, m))?;
            let Some((tag, attrs)) = tokens.split_first() else {
                continue;
            };
            if !tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
                return Err(line.error(path, format!("invalid tag `{tag}`")));
            }
            let attributes = attrs.iter().map(|a| match a.split_once('=') {
                Some((k, v)) => (k.to_string(), v.to_string()),
                None => (a.clone(), String::new()),
            });
            builder.open(tag, attributes, line.location(path));
            indents.push(line.indent);
        }
        Ok(builder.finish())
    }

    fn parse_style(&self, path: &Path, text: &str) -> Result<Vec<StyleRule>, ParseError> {
        lines(text)
            .map(|line| {
                let (selector, rest) = line
                    .body
                    .split_once('{')
                    .ok_or_else(|| line.error(path, "expected `{`"))?;
                let body = rest
                    .trim_end()
                    .strip_suffix('}')
                    .ok_or_else(|| line.error(path, "expected `}`"))?;
                StyleRule::new(selector, parse_declarations(body), line.location(path))
                    .map_err(|e| line.error(path, e.to_string()))
            })
            .collect()
    }

    fn parse_behavior(&self, path: &Path, text: &str) -> Result<Vec<ActionNode>, ParseError> {
        lines(text)
            .map(|line| {
                let tokens = tokenize(line.body).map_err(|m| line.error(path, m))?;
                parse_action(&tokens, line.location(path)).map_err(|m| line.error(path, m))
            })
            .collect()
    }
}

struct Line<'a> {
    number: usize,
    indent: usize,
    offset: usize,
    body: &'a str,
}

impl Line<'_> {
    fn location(&self, path: &Path) -> Location {
        Location::new(path, self.number, self.indent + 1)
            .with_span(self.offset + self.indent, self.body.len())
    }

    fn error(&self, path: &Path, message: impl Into<String>) -> ParseError {
        ParseError::new(path, message).at(self.location(path))
    }
}

fn lines(text: &str) -> impl Iterator<Item = Line<'_>> {
    let mut offset = 0;
    text.split('\n').enumerate().filter_map(move |(index, raw)| {
        let start = offset;
        offset += raw.len() + 1;
        let raw = raw.trim_end_matches('\r');
        let body = raw.trim_start();
        if body.is_empty() || body.starts_with("//") {
            return None;
        }
        Some(Line {
            number: index + 1,
            indent: raw.len() - body.len(),
            offset: start,
            body: body.trim_end(),
        })
    })
}

fn tokenize(text: &str) -> Result<Vec<String>, String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut started = false;
    for ch in text.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                started = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if started {
                    tokens.push(std::mem::take(&mut current));
                    started = false;
                }
            }
            c => {
                current.push(c);
                started = true;
            }
        }
    }
    if in_quotes {
        return Err(String::from("unterminated quote"));
    }
    if started {
        tokens.push(current);
    }
    Ok(tokens)
}

fn parse_action(tokens: &[String], location: Location) -> Result<ActionNode, String> {
    let (verb, rest) = tokens
        .split_first()
        .ok_or_else(|| String::from("empty action"))?;
    let mut positional: Vec<&str> = Vec::new();
    let mut options: Vec<(&str, &str)> = Vec::new();
    let mut flags: Vec<&str> = Vec::new();
    for token in rest {
        match token.split_once('=') {
            Some((k, v)) if !k.is_empty() && !k.contains(['#', '.', '[', ':']) => {
                options.push((k, v));
            }
            _ if token == "prevent" => flags.push(token),
            _ => positional.push(token),
        }
    }
    let option = |name: &str| options.iter().find(|(k, _)| *k == name).map(|(_, v)| *v);
    let arg = |i: usize, what: &str| {
        positional
            .get(i)
            .copied()
            .ok_or_else(|| format!("`{verb}` needs {what}"))
    };

    let (selector, kind) = match verb.as_str() {
        "on" => {
            let event = arg(0, "an event")?;
            let selector = arg(1, "a selector")?;
            let keys = option("keys")
                .map(|k| k.split(',').filter(|s| !s.is_empty()).map(KeyBinding::parse).collect())
                .unwrap_or_default();
            let legacy_key_codes = match option("keycode") {
                Some(codes) => codes
                    .split(',')
                    .map(|c| c.trim().parse::<u32>().map_err(|e| format!("bad keycode: {e}")))
                    .collect::<Result<Vec<_>, _>>()?,
                None => Vec::new(),
            };
            (
                selector,
                ActionKind::EventHandler {
                    event: event.trim_start_matches("on").to_ascii_lowercase(),
                    keys,
                    prevents_default: flags.contains(&"prevent"),
                    legacy_key_codes,
                },
            )
        }
        "aria" => {
            let selector = arg(0, "a selector")?;
            let (attribute, value) = options
                .iter()
                .find(|(k, _)| k.starts_with("aria-") || matches!(*k, "role" | "tabindex"))
                .copied()
                .ok_or_else(|| String::from("`aria` needs attribute=value"))?;
            (
                selector,
                ActionKind::AriaStateChange {
                    attribute: attribute.to_string(),
                    value: value.to_string(),
                },
            )
        }
        "remove" | "show" | "insert" | "hide" | "toggle-class" | "set-style" => {
            let selector = arg(0, "a selector")?;
            let operation = match verb.as_str() {
                "remove" => DomOperation::Remove,
                "show" => DomOperation::Show,
                "insert" => DomOperation::Insert,
                "hide" => DomOperation::Hide {
                    property: positional.get(1).copied().unwrap_or("display").to_string(),
                },
                "toggle-class" => DomOperation::ToggleClass {
                    class: arg(1, "a class")?.to_string(),
                },
                _ => {
                    let (property, value) = options
                        .iter()
                        .find(|(k, _)| *k != "timing" && *k != "as")
                        .copied()
                        .ok_or_else(|| String::from("`set-style` needs property=value"))?;
                    DomOperation::SetStyle {
                        property: property.to_string(),
                        value: value.to_string(),
                    }
                }
            };
            (selector, ActionKind::DomManipulation { operation })
        }
        "focus" => (arg(0, "a selector")?, focus(FocusOperation::Focus)),
        "blur" => (arg(0, "a selector")?, focus(FocusOperation::Blur)),
        "read-active" => (
            positional.first().copied().unwrap_or("document"),
            focus(FocusOperation::ReadActiveElement),
        ),
        "save-focus" | "restore-focus" => {
            let variable = arg(0, "a variable")?.to_string();
            let selector = positional.get(1).copied().unwrap_or("document");
            let operation = if verb == "save-focus" {
                FocusOperation::SavePrevious { variable }
            } else {
                FocusOperation::RestorePrevious { variable }
            };
            (selector, focus(operation))
        }
        other => return Err(format!("unknown action `{other}`")),
    };

    let timing = match option("timing") {
        None | Some("immediate") => Timing::Immediate,
        Some("conditional") => Timing::Conditional,
        Some("deferred") => Timing::Deferred,
        Some(other) => return Err(format!("unknown timing `{other}`")),
    };
    let mut binding = ElementBinding::new(selector);
    if let Some(name) = option("as") {
        binding = binding.named(name);
    }
    Ok(ActionNode::new(binding, location, kind).with_timing(timing))
}

fn focus(operation: FocusOperation) -> ActionKind {
    ActionKind::FocusChange { operation }
}
